//! 部署配置生成命令行入口。
//!
//! 职责：
//! - 解析目标主机列表、语言策略、输出路径与默认配置文档覆盖
//! - 逐台主机串行执行“勘测 → 语言聚合 → 文档合成”流水线
//! - 多主机时以主机名前缀命名各自的输出文件；单台主机的致命错误直接上抛，
//!   多主机时逐台包装，单台失败不阻止后续主机
//!
//! 权限要求：
//! - 读取本机注册表通常不需要管理员；远程主机需要远程注册表服务与访问凭据
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use odtgen_core::generate::{self, GenerateOptions, GenerationResult};
use odtgen_core::languages::LanguagePolicy;
use odtgen_core::store::PropertyStore;

/// 命令行参数。
///
/// 说明：
/// - `hosts` 支持逗号分隔的多台主机；`.` 表示本机
/// - `default_config` 传空字符串可禁用默认文档回退
#[derive(Debug, Parser)]
#[command(name = "odtgen", version)]
struct Cli {
    /// 目标主机列表（逗号分隔；`.` 表示本机）。
    #[arg(long = "hosts", value_delimiter = ',', default_value = ".")]
    hosts: Vec<String>,

    /// 语言聚合策略。
    #[arg(long, value_enum, default_value_t = PolicyArg::AllInUseLanguages)]
    languages: PolicyArg,

    /// 输出文件路径；缺省时将结果对象以 JSON 形式输出到标准输出。
    #[arg(long)]
    output: Option<PathBuf>,

    /// 将现有流式更新源路径镜像到 `Add` 元素的 `SourcePath`。
    #[arg(long, default_value_t = false)]
    use_update_source: bool,

    /// 默认配置文档路径（仅在未检测到套件安装时使用；传空字符串禁用）。
    #[arg(long, default_value = "DefaultConfiguration.xml")]
    default_config: String,
}

/// 语言聚合策略的命令行别名。
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// 已装套件当前使用的语言。
    CurrentOfficeLanguages,
    /// 仅操作系统界面语言。
    OsLanguage,
    /// 操作系统语言加已登录用户语言。
    OsAndUserLanguages,
    /// 全部在用语言（默认）。
    AllInUseLanguages,
}

impl From<PolicyArg> for LanguagePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::CurrentOfficeLanguages => LanguagePolicy::CurrentOfficeLanguages,
            PolicyArg::OsLanguage => LanguagePolicy::OsLanguage,
            PolicyArg::OsAndUserLanguages => LanguagePolicy::OsAndUserLanguages,
            PolicyArg::AllInUseLanguages => LanguagePolicy::AllInUseLanguages,
        }
    }
}

/// 程序入口：逐台主机执行生成流水线。
///
/// 异常处理：
/// - 单台主机模式下任意失败直接返回错误
/// - 多主机模式下逐台记录失败并继续；存在失败时最终返回错误
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let options = GenerateOptions {
        policy: cli.languages.into(),
        mirror_update_source: cli.use_update_source,
        default_config_xml: load_default_config(&cli.default_config)?,
    };

    let multi_host = cli.hosts.len() > 1;
    let mut failed = 0usize;
    for host in &cli.hosts {
        match run_host(host, &options, &cli) {
            Ok(()) => {}
            Err(e) if multi_host => {
                // 主机级失败带主机名前缀记录，不阻止后续主机
                error!("{host}: 处理失败: {e:#}");
                failed += 1;
            }
            Err(e) => return Err(e.context(format!("{host}: 处理失败"))),
        }
    }
    if failed > 0 {
        return Err(anyhow!("{failed} 台主机处理失败"));
    }
    Ok(())
}

/// 读取默认配置文档（路径为空表示禁用；文件不存在按禁用处理）。
fn load_default_config(path: &str) -> Result<Option<String>> {
    if path.trim().is_empty() {
        return Ok(None);
    }
    let p = Path::new(path);
    if !p.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(p).with_context(|| format!("读取默认配置文档失败: {path}"))?;
    Ok(Some(content))
}

/// 对单台主机执行生成并落盘/输出结果。
fn run_host(host: &str, options: &GenerateOptions, cli: &Cli) -> Result<()> {
    let store = open_store(host)?;
    let result = generate::generate(store.as_ref(), host, options)?;

    match &cli.output {
        Some(path) => {
            let target = per_host_output_path(path, host, cli.hosts.len() > 1);
            std::fs::write(&target, &result.xml)
                .with_context(|| format!("写入配置文档失败: {}", target.display()))?;
            info!(
                "{host}: 已生成配置文档: {}（语言: {}）",
                target.display(),
                result.languages.join(", ")
            );
        }
        None => print_result(&result)?,
    }
    Ok(())
}

/// 将结果对象以 JSON 输出到标准输出。
fn print_result(result: &GenerationResult) -> Result<()> {
    let text = serde_json::to_string_pretty(result).context("序列化结果失败")?;
    println!("{text}");
    Ok(())
}

/// 多主机时在文件名前加主机名前缀（主机名中的路径分隔字符替换为下划线）。
fn per_host_output_path(path: &Path, host: &str, multi_host: bool) -> PathBuf {
    if !multi_host {
        return path.to_path_buf();
    }
    let safe_host: String = host
        .chars()
        .map(|c| if matches!(c, '\\' | '/' | ':') { '_' } else { c })
        .collect();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "configuration.xml".to_string());
    path.with_file_name(format!("{safe_host}-{file_name}"))
}

/// 打开目标主机的属性存储。
#[cfg(windows)]
fn open_store(host: &str) -> Result<Box<dyn PropertyStore>> {
    Ok(Box::new(odtgen_windows::RegistryPropertyStore::connect(
        host,
    )?))
}

/// 非 Windows 平台无真实注册表可读，仅核心库可用于测试/开发。
#[cfg(not(windows))]
fn open_store(host: &str) -> Result<Box<dyn PropertyStore>> {
    let _ = host;
    Err(anyhow!("仅支持在 Windows 上读取目标主机注册表"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 多主机时输出文件名带主机名前缀，路径分隔字符被替换。
    fn per_host_output_path_prefixes_host() {
        let p = per_host_output_path(Path::new("configuration.xml"), "srv01", true);
        assert_eq!(p, PathBuf::from("srv01-configuration.xml"));
        let p = per_host_output_path(Path::new("configuration.xml"), ".", false);
        assert_eq!(p, PathBuf::from("configuration.xml"));
        let p = per_host_output_path(Path::new("configuration.xml"), "dom\\srv02", true);
        assert_eq!(p, PathBuf::from("dom_srv02-configuration.xml"));
    }
}
