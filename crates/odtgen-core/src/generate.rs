//! 单主机生成流水线：勘测 → 语言聚合 → 文档合成 → 序列化。
//!
//! 控制流：
//! 1. 安装勘测器与流式运行时探测先行，确立安装事实；流式不存在时再执行
//!    传统安装回退推导
//! 2. 语言聚合器按请求策略解析语言集合（传统推导出的主语言作为操作系统
//!    区域无法解析时的兜底）
//! 3. 配置合成器组装文档（未检测到任何套件安装——含传统安装根路径探测——
//!    且调用方提供默认文档时，改为加载该文档并借用其产品/平台继续语言
//!    upsert）
//! 4. 渲染为缩进文本
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{EXCLUDABLE_APPS_LEGACY, EXCLUDABLE_APPS_STREAMING, NEUTRAL_CULTURE};
use crate::config::ConfigurationDocument;
use crate::languages::{self, LanguagePolicy, LanguageSet};
use crate::legacy;
use crate::store::{Hive, PropertyStore};
use crate::streaming::{self, StreamingRuntimeConfig};
use crate::survey::{self, InstalledProduct};

/// 生成选项。
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// 语言聚合策略。
    pub policy: LanguagePolicy,
    /// 是否将现有更新源路径镜像到 `Add` 的 `SourcePath`。
    pub mirror_update_source: bool,
    /// 默认配置文档文本（仅在未检测到任何套件安装时使用）。
    pub default_config_xml: Option<String>,
}

/// 单主机生成结果。
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    /// 目标主机名（本机为 `.`）。
    pub host: String,
    /// 序列化后的配置文档文本。
    pub xml: String,
    /// 解析出的语言列表（主语言在前）。
    pub languages: Vec<String>,
}

/// 对单台主机执行完整生成流水线。
///
/// 参数：
/// - `store`：该主机的属性存储
/// - `host`：主机名（仅用于结果标注与日志）
/// - `options`：生成选项
///
/// 异常处理：
/// - 主语言无法解析时整体失败，不输出部分文档
/// - 属性存储连接失败由上层以主机名前缀包装
pub fn generate(
    store: &dyn PropertyStore,
    host: &str,
    options: &GenerateOptions,
) -> Result<GenerationResult> {
    let products = survey::survey(store, true)?;
    let streaming_cfg = streaming::inspect(store)?;
    let legacy_cfg = if streaming_cfg.installed {
        None
    } else {
        Some(legacy::derive(store, &products)?)
    };
    let language_set = languages::aggregate(
        store,
        options.policy,
        &streaming_cfg,
        legacy_cfg.as_ref().and_then(|c| c.primary_culture.as_deref()),
    )?;

    info!(
        "主机 {host}: 勘测到 {} 条安装记录，流式运行时 {}",
        products.len(),
        if streaming_cfg.installed { "存在" } else { "不存在" }
    );

    let mut doc = ConfigurationDocument::new();
    // 传统安装根路径的存在本身就是安装证据，同样阻止默认文档回退
    let detected = !products.is_empty()
        || streaming_cfg.installed
        || legacy_cfg.as_ref().is_some_and(|c| c.install_root_present);

    if !detected {
        if let Some(xml) = options.default_config_xml.as_deref() {
            // 未检测到任何套件安装：加载默认文档，借用其产品与平台继续语言 upsert
            doc = ConfigurationDocument::from_xml(xml)?;
            let borrowed_ids = doc.product_ids();
            debug!("未检测到安装，借用默认文档（{} 个产品）", borrowed_ids.len());
            for id in &borrowed_ids {
                upsert_languages(&mut doc, id, &language_set)?;
            }
            return Ok(GenerationResult {
                host: host.to_string(),
                xml: doc.render()?,
                languages: language_set.all(),
            });
        }
    }

    let (platform, version, product_ids) = match legacy_cfg {
        None => (
            streaming_cfg.platform.unwrap_or(survey::os_bitness(store)?),
            streaming_cfg.version.clone(),
            streaming_cfg.product_release_ids.clone(),
        ),
        Some(cfg) => (cfg.platform, None, cfg.product_ids),
    };

    doc.ensure_configuration();
    doc.ensure_add(version.as_deref(), Some(platform.as_str()))?;

    for id in &product_ids {
        doc.upsert_product(id)?;
        upsert_languages(&mut doc, id, &language_set)?;
        for app in excluded_apps(store, &streaming_cfg, &products, id)? {
            doc.upsert_exclude_app(id, &app)?;
        }
    }

    if streaming_cfg.installed {
        let enabled = streaming_cfg
            .updates_enabled
            .as_deref()
            .map(|v| if v.eq_ignore_ascii_case("true") { "TRUE" } else { "FALSE" });
        if enabled.is_some()
            || streaming_cfg.update_url.is_some()
            || streaming_cfg.update_deadline.is_some()
        {
            doc.upsert_updates(
                enabled,
                streaming_cfg.update_url.as_deref(),
                None,
                streaming_cfg.update_deadline.as_deref(),
            )?;
        }
        if options.mirror_update_source {
            if let Some(url) = streaming_cfg.update_url.as_deref() {
                if !url.trim().is_empty() {
                    doc.upsert_add_source_path(url)?;
                }
            }
        }
    }

    Ok(GenerationResult {
        host: host.to_string(),
        xml: doc.render()?,
        languages: language_set.all(),
    })
}

/// 在指定产品下 upsert 主语言与附加语言（主语言在前）。
fn upsert_languages(
    doc: &mut ConfigurationDocument,
    product_id: &str,
    set: &LanguageSet,
) -> Result<()> {
    doc.upsert_language(product_id, &set.primary)?;
    for tag in &set.additional {
        doc.upsert_language(product_id, tag)?;
    }
    Ok(())
}

/// 计算指定产品应排除的应用列表。
///
/// 规则：
/// - 流式存在：以该产品 `x-none` 子树下的已装应用 ID 为准，目录中没有任何
///   已装 ID 以其名开头（不区分大小写）的应用进入排除列表
/// - 流式不存在：同一测试改以全部勘测产品的显示名为准，并使用少一项的
///   传统目录
fn excluded_apps(
    store: &dyn PropertyStore,
    streaming_cfg: &StreamingRuntimeConfig,
    products: &[InstalledProduct],
    product_id: &str,
) -> Result<Vec<String>> {
    let mut out = Vec::new();
    if streaming_cfg.installed {
        let Some(root) = streaming_cfg.config_key_path.as_deref() else {
            return Ok(out);
        };
        let path = format!("{root}\\ProductReleaseIDs\\Active\\{product_id}\\{NEUTRAL_CULTURE}");
        let installed_ids = store.subkeys(Hive::LocalMachine, &path)?;
        for app in EXCLUDABLE_APPS_STREAMING {
            if !installed_ids
                .iter()
                .any(|id| starts_with_ci(id, app))
            {
                out.push((*app).to_string());
            }
        }
    } else {
        for app in EXCLUDABLE_APPS_LEGACY {
            if !products
                .iter()
                .any(|p| starts_with_ci(&p.display_name, app))
            {
                out.push((*app).to_string());
            }
        }
    }
    Ok(out)
}

/// 不区分大小写的前缀判断（对多字节字符边界安全）。
fn starts_with_ci(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
