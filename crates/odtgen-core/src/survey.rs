//! 安装勘测器：从属性存储归并套件组件的安装证据。
//!
//! 扫描来源：
//! - 套件根路径下的版本键（两位数点一位数，如 `16.0`）：组件 ID、安装根路径、
//!   安装包名、流式安装路径与流式元数据
//! - 操作系统通用已安装应用记录（原生与 32 位兼容注册表）
//!
//! 归并规则：
//! - 只保留安装位置与已收集安装根路径前缀匹配的条目（过滤出套件组件）
//! - 完全相同的条目（全属性比较）折叠为一条
//! - 主产品在归并完成后按规则优先级统一裁决，与条目枚举顺序无关：组件 ID
//!   命中配置集且显示名含品牌标记的条目优先；仅流式路径命中且显示名含品牌
//!   标记的条目次之；恰好一个条目被标记
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::catalog::{BRAND_MARKER, SUITE_ROOTS};
use crate::ordered::OrderedSet;
use crate::store::{Hive, PropertyStore};

/// 通用已安装应用记录根（原生与 32 位兼容注册表）。
const UNINSTALL_ROOTS: &[(&str, bool)] = &[
    ("SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall", false),
    (
        "SOFTWARE\\Wow6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
        true,
    ),
];

/// 产品位数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitness {
    /// 32 位。
    X86,
    /// 64 位。
    X64,
}

impl Bitness {
    /// 输出文档使用的平台字符串（`"32"`/`"64"`）。
    pub fn as_str(self) -> &'static str {
        match self {
            Bitness::X86 => "32",
            Bitness::X64 => "64",
        }
    }
}

/// 一条已归并的套件组件安装记录。
///
/// 身份：
/// - `install_path`（不区分大小写）；本次运行内创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledProduct {
    /// 显示名称。
    pub display_name: String,
    /// 版本字符串（缺失时为空）。
    pub version: String,
    /// 安装根路径（身份键）。
    pub install_path: String,
    /// 组件 ID（已安装应用记录的子键名，通常为产品 GUID）。
    pub component_id: String,
    /// 位数。
    pub bitness: Bitness,
    /// 是否为流式（Click-to-Run）安装。
    pub streaming_install: bool,
    /// 流式客户端语言（仅流式条目可能有值）。
    pub client_culture: Option<String>,
    /// 流式更新开关（仅流式条目可能有值）。
    pub streaming_updates_enabled: Option<bool>,
    /// 流式更新源地址（仅流式条目可能有值）。
    pub streaming_update_url: Option<String>,
    /// 是否为主产品（整个结果集中恰好一个）。
    pub is_primary: bool,
}

/// 按版本收集到的流式元数据。
#[derive(Debug, Clone)]
struct StreamingMeta {
    install_path: String,
    client_culture: Option<String>,
    updates_enabled: Option<bool>,
    update_url: Option<String>,
}

/// 套件版本键下收集到的全部工件。
#[derive(Debug, Default)]
struct SuiteArtifacts {
    config_ids: OrderedSet,
    install_roots: OrderedSet,
    package_names: OrderedSet,
    streaming_paths: OrderedSet,
    streaming_meta: Vec<StreamingMeta>,
}

/// 勘测全部套件组件安装。
///
/// 参数：
/// - `store`：目标主机属性存储
/// - `show_all`：为 `true` 时返回全部命中条目；否则仅返回主产品条目
///
/// 返回值：
/// - 去重后的安装记录列表；主产品（若存在）的 `is_primary` 为 `true`
///
/// 异常处理：
/// - 属性存储访问失败（连接类）会上抛；键/值缺失按正常分支处理
pub fn survey(store: &dyn PropertyStore, show_all: bool) -> Result<Vec<InstalledProduct>> {
    let artifacts = collect_suite_artifacts(store)?;
    let os = os_bitness(store)?;

    let mut products: Vec<InstalledProduct> = Vec::new();

    for (uninstall_root, wow) in UNINSTALL_ROOTS {
        for key in store.subkeys(Hive::LocalMachine, uninstall_root)? {
            let key_path = format!("{uninstall_root}\\{key}");
            let display_name = store
                .read_string(Hive::LocalMachine, &key_path, "DisplayName")?
                .unwrap_or_default();
            if display_name.trim().is_empty() {
                continue;
            }
            let version = store
                .read_string(Hive::LocalMachine, &key_path, "DisplayVersion")?
                .unwrap_or_default();
            let install_location = store
                .read_string(Hive::LocalMachine, &key_path, "InstallLocation")?
                .unwrap_or_default();
            let modify_path = store
                .read_string(Hive::LocalMachine, &key_path, "ModifyPath")?
                .unwrap_or_default();

            let Some(install_path) =
                resolve_membership(&artifacts, &display_name, &install_location)
            else {
                continue;
            };

            // 位数裁决严格限定在当前条目内，不跨迭代继承
            let bitness = entry_bitness(&key, &modify_path, os, *wow);
            let streaming = artifacts
                .streaming_paths
                .iter()
                .any(|sp| paths_related(sp, &install_path));

            let meta = if streaming {
                artifacts
                    .streaming_meta
                    .iter()
                    .find(|m| paths_related(&m.install_path, &install_path))
            } else {
                None
            };

            let product = InstalledProduct {
                display_name,
                version,
                install_path,
                component_id: key,
                bitness,
                streaming_install: streaming,
                client_culture: meta.and_then(|m| m.client_culture.clone()),
                streaming_updates_enabled: meta.and_then(|m| m.updates_enabled),
                streaming_update_url: meta.and_then(|m| m.update_url.clone()),
                is_primary: false,
            };
            // 全属性去重（主产品标记此时尚未裁决，比较时不涉及）
            if !products.iter().any(|p| same_record(p, &product)) {
                products.push(product);
            }
        }
    }

    // 主产品裁决按规则优先级进行，而非条目枚举顺序：先在全部条目中寻找组件
    // ID 命中配置集者，找不到才回退到流式路径命中者
    let primary_idx = products
        .iter()
        .position(|p| {
            artifacts.config_ids.contains(&p.component_id)
                && p.display_name.contains(BRAND_MARKER)
        })
        .or_else(|| {
            products
                .iter()
                .position(|p| p.streaming_install && p.display_name.contains(BRAND_MARKER))
        });
    if let Some(idx) = primary_idx {
        products[idx].is_primary = true;
    }

    debug!("勘测到 {} 条套件组件记录", products.len());
    if !show_all {
        products.retain(|p| p.is_primary);
    }
    Ok(products)
}

/// 读取目标主机的操作系统位数。
///
/// 返回值：
/// - `PROCESSOR_ARCHITECTURE` 为 `x86`（不区分大小写）时为 32 位，其余
///   （含缺失）一律按 64 位处理
pub fn os_bitness(store: &dyn PropertyStore) -> Result<Bitness> {
    let arch = store
        .read_string(
            Hive::LocalMachine,
            "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
            "PROCESSOR_ARCHITECTURE",
        )?
        .unwrap_or_default();
    Ok(if arch.eq_ignore_ascii_case("x86") {
        Bitness::X86
    } else {
        Bitness::X64
    })
}

/// 扫描全部套件根路径下的版本键并收集工件。
fn collect_suite_artifacts(store: &dyn PropertyStore) -> Result<SuiteArtifacts> {
    let version_key = Regex::new(r"^\d{2}\.\d$").expect("版本键正则不合法");
    let mut artifacts = SuiteArtifacts::default();

    for root in SUITE_ROOTS {
        // 流式安装路径也可能直接挂在父根键下
        if let Some(path) =
            store.read_string(Hive::LocalMachine, &format!("{root}\\ClickToRun"), "InstallPath")?
        {
            if !path.trim().is_empty() {
                artifacts.streaming_paths.insert(&path);
                artifacts.install_roots.insert(&path);
            }
        }

        for ver in store.subkeys(Hive::LocalMachine, root)? {
            if !version_key.is_match(&ver) {
                continue;
            }
            let base = format!("{root}\\{ver}");

            for id in store.subkeys(Hive::LocalMachine, &format!("{base}\\Common\\Config"))? {
                artifacts.config_ids.insert(&id);
            }

            if let Some(path) = store.read_string(
                Hive::LocalMachine,
                &format!("{base}\\Common\\InstallRoot"),
                "Path",
            )? {
                if !path.trim().is_empty() {
                    artifacts.install_roots.insert(&path);
                }
            }

            let packages_path = format!("{base}\\Common\\InstalledPackages");
            for pkg in store.subkeys(Hive::LocalMachine, &packages_path)? {
                if let Some(name) =
                    store.read_string(Hive::LocalMachine, &format!("{packages_path}\\{pkg}"), "")?
                {
                    let normalized = normalize_package_name(&name);
                    if !normalized.is_empty() {
                        artifacts.package_names.insert(&normalized);
                    }
                }
            }

            if let Some(path) =
                store.read_string(Hive::LocalMachine, &format!("{base}\\ClickToRun"), "InstallPath")?
            {
                if !path.trim().is_empty() {
                    artifacts.streaming_paths.insert(&path);
                    artifacts.install_roots.insert(&path);
                    let cfg = format!("{base}\\ClickToRun\\Configuration");
                    artifacts.streaming_meta.push(StreamingMeta {
                        install_path: path,
                        client_culture: store.read_string(Hive::LocalMachine, &cfg, "ClientCulture")?,
                        updates_enabled: store
                            .read_string(Hive::LocalMachine, &cfg, "UpdatesEnabled")?
                            .map(|v| v.eq_ignore_ascii_case("true")),
                        update_url: store.read_string(Hive::LocalMachine, &cfg, "UpdateUrl")?,
                    });
                }
            }
        }
    }
    Ok(artifacts)
}

/// 判定条目是否属于套件，并给出其身份安装路径。
///
/// 规则：
/// - 安装位置非空：必须与某个已收集安装根路径前缀匹配
/// - 安装位置为空：归一化显示名需出现在安装包名集合中，且存在可借用的安装根
fn resolve_membership(
    artifacts: &SuiteArtifacts,
    display_name: &str,
    install_location: &str,
) -> Option<String> {
    if !install_location.trim().is_empty() {
        if artifacts
            .install_roots
            .iter()
            .any(|root| path_has_prefix(root, install_location))
        {
            return Some(install_location.to_string());
        }
        return None;
    }
    let normalized = normalize_package_name(display_name);
    if artifacts.package_names.contains(&normalized) {
        return artifacts.install_roots.iter().next().map(str::to_string);
    }
    None
}

/// 单条目位数裁决（优先级：组件 GUID 特征位 → 维护命令行平台标记 → 操作系统
/// 位数；32 位兼容注册表来源作为最后检查项强制 32 位）。
fn entry_bitness(component_id: &str, modify_path: &str, os: Bitness, wow_origin: bool) -> Bitness {
    if wow_origin {
        return Bitness::X86;
    }
    // Office 组件 GUID 第四段首字符编码位数：0 为 32 位、1 为 64 位
    let guid = Regex::new(
        r"^\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-([01])[0-9A-Fa-f]{3}-0000000FF1CE\}$",
    )
    .expect("组件 GUID 正则不合法");
    if let Some(caps) = guid.captures(component_id) {
        return match &caps[1] {
            "0" => Bitness::X86,
            _ => Bitness::X64,
        };
    }
    let lower = modify_path.to_ascii_lowercase();
    if lower.contains("platform=x86") {
        return Bitness::X86;
    }
    if lower.contains("platform=x64") {
        return Bitness::X64;
    }
    os
}

/// 比较两条记录是否为同一安装证据（忽略主产品标记）。
fn same_record(a: &InstalledProduct, b: &InstalledProduct) -> bool {
    a.display_name == b.display_name
        && a.version == b.version
        && a.install_path.eq_ignore_ascii_case(&b.install_path)
        && a.component_id == b.component_id
        && a.bitness == b.bitness
        && a.streaming_install == b.streaming_install
        && a.client_culture == b.client_culture
        && a.streaming_updates_enabled == b.streaming_updates_enabled
        && a.streaming_update_url == b.streaming_update_url
}

/// 归一化安装包名：去空格并小写。
fn normalize_package_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// 判断 `path` 是否位于 `root` 之下（含相等；不区分大小写，忽略尾部分隔符）。
fn path_has_prefix(root: &str, path: &str) -> bool {
    let root = root.trim_end_matches('\\').to_lowercase();
    let path = path.trim_end_matches('\\').to_lowercase();
    path == root || path.starts_with(&format!("{root}\\"))
}

/// 两个路径任意一方为另一方前缀即视为关联（流式路径与安装位置的互相匹配）。
fn paths_related(a: &str, b: &str) -> bool {
    path_has_prefix(a, b) || path_has_prefix(b, a)
}
