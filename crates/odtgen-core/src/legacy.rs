//! 传统安装回退推导（仅在未检测到流式运行时时使用）。
//!
//! 推导内容：
//! - 平台位数：单一安装记录的位数，否则主产品位数，再否则操作系统位数
//! - 产品发布 ID：基于已勘测显示名的静态启发式（默认零售目录 ID + 附加产品）
//! - 主语言：主产品组件 GUID 第三段内嵌的 LCID，经语言表解析
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;
use regex::Regex;

use crate::catalog::{ADDON_PRODUCTS, BRAND_MARKER, DEFAULT_PRODUCT_ID, SUITE_ROOTS};
use crate::locale;
use crate::ordered::OrderedSet;
use crate::store::{Hive, PropertyStore};
use crate::survey::{os_bitness, Bitness, InstalledProduct};

/// 由传统安装证据推导出的等价配置。
#[derive(Debug, Clone)]
pub struct LegacyInstallConfig {
    /// 平台位数。
    pub platform: Bitness,
    /// 产品发布 ID（有序去重）。
    pub product_ids: Vec<String>,
    /// 主产品语言（组件 GUID 内嵌 LCID 解析结果；操作系统区域无法解析时
    /// 作为主语言兜底）。
    pub primary_culture: Option<String>,
    /// 是否探测到任何版本键携带非空安装根路径（参与安装检测裁决，阻止
    /// 默认文档回退）。
    pub install_root_present: bool,
}

/// 从勘测结果推导传统安装配置。
///
/// 参数：
/// - `store`：目标主机属性存储
/// - `products`：安装勘测器输出（全部条目）
///
/// 异常处理：
/// - 属性存储访问失败会上抛
pub fn derive(
    store: &dyn PropertyStore,
    products: &[InstalledProduct],
) -> Result<LegacyInstallConfig> {
    let install_root_present = probe_install_root(store)?;

    // 未识别出可区分主产品时以默认零售目录 ID 兜底；附加产品按关键字追加，
    // 已存在的 ID 不重复
    let mut ids = OrderedSet::new();
    ids.insert(DEFAULT_PRODUCT_ID);
    for p in products {
        if !p.display_name.contains(BRAND_MARKER) {
            continue;
        }
        for (keyword, id) in ADDON_PRODUCTS {
            if p.display_name.contains(keyword) {
                ids.insert(id);
            }
        }
    }

    let platform = if products.len() == 1 {
        products[0].bitness
    } else if let Some(primary) = products.iter().find(|p| p.is_primary) {
        primary.bitness
    } else {
        os_bitness(store)?
    };

    let primary_culture = products
        .iter()
        .find(|p| p.is_primary)
        .and_then(|p| culture_from_component_id(&p.component_id));

    Ok(LegacyInstallConfig {
        platform,
        product_ids: ids.into_vec(),
        primary_culture,
        install_root_present,
    })
}

/// 按固定声明顺序探测套件根路径，寻找首个携带非空安装根路径的版本键。
fn probe_install_root(store: &dyn PropertyStore) -> Result<bool> {
    let version_key = Regex::new(r"^\d{2}\.\d$").expect("版本键正则不合法");
    for root in SUITE_ROOTS {
        for ver in store.subkeys(Hive::LocalMachine, root)? {
            if !version_key.is_match(&ver) {
                continue;
            }
            if let Some(path) = store.read_string(
                Hive::LocalMachine,
                &format!("{root}\\{ver}\\Common\\InstallRoot"),
                "Path",
            )? {
                if !path.trim().is_empty() {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

/// 从组件 GUID 第三段解析内嵌 LCID 并映射为语言标签。
///
/// 示例：
/// - `{90160000-0011-040C-0000-0000000FF1CE}` 的第三段 `040C` 为十六进制
///   LCID 1036，对应 `fr-fr`
fn culture_from_component_id(component_id: &str) -> Option<String> {
    let group = component_id
        .trim_matches(|c| c == '{' || c == '}')
        .split('-')
        .nth(2)?;
    let lcid = u32::from_str_radix(group, 16).ok()?;
    locale::resolve_lcid(lcid).map(str::to_string)
}
