//! 流式（Click-to-Run）运行时探测。
//!
//! 规则：
//! - 按固定顺序探测候选配置根，第一个 `InstallPath` 非空者生效，后续不再检查
//! - 未探测到任何根时 `installed` 为 `false`，其余字段不填充；“不存在”本身
//!   有意义（选择传统安装回退路径）
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;
use tracing::debug;

use crate::catalog::{RELEASE_ID_SENTINELS, STREAMING_ROOTS};
use crate::ordered::OrderedSet;
use crate::store::{Hive, PropertyStore};
use crate::survey::Bitness;

/// 流式运行时的生效配置（一次运行内构建一次，之后不再修改）。
#[derive(Debug, Clone, Default)]
pub struct StreamingRuntimeConfig {
    /// 是否检测到流式运行时。
    pub installed: bool,
    /// 平台位数（`x86` 归一化为 32，其余含缺失一律按 64 处理）。
    pub platform: Option<Bitness>,
    /// 客户端语言标签。
    pub client_culture: Option<String>,
    /// 产品发布 ID（有序去重）。
    pub product_release_ids: Vec<String>,
    /// 上报版本号。
    pub version: Option<String>,
    /// 更新开关原始值（`True`/`False`）。
    pub updates_enabled: Option<String>,
    /// 更新源地址。
    pub update_url: Option<String>,
    /// 更新最后期限。
    pub update_deadline: Option<String>,
    /// 生效的配置根路径（供按产品枚举语言子键使用）。
    pub config_key_path: Option<String>,
}

/// 探测流式运行时并提取生效配置。
///
/// 参数：
/// - `store`：目标主机属性存储
///
/// 返回值：
/// - 未检测到安装时 `installed == false`，其余字段保持默认
///
/// 异常处理：
/// - 属性存储访问失败会上抛；键/值缺失按正常分支处理
pub fn inspect(store: &dyn PropertyStore) -> Result<StreamingRuntimeConfig> {
    let mut active_root: Option<&str> = None;
    for root in STREAMING_ROOTS {
        if let Some(path) = store.read_string(Hive::LocalMachine, root, "InstallPath")? {
            if !path.trim().is_empty() {
                active_root = Some(root);
                break;
            }
        }
    }
    let Some(root) = active_root else {
        debug!("未检测到流式运行时");
        return Ok(StreamingRuntimeConfig::default());
    };

    let cfg = format!("{root}\\Configuration");
    let platform_raw = store
        .read_string(Hive::LocalMachine, &cfg, "Platform")?
        .unwrap_or_default();
    let raw_ids = store
        .read_string(Hive::LocalMachine, &cfg, "ProductReleaseIds")?
        .unwrap_or_default();

    let mut ids = OrderedSet::new();
    if raw_ids.trim().is_empty() {
        // 配置值为空时按活动产品发布子树重建，跳过保留哨兵
        let active = format!("{root}\\ProductReleaseIDs\\Active");
        for child in store.subkeys(Hive::LocalMachine, &active)? {
            if RELEASE_ID_SENTINELS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&child))
            {
                continue;
            }
            ids.insert(&child);
        }
    } else {
        for id in raw_ids.split(',') {
            let id = id.trim();
            if !id.is_empty() {
                ids.insert(id);
            }
        }
    }

    Ok(StreamingRuntimeConfig {
        installed: true,
        platform: Some(normalize_platform(&platform_raw)),
        client_culture: store.read_string(Hive::LocalMachine, &cfg, "ClientCulture")?,
        product_release_ids: ids.into_vec(),
        version: store.read_string(Hive::LocalMachine, &cfg, "VersionToReport")?,
        updates_enabled: store.read_string(Hive::LocalMachine, &cfg, "UpdatesEnabled")?,
        update_url: store.read_string(Hive::LocalMachine, &cfg, "UpdateUrl")?,
        update_deadline: store.read_string(Hive::LocalMachine, &cfg, "UpdateDeadline")?,
        config_key_path: Some(root.to_string()),
    })
}

/// 平台字符串归一化：`x86` 为 32 位，其余（含缺失/未识别）一律 64 位。
fn normalize_platform(raw: &str) -> Bitness {
    if raw.eq_ignore_ascii_case("x86") {
        Bitness::X86
    } else {
        Bitness::X64
    }
}
