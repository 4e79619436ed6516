//! 语言聚合：按策略决定主语言与附加语言集合。
//!
//! 来源：
//! - 操作系统界面语言（`Nls\Language` 的 `InstallLanguage`，十六进制 LCID）
//! - 各用户配置单元的 `PreferredUILanguages`（跳过系统伪账户与 `_Classes`）
//! - 系统界面语言清单（`MUI\UILanguages` 子键，标签形式，仍须经语言表校验）
//! - 按产品的语言资源（流式：活动发布子树；传统：版本键下的已装界面语言）
//!
//! 不变式：
//! - 所有标签必须能解析到受支持语言表，否则丢弃
//! - 聚合完成后附加集合不区分大小写去重，且绝不包含主语言
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::catalog::{NEUTRAL_CULTURE, SUITE_ROOTS};
use crate::error::GenerateError;
use crate::locale;
use crate::ordered::OrderedSet;
use crate::store::{Hive, PropertyStore};
use crate::streaming::StreamingRuntimeConfig;

/// 语言聚合策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguagePolicy {
    /// 已装套件当前使用的语言：流式存在时主语言取流式客户端语言，否则取
    /// 操作系统界面语言；附加语言仅来自按产品语言发现。
    CurrentOfficeLanguages,
    /// 仅操作系统界面语言，无附加语言。
    OsLanguage,
    /// 操作系统语言加已登录用户语言（用户配置单元 + 语言包清单）。
    OsAndUserLanguages,
    /// 全部在用语言（默认）：在上一策略基础上再并入按产品语言。
    #[default]
    AllInUseLanguages,
}

/// 聚合结果：主语言与有序去重的附加语言集合。
#[derive(Debug, Clone)]
pub struct LanguageSet {
    /// 主语言标签（小写、连字符形式）。
    pub primary: String,
    /// 附加语言标签（不含主语言）。
    pub additional: Vec<String>,
}

impl LanguageSet {
    /// 主语言加附加语言的完整有序列表。
    pub fn all(&self) -> Vec<String> {
        let mut out = vec![self.primary.clone()];
        out.extend(self.additional.iter().cloned());
        out
    }
}

/// 按策略聚合语言集合。
///
/// 参数：
/// - `store`：目标主机属性存储
/// - `policy`：聚合策略
/// - `streaming`：流式运行时探测结果（决定主语言来源与按产品语言路径）
/// - `fallback_primary`：操作系统区域无法解析时的兜底主语言（传统安装推导
///   出的主语言，见 [`crate::legacy`]）
///
/// 异常处理：
/// - 主语言与兜底均无法解析时返回 [`GenerateError::UnresolvableLanguage`]，
///   该主机的生成流程整体中止
pub fn aggregate(
    store: &dyn PropertyStore,
    policy: LanguagePolicy,
    streaming: &StreamingRuntimeConfig,
    fallback_primary: Option<&str>,
) -> Result<LanguageSet> {
    let os_culture = os_ui_culture(store)?;

    let primary = match policy {
        LanguagePolicy::CurrentOfficeLanguages if streaming.installed => streaming
            .client_culture
            .as_deref()
            .and_then(locale::resolve)
            .map(str::to_string)
            .or(os_culture),
        _ => os_culture,
    };
    let primary = primary
        .or_else(|| fallback_primary.and_then(locale::resolve).map(str::to_string))
        .ok_or(GenerateError::UnresolvableLanguage)?;

    let mut additional = OrderedSet::new();

    if matches!(
        policy,
        LanguagePolicy::OsAndUserLanguages | LanguagePolicy::AllInUseLanguages
    ) {
        for tag in user_profile_languages(store)? {
            additional.insert(&tag);
        }
        for tag in installed_language_packs(store)? {
            additional.insert(&tag);
        }
    }

    if matches!(
        policy,
        LanguagePolicy::CurrentOfficeLanguages | LanguagePolicy::AllInUseLanguages
    ) {
        for tag in per_product_languages(store, streaming)? {
            additional.insert(&tag);
        }
    }

    // 主语言绝不同时出现在附加集合中
    additional.remove(&primary);

    debug!(
        "语言聚合完成: 主语言 {}，附加 {} 项",
        primary,
        additional.len()
    );
    Ok(LanguageSet {
        primary,
        additional: additional.into_vec(),
    })
}

/// 解析操作系统界面语言。
///
/// 返回值：
/// - `InstallLanguage`（十六进制 LCID）能映射到受支持语言表时返回标签
fn os_ui_culture(store: &dyn PropertyStore) -> Result<Option<String>> {
    let raw = store
        .read_string(
            Hive::LocalMachine,
            "SYSTEM\\CurrentControlSet\\Control\\Nls\\Language",
            "InstallLanguage",
        )?
        .unwrap_or_default();
    let Ok(lcid) = u32::from_str_radix(raw.trim(), 16) else {
        return Ok(None);
    };
    Ok(locale::resolve_lcid(lcid).map(str::to_string))
}

/// 收集各用户配置单元声明的界面语言。
///
/// 过滤：
/// - 键名过短（长度启发式区分真实用户 SID 与系统伪账户）或以 `_Classes`
///   结尾的配置单元跳过
fn user_profile_languages(store: &dyn PropertyStore) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for sid in store.subkeys(Hive::Users, "")? {
        if sid.len() < 20 || sid.to_ascii_lowercase().ends_with("_classes") {
            continue;
        }
        let desktop = format!("{sid}\\Control Panel\\Desktop");
        if let Some(values) =
            store.read_multi_string(Hive::Users, &desktop, "PreferredUILanguages")?
        {
            for v in values {
                if let Some(tag) = locale::resolve(&v) {
                    out.push(tag.to_string());
                }
            }
        }
    }
    Ok(out)
}

/// 收集系统界面语言清单中的语言包标识。
///
/// 过滤：
/// - 子键名已是标签形式，但仍须能解析到受支持语言表，否则丢弃
fn installed_language_packs(store: &dyn PropertyStore) -> Result<Vec<String>> {
    Ok(store
        .subkeys(
            Hive::LocalMachine,
            "SYSTEM\\CurrentControlSet\\Control\\MUI\\UILanguages",
        )?
        .into_iter()
        .filter_map(|s| locale::resolve(&s).map(str::to_string))
        .collect())
}

/// 按产品收集语言资源。
///
/// 规则：
/// - 流式存在：枚举各产品活动发布子树的语言子键（含连字符、排除中性哨兵）
/// - 流式不存在：读取各版本键 `Common\LanguageResources` 的已装界面语言
///   值列表，逐项按 LCID 解析
fn per_product_languages(
    store: &dyn PropertyStore,
    streaming: &StreamingRuntimeConfig,
) -> Result<Vec<String>> {
    let mut out = Vec::new();
    if streaming.installed {
        let Some(root) = streaming.config_key_path.as_deref() else {
            return Ok(out);
        };
        for pid in &streaming.product_release_ids {
            let path = format!("{root}\\ProductReleaseIDs\\Active\\{pid}");
            for child in store.subkeys(Hive::LocalMachine, &path)? {
                if !child.contains('-') || child.eq_ignore_ascii_case(NEUTRAL_CULTURE) {
                    continue;
                }
                if let Some(tag) = locale::resolve(&child) {
                    out.push(tag.to_string());
                }
            }
        }
        return Ok(out);
    }

    let version_key = Regex::new(r"^\d{2}\.\d$").expect("版本键正则不合法");
    for root in SUITE_ROOTS {
        for ver in store.subkeys(Hive::LocalMachine, root)? {
            if !version_key.is_match(&ver) {
                continue;
            }
            let resources = format!("{root}\\{ver}\\Common\\LanguageResources");
            if let Some(values) =
                store.read_multi_string(Hive::LocalMachine, &resources, "InstalledUIs")?
            {
                for v in values {
                    if let Ok(lcid) = v.trim().parse::<u32>() {
                        if let Some(tag) = locale::resolve_lcid(lcid) {
                            out.push(tag.to_string());
                        }
                    }
                }
            }
        }
    }
    Ok(out)
}
