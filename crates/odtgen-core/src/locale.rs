//! 语言标签解析（受支持语言表与 LCID 映射）。
//!
//! 说明：
//! - 受支持语言表为进程启动即固定的静态常量；表序有意义：前缀回退命中多项时
//!   取表中靠前者
//! - 解析函数是纯函数且全定义：无法映射的输入返回 `None`，从不报错
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

/// 部署工具受支持的语言标签表（小写、连字符形式）。
///
/// 注意：
/// - 表序参与前缀回退的并列裁决（例如 `zh` 命中 `zh-cn` 而非 `zh-tw`）
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar-sa", "bg-bg", "zh-cn", "zh-tw", "hr-hr", "cs-cz", "da-dk", "nl-nl", "en-us", "et-ee",
    "fi-fi", "fr-fr", "de-de", "el-gr", "he-il", "hi-in", "hu-hu", "id-id", "it-it", "ja-jp",
    "kk-kz", "ko-kr", "lv-lv", "lt-lt", "ms-my", "nb-no", "pl-pl", "pt-br", "pt-pt", "ro-ro",
    "ru-ru", "sr-latn-rs", "sk-sk", "sl-si", "es-es", "sv-se", "th-th", "tr-tr", "uk-ua",
    "vi-vn",
];

/// LCID 到语言标签的静态映射（覆盖受支持语言表）。
const LCID_TABLE: &[(u32, &str)] = &[
    (1025, "ar-sa"),
    (1026, "bg-bg"),
    (2052, "zh-cn"),
    (1028, "zh-tw"),
    (1050, "hr-hr"),
    (1029, "cs-cz"),
    (1030, "da-dk"),
    (1043, "nl-nl"),
    (1033, "en-us"),
    (1061, "et-ee"),
    (1035, "fi-fi"),
    (1036, "fr-fr"),
    (1031, "de-de"),
    (1032, "el-gr"),
    (1037, "he-il"),
    (1081, "hi-in"),
    (1038, "hu-hu"),
    (1057, "id-id"),
    (1040, "it-it"),
    (1041, "ja-jp"),
    (1087, "kk-kz"),
    (1042, "ko-kr"),
    (1062, "lv-lv"),
    (1063, "lt-lt"),
    (1086, "ms-my"),
    (1044, "nb-no"),
    (1045, "pl-pl"),
    (1046, "pt-br"),
    (2070, "pt-pt"),
    (1048, "ro-ro"),
    (1049, "ru-ru"),
    (9242, "sr-latn-rs"),
    (1051, "sk-sk"),
    (1060, "sl-si"),
    (3082, "es-es"),
    (1053, "sv-se"),
    (1054, "th-th"),
    (1055, "tr-tr"),
    (1058, "uk-ua"),
    (1066, "vi-vn"),
];

/// 将自由形式语言标签解析为受支持语言表中的条目。
///
/// 规则：
/// 1. 与受支持表做不区分大小写的精确匹配，命中即返回表中条目
/// 2. 否则取 `tag` 首个连字符之前的子串作为前缀，返回表中第一个以该前缀开头
///    （不区分大小写）的条目
/// 3. 均未命中返回 `None`
///
/// 参数：
/// - `tag`：语言标签（如 `fr-FR`、`fr`、`zh`）
///
/// 返回值：
/// - 命中：表中的小写标签
/// - 未命中：`None`
pub fn resolve(tag: &str) -> Option<&'static str> {
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    if let Some(exact) = SUPPORTED_LANGUAGES
        .iter()
        .find(|s| s.eq_ignore_ascii_case(tag))
    {
        return Some(exact);
    }
    let prefix = tag.split('-').next().unwrap_or(tag);
    let prefix_lower = prefix.to_ascii_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|s| s.starts_with(&prefix_lower))
        .copied()
}

/// 将数字区域标识（LCID）解析为受支持语言标签。
///
/// 参数：
/// - `lcid`：Windows 区域标识（如 1033、1036）
///
/// 返回值：
/// - 映射表命中且标签受支持时返回标签，否则 `None`
pub fn resolve_lcid(lcid: u32) -> Option<&'static str> {
    LCID_TABLE
        .iter()
        .find(|(id, _)| *id == lcid)
        .and_then(|(_, tag)| resolve(tag))
}
