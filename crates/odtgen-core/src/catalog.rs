//! 全局静态目录（套件根路径、品牌标记、可排除应用目录、产品目录）。
//!
//! 说明：
//! - 所有表均为进程启动即固定的不可变常量，不存在运行期可变共享状态
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

/// 套件根路径（含 32 位在 64 位系统上的重定向副本），按固定声明顺序扫描。
pub const SUITE_ROOTS: &[&str] = &[
    "SOFTWARE\\Microsoft\\Office",
    "SOFTWARE\\Wow6432Node\\Microsoft\\Office",
];

/// 流式运行时候选配置根，按固定顺序探测；第一个 `InstallPath` 非空者生效。
pub const STREAMING_ROOTS: &[&str] = &[
    "SOFTWARE\\Microsoft\\Office\\ClickToRun",
    "SOFTWARE\\Microsoft\\Office\\15.0\\ClickToRun",
    "SOFTWARE\\Wow6432Node\\Microsoft\\Office\\ClickToRun",
    "SOFTWARE\\Wow6432Node\\Microsoft\\Office\\15.0\\ClickToRun",
];

/// 套件品牌标记（显示名包含该标记才可能被识别为主产品）。
pub const BRAND_MARKER: &str = "Microsoft Office";

/// 流式安装场景下的可排除应用目录。
pub const EXCLUDABLE_APPS_STREAMING: &[&str] = &[
    "Access",
    "Excel",
    "Groove",
    "Lync",
    "OneDrive",
    "OneNote",
    "Outlook",
    "PowerPoint",
    "Publisher",
    "Word",
];

/// 传统安装场景下的可排除应用目录（比流式目录少 OneDrive 一项：该应用只能
/// 通过流式注册 ID 被检出）。
pub const EXCLUDABLE_APPS_LEGACY: &[&str] = &[
    "Access",
    "Excel",
    "Groove",
    "Lync",
    "OneNote",
    "Outlook",
    "PowerPoint",
    "Publisher",
    "Word",
];

/// 未识别出可区分主产品时使用的默认零售目录产品 ID。
pub const DEFAULT_PRODUCT_ID: &str = "O365ProPlusRetail";

/// 附加产品名称关键字到目录产品 ID 的映射（显示名需同时含品牌标记）。
pub const ADDON_PRODUCTS: &[(&str, &str)] = &[
    ("Visio", "VisioProRetail"),
    ("Project", "ProjectProRetail"),
    ("SharePoint Designer", "SPDRetail"),
];

/// 产品发布 ID 重建时需要跳过的保留哨兵子键名。
pub const RELEASE_ID_SENTINELS: &[&str] = &["stream", "culture"];

/// 中性语言哨兵（按产品枚举语言子键时排除）。
pub const NEUTRAL_CULTURE: &str = "x-none";
