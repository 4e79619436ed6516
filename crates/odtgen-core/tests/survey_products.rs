//! 安装勘测与传统回退推导测试：基于内存属性存储构造的 MSI 安装画像。

use odtgen_core::legacy;
use odtgen_core::store::{Hive, MemoryPropertyStore};
use odtgen_core::survey::{survey, Bitness};

const LM: Hive = Hive::LocalMachine;
const SUITE: &str = "SOFTWARE\\Microsoft\\Office\\16.0";
const UNINSTALL: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall";
const UNINSTALL_WOW: &str = "SOFTWARE\\Wow6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall";

const PRIMARY_GUID: &str = "{90160000-0011-0409-1000-0000000FF1CE}";
const VISIO_GUID: &str = "{90160000-0057-0000-1000-0000000FF1CE}";
const PROOFING_GUID: &str = "{90160000-001F-0000-0000-0000000FF1CE}";
const INSTALL_ROOT: &str = "C:\\Program Files\\Microsoft Office\\";

fn add_uninstall_entry(
    s: &mut MemoryPropertyStore,
    root: &str,
    key: &str,
    display_name: &str,
    location: &str,
) {
    let path = format!("{root}\\{key}");
    s.set_string(LM, &path, "DisplayName", display_name);
    s.set_string(LM, &path, "DisplayVersion", "16.0.4266.1001");
    s.set_string(LM, &path, "InstallLocation", location);
}

/// 画像：一套 64 位 MSI 安装（主套件 + Visio），校对工具同时出现在原生与
/// 32 位兼容记录中，另有一条非套件干扰条目。
fn msi_store() -> MemoryPropertyStore {
    let mut s = MemoryPropertyStore::new();
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
        "PROCESSOR_ARCHITECTURE",
        "AMD64",
    );
    s.add_key(LM, &format!("{SUITE}\\Common\\Config\\{PRIMARY_GUID}"));
    s.set_string(LM, &format!("{SUITE}\\Common\\InstallRoot"), "Path", INSTALL_ROOT);

    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        PRIMARY_GUID,
        "Microsoft Office Professional Plus 2016",
        INSTALL_ROOT,
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        VISIO_GUID,
        "Microsoft Office Visio Professional 2016",
        INSTALL_ROOT,
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        PROOFING_GUID,
        "Microsoft Office Proofing Tools 2016",
        INSTALL_ROOT,
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL_WOW,
        PROOFING_GUID,
        "Microsoft Office Proofing Tools 2016",
        INSTALL_ROOT,
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        "Chrome",
        "Google Chrome",
        "C:\\Program Files\\Google\\Chrome\\",
    );
    s
}

#[test]
fn survey_filters_marks_primary_and_deduplicates() {
    let s = msi_store();
    let products = survey(&s, true).expect("survey");

    // 干扰条目被过滤；校对工具跨两个记录根折叠为一条
    assert_eq!(products.len(), 3);
    assert!(!products.iter().any(|p| p.display_name.contains("Chrome")));
    assert_eq!(
        products
            .iter()
            .filter(|p| p.display_name.contains("Proofing"))
            .count(),
        1
    );

    // 恰好一个主产品，且为命中配置集的主套件
    let primaries: Vec<_> = products.iter().filter(|p| p.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(
        primaries[0].display_name,
        "Microsoft Office Professional Plus 2016"
    );
    assert_eq!(primaries[0].bitness, Bitness::X64);

    // 校对工具 GUID 特征位为 32 位
    let proofing = products
        .iter()
        .find(|p| p.display_name.contains("Proofing"))
        .expect("proofing entry");
    assert_eq!(proofing.bitness, Bitness::X86);
    assert!(!proofing.streaming_install);
}

#[test]
fn primary_marking_prefers_config_id_rule_over_scan_order() {
    let streaming_path = "C:\\Program Files\\Microsoft Office\\root";
    let msi_root = "C:\\Program Files\\MSI Office\\";

    let mut s = MemoryPropertyStore::new();
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
        "PROCESSOR_ARCHITECTURE",
        "AMD64",
    );
    s.add_key(LM, &format!("{SUITE}\\Common\\Config\\{PRIMARY_GUID}"));
    s.set_string(LM, &format!("{SUITE}\\Common\\InstallRoot"), "Path", msi_root);
    s.set_string(LM, &format!("{SUITE}\\ClickToRun"), "InstallPath", streaming_path);

    // 流式条目先于命中配置集的条目被枚举
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        "O365ProPlusRetail - en-us",
        "Microsoft Office 365 ProPlus - en-us",
        streaming_path,
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        PRIMARY_GUID,
        "Microsoft Office Professional Plus 2016",
        msi_root,
    );

    let products = survey(&s, true).expect("survey");
    let primaries: Vec<_> = products.iter().filter(|p| p.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    // 组件 ID 命中配置集的规则优先于流式路径规则，与枚举顺序无关
    assert_eq!(primaries[0].component_id, PRIMARY_GUID);
}

#[test]
fn survey_primary_only_mode_returns_single_entry() {
    let s = msi_store();
    let products = survey(&s, false).expect("survey");
    assert_eq!(products.len(), 1);
    assert!(products[0].is_primary);
}

#[test]
fn empty_install_location_falls_back_to_package_name() {
    let mut s = msi_store();
    s.set_string(
        LM,
        &format!("{SUITE}\\Common\\InstalledPackages\\{{AAAA1111-0000-0000-0000-000000000000}}"),
        "",
        "Office 16 Click-to-Run Extensibility Component",
    );
    add_uninstall_entry(
        &mut s,
        UNINSTALL,
        "ExtensibilityComponent",
        "Office 16 Click-to-Run Extensibility Component",
        "",
    );

    let products = survey(&s, true).expect("survey");
    let entry = products
        .iter()
        .find(|p| p.display_name.contains("Extensibility"))
        .expect("package-name fallback entry");
    // 身份安装路径借用首个已收集安装根
    assert!(entry.install_path.eq_ignore_ascii_case(INSTALL_ROOT));
}

#[test]
fn legacy_derive_appends_addons_and_uses_primary_platform() {
    let s = msi_store();
    let products = survey(&s, true).expect("survey");
    let cfg = legacy::derive(&s, &products).expect("derive");

    assert_eq!(
        cfg.product_ids,
        vec!["O365ProPlusRetail".to_string(), "VisioProRetail".to_string()]
    );
    assert_eq!(cfg.platform, Bitness::X64);
    // 主产品组件 GUID 第三段 0409 → en-us
    assert_eq!(cfg.primary_culture.as_deref(), Some("en-us"));
    assert!(cfg.install_root_present);
}

#[test]
fn legacy_derive_defaults_when_nothing_surveyed() {
    let mut s = MemoryPropertyStore::new();
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
        "PROCESSOR_ARCHITECTURE",
        "x86",
    );
    let cfg = legacy::derive(&s, &[]).expect("derive");
    assert_eq!(cfg.product_ids, vec!["O365ProPlusRetail".to_string()]);
    assert_eq!(cfg.platform, Bitness::X86);
    assert!(cfg.primary_culture.is_none());
    assert!(!cfg.install_root_present);
}
