//! 端到端流水线测试：内存属性存储 → 生成配置文档。

use odtgen_core::catalog::EXCLUDABLE_APPS_STREAMING;
use odtgen_core::config::ConfigurationDocument;
use odtgen_core::generate::{generate, GenerateOptions};
use odtgen_core::languages::LanguagePolicy;
use odtgen_core::store::{Hive, MemoryPropertyStore};

const LM: Hive = Hive::LocalMachine;
const C2R: &str = "SOFTWARE\\Microsoft\\Office\\ClickToRun";

/// 基础环境：64 位系统、系统语言 en-us。
fn base_store() -> MemoryPropertyStore {
    let mut s = MemoryPropertyStore::new();
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
        "PROCESSOR_ARCHITECTURE",
        "AMD64",
    );
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Nls\\Language",
        "InstallLanguage",
        "0409",
    );
    s
}

/// 在存储中布置一个流式运行时。
fn add_streaming_runtime(s: &mut MemoryPropertyStore, platform: &str, culture: &str, ids: &str) {
    s.set_string(LM, C2R, "InstallPath", "C:\\Program Files\\Microsoft Office");
    let cfg = format!("{C2R}\\Configuration");
    s.set_string(LM, &cfg, "Platform", platform);
    s.set_string(LM, &cfg, "ClientCulture", culture);
    s.set_string(LM, &cfg, "ProductReleaseIds", ids);
    s.set_string(LM, &cfg, "VersionToReport", "16.0.10325.20118");
}

#[test]
fn streaming_x86_with_empty_xnone_excludes_every_catalog_app() {
    let mut s = base_store();
    add_streaming_runtime(&mut s, "x86", "en-us", "O365ProPlusRetail");
    // x-none 子树存在但没有任何已装应用 ID
    s.add_key(LM, &format!("{C2R}\\ProductReleaseIDs\\Active\\O365ProPlusRetail\\x-none"));

    let result = generate(&s, ".", &GenerateOptions::default()).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");

    assert_eq!(doc.platform().as_deref(), Some("32"));
    assert_eq!(doc.product_ids(), vec!["O365ProPlusRetail".to_string()]);
    let excluded = doc.product_exclude_apps("O365ProPlusRetail");
    for app in EXCLUDABLE_APPS_STREAMING {
        assert!(excluded.iter().any(|e| e == app), "缺少排除项 {app}");
    }
}

#[test]
fn streaming_installed_app_ids_suppress_exclusion() {
    let mut s = base_store();
    add_streaming_runtime(&mut s, "x64", "en-us", "O365ProPlusRetail");
    let xnone = format!("{C2R}\\ProductReleaseIDs\\Active\\O365ProPlusRetail\\x-none");
    s.add_key(LM, &format!("{xnone}\\Word.16"));
    s.add_key(LM, &format!("{xnone}\\Excel.16"));

    let result = generate(&s, ".", &GenerateOptions::default()).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");

    let excluded = doc.product_exclude_apps("O365ProPlusRetail");
    assert!(!excluded.iter().any(|e| e == "Word"));
    assert!(!excluded.iter().any(|e| e == "Excel"));
    assert!(excluded.iter().any(|e| e == "PowerPoint"));
}

#[test]
fn os_language_only_yields_single_language_node() {
    let mut s = MemoryPropertyStore::new();
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
        "PROCESSOR_ARCHITECTURE",
        "AMD64",
    );
    // 法语区域（LCID 0x040C = 1036）
    s.set_string(
        LM,
        "SYSTEM\\CurrentControlSet\\Control\\Nls\\Language",
        "InstallLanguage",
        "040C",
    );
    add_streaming_runtime(&mut s, "x64", "fr-fr", "O365ProPlusRetail");

    let options = GenerateOptions {
        policy: LanguagePolicy::OsLanguage,
        ..Default::default()
    };
    let result = generate(&s, ".", &options).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");

    assert_eq!(
        doc.product_languages("O365ProPlusRetail"),
        vec!["fr-fr".to_string()]
    );
    assert_eq!(result.languages, vec!["fr-fr".to_string()]);
}

#[test]
fn default_document_is_borrowed_when_nothing_detected() {
    let s = base_store();
    let default_xml = r#"<Configuration>
  <Add OfficeClientEdition="64">
    <Product ID="A"/>
    <Product ID="B"/>
  </Add>
</Configuration>"#;

    let options = GenerateOptions {
        default_config_xml: Some(default_xml.to_string()),
        ..Default::default()
    };
    let result = generate(&s, ".", &options).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");

    assert_eq!(doc.platform().as_deref(), Some("64"));
    assert_eq!(doc.product_ids(), vec!["A".to_string(), "B".to_string()]);
    // 借用结构后语言 upsert 照常进行
    assert_eq!(doc.product_languages("A"), vec!["en-us".to_string()]);
    assert_eq!(doc.product_languages("B"), vec!["en-us".to_string()]);
}

#[test]
fn legacy_install_root_presence_suppresses_default_document() {
    let mut s = base_store();
    // 有安装根路径但没有任何可归并的已安装应用记录
    s.set_string(
        LM,
        "SOFTWARE\\Microsoft\\Office\\16.0\\Common\\InstallRoot",
        "Path",
        "C:\\Program Files\\Microsoft Office\\",
    );

    let options = GenerateOptions {
        default_config_xml: Some(
            r#"<Configuration><Add OfficeClientEdition="32"><Product ID="A"/></Add></Configuration>"#
                .to_string(),
        ),
        ..Default::default()
    };
    let result = generate(&s, ".", &options).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");

    // 走传统推导路径而非默认文档回退
    assert_eq!(doc.product_ids(), vec!["O365ProPlusRetail".to_string()]);
    assert_eq!(doc.platform().as_deref(), Some("64"));
}

#[test]
fn streaming_update_policy_is_mirrored_into_updates_element() {
    let mut s = base_store();
    add_streaming_runtime(&mut s, "x64", "en-us", "O365ProPlusRetail");
    let cfg = format!("{C2R}\\Configuration");
    s.set_string(LM, &cfg, "UpdatesEnabled", "True");
    s.set_string(LM, &cfg, "UpdateUrl", "\\\\srv\\office\\updates");

    let options = GenerateOptions {
        mirror_update_source: true,
        ..Default::default()
    };
    let result = generate(&s, ".", &options).expect("generate");

    assert!(result.xml.contains("Enabled=\"TRUE\""));
    assert!(result.xml.contains("UpdatePath=\"\\\\srv\\office\\updates\""));
    assert!(result.xml.contains("SourcePath=\"\\\\srv\\office\\updates\""));
    assert!(result.xml.contains("Version=\"16.0.10325.20118\""));
}

#[test]
fn empty_release_ids_are_rebuilt_from_active_subtree() {
    let mut s = base_store();
    s.set_string(LM, C2R, "InstallPath", "C:\\Program Files\\Microsoft Office");
    let cfg = format!("{C2R}\\Configuration");
    s.set_string(LM, &cfg, "Platform", "x64");
    s.set_string(LM, &cfg, "ClientCulture", "en-us");
    s.set_string(LM, &cfg, "ProductReleaseIds", "");
    // 活动发布子树含两个产品与两个保留哨兵
    let active = format!("{C2R}\\ProductReleaseIDs\\Active");
    s.add_key(LM, &format!("{active}\\O365ProPlusRetail"));
    s.add_key(LM, &format!("{active}\\VisioProRetail"));
    s.add_key(LM, &format!("{active}\\stream"));
    s.add_key(LM, &format!("{active}\\culture"));

    let result = generate(&s, ".", &GenerateOptions::default()).expect("generate");
    let doc = ConfigurationDocument::from_xml(&result.xml).expect("parse output");
    assert_eq!(
        doc.product_ids(),
        vec!["O365ProPlusRetail".to_string(), "VisioProRetail".to_string()]
    );
}
