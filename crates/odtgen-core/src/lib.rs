//! Office 部署配置生成核心库（平台无关）。
//!
//! 功能：
//! - 定义宿主属性存储（注册表式键值树）的只读访问边界与内存实现
//! - 扫描传统安装记录与流式（Click-to-Run）运行时配置，归并为统一安装状态
//! - 按策略聚合主语言与附加语言集合
//! - 构建并序列化部署工具配置文档（Configuration/Add/Product/Language/ExcludeApp/Updates）
//!
//! 约定：
//! - 本库不执行任何安装/卸载动作，也不做网络访问；唯一 IO 边界是 [`store::PropertyStore`]
//! - 属性存储中“键/值不存在”一律以 `Ok(None)` 表达，属于正常分支而非错误
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

pub mod catalog;
pub mod config;
pub mod error;
pub mod generate;
pub mod languages;
pub mod legacy;
pub mod locale;
pub mod ordered;
pub mod store;
pub mod streaming;
pub mod survey;
