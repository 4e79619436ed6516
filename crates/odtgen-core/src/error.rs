//! 核心错误分类。
//!
//! 说明：
//! - 只有两类运行期失败会中止单台主机的生成流程：主机不可达、主语言无法解析
//! - `MissingConfigurationRoot` 属于调用契约被破坏（在根/Add 元素存在之前执行子级
//!   upsert），应当在开发期立即暴露，而不是运行期兜底
//! - 属性存储读取到“不存在”不是错误（见 [`crate::store::PropertyStore`]）
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use thiserror::Error;

/// 配置生成过程中的致命错误。
#[derive(Debug, Error)]
pub enum GenerateError {
    /// 目标主机的属性存储不可达（连接/凭据失败）。
    ///
    /// 影响范围：
    /// - 该主机的整次生成流程终止；批处理会继续处理剩余主机。
    #[error("主机不可达: {host}: {message}")]
    HostUnreachable {
        /// 目标主机名（本机为 `.`）。
        host: String,
        /// 底层失败描述。
        message: String,
    },

    /// 无法为该主机解析出任何受支持的主语言。
    ///
    /// 触发条件：
    /// - 操作系统区域既不在受支持语言表中，也没有任何可用的回退来源。
    #[error("无法解析主语言：操作系统区域不在受支持语言表中")]
    UnresolvableLanguage,

    /// 在根/Add 元素尚不存在时执行了子级 upsert（程序契约错误）。
    #[error("配置文档缺少 {0} 元素，upsert 顺序错误")]
    MissingConfigurationRoot(&'static str),
}
