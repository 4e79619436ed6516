//! Windows 平台属性存储实现（本机/远程注册表）。
//!
//! 目标：
//! - 将 Win32 注册表访问集中封装为核心库的 [`odtgen_core::store::PropertyStore`]
//!   实现，上层业务代码不直接依赖 Win32 细节
//! - 统一错误处理风格（以 `anyhow::Result` 形式向上返回；连接失败映射为
//!   [`odtgen_core::error::GenerateError::HostUnreachable`]）
//!
//! 权限要求：
//! - 读取大多数系统键通常不需要管理员，但某些机器策略可能限制
//! - 远程访问要求目标主机开启远程注册表服务，且当前会话具备访问凭据
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

#[cfg(windows)]
pub mod store;

#[cfg(windows)]
pub use store::RegistryPropertyStore;
