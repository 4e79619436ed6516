//! 基于 winreg 的属性存储实现。
//!
//! 约定：
//! - 键/值不存在（以及个别配置单元的访问被拒绝）一律映射为“缺失”，
//!   按核心约定返回 `Ok(None)`/空序列
//! - 只有连接远程主机失败才是该主机的致命错误
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use std::io;

use anyhow::{Context, Result};
use tracing::debug;
use windows::core::HSTRING;
use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::System::Registry::{
    RegConnectRegistryW, HKEY, HKEY_LOCAL_MACHINE, HKEY_USERS,
};
use winreg::enums::KEY_READ;
use winreg::RegKey;

use odtgen_core::error::GenerateError;
use odtgen_core::store::{Hive, PropertyStore};

/// 真实注册表属性存储（目标主机与凭据在构造时绑定）。
pub struct RegistryPropertyStore {
    host: String,
    machine: RegKey,
    users: RegKey,
}

impl RegistryPropertyStore {
    /// 以显式根键构造（测试可传入 HKCU 下的隔离键作为根）。
    pub fn with_roots(host: &str, machine: RegKey, users: RegKey) -> Self {
        Self {
            host: host.to_string(),
            machine,
            users,
        }
    }

    /// 绑定本机。
    pub fn local() -> Self {
        Self::with_roots(
            ".",
            RegKey::predef(winreg::enums::HKEY_LOCAL_MACHINE),
            RegKey::predef(winreg::enums::HKEY_USERS),
        )
    }

    /// 绑定目标主机（`.`/`localhost` 视为本机，否则连接远程注册表）。
    ///
    /// 异常处理：
    /// - 连接失败（连通性/凭据/远程注册表服务未启动）返回
    ///   [`GenerateError::HostUnreachable`]，携带主机名
    pub fn connect(host: &str) -> Result<Self> {
        if host == "." || host.eq_ignore_ascii_case("localhost") {
            return Ok(Self::local());
        }
        let machine = connect_remote_hive(host, HKEY_LOCAL_MACHINE)?;
        let users = connect_remote_hive(host, HKEY_USERS)?;
        Ok(Self::with_roots(host, machine, users))
    }

    fn root(&self, hive: Hive) -> &RegKey {
        match hive {
            Hive::LocalMachine => &self.machine,
            Hive::Users => &self.users,
        }
    }

    /// 打开子键；不存在或被拒绝访问的个别键按缺失处理。
    fn open(&self, hive: Hive, path: &str) -> Result<Option<RegKey>> {
        match self.root(hive).open_subkey_with_flags(path, KEY_READ) {
            Ok(key) => Ok(Some(key)),
            Err(e)
                if e.kind() == io::ErrorKind::NotFound
                    || e.kind() == io::ErrorKind::PermissionDenied =>
            {
                if e.kind() == io::ErrorKind::PermissionDenied {
                    debug!("访问被拒绝，按缺失处理: {path}");
                }
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("打开注册表键失败: {}: {path}", self.host)),
        }
    }

    fn read_value<T: winreg::types::FromRegValue>(
        &self,
        hive: Hive,
        path: &str,
        name: &str,
    ) -> Result<Option<T>> {
        let Some(key) = self.open(hive, path)? else {
            return Ok(None);
        };
        match key.get_value::<T, _>(name) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("读取注册表值失败: {}: {path}\\{name}", self.host))
            }
        }
    }
}

impl PropertyStore for RegistryPropertyStore {
    fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>> {
        let Some(key) = self.open(hive, path)? else {
            return Ok(Vec::new());
        };
        let mut names = Vec::new();
        for name in key.enum_keys() {
            names.push(name.with_context(|| format!("枚举子键失败: {}: {path}", self.host))?);
        }
        Ok(names)
    }

    fn read_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>> {
        self.read_value::<String>(hive, path, name)
    }

    fn read_multi_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<Vec<String>>> {
        self.read_value::<Vec<String>>(hive, path, name)
    }

    fn read_u32(&self, hive: Hive, path: &str, name: &str) -> Result<Option<u32>> {
        self.read_value::<u32>(hive, path, name)
    }
}

/// 连接远程主机的指定预定义根键。
fn connect_remote_hive(host: &str, predef: HKEY) -> Result<RegKey> {
    let machine_name = HSTRING::from(format!("\\\\{host}"));
    let mut remote = HKEY::default();
    let status = unsafe { RegConnectRegistryW(&machine_name, predef, &mut remote) };
    if status != ERROR_SUCCESS {
        return Err(GenerateError::HostUnreachable {
            host: host.to_string(),
            message: format!("RegConnectRegistryW 失败，错误码 {}", status.0),
        }
        .into());
    }
    Ok(RegKey::predef(remote.0 as winreg::HKEY))
}
