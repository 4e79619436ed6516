//! 宿主属性存储（注册表式键值树）只读访问边界。
//!
//! 目标：
//! - 将真实注册表访问（本机/远程）隔离在 `odtgen-windows`，核心逻辑只面向本
//!   trait，便于在任意平台上以内存实现进行测试
//! - 统一“不存在”的表达：键或值缺失一律返回 `Ok(None)`（或空序列），调用方把
//!   缺失当作正常分支处理；只有连接类失败才以错误形式上抛
//!
//! 约定：
//! - 路径分隔符使用反斜杠（`SOFTWARE\Microsoft\Office`），与注册表一致
//! - 路径与值名的比较均不区分大小写
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::Result;

/// 众所周知的层级根（机器范围/用户范围）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    /// 机器范围（HKEY_LOCAL_MACHINE）。
    LocalMachine,
    /// 用户范围（HKEY_USERS，子键为各用户配置单元）。
    Users,
}

/// 属性存储只读访问接口。
///
/// 说明：
/// - 目标主机与凭据在实现构造时绑定，而非逐调用传入
/// - 所有操作为阻塞同步调用；超时策略由实现方负责
pub trait PropertyStore {
    /// 枚举指定路径下的直接子键名（有序）。
    ///
    /// 返回值：
    /// - 键不存在时返回空序列，不报错。
    fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>>;

    /// 读取字符串值。
    ///
    /// 参数：
    /// - `name`：值名；空字符串表示键的默认值
    ///
    /// 返回值：
    /// - 键或值不存在时返回 `Ok(None)`。
    fn read_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>>;

    /// 读取多字符串值（REG_MULTI_SZ）。
    fn read_multi_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<Vec<String>>>;

    /// 读取 32 位无符号整数值（REG_DWORD）。
    fn read_u32(&self, hive: Hive, path: &str, name: &str) -> Result<Option<u32>>;
}

/// 内存属性存储（测试与跨平台开发用）。
///
/// 特性：
/// - 子键枚举顺序等于首次写入顺序，便于测试对“枚举顺序敏感”的扫描逻辑
/// - 写入值时会自动登记所属键；中间层级无需显式登记，枚举时按路径前缀推导
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    keys: Vec<(Hive, String)>,
    strings: Vec<(Hive, String, String, String)>,
    multis: Vec<(Hive, String, String, Vec<String>)>,
    dwords: Vec<(Hive, String, String, u32)>,
}

impl MemoryPropertyStore {
    /// 创建空存储。
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个键（无值也可参与子键枚举）。
    pub fn add_key(&mut self, hive: Hive, path: &str) {
        if !self
            .keys
            .iter()
            .any(|(h, p)| *h == hive && p.eq_ignore_ascii_case(path))
        {
            self.keys.push((hive, path.to_string()));
        }
    }

    /// 写入字符串值（自动登记键）。
    pub fn set_string(&mut self, hive: Hive, path: &str, name: &str, value: &str) {
        self.add_key(hive, path);
        self.strings
            .push((hive, path.to_string(), name.to_string(), value.to_string()));
    }

    /// 写入多字符串值（自动登记键）。
    pub fn set_multi_string(&mut self, hive: Hive, path: &str, name: &str, values: &[&str]) {
        self.add_key(hive, path);
        self.multis.push((
            hive,
            path.to_string(),
            name.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        ));
    }

    /// 写入 DWORD 值（自动登记键）。
    pub fn set_u32(&mut self, hive: Hive, path: &str, name: &str, value: u32) {
        self.add_key(hive, path);
        self.dwords
            .push((hive, path.to_string(), name.to_string(), value));
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn subkeys(&self, hive: Hive, path: &str) -> Result<Vec<String>> {
        // 空路径表示枚举该根下的顶层键
        let trimmed = path.trim_end_matches('\\');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\\")
        };
        let mut out: Vec<String> = Vec::new();
        for (h, p) in &self.keys {
            if *h != hive || p.len() <= prefix.len() {
                continue;
            }
            if !p[..prefix.len()].eq_ignore_ascii_case(&prefix) {
                continue;
            }
            let rest = &p[prefix.len()..];
            let child = rest.split('\\').next().unwrap_or(rest);
            if child.is_empty() {
                continue;
            }
            if !out.iter().any(|c| c.eq_ignore_ascii_case(child)) {
                out.push(child.to_string());
            }
        }
        Ok(out)
    }

    fn read_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .strings
            .iter()
            .find(|(h, p, n, _)| {
                *h == hive && p.eq_ignore_ascii_case(path) && n.eq_ignore_ascii_case(name)
            })
            .map(|(_, _, _, v)| v.clone()))
    }

    fn read_multi_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .multis
            .iter()
            .find(|(h, p, n, _)| {
                *h == hive && p.eq_ignore_ascii_case(path) && n.eq_ignore_ascii_case(name)
            })
            .map(|(_, _, _, v)| v.clone()))
    }

    fn read_u32(&self, hive: Hive, path: &str, name: &str) -> Result<Option<u32>> {
        Ok(self
            .dwords
            .iter()
            .find(|(h, p, n, _)| {
                *h == hive && p.eq_ignore_ascii_case(path) && n.eq_ignore_ascii_case(name)
            })
            .map(|(_, _, _, v)| *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 验证子键枚举按首次写入顺序返回，且中间层级可被推导。
    fn memory_store_subkeys_keep_insertion_order() {
        let mut store = MemoryPropertyStore::new();
        store.set_string(Hive::LocalMachine, "SOFTWARE\\A\\16.0\\Deep", "x", "1");
        store.set_string(Hive::LocalMachine, "SOFTWARE\\A\\15.0", "x", "1");
        let children = store.subkeys(Hive::LocalMachine, "SOFTWARE\\A").expect("subkeys");
        assert_eq!(children, vec!["16.0".to_string(), "15.0".to_string()]);
    }

    #[test]
    /// 验证缺失的键/值以 `None`/空序列表达而非错误。
    fn memory_store_absence_is_none() {
        let store = MemoryPropertyStore::new();
        assert!(store
            .read_string(Hive::LocalMachine, "SOFTWARE\\Nope", "v")
            .expect("read")
            .is_none());
        assert!(store
            .subkeys(Hive::Users, "S-1-5-21")
            .expect("subkeys")
            .is_empty());
    }

    #[test]
    /// 验证路径与值名比较不区分大小写。
    fn memory_store_lookup_is_case_insensitive() {
        let mut store = MemoryPropertyStore::new();
        store.set_string(Hive::LocalMachine, "Software\\Test", "Name", "v");
        let got = store
            .read_string(Hive::LocalMachine, "SOFTWARE\\TEST", "name")
            .expect("read");
        assert_eq!(got.as_deref(), Some("v"));
    }
}
