//! 插入有序、不区分大小写去重的字符串集合。
//!
//! 背景：
//! - 扫描/聚合逻辑中大量出现“若不存在则追加”的模式，且输出顺序会直接影响
//!   最终文档内容；这里用显式抽象替代散落的 contains+push
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

/// 插入有序唯一集合。
///
/// 特性：
/// - 成员唯一性按不区分 ASCII 大小写判定，保留首次插入的原始写法与位置
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    items: Vec<String>,
}

impl OrderedSet {
    /// 创建空集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加成员（已存在则忽略）。
    ///
    /// 返回值：
    /// - `true`：实际发生了插入
    pub fn insert(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.items.push(value.to_string());
        true
    }

    /// 判断成员是否存在（不区分大小写）。
    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// 移除成员（不区分大小写），不存在则忽略。
    pub fn remove(&mut self, value: &str) {
        self.items.retain(|v| !v.eq_ignore_ascii_case(value));
    }

    /// 成员数量。
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按插入顺序迭代。
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// 转为有序 `Vec<String>`。
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    /// 以切片访问成员。
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl<'a> FromIterator<&'a str> for OrderedSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = Self::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}
