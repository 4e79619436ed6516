//! 配置文档合成器：内存配置树与幂等 upsert 操作。
//!
//! 结构：
//! - `Configuration → Add[0..1] → Product[0..n] → {Language, ExcludeApp}`，
//!   另有可选的 `Configuration → Updates`
//! - 同级节点身份为其 `ID` 属性；对已有身份执行 upsert 会合并属性、并集子级，
//!   而不是重复插入
//!
//! 约定：
//! - 属性值未设置时整体省略该属性，不输出空字符串
//! - 在根/Add 元素存在之前执行子级 upsert 属于调用契约错误，立即失败
//!
//! 作者：Office 部署配置生成器项目组（自动生成）
//! 创建时间：2026-08-30
//! 修改时间：2026-08-30

use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::GenerateError;

/// 配置树节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// 元素名。
    pub name: String,
    attrs: Vec<(String, String)>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 读取属性值。
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 设置属性（存在则覆盖）。
    fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// 移除属性（不存在则忽略）。
    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// 子级 upsert：按元素名与 `ID` 属性定位，不存在则插入。
    fn upsert_child(&mut self, name: &str, id: Option<&str>) -> &mut ConfigNode {
        let pos = self.children.iter().position(|c| {
            c.name.eq_ignore_ascii_case(name)
                && match id {
                    Some(id) => c
                        .attr("ID")
                        .map(|v| v.eq_ignore_ascii_case(id))
                        .unwrap_or(false),
                    None => true,
                }
        });
        let idx = match pos {
            Some(i) => i,
            None => {
                let mut node = ConfigNode::new(name);
                if let Some(id) = id {
                    node.set_attr("ID", id);
                }
                self.children.push(node);
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.children
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// 按名称迭代子级。
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.children
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(name))
    }
}

/// 部署工具配置文档（单次运行内构建并序列化，无持久状态）。
#[derive(Debug, Clone, Default)]
pub struct ConfigurationDocument {
    root: Option<ConfigNode>,
}

impl ConfigurationDocument {
    /// 创建空文档。
    pub fn new() -> Self {
        Self::default()
    }

    /// 确保根元素存在（幂等）。
    pub fn ensure_configuration(&mut self) {
        if self.root.is_none() {
            self.root = Some(ConfigNode::new("Configuration"));
        }
    }

    /// 确保 `Add` 元素存在并设置/清除其属性（幂等）。
    ///
    /// 参数：
    /// - `version`：`Some(v)` 设置 `Version`；`None` 移除该属性
    /// - `edition`：`Some("32"/"64")` 设置 `OfficeClientEdition`；`None` 移除
    ///
    /// 异常处理：
    /// - 根元素不存在时返回 [`GenerateError::MissingConfigurationRoot`]
    pub fn ensure_add(&mut self, version: Option<&str>, edition: Option<&str>) -> Result<()> {
        let root = self
            .root
            .as_mut()
            .ok_or(GenerateError::MissingConfigurationRoot("Configuration"))?;
        let add = root.upsert_child("Add", None);
        match version {
            Some(v) if !v.trim().is_empty() => add.set_attr("Version", v),
            _ => add.remove_attr("Version"),
        }
        match edition {
            Some(v) if !v.trim().is_empty() => add.set_attr("OfficeClientEdition", v),
            _ => add.remove_attr("OfficeClientEdition"),
        }
        Ok(())
    }

    /// 设置 `Add` 元素的 `SourcePath` 属性。
    pub fn upsert_add_source_path(&mut self, path: &str) -> Result<()> {
        let add = self.add_mut()?;
        if path.trim().is_empty() {
            add.remove_attr("SourcePath");
        } else {
            add.set_attr("SourcePath", path);
        }
        Ok(())
    }

    /// 按 ID upsert `Product` 元素（幂等）。
    pub fn upsert_product(&mut self, id: &str) -> Result<()> {
        self.add_mut()?.upsert_child("Product", Some(id));
        Ok(())
    }

    /// 在指定产品下按 ID upsert `Language` 元素（存储为小写标签，幂等）。
    pub fn upsert_language(&mut self, product_id: &str, tag: &str) -> Result<()> {
        let product = self.product_mut(product_id)?;
        product.upsert_child("Language", Some(&tag.to_lowercase()));
        Ok(())
    }

    /// 在指定产品下按 ID upsert `ExcludeApp` 元素（幂等）。
    pub fn upsert_exclude_app(&mut self, product_id: &str, app: &str) -> Result<()> {
        let product = self.product_mut(product_id)?;
        product.upsert_child("ExcludeApp", Some(app));
        Ok(())
    }

    /// upsert `Updates` 元素的各属性。
    ///
    /// 参数语义（对每个属性独立生效）：
    /// - `None`：保持原样
    /// - `Some("")`（或全空白）：显式移除该属性
    /// - `Some(v)`：设置为 `v`
    pub fn upsert_updates(
        &mut self,
        enabled: Option<&str>,
        update_path: Option<&str>,
        target_version: Option<&str>,
        deadline: Option<&str>,
    ) -> Result<()> {
        let root = self
            .root
            .as_mut()
            .ok_or(GenerateError::MissingConfigurationRoot("Configuration"))?;
        let updates = root.upsert_child("Updates", None);
        for (name, value) in [
            ("Enabled", enabled),
            ("UpdatePath", update_path),
            ("TargetVersion", target_version),
            ("Deadline", deadline),
        ] {
            match value {
                None => {}
                Some(v) if v.trim().is_empty() => updates.remove_attr(name),
                Some(v) => updates.set_attr(name, v),
            }
        }
        Ok(())
    }

    /// 文档中全部产品 ID（`Configuration → Add → Product` 的 `ID` 属性）。
    pub fn product_ids(&self) -> Vec<String> {
        self.root
            .as_ref()
            .and_then(|r| r.child("Add"))
            .map(|add| {
                add.children_named("Product")
                    .filter_map(|p| p.attr("ID"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `Add` 元素的平台属性（`OfficeClientEdition`）。
    pub fn platform(&self) -> Option<String> {
        self.root
            .as_ref()
            .and_then(|r| r.child("Add"))
            .and_then(|add| add.attr("OfficeClientEdition"))
            .map(str::to_string)
    }

    /// 指定产品下全部 `Language` 的 ID 列表（测试与校验用）。
    pub fn product_languages(&self, product_id: &str) -> Vec<String> {
        self.product(product_id)
            .map(|p| {
                p.children_named("Language")
                    .filter_map(|l| l.attr("ID"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 指定产品下全部 `ExcludeApp` 的 ID 列表（测试与校验用）。
    pub fn product_exclude_apps(&self, product_id: &str) -> Vec<String> {
        self.product(product_id)
            .map(|p| {
                p.children_named("ExcludeApp")
                    .filter_map(|l| l.attr("ID"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn product(&self, product_id: &str) -> Option<&ConfigNode> {
        self.root
            .as_ref()
            .and_then(|r| r.child("Add"))
            .and_then(|add| {
                add.children_named("Product").find(|p| {
                    p.attr("ID")
                        .map(|v| v.eq_ignore_ascii_case(product_id))
                        .unwrap_or(false)
                })
            })
    }

    fn add_mut(&mut self) -> Result<&mut ConfigNode> {
        self.root
            .as_mut()
            .ok_or(GenerateError::MissingConfigurationRoot("Configuration"))?
            .child_mut("Add")
            .ok_or_else(|| GenerateError::MissingConfigurationRoot("Add").into())
    }

    fn product_mut(&mut self, product_id: &str) -> Result<&mut ConfigNode> {
        let add = self.add_mut()?;
        add.children
            .iter_mut()
            .find(|c| {
                c.name.eq_ignore_ascii_case("Product")
                    && c.attr("ID")
                        .map(|v| v.eq_ignore_ascii_case(product_id))
                        .unwrap_or(false)
            })
            .ok_or_else(|| GenerateError::MissingConfigurationRoot("Product").into())
    }

    /// 序列化为缩进文本（2 空格缩进，无 XML 声明）。
    ///
    /// 异常处理：
    /// - 根元素不存在时返回 [`GenerateError::MissingConfigurationRoot`]
    pub fn render(&self) -> Result<String> {
        let root = self
            .root
            .as_ref()
            .ok_or(GenerateError::MissingConfigurationRoot("Configuration"))?;
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_node(&mut writer, root).context("序列化配置文档失败")?;
        let bytes = writer.into_inner();
        String::from_utf8(bytes).context("配置文档不是合法 UTF-8")
    }

    /// 从调用方提供的默认配置文本加载文档。
    ///
    /// 异常处理：
    /// - 文本不是结构良好的 XML 时返回错误
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut stack: Vec<ConfigNode> = Vec::new();
        let mut root: Option<ConfigNode> = None;

        loop {
            match reader.read_event().context("解析默认配置文档失败")? {
                Event::Start(e) => stack.push(node_from_start(&e)?),
                Event::Empty(e) => {
                    let node = node_from_start(&e)?;
                    attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    let node = stack.pop().context("默认配置文档元素不匹配")?;
                    attach(&mut stack, &mut root, node);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(Self { root })
    }
}

/// 将完成的节点挂接到父节点或作为根。
fn attach(stack: &mut Vec<ConfigNode>, root: &mut Option<ConfigNode>, node: ConfigNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// 从开始标签事件构建节点（名称与属性）。
fn node_from_start(e: &BytesStart<'_>) -> Result<ConfigNode> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut node = ConfigNode::new(&name);
    for attr in e.attributes() {
        let attr = attr.context("解析属性失败")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().context("解码属性值失败")?.to_string();
        node.attrs.push((key, value));
    }
    Ok(node)
}

/// 递归写出节点（无子级时输出自闭合标签）。
fn write_node(writer: &mut Writer<Vec<u8>>, node: &ConfigNode) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(&node.name);
    for (k, v) in &node.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &node.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(&node.name)))?;
    }
    Ok(())
}
