//! 资源存储
//!
//! 解码后的归档由两张表组成：以 `Content-Location` 为键的资源表，以及把
//! `Content-ID`（去掉尖括号）映射到位置的标识符表。两张表只在解码时写入，
//! 之后的重写阶段只更新各自资源的 `data`/`content_type`/`is_converted`。

use std::collections::{BTreeMap, HashMap};

use crate::utils::url::BaseUrl;

/// 归档中的一个 MIME 部分
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// 原始 `Content-Location`，同时是资源的唯一键
    pub location: String,
    /// 规范化后的 MIME 类型（去掉了引号和空格，可直接嵌入 data URL）
    pub content_type: String,
    /// 解析资源内部相对引用时使用的基准
    pub base_url: BaseUrl,
    pub data: Vec<u8>,
    /// 入口文档标记
    pub is_initial: bool,
    /// 字符集已转换为 UTF-8
    pub is_converted: bool,
}

impl Resource {
    pub fn new(location: &str, content_type: &str, base_url: BaseUrl, data: Vec<u8>) -> Self {
        Self {
            location: location.to_string(),
            content_type: content_type.to_string(),
            base_url,
            data,
            is_initial: false,
            is_converted: false,
        }
    }

    /// Primary MIME token, without parameters
    pub fn media_type(&self) -> &str {
        media_type_of(&self.content_type)
    }

    pub fn is_html(&self) -> bool {
        has_media_type(&self.content_type, "text/html")
    }

    pub fn is_stylesheet(&self) -> bool {
        has_media_type(&self.content_type, "text/css")
    }
}

/// Returns the part of a content type before the first `;`
pub fn media_type_of(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default()
}

/// 内容类型恰好是 `media_type`，或以 `media_type;` 开头
pub fn has_media_type(content_type: &str, media_type: &str) -> bool {
    match content_type.strip_prefix(media_type) {
        Some(rest) => rest.is_empty() || rest.starts_with(';'),
        None => false,
    }
}

/// 解码后的资源图
#[derive(Clone, Debug, Default)]
pub struct ResourceStore {
    resources: BTreeMap<String, Resource>,
    content_ids: HashMap<String, String>,
    entry_location: Option<String>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入资源；相同位置的旧资源被覆盖并返回
    ///
    /// 覆盖入口位置的资源继承入口标记，保证入口文档始终只有一个。
    pub(crate) fn insert(&mut self, mut resource: Resource) -> Option<Resource> {
        if self.entry_location.as_deref() == Some(resource.location.as_str()) {
            resource.is_initial = true;
        }
        self.resources.insert(resource.location.clone(), resource)
    }

    pub(crate) fn register_content_id(&mut self, content_id: &str, location: &str) {
        self.content_ids
            .insert(content_id.to_string(), location.to_string());
    }

    pub(crate) fn set_entry_location(&mut self, location: &str) {
        self.entry_location = Some(location.to_string());
    }

    pub(crate) fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    pub(crate) fn get_mut(&mut self, location: &str) -> Option<&mut Resource> {
        self.resources.get_mut(location)
    }

    pub fn get(&self, location: &str) -> Option<&Resource> {
        self.resources.get(location)
    }

    /// Exact lookup first, then a case-insensitive scan over every location
    pub fn find(&self, location: &str) -> Option<&Resource> {
        self.get(location).or_else(|| {
            self.resources
                .values()
                .find(|resource| resource.location.to_lowercase() == location.to_lowercase())
        })
    }

    pub fn location_for_content_id(&self, content_id: &str) -> Option<&str> {
        self.content_ids.get(content_id).map(String::as_str)
    }

    /// 把 `cid:` 引用换成登记的位置
    ///
    /// 未登记的标识符得到空字符串；其他引用原样返回。
    pub fn resolve_content_id<'a>(&'a self, reference: &'a str) -> &'a str {
        match reference.strip_prefix("cid:") {
            Some(content_id) => self.location_for_content_id(content_id).unwrap_or_default(),
            None => reference,
        }
    }

    pub fn entry_location(&self) -> Option<&str> {
        self.entry_location.as_deref()
    }

    pub fn entry(&self) -> Option<&Resource> {
        self.entry_location().and_then(|location| self.get(location))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn html_resources(&self) -> impl Iterator<Item = &Resource> {
        self.iter().filter(|resource| resource.is_html())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
