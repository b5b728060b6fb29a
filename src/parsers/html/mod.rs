//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `select`: CSS 选择器（基于 selectors crate）
//! - `metadata`: 文档元数据处理
//! - `rewriter`: 引用重写
//! - `serializer`: 序列化功能

pub mod dom;
pub mod metadata;
pub mod rewriter;
pub mod select;
pub mod serializer;

pub use dom::{
    find_nodes, get_node_attr, get_node_name, get_parent_node, html_to_dom, remove_node,
    set_node_attr,
};
pub use metadata::{get_charset, get_title};
pub use rewriter::{HtmlRewriter, RemovalRules};
pub use select::SelectorList;
pub use serializer::serialize_document;
