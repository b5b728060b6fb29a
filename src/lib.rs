//! # mhtml2html
//!
//! 把 MHTML 网页归档转换为可以脱离原始网络环境渲染的 HTML：要么是内联了全部
//! 资源的单个文档，要么是通过本地地址提供的一组重写后的资源。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、转换选项和转换流程
//! - `store` - 解码后的资源存储
//! - `parsers` - 归档解码、字符集规范化、CSS 与 HTML 重写
//! - `capabilities` - 字符集检测、压缩、打开浏览器
//! - `utils` - URL 解析与转义
//! - `env` - 环境变量配置
//! - `web` - 本地服务（可选）

pub mod capabilities;
pub mod core;
pub mod env;
pub mod parsers;
pub mod store;
pub mod utils;
#[cfg(feature = "serve")]
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use crate::store::{Resource, ResourceStore};
