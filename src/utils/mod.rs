//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - 引用解析（相对路径 → 绝对URL）
//! - 数据URL创建
//! - 路径转义
//!
//! # 模块组织
//!
//! - `url` - URL处理、数据URL、引用解析等工具函数

pub mod url;

// Re-export commonly used items for convenience
pub use url::{
    create_data_url, escape_path, has_protocol, is_inert_reference, resolve_reference, BaseUrl,
    Url,
};
