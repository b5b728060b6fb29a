//! # 解析器模块
//!
//! - `mhtml` - 归档解码，生成资源存储
//! - `charset` - 字符集规范化
//! - `css` - 样式表中 `url()` 引用的重写
//! - `html` - HTML文档解析、DOM操作、引用重写
//! - `link_rewriter` - HTML 与 CSS 共用的单个引用改写规则

pub mod charset;
pub mod css;
pub mod html;
pub mod link_rewriter;
pub mod mhtml;

pub use charset::transcode_to_utf8;
pub use css::rewrite_css;
pub use html::{get_charset, get_title, html_to_dom, serialize_document, HtmlRewriter, RemovalRules};
pub use link_rewriter::rewrite_reference;
pub use mhtml::{decode_archive, normalize_content_type};
