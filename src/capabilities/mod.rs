//! # 外部能力
//!
//! 转换核心只消费这些能力，不关心具体实现：
//!
//! - `CharsetDetector` - 字节 + 声明的标签 → 检测到的编码及可信度
//! - `Minifier` - MIME 类型 + 字节 → 压缩后的字节，失败时保留原始字节
//! - `BrowserLauncher` - URL → 尽力打开浏览器
//!
//! 每种能力都带有一个默认实现。

pub mod browser;
pub mod charset;
pub mod minify;

pub use browser::{BrowserLauncher, SystemBrowser};
pub use charset::{CharsetDetection, CharsetDetector, EncodingSniffer};
pub use minify::{default_minifier, minify_or_keep, Minifier, MinifyError};
