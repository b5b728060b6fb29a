//! 字符集检测
//!
//! 默认实现基于 encoding_rs，按以下顺序判断：
//!
//! 1. BOM（可信）
//! 2. 声明的 Content-Type 中的 `charset` 参数（可信）
//! 3. 文档前 1024 字节内的 `<meta>` 声明（不可信）
//! 4. 合法的 UTF-8（不可信）
//! 5. 其余情况视为 windows-1252（不可信）

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::core::parse_content_type;
use crate::parsers::html::{get_charset, html_to_dom};

/// How many leading bytes get scanned for a `<meta>` declaration
const META_PRESCAN_LENGTH: usize = 1024;

/// 检测结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharsetDetection {
    pub encoding: &'static Encoding,
    /// 结果来自 BOM 或显式声明
    pub certain: bool,
}

impl CharsetDetection {
    pub fn new(encoding: &'static Encoding, certain: bool) -> Self {
        Self { encoding, certain }
    }

    /// Canonical encoding name, e.g. `UTF-8`, `windows-1252`, `Shift_JIS`
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// windows-1252 的低可信度结果只是兜底，不值得据此转换
    pub fn is_fallback(&self) -> bool {
        self.encoding == WINDOWS_1252 && !self.certain
    }
}

pub trait CharsetDetector: Send + Sync {
    fn detect(&self, data: &[u8], content_type: &str) -> CharsetDetection;
}

/// encoding_rs 实现
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodingSniffer;

impl CharsetDetector for EncodingSniffer {
    fn detect(&self, data: &[u8], content_type: &str) -> CharsetDetection {
        if let Some((encoding, _)) = Encoding::for_bom(data) {
            return CharsetDetection::new(encoding, true);
        }

        let (_, declared) = parse_content_type(content_type);
        if let Some(encoding) = Encoding::for_label_no_replacement(declared.as_bytes()) {
            return CharsetDetection::new(encoding, true);
        }

        if let Some(encoding) = prescan_meta(data) {
            return CharsetDetection::new(encoding, false);
        }

        if std::str::from_utf8(data).is_ok() {
            CharsetDetection::new(UTF_8, false)
        } else {
            CharsetDetection::new(WINDOWS_1252, false)
        }
    }
}

fn prescan_meta(data: &[u8]) -> Option<&'static Encoding> {
    let head = &data[..data.len().min(META_PRESCAN_LENGTH)];
    let dom = html_to_dom(head, WINDOWS_1252).ok()?;
    let label = get_charset(&dom.document)?;

    // 字节已经按 ASCII 兼容编码读出了 `<meta>`，所以 UTF-16 声明只能是 UTF-8
    Encoding::for_label_no_replacement(label.trim().as_bytes()).map(Encoding::output_encoding)
}
