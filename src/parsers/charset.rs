//! 字符集规范化
//!
//! 非 UTF-8 的 HTML 资源转换为 UTF-8，之后的文本处理都假定 UTF-8。检测结果
//! 为低可信度的 windows-1252 时不做转换。

use crate::capabilities::CharsetDetector;
use crate::core::{MhtmlError, MhtmlResult};
use crate::store::Resource;

/// 转换结果，由调用方写回资源
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcoded {
    pub data: Vec<u8>,
    /// 去掉 `charset` 参数后的类型
    pub content_type: String,
    pub source_encoding: &'static str,
}

/// 按检测结果把资源转换为 UTF-8
///
/// 不需要转换时返回 `Ok(None)`；输入字节在检测出的编码下不合法时失败。
pub fn transcode_to_utf8(
    resource: &Resource,
    detector: &dyn CharsetDetector,
) -> MhtmlResult<Option<Transcoded>> {
    let detection = detector.detect(&resource.data, &resource.content_type);

    if detection.is_utf8() || detection.is_fallback() {
        return Ok(None);
    }

    let (text, had_errors) = detection.encoding.decode_with_bom_removal(&resource.data);
    if had_errors {
        return Err(MhtmlError::Transcode {
            location: resource.location.clone(),
            encoding: detection.name().to_string(),
        });
    }

    Ok(Some(Transcoded {
        data: text.into_owned().into_bytes(),
        content_type: strip_charset(&resource.content_type),
        source_encoding: detection.name(),
    }))
}

/// Drops every `charset=` parameter from a content type
pub fn strip_charset(content_type: &str) -> String {
    content_type
        .split(';')
        .filter(|parameter| {
            !parameter
                .trim()
                .get(..8)
                .is_some_and(|key| key.eq_ignore_ascii_case("charset="))
        })
        .collect::<Vec<&str>>()
        .join(";")
}
