//! URL 处理工具
//!
//! 归档中的资源以 `Content-Location` 互相引用。这里提供把引用解析为绝对地址的
//! 简化解析器、数据URL的构造，以及重写后根相对路径所用的转义规则。

use base64::{prelude::BASE64_STANDARD, Engine};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

pub use url::Url;

/// Everything except unreserved characters gets escaped
const PATH_ESCAPE_SET: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'<').add(b'>').add(b'`')
    .add(b':').add(b'/').add(b'?').add(b'#').add(b'[').add(b']').add(b'@')
    .add(b'!').add(b'$').add(b'&').add(b'\'').add(b'(').add(b')')
    .add(b'*').add(b'+').add(b',').add(b';').add(b'=')
    .add(b'%').add(b'{').add(b'}').add(b'|').add(b'\\').add(b'^');

/// 资源的解析基准
///
/// 只保留解析相对引用所需的三个部分。`Content-Location` 可能本身就是相对地址
/// （例如 `style.css`），这种情况下 scheme 和 host 为空，整个值作为路径。
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BaseUrl {
    scheme: String,
    host: String,
    path: String,
}

impl BaseUrl {
    /// 解析基准地址
    ///
    /// 相对地址不是错误；其余的语法错误（非法端口、非法主机名等）原样返回。
    pub fn parse(location: &str) -> Result<BaseUrl, url::ParseError> {
        match Url::parse(location) {
            Ok(parsed) => {
                let mut host = parsed.host_str().unwrap_or_default().to_string();
                if let Some(port) = parsed.port() {
                    host.push_str(&format!(":{port}"));
                }

                Ok(BaseUrl {
                    scheme: parsed.scheme().to_string(),
                    host,
                    path: parsed.path().to_string(),
                })
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(BaseUrl {
                scheme: String::new(),
                host: String::new(),
                path: location.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Checks whether the reference starts with a lowercase `letters:` scheme prefix
pub fn has_protocol(reference: &str) -> bool {
    match reference.find(':') {
        Some(0) | None => false,
        Some(colon) => reference[..colon].bytes().all(|b| b.is_ascii_lowercase()),
    }
}

/// 引用是否保持原样（内联数据或邮件地址）
pub fn is_inert_reference(reference: &str) -> bool {
    reference.starts_with("data:") || reference.starts_with("mailto:")
}

/// 把引用解析为绝对地址
///
/// 这不是完整的 RFC 3986 解析：已带 scheme 的引用原样返回，`//` 开头的引用
/// 只补 scheme，`/` 开头的引用补 scheme 和 host，其余引用相对于基准路径的
/// 目录拼接并折叠 `.`/`..`/空段。查询串和片段跟随在引用末尾，不做特殊处理。
pub fn resolve_reference(base: &BaseUrl, reference: &str) -> String {
    if has_protocol(reference) {
        return reference.to_string();
    }

    if reference.starts_with("//") {
        return format!("{}:{}", base.scheme, reference);
    }

    if reference.starts_with('/') {
        return format!("{}://{}{}", base.scheme, base.host, reference);
    }

    let joined = format!("/{}/{}", parent_directory(&base.path), reference);
    format!("{}://{}{}", base.scheme, base.host, clean_path(&joined))
}

/// 转义为可以放进单个路径段的形式
pub fn escape_path(value: &str) -> String {
    utf8_percent_encode(value, PATH_ESCAPE_SET).to_string()
}

/// Creates a base64 data URL for the given media type and payload
pub fn create_data_url(media_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64_STANDARD.encode(data))
}

fn parent_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[..slash],
        None => "",
    }
}

/// Lexically collapses a rooted path the way a filesystem path joiner would
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}
