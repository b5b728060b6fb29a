//! CSS 重写
//!
//! 扫描样式表文本中所有 `url(...)`，逐个交给引用改写规则处理。扫描器不理解
//! CSS 语法：`url(` 与 `)` 之间不能出现括号，出现时该记号不会被改写。

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::bytes::{Captures, Regex};

use crate::parsers::link_rewriter::rewrite_reference;
use crate::store::ResourceStore;
use crate::utils::url::BaseUrl;

fn url_token() -> &'static Regex {
    static URL_TOKEN: OnceLock<Regex> = OnceLock::new();
    URL_TOKEN.get_or_init(|| {
        Regex::new(r"(?-u)\burl\(([^()]+)\)").expect("url() pattern is valid")
    })
}

/// 改写样式表中的全部 `url()` 引用
///
/// 引号被去掉；`data:` 与 `mailto:` 引用原样保留（包括引号）。
pub fn rewrite_css(store: &ResourceStore, base: &BaseUrl, css: &[u8]) -> Vec<u8> {
    url_token()
        .replace_all(css, |captures: &Captures| -> Vec<u8> {
            let inner = String::from_utf8_lossy(&captures[1]);
            let reference = inner.trim_matches(|c: char| c == '"' || c == '\'');

            match rewrite_reference(store, base, reference) {
                Some(rewritten) => format!("url({rewritten})").into_bytes(),
                None => captures[0].to_vec(),
            }
        })
        .into_owned()
}

/// `rewrite_css` for text that is already a string
pub fn rewrite_css_str<'a>(store: &ResourceStore, base: &BaseUrl, css: &'a str) -> Cow<'a, str> {
    if !css.contains("url(") {
        return Cow::Borrowed(css);
    }

    Cow::Owned(String::from_utf8_lossy(&rewrite_css(store, base, css.as_bytes())).into_owned())
}
