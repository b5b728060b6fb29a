//! HTML 重写
//!
//! 对单个 HTML 资源依次执行：删除元素与清空属性、改写字符集声明、处理
//! `<base>`、改写 `src`/`href`/`background` 引用、改写 `<style>` 文本和
//! `style` 属性，最后序列化。

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use markup5ever_rcdom::Handle;

use crate::core::{ConvertOptions, MhtmlError, MhtmlResult};
use crate::parsers::css::rewrite_css_str;
use crate::parsers::link_rewriter::rewrite_reference;
use crate::store::ResourceStore;
use crate::utils::url::BaseUrl;

use super::dom::{
    find_nodes, get_descendant_elements, get_node_attr, get_text_content, has_node_attr,
    html_to_dom, remove_node, set_node_attr, set_text_content,
};
use super::select::SelectorList;
use super::serializer::serialize_document;

/// Attributes holding references to other resources
const REFERENCE_ATTRIBUTES: [&str; 3] = ["src", "href", "background"];

/// 预先编译的删除规则
#[derive(Clone, Debug, Default)]
pub struct RemovalRules {
    elements: Vec<SelectorList>,
    attributes: Vec<(SelectorList, String)>,
}

impl RemovalRules {
    /// 编译全部选择器；任何一个无法解析都会使整个转换失败
    pub fn compile(options: &ConvertOptions) -> MhtmlResult<RemovalRules> {
        let elements = options
            .remove_elements
            .iter()
            .map(|selector| SelectorList::parse(selector))
            .collect::<MhtmlResult<Vec<_>>>()?;

        let attributes = options
            .remove_attributes
            .iter()
            .map(|(selector, attribute)| {
                SelectorList::parse(selector).map(|selector| (selector, attribute.clone()))
            })
            .collect::<MhtmlResult<Vec<_>>>()?;

        Ok(RemovalRules {
            elements,
            attributes,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.attributes.is_empty()
    }

    /// Removes matching elements, then clears matching attributes
    pub fn apply(&self, document: &Handle) {
        for selector in &self.elements {
            let nodes = selector.select(document);
            tracing::debug!("removing {} elements matching {}", nodes.len(), selector.as_str());
            for node in &nodes {
                remove_node(node);
            }
        }

        for (selector, attribute) in &self.attributes {
            for node in selector.select(document) {
                if has_node_attr(&node, attribute) {
                    set_node_attr(&node, attribute, Some(String::new()));
                }
            }
        }
    }
}

pub struct HtmlRewriter<'a> {
    store: &'a ResourceStore,
    rules: &'a RemovalRules,
    charset_declarations: SelectorList,
    base_elements: SelectorList,
    hyperlinks: SelectorList,
}

impl<'a> HtmlRewriter<'a> {
    pub fn new(store: &'a ResourceStore, rules: &'a RemovalRules) -> MhtmlResult<Self> {
        Ok(HtmlRewriter {
            store,
            rules,
            charset_declarations: SelectorList::parse("meta[http-equiv], meta[charset]")?,
            base_elements: SelectorList::parse("head > base[href]")?,
            hyperlinks: SelectorList::parse("a[href]")?,
        })
    }

    /// 重写一个 HTML 文档
    ///
    /// 未经转换且不是合法 UTF-8 的文档按 windows-1252 逐字节往返，保证无关
    /// 字节原样保留。
    pub fn rewrite(&self, base: &BaseUrl, data: &[u8], is_converted: bool) -> MhtmlResult<Vec<u8>> {
        let encoding: &'static Encoding = if is_converted || std::str::from_utf8(data).is_ok() {
            UTF_8
        } else {
            WINDOWS_1252
        };

        let dom = html_to_dom(data, encoding)?;
        let document = &dom.document;

        self.rules.apply(document);

        if is_converted {
            self.declare_utf8(document);
        }

        let base = match self.redefine_base(document)? {
            Some(redefined) => Cow::Owned(redefined),
            None => Cow::Borrowed(base),
        };

        self.rewrite_references(document, &base);
        self.rewrite_styles(document, &base);

        serialize_document(&dom, encoding)
    }

    fn declare_utf8(&self, document: &Handle) {
        for meta in self.charset_declarations.select(document) {
            match get_node_attr(&meta, "http-equiv") {
                Some(http_equiv) if http_equiv.eq_ignore_ascii_case("content-type") => {
                    set_node_attr(&meta, "content", Some("text/html; charset=utf-8".to_string()));
                }
                Some(_) => {}
                None => set_node_attr(&meta, "charset", Some("utf-8".to_string())),
            }
        }
    }

    /// 第一个 `<head><base href>` 成为新的解析基准，所有匹配的元素都被删除
    fn redefine_base(&self, document: &Handle) -> MhtmlResult<Option<BaseUrl>> {
        let base_elements = self.base_elements.select(document);

        let Some(href) = base_elements
            .first()
            .and_then(|element| get_node_attr(element, "href"))
        else {
            return Ok(None);
        };

        let base = BaseUrl::parse(&href).map_err(|e| MhtmlError::ReferenceResolution {
            location: href.clone(),
            reason: e.to_string(),
        })?;

        for element in &base_elements {
            remove_node(element);
        }

        Ok(Some(base))
    }

    fn rewrite_references(&self, document: &Handle, base: &BaseUrl) {
        for attribute in REFERENCE_ATTRIBUTES {
            for element in get_descendant_elements(document) {
                if self.hyperlinks.matches(&element) {
                    continue;
                }

                let Some(value) = get_node_attr(&element, attribute) else {
                    continue;
                };

                if let Some(rewritten) = rewrite_reference(self.store, base, &value) {
                    set_node_attr(&element, attribute, Some(rewritten));
                    set_node_attr(&element, "integrity", None);
                }
            }
        }
    }

    fn rewrite_styles(&self, document: &Handle, base: &BaseUrl) {
        for style in find_nodes(document, &["style"]) {
            let text = get_text_content(&style);
            if let Cow::Owned(css) = rewrite_css_str(self.store, base, &text) {
                set_text_content(&style, &css);
            }
        }

        for element in get_descendant_elements(document) {
            if let Some(style) = get_node_attr(&element, "style") {
                if let Cow::Owned(css) = rewrite_css_str(self.store, base, &style) {
                    set_node_attr(&element, "style", Some(css));
                }
            }
        }
    }
}
