//! CSS 选择器
//!
//! 解析与匹配都交给 `selectors` crate，这里只把 rcdom 节点接入它的
//! `Element` 接口。支持 Selectors Level 4 的结构性伪类（`:nth-child()`、
//! `:first-of-type`、`:empty`、`:not()`、`:is()`、`:where()`、`:has()` 等）；
//! 伪元素和 `:hover` 之类的状态伪类在离线文档里没有意义，解析时直接拒绝。

use std::borrow::Borrow;
use std::fmt;

use cssparser::{ParserInput, ToCss};
use html5ever::{namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::context::QuirksMode;
use selectors::matching::{
    matches_selector, ElementSelectorFlags, MatchingContext, MatchingForInvalidation,
    MatchingMode, NeedsSelectorFlags, SelectorCaches,
};
use selectors::parser::{ParseRelative, Selector, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};

use crate::core::{MhtmlError, MhtmlResult};

use super::dom::{
    get_descendant_elements, get_first_element_child, get_next_element_sibling, get_node_attr,
    get_parent_element, get_parent_node, get_previous_element_sibling,
};

/// 选择器中的标识符、属性值和命名空间
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CssString(String);

impl From<&str> for CssString {
    fn from(s: &str) -> Self {
        CssString(s.to_string())
    }
}

impl Borrow<str> for CssString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssString {
    fn precomputed_hash(&self) -> u32 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish() as u32
    }
}

/// 不支持任何非结构性伪类
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoClass {}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = DocumentSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

/// 不支持任何伪元素
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DocumentSelectors;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentSelectors;

impl selectors::SelectorImpl for DocumentSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssString;
    type LocalName = CssString;
    type NamespacePrefix = CssString;
    type NamespaceUrl = CssString;
    type BorrowedNamespaceUrl = str;
    type BorrowedLocalName = str;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

struct SelectorParser;

impl<'i> selectors::parser::Parser<'i> for SelectorParser {
    type Impl = DocumentSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }
}

/// 已编译的逗号分隔选择器列表
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Selector<DocumentSelectors>>,
}

impl SelectorList {
    pub fn parse(source: &str) -> MhtmlResult<SelectorList> {
        let mut parser_input = ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut parser_input);

        let list = selectors::SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
            .map_err(|err| MhtmlError::InvalidSelector {
                selector: source.to_string(),
                reason: format!("{:?} at column {}", err.kind, err.location.column),
            })?;

        Ok(SelectorList {
            source: source.to_string(),
            selectors: list.slice().to_vec(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, element: &Handle) -> bool {
        let mut caches = SelectorCaches::default();
        self.matches_with(&NodeRef(element.clone()), &mut caches)
    }

    /// Every matching element below `root`, in document order
    pub fn select(&self, root: &Handle) -> Vec<Handle> {
        let mut caches = SelectorCaches::default();

        get_descendant_elements(root)
            .into_iter()
            .filter(|element| self.matches_with(&NodeRef(element.clone()), &mut caches))
            .collect()
    }

    fn matches_with(&self, element: &NodeRef, caches: &mut SelectorCaches) -> bool {
        if !matches!(element.0.data, NodeData::Element { .. }) {
            return false;
        }

        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );

        self.selectors
            .iter()
            .any(|selector| matches_selector(selector, 0, None, element, &mut context))
    }
}

/// rcdom 元素节点
#[derive(Clone)]
struct NodeRef(Handle);

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", name.local),
            _ => f.write_str("#node"),
        }
    }
}

impl NodeRef {
    fn with_name<T>(&self, f: impl FnOnce(&html5ever::QualName) -> T) -> Option<T> {
        match &self.0.data {
            NodeData::Element { name, .. } => Some(f(name)),
            _ => None,
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        get_node_attr(&self.0, name)
    }
}

impl Element for NodeRef {
    type Impl = DocumentSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }

    fn parent_element(&self) -> Option<Self> {
        get_parent_element(&self.0).map(NodeRef)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        get_previous_element_sibling(&self.0).map(NodeRef)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        get_next_element_sibling(&self.0).map(NodeRef)
    }

    fn first_element_child(&self) -> Option<Self> {
        get_first_element_child(&self.0).map(NodeRef)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.with_name(|name| name.ns == ns!(html)).unwrap_or(false)
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.with_name(|name| name.local.as_ref() == local_name)
            .unwrap_or(false)
    }

    fn has_namespace(&self, ns: &str) -> bool {
        self.with_name(|name| name.ns.as_ref() == ns).unwrap_or(false)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (&self.0.data, &other.0.data) {
            (NodeData::Element { name: a, .. }, NodeData::Element { name: b, .. }) => {
                a.local == b.local && a.ns == b.ns
            }
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssString>,
        local_name: &CssString,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.0.is_empty() {
                return false;
            }
        }

        match self.attr(local_name.as_ref()) {
            Some(value) => match operation {
                AttrSelectorOperation::Exists => true,
                AttrSelectorOperation::WithValue {
                    operator,
                    case_sensitivity,
                    value: expected,
                } => operator.eval_str(&value, expected.as_ref(), *case_sensitivity),
            },
            None => false,
        }
    }

    fn match_non_ts_pseudo_class(
        &self,
        pseudo_class: &PseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo_class {}
    }

    fn match_pseudo_element(
        &self,
        pseudo_element: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        match *pseudo_element {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.with_name(|name| matches!(name.local.as_ref(), "a" | "area" | "link"))
            .unwrap_or(false)
            && self.attr("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssString, case_sensitivity: CaseSensitivity) -> bool {
        self.attr("class").is_some_and(|value| {
            value
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
        })
    }

    fn has_custom_state(&self, _name: &CssString) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssString) -> Option<CssString> {
        None
    }

    fn is_part(&self, _name: &CssString) -> bool {
        false
    }

    /// 没有子元素，也没有非空文本
    fn is_empty(&self) -> bool {
        !self.0.children.borrow().iter().any(|child| match &child.data {
            NodeData::Element { .. } => true,
            NodeData::Text { contents } => !contents.borrow().is_empty(),
            _ => false,
        })
    }

    fn is_root(&self) -> bool {
        get_parent_node(&self.0)
            .is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
