use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::core::{MhtmlError, MhtmlResult};

/// 将 HTML 字节转换为 DOM
///
/// 字节先按 `document_encoding` 解码（去掉 BOM），再交给 html5ever。
pub fn html_to_dom(data: &[u8], document_encoding: &'static Encoding) -> MhtmlResult<RcDom> {
    let (text, _) = document_encoding.decode_with_bom_removal(data);

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut text.as_bytes())
        .map_err(MhtmlError::Parse)
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found_nodes = Vec::new();

    let Some((node_name, rest)) = node_names.split_first() else {
        return found_nodes;
    };

    if get_node_name(node) == Some(*node_name) {
        if rest.is_empty() {
            found_nodes.push(node.clone());
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, rest));
            }
            return found_nodes;
        }
    }

    for child_node in node.children.borrow().iter() {
        found_nodes.append(&mut find_nodes(child_node, node_names));
    }

    found_nodes
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref().eq_ignore_ascii_case(attr_name))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn has_node_attr(node: &Handle, attr_name: &str) -> bool {
    get_node_attr(node, attr_name).is_some()
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// 获取父节点
///
/// rcdom 把父节点存放在 `Cell` 中，只能取出后再放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

pub fn get_parent_element(child: &Handle) -> Option<Handle> {
    get_parent_node(child).filter(is_element)
}

pub fn get_previous_element_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;

    let children = parent.children.borrow();
    children
        .iter()
        .take_while(|child| !Rc::ptr_eq(child, node))
        .filter(|child| is_element(child))
        .last()
        .cloned()
}

pub fn get_next_element_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;

    let children = parent.children.borrow();
    children
        .iter()
        .skip_while(|child| !Rc::ptr_eq(child, node))
        .skip(1)
        .find(|child| is_element(child))
        .cloned()
}

pub fn get_first_element_child(node: &Handle) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| is_element(child))
        .cloned()
}

/// Every element below `node` in document order
pub fn get_descendant_elements(node: &Handle) -> Vec<Handle> {
    let mut elements = Vec::new();
    collect_elements(node, &mut elements);
    elements
}

fn collect_elements(node: &Handle, elements: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child) {
            elements.push(child.clone());
        }
        collect_elements(child, elements);
    }
}

/// 从树中摘除节点
pub fn remove_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 直接子文本节点拼接而成的文本
pub fn get_text_content(node: &Handle) -> String {
    let mut text = String::new();

    for child in node.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }

    text
}

/// Replaces the element's text: the first text child takes the new value,
/// any further text children are dropped
pub fn set_text_content(node: &Handle, text: &str) {
    let mut children = node.children.borrow_mut();
    let mut replaced = false;

    children.retain(|child| match &child.data {
        NodeData::Text { contents } => {
            if replaced {
                return false;
            }
            *contents.borrow_mut() = StrTendril::from_slice(text);
            replaced = true;
            true
        }
        _ => true,
    });
}

/// 设置节点属性
///
/// `None` 删除属性；属性不存在时追加新属性。
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::LocalName;

    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if attrs_mut[i].name.local.as_ref().eq_ignore_ascii_case(attr_name) {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}
