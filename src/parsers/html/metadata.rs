//! HTML 文档元数据处理模块
//!
//! 读取字符编码声明和文档标题。字符集检测用前者做 `<meta>` 预扫描，输出路径
//! 格式化用后者替换 `%title%`。

use markup5ever_rcdom::{Handle, NodeData};

use crate::core::parse_content_type;

use super::dom::{find_nodes, get_node_attr};

/// 获取文档字符编码
///
/// 支持两种格式：
/// 1. HTML5 格式：`<meta charset="utf-8">`
/// 2. HTML4 格式：`<meta http-equiv="content-type" content="text/html; charset=utf-8">`
///
/// 只看第一个带有声明的 meta 标签。
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, &["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(meta_content_type_node_attr_value) = get_node_attr(meta_node, "content") {
                let (_media_type, charset) = parse_content_type(&meta_content_type_node_attr_value);
                if !charset.is_empty() {
                    return Some(charset);
                }
            }
        }
    }

    None
}

/// 获取文档标题
///
/// 返回第一个 `<title>` 的文本，去掉首尾空白；空标题视为没有标题。
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, &["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                let title = contents.borrow().trim().to_string();
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }

    None
}
