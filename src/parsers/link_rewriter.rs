//! 链接重写模块
//!
//! HTML 属性和 CSS `url()` 共用的单个引用改写规则：
//!
//! - `data:`、`mailto:` 引用保持不变
//! - `cid:` 引用先换成登记的位置
//! - 归档中存在的资源内联为 data URL
//! - 其余引用解析为绝对地址，转义后挂在根路径下，由本地服务负责响应

use crate::store::ResourceStore;
use crate::utils::url::{create_data_url, escape_path, is_inert_reference, resolve_reference, BaseUrl};

/// 改写单个引用
///
/// 返回 `None` 表示引用应原样保留。
pub fn rewrite_reference(store: &ResourceStore, base: &BaseUrl, reference: &str) -> Option<String> {
    if is_inert_reference(reference) {
        return None;
    }

    let target = store.resolve_content_id(reference);

    match store.get(target) {
        Some(resource) => Some(create_data_url(&resource.content_type, &resource.data)),
        None => Some(format!("/{}", escape_path(&resolve_reference(base, target)))),
    }
}
