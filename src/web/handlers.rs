//! 请求处理器

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;

use crate::web::types::AppState;

/// 按请求路径返回资源
///
/// 路径去掉开头的 `/` 并解码后作为位置查找：先精确匹配，再忽略大小写。
pub async fn serve_resource(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = uri.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let location = percent_decode_str(path).decode_utf8_lossy();

    let Some(resource) = state.store.find(&location) else {
        tracing::debug!("404 \"{}\"", location);
        return StatusCode::NOT_FOUND.into_response();
    };

    tracing::debug!("200 \"{}\" ({} bytes)", location, resource.data.len());

    let content_type = HeaderValue::from_str(&resource.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(resource.data.len())),
        ],
        resource.data.clone(),
    )
        .into_response()
}
