//! Web 路由定义

use std::sync::Arc;

use axum::Router;

use crate::web::{handlers::serve_resource, types::AppState};

/// 创建路由
///
/// 资源位置可以是任意字符串，所以只有一个兜底路由，所有方法都由它处理。
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new().fallback(serve_resource).with_state(state)
}
