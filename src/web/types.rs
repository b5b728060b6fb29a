//! Web 模块的数据类型定义

use std::sync::Arc;

use crate::store::ResourceStore;

/// 应用状态
///
/// 服务启动前资源已全部重写完毕，之后只读，因此不需要任何锁。
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResourceStore>,
}

impl AppState {
    pub fn new(store: ResourceStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
