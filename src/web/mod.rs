//! 本地服务模块
//!
//! 通过本地地址提供重写后的资源，供浏览器直接访问。

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::GatewayConfig;
pub use routes::create_routes;
pub use types::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::capabilities::BrowserLauncher;
use crate::core::{print_info_message, MhtmlError, MhtmlResult};
use crate::store::ResourceStore;
use crate::utils::url::escape_path;

/// 已绑定端口、尚未开始处理请求的服务
pub struct Gateway {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Gateway {
    /// 绑定监听地址
    pub async fn bind(config: &GatewayConfig, store: ResourceStore) -> MhtmlResult<Self> {
        let listener = TcpListener::bind(config.listen_address()).await?;

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(store)),
        })
    }

    pub fn local_addr(&self) -> MhtmlResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 入口文档的地址：监听地址加上转义后的入口位置
    pub fn entry_url(&self) -> MhtmlResult<String> {
        let entry = self
            .state
            .store
            .entry_location()
            .ok_or(MhtmlError::NoEntryDocument)?;

        Ok(format!("http://{}/{}", self.local_addr()?, escape_path(entry)))
    }

    pub fn router(&self) -> Router {
        create_routes(self.state.clone())
    }

    /// 处理请求，直到进程结束
    pub async fn serve(self) -> MhtmlResult<()> {
        let app = self.router();
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

/// 启动服务并尝试在浏览器中打开入口文档
///
/// 打开失败只记录警告；地址总会打印出来，方便手动访问。
pub async fn serve_archive(
    store: ResourceStore,
    config: &GatewayConfig,
    launcher: &dyn BrowserLauncher,
) -> MhtmlResult<()> {
    let gateway = Gateway::bind(config, store).await?;
    let url = gateway.entry_url()?;

    if config.open_browser {
        if let Err(e) = launcher.open(&url) {
            tracing::warn!("unable to open a browser: {}", e);
        }
    }

    print_info_message(&format!("Serving archive at {url}"));
    tracing::info!("listening on {}", gateway.local_addr()?);

    gateway.serve().await
}
