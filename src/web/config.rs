//! 本地服务配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use crate::env::{serve, EnvError, EnvResult, EnvVar};

/// Serving gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口，0 表示由系统分配
    pub port: u16,
    /// 启动后是否尝试打开浏览器
    pub open_browser: bool,
}

impl GatewayConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            bind_addr: serve::BindAddress::get()?,
            port: serve::Port::get()?,
            open_browser: serve::OpenBrowser::get()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(EnvError {
                variable: serve::BindAddress::NAME.to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        if self.bind_addr.contains(':') && !self.bind_addr.starts_with('[') {
            // 裸 IPv6 地址
            format!("[{}]:{}", self.bind_addr, self.port)
        } else {
            format!("{}:{}", self.bind_addr, self.port)
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load gateway config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 0,
                open_browser: true,
            }
        })
    }
}
