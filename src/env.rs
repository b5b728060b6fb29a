//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。命令行参数总是优先于这里的值。

use std::env;

use thiserror::Error;

use crate::core::ConvertOptions;

/// 环境变量解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Environment variable '{variable}': {message}")]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "MHTML2HTML_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 转换相关环境变量
pub mod convert {
    use super::*;

    /// 解码时压缩资源
    pub struct Minify;
    impl EnvVar<bool> for Minify {
        const NAME: &'static str = "MHTML2HTML_MINIFY";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Minify resources while decoding the archive";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 并行重写
    pub struct Parallel;
    impl EnvVar<bool> for Parallel {
        const NAME: &'static str = "MHTML2HTML_PARALLEL";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Rewrite resources on a thread pool";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 本地服务相关环境变量
pub mod serve {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "MHTML2HTML_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Address the local server listens on";

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口，0 表示由系统分配
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "MHTML2HTML_PORT";
        const DEFAULT: Option<u16> = Some(0);
        const DESCRIPTION: &'static str = "Port the local server listens on (0 = any free port)";

        fn parse(value: &str) -> EnvResult<u16> {
            value.trim().parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (0-65535)".to_string(),
            })
        }
    }

    /// 启动服务后打开浏览器
    pub struct OpenBrowser;
    impl EnvVar<bool> for OpenBrowser {
        const NAME: &'static str = "MHTML2HTML_OPEN_BROWSER";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Open the entry document in a browser when serving";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 转换配置
    pub minify: bool,
    pub parallel: bool,

    // 服务配置
    pub bind_address: String,
    pub port: u16,
    pub open_browser: bool,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            minify: convert::Minify::get()?,
            parallel: convert::Parallel::get()?,

            bind_address: serve::BindAddress::get()?,
            port: serve::Port::get()?,
            open_browser: serve::OpenBrowser::get()?,
        })
    }

    /// 转换选项的初始值；删除规则只来自命令行
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            minify: self.minify,
            parallel: self.parallel,
            ..ConvertOptions::default()
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: \"warn\")\n",
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Conversion\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        convert::Minify::NAME,
        convert::Minify::DESCRIPTION,
        convert::Minify::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        convert::Parallel::NAME,
        convert::Parallel::DESCRIPTION,
        convert::Parallel::DEFAULT
    ));

    docs.push_str("\n## Local Server\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: \"127.0.0.1\")\n",
        serve::BindAddress::NAME,
        serve::BindAddress::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        serve::Port::NAME,
        serve::Port::DESCRIPTION,
        serve::Port::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        serve::OpenBrowser::NAME,
        serve::OpenBrowser::DESCRIPTION,
        serve::OpenBrowser::DEFAULT
    ));

    docs
}
