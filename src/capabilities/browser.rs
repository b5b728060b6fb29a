//! 打开浏览器
//!
//! 只做尽力而为的尝试；失败由调用方记录，不影响服务继续运行。

use std::io;
use std::process::Command;

pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// 使用系统自带的打开命令
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;

#[cfg(target_os = "windows")]
const LAUNCHERS: &[&[&str]] = &[&["cmd", "/C", "start", ""]];

#[cfg(target_os = "macos")]
const LAUNCHERS: &[&[&str]] = &[&["open"]];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LAUNCHERS: &[&[&str]] = &[&["xdg-open"], &["open"]];

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no launcher available");

        for launcher in LAUNCHERS {
            let (program, args) = match launcher.split_first() {
                Some(split) => split,
                None => continue,
            };

            match Command::new(program).args(args.iter()).arg(url).status() {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => {
                    last_error = io::Error::new(
                        io::ErrorKind::Other,
                        format!("{program} exited with {status}"),
                    );
                }
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }
}
