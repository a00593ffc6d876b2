use anyhow::{anyhow, Context, Result};
use duct::cmd;

/// 打开网址的能力
pub trait UrlOpener {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// 使用系统默认浏览器，或配置中的浏览器命令
pub struct SystemOpener {
    browser: Option<String>,
}

impl SystemOpener {
    pub fn new(browser: Option<String>) -> Self {
        Self { browser }
    }

    fn expression(&self, url: &str) -> Result<duct::Expression> {
        if let Some(browser) = &self.browser {
            let mut parts = browser.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| anyhow!("浏览器命令为空"))?;
            let mut args: Vec<&str> = parts.collect();
            args.push(url);
            return Ok(duct::cmd(program, args));
        }

        Ok(if cfg!(target_os = "macos") {
            cmd!("open", url)
        } else if cfg!(windows) {
            cmd!("cmd", "/C", "start", "", url)
        } else {
            cmd!("xdg-open", url)
        })
    }
}

impl UrlOpener for SystemOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        log::info!("打开: {}", url);
        self.expression(url)?
            .stdout_null()
            .stderr_null()
            .run()
            .with_context(|| format!("无法打开 {}", url))?;
        Ok(())
    }
}
