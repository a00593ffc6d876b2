//! 包浏览与安装流程

pub mod browser;
pub mod command;
pub mod terminal;
pub mod types;

pub use browser::{SystemOpener, UrlOpener};
pub use command::{build_install_command, package_url};
pub use terminal::{ManagedTerminal, ShellHost, TerminalHost};
pub use types::{PickItem, PickOptions};

use crate::config::Config;
use crate::registry::IndexSource;
use crate::toolchain::ToolchainDetector;
use anyhow::Result;
use std::path::PathBuf;
use types::{install_choices, package_choices, version_choices};

/// 交互式单选能力
pub trait Prompter {
    /// 返回所选条目的下标，None 表示用户取消
    fn pick(&mut self, items: &[PickItem], options: &PickOptions) -> Result<Option<usize>>;
    fn show_error(&mut self, message: &str);
}

/// browse / install 两个命令共享的上下文
pub struct PackageCommands<S, D, H: TerminalHost> {
    source: S,
    detector: D,
    terminal: ManagedTerminal<H>,
    project_root: PathBuf,
    package_site: String,
    tools: crate::config::ToolNames,
}

impl<S, D, H> PackageCommands<S, D, H>
where
    S: IndexSource,
    D: ToolchainDetector,
    H: TerminalHost,
{
    pub fn new(source: S, detector: D, host: H, project_root: PathBuf, config: &Config) -> Self {
        Self {
            source,
            detector,
            terminal: ManagedTerminal::new(host, config.terminal_name.clone(), config.shell),
            project_root,
            package_site: config.package_site.clone(),
            tools: config.tools.clone(),
        }
    }

    pub fn terminal_mut(&mut self) -> &mut ManagedTerminal<H> {
        &mut self.terminal
    }

    /// 选择包和版本，打开文档页面；返回打开的地址，取消时返回 None
    pub async fn browse_package(
        &self,
        prompter: &mut dyn Prompter,
        opener: &mut dyn UrlOpener,
    ) -> Result<Option<String>> {
        let index = self.source.fetch_index().await?;
        let packages = package_choices(&index);

        let items: Vec<PickItem> = packages.iter().map(PickItem::from).collect();
        let package_options = PickOptions {
            placeholder: "Choose a package".to_string(),
            match_on_description: true,
        };
        let Some(selected) = prompter.pick(&items, &package_options)? else {
            return Ok(None);
        };
        let package = &packages[selected];

        let versions = version_choices(package);
        let items: Vec<PickItem> = versions.iter().map(PickItem::from).collect();
        let version_options = PickOptions {
            placeholder: "Choose a version, or press <esc> to browse the latest".to_string(),
            match_on_description: false,
        };
        let version = prompter
            .pick(&items, &version_options)?
            .map(|i| versions[i].label.as_str());

        let url = package_url(&self.package_site, &package.label, version);
        opener.open(&url)?;
        Ok(Some(url))
    }

    /// 选择包并在受管终端中安装；取消选择时安装项目声明的全部依赖。
    /// 终端相关的失败只提示一次，不向上传播；成功时返回执行的命令
    pub async fn run_install(&mut self, prompter: &mut dyn Prompter) -> Result<Option<String>> {
        let index = self.source.fetch_index().await?;
        let packages = install_choices(&index);

        let items: Vec<PickItem> = packages.iter().map(PickItem::from).collect();
        let options = PickOptions {
            placeholder: "Choose a package, or press <esc> to install all packages in elm.json"
                .to_string(),
            match_on_description: true,
        };
        let package_name = prompter
            .pick(&items, &options)?
            .map(|i| packages[i].label.clone())
            .unwrap_or_default();

        match self.install_in_terminal(&package_name) {
            Ok(command) => Ok(Some(command)),
            Err(e) => {
                log::error!("安装失败: {:#}", e);
                prompter.show_error(&format!("Cannot start Elm Package install. {}", e));
                Ok(None)
            }
        }
    }

    fn install_in_terminal(&mut self, package_name: &str) -> Result<String> {
        let hint = self.project_root.join("dummyfile");
        let toolchain = self.detector.detect(&hint, &self.project_root);
        let command = build_install_command(package_name, toolchain, &self.tools);
        self.terminal.run(&command)?;
        Ok(command)
    }
}
