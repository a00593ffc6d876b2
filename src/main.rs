mod config;
mod error;
mod package;
mod registry;
mod toolchain;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use error::RegistryError;
use package::{PackageCommands, PickItem, PickOptions, Prompter, ShellHost, SystemOpener};
use registry::RegistryClient;
use std::path::PathBuf;
use toolchain::{locate_project_root, ProjectDetector};
use tui::TuiPrompter;

#[derive(Parser, Debug)]
#[command(name = "elm-pkg", version, about = "Browse and install Elm packages")]
struct Cli {
    /// 配置文件路径（默认 ~/.config/elm-pkg/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a package's documentation page in the browser
    Browse,
    /// Install a package into the current project
    Install {
        /// Elm 项目根目录（默认当前目录）
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Pick browse or install repeatedly until quit
    Menu {
        #[arg(long)]
        project: Option<PathBuf>,
    },
}

type Commands = PackageCommands<RegistryClient, ProjectDetector, ShellHost>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // 加载配置
    let config = Config::load_or_default(cli.config.as_deref())?;

    let project = match &cli.command {
        Command::Browse => None,
        Command::Install { project } | Command::Menu { project } => project.clone(),
    };
    // 未指定项目时从当前目录向上查找项目根，检测与安装都在这里进行
    let project_root = match project {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir().context("无法获取当前目录")?;
            locate_project_root(&cwd).unwrap_or(cwd)
        }
    };
    log::debug!("项目目录: {}", project_root.display());

    let registry = RegistryClient::new(&config)?;
    let mut commands = PackageCommands::new(
        registry,
        ProjectDetector::new(config.default_toolchain),
        ShellHost::new(config.shell, project_root.clone()),
        project_root,
        &config,
    );
    let mut prompter = TuiPrompter::new();
    let mut opener = SystemOpener::new(config.browser.clone());

    let result = match cli.command {
        Command::Browse => browse(&commands, &mut prompter, &mut opener).await,
        Command::Install { .. } => install(&mut commands, &mut prompter).await,
        Command::Menu { .. } => menu(&mut commands, &mut prompter, &mut opener).await,
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("错误: {}", user_message(&e));
        std::process::exit(1);
    }
    Ok(())
}

/// 包索引相关的失败给出更直接的提示
fn user_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<RegistryError>() {
        Some(err) if err.is_transport() => format!("无法获取 Elm 包索引，请检查网络连接 ({})", err),
        Some(err) if err.is_parse() => format!("Elm 包索引内容无法识别 ({})", err),
        _ => format!("{:#}", e),
    }
}

async fn browse(
    commands: &Commands,
    prompter: &mut TuiPrompter,
    opener: &mut SystemOpener,
) -> Result<()> {
    if let Some(url) = commands.browse_package(prompter, opener).await? {
        println!("{}", url);
    }
    Ok(())
}

async fn install(commands: &mut Commands, prompter: &mut TuiPrompter) -> Result<()> {
    if commands.run_install(prompter).await?.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

/// 循环选择操作，多次安装共用同一个受管终端槽位
async fn menu(
    commands: &mut Commands,
    prompter: &mut TuiPrompter,
    opener: &mut SystemOpener,
) -> Result<()> {
    let actions = [
        ("Browse package", "Open a package's documentation page"),
        ("Install package", "Run the install command for the project"),
        ("Quit", ""),
    ];
    let items: Vec<PickItem> = actions
        .iter()
        .map(|(label, description)| PickItem {
            label: label.to_string(),
            description: description.to_string(),
        })
        .collect();
    let options = PickOptions {
        placeholder: "Choose an action".to_string(),
        match_on_description: true,
    };

    loop {
        commands.terminal_mut().reap();

        let result = match prompter.pick(&items, &options)? {
            Some(0) => browse(commands, prompter, opener).await,
            Some(1) => commands.run_install(prompter).await.map(|_| ()),
            _ => return Ok(()),
        };
        // 单次操作失败不退出菜单
        if let Err(e) = result {
            log::error!("{:#}", e);
            prompter.show_error(&user_message(&e));
        }
    }
}
