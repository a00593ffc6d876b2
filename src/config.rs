use crate::toolchain::ToolchainVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 终端会话所使用的 shell 方言，决定清屏命令和启动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Sh,
    Bash,
    Zsh,
    Powershell,
    Cmd,
}

impl Default for ShellKind {
    fn default() -> Self {
        if cfg!(windows) {
            ShellKind::Powershell
        } else {
            ShellKind::Sh
        }
    }
}

/// 两代包管理器 CLI 的可执行文件名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolNames {
    pub current: String,
    pub legacy: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            current: "elm".to_string(),
            legacy: "elm-package".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry_url: String,
    pub package_site: String,
    /// 不设置时使用 HTTP 客户端自身的默认行为
    pub timeout_secs: Option<u64>,
    pub terminal_name: String,
    pub shell: ShellKind,
    /// 自定义浏览器命令，为空时使用系统默认的打开方式
    pub browser: Option<String>,
    pub default_toolchain: ToolchainVersion,
    pub tools: ToolNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: "https://package.elm-lang.org/all-packages".to_string(),
            package_site: "https://package.elm-lang.org/packages".to_string(),
            timeout_secs: None,
            terminal_name: "Elm Package Install".to_string(),
            shell: ShellKind::default(),
            browser: None,
            default_toolchain: ToolchainVersion::Current,
            tools: ToolNames::default(),
        }
    }
}

impl Config {
    /// 默认配置文件路径 ~/.config/elm-pkg/config.toml
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/elm-pkg/config.toml")
    }

    /// 读取配置；文件不存在时返回默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("读取配置文件失败: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("配置文件格式错误: {}", config_path.display()))?;
            log::debug!("已加载配置: {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
