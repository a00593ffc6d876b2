//! 安装命令、文档地址和终端启动命令的构造

use crate::config::{ShellKind, ToolNames};
use crate::toolchain::ToolchainVersion;

/// 构造安装命令；包名为空时安装项目中已声明的全部依赖
pub fn build_install_command(
    package_name: &str,
    toolchain: ToolchainVersion,
    tools: &ToolNames,
) -> String {
    let name = package_name.trim();
    match toolchain {
        ToolchainVersion::Current => format!("{} install {}", tools.current, name)
            .trim()
            .to_string(),
        ToolchainVersion::Legacy if name.is_empty() => format!("{} install --yes", tools.legacy),
        ToolchainVersion::Legacy => format!("{} install {} --yes", tools.legacy, name),
    }
}

/// 包文档地址；未选择版本时指向 latest
pub fn package_url(site: &str, package_name: &str, version: Option<&str>) -> String {
    format!(
        "{}/{}/{}",
        site.trim_end_matches('/'),
        package_name,
        version.unwrap_or("latest")
    )
}

/// 返回 (启动命令, 清屏命令)
pub fn launch_commands(command: &str, shell: ShellKind) -> (String, String) {
    let clear = match shell {
        ShellKind::Sh | ShellKind::Bash | ShellKind::Zsh => "clear",
        ShellKind::Powershell => "Clear-Host",
        ShellKind::Cmd => "cls",
    };
    (command.to_string(), clear.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://package.elm-lang.org/packages";

    #[test]
    fn current_toolchain_commands() {
        let tools = ToolNames::default();
        assert_eq!(
            build_install_command("foo", ToolchainVersion::Current, &tools),
            "elm install foo"
        );
        assert_eq!(
            build_install_command("", ToolchainVersion::Current, &tools),
            "elm install"
        );
    }

    #[test]
    fn legacy_toolchain_commands() {
        let tools = ToolNames::default();
        assert_eq!(
            build_install_command("foo", ToolchainVersion::Legacy, &tools),
            "elm-package install foo --yes"
        );
        assert_eq!(
            build_install_command("", ToolchainVersion::Legacy, &tools),
            "elm-package install --yes"
        );
    }

    #[test]
    fn configured_tool_names_are_used() {
        let tools = ToolNames {
            current: "elm-0.19.1".to_string(),
            legacy: "npx elm-package".to_string(),
        };
        assert_eq!(
            build_install_command("elm/http", ToolchainVersion::Current, &tools),
            "elm-0.19.1 install elm/http"
        );
        assert_eq!(
            build_install_command("elm-lang/http", ToolchainVersion::Legacy, &tools),
            "npx elm-package install elm-lang/http --yes"
        );
    }

    #[test]
    fn package_urls() {
        assert_eq!(
            package_url(SITE, "bar", None),
            "https://package.elm-lang.org/packages/bar/latest"
        );
        assert_eq!(
            package_url(SITE, "bar", Some("1.0.0")),
            "https://package.elm-lang.org/packages/bar/1.0.0"
        );
        assert_eq!(
            package_url("https://example.org/packages/", "elm/core", Some("1.0.5")),
            "https://example.org/packages/elm/core/1.0.5"
        );
    }

    #[test]
    fn clear_command_follows_shell() {
        assert_eq!(
            launch_commands("elm install", ShellKind::Bash),
            ("elm install".to_string(), "clear".to_string())
        );
        assert_eq!(launch_commands("elm install", ShellKind::Cmd).1, "cls");
        assert_eq!(launch_commands("elm install", ShellKind::Powershell).1, "Clear-Host");
    }
}
