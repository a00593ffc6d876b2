//! Elm 工具链版本检测

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 包管理器 CLI 的方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainVersion {
    /// 0.18 及更早，使用 elm-package
    Legacy,
    /// 0.19 及之后，使用 elm install
    Current,
}

/// 工具链检测器：给定文件路径提示和项目根目录，返回工具链版本
pub trait ToolchainDetector {
    fn detect(&self, file_hint: &Path, project_root: &Path) -> ToolchainVersion;
}

/// 基于项目文件（elm.json / elm-package.json）的检测
pub struct ProjectDetector {
    fallback: ToolchainVersion,
}

impl ProjectDetector {
    pub fn new(fallback: ToolchainVersion) -> Self {
        Self { fallback }
    }
}

impl ToolchainDetector for ProjectDetector {
    fn detect(&self, file_hint: &Path, project_root: &Path) -> ToolchainVersion {
        let root = find_project_root(file_hint, project_root);
        let version = root.as_deref().and_then(version_from_project);
        match (version, root) {
            (Some(v), Some(root)) => {
                log::info!("工具链 {:?} (项目: {})", v, root.display());
                v
            }
            _ => {
                log::info!("未找到 Elm 项目文件，使用默认工具链 {:?}", self.fallback);
                self.fallback
            }
        }
    }
}

fn has_project_file(dir: &Path) -> bool {
    dir.join("elm.json").is_file() || dir.join("elm-package.json").is_file()
}

/// 从 start 向上查找第一个包含 elm.json / elm-package.json 的目录，直到文件系统根
pub fn locate_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| has_project_file(dir))
        .map(Path::to_path_buf)
}

/// 从 file_hint 所在目录向上查找包含项目文件的目录，到 stop_at 为止
fn find_project_root(file_hint: &Path, stop_at: &Path) -> Option<PathBuf> {
    let start = file_hint.parent().unwrap_or(file_hint);
    for dir in start.ancestors() {
        if has_project_file(dir) {
            return Some(dir.to_path_buf());
        }
        if dir == stop_at {
            break;
        }
    }
    None
}

fn version_from_project(root: &Path) -> Option<ToolchainVersion> {
    let elm_json = root.join("elm.json");
    if elm_json.is_file() {
        // elm.json 只在 0.19 之后出现；elm-version 字段异常时仍按新版处理
        let declared = fs::read_to_string(&elm_json)
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|json| json.get("elm-version")?.as_str().map(str::to_string));
        return Some(match declared {
            Some(v) if is_legacy_version(&v) => ToolchainVersion::Legacy,
            _ => ToolchainVersion::Current,
        });
    }
    if root.join("elm-package.json").is_file() {
        return Some(ToolchainVersion::Legacy);
    }
    None
}

/// "0.18.0" 或 "0.18.0 <= v < 0.19.0" 之类的约束视为旧版
fn is_legacy_version(declared: &str) -> bool {
    let first = declared.split_whitespace().next().unwrap_or("");
    let mut parts = first.split('.');
    match (
        parts.next().and_then(|p| p.parse::<u32>().ok()),
        parts.next().and_then(|p| p.parse::<u32>().ok()),
    ) {
        (Some(0), Some(minor)) => minor < 19,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_in(root: &Path) -> ToolchainVersion {
        ProjectDetector::new(ToolchainVersion::Current).detect(&root.join("dummyfile"), root)
    }

    #[test]
    fn elm_json_means_current() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("elm.json"),
            r#"{"type": "application", "elm-version": "0.19.1"}"#,
        )
        .unwrap();
        assert_eq!(detect_in(dir.path()), ToolchainVersion::Current);
    }

    #[test]
    fn elm_package_json_means_legacy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("elm-package.json"),
            r#"{"elm-version": "0.18.0 <= v < 0.19.0"}"#,
        )
        .unwrap();
        assert_eq!(detect_in(dir.path()), ToolchainVersion::Legacy);
    }

    #[test]
    fn nested_hint_walks_up_to_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("elm-package.json"), "{}").unwrap();
        let nested = dir.path().join("src/Page");
        fs::create_dir_all(&nested).unwrap();
        let detected = ProjectDetector::new(ToolchainVersion::Current)
            .detect(&nested.join("Home.elm"), dir.path());
        assert_eq!(detected, ToolchainVersion::Legacy);
    }

    #[test]
    fn no_project_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = ProjectDetector::new(ToolchainVersion::Legacy);
        assert_eq!(
            legacy.detect(&dir.path().join("dummyfile"), dir.path()),
            ToolchainVersion::Legacy
        );
        assert_eq!(detect_in(dir.path()), ToolchainVersion::Current);
    }

    #[test]
    fn locate_walks_up_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("elm-package.json"), "{}").unwrap();
        let nested = dir.path().join("src/Page");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(locate_project_root(&nested).as_deref(), Some(dir.path()));
        assert_eq!(locate_project_root(dir.path()).as_deref(), Some(dir.path()));
    }

    #[test]
    fn locate_stops_at_nearest_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("elm-package.json"), "{}").unwrap();
        let inner = dir.path().join("examples/demo");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("elm.json"), r#"{"elm-version": "0.19.1"}"#).unwrap();

        let src = inner.join("src");
        fs::create_dir_all(&src).unwrap();

        assert_eq!(locate_project_root(&src).as_deref(), Some(inner.as_path()));
        assert_eq!(locate_project_root(&inner).as_deref(), Some(inner.as_path()));
    }

    #[test]
    fn legacy_version_constraints() {
        assert!(is_legacy_version("0.18.0"));
        assert!(is_legacy_version("0.18.0 <= v < 0.19.0"));
        assert!(!is_legacy_version("0.19.1"));
        assert!(!is_legacy_version("1.0.0"));
        assert!(!is_legacy_version(""));
    }
}
