//! 选择流程中的数据类型

use crate::registry::PackageIndex;

/// 包选择项：标签为包名，附带该包全部版本
#[derive(Debug, Clone, PartialEq)]
pub struct PackageChoice {
    pub label: String,
    pub description: String,
    pub versions: Vec<String>,
}

/// 版本选择项
#[derive(Debug, Clone, PartialEq)]
pub struct VersionChoice {
    pub label: String,
}

/// 传给 Prompter 的通用条目
#[derive(Debug, Clone, PartialEq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
}

/// 单选列表的选项
#[derive(Debug, Clone, PartialEq)]
pub struct PickOptions {
    pub placeholder: String,
    /// 过滤时是否同时匹配 description
    pub match_on_description: bool,
}

impl From<&PackageChoice> for PickItem {
    fn from(choice: &PackageChoice) -> Self {
        PickItem {
            label: choice.label.clone(),
            description: choice.description.clone(),
        }
    }
}

impl From<&VersionChoice> for PickItem {
    fn from(choice: &VersionChoice) -> Self {
        PickItem {
            label: choice.label.clone(),
            description: String::new(),
        }
    }
}

/// 浏览流程的包列表，description 同为包名以便按描述匹配
pub fn package_choices(index: &PackageIndex) -> Vec<PackageChoice> {
    index
        .iter()
        .map(|(name, versions)| PackageChoice {
            label: name.to_string(),
            description: name.to_string(),
            versions: versions.to_vec(),
        })
        .collect()
}

/// 安装流程的包列表，不带描述
pub fn install_choices(index: &PackageIndex) -> Vec<PackageChoice> {
    index
        .iter()
        .map(|(name, versions)| PackageChoice {
            label: name.to_string(),
            description: String::new(),
            versions: versions.to_vec(),
        })
        .collect()
}

pub fn version_choices(choice: &PackageChoice) -> Vec<VersionChoice> {
    choice
        .versions
        .iter()
        .map(|v| VersionChoice { label: v.clone() })
        .collect()
}
