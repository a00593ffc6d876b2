use thiserror::Error;

/// 包索引拉取与解析过程中的错误
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("无法连接包索引: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("包索引请求失败 (状态码 {status}): {url}")]
    Status { url: String, status: u16 },

    #[error("包索引格式错误: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RegistryError {
    /// 网络层失败（连接失败或非成功状态码）
    pub fn is_transport(&self) -> bool {
        matches!(self, RegistryError::Transport(_) | RegistryError::Status { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, RegistryError::Parse(_))
    }
}
