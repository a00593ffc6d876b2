//! 包索引客户端：拉取并校验 all-packages 索引

use crate::config::Config;
use crate::error::RegistryError;
use reqwest::Client;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// 包名 → 版本列表，保持索引文档中的原始顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    entries: Vec<(String, Vec<String>)>,
}

impl PackageIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, versions)| (name.as_str(), versions.as_slice()))
    }

    #[allow(dead_code)]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, versions)| versions.as_slice())
    }
}

/// 重复键时保留首次出现的位置、采用最后一次的值；空版本列表的条目被丢弃
#[derive(Default)]
struct IndexBuilder {
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl IndexBuilder {
    fn insert(&mut self, name: String, versions: Vec<String>) {
        match self.positions.get(&name) {
            Some(&pos) => self.entries[pos].1 = versions,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, versions));
            }
        }
    }

    fn finish(self) -> PackageIndex {
        let entries = self
            .entries
            .into_iter()
            .filter(|(name, versions)| {
                if versions.is_empty() {
                    log::warn!("忽略没有任何版本的包: {}", name);
                    false
                } else {
                    true
                }
            })
            .collect();
        PackageIndex { entries }
    }
}

impl<'de> Deserialize<'de> for PackageIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = PackageIndex;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping package names to arrays of version strings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut builder = IndexBuilder::default();
                while let Some((name, versions)) = map.next_entry::<String, Vec<String>>()? {
                    builder.insert(name, versions);
                }
                Ok(builder.finish())
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}

/// 解析索引响应体
pub fn parse_index(body: &str) -> Result<PackageIndex, RegistryError> {
    Ok(serde_json::from_str(body)?)
}

/// 包索引来源；流程只依赖这个接口，便于替换
pub trait IndexSource {
    async fn fetch_index(&self) -> Result<PackageIndex, RegistryError>;
}

pub struct RegistryClient {
    client: Client,
    url: String,
}

impl RegistryClient {
    pub fn new(config: &Config) -> Result<Self, RegistryError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(RegistryError::Transport)?;
        Ok(Self::with_client(client, config.registry_url.clone()))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    #[allow(dead_code)]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl IndexSource for RegistryClient {
    /// 每次调用都重新请求，不做缓存
    async fn fetch_index(&self) -> Result<PackageIndex, RegistryError> {
        log::info!("拉取包索引: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(RegistryError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(RegistryError::Transport)?;
        let index = parse_index(&body)?;
        if index.is_empty() {
            log::warn!("包索引为空: {}", self.url);
        } else {
            log::debug!("包索引共 {} 个包", index.len());
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests;
