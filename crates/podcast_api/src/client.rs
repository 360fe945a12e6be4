//! 节目接口客户端

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use podcast_player::Episode;

use crate::http::{get_text_with_retries, ApiError, RetryPolicy};
use crate::{ApiEpisode, EpisodeQuery};

/// 接口客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 服务根地址，例如 `http://localhost:3333`
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// 总尝试次数（含首次）
    pub attempts: usize,
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333".to_string(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 15_000,
            attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            attempts: self.attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// 节目数据源
pub trait EpisodeSource: Send + Sync {
    /// 按查询拉取节目列表
    fn episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, ApiError>;

    /// 按 id 拉取单集
    fn episode(&self, id: &str) -> Result<Episode, ApiError>;
}

/// 基于 HTTP 的数据源
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            policy: config.retry_policy(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 在根地址后追加路径段，每段单独做百分号编码
    fn endpoint(&self, segments: &[&str]) -> Result<String, ApiError> {
        let invalid = || ApiError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }
}

impl EpisodeSource for ApiClient {
    fn episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, ApiError> {
        let url = self.endpoint(&["episodes"])?;
        log::debug!("fetching episode list from {}", url);

        let body = get_text_with_retries(&url, &query.to_params(), &self.policy)?;
        let records: Vec<ApiEpisode> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(records.into_iter().map(ApiEpisode::into_episode).collect())
    }

    fn episode(&self, id: &str) -> Result<Episode, ApiError> {
        let url = self.endpoint(&["episodes", id])?;
        log::debug!("fetching episode {}", id);

        let body = match get_text_with_retries(&url, &[], &self.policy) {
            Ok(body) => body,
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e),
        };

        let record: ApiEpisode =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(record.into_episode())
    }
}
