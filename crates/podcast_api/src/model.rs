//! 接口原始记录
//!
//! 服务端返回的节目 JSON 及其到 [`Episode`] 的转换。

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use podcast_player::Episode;

/// 接口返回的节目记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    pub file: ApiFile,
}

/// 音频文件描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFile {
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub duration: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Float(f64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
    })
}

fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Unsigned(n) => Ok(n),
        Scalar::Float(n) if n.is_finite() && n >= 0.0 => Ok(n.floor() as u64),
        Scalar::Float(n) => Err(serde::de::Error::custom(format!("invalid duration {n}"))),
        Scalar::Text(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<u64>()
                .or_else(|_| trimmed.parse::<f64>().map(|n| n.max(0.0).floor() as u64))
                .map_err(|_| serde::de::Error::custom(format!("invalid duration {text:?}")))
        }
    }
}

/// 将发布时间格式化为 `Jan 22 2021`，无法解析时原样返回
pub fn format_published_at(raw: &str) -> String {
    const DISPLAY: &str = "%b %-d %Y";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(DISPLAY).to_string();
    }

    log::debug!("unrecognised publication date {:?}", raw);
    raw.to_string()
}

impl ApiEpisode {
    /// 转换为播放器使用的节目记录
    pub fn into_episode(self) -> Episode {
        let mut episode = Episode::new(self.id, self.title, self.file.url)
            .with_members(self.members)
            .with_thumbnail(self.thumbnail)
            .with_duration(self.file.duration);

        if let Some(published_at) = self.published_at.as_deref() {
            episode = episode.with_published_at(format_published_at(published_at));
        }
        if let Some(description) = self.description {
            episode = episode.with_description(description);
        }
        episode
    }
}
