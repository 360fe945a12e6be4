//! 节目条目

use serde::{Deserialize, Serialize};

use crate::format_duration;

/// 单集节目
///
/// 构造后不再修改；展示用字段在拉取数据时一次性计算好。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub members: String,
    pub thumbnail: String,
    /// 音频地址（http(s)、file:// 或本地路径）
    pub url: String,
    /// 总时长（秒）
    pub duration: u64,
    /// 格式化后的发布日期
    #[serde(default)]
    pub published_at: Option<String>,
    /// 格式化后的时长
    #[serde(default)]
    pub duration_as_string: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Episode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_members(mut self, members: impl Into<String>) -> Self {
        self.members = members.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self.duration_as_string = Some(format_duration(duration));
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 展示用时长，缺省时现场格式化
    pub fn display_duration(&self) -> String {
        self.duration_as_string
            .clone()
            .unwrap_or_else(|| format_duration(self.duration))
    }
}
