//! 列表查询参数

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 节目列表查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeQuery {
    pub limit: Option<usize>,
    pub sort: Option<String>,
    pub order: SortOrder,
}

impl Default for EpisodeQuery {
    fn default() -> Self {
        Self::latest(12)
    }
}

impl EpisodeQuery {
    /// 按发布时间倒序的最新 `limit` 集
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            sort: Some("published_at".to_string()),
            order: SortOrder::Desc,
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("_limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("_sort".to_string(), sort.clone()));
            params.push(("_order".to_string(), self.order.as_str().to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_params() {
        let params = EpisodeQuery::latest(12).to_params();
        assert_eq!(
            params,
            vec![
                ("_limit".to_string(), "12".to_string()),
                ("_sort".to_string(), "published_at".to_string()),
                ("_order".to_string(), "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_unsorted_query_omits_order() {
        let query = EpisodeQuery {
            limit: None,
            sort: None,
            order: SortOrder::Asc,
        };
        assert!(query.to_params().is_empty());
    }
}
