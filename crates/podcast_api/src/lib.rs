//! podcast_api - 节目数据源
//!
//! 从 json-server 风格的 REST 接口拉取节目列表与单集详情。

mod client;
mod http;
mod listing;
mod model;
mod query;
mod text;

#[cfg(test)]
mod test_server;

pub use client::*;
pub use http::{ApiError, RetryPolicy};
pub use listing::*;
pub use model::*;
pub use query::*;
pub use text::*;
