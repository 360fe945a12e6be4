//! podcast_player - 播放器核心
//!
//! 播放队列状态、与音频句柄的同步，以及基于 symphonia/cpal 的播放引擎。

mod binding;
mod command;
mod decoder;
mod engine;
mod episode;
mod handle;
mod output;
mod source;
mod store;
mod time_format;

pub use binding::*;
pub use command::*;
pub use decoder::*;
pub use engine::*;
pub use episode::*;
pub use handle::*;
pub use output::*;
pub use source::*;
pub use store::*;
pub use time_format::*;
