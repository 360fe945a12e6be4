//! UI 模块

pub mod deck;
pub mod episode;
pub mod header;
pub mod home;
pub mod theme;

pub use deck::PlayerDeck;
pub use episode::EpisodeView;
pub use header::Header;
pub use home::HomeView;
pub use theme::PodcastTheme;
