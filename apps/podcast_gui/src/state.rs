//! 应用状态

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use podcast_api::{ApiError, EpisodeQuery, EpisodeSource, HomeListing};
use podcast_config::ListingConfig;
use podcast_player::{EngineHandle, Episode, HardwareEvent, PlaybackBinding, PlayerStore};

/// 当前页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Episode(String),
}

/// 远程数据的加载状态
#[derive(Debug, Clone)]
pub enum Remote<T> {
    Loading,
    Ready(T),
    Failed(String),
}

enum FetchEvent {
    Listing(Result<Vec<Episode>, ApiError>),
    Episode(String, Result<Episode, ApiError>),
}

/// 应用状态
pub struct AppState {
    pub store: PlayerStore,
    pub binding: PlaybackBinding<EngineHandle>,
    pub route: Route,
    pub listing: Remote<HomeListing>,
    pub episode: Option<Remote<Episode>>,
    pub volume: f32,
    /// 拖动进度条时的预览位置（秒）
    pub seek_preview: Option<u64>,

    engine_events: Receiver<HardwareEvent>,
    store_changes: Receiver<()>,

    // 后台拉取任务通信
    source: Arc<dyn EpisodeSource>,
    listing_config: ListingConfig,
    fetch_tx: Sender<FetchEvent>,
    fetch_rx: Receiver<FetchEvent>,
}

impl AppState {
    pub fn new(
        engine: EngineHandle,
        source: Arc<dyn EpisodeSource>,
        listing_config: ListingConfig,
        volume: f32,
    ) -> Self {
        let mut store = PlayerStore::new();
        let store_changes = store.subscribe();
        let engine_events = engine.events();
        let (fetch_tx, fetch_rx) = crossbeam_channel::unbounded();

        let mut state = Self {
            store,
            binding: PlaybackBinding::new(engine),
            route: Route::Home,
            listing: Remote::Loading,
            episode: None,
            volume,
            seek_preview: None,
            engine_events,
            store_changes,
            source,
            listing_config,
            fetch_tx,
            fetch_rx,
        };
        state.refresh_listing();
        state
    }

    /// 处理后台任务与播放引擎事件，返回本帧状态是否有变化
    pub fn poll(&mut self) -> bool {
        let fetched: Vec<_> = self.fetch_rx.try_iter().collect();
        let mut changed = !fetched.is_empty();

        for event in fetched {
            match event {
                FetchEvent::Listing(Ok(episodes)) => {
                    log::info!("loaded {} episodes", episodes.len());
                    self.listing = Remote::Ready(HomeListing::split(
                        episodes,
                        self.listing_config.latest_count,
                    ));
                }
                FetchEvent::Listing(Err(e)) => {
                    log::error!("failed to load episodes: {}", e);
                    self.listing = Remote::Failed(e.to_string());
                }
                FetchEvent::Episode(id, result) => {
                    // 只接受当前页面对应的结果
                    if self.route != Route::Episode(id) {
                        continue;
                    }
                    self.episode = Some(match result {
                        Ok(episode) => Remote::Ready(episode),
                        Err(e) => {
                            log::error!("failed to load episode: {}", e);
                            Remote::Failed(e.to_string())
                        }
                    });
                }
            }
        }

        self.binding.pump(&mut self.store, &self.engine_events);
        if self.store_changes.try_recv().is_ok() {
            changed = true;
        }
        changed
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.listing, Remote::Loading) || matches!(self.episode, Some(Remote::Loading))
    }

    pub fn refresh_listing(&mut self) {
        self.listing = Remote::Loading;
        let source = Arc::clone(&self.source);
        let query = EpisodeQuery::latest(self.listing_config.page_size);
        let tx = self.fetch_tx.clone();

        std::thread::spawn(move || {
            let _ = tx.send(FetchEvent::Listing(source.episodes(&query)));
        });
    }

    pub fn open_episode(&mut self, id: &str) {
        self.route = Route::Episode(id.to_string());
        self.episode = Some(Remote::Loading);

        let source = Arc::clone(&self.source);
        let id = id.to_string();
        let tx = self.fetch_tx.clone();

        std::thread::spawn(move || {
            let result = source.episode(&id);
            let _ = tx.send(FetchEvent::Episode(id, result));
        });
    }

    pub fn go_home(&mut self) {
        self.route = Route::Home;
        self.episode = None;
    }

    /// 修改 store 后立即同步到播放引擎
    pub fn update_player(&mut self, f: impl FnOnce(&mut PlayerStore)) {
        f(&mut self.store);
        self.binding.sync(&mut self.store);
    }

    /// 从首页列表的第 `index` 项开始播放整个列表
    pub fn play_from_listing(&mut self, index: usize) {
        let Remote::Ready(listing) = &self.listing else {
            return;
        };
        let queue = listing.queue();
        self.update_player(|store| store.play_list(queue, index));
    }

    pub fn play_episode(&mut self, episode: Episode) {
        self.update_player(|store| store.play(episode));
    }

    pub fn seek(&mut self, seconds: u64) {
        self.seek_preview = None;
        self.binding.seek(&mut self.store, seconds);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Err(e) = self.binding.handle().set_volume(volume) {
            log::warn!("failed to set volume: {}", e);
        }
    }
}
