//! 播放器状态
//!
//! 队列、当前位置与播放意图的唯一来源，不直接接触音频硬件。
//! 界面发出命令 -> store 修改状态 -> 通知订阅者 -> 界面重新读取。

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::Episode;

/// 播放器状态快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    queue: Vec<Episode>,
    current_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    progress: Option<u64>,
    error: Option<String>,
    selection: u64,
}

impl PlayerState {
    pub fn queue(&self) -> &[Episode] {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|idx| self.queue.get(idx))
    }

    /// 播放意图，而非硬件的实际状态
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    /// 当前曲目的已播放秒数，空闲时为 `None`
    pub fn progress(&self) -> Option<u64> {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 选曲计数，每次选中曲目（包括重新选中同一集）时递增
    pub fn selection(&self) -> u64 {
        self.selection
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_index
            .is_some_and(|idx| idx + 1 < self.queue.len())
    }

    pub fn has_previous(&self) -> bool {
        self.current_index.is_some_and(|idx| idx > 0)
    }

    /// 队列不足两集时随机播放按钮不可用
    pub fn can_shuffle(&self) -> bool {
        self.queue.len() > 1
    }

    fn select(&mut self, index: usize) {
        self.current_index = Some(index);
        self.progress = Some(0);
        self.error = None;
        self.selection += 1;
    }
}

/// 播放器命令（界面 -> store）
#[derive(Debug, Clone)]
pub enum PlayerAction {
    Play(Episode),
    PlayList {
        episodes: Vec<Episode>,
        start_index: usize,
    },
    TogglePlay,
    ToggleLoop,
    ToggleShuffle,
    SetPlaying(bool),
    PlayNext,
    PlayPrevious,
    Clear,
    SetProgress(u64),
    SetError(String),
}

/// 播放器状态容器
///
/// 每个会话创建一次，以引用方式传给所有使用者。
#[derive(Debug, Default)]
pub struct PlayerStore {
    state: PlayerState,
    subscribers: Vec<Sender<()>>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// 订阅状态变更
    ///
    /// 每个订阅者最多积压一条通知，收到后重新读取 `state()` 即可。
    pub fn subscribe(&mut self) -> Receiver<()> {
        let (tx, rx) = bounded(1);
        self.subscribers.push(tx);
        rx
    }

    pub fn dispatch(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::Play(episode) => self.play(episode),
            PlayerAction::PlayList {
                episodes,
                start_index,
            } => self.play_list(episodes, start_index),
            PlayerAction::TogglePlay => self.toggle_play(),
            PlayerAction::ToggleLoop => self.toggle_loop(),
            PlayerAction::ToggleShuffle => self.toggle_shuffle(),
            PlayerAction::SetPlaying(playing) => self.set_playing_state(playing),
            PlayerAction::PlayNext => self.play_next(),
            PlayerAction::PlayPrevious => self.play_previous(),
            PlayerAction::Clear => self.clear(),
            PlayerAction::SetProgress(seconds) => self.set_progress(seconds),
            PlayerAction::SetError(message) => self.set_error(message),
        }
    }

    /// 以单集替换队列并开始播放
    pub fn play(&mut self, episode: Episode) {
        log::debug!("play {}", episode.id);
        self.mutate(|state| {
            state.queue = vec![episode];
            state.select(0);
            state.is_playing = true;
            true
        });
    }

    /// 以列表替换队列，从 `start_index` 开始播放
    pub fn play_list(&mut self, episodes: Vec<Episode>, start_index: usize) {
        if episodes.is_empty() {
            self.clear();
            return;
        }

        let last = episodes.len() - 1;
        let index = if start_index > last {
            log::warn!(
                "play_list start index {} out of range for {} episodes",
                start_index,
                episodes.len()
            );
            last
        } else {
            start_index
        };

        log::debug!("play list of {} from {}", episodes.len(), index);
        self.mutate(|state| {
            state.queue = episodes;
            state.select(index);
            state.is_playing = true;
            true
        });
    }

    /// 切换播放意图；从暂停恢复时视为重试，清除上次的错误
    pub fn toggle_play(&mut self) {
        self.mutate(|state| {
            if state.is_idle() {
                return false;
            }
            state.is_playing = !state.is_playing;
            if state.is_playing {
                state.error = None;
            }
            true
        });
    }

    pub fn toggle_loop(&mut self) {
        self.mutate(|state| {
            state.is_looping = !state.is_looping;
            true
        });
    }

    pub fn toggle_shuffle(&mut self) {
        self.mutate(|state| {
            if !state.can_shuffle() {
                return false;
            }
            state.is_shuffling = !state.is_shuffling;
            true
        });
    }

    /// 直接设置播放意图，用于同步硬件自身的播放/暂停
    pub fn set_playing_state(&mut self, playing: bool) {
        self.mutate(|state| {
            if state.is_idle() || state.is_playing == playing {
                return false;
            }
            state.is_playing = playing;
            true
        });
    }

    pub fn play_next(&mut self) {
        self.mutate(|state| match state.current_index {
            Some(idx) if state.has_next() => {
                state.select(idx + 1);
                true
            }
            _ => false,
        });
    }

    pub fn play_previous(&mut self) {
        self.mutate(|state| match state.current_index {
            Some(idx) if state.has_previous() => {
                state.select(idx - 1);
                true
            }
            _ => false,
        });
    }

    /// 清空队列回到空闲状态，保留循环与随机开关
    pub fn clear(&mut self) {
        self.mutate(|state| {
            if state.is_idle() {
                return false;
            }
            state.queue.clear();
            state.current_index = None;
            state.is_playing = false;
            state.progress = None;
            state.error = None;
            true
        });
    }

    /// 记录播放进度（秒），超出时长时截断
    pub fn set_progress(&mut self, seconds: u64) {
        self.mutate(|state| {
            let Some(episode) = state.current_episode() else {
                return false;
            };
            let seconds = if episode.duration > 0 {
                seconds.min(episode.duration)
            } else {
                seconds
            };
            if state.progress == Some(seconds) {
                return false;
            }
            state.progress = Some(seconds);
            true
        });
    }

    /// 记录播放失败，同时取消播放意图
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.mutate(|state| {
            if state.is_idle() || (!state.is_playing && state.error.as_ref() == Some(&message)) {
                return false;
            }
            log::error!("playback error: {}", message);
            state.error = Some(message);
            state.is_playing = false;
            true
        });
    }

    fn mutate(&mut self, f: impl FnOnce(&mut PlayerState) -> bool) {
        if f(&mut self.state) {
            self.notify();
        }
    }

    fn notify(&mut self) {
        self.subscribers.retain(|tx| match tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        });
    }
}
