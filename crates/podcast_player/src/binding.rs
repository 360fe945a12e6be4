//! 播放绑定
//!
//! 让唯一的音频句柄与 `PlayerStore` 保持一致，并把硬件事件转换为 store 命令。
//! 句柄只在这里被命令播放/暂停；store 从不直接接触硬件。

use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::{AudioHandle, HandleError, HardwareEvent, PlayerStore};

/// 当前曲目在句柄中的加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Pending,
    Ready,
    Failed,
}

/// 已交给句柄的曲目
#[derive(Debug)]
struct Attachment {
    /// 对应 `PlayerState::selection`
    selection: u64,
    load: LoadState,
}

/// 播放绑定
pub struct PlaybackBinding<H: AudioHandle> {
    handle: H,
    attached: Option<Attachment>,
    /// 句柄当前已知的播放状态
    applied_playing: bool,
    applied_looping: bool,
}

impl<H: AudioHandle> PlaybackBinding<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            attached: None,
            applied_playing: false,
            applied_looping: false,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// 把 store 的最新状态同步到句柄
    ///
    /// 可以在每次状态变更（或每帧）后调用，没有差异时不会发出任何命令。
    /// 重新选中曲目或在加载失败后恢复播放时会重新加载。
    pub fn sync(&mut self, store: &mut PlayerStore) {
        let state = store.state();
        let current = state
            .current_episode()
            .map(|episode| (state.selection(), episode.url.clone()));
        let playing = state.is_playing();
        let looping = state.is_looping();

        if let Err(e) = self.reconcile(current, playing, looping) {
            self.applied_playing = false;
            store.set_error(e.to_string());
        }
    }

    fn reconcile(
        &mut self,
        current: Option<(u64, String)>,
        playing: bool,
        looping: bool,
    ) -> Result<(), HandleError> {
        let Some((selection, url)) = current else {
            if self.attached.take().is_some() {
                log::debug!("detaching audio handle");
                self.handle.unload()?;
            }
            self.applied_playing = false;
            return Ok(());
        };

        let needs_load = match &self.attached {
            Some(attached) if attached.selection == selection => {
                attached.load == LoadState::Failed && playing
            }
            _ => true,
        };

        if needs_load {
            log::debug!("attaching {} (selection {})", url, selection);
            self.handle.load(&url)?;
            self.attached = Some(Attachment {
                selection,
                load: LoadState::Pending,
            });
            // 新曲目加载后处于暂停状态
            self.applied_playing = false;
            self.handle.set_looping(looping)?;
            self.applied_looping = looping;
        }

        if looping != self.applied_looping {
            self.handle.set_looping(looping)?;
            self.applied_looping = looping;
        }

        if playing != self.applied_playing {
            if playing {
                self.handle.play()?;
            } else {
                self.handle.pause()?;
            }
            self.applied_playing = playing;
        }

        Ok(())
    }

    /// 处理单个硬件事件，随后重新同步
    pub fn handle_event(&mut self, store: &mut PlayerStore, event: HardwareEvent) {
        match event {
            HardwareEvent::TimeUpdate(seconds) => {
                store.set_progress(seconds);
            }
            HardwareEvent::Played => {
                self.applied_playing = true;
                store.set_playing_state(true);
            }
            HardwareEvent::Paused => {
                self.applied_playing = false;
                store.set_playing_state(false);
            }
            HardwareEvent::Ended => self.on_ended(store),
            HardwareEvent::Loaded(info) => {
                if let Some(attached) = &mut self.attached {
                    attached.load = LoadState::Ready;
                }
                log::debug!(
                    "loaded {} ({}, {} Hz, {} ch)",
                    info.url,
                    info.codec,
                    info.sample_rate,
                    info.channels
                );
            }
            HardwareEvent::Error(message) => self.on_error(store, message),
        }

        self.sync(store);
    }

    fn on_error(&mut self, store: &mut PlayerStore, message: String) {
        self.applied_playing = false;
        match &mut self.attached {
            // 加载失败后句柄里没有曲目，后续报错只是连带结果
            Some(attached) if attached.load == LoadState::Failed => {
                log::debug!("ignoring follow-up error after failed load: {}", message);
                return;
            }
            Some(attached) if attached.load == LoadState::Pending => {
                attached.load = LoadState::Failed;
            }
            _ => {}
        }
        store.set_error(message);
    }

    fn on_ended(&mut self, store: &mut PlayerStore) {
        self.applied_playing = false;
        let state = store.state();

        if state.is_looping() {
            // 引擎在收到循环标志前已经播完，手动从头开始
            log::debug!("track ended while looping, restarting");
            store.set_progress(0);
            if let Err(e) = self.handle.seek(Duration::ZERO) {
                store.set_error(e.to_string());
            }
        } else if state.has_next() {
            store.play_next();
        } else {
            store.clear();
        }
    }

    /// 处理通道中所有待处理的事件
    pub fn pump(&mut self, store: &mut PlayerStore, events: &Receiver<HardwareEvent>) -> usize {
        let mut handled = 0;
        for event in events.try_iter() {
            self.handle_event(store, event);
            handled += 1;
        }
        self.sync(store);
        handled
    }

    /// 用户拖动进度条：转发给句柄，并立即更新 store 中的进度
    pub fn seek(&mut self, store: &mut PlayerStore, seconds: u64) {
        if store.state().is_idle() {
            return;
        }

        match self.handle.seek(Duration::from_secs(seconds)) {
            Ok(()) => store.set_progress(seconds),
            Err(e) => store.set_error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Episode, TrackInfo};
    use crossbeam_channel::unbounded;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(String),
        Unload,
        Play,
        Pause,
        Seek(Duration),
        SetLooping(bool),
    }

    #[derive(Default)]
    struct FakeHandle {
        calls: Vec<Call>,
        position: Duration,
        fail_with: Option<HandleError>,
    }

    impl FakeHandle {
        fn record(&mut self, call: Call) -> Result<(), HandleError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.calls.push(call);
            Ok(())
        }

        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl AudioHandle for FakeHandle {
        fn load(&mut self, url: &str) -> Result<(), HandleError> {
            self.position = Duration::ZERO;
            self.record(Call::Load(url.to_string()))
        }

        fn unload(&mut self) -> Result<(), HandleError> {
            self.record(Call::Unload)
        }

        fn play(&mut self) -> Result<(), HandleError> {
            self.record(Call::Play)
        }

        fn pause(&mut self) -> Result<(), HandleError> {
            self.record(Call::Pause)
        }

        fn seek(&mut self, position: Duration) -> Result<(), HandleError> {
            self.position = position;
            self.record(Call::Seek(position))
        }

        fn set_looping(&mut self, looping: bool) -> Result<(), HandleError> {
            self.record(Call::SetLooping(looping))
        }

        fn current_time(&self) -> Duration {
            self.position
        }
    }

    fn episode(id: &str) -> Episode {
        Episode::new(id, id.to_uppercase(), format!("https://cdn.test/{}.mp3", id))
            .with_duration(300)
    }

    fn setup() -> (PlayerStore, PlaybackBinding<FakeHandle>) {
        (PlayerStore::new(), PlaybackBinding::new(FakeHandle::default()))
    }

    #[test]
    fn test_play_loads_and_starts_handle() {
        let (mut store, mut binding) = setup();
        store.play(episode("x"));
        binding.sync(&mut store);

        assert_eq!(
            binding.handle().calls,
            vec![
                Call::Load("https://cdn.test/x.mp3".to_string()),
                Call::SetLooping(false),
                Call::Play,
            ]
        );
        assert!(binding.is_attached());
    }

    #[test]
    fn test_toggle_play_pauses_exactly_once() {
        let (mut store, mut binding) = setup();
        store.play(episode("x"));
        binding.sync(&mut store);

        store.toggle_play();
        binding.sync(&mut store);
        binding.sync(&mut store);

        assert!(!store.state().is_playing());
        assert_eq!(binding.handle().count(&Call::Pause), 1);
    }

    #[test]
    fn test_sync_without_changes_is_silent() {
        let (mut store, mut binding) = setup();
        store.play(episode("x"));
        binding.sync(&mut store);
        let calls = binding.handle().calls.len();

        binding.sync(&mut store);
        assert_eq!(binding.handle().calls.len(), calls);
    }

    #[test]
    fn test_track_change_reloads_handle() {
        let (mut store, mut binding) = setup();
        store.play_list(vec![episode("a"), episode("b"), episode("c")], 0);
        binding.sync(&mut store);
        store.play_next();
        binding.sync(&mut store);

        assert_eq!(
            binding.handle().count(&Call::Load("https://cdn.test/b.mp3".to_string())),
            1
        );
        assert_eq!(binding.handle().count(&Call::Play), 2);
        assert_eq!(binding.handle().current_time(), Duration::ZERO);
    }

    #[test]
    fn test_ended_advances_to_next() {
        let (mut store, mut binding) = setup();
        store.play_list(vec![episode("a"), episode("b")], 0);
        binding.sync(&mut store);

        binding.handle_event(&mut store, HardwareEvent::Ended);

        assert_eq!(store.state().current_index(), Some(1));
        assert!(store.state().is_playing());
        assert_eq!(
            binding.handle().calls.last(),
            Some(&Call::Play),
        );
    }

    #[test]
    fn test_ended_at_end_of_queue_goes_idle() {
        let (mut store, mut binding) = setup();
        store.play_list(vec![episode("a"), episode("b")], 1);
        binding.sync(&mut store);
        assert!(!store.state().has_next());

        binding.handle_event(&mut store, HardwareEvent::Ended);

        assert!(store.state().is_idle());
        assert!(store.state().queue().is_empty());
        assert!(!binding.is_attached());
        assert_eq!(binding.handle().calls.last(), Some(&Call::Unload));
    }

    #[test]
    fn test_ended_while_looping_restarts_same_track() {
        let (mut store, mut binding) = setup();
        store.play_list(vec![episode("a"), episode("b")], 0);
        store.toggle_loop();
        binding.sync(&mut store);
        store.set_progress(300);

        binding.handle_event(&mut store, HardwareEvent::Ended);

        assert_eq!(store.state().current_index(), Some(0));
        assert_eq!(store.state().progress(), Some(0));
        assert!(binding.handle().calls.contains(&Call::Seek(Duration::ZERO)));
        assert_eq!(binding.handle().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn test_toggle_loop_is_forwarded() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);
        store.toggle_loop();
        binding.sync(&mut store);

        assert_eq!(binding.handle().calls.last(), Some(&Call::SetLooping(true)));
    }

    #[test]
    fn test_native_pause_does_not_echo_back() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);
        let calls = binding.handle().calls.len();

        binding.handle_event(&mut store, HardwareEvent::Paused);
        assert!(!store.state().is_playing());

        binding.handle_event(&mut store, HardwareEvent::Played);
        assert!(store.state().is_playing());

        assert_eq!(binding.handle().calls.len(), calls);
    }

    #[test]
    fn test_time_updates_feed_progress() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);

        binding.handle_event(&mut store, HardwareEvent::TimeUpdate(12));
        assert_eq!(store.state().progress(), Some(12));
    }

    #[test]
    fn test_seek_updates_progress_optimistically() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);

        binding.seek(&mut store, 90);

        assert_eq!(store.state().progress(), Some(90));
        assert_eq!(
            binding.handle().calls.last(),
            Some(&Call::Seek(Duration::from_secs(90)))
        );
    }

    #[test]
    fn test_seek_while_idle_is_ignored() {
        let (mut store, mut binding) = setup();
        binding.seek(&mut store, 10);
        assert!(binding.handle().calls.is_empty());
    }

    #[test]
    fn test_clear_detaches_and_replay_reattaches() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);
        store.clear();
        binding.sync(&mut store);
        assert!(!binding.is_attached());

        store.play(episode("a"));
        binding.sync(&mut store);
        assert!(binding.is_attached());
        assert_eq!(
            binding.handle().count(&Call::Load("https://cdn.test/a.mp3".to_string())),
            2
        );
    }

    #[test]
    fn test_hardware_error_is_surfaced() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);

        binding.handle_event(
            &mut store,
            HardwareEvent::Error("Failed to open source".to_string()),
        );

        assert_eq!(store.state().error(), Some("Failed to open source"));
        assert!(!store.state().is_playing());
        assert_eq!(binding.handle().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn test_handle_failure_is_surfaced() {
        let (mut store, mut binding) = setup();
        binding.handle_mut().fail_with = Some(HandleError::Disconnected);
        store.play(episode("a"));
        binding.sync(&mut store);

        assert_eq!(
            store.state().error(),
            Some(HandleError::Disconnected.to_string().as_str())
        );
        assert!(!store.state().is_playing());
    }

    #[test]
    fn test_pump_drains_events() {
        let (mut store, mut binding) = setup();
        let (tx, rx) = unbounded();
        store.play_list(vec![episode("a"), episode("b")], 0);
        binding.sync(&mut store);

        tx.send(HardwareEvent::Loaded(TrackInfo::default())).unwrap();
        tx.send(HardwareEvent::TimeUpdate(3)).unwrap();
        tx.send(HardwareEvent::Ended).unwrap();

        assert_eq!(binding.pump(&mut store, &rx), 3);
        assert_eq!(store.state().current_index(), Some(1));
        assert_eq!(store.state().progress(), Some(0));
    }

    fn failed_load(store: &mut PlayerStore, binding: &mut PlaybackBinding<FakeHandle>) {
        binding.handle_event(
            store,
            HardwareEvent::Error("Failed to open a: timeout".to_string()),
        );
    }

    #[test]
    fn test_replaying_after_failed_load_reloads() {
        let (mut store, mut binding) = setup();
        let load_a = Call::Load("https://cdn.test/a.mp3".to_string());
        store.play(episode("a"));
        binding.sync(&mut store);
        failed_load(&mut store, &mut binding);

        store.play(episode("a"));
        binding.sync(&mut store);
        assert_eq!(binding.handle().count(&load_a), 2);

        store.toggle_play();
        binding.sync(&mut store);
        store.toggle_play();
        binding.sync(&mut store);
        assert_eq!(binding.handle().count(&load_a), 2);
        assert_eq!(binding.handle().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn test_resume_after_failed_load_retries() {
        let (mut store, mut binding) = setup();
        let load_a = Call::Load("https://cdn.test/a.mp3".to_string());
        store.play(episode("a"));
        binding.sync(&mut store);
        failed_load(&mut store, &mut binding);
        assert!(!store.state().is_playing());
        assert_eq!(binding.handle().count(&load_a), 1);

        store.toggle_play();
        binding.sync(&mut store);

        assert_eq!(binding.handle().count(&load_a), 2);
        assert_eq!(binding.handle().calls.last(), Some(&Call::Play));
        assert_eq!(store.state().error(), None);

        binding.handle_event(&mut store, HardwareEvent::Loaded(TrackInfo::default()));
        binding.handle_event(&mut store, HardwareEvent::Error("Decode error".to_string()));
        assert_eq!(store.state().error(), Some("Decode error"));
        assert_eq!(binding.handle().count(&load_a), 2);
    }

    #[test]
    fn test_replaying_same_episode_restarts_hardware() {
        let (mut store, mut binding) = setup();
        store.play(episode("a"));
        binding.sync(&mut store);
        binding.handle_event(&mut store, HardwareEvent::Loaded(TrackInfo::default()));
        binding.handle_event(&mut store, HardwareEvent::TimeUpdate(40));

        store.play(episode("a"));
        binding.sync(&mut store);

        assert_eq!(store.state().progress(), Some(0));
        assert_eq!(
            binding.handle().count(&Call::Load("https://cdn.test/a.mp3".to_string())),
            2
        );
        assert_eq!(binding.handle().current_time(), Duration::ZERO);
    }

    #[test]
    fn test_failed_load_keeps_original_error() {
        let (mut store, mut binding) = setup();
        let (tx, rx) = unbounded();
        store.play(episode("a"));
        binding.sync(&mut store);

        tx.send(HardwareEvent::Error("Failed to open a: timeout".to_string()))
            .unwrap();
        tx.send(HardwareEvent::Error("No track loaded".to_string()))
            .unwrap();
        binding.pump(&mut store, &rx);

        assert_eq!(store.state().error(), Some("Failed to open a: timeout"));
        assert!(!store.state().is_playing());
    }
}
