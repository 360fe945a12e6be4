//! 播放引擎
//!
//! 独立线程负责加载、解码与输出，通过命令/事件通道与绑定层通信。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::{
    AudioDecoder, AudioHandle, AudioOutput, AudioSource, EngineCommand, HandleError,
    HardwareEvent, OutputConfig, SourceOptions, TrackInfo,
};

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 输出环形缓冲区容量（采样数）
    pub buffer_size: usize,
    /// 初始音量 (0.0 - 1.0)
    pub volume: f32,
    /// 远程音频下载上限（MiB）
    pub download_limit_mb: u64,
    /// 下载超时（秒）
    pub network_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32768,
            volume: 1.0,
            download_limit_mb: 512,
            network_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            timeout: Duration::from_secs(self.network_timeout_secs),
            max_bytes: self.download_limit_mb * 1024 * 1024,
        }
    }
}

/// 播放引擎句柄
pub struct EngineHandle {
    cmd_tx: Sender<EngineCommand>,
    evt_rx: Receiver<HardwareEvent>,
    position_ms: Arc<AtomicU64>,
}

/// 启动播放引擎
pub fn spawn_engine(config: EngineConfig) -> EngineHandle {
    let (cmd_tx, cmd_rx) = bounded(32);
    let (evt_tx, evt_rx) = unbounded();
    let position_ms = Arc::new(AtomicU64::new(0));

    let position = position_ms.clone();
    thread::spawn(move || {
        run_engine(cmd_rx, evt_tx, config, position);
    });

    EngineHandle {
        cmd_tx,
        evt_rx,
        position_ms,
    }
}

impl EngineHandle {
    /// 硬件事件接收端，可多次克隆
    pub fn events(&self) -> Receiver<HardwareEvent> {
        self.evt_rx.clone()
    }

    pub fn send(&self, cmd: EngineCommand) -> Result<(), HandleError> {
        self.cmd_tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => HandleError::Busy,
            TrySendError::Disconnected(_) => HandleError::Disconnected,
        })
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), HandleError> {
        self.send(EngineCommand::SetVolume(volume))
    }
}

impl AudioHandle for EngineHandle {
    fn load(&mut self, url: &str) -> Result<(), HandleError> {
        self.position_ms.store(0, Ordering::Relaxed);
        self.send(EngineCommand::Load(url.to_string()))
    }

    fn unload(&mut self) -> Result<(), HandleError> {
        self.send(EngineCommand::Unload)
    }

    fn play(&mut self) -> Result<(), HandleError> {
        self.send(EngineCommand::Play)
    }

    fn pause(&mut self) -> Result<(), HandleError> {
        self.send(EngineCommand::Pause)
    }

    fn seek(&mut self, position: Duration) -> Result<(), HandleError> {
        self.send(EngineCommand::Seek(position))
    }

    fn set_looping(&mut self, looping: bool) -> Result<(), HandleError> {
        self.send(EngineCommand::SetLooping(looping))
    }

    fn current_time(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::Relaxed))
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(EngineCommand::Shutdown);
    }
}

fn run_engine(
    cmd_rx: Receiver<EngineCommand>,
    evt_tx: Sender<HardwareEvent>,
    config: EngineConfig,
    position_ms: Arc<AtomicU64>,
) {
    let mut state = EngineState::new(config, evt_tx, position_ms);
    log::debug!("audio engine started");

    loop {
        // 播放中按固定间隔轮询，否则阻塞等待命令
        let cmd = if state.playback_state == PlaybackState::Playing {
            match cmd_rx.recv_timeout(Duration::from_millis(5)) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        if let Some(cmd) = cmd {
            if !state.handle_command(cmd) {
                break;
            }
        }

        if state.playback_state == PlaybackState::Playing {
            state.fill_output();
            state.update_position();
        }
    }

    log::debug!("audio engine stopped");
}

/// 引擎内部播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Stopped,
}

struct EngineState {
    config: EngineConfig,
    evt_tx: Sender<HardwareEvent>,
    playback_state: PlaybackState,
    current_track: Option<LoadedTrack>,
    volume: f32,
    looping: bool,
    position_base: Duration,
    position_ms: Arc<AtomicU64>,
    last_reported_second: Option<u64>,
}

struct LoadedTrack {
    decoder: AudioDecoder,
    output: AudioOutput,
    /// 输出缓冲已满时暂存的采样
    pending: Option<Vec<f32>>,
    /// 解码器已读到流末尾
    exhausted: bool,
}

/// 一次填充之后流的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    Continue,
    Restart,
    Ended,
}

/// 解码已读完、没有暂存采样且输出已排空时才算播完
fn stream_end(exhausted: bool, pending: bool, drained: bool, looping: bool) -> StreamEnd {
    if !(exhausted && !pending && drained) {
        StreamEnd::Continue
    } else if looping {
        StreamEnd::Restart
    } else {
        StreamEnd::Ended
    }
}

impl EngineState {
    fn new(config: EngineConfig, evt_tx: Sender<HardwareEvent>, position_ms: Arc<AtomicU64>) -> Self {
        Self {
            volume: config.volume.clamp(0.0, 1.0),
            config,
            evt_tx,
            playback_state: PlaybackState::Idle,
            current_track: None,
            looping: false,
            position_base: Duration::ZERO,
            position_ms,
            last_reported_second: None,
        }
    }

    fn emit(&self, event: HardwareEvent) {
        let _ = self.evt_tx.send(event);
    }

    fn handle_command(&mut self, cmd: EngineCommand) -> bool {
        log::debug!("engine command {:?}", cmd);
        match cmd {
            EngineCommand::Load(url) => self.load_track(url),
            EngineCommand::Unload => self.unload(),
            EngineCommand::Play => self.play(),
            EngineCommand::Pause => self.pause(),
            EngineCommand::Seek(pos) => self.seek(pos),
            EngineCommand::SetLooping(looping) => self.looping = looping,
            EngineCommand::SetVolume(vol) => {
                self.volume = vol.clamp(0.0, 1.0);
                if let Some(track) = &self.current_track {
                    track.output.set_volume(self.volume);
                }
            }
            EngineCommand::Shutdown => return false,
        }
        true
    }

    fn load_track(&mut self, url: String) {
        self.unload();

        match self.open_track(&url) {
            Ok((track, info)) => {
                self.current_track = Some(track);
                self.playback_state = PlaybackState::Paused;
                self.emit(HardwareEvent::Loaded(info));
            }
            Err(message) => {
                self.playback_state = PlaybackState::Idle;
                self.emit(HardwareEvent::Error(message));
            }
        }
    }

    fn open_track(&self, url: &str) -> Result<(LoadedTrack, TrackInfo), String> {
        let source = AudioSource::open(url, &self.config.source_options())
            .map_err(|e| format!("Failed to open {}: {}", url, e))?;

        let decoder =
            AudioDecoder::open(source).map_err(|e| format!("Failed to decode: {}", e))?;
        let info = decoder.info.clone();

        let output = AudioOutput::open_default(OutputConfig {
            sample_rate: info.sample_rate,
            channels: info.channels,
            queue_capacity: self.config.buffer_size,
            volume: self.volume,
        })
        .map_err(|e| format!("Audio output error: {}", e))?;

        let track_info = TrackInfo {
            url: url.to_string(),
            codec: info.codec,
            sample_rate: info.sample_rate,
            channels: info.channels,
            duration: info.duration,
        };

        Ok((
            LoadedTrack {
                decoder,
                output,
                pending: None,
                exhausted: false,
            },
            track_info,
        ))
    }

    fn unload(&mut self) {
        if let Some(track) = self.current_track.take() {
            track.output.set_playing(false);
        }
        self.playback_state = PlaybackState::Idle;
        self.position_base = Duration::ZERO;
        self.last_reported_second = None;
        self.position_ms.store(0, Ordering::Relaxed);
    }

    fn play(&mut self) {
        let Some(track) = &self.current_track else {
            self.emit(HardwareEvent::Error("No track loaded".to_string()));
            return;
        };

        if self.playback_state != PlaybackState::Playing {
            track.output.set_playing(true);
            self.playback_state = PlaybackState::Playing;
            self.emit(HardwareEvent::Played);
        }
    }

    fn pause(&mut self) {
        if let Some(track) = &self.current_track {
            if self.playback_state == PlaybackState::Playing {
                track.output.set_playing(false);
                self.playback_state = PlaybackState::Paused;
                self.emit(HardwareEvent::Paused);
            }
        }
    }

    fn seek(&mut self, pos: Duration) {
        let Some(track) = &mut self.current_track else {
            return;
        };

        match track.decoder.seek(pos) {
            Ok(()) => {
                track.output.reset();
                track.pending = None;
                track.exhausted = false;
                self.position_base = pos;
                self.last_reported_second = None;
                self.update_position();
            }
            Err(e) => self.emit(HardwareEvent::Error(format!("Seek error: {}", e))),
        }
    }

    fn fill_output(&mut self) {
        let Some(track) = &mut self.current_track else {
            return;
        };

        if let Err(message) = fill_track(track) {
            track.output.set_playing(false);
            self.playback_state = PlaybackState::Stopped;
            self.emit(HardwareEvent::Error(message));
            return;
        }

        let end = stream_end(
            track.exhausted,
            track.pending.is_some(),
            track.output.is_drained(),
            self.looping,
        );
        self.finish_stream(end);
    }

    /// 循环时从头开始且不发出 `Ended`；否则停止并发出一次 `Ended`
    fn finish_stream(&mut self, end: StreamEnd) {
        match end {
            StreamEnd::Continue => {}
            StreamEnd::Restart => {
                log::debug!("looping track");
                self.seek(Duration::ZERO);
            }
            StreamEnd::Ended => {
                if let Some(track) = &self.current_track {
                    track.output.set_playing(false);
                }
                self.playback_state = PlaybackState::Stopped;
                self.emit(HardwareEvent::Ended);
            }
        }
    }

    /// 每跨过一个整秒上报一次进度
    fn update_position(&mut self) {
        let Some(track) = &self.current_track else {
            return;
        };

        let pos = self.position_base + track.output.position();
        self.position_ms
            .store(pos.as_millis() as u64, Ordering::Relaxed);

        let second = pos.as_secs();
        if self.last_reported_second != Some(second) {
            self.last_reported_second = Some(second);
            self.emit(HardwareEvent::TimeUpdate(second));
        }
    }
}

/// 在输出缓冲允许的范围内持续解码，解码失败时返回错误信息
fn fill_track(track: &mut LoadedTrack) -> Result<(), String> {
    while track.output.wants_data() && !track.exhausted {
        let chunk = match track.pending.take() {
            Some(chunk) => chunk,
            None => match track.decoder.decode_next() {
                Ok(Some(samples)) => samples,
                Ok(None) => {
                    track.exhausted = true;
                    break;
                }
                Err(e) => return Err(format!("Decode error: {}", e)),
            },
        };

        if !track.output.write(&chunk) {
            if track.output.is_drained() {
                log::warn!("dropping {} samples larger than output buffer", chunk.len());
            } else {
                track.pending = Some(chunk);
            }
            break;
        }
    }
    Ok(())
}
