//! 引擎命令和硬件事件定义

use std::time::Duration;

/// 引擎命令（绑定层 -> 引擎）
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// 加载音频地址，位置归零
    Load(String),
    /// 卸载当前曲目
    Unload,
    Play,
    Pause,
    /// 跳转到指定位置
    Seek(Duration),
    /// 播放结束后是否从头重播
    SetLooping(bool),
    /// 设置音量 (0.0 - 1.0)
    SetVolume(f32),
    Shutdown,
}

/// 硬件事件（引擎 -> 绑定层）
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareEvent {
    /// 播放进度（整秒）
    TimeUpdate(u64),
    /// 曲目播放结束（循环模式下不会发出）
    Ended,
    /// 开始播放
    Played,
    /// 已暂停
    Paused,
    /// 曲目已加载
    Loaded(TrackInfo),
    /// 加载或播放失败
    Error(String),
}

/// 曲目信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub url: String,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration: Option<Duration>,
}
