//! 音频句柄抽象
//!
//! 绑定层只通过该 trait 控制音频输出，事件经由 `HardwareEvent` 通道回传。

use std::time::Duration;

/// 音频句柄错误
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("Audio engine is not running")]
    Disconnected,
    #[error("Audio engine queue is full")]
    Busy,
}

/// 单一音频输出句柄
pub trait AudioHandle {
    /// 加载音频地址并将位置归零
    fn load(&mut self, url: &str) -> Result<(), HandleError>;

    /// 卸载当前曲目，释放输出设备
    fn unload(&mut self) -> Result<(), HandleError>;

    /// 开始或恢复播放
    fn play(&mut self) -> Result<(), HandleError>;

    /// 暂停
    fn pause(&mut self) -> Result<(), HandleError>;

    /// 跳转到指定位置
    fn seek(&mut self, position: Duration) -> Result<(), HandleError>;

    /// 循环播放由硬件自行处理
    fn set_looping(&mut self, looping: bool) -> Result<(), HandleError>;

    /// 最近一次观察到的播放位置
    fn current_time(&self) -> Duration;
}
