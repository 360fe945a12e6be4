//! 音频输出
//!
//! cpal 输出流 + 有界采样队列。解码线程写入，设备回调读取。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

/// 音频输出错误
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("No audio output device")]
    NoDevice,
    #[error("Output device cannot play {0} Hz float audio")]
    NoConfig(u32),
    #[error("Output stream failed: {0}")]
    Stream(String),
}

/// 输出流参数
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub sample_rate: u32,
    /// 来源声道数
    pub channels: u16,
    /// 采样队列容量（采样数）
    pub queue_capacity: usize,
    pub volume: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            queue_capacity: 32768,
            volume: 1.0,
        }
    }
}

/// 与设备回调共享的状态
struct Shared {
    queue: SampleQueue,
    unpaused: AtomicBool,
    gain_bits: AtomicU32,
    frames_played: AtomicU64,
}

/// 默认设备上的输出流
pub struct AudioOutput {
    _stream: cpal::Stream,
    shared: Arc<Shared>,
    source_channels: u16,
    device_channels: u16,
    sample_rate: u32,
}

/// 选择设备支持的 f32 配置：优先相同声道数，其次立体声
fn choose_stream_config(device: &cpal::Device, config: &OutputConfig) -> Result<StreamConfig, OutputError> {
    let rate = config.sample_rate;
    let candidates: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| OutputError::Stream(e.to_string()))?
        .filter(|range| {
            range.sample_format() == SampleFormat::F32
                && (range.min_sample_rate().0..=range.max_sample_rate().0).contains(&rate)
        })
        .collect();

    let chosen = [config.channels, 2]
        .iter()
        .find_map(|&wanted| candidates.iter().find(|range| range.channels() == wanted))
        .or_else(|| candidates.first())
        .cloned()
        .ok_or(OutputError::NoConfig(rate))?;

    Ok(chosen.with_sample_rate(cpal::SampleRate(rate)).into())
}

impl AudioOutput {
    /// 在系统默认输出设备上打开暂停状态的流
    pub fn open_default(config: OutputConfig) -> Result<Self, OutputError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(OutputError::NoDevice)?;

        let stream_config = choose_stream_config(&device, &config)?;
        let device_channels = stream_config.channels;
        let frame_width = usize::from(device_channels.max(1));

        let shared = Arc::new(Shared {
            queue: SampleQueue::new(config.queue_capacity),
            unpaused: AtomicBool::new(false),
            gain_bits: AtomicU32::new(config.volume.clamp(0.0, 1.0).to_bits()),
            frames_played: AtomicU64::new(0),
        });

        let callback_shared = Arc::clone(&shared);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let shared = &callback_shared;
                    if !shared.unpaused.load(Ordering::Relaxed) {
                        out.fill(0.0);
                        return;
                    }

                    let filled = shared.queue.pop_into(out);
                    let gain = f32::from_bits(shared.gain_bits.load(Ordering::Relaxed));
                    out[..filled].iter_mut().for_each(|s| *s *= gain);
                    out[filled..].fill(0.0);
                    shared
                        .frames_played
                        .fetch_add((filled / frame_width) as u64, Ordering::Relaxed);
                },
                |err| log::error!("audio output stream error: {}", err),
                None,
            )
            .map_err(|e| OutputError::Stream(e.to_string()))?;
        stream.play().map_err(|e| OutputError::Stream(e.to_string()))?;

        log::debug!(
            "output stream {} Hz, {} -> {} channels",
            config.sample_rate,
            config.channels,
            device_channels
        );

        Ok(Self {
            _stream: stream,
            shared,
            source_channels: config.channels,
            device_channels,
            sample_rate: config.sample_rate,
        })
    }

    /// 写入来源布局的交错采样；队列放不下时整段拒绝并返回 `false`
    pub fn write(&self, samples: &[f32]) -> bool {
        if self.source_channels == self.device_channels {
            self.shared.queue.push_all(samples)
        } else {
            let remapped = remap_channels(samples, self.source_channels, self.device_channels);
            self.shared.queue.push_all(&remapped)
        }
    }

    /// 队列低于一半时继续解码
    pub fn wants_data(&self) -> bool {
        self.shared.queue.len() < self.shared.queue.capacity / 2
    }

    pub fn is_drained(&self) -> bool {
        self.shared.queue.len() == 0
    }

    pub fn set_playing(&self, playing: bool) {
        self.shared.unpaused.store(playing, Ordering::Relaxed);
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared
            .gain_bits
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// 自上次重置以来设备实际输出的时长
    pub fn position(&self) -> Duration {
        let frames = self.shared.frames_played.load(Ordering::Relaxed);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate.max(1)))
    }

    /// 跳转后丢弃已排队的采样并重新计时
    pub fn reset(&self) {
        self.shared.queue.clear();
        self.shared.frames_played.store(0, Ordering::Relaxed);
    }
}

/// 在不同声道数之间转换交错采样：下混到单声道取平均，其余按声道循环复制
pub fn remap_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = usize::from(from.max(1));
    let to = usize::from(to.max(1));
    let mut out = Vec::with_capacity(samples.len() / from * to);

    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            out.extend((0..to).map(|c| frame[c % from]));
        }
    }

    out
}

/// 有界采样队列，只接受能整段放下的写入
struct SampleQueue {
    samples: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SampleQueue {
    fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<f32>> {
        self.samples.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn push_all(&self, data: &[f32]) -> bool {
        let mut samples = self.lock();
        if samples.len() + data.len() > self.capacity {
            return false;
        }
        samples.extend(data);
        true
    }

    fn pop_into(&self, out: &mut [f32]) -> usize {
        let mut samples = self.lock();
        let count = out.len().min(samples.len());
        for (dst, src) in out.iter_mut().zip(samples.drain(..count)) {
            *dst = src;
        }
        count
    }
}
