//! 节目音频解码
//!
//! 基于 symphonia，把已打开的 [`AudioSource`] 解码为交错 f32 采样。

use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

use crate::AudioSource;

/// 解码器错误
#[derive(thiserror::Error, Debug)]
pub enum DecoderError {
    #[error("Episode has no playable audio track")]
    NoAudioTrack,
    #[error("Unsupported codec {0}")]
    UnsupportedCodec(String),
    #[error("Corrupt or unrecognised audio: {0}")]
    Corrupt(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SymphoniaError> for DecoderError {
    fn from(e: SymphoniaError) -> Self {
        match e {
            SymphoniaError::IoError(io) => DecoderError::Io(io),
            other => DecoderError::Corrupt(other.to_string()),
        }
    }
}

/// 音轨参数
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration: Option<Duration>,
    pub codec: String,
}

impl AudioInfo {
    fn from_params(params: &CodecParameters) -> Self {
        let sample_rate = params.sample_rate.unwrap_or(44100);
        Self {
            sample_rate,
            channels: params.channels.map_or(2, |c| c.count() as u16),
            duration: params
                .n_frames
                .map(|frames| track_duration(params.time_base, frames, sample_rate)),
            codec: format!("{:?}", params.codec),
        }
    }
}

/// 按时间基换算总时长；缺少时间基时按采样率估算
fn track_duration(time_base: Option<TimeBase>, frames: u64, sample_rate: u32) -> Duration {
    match time_base {
        Some(tb) => {
            let time = tb.calc_time(frames);
            Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
        }
        None => Duration::from_secs_f64(frames as f64 / sample_rate.max(1) as f64),
    }
}

fn first_audio_track(format: &dyn FormatReader) -> Option<&Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
}

/// 单集音频解码器
pub struct AudioDecoder {
    reader: Box<dyn FormatReader>,
    codec: Box<dyn Decoder>,
    track_id: u32,
    scratch: Option<SampleBuffer<f32>>,
    pub info: AudioInfo,
}

impl AudioDecoder {
    /// 探测容器格式并为第一条音轨创建解码器
    pub fn open(source: AudioSource) -> Result<Self, DecoderError> {
        let mut hint = Hint::new();
        if let Some(ext) = source.hint() {
            hint.with_extension(ext);
        }
        let locator = source.locator.clone();

        let stream = MediaSourceStream::new(source.into_media(), Default::default());
        let format_options = FormatOptions {
            enable_gapless: true,
            ..Default::default()
        };
        let reader = symphonia::default::get_probe()
            .format(&hint, stream, &format_options, &MetadataOptions::default())?
            .format;

        let track = first_audio_track(reader.as_ref()).ok_or(DecoderError::NoAudioTrack)?;
        let track_id = track.id;
        let info = AudioInfo::from_params(&track.codec_params);
        let codec = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|_| DecoderError::UnsupportedCodec(info.codec.clone()))?;

        log::debug!(
            "{}: {} {} Hz {} ch, duration {:?}",
            locator,
            info.codec,
            info.sample_rate,
            info.channels,
            info.duration
        );

        Ok(Self {
            reader,
            codec,
            track_id,
            scratch: None,
            info,
        })
    }

    /// 解码下一段采样，流结束时返回 `None`
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>, DecoderError> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.codec.reset();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.codec.decode(&packet) {
                Ok(decoded) => decoded,
                // 损坏的包直接跳过
                Err(SymphoniaError::DecodeError(e)) => {
                    log::debug!("skipping corrupt packet: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let frames = decoded.capacity();
            let needed = frames * spec.channels.count();

            if self.scratch.as_ref().is_some_and(|buf| buf.capacity() < needed) {
                self.scratch = None;
            }
            let scratch = self
                .scratch
                .get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
            scratch.copy_interleaved_ref(decoded);

            return Ok(Some(scratch.samples().to_vec()));
        }
    }

    /// 跳转到指定位置，之后的采样从新位置开始
    pub fn seek(&mut self, position: Duration) -> Result<(), DecoderError> {
        self.reader.seek(
            SeekMode::Coarse,
            SeekTo::Time {
                time: Time::from(position.as_secs_f64()),
                track_id: Some(self.track_id),
            },
        )?;
        self.codec.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_time_base() {
        let duration = track_duration(Some(TimeBase::new(1, 44100)), 44100 * 90 + 22050, 44100);
        assert_eq!(duration, Duration::from_millis(90_500));
    }

    #[test]
    fn test_duration_without_time_base() {
        let duration = track_duration(None, 48000 * 3, 48000);
        assert_eq!(duration, Duration::from_secs(3));
    }

    #[test]
    fn test_open_rejects_non_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mp3");
        std::fs::write(&path, b"definitely not an mp3 frame").unwrap();

        let source = AudioSource::open(path.to_str().unwrap(), &Default::default()).unwrap();
        assert!(AudioDecoder::open(source).is_err());
    }
}
