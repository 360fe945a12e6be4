//! 音频来源
//!
//! 将节目地址解析为可 seek 的字节流，供 symphonia 解码器使用。
//! 远程地址会先完整下载到内存中，以便支持跳转。

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use symphonia::core::io::MediaSource;
use url::Url;

/// 音频来源错误
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Http(String),

    #[error("Audio resource exceeds {0} bytes")]
    TooLarge(u64),

    #[error("Unsupported locator: {0}")]
    Unsupported(String),
}

/// 打开来源时的限制
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub timeout: Duration,
    pub max_bytes: u64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 512 * 1024 * 1024,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Locator<'a> {
    Remote(&'a str),
    Local(PathBuf),
}

fn classify(locator: &str) -> Result<Locator<'_>, SourceError> {
    // 单字母 scheme 是 Windows 盘符
    let url = match Url::parse(locator) {
        Ok(url) if url.scheme().len() > 1 => url,
        _ => return Ok(Locator::Local(PathBuf::from(locator))),
    };

    match url.scheme() {
        "http" | "https" => Ok(Locator::Remote(locator)),
        "file" => url
            .to_file_path()
            .map(Locator::Local)
            .map_err(|()| SourceError::Unsupported(locator.to_string())),
        _ => Err(SourceError::Unsupported(locator.to_string())),
    }
}

/// 从地址末段推断扩展名，作为格式探测提示
pub fn extension_hint(locator: &str) -> Option<String> {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator);
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;

    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// 已打开的音频来源
pub struct AudioSource {
    pub locator: String,
    hint: Option<String>,
    media: Box<dyn MediaSource>,
}

impl AudioSource {
    /// 打开本地路径、file:// 或 http(s) 地址
    pub fn open(locator: &str, options: &SourceOptions) -> Result<Self, SourceError> {
        let media: Box<dyn MediaSource> = match classify(locator)? {
            Locator::Remote(url) => Box::new(Cursor::new(download(url, options)?)),
            Locator::Local(path) => Box::new(open_file(&path)?),
        };

        Ok(Self {
            locator: locator.to_string(),
            hint: extension_hint(locator),
            media,
        })
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn into_media(self) -> Box<dyn MediaSource> {
        self.media
    }
}

fn open_file(path: &Path) -> Result<File, SourceError> {
    log::debug!("opening local audio {:?}", path);
    Ok(File::open(path)?)
}

fn download(url: &str, options: &SourceOptions) -> Result<Vec<u8>, SourceError> {
    log::debug!("downloading {}", url);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(options.timeout)
        .timeout_read(options.timeout)
        .build();

    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => {
            return Err(SourceError::Http(format!("HTTP status {status}")));
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(SourceError::Http(err.to_string()));
        }
    };

    let declared = response
        .header("Content-Length")
        .and_then(|len| len.parse::<u64>().ok());
    if declared.is_some_and(|len| len > options.max_bytes) {
        return Err(SourceError::TooLarge(options.max_bytes));
    }

    let mut data = Vec::with_capacity(declared.unwrap_or(0).min(options.max_bytes) as usize);
    response
        .into_reader()
        .take(options.max_bytes + 1)
        .read_to_end(&mut data)?;

    if data.len() as u64 > options.max_bytes {
        return Err(SourceError::TooLarge(options.max_bytes));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_locators() {
        assert_eq!(
            classify("https://cdn.test/a.mp3").unwrap(),
            Locator::Remote("https://cdn.test/a.mp3")
        );
        assert_eq!(
            classify("file:///tmp/a.mp3").unwrap(),
            Locator::Local(PathBuf::from("/tmp/a.mp3"))
        );
        assert_eq!(
            classify("episodes/a.mp3").unwrap(),
            Locator::Local(PathBuf::from("episodes/a.mp3"))
        );
        assert!(matches!(
            classify("ftp://host/a.mp3"),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(extension_hint("https://cdn.test/a.MP3").as_deref(), Some("mp3"));
        assert_eq!(
            extension_hint("https://cdn.test/ep/a.m4a?token=x.y#t=10").as_deref(),
            Some("m4a")
        );
        assert_eq!(extension_hint("https://cdn.test/stream"), None);
        assert_eq!(extension_hint("https://cdn.test.io/stream"), None);
    }

    #[test]
    fn test_open_local_file() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"RIFF0000WAVE").unwrap();

        let locator = file.path().to_string_lossy().to_string();
        let source = AudioSource::open(&locator, &SourceOptions::default()).unwrap();

        assert_eq!(source.hint(), Some("wav"));
        assert_eq!(source.locator, locator);
    }

    #[test]
    fn test_file_url_is_percent_decoded() {
        assert_eq!(
            classify("file:///tmp/My%20Show.mp3").unwrap(),
            Locator::Local(PathBuf::from("/tmp/My Show.mp3"))
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("My Show #1.wav");
        std::fs::write(&path, b"RIFF0000WAVE").unwrap();
        let locator = Url::from_file_path(&path).unwrap().to_string();
        assert!(locator.contains("%20"));

        let source = AudioSource::open(&locator, &SourceOptions::default()).unwrap();
        assert_eq!(source.hint(), Some("wav"));
    }

    #[test]
    fn test_open_missing_file() {
        let result = AudioSource::open("/definitely/missing/a.mp3", &SourceOptions::default());
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
