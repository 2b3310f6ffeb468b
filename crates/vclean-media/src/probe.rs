//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::command::{check_ffprobe, FFPROBE};
use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Whether the file carries a (non cover-art) video stream
    pub has_video: bool,
    pub has_audio: bool,
    /// Width in pixels, 0 for audio-only
    pub width: u32,
    /// Height in pixels, 0 for audio-only
    pub height: u32,
    /// Frame rate (fps), 0 for audio-only
    pub fps: f64,
    /// Codec of the primary stream
    pub codec: String,
    /// File size in bytes
    pub size: u64,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// FFprobe invocation settings.
#[derive(Debug, Clone)]
pub struct Prober {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(FFPROBE),
            timeout: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Probe a media file for information.
    pub async fn probe(&self, path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let binary = check_ffprobe(&self.binary)?;

        let output = Command::new(binary)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| MediaError::Timeout {
                    tool: FFPROBE.to_string(),
                    secs: limit.as_secs(),
                })??,
            None => output.await?,
        };

        if !output.status.success() {
            return Err(MediaError::tool_failed(
                FFPROBE,
                format!("could not read {}", path.display()),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
                output.status.code(),
            ));
        }

        parse_probe_output(&output.stdout)
    }

    /// Get media duration in seconds.
    pub async fn duration(&self, path: impl AsRef<Path>) -> MediaResult<f64> {
        Ok(self.probe(path).await?.duration)
    }
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    // Embedded cover art shows up as a video stream; it is not picture content.
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video" && s.disposition.attached_pic == 0);
    let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

    if video_stream.is_none() && audio_stream.is_none() {
        return Err(MediaError::InvalidMedia(
            "No audio or video stream found".to_string(),
        ));
    }

    let duration = probe
        .format
        .duration
        .as_deref()
        .or_else(|| video_stream.or(audio_stream).and_then(|s| s.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| MediaError::InvalidMedia("Missing or zero duration".to_string()))?;

    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let fps = video_stream
        .and_then(|v| v.avg_frame_rate.as_ref().or(v.r_frame_rate.as_ref()))
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(0.0);

    let primary = video_stream.or(audio_stream);

    Ok(MediaInfo {
        duration,
        has_video: video_stream.is_some(),
        has_audio: audio_stream.is_some(),
        width: video_stream.and_then(|v| v.width).unwrap_or(0),
        height: video_stream.and_then(|v| v.height).unwrap_or(0),
        fps,
        codec: primary
            .and_then(|s| s.codec_name.clone())
            .unwrap_or_default(),
        size,
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            Some(num / den)
        } else {
            None
        }
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
    }

    #[test]
    fn test_parse_video_output() {
        let json = br#"{
            "format": {"duration": "62.500000", "size": "1048576"},
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080, "avg_frame_rate": "30/1"},
                {"codec_type": "audio", "codec_name": "aac"}
            ]
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!(info.has_video && info.has_audio);
        assert_eq!(info.duration, 62.5);
        assert_eq!(info.width, 1920);
        assert_eq!(info.codec, "h264");
    }

    #[test]
    fn test_cover_art_is_audio_only() {
        let json = br#"{
            "format": {"duration": "180.0"},
            "streams": [
                {"codec_type": "audio", "codec_name": "mp3"},
                {"codec_type": "video", "codec_name": "mjpeg", "disposition": {"attached_pic": 1}}
            ]
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!(!info.has_video);
        assert_eq!(info.codec, "mp3");
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let json = br#"{"format": {"duration": "0.0"}, "streams": [{"codec_type": "audio"}]}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::InvalidMedia(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = Prober::new()
            .probe("/nonexistent/vclean/input.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
