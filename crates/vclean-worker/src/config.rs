//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use vclean_media::pause_removal::DEFAULT_FILLERS;
use vclean_media::{AssembleOptions, EditConfig, FfmpegRunner, Prober};
use vclean_models::{CutMode, EncodingConfig};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Minimum inter-word gap removed as a pause (seconds)
    pub pause_threshold: f64,
    /// Time skipped after each cut (seconds)
    pub padding: f64,
    /// Time kept before a pause cut (seconds)
    pub tail_buffer: f64,
    /// Shortest keep segment that survives planning (seconds)
    pub min_segment: f64,
    /// Show the skip caption after pauses at least this long; 0 disables
    pub skip_indicator_secs: f64,
    /// Maximum concurrent FFmpeg cut processes per job
    pub max_parallel_cuts: usize,
    /// Wall-clock budget for each FFmpeg/FFprobe invocation
    pub tool_timeout: Duration,
    /// Work directory for temporary clips
    pub work_dir: String,
    /// Filler tokens
    pub fillers: Vec<String>,
    pub remove_fillers: bool,
    /// Keep temporary clips after the job
    pub keep_temp: bool,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pause_threshold: 1.0,
            padding: 0.1,
            tail_buffer: 0.15,
            min_segment: 0.1,
            skip_indicator_secs: 5.0,
            max_parallel_cuts: 4,
            tool_timeout: Duration::from_secs(600), // 10 minutes
            work_dir: "/tmp/vclean".to_string(),
            fillers: DEFAULT_FILLERS.iter().map(|s| s.to_string()).collect(),
            remove_fillers: true,
            keep_temp: false,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| get(key).and_then(|s| s.trim().parse::<f64>().ok());

        Self {
            pause_threshold: parsed("VCLEAN_PAUSE_THRESHOLD").unwrap_or(defaults.pause_threshold),
            padding: parsed("VCLEAN_PADDING").unwrap_or(defaults.padding),
            tail_buffer: parsed("VCLEAN_TAIL_BUFFER").unwrap_or(defaults.tail_buffer),
            min_segment: parsed("VCLEAN_MIN_SEGMENT").unwrap_or(defaults.min_segment),
            skip_indicator_secs: parsed("VCLEAN_SKIP_INDICATOR")
                .unwrap_or(defaults.skip_indicator_secs),
            max_parallel_cuts: get("VCLEAN_MAX_PARALLEL_CUTS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_parallel_cuts),
            tool_timeout: Duration::from_secs(
                get("VCLEAN_TOOL_TIMEOUT_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(defaults.tool_timeout.as_secs()),
            ),
            work_dir: get("VCLEAN_WORK_DIR").unwrap_or(defaults.work_dir),
            fillers: get("VCLEAN_FILLERS")
                .map(|s| {
                    s.split(',')
                        .map(|f| f.trim().to_string())
                        .filter(|f| !f.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.fillers),
            remove_fillers: get("VCLEAN_REMOVE_FILLERS")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.remove_fillers),
            keep_temp: get("VCLEAN_KEEP_TEMP")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.keep_temp),
            ffmpeg_path: get("VCLEAN_FFMPEG").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: get("VCLEAN_FFPROBE").unwrap_or(defaults.ffprobe_path),
        }
    }

    /// Detection and planning parameters.
    pub fn edit_config(&self) -> EditConfig {
        let config = EditConfig::default()
            .with_pause_threshold(self.pause_threshold)
            .with_padding(self.padding)
            .with_tail_buffer(self.tail_buffer)
            .with_min_segment(self.min_segment)
            .with_fillers(self.fillers.iter().cloned());
        if self.remove_fillers {
            config
        } else {
            config.without_fillers()
        }
    }

    /// Assembly settings for a given cut mode and encoding.
    pub fn assemble_options(&self, cut_mode: CutMode, encoding: EncodingConfig) -> AssembleOptions {
        AssembleOptions {
            cut_mode,
            encoding,
            skip_indicator_secs: self.skip_indicator_secs.max(0.0),
            max_parallel: self.max_parallel_cuts.max(1),
            keep_temp: self.keep_temp,
            work_dir: Some(PathBuf::from(&self.work_dir)),
        }
    }

    /// FFmpeg runner with the configured binary, timeout and cancellation.
    pub fn runner(&self, cancel: Option<watch::Receiver<bool>>) -> FfmpegRunner {
        let runner = FfmpegRunner::new()
            .with_binary(&self.ffmpeg_path)
            .with_timeout(self.tool_timeout);
        match cancel {
            Some(rx) => runner.with_cancel(rx),
            None => runner,
        }
    }

    /// Reject settings no job can run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if !(self.pause_threshold.is_finite() && self.pause_threshold > 0.0) {
            return Err(WorkerError::config_error(format!(
                "pause threshold must be positive, got {}",
                self.pause_threshold
            )));
        }
        for (name, value) in [
            ("padding", self.padding),
            ("tail buffer", self.tail_buffer),
            ("min segment", self.min_segment),
            ("skip indicator", self.skip_indicator_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(WorkerError::config_error(format!(
                    "{} must be zero or more seconds, got {}",
                    name, value
                )));
            }
        }
        if self.tool_timeout.is_zero() {
            return Err(WorkerError::config_error("tool timeout must be at least one second"));
        }
        Ok(())
    }

    pub fn prober(&self) -> Prober {
        Prober::new()
            .with_binary(&self.ffprobe_path)
            .with_timeout(self.tool_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = WorkerConfig::from_lookup(|_| None);
        assert_eq!(config.pause_threshold, 1.0);
        assert_eq!(config.tail_buffer, 0.15);
        assert_eq!(config.max_parallel_cuts, 4);
        assert_eq!(config.tool_timeout, Duration::from_secs(600));
        assert_eq!(config.fillers.len(), 6);
    }

    #[test]
    fn test_env_overrides() {
        let config = WorkerConfig::from_lookup(lookup(&[
            ("VCLEAN_PAUSE_THRESHOLD", "1.5"),
            ("VCLEAN_FILLERS", "um, uh ,,"),
            ("VCLEAN_KEEP_TEMP", "yes"),
            ("VCLEAN_MAX_PARALLEL_CUTS", "0"),
            ("VCLEAN_TOOL_TIMEOUT_SECS", "30"),
            ("VCLEAN_SKIP_INDICATOR", "not-a-number"),
        ]));
        assert_eq!(config.pause_threshold, 1.5);
        assert_eq!(config.fillers, vec!["um", "uh"]);
        assert!(config.keep_temp);
        assert_eq!(config.max_parallel_cuts, 4);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.skip_indicator_secs, 5.0);
    }

    #[test]
    fn test_validate() {
        assert!(WorkerConfig::default().validate().is_ok());

        let zero_threshold = WorkerConfig {
            pause_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero_threshold.validate(),
            Err(WorkerError::ConfigError(_))
        ));

        let negative_padding = WorkerConfig {
            padding: -0.1,
            ..Default::default()
        };
        let err = negative_padding.validate().unwrap_err();
        assert!(err.to_string().contains("padding"));

        let no_timeout = WorkerConfig::from_lookup(lookup(&[("VCLEAN_TOOL_TIMEOUT_SECS", "0")]));
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn test_edit_config_mapping() {
        let config = WorkerConfig {
            remove_fillers: false,
            padding: 0.2,
            ..Default::default()
        };
        let edit = config.edit_config();
        assert_eq!(edit.padding, 0.2);
        assert!(!edit.remove_fillers);
    }
}
