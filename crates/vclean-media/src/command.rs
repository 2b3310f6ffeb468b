//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Default FFmpeg binary name.
pub const FFMPEG: &str = "ffmpeg";
/// Default FFprobe binary name.
pub const FFPROBE: &str = "ffprobe";

/// How many trailing stderr lines are kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// One `-i` input with the arguments that precede it.
#[derive(Debug, Clone)]
struct FfmpegInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order; input arguments apply to the last one added
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with a single input.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                path: input.as_ref().to_path_buf(),
            }],
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add another input; subsequent input arguments apply to it.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            path: input.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an argument before the most recently added `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position (before input, keyframe-snapped for stream copy).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Frame-accurate seek: a fast input seek to a few seconds before
    /// `seconds`, then a decoding output seek for the remainder.
    pub fn accurate_seek(self, seconds: f64) -> Self {
        let fast = if seconds > 5.0 { seconds - 5.0 } else { 0.0 };
        let accurate = seconds - fast;
        self.seek(fast)
            .output_arg("-ss")
            .output_arg(format!("{:.3}", accurate))
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Read the input as a concat demuxer list.
    pub fn concat_list(self) -> Self {
        self.input_args(["-f", "concat", "-safe", "0"])
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Copy all streams without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Drop video streams (audio-only sources).
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Shift timestamps so each clip starts at zero.
    pub fn zero_timestamps(self) -> Self {
        self.output_arg("-avoid_negative_ts").output_arg("make_zero")
    }

    /// Take global metadata and chapters from input `index`.
    pub fn metadata_from_input(self, index: usize) -> Self {
        self.output_arg("-map_metadata")
            .output_arg(index.to_string())
            .output_arg("-map_chapters")
            .output_arg(index.to_string())
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-loglevel".to_string());
        args.push("error".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with timeout and cancellation.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Binary to execute (name on PATH or explicit path)
    binary: PathBuf,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Wall-clock budget per invocation
    timeout: Option<Duration>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

enum WaitOutcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl FfmpegRunner {
    /// Create a new runner for `ffmpeg` on PATH.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(FFMPEG),
            cancel_rx: None,
            timeout: None,
        }
    }

    /// Use a specific FFmpeg binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn tool_name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| FFMPEG.to_string())
    }

    /// Run an FFmpeg command to completion.
    ///
    /// A non-zero exit, a timeout and a missing binary are all reported as
    /// tool invocation errors; the child is killed on timeout, cancellation,
    /// or when this future is dropped.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let tool = self.tool_name();
        let binary = resolve_tool(&self.binary, &tool)?;

        let args = cmd.build_args();
        debug!("Running {}: {} {}", tool, binary.display(), args.join(" "));

        let mut child = Command::new(&binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("stderr not captured"))?;
        let stderr_task = tokio::spawn(collect_tail(stderr, STDERR_TAIL_LINES));

        let status = match self.wait_for_completion(&mut child, &tool).await {
            Ok(status) => status,
            Err(e) => {
                stderr_task.abort();
                return Err(e);
            }
        };

        let stderr_tail = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let message = stderr_tail
                .lines()
                .last()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "exited with non-zero status".to_string());
            Err(MediaError::tool_failed(
                tool,
                message,
                Some(stderr_tail),
                status.code(),
            ))
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child, tool: &str) -> MediaResult<ExitStatus> {
        let timeout = self.timeout;
        let mut cancel_rx = self.cancel_rx.clone();

        let deadline = async move {
            match timeout {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async move {
            if let Some(rx) = cancel_rx.as_mut() {
                loop {
                    if *rx.borrow_and_update() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            }
            std::future::pending::<()>().await
        };

        let outcome = tokio::select! {
            status = child.wait() => WaitOutcome::Exited(status),
            _ = deadline => WaitOutcome::TimedOut,
            _ = cancelled => WaitOutcome::Cancelled,
        };

        match outcome {
            WaitOutcome::Exited(status) => Ok(status?),
            WaitOutcome::TimedOut => {
                let secs = timeout.map(|d| d.as_secs()).unwrap_or_default();
                warn!("{} timed out after {} seconds, killing process", tool, secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout {
                    tool: tool.to_string(),
                    secs,
                })
            }
            WaitOutcome::Cancelled => {
                info!("{} cancelled, killing process", tool);
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

/// Keep the last `max_lines` lines of a stream.
async fn collect_tail<R>(reader: R, max_lines: usize) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut tail = VecDeque::with_capacity(max_lines);

    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == max_lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail.into_iter().collect::<Vec<_>>().join("\n")
}

/// Resolve a binary name on PATH, or an explicit path, to an executable.
pub(crate) fn resolve_tool(binary: impl AsRef<OsStr>, tool: &str) -> MediaResult<PathBuf> {
    which::which(binary).map_err(|_| MediaError::ToolNotFound(tool.to_string()))
}

/// Check that the configured FFmpeg binary is available.
pub fn check_ffmpeg(binary: impl AsRef<OsStr>) -> MediaResult<PathBuf> {
    resolve_tool(binary, FFMPEG)
}

/// Check that the configured FFprobe binary is available.
pub fn check_ffprobe(binary: impl AsRef<OsStr>) -> MediaResult<PathBuf> {
    resolve_tool(binary, FFPROBE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .seek(10.0)
            .duration(30.0)
            .codec_copy();

        let args = cmd.build_args();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert!(ss < i, "seek must precede the input");
        assert!(t > i, "duration is an output option");
        assert_eq!(args[ss + 1], "10.000");
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_accurate_seek_splits_into_input_and_output_seek() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .accurate_seek(12.5)
            .build_args();
        let seeks: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-ss")
            .map(|(i, _)| args[i + 1].clone())
            .collect();
        assert_eq!(seeks, vec!["7.500", "5.000"]);

        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .accurate_seek(2.0)
            .build_args();
        assert!(args.contains(&"0.000".to_string()));
        assert!(args.contains(&"2.000".to_string()));
    }

    #[test]
    fn test_multiple_inputs_keep_their_own_args() {
        let args = FfmpegCommand::new("video.mp4", "out.mp4")
            .add_input("meta.txt")
            .input_arg("-f")
            .input_arg("ffmetadata")
            .metadata_from_input(1)
            .codec_copy()
            .build_args();

        let first_i = args.iter().position(|a| a == "-i").unwrap();
        let f = args.iter().position(|a| a == "ffmetadata").unwrap();
        assert_eq!(args[first_i + 1], "video.mp4");
        assert!(f > first_i + 1);
        assert_eq!(args[f + 2], "-i");
        assert_eq!(args[f + 3], "meta.txt");
        assert!(args.windows(2).any(|w| w[0] == "-map_chapters" && w[1] == "1"));
    }

    #[test]
    fn test_concat_list_args() {
        let args = FfmpegCommand::new("list.txt", "out.mp4")
            .concat_list()
            .codec_copy()
            .build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i list.txt -c copy out.mp4"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let runner = FfmpegRunner::new().with_binary("/nonexistent/ffmpeg-vclean-test");
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4");
        let err = runner.run(&cmd).await.unwrap_err();
        assert!(matches!(err, MediaError::ToolNotFound(_)));
        assert!(err.is_tool_invocation());
    }

    #[test]
    fn test_check_tools_report_the_tool_name() {
        let err = check_ffmpeg("/nonexistent/vclean-ffmpeg").unwrap_err();
        assert!(matches!(&err, MediaError::ToolNotFound(t) if t == "ffmpeg"));
        let err = check_ffprobe("/nonexistent/vclean-ffprobe").unwrap_err();
        assert!(matches!(&err, MediaError::ToolNotFound(t) if t == "ffprobe"));
    }

    #[test]
    fn test_log_level_is_error() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4").build_args();
        assert_eq!(&args[..4], &["-y", "-hide_banner", "-loglevel", "error"]);
    }

    #[tokio::test]
    async fn test_collect_tail_keeps_last_lines() {
        let data: &[u8] = b"one\ntwo\nthree\nfour\n";
        let tail = collect_tail(data, 2).await;
        assert_eq!(tail, "three\nfour");
    }
}
