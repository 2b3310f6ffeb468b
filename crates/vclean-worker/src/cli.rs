//! Command line interface.
//!
//! Flags override the environment-derived [`WorkerConfig`]; anything left
//! unset keeps the configured value.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vclean_media::pause_removal::RemapPolicy;
use vclean_models::{CutMode, EncodingConfig};

use crate::clean_job::CleanRequest;
use crate::config::WorkerConfig;
use crate::remap_job::RemapRequest;

#[derive(Debug, Parser)]
#[command(name = "vclean")]
#[command(version, about = "Remove pauses and filler words from recordings using a word-level transcript")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove pauses and fillers from a recording
    Clean(CleanArgs),
    /// Remap a chapters file onto an edited timeline
    Remap(RemapArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CutModeArg {
    /// Frame-accurate re-encode
    Reencode,
    /// Stream copy (keyframe-aligned, no captions)
    Copy,
}

impl From<CutModeArg> for CutMode {
    fn from(arg: CutModeArg) -> Self {
        match arg {
            CutModeArg::Reencode => CutMode::Reencode,
            CutModeArg::Copy => CutMode::StreamCopy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Shift by pause magnitude; fillers shift nothing
    Magnitude,
    /// Shift by the full removed span
    #[value(name = "span")]
    RemovedSpan,
}

impl From<PolicyArg> for RemapPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Magnitude => RemapPolicy::Magnitude,
            PolicyArg::RemovedSpan => RemapPolicy::RemovedSpan,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CleanArgs {
    /// Source video or audio file
    pub media: PathBuf,

    /// Word-level transcript JSON [default: "<stem> - transcript.json"]
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,

    /// Edited output path [default: "<stem> - edited<ext>"]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for generated files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Minimum gap removed as a pause, in seconds
    #[arg(long)]
    pub pause_threshold: Option<f64>,

    /// Seconds skipped after each cut
    #[arg(long)]
    pub padding: Option<f64>,

    /// Seconds kept before a pause cut
    #[arg(long)]
    pub tail_buffer: Option<f64>,

    /// Shortest keep segment, in seconds
    #[arg(long)]
    pub min_segment: Option<f64>,

    /// Caption pauses at least this long; 0 disables
    #[arg(long)]
    pub skip_indicator: Option<f64>,

    /// Keep filler words
    #[arg(long)]
    pub no_fillers: bool,

    /// Filler tokens, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fillers: Option<Vec<String>>,

    /// Write the record and report only
    #[arg(long)]
    pub preview: bool,

    #[arg(long, value_enum, default_value_t = CutModeArg::Reencode)]
    pub cut_mode: CutModeArg,

    /// Constant rate factor for re-encoded clips
    #[arg(long)]
    pub crf: Option<u8>,

    /// Encoder preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Encode with NVENC
    #[arg(long)]
    pub nvenc: bool,

    /// Concurrent cut processes
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep temporary clips
    #[arg(long)]
    pub keep_temp: bool,

    /// Chapters JSON to remap onto the edited output
    #[arg(long)]
    pub chapters: Option<PathBuf>,

    /// Write remapped chapter files without muxing them
    #[arg(long)]
    pub no_embed: bool,

    #[arg(long, value_enum, default_value_t = PolicyArg::Magnitude)]
    pub remap_policy: PolicyArg,
}

impl CleanArgs {
    /// Overlay flags on `config`.
    pub fn apply(&self, config: &mut WorkerConfig) {
        if let Some(v) = self.pause_threshold {
            config.pause_threshold = v;
        }
        if let Some(v) = self.padding {
            config.padding = v;
        }
        if let Some(v) = self.tail_buffer {
            config.tail_buffer = v;
        }
        if let Some(v) = self.min_segment {
            config.min_segment = v;
        }
        if let Some(v) = self.skip_indicator {
            config.skip_indicator_secs = v;
        }
        if let Some(fillers) = &self.fillers {
            config.fillers = fillers
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if self.no_fillers {
            config.remove_fillers = false;
        }
        if let Some(n) = self.jobs {
            config.max_parallel_cuts = n.max(1);
        }
        if self.keep_temp {
            config.keep_temp = true;
        }
    }

    pub fn encoding(&self) -> EncodingConfig {
        let mut encoding = EncodingConfig::default();
        if self.nvenc {
            encoding = encoding.with_nvenc();
        }
        if let Some(crf) = self.crf {
            encoding = encoding.with_crf(crf);
        }
        if let Some(preset) = &self.preset {
            encoding.preset = preset.clone();
        }
        encoding
    }

    pub fn to_request(&self) -> CleanRequest {
        CleanRequest {
            media: self.media.clone(),
            transcript: self.transcript.clone(),
            output: self.output.clone(),
            output_dir: self.output_dir.clone(),
            preview: self.preview,
            cut_mode: self.cut_mode.into(),
            encoding: self.encoding(),
            chapters: self.chapters.clone(),
            embed_chapters: !self.no_embed,
            remap_policy: self.remap_policy.into(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RemapArgs {
    /// Chapters JSON with original timestamps
    pub chapters: PathBuf,

    /// Removal record written by `clean`
    #[arg(short = 'p', long = "pauses")]
    pub record: PathBuf,

    /// Remapped chapters JSON [default: "<stem>_remapped.json"]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Edited media; sets the last chapter's end
    #[arg(long)]
    pub media: Option<PathBuf>,

    /// Mux the remapped chapters into the edited media
    #[arg(long, requires = "media")]
    pub embed: bool,

    #[arg(long, value_enum, default_value_t = PolicyArg::Magnitude)]
    pub remap_policy: PolicyArg,

    /// Name shown in the chapter listing header
    #[arg(long)]
    pub name: Option<String>,
}

impl RemapArgs {
    pub fn to_request(&self) -> RemapRequest {
        RemapRequest {
            chapters: self.chapters.clone(),
            record: self.record.clone(),
            output: self.output.clone(),
            media: self.media.clone(),
            embed: self.embed,
            policy: self.remap_policy.into(),
            video_name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clean_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vclean",
            "clean",
            "talk.mp4",
            "--pause-threshold",
            "0.8",
            "--fillers",
            "um, uh",
            "--jobs",
            "2",
            "--cut-mode",
            "copy",
            "--crf",
            "18",
            "--preview",
        ])
        .unwrap();
        let Command::Clean(args) = cli.command else {
            panic!("expected clean");
        };

        let mut config = WorkerConfig::default();
        args.apply(&mut config);
        assert_eq!(config.pause_threshold, 0.8);
        assert_eq!(config.fillers, vec!["um", "uh"]);
        assert_eq!(config.max_parallel_cuts, 2);
        assert_eq!(config.padding, 0.1);

        let request = args.to_request();
        assert_eq!(request.cut_mode, CutMode::StreamCopy);
        assert_eq!(request.encoding.crf, 18);
        assert!(request.preview);
        assert!(request.embed_chapters);
        assert_eq!(request.remap_policy, RemapPolicy::Magnitude);
    }

    #[test]
    fn test_remap_args() {
        let cli = Cli::try_parse_from([
            "vclean",
            "remap",
            "chapters.json",
            "-p",
            "talk - pauses.json",
            "--remap-policy",
            "span",
        ])
        .unwrap();
        let Command::Remap(args) = cli.command else {
            panic!("expected remap");
        };
        let request = args.to_request();
        assert_eq!(request.record, PathBuf::from("talk - pauses.json"));
        assert_eq!(request.policy, RemapPolicy::RemovedSpan);
        assert!(!request.embed);
    }

    #[test]
    fn test_embed_requires_media() {
        let result = Cli::try_parse_from(["vclean", "remap", "c.json", "-p", "p.json", "--embed"]);
        assert!(result.is_err());
    }
}
