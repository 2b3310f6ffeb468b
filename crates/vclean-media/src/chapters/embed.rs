//! Mux chapter metadata into an existing artifact.

use std::path::Path;

use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_parent, move_file, partial_path, remove_if_exists};

/// Build the mux command: all streams from `media`, global metadata and
/// chapters from the FFMETADATA file, no re-encoding.
pub fn embed_command(media: &Path, metadata: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(media, output)
        .add_input(metadata)
        .input_args(["-f", "ffmetadata"])
        .output_args(["-map", "0"])
        .metadata_from_input(1)
        .codec_copy()
}

/// Write `media` with the chapters from `metadata` to `output`.
///
/// The result goes through a temporary sibling of `output`, so a failed mux
/// leaves no file behind.
pub async fn embed_chapters(
    runner: &FfmpegRunner,
    media: &Path,
    metadata: &Path,
    output: &Path,
) -> MediaResult<()> {
    for path in [media, metadata] {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
    }

    ensure_parent(output).await?;
    let partial = partial_path(output);
    let cmd = embed_command(media, metadata, &partial);

    info!(
        media = %media.display(),
        output = %output.display(),
        "Embedding chapters"
    );

    if let Err(e) = runner.run(&cmd).await {
        let _ = remove_if_exists(&partial).await;
        return Err(e);
    }
    if let Err(e) = move_file(&partial, output).await {
        let _ = remove_if_exists(&partial).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_command_args() {
        let args = embed_command(
            Path::new("edited.mp4"),
            Path::new("meta.txt"),
            Path::new("out.mp4"),
        )
        .build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-i edited.mp4 -f ffmetadata -i meta.txt"));
        assert!(joined.contains("-map 0 -map_metadata 1 -map_chapters 1 -c copy out.mp4"));
    }

    #[tokio::test]
    async fn test_missing_inputs() {
        let err = embed_chapters(
            &FfmpegRunner::new(),
            Path::new("/nonexistent/edited.mp4"),
            Path::new("/nonexistent/meta.txt"),
            Path::new("/tmp/out.mp4"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
