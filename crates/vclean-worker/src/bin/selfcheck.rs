use std::path::Path;
use std::process::Command;

use vclean_media::{check_ffmpeg, check_ffprobe};
use vclean_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!("vclean-selfcheck: starting with work_dir={}", config.work_dir);
    ensure_workdir(&config.work_dir).await?;
    config.validate()?;

    let ffmpeg = check_ffmpeg(&config.ffmpeg_path)?;
    ensure_tool(&ffmpeg)?;
    let ffprobe = check_ffprobe(&config.ffprobe_path)?;
    ensure_tool(&ffprobe)?;

    println!("vclean-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("work dir {} not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_tool(binary: &Path) -> anyhow::Result<()> {
    let output = Command::new(binary)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not runnable: {}", binary.display(), e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            binary.display(),
            output.status
        ));
    }
    println!("vclean-selfcheck: found {}", binary.display());
    Ok(())
}
