//! vclean command line binary.

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclean_worker::cli::{Cli, Command};
use vclean_worker::{CleanJob, RemapJob, WorkerConfig};

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["vclean=info", "vclean_media=info", "vclean_worker=info"] {
        if let Ok(d) = directive.parse() {
            env_filter = env_filter.add_directive(d);
        }
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = WorkerConfig::from_env();

    // Ctrl-C cancels running tools; partial outputs are cleaned up by the jobs
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, cancelling");
            let _ = cancel_tx.send(true);
        }
    });

    let result = match &cli.command {
        Command::Clean(args) => {
            args.apply(&mut config);
            info!("Worker config: {:?}", config);
            CleanJob::new(config)
                .with_cancel(cancel_rx)
                .run(&args.to_request())
                .await
                .map(|outcome| {
                    println!("{}", outcome.report);
                    if let Some(edited) = &outcome.edited {
                        println!("Edited output: {}", edited.display());
                    }
                    if let Some(chapters) = &outcome.chapters {
                        println!("Chapters: {}", chapters.layout.remapped_json.display());
                        if let Some(embedded) = &chapters.embedded {
                            println!("With chapters: {}", embedded.display());
                        }
                    }
                })
        }
        Command::Remap(args) => RemapJob::new(config)
            .with_cancel(cancel_rx)
            .run(&args.to_request())
            .await
            .map(|outcome| {
                println!("{}", outcome.remapped.youtube_listing(args.name.as_deref()));
                println!("Remapped chapters: {}", outcome.layout.remapped_json.display());
                if let Some(embedded) = &outcome.embedded {
                    println!("With chapters: {}", embedded.display());
                }
            }),
    };

    if let Err(e) = result {
        error!(kind = e.kind(), "vclean failed: {}", e);
        std::process::exit(1);
    }
}
