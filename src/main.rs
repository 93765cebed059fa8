use clap::Parser;
use scdl_parallel::cli::Args;
use scdl_parallel::{ScdlDownloader, Source, ToExitCode, app, cancel_on_signal, logging};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let url = args.url.clone();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("scdl-parallel: {}", e);
            return exit(e.exit_code());
        }
    };

    if let Err(e) = logging::init_logging(config.debug) {
        eprintln!("scdl-parallel: {}", e);
        return exit(e.exit_code());
    }
    tracing::debug!(?config, "Effective configuration");

    // Reject bad input before looking for the scdl binary
    if let Err(e) = Source::parse(&url) {
        tracing::error!(error = %e, code = e.error_code(), "Run aborted");
        return exit(e.exit_code());
    }

    let downloader = match ScdlDownloader::from_config(&config.downloader) {
        Ok(downloader) => {
            tracing::debug!(binary = %downloader.binary_path().display(), "Using scdl");
            Arc::new(downloader)
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Cannot start downloads");
            return exit(e.exit_code());
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    match app::run(&config, &url, downloader, cancel).await {
        Ok(report) => {
            app::log_report(&report);
            exit(app::exit_code(&report, config.strict))
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Run aborted");
            exit(e.exit_code())
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
