use clap::Parser;
use tracing_subscriber::EnvFilter;

use codeframe::cli::{self, Args, CliError, Command};
use codeframe::config::Config;

/// Route `log` records to stderr. stdout carries render-surface messages.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    if let Command::Config { action } = &args.command {
        return cli::handle_config_action(action.clone(), args.config.as_deref(), args.settings.as_deref());
    }

    let config = Config::load(args.config.as_deref())?;
    let settings_path = args.settings.clone().unwrap_or_else(|| config.settings_path());
    log::debug!("Using settings from {:?}", settings_path);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Io {
            context: "Failed to create async runtime".to_string(),
            source: e,
        })?;

    let result = rt.block_on(async {
        match &args.command {
            Command::Start { editor, output } => {
                cli::run_start(&config, settings_path, editor, output.clone()).await
            }
            Command::Snapshot { editor, pretty } => cli::run_snapshot(settings_path, editor, *pretty).await,
            Command::Html { template, csp_source } => cli::run_html(template, csp_source).await,
            Command::Config { .. } => Ok(()),
        }
    });

    // The stdin reader may still be parked in a blocking read.
    rt.shutdown_background();
    result
}

fn main() {
    init_logging();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
