//! Bulk Upgrade - Entry Point
//!
//! Schedules or aborts software upgrades for the devices listed in a CSV
//! manifest.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use bulkupgrade::app::login::TerminalPrompt;
use bulkupgrade::app::options::{Cli, RunOptions, TOOL_NAME};
use bulkupgrade::app::run::run;
use bulkupgrade::http::client::HttpClient;
use bulkupgrade::logs::init_logging;
use bulkupgrade::storage::settings::Settings;
use bulkupgrade::upgrade::OutcomeLog;
use bulkupgrade::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(&cli.settings).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERR: Unable to read settings file {}: {}", cli.settings.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(cli.log_options(&settings)) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = match RunOptions::resolve(&cli, &settings, |name| std::env::var(name).ok()) {
        Ok(options) => options,
        Err(e) => {
            println!("ERR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let version = version_info();
    println!(
        "{} v{} ({})\n",
        TOOL_NAME,
        version.version,
        options.controller.as_str().trim_end_matches('/')
    );
    info!("Build {} ({})", version.git_hash, version.build_time);

    let client = match HttpClient::new(options.controller.as_str(), &options.http) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create HTTP client: {e}");
            println!("ERR: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&options, &client, &TerminalPrompt::detect(), OutcomeLog::printing()).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("ERR: {e}");
            ExitCode::FAILURE
        }
    }
}
