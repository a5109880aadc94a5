//! `reportit` entry-point: loads settings, wires adapters, runs one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use reportit::config::ClientSettings;
use reportit::domain::ports::TokioSleeper;
use reportit::inbound::cli::{Cli, CommandRunner};
use reportit::outbound::credentials::FileCredentialStore;
use reportit::outbound::http::HttpBackend;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let settings = merge_flags(
        ClientSettings::load_from_iter([OsString::from("reportit")])
            .wrap_err("load client settings")?,
        &cli,
    );
    init_tracing(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli, settings))
}

async fn run(cli: Cli, settings: ClientSettings) -> Result<()> {
    let base_url = settings.base_url().wrap_err("parse backend base URL")?;
    let backend = HttpBackend::new(base_url, settings.request_timeout())
        .wrap_err("create HTTP client")?;
    let store = FileCredentialStore::open(&settings.credentials_path())
        .wrap_err("open credential store")?;
    let runner = CommandRunner::new(
        Arc::new(backend),
        Arc::new(store),
        Arc::new(DefaultClock),
        Arc::new(TokioSleeper),
    );

    let output = runner.run(cli.command).await?;
    println!("{output}");
    Ok(())
}

/// Layer command-line flags over file and environment settings.
fn merge_flags(mut settings: ClientSettings, cli: &Cli) -> ClientSettings {
    if let Some(base_url) = &cli.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(path) = &cli.credentials_path {
        settings.credentials_path = Some(path.clone());
    }
    settings.log_json |= cli.log_json;
    settings
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        warn!(error = %e, "tracing init failed");
    }
}
