use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use job_autopilot::cli::Cli;
use job_autopilot::{
    ensure_credentials, BrowserOptions, ChromeDriver, ConsoleSink, EventSink, Geocoder, JobBoard,
    JsonSettingsStore, NoGeocoder, NominatimGeocoder, Pacing, Prompter, SearchParameterResolver,
    Session, SettingsStore,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let sink: Arc<dyn EventSink> = Arc::new(ConsoleSink::default());
    let store = JsonSettingsStore::new(&cli.settings);
    let mut settings = store.load()?;

    let mut prompter = Prompter::stdio();
    ensure_credentials(&mut settings, &store, &mut prompter)?;

    let lookup_timeout = Duration::from_secs(cli.geocode_timeout_secs);
    let geocoder: Box<dyn Geocoder> = if cli.no_geocode {
        Box::new(NoGeocoder)
    } else {
        Box::new(NominatimGeocoder::new(lookup_timeout)?)
    };
    let resolver =
        SearchParameterResolver::new(geocoder, sink.clone()).with_lookup_timeout(lookup_timeout);

    let driver = ChromeDriver::launch(&BrowserOptions {
        headless: cli.headless,
        ..Default::default()
    })?;
    info!("Browser started (headless: {})", cli.headless);

    let board = JobBoard::new(driver, settings.selectors())
        .with_pacing(Pacing::between(cli.min_delay_ms, cli.max_delay_ms))
        .with_max_pages(cli.max_pages);

    let mut session = Session::new(board, resolver, Box::new(store), settings, sink);
    session.login();
    let result = session.run(&mut prompter).await;

    session.into_board().into_driver().close();
    info!("Session finished");
    result
}
