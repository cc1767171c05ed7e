mod adapters;
mod config;
mod core;
mod ports;

use crate::adapters::aws::ecr::AwsEcrDataSource;
use crate::adapters::aws::elbv2::AwsElbDataSource;
use crate::adapters::aws::route53::AwsRoute53DataSource;
use crate::adapters::aws::sdk_config::load_sdk_config;
use crate::adapters::clipboard::SystemClipboard;
use crate::adapters::config::file_store::TomlFileConfigAdapter;
use crate::adapters::tui::{
    app::TuiApp, event::EventManager, logging::LogSender, logging::TuiLoggingLayer,
    views::default_view_factories,
};
use crate::config::models::LoggingConfig;
use crate::core::context::AppContext;
use crate::ports::ConfigurationStore;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, registry::Registry};

const LOG_CHANNEL_CAPACITY: usize = 2048;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Keyboard-driven terminal browser for AWS resources", long_about = None)]
struct CliArgs {
    #[clap(short, long, help = "AWS profile to use (overrides the config file)")]
    profile: Option<String>,

    #[clap(long, help = "AWS region to use (overrides the config file)")]
    region: Option<String>,

    #[clap(long, value_name = "PATH", help = "Path to hibiscus.toml")]
    config: Option<PathBuf>,

    #[clap(long, value_name = "NAME", help = "View to show first (ecr, route53, elb)")]
    view: Option<String>,
}

fn init_logger_tui(logging_config: &LoggingConfig, tui_log_tx: LogSender) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging_config.level))
        .unwrap_or_else(|e| {
            eprintln!(
                "[LOGGER WARN] Invalid log level '{}': {e}. Defaulting to 'info'.",
                logging_config.level
            );
            EnvFilter::new("info")
        });

    let subscriber = Registry::default()
        .with(env_filter)
        .with(TuiLoggingLayer::new(tui_log_tx));

    if let Err(e) = subscriber.try_init() {
        eprintln!("[LOGGER WARN] Failed to install TUI logger: {e}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    match run(cli_args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[CRITICAL] {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli_args: CliArgs) -> anyhow::Result<()> {
    let config_path = config::find_config_file(cli_args.config.as_deref());
    let config_store = Arc::new(TomlFileConfigAdapter::new(config_path));
    let app_config = config_store.load_app_config_file(config_store.config_path())?;

    let (tui_log_tx, tui_log_rx) = tokio::sync::mpsc::channel(LOG_CHANNEL_CAPACITY);
    init_logger_tui(&app_config.logging, tui_log_tx);
    info!("Using configuration at {:?}", config_store.config_path());

    let aws_settings = app_config
        .aws
        .overridden_by(cli_args.profile, cli_args.region);
    let sdk_config = load_sdk_config(&aws_settings).await;

    let ctx = AppContext {
        aws: aws_settings,
        dns: Arc::new(AwsRoute53DataSource::new(&sdk_config)),
        registry: Arc::new(AwsEcrDataSource::new(&sdk_config)),
        load_balancers: Arc::new(AwsElbDataSource::new(&sdk_config)),
        view_state: config_store,
        clipboard: Arc::new(SystemClipboard::new()),
    };

    let mut tui_app = TuiApp::from_factories(&ctx, &default_view_factories(), tui_log_rx)?;

    let mut stdout_handle = stdout();
    enable_raw_mode()?;
    execute!(&mut stdout_handle, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout_handle);
    let mut terminal = Terminal::new(backend)?;

    let event_manager = EventManager::new();
    event_manager.start_event_listeners();

    tui_app.start(cli_args.view.as_deref());
    let tui_run_result = tui_app.run(&mut terminal, event_manager).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &tui_run_result {
        error!("TUI loop ended with error: {}", e);
    }
    tui_run_result
}
