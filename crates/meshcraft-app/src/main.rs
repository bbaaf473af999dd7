/*
[INPUT]:  CLI arguments, YAML configuration file, MESHCRAFT_TOKEN, OS shutdown signals
[OUTPUT]: Gallery/printer listings, bind and print actions, live printer watch
[POS]:    Binary entry point
[UPDATE]: When changing CLI commands, startup flow, or shutdown handling
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use meshcraft_adapter::{MeshcraftClient, PrinterRecord, SortBy};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use meshcraft_app::{App, AppConfig, PrinterPoller};

const TOKEN_ENV: &str = "MESHCRAFT_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "meshcraft", version, about = "MeshCraft gallery and printer client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List public gallery models
    Gallery {
        #[arg(long, value_enum, default_value_t = SortArg::Latest)]
        sort: SortArg,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List bound printers
    Printers,
    /// Follow one printer until Ctrl-C
    Watch { device_id: String },
    /// Bind a printer by its device name and 6-character code
    Bind { device_name: String, code: String },
    /// Send a gallery model to a printer
    Print {
        device_id: String,
        model_id: String,
        task_name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Latest,
    Popular,
}

impl From<SortArg> for SortBy {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Latest => SortBy::Latest,
            SortArg::Popular => SortBy::Popular,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let mut config = load_config(args.config_path.as_deref())?;
    let _log_guard = init_tracing(&args.log_level, config.logging.file_dir.as_deref())?;

    if let Command::Gallery {
        limit: Some(limit), ..
    } = &args.command
    {
        config.gallery.page_size = (*limit).max(1);
    }

    info!(api = %config.api.base_url, "starting meshcraft");
    let app = App::from_config(&config).await.context("initialize app")?;
    app.restore().await.context("restore state")?;

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            app.login(token.trim().to_string(), None, None).await?;
        }
    }

    let result = run(&app, args.command).await;
    if let Err(err) = app.persist().await {
        warn!(error = %err, "failed to persist state");
    }
    result
}

async fn run(app: &App<MeshcraftClient>, command: Command) -> Result<()> {
    match command {
        Command::Gallery { sort, .. } => {
            let models = app.gallery.load(sort.into()).await?;
            let snapshot = app.gallery.snapshot();
            for model in &models {
                println!(
                    "{}\t{}\tlikes={}\tdownloads={}\t{}",
                    model.id,
                    model.title,
                    model.like_count,
                    model.download_count,
                    model.thumbnail_url.as_deref().unwrap_or("-"),
                );
            }
            println!("{} of {} models", snapshot.models.len(), snapshot.total);
        }
        Command::Printers => {
            require_session(app)?;
            for printer in app.printers.fetch_printers().await? {
                print_printer(&printer);
            }
        }
        Command::Watch { device_id } => {
            require_session(app)?;
            watch_printer(app, device_id).await?;
        }
        Command::Bind { device_name, code } => {
            require_session(app)?;
            let printer = app.printers.bind_printer(&device_name, &code).await?;
            println!("bound {} ({})", printer.device_name, printer.device_id);
        }
        Command::Print {
            device_id,
            model_id,
            task_name,
        } => {
            require_session(app)?;
            let created = app
                .printers
                .create_print_task(&device_id, &model_id, &task_name)
                .await?;
            app.gallery.record_download(&model_id).await;
            println!("print task {} queued on {}", created.task_id, device_id);
        }
    }
    Ok(())
}

async fn watch_printer(
    app: &App<MeshcraftClient>,
    device_id: String,
) -> Result<()> {
    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let mut updates = app.printers.subscribe();
    let poller = PrinterPoller::spawn_with_token(app.printers.clone(), device_id, shutdown.clone());
    info!(device_id = poller.device_id(), "watching printer, Ctrl-C to stop");

    let mut last: Option<PrinterRecord> = None;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().current_printer.clone();
                if let Some(printer) = current {
                    if last.as_ref() != Some(&printer) {
                        print_printer(&printer);
                        last = Some(printer);
                    }
                }
            }
        }
    }

    poller.stop().await;
    info!("watch stopped");
    Ok(())
}

fn print_printer(printer: &PrinterRecord) {
    let now = chrono::Utc::now();
    let remaining = printer.remaining(now).num_seconds();
    println!(
        "{}\t{}\t{}\tprogress={}\tremaining={}m{:02}s",
        printer.device_id,
        printer.device_name,
        printer.status,
        printer
            .progress
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string()),
        remaining / 60,
        remaining % 60,
    );
}

fn require_session(app: &App<MeshcraftClient>) -> Result<()> {
    if app.session.is_authenticated() {
        Ok(())
    } else {
        Err(anyhow!("not signed in; set {TOKEN_ENV}"))
    }
}

fn init_tracing(log_level: &str, file_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let (file_layer, guard) = match file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "meshcraft.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path).context("load config"),
        None => Ok(AppConfig::default()),
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
