
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use hydrocast::config::ConfigError;
use hydrocast::history::FileSlot;
use hydrocast::model::{ModelId, PredictRequest};
use hydrocast::render::{HeadlessDisplay, SurfaceId};
use hydrocast::{
    ControllerSettings, Durability, ForecastGateway, GatewayError, HttpGateway, PersistentHistoryStore, Tab,
    WorkspaceConfig, WorkspaceController, WorkspaceError,
};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hydrocast", about = "Water consumption forecast workspace")]
struct Cli {
    /// Prediction service root.
    #[arg(long, env = "HYDROCAST_API_BASE_URL")]
    api_base_url: Option<String>,

    /// History file.
    #[arg(long, env = "HYDROCAST_HISTORY_PATH")]
    history_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the prediction service is up.
    Ping,
    /// List the countries the service can forecast.
    Countries,
    Predict(PredictArgs),
    /// Show every model's fitted series and metrics for a country.
    Compare { country: String },
    /// Show a country's observed historical values.
    Analysis { country: String },
    History(HistoryCommand),
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[arg(long)]
    country: String,

    #[arg(long)]
    year: i32,

    /// Repeat for several models: lasso, ridge, knn.
    #[arg(long = "model", required = true)]
    models: Vec<ModelId>,
}

#[derive(Args, Debug)]
struct HistoryCommand {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand, Debug)]
enum HistorySubcommand {
    List,
    Export {
        #[arg(long, help = "Output file path, or stdout when omitted")]
        output: Option<PathBuf>,
    },
    /// Delete the row shown at this position (1-based, as in `history list`).
    Delete { position: usize },
    Clear {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = WorkspaceConfig::from_env()?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url.trim_end_matches('/').to_owned();
    }
    if let Some(path) = cli.history_path {
        config.history_path = path;
    }

    let display = Arc::new(HeadlessDisplay::new());
    let gateway = Arc::new(HttpGateway::new(&config.api_base_url, config.timeouts)?);
    let store = PersistentHistoryStore::open(FileSlot::new(&config.history_path));
    let mut workspace =
        WorkspaceController::new(gateway.clone(), store, display.clone(), ControllerSettings::from_config(&config));
    workspace.restore();

    match cli.command {
        Command::Ping => {
            gateway.health().await?;
            println!("ok");
        }
        Command::Countries => {
            for country in workspace.load_countries().await? {
                println!("{country}");
            }
        }
        Command::Predict(args) => {
            let request = PredictRequest::new(args.country, args.year, args.models);
            workspace.submit_prediction(request).await?;
            print_surfaces(
                &display,
                &[SurfaceId::Summary, SurfaceId::ForecastChart, SurfaceId::CompareChart, SurfaceId::MetricsTable],
            );
        }
        Command::Compare { country } => {
            workspace.select_compare_country(&country).await?;
            print_surfaces(&display, &[SurfaceId::CompareChart, SurfaceId::MetricsTable]);
        }
        Command::Analysis { country } => {
            workspace.select_analysis_country(&country).await?;
            print_surfaces(&display, &[SurfaceId::AnalysisChart]);
        }
        Command::History(history) => run_history(&mut workspace, &display, history)?,
    }

    if let Durability::Degraded(reason) = workspace.durability() {
        warn!(%reason, path = %config.history_path.display(), "history changes were not saved");
    }
    Ok(())
}

fn run_history(
    workspace: &mut WorkspaceController,
    display: &HeadlessDisplay,
    history: HistoryCommand,
) -> Result<(), CliError> {
    match history.command {
        HistorySubcommand::List => {
            workspace.tab_shown(Tab::History);
            print_surfaces(display, &[SurfaceId::HistoryTable]);
        }
        HistorySubcommand::Export { output } => {
            let bytes = workspace.export_history()?;
            match output {
                Some(path) => std::fs::write(path, bytes)?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    writeln!(stdout)?;
                }
            }
        }
        HistorySubcommand::Delete { position } => {
            let Some(row) = position.checked_sub(1) else {
                return Err(WorkspaceError::UnknownRow(position).into());
            };
            let removed = workspace.delete_history_row(row)?;
            println!("deleted {} {}", removed.country, removed.year);
        }
        HistorySubcommand::Clear { yes } => {
            let confirmation = workspace.request_clear_history();
            if yes {
                workspace.confirm_clear_history(confirmation)?;
                println!("history cleared");
            } else {
                workspace.cancel_clear_history();
                println!("{} entries kept; pass --yes to clear", workspace.history().len());
            }
        }
    }
    Ok(())
}

fn print_surfaces(display: &HeadlessDisplay, surfaces: &[SurfaceId]) {
    for surface in surfaces {
        if let Some(text) = display.render_text(*surface) {
            println!("== {surface} ==");
            print!("{text}");
        }
    }
}
