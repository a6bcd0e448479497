use analytics::{AnalyticsEngine, MetricsReport};
use analyzer::Analyzer;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{Settings, load_settings};
use core_types::RawMetricsInput;
use futures::future::join_all;
use orchestrator::TaskConfig;
use std::path::{Path, PathBuf};
use tracing::Instrument;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::style::ProgressStyle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The main entry point for the TradeLens backtest analyzer.
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; settings have defaults.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &settings).await,
        Commands::Metrics(args) => handle_metrics(args),
        Commands::Health => handle_health(&settings).await,
    }
}

/// Log lines are routed through the indicatif layer so they do not tear the
/// per-task progress bars.
fn init_tracing() {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Resilient, AI-assisted analysis of backtest results.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file (defaults to ./tradelens.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more backtest result files.
    Analyze(AnalyzeArgs),
    /// Print the computed metrics for a backtest result file.
    Metrics(MetricsArgs),
    /// Check that the inference service is reachable.
    Health,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// JSON files holding `{ trades, returns, summary }`.
    #[arg(long, short, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Skip the inference service and use heuristics only.
    #[arg(long)]
    offline: bool,
}

#[derive(Parser)]
struct MetricsArgs {
    /// JSON file holding `{ trades, returns, summary }`.
    #[arg(long, short)]
    input: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_input(path: &Path) -> Result<RawMetricsInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Runs every input concurrently, one progress bar per task.
async fn handle_analyze(args: AnalyzeArgs, settings: &Settings) -> Result<()> {
    let inputs = args
        .input
        .iter()
        .map(|path| load_input(path).map(|input| (path, input)))
        .collect::<Result<Vec<_>>>()?;

    let analyzer = Analyzer::from_settings(settings)?;
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}",
    )?
    .progress_chars("#>-");

    let tasks = inputs.iter().map(|(path, input)| {
        let span = tracing::info_span!("analyze", file = %path.display());
        span.pb_set_style(&style);
        span.pb_set_length(100);

        let bar = span.clone();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let config = TaskConfig::from(&settings.orchestrator).with_progress(move |update| {
            bar.pb_set_position(u64::from(update.progress));
            bar.pb_set_message(&format!("{}: {}", name, update.message));
        });

        let analyzer = &analyzer;
        let offline = args.offline;
        async move {
            if offline {
                analyzer.analyze_offline(input, &config).await
            } else {
                analyzer.analyze(input, &config).await
            }
        }
        .instrument(span)
    });

    let envelopes = join_all(tasks).await;

    let mut failed = 0;
    for ((path, _), envelope) in inputs.iter().zip(&envelopes) {
        if envelope.is_error() {
            failed += 1;
            tracing::error!(file = %path.display(), "Analysis failed.");
        }
        println!("{}", envelope.to_json_pretty()?);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} analyses failed", failed, envelopes.len());
    }
    Ok(())
}

fn handle_metrics(args: MetricsArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    input.validate()?;
    let report = AnalyticsEngine::new().calculate(&input);
    println!("{}", metrics_table(&report));
    Ok(())
}

fn metrics_table(report: &MetricsReport) -> Table {
    let pct = |v: f64| format!("{:.2}%", v * 100.0);
    let ratio = |v: f64| format!("{:.3}", v);
    let trades = &report.trades;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let profit_factor = if trades.profit_factor_capped {
        format!("{} (capped)", trades.profit_factor.round_dp(2))
    } else {
        trades.profit_factor.round_dp(2).to_string()
    };

    let rows = [
        ("Grade", format!("{} ({:.3})", report.grade, report.grade_score)),
        ("Periods", report.periods.to_string()),
        ("Total return", pct(report.total_return)),
        ("Annualized return", pct(report.annualized_return)),
        ("Volatility", pct(report.volatility)),
        ("Sharpe ratio", ratio(report.sharpe_ratio)),
        ("Sortino ratio", ratio(report.sortino_ratio)),
        ("Calmar ratio", ratio(report.calmar_ratio)),
        ("Max drawdown", pct(report.max_drawdown)),
        ("VaR (95%)", pct(report.value_at_risk_95)),
        ("Expected shortfall", pct(report.expected_shortfall)),
        ("Tail risk", format!("{:.6}", report.tail_risk)),
        ("Trades", trades.total_trades.to_string()),
        ("Win rate", format!("{}%", (trades.win_rate * rust_decimal::Decimal::ONE_HUNDRED).round_dp(2))),
        ("Profit factor", profit_factor),
        ("Expectancy", trades.expectancy.round_dp(4).to_string()),
        ("Net P&L", trades.net_profit.round_dp(4).to_string()),
        ("Total fees", trades.total_fees.round_dp(4).to_string()),
        ("Max consecutive losses", trades.max_consecutive_losses.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table
}

async fn handle_health(settings: &Settings) -> Result<()> {
    let analyzer = Analyzer::from_settings(settings)?;
    match analyzer.health().await {
        Ok(status) => {
            println!("Inference service at {}: {}", settings.inference.base_url, status.status);
            Ok(())
        }
        Err(e) => {
            if let Some(fix) = &e.suggested_fix {
                eprintln!("Hint: {}", fix);
            }
            Err(e.into())
        }
    }
}
