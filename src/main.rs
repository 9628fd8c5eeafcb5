use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use liquidity_score::scoring::{AsOf, ScoringContext};
use liquidity_score::ScoreError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_NO_DATA: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScoreFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HistoryFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Composite score, latest or as of a year / month (default if no subcommand)
    Score {
        /// Score as of this year (latest observation within it)
        #[arg(long)]
        year: Option<i32>,

        /// Narrow the year to a month (1-12); falls back to earlier months of the year
        #[arg(long, requires = "year")]
        month: Option<u32>,

        #[arg(long, value_enum, default_value_t = ScoreFormat::Human)]
        format: ScoreFormat,
    },
    /// Monthly history of the composite score
    History {
        #[arg(long, value_enum, default_value_t = HistoryFormat::Table)]
        format: HistoryFormat,
    },
    /// Show indicator weights and polarity
    Weights,
    /// Describe one indicator
    Describe {
        /// Indicator code (e.g. M2SL)
        code: String,
    },
    /// Reload observations periodically and print the latest score
    Watch {
        /// Refresh interval (e.g. "15m"); defaults to refresh_interval from config
        #[arg(long)]
        interval: Option<String>,
    },
    /// Create a config file interactively
    Init {
        /// Where to write the config (defaults to ~/.config/liquidity-score/config.yaml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "liquidity-score")]
#[command(about = "Weighted liquidity composite score from macroeconomic series", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and score breakdowns
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/liquidity-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Observation file or directory (overrides `data` in the config)
    #[arg(short, long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool, default_level: &str) {
    let fallback = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Score {
        year: None,
        month: None,
        format: ScoreFormat::Human,
    });
    let start_time = Instant::now();

    if let Commands::Init { path } = command {
        let path = path.or_else(|| cli.config.as_ref().map(PathBuf::from));
        if let Err(e) = liquidity_score::config::init::run_init_wizard(path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let (config, source) = match liquidity_score::config::load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    init_tracing(cli.verbose, config.log_level());
    source.log(&config);

    // Validate indicator table at startup
    if let Err(errors) = liquidity_score::scoring::validate_indicators(&config.indicators) {
        eprintln!("Indicator config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    for warning in liquidity_score::scoring::weight_warnings(&config.indicators) {
        tracing::warn!("{}", warning);
    }

    let use_colors = liquidity_score::output::should_use_colors();

    if let Commands::Weights = command {
        println!(
            "{}",
            liquidity_score::output::format_weights(&config.indicators, use_colors)
        );
        std::process::exit(EXIT_SUCCESS);
    }

    let data_path = cli
        .data
        .map(PathBuf::from)
        .or_else(|| config.data_path())
        .unwrap_or_else(liquidity_score::store::get_data_path);

    if let Commands::Watch { interval } = command {
        let interval = match interval {
            Some(raw) => humantime::parse_duration(&raw)
                .map_err(|e| anyhow::anyhow!("Invalid interval '{}': {}", raw, e)),
            None => config.refresh_interval(),
        };
        let interval = match interval {
            Ok(i) => i,
            Err(e) => {
                eprintln!("{:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        };
        run_watch(data_path, Arc::new(config.indicators), interval, use_colors).await;
        std::process::exit(EXIT_SUCCESS);
    }

    let store = match liquidity_score::store::load_observations(&data_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Data error: {}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    for warning in liquidity_score::scoring::series_warnings(&config.indicators, &store) {
        tracing::warn!("{}", warning);
    }

    let ctx = ScoringContext::new(&store, &config.indicators);

    match command {
        Commands::Score { year, month, format } => {
            let as_of = match AsOf::from_parts(year, month) {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };

            let result = match ctx.score(as_of) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("No score for {}: {}", as_of, e);
                    std::process::exit(EXIT_NO_DATA);
                }
            };

            match format {
                ScoreFormat::Json => match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize score: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                },
                ScoreFormat::Human => {
                    println!(
                        "{}",
                        liquidity_score::output::format_current(&result, use_colors)
                    );
                    if cli.verbose {
                        println!();
                        println!(
                            "{}",
                            liquidity_score::output::format_breakdown(
                                &result,
                                &config.indicators,
                                use_colors
                            )
                        );
                    }
                }
            }
        }
        Commands::History { format } => {
            let history = ctx.build_history();
            let output = match format {
                HistoryFormat::Table => {
                    liquidity_score::output::format_history_table(&history, use_colors)
                }
                HistoryFormat::Tsv => liquidity_score::output::format_history_tsv(&history),
                HistoryFormat::Json => match serde_json::to_string_pretty(&history) {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Failed to serialize history: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                },
            };
            println!("{}", output);
        }
        Commands::Describe { code } => {
            let Some(indicator) = config.indicators.get(&code) else {
                eprintln!("Unknown indicator '{}'. Run `liquidity-score weights` to list them.", code);
                std::process::exit(EXIT_CONFIG);
            };
            println!(
                "{}",
                liquidity_score::output::format_indicator_detail(
                    indicator,
                    ctx.range(&indicator.code),
                    store.latest(&indicator.code),
                    use_colors
                )
            );
        }
        Commands::Weights | Commands::Watch { .. } | Commands::Init { .. } => unreachable!(),
    }

    tracing::debug!(
        "done in {}",
        humantime::format_duration(start_time.elapsed())
    );
    std::process::exit(EXIT_SUCCESS);
}

async fn run_watch(
    data_path: PathBuf,
    indicators: Arc<liquidity_score::scoring::IndicatorTable>,
    interval: std::time::Duration,
    use_colors: bool,
) {
    let shared = liquidity_score::fetch::SharedSnapshot::new();
    let mut ticker = tokio::time::interval(interval);

    tracing::info!(
        path = %data_path.display(),
        interval = %humantime::format_duration(interval),
        "watching observations"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match liquidity_score::fetch::refresh(&data_path, Arc::clone(&indicators), &shared).await {
                    Ok(snapshot) => match &snapshot.current {
                        Ok(result) => {
                            println!("{}", liquidity_score::output::format_current(result, use_colors));
                        }
                        Err(ScoreError::InsufficientData) => {
                            println!("No score: insufficient data");
                        }
                        Err(e) => println!("No score: {}", e),
                    },
                    Err(e) => {
                        // Keep the previous snapshot; try again next tick
                        tracing::warn!("Refresh failed: {:#}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch");
                break;
            }
        }
    }
}
