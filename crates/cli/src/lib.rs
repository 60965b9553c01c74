pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use stride_core::config::{AppConfig, LoadOptions};

use crate::commands::generate::GenerateRequest;
use crate::commands::recommend::RecommendRequest;

#[derive(Debug, Parser)]
#[command(
    name = "stride",
    about = "Stride shoe recommender",
    long_about = "Rank unseen shoes for a user, flag owned pairs that need care or replacement, \
                  and manage the CSV tables behind them.",
    after_help = "Examples:\n  stride recommend 42\n  echo 42 | stride recommend --json\n  \
                  stride generate --seed 7\n  stride doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a stride.toml configuration file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend shoes for a user and report care and replacement advice")]
    Recommend(RecommendArgs),
    #[command(about = "Write synthetic catalog, interaction, and care log tables")]
    Generate(GenerateArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and check that every input table loads")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct RecommendArgs {
    #[arg(help = "Numeric user id; read from stdin when omitted")]
    user_id: Option<String>,
    #[arg(long, help = "Content weight in [0, 1]")]
    alpha: Option<f64>,
    #[arg(long, help = "Number of recommendations to return")]
    top_n: Option<usize>,
    #[arg(long, help = "Seed for the simulated usage draws")]
    seed: Option<u64>,
    #[arg(long, help = "Directory holding the input tables")]
    data_dir: Option<PathBuf>,
    #[arg(long, help = "Where to write recommendations.csv")]
    output: Option<PathBuf>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    json: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, help = "Directory to write the tables into")]
    out_dir: Option<PathBuf>,
    #[arg(long)]
    users: Option<u64>,
    #[arg(long)]
    items: Option<u64>,
    #[arg(long)]
    interactions: Option<u64>,
    #[arg(long, help = "Seed for reproducible output")]
    seed: Option<u64>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands report their own config errors; logging falls back to defaults.
    let config = AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    })
    .unwrap_or_default();
    if let Err(error) = logging::init(&config.logging) {
        eprintln!("{error}");
    }

    let result = match cli.command {
        Command::Recommend(args) => {
            let request = RecommendRequest {
                user_id: args.user_id,
                alpha: args.alpha,
                top_n: args.top_n,
                seed: args.seed,
                data_dir: args.data_dir,
                output: args.output,
                config_path: cli.config,
                json: args.json,
            };
            commands::recommend::run(request, &mut std::io::stdin().lock())
        }
        Command::Generate(args) => commands::generate::run(GenerateRequest {
            out_dir: args.out_dir,
            users: args.users,
            items: args.items,
            interactions: args.interactions,
            seed: args.seed,
            config_path: cli.config,
        }),
        Command::Config => commands::config::run(cli.config),
        Command::Doctor { json } => commands::doctor::run(json, cli.config),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
