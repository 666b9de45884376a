//! knack-sleuth CLI entry point

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use knack_sleuth::cli::Commands;
use knack_sleuth::commands::{
    run_cache, run_download, run_impact, run_list_objects, run_search_field, run_search_object,
    run_show_coupling, run_summary, run_validate, CommandContext,
};
use knack_sleuth::{Cli, SleuthConfig};

fn main() -> ExitCode {
    // Populate KNACK_* variables from .env before clap reads them
    dotenvy::dotenv().ok();

    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(report) = e.report() {
                print!("{}", report);
            }
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> knack_sleuth::Result<String> {
    let cli = Cli::parse_args();
    let config = SleuthConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    let ctx = CommandContext::from_cli(cli.format, cli.verbose, config);

    match &cli.command {
        Commands::SearchObject(args) => run_search_object(args, &ctx),
        Commands::SearchField(args) => run_search_field(args, &ctx),
        Commands::ListObjects(args) => run_list_objects(args, &ctx),
        Commands::ShowCoupling(args) => run_show_coupling(args, &ctx),
        Commands::ImpactAnalysis(args) => run_impact(args, &ctx),
        Commands::AppSummary(args) => run_summary(args, &ctx),
        Commands::Validate(args) => run_validate(args, &ctx),
        Commands::DownloadMetadata(args) => run_download(args, &ctx),
        Commands::Cache(args) => run_cache(args, &ctx),
    }
}

/// Logs go to stderr; RUST_LOG takes precedence over the configured level
fn init_tracing(config: &SleuthConfig, verbose: bool) {
    let level = if verbose {
        "info"
    } else {
        config.logging.level.as_str()
    };

    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Ok(directive) = format!("knack_sleuth={}", level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
