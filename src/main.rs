use anyhow::Result;
use clap::{CommandFactory, Parser};

use space_hogs::cli::Cli;
use space_hogs::config::Config;
use space_hogs::report::{ColorMode, RankedReport};
use space_hogs::scanner::{self, ScanOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    tracing::debug!(?config, "Loaded configuration");

    let options = ScanOptions::new()
        .with_jobs(cli.jobs.unwrap_or(config.scanner.jobs))
        .with_progress(!cli.quiet);

    let outcome = scanner::scan(&cli.path, &options)?;

    let top = cli.top.unwrap_or(config.report.top).max(1);
    let report = RankedReport::new(outcome, top);

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        let color = !cli.no_color && ColorMode::parse(&config.report.color).enabled();
        println!("{}", report.render(color));
    }

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("space_hogs={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
