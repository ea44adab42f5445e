use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// space-hogs - find the largest files and directories under a path
#[derive(Parser, Debug)]
#[command(name = "space-hogs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show top N entries per ranking
    #[arg(short = 'n', long, value_name = "N")]
    pub top: Option<usize>,

    /// Worker pool bound (0 = auto)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Validates the CLI definition is correct
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_default_path() {
        let cli = Cli::parse_from(["space-hogs"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.top, None);
        assert!(!cli.json);
    }

    #[test]
    fn parse_path_and_options() {
        let cli = Cli::parse_from(["space-hogs", "-n", "5", "--jobs", "8", "/var/log"]);
        assert_eq!(cli.path, PathBuf::from("/var/log"));
        assert_eq!(cli.top, Some(5));
        assert_eq!(cli.jobs, Some(8));
    }

    #[test]
    fn parse_json_and_no_color() {
        let cli = Cli::parse_from(["space-hogs", "--json", "--no-color", "."]);
        assert!(cli.json);
        assert!(cli.no_color);
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::parse_from(["space-hogs", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }
}
