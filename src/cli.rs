//! Command-line arguments and logging setup.

use crate::types::{MeshType, UtilizationThreshold};
use clap::Parser;
use std::path::PathBuf;

/// Shaker screen health reports from drilling sensor CSV exports.
///
/// Without `--batch` an interactive menu is shown; the options below only
/// seed the session.
#[derive(Debug, Clone, Parser)]
#[command(name = "shaker-health", version, about)]
pub struct Args {
    /// Shaker CSV file to analyze
    #[arg(short, long, value_name = "PATH", default_value = "shaker_data.csv")]
    pub input: PathBuf,

    /// Screen mesh type (API 100, API 140, API 170 or API 200)
    #[arg(short, long, value_name = "MESH", default_value = "API 100")]
    pub mesh: MeshType,

    /// Daily utilization threshold in percent (50-100)
    #[arg(short, long, value_name = "PERCENT", default_value = "80")]
    pub threshold: UtilizationThreshold,

    /// Directory the report files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Load the file, write the reports and exit
    #[arg(long)]
    pub batch: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

/// Log to stderr so stdout stays clean for prompts and report previews.
/// `RUST_LOG` overrides the level picked from the flags.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shaker_health={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["shaker-health"]).unwrap();
        assert_eq!(args.input, PathBuf::from("shaker_data.csv"));
        assert_eq!(args.mesh, MeshType::Api100);
        assert_eq!(args.threshold, UtilizationThreshold::default());
        assert!(!args.batch);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_mesh_and_threshold_parsing() {
        let args = Args::try_parse_from([
            "shaker-health",
            "--mesh",
            "api170",
            "--threshold",
            "95",
            "--batch",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.mesh, MeshType::Api170);
        assert_eq!(args.threshold, UtilizationThreshold::new(95).unwrap());
        assert!(args.batch);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        assert!(Args::try_parse_from(["shaker-health", "--threshold", "40"]).is_err());
        assert!(Args::try_parse_from(["shaker-health", "--threshold", "101"]).is_err());
        assert!(Args::try_parse_from(["shaker-health", "--mesh", "API 120"]).is_err());
    }
}
