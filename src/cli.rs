//! CLI argument parsing module for msdetect

use clap::Parser;
use std::path::PathBuf;

/// Default remote size limit in KB
pub const DEFAULT_MAX_SIZE_KB: u64 = 512_000;

/// Parse a strictly positive integer
fn parse_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", s))?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(value)
}

/// Microservice architecture detector for repository corpora
#[derive(Parser, Debug, Clone)]
#[command(
    name = "msdetect",
    version,
    about = "Classify repository deployment architectures from container descriptors"
)]
pub struct CliArgs {
    // Scheduling options
    /// Skip repositories that already have a result before scheduling
    #[arg(short = 'f', long)]
    pub fix_errors: bool,

    /// Process only the first 10 rows of each list with a single worker
    #[arg(short, long)]
    pub debug: bool,

    /// Number of concurrent workers (default: min(32, CPUs + 4))
    #[arg(short, long, value_parser = parse_positive)]
    pub workers: Option<usize>,

    /// Skip repositories larger than this many KB
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE_KB)]
    pub max_size_kb: u64,

    // Directories
    /// Directory of CSV repository lists
    #[arg(long, default_value = "repos")]
    pub repos: PathBuf,

    /// Directory receiving one JSON document per repository
    #[arg(long, default_value = "results")]
    pub results: PathBuf,

    /// Directory for working copies and lock files
    #[arg(long, default_value = "temp")]
    pub temp: PathBuf,

    /// Directory for per-run side-channel logs
    #[arg(long, default_value = "logs")]
    pub logs: PathBuf,

    /// Directory holding the taxonomy word lists
    #[arg(long, default_value = "consts")]
    pub consts: PathBuf,

    // Output options
    /// Enable quiet mode - no progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["msdetect"]);
        assert!(!args.fix_errors);
        assert!(!args.debug);
        assert!(args.workers.is_none());
        assert_eq!(args.max_size_kb, 512_000);
        assert_eq!(args.repos, PathBuf::from("repos"));
        assert_eq!(args.results, PathBuf::from("results"));
        assert_eq!(args.temp, PathBuf::from("temp"));
        assert_eq!(args.logs, PathBuf::from("logs"));
        assert_eq!(args.consts, PathBuf::from("consts"));
        assert!(!args.quiet);
        assert!(!args.verbose);
        assert!(!args.log_json);
    }

    #[test]
    fn test_short_flags() {
        let args = CliArgs::parse_from(["msdetect", "-f", "-d", "-w", "8", "-q", "-v"]);
        assert!(args.fix_errors);
        assert!(args.debug);
        assert_eq!(args.workers, Some(8));
        assert!(args.quiet);
        assert!(args.verbose);
    }

    #[test]
    fn test_long_flags() {
        let args = CliArgs::parse_from([
            "msdetect",
            "--fix-errors",
            "--workers",
            "3",
            "--repos",
            "/data/lists",
            "--results",
            "/data/out",
            "--max-size-kb",
            "1000",
            "--log-json",
        ]);
        assert!(args.fix_errors);
        assert_eq!(args.workers, Some(3));
        assert_eq!(args.repos, PathBuf::from("/data/lists"));
        assert_eq!(args.results, PathBuf::from("/data/out"));
        assert_eq!(args.max_size_kb, 1000);
        assert!(args.log_json);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(CliArgs::try_parse_from(["msdetect", "-w", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["msdetect", "-w", "many"]).is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("4").unwrap(), 4);
        assert_eq!(parse_positive(" 12 ").unwrap(), 12);
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("-1").is_err());
    }
}
