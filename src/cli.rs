use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::application::dto::{
    CiEndpoints, ScanSettings, DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_PAGE_SIZE,
    DEFAULT_TARGET_COUNT, DEFAULT_WORKERS,
};
use crate::adapters::outbound::filesystem::DEFAULT_CACHE_DIR;
use crate::config::ConfigFile;

/// Scan CI build history for recurring failure signatures
#[derive(Parser, Debug)]
#[command(name = "ci-failure-scan")]
#[command(version)]
#[command(about = "Scan CI build history for recurring failure signatures", long_about = None)]
pub struct Args {
    /// Branch whose build history is scanned
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Number of builds to ingest before scanning
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// CI provider API token
    #[arg(long, env = "CIRCLE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum number of builds scanned concurrently
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Builds requested per build-list page
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub page_size: Option<u16>,

    /// Project API base URL
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Always fetch from the network; neither read nor write the disk cache
    #[arg(long)]
    pub no_cache: bool,

    /// Directory holding cached responses
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// JSON file persisting builds, scans and matches (in-memory if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Keep builds and matches from previous runs
    #[arg(long)]
    pub no_scrub: bool,

    /// Configuration file path (defaults to ./ci-failure-scan.config.yml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Merges flags over config file values over defaults
    pub fn resolve_settings(&self, config: &ConfigFile) -> ScanSettings {
        let api_base = self
            .api_base
            .as_deref()
            .or(config.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE);

        ScanSettings {
            endpoints: CiEndpoints::new(api_base),
            branch: self
                .branch
                .clone()
                .or_else(|| config.branch.clone())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token: self
                .token
                .clone()
                .or_else(|| config.token.clone())
                .unwrap_or_default(),
            target_count: self
                .count
                .or(config.count)
                .unwrap_or(DEFAULT_TARGET_COUNT),
            page_size: self
                .page_size
                .map(usize::from)
                .or(config.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            workers: self
                .workers
                .map(usize::from)
                .or(config.workers)
                .unwrap_or(DEFAULT_WORKERS),
            cache_enabled: !self.no_cache && config.cache_enabled.unwrap_or(true),
            cache_dir: self
                .cache_dir
                .clone()
                .or_else(|| config.cache_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            scrub: !self.no_scrub && config.scrub.unwrap_or(true),
        }
    }

    /// Store file from the flag or the config file
    pub fn store_path(&self, config: &ConfigFile) -> Option<PathBuf> {
        self.store.clone().or_else(|| config.store_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["ci-failure-scan"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_flags_or_config() {
        let args = parse(&["--token", "t"]);
        let settings = args.resolve_settings(&ConfigFile::default());

        assert_eq!(settings.endpoints.api_base(), DEFAULT_API_BASE);
        assert_eq!(settings.branch, DEFAULT_BRANCH);
        assert_eq!(settings.token, "t");
        assert_eq!(settings.target_count, DEFAULT_TARGET_COUNT);
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.workers, DEFAULT_WORKERS);
        assert!(settings.cache_enabled);
        assert_eq!(settings.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert!(settings.scrub);
        assert!(args.store_path(&ConfigFile::default()).is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--branch",
            "release/2.1",
            "-n",
            "40",
            "--workers",
            "3",
            "--no-cache",
            "--store",
            "cli.json",
        ]);
        let config = ConfigFile {
            branch: Some("main".to_string()),
            count: Some(500),
            workers: Some(16),
            cache_enabled: Some(true),
            store_path: Some(PathBuf::from("config.json")),
            token: Some("from-config".to_string()),
            ..ConfigFile::default()
        };

        let settings = args.resolve_settings(&config);
        assert_eq!(settings.branch, "release/2.1");
        assert_eq!(settings.target_count, 40);
        assert_eq!(settings.workers, 3);
        assert!(!settings.cache_enabled);
        assert_eq!(args.store_path(&config), Some(PathBuf::from("cli.json")));
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let args = parse(&[]);
        let config = ConfigFile {
            api_base: Some("https://ci.example/api/".to_string()),
            page_size: Some(30),
            cache_enabled: Some(false),
            scrub: Some(false),
            ..ConfigFile::default()
        };

        let settings = args.resolve_settings(&config);
        assert_eq!(settings.endpoints.api_base(), "https://ci.example/api");
        assert_eq!(settings.page_size, 30);
        assert!(!settings.cache_enabled);
        assert!(!settings.scrub);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Args::try_parse_from(["ci-failure-scan", "--workers", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_levels() {
        assert_eq!(parse(&[]).verbose, 0);
        assert_eq!(parse(&["-v"]).verbose, 1);
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }
}
