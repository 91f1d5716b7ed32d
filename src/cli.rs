use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "job_autopilot")]
#[command(about = "Search LinkedIn jobs and walk through Easy Apply from the terminal")]
pub struct Cli {
    /// Settings file with credentials, last search and applied companies
    #[arg(long, default_value = "settings.json")]
    pub settings: PathBuf,

    /// Activity log
    #[arg(long, default_value = "linkedin_activity.log")]
    pub log_file: PathBuf,

    /// Run Chrome without a window
    #[arg(long)]
    pub headless: bool,

    /// Never call the geocoding service for unknown locations
    #[arg(long)]
    pub no_geocode: bool,

    #[arg(long, default_value_t = 5)]
    pub geocode_timeout_secs: u64,

    /// Upper bound on result pages followed per search
    #[arg(long, default_value_t = 10)]
    pub max_pages: usize,

    #[arg(long, default_value_t = 2000)]
    pub min_delay_ms: u64,

    #[arg(long, default_value_t = 4000)]
    pub max_delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["job_autopilot"]);
        assert_eq!(cli.settings, PathBuf::from("settings.json"));
        assert_eq!(cli.log_file, PathBuf::from("linkedin_activity.log"));
        assert!(!cli.headless);
        assert!(!cli.no_geocode);
        assert_eq!(cli.geocode_timeout_secs, 5);
        assert_eq!(cli.max_pages, 10);
    }

    #[test]
    fn overrides() {
        let cli = Cli::parse_from([
            "job_autopilot",
            "--headless",
            "--no-geocode",
            "--settings",
            "/tmp/s.json",
            "--max-pages",
            "3",
        ]);
        assert!(cli.headless);
        assert!(cli.no_geocode);
        assert_eq!(cli.settings, PathBuf::from("/tmp/s.json"));
        assert_eq!(cli.max_pages, 3);
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
