//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use shorts_models::{ApiKey, OutputFormat, SearchOrder};

use crate::config::PipelineConfig;
use crate::orchestrator::{RunRequest, DEFAULT_CLIP_DURATION, DEFAULT_NUM_CLIPS};

/// Turn trending videos about a topic into captioned vertical clips.
#[derive(Debug, Parser)]
#[command(name = "shorts-clipper")]
#[command(version)]
#[command(about = "Search, cut and caption short vertical clips from popular videos")]
pub struct Cli {
    /// Topic to search for
    #[arg(long, default_value = "trending")]
    pub topic: String,

    /// Directory for clips and their metadata
    #[arg(long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Number of clips to create
    #[arg(long = "clips", default_value_t = DEFAULT_NUM_CLIPS, value_parser = clap::value_parser!(u32).range(1..))]
    pub num_clips: u32,

    /// Clip duration in seconds, capped by the output format
    #[arg(long, default_value_t = DEFAULT_CLIP_DURATION, value_parser = parse_duration)]
    pub duration: f64,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Target platform: youtube_shorts, tiktok or instagram_reels
    #[arg(long, default_value = "youtube_shorts")]
    pub output_format: OutputFormat,

    /// Keep downloaded source videos
    #[arg(long)]
    pub keep_temp: bool,

    /// Search order: trending, recent, relevance or rating
    #[arg(long)]
    pub order: Option<SearchOrder>,

    /// Candidate videos to consider (overrides YOUTUBE_MAX_RESULTS)
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Directory for downloaded sources
    #[arg(long, env = "CLIPPER_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Seed for fallback segment scores
    #[arg(long)]
    pub seed: Option<u64>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "shorts=info")]
    pub log_level: String,
}

fn parse_duration(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("duration must be a positive number of seconds, got {}", s))
    }
}

impl Cli {
    /// Apply command-line overrides on top of environment configuration.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.youtube_api_key = Some(ApiKey::new(key));
        }
        if let Some(order) = self.order {
            config.search_order = order;
        }
        if let Some(max_results) = self.max_results {
            config.catalog.max_results = max_results;
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.temp_dir = temp_dir.clone();
        }
    }

    pub fn run_request(&self, config: &PipelineConfig) -> RunRequest {
        RunRequest {
            topic: self.topic.clone(),
            num_clips: self.num_clips,
            clip_duration: self.duration,
            output_format: self.output_format,
            order: config.search_order,
            max_results: config.catalog.max_results,
            output_dir: self.output_dir.clone(),
            temp_dir: config.temp_dir.clone(),
            keep_temp: self.keep_temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["shorts-clipper"]).unwrap();
        let config = PipelineConfig::default();
        let request = cli.run_request(&config);

        assert_eq!(request.topic, "trending");
        assert_eq!(request.num_clips, 3);
        assert_eq!(request.clip_duration, 30.0);
        assert_eq!(request.output_format, OutputFormat::YoutubeShorts);
        assert_eq!(request.output_dir, PathBuf::from("./output"));
        assert_eq!(request.temp_dir, PathBuf::from("./temp"));
        assert_eq!(request.max_results, 10);
        assert!(!request.keep_temp);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "shorts-clipper",
            "--topic",
            "cooking",
            "--clips",
            "5",
            "--duration",
            "45",
            "--output-format",
            "instagram_reels",
            "--api-key",
            "cli-key",
            "--order",
            "recent",
            "--max-results",
            "20",
            "--temp-dir",
            "/tmp/clipper",
            "--keep-temp",
        ])
        .unwrap();

        let mut config = PipelineConfig::default();
        cli.apply_overrides(&mut config);
        let request = cli.run_request(&config);

        assert_eq!(config.youtube_api_key.as_ref().map(ApiKey::expose), Some("cli-key"));
        assert_eq!(request.topic, "cooking");
        assert_eq!(request.num_clips, 5);
        assert_eq!(request.clip_duration, 45.0);
        assert_eq!(request.output_format, OutputFormat::InstagramReels);
        assert_eq!(request.order, SearchOrder::Recent);
        assert_eq!(request.max_results, 20);
        assert_eq!(request.temp_dir, PathBuf::from("/tmp/clipper"));
        assert!(request.keep_temp);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["shorts-clipper", "--output-format", "vine"]).is_err());
        assert!(Cli::try_parse_from(["shorts-clipper", "--clips", "0"]).is_err());
        assert!(Cli::try_parse_from(["shorts-clipper", "--duration", "-5"]).is_err());
    }

    #[test]
    fn test_env_backed_flags() {
        use clap::CommandFactory;
        use std::ffi::OsStr;

        let command = Cli::command();
        let arg = |id: &str| {
            command
                .get_arguments()
                .find(|a| a.get_id() == id)
                .unwrap()
                .clone()
        };

        let api_key = arg("api_key");
        assert_eq!(api_key.get_env(), Some(OsStr::new("YOUTUBE_API_KEY")));
        assert!(api_key.is_hide_env_values_set());

        let temp_dir = arg("temp_dir");
        assert_eq!(temp_dir.get_env(), Some(OsStr::new("CLIPPER_TEMP_DIR")));
    }
}
