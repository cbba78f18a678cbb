//! Topic-to-clips pipeline.
//!
//! Searches the catalog for a topic, fetches the most viewed videos, picks
//! their most engaging segments, renders them as captioned vertical clips
//! and writes metadata beside each clip.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod metadata;
pub mod orchestrator;
pub mod segments;

pub use artifacts::{clean_temp_dir, write_metadata, OutputLayout};
pub use cli::Cli;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use gemini::{GeminiClient, GeminiConfig, GenerativeClient};
pub use logging::RunLogger;
pub use metadata::{
    GenerativeMetadataSource, MetadataContext, MetadataGenerator, MetadataSource, TemplateMetadataSource,
};
pub use orchestrator::{Orchestrator, ProducedClip, RunReport, RunRequest};
pub use segments::{
    shared_rng, uniform_segments, GenerativeSegmentSource, SegmentSelector, SegmentSource, SharedRng,
    UniformSegmentSource,
};
