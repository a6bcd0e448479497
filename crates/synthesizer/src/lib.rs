//! # Synthesizer
//!
//! Turns a partial (or absent) model answer into a complete `AnalysisArtifact`.
//!
//! - `FallbackSynthesizer` backfills every section the model did not supply
//!   from the metrics engine plus fixed-threshold heuristics.
//! - `ConfidenceScorer` assigns the artifact its trust score.
//! - `PartialArtifact` decodes model JSON one section at a time.

pub mod confidence;
pub mod fallback;
pub mod heuristics;
pub mod partial;

pub use confidence::ConfidenceScorer;
pub use core_types::ConfidenceLevel;
pub use fallback::FallbackSynthesizer;
pub use partial::PartialArtifact;
