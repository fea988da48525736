//! Moodify Server Library
//!
//! Emotion detection from text and webcam images, and song recommendations
//! from a CSV catalog. The binaries build on the modules exposed here.

pub mod background_jobs;
pub mod catalog;
pub mod config;
pub mod emotion;
pub mod recommend;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{load_catalog, Catalog, Song};
pub use emotion::{classify, EmotionLabel};
pub use recommend::Recommender;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
