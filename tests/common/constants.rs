//! Shared constants for end-to-end tests
//!
//! When the fixture catalog changes, update only this file and `fixtures.rs`.
#![allow(dead_code)]

// ============================================================================
// Test Catalog
// ============================================================================

/// Total number of rows in the fixture catalog
pub const CATALOG_SONG_COUNT: usize = 8;

/// Happy songs, with the emotion written in three different cases
pub const HAPPY_SONG_NAMES: [&str; 3] = ["Happy", "Walking on Sunshine", "Good as Hell"];

/// The only sad song in the fixture catalog
pub const SAD_SONG_NAME: &str = "Someone Like You";
pub const SAD_SONG_ARTIST: &str = "Adele";
pub const SAD_SONG_LINK: &str = "https://open.spotify.com/track/4kflIGfjdZJW4ot2ioixTB";

/// Two angry songs, so recommendations must alternate
pub const ANGRY_SONG_NAMES: [&str; 2] = ["Break Stuff", "Killing in the Name"];

/// The only neutral song
pub const NEUTRAL_SONG_NAME: &str = "Weightless";

/// An emotion label without songs in the fixture catalog
pub const EMOTION_WITHOUT_SONGS: &str = "fear";

// ============================================================================
// Test Payloads
// ============================================================================

/// PNG signature and IHDR chunk header, base64 encoded
pub const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUg==";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to answer on `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
