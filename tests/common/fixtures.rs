//! Test fixture creation
//!
//! Writes the CSV song catalog used by every end-to-end test.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
song_name,artist,link,emotion
Happy,Pharrell Williams,https://open.spotify.com/track/60nZcImufyMA1MKQY3dcCH,happy
Walking on Sunshine,Katrina and the Waves,https://open.spotify.com/track/05wIrZSwuaVWhcv5FfqeH0,Happy
Good as Hell,Lizzo,https://open.spotify.com/track/3Yko2SxDk4hc6fncIBQlcM,HAPPY
Someone Like You,Adele,https://open.spotify.com/track/4kflIGfjdZJW4ot2ioixTB,sad
Break Stuff,Limp Bizkit,https://open.spotify.com/track/5cZqsjVs6MevCnAkasbEOX,angry
Killing in the Name,Rage Against the Machine,https://open.spotify.com/track/59WN2psjkt1tyaxjspN8fp,angry
Can't Help Falling in Love,Elvis Presley,https://open.spotify.com/track/44AyOl4qVkzS48vBsbNXaC,love
Weightless,Marconi Union,https://open.spotify.com/track/6kkwzB6hXLIONkEk9JciA6,neutral
";

/// Creates a temporary directory holding `songs.csv`.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("songs.csv");
    fs::write(&path, CATALOG_CSV)?;
    Ok((dir, path))
}
