use serde::{Deserialize, Serialize};

/// A single catalog entry, tagged with the emotion it is recommended for.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Song {
    pub song_name: String,
    pub artist: String,
    pub link: String,
    pub emotion: String,
}

impl Song {
    pub fn new(song_name: &str, artist: &str, link: &str, emotion: &str) -> Song {
        Song {
            song_name: song_name.to_owned(),
            artist: artist.to_owned(),
            link: link.to_owned(),
            emotion: emotion.to_owned(),
        }
    }

    /// Case-insensitive comparison against the song emotion tag.
    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.emotion.trim().to_lowercase() == emotion.trim().to_lowercase()
    }
}
