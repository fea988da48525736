mod selector;

pub use selector::{select_song, LastRecommended};

use crate::catalog::{Catalog, Song};
use crate::server::metrics;
use std::sync::Arc;
use tracing::debug;

/// Catalog plus repeat-avoidance state, shared by every request.
pub struct Recommender {
    catalog: Arc<Catalog>,
    last_recommended: LastRecommended,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            last_recommended: LastRecommended::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn last_recommended(&self) -> &LastRecommended {
        &self.last_recommended
    }

    pub fn recommend(&self, emotion: &str) -> Option<Song> {
        let mut rng = rand::rng();
        let song = select_song(emotion, &self.catalog, &self.last_recommended, &mut rng);
        match &song {
            Some(song) => debug!(
                "Recommending \"{}\" by {} for '{}'",
                song.song_name, song.artist, emotion
            ),
            None => debug!("No songs found for '{}'", emotion),
        }
        metrics::record_recommendation(emotion, song.is_some());
        song
    }
}

/// User-facing text for an emotion without songs.
pub fn no_songs_message(emotion: &str) -> String {
    format!("No songs found for '{}' emotion.", emotion)
}
