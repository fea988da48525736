use crate::catalog::{Catalog, Song};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Last song handed out for each emotion, keyed by lowercased emotion.
///
/// Owned by whoever serves recommendations and passed into [`select_song`].
/// A selection holds the lock for its whole read-filter-write sequence, so
/// concurrent callers for the same emotion cannot interleave.
#[derive(Debug, Default)]
pub struct LastRecommended {
    entries: Mutex<HashMap<String, Song>>,
}

impl LastRecommended {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Song>> {
        // The map only holds plain values, a poisoned lock is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, emotion: &str) -> Option<Song> {
        self.lock().get(&normalize(emotion)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

fn normalize(emotion: &str) -> String {
    emotion.trim().to_lowercase()
}

/// Picks a random song for `emotion`, avoiding the one returned last time.
///
/// Returns `None` when the catalog has no song for the emotion, in which case
/// `last_recommended` is left untouched. When every candidate shares the name
/// of the previous pick (e.g. a single-song emotion) the full list is used.
pub fn select_song<R: Rng + ?Sized>(
    emotion: &str,
    catalog: &Catalog,
    last_recommended: &LastRecommended,
    rng: &mut R,
) -> Option<Song> {
    let available = catalog.songs_for_emotion(emotion);
    if available.is_empty() {
        return None;
    }

    let key = normalize(emotion);
    let mut entries = last_recommended.lock();

    let fresh: Vec<&Song> = match entries.get(&key) {
        Some(previous) => available
            .iter()
            .copied()
            .filter(|song| song.song_name != previous.song_name)
            .collect(),
        None => available.clone(),
    };
    let candidates = if fresh.is_empty() { &available } else { &fresh };

    let chosen = (*candidates.choose(rng)?).clone();
    entries.insert(key, chosen.clone());
    Some(chosen)
}
