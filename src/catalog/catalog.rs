use super::Song;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const SONG_NAME_COLUMN: &str = "song_name";
const ARTIST_COLUMN: &str = "artist";
const LINK_COLUMN: &str = "link";
const EMOTION_COLUMN: &str = "emotion";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// The catalog file could not be opened or read.
    Io(String),
    /// A required column is not present in the header row.
    MissingColumn(&'static str),
    /// No usable song survived loading.
    Empty,
    MissingSongName { row: usize },
    MissingEmotion { row: usize },
    MalformedRow { row: usize, reason: String },
}

impl Problem {
    /// Fatal problems prevent the catalog from being built at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Problem::Io(_) | Problem::MissingColumn(_) | Problem::Empty
        )
    }
}

pub struct CatalogBuildResult {
    pub catalog: Option<Catalog>,
    pub problems: Vec<Problem>,
}

impl CatalogBuildResult {
    fn failed(problem: Problem) -> CatalogBuildResult {
        CatalogBuildResult {
            catalog: None,
            problems: vec![problem],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: String,
    pub songs: usize,
}

/// Read-only, ordered collection of songs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
}

struct Columns {
    song_name: usize,
    artist: Option<usize>,
    link: Option<usize>,
    emotion: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Columns, Problem> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };
        Ok(Columns {
            song_name: find(SONG_NAME_COLUMN).ok_or(Problem::MissingColumn(SONG_NAME_COLUMN))?,
            artist: find(ARTIST_COLUMN),
            link: find(LINK_COLUMN),
            emotion: find(EMOTION_COLUMN).ok_or(Problem::MissingColumn(EMOTION_COLUMN))?,
        })
    }
}

impl Catalog {
    pub fn build(path: &Path) -> CatalogBuildResult {
        match std::fs::File::open(path) {
            Ok(file) => Catalog::build_from_reader(file),
            Err(err) => {
                CatalogBuildResult::failed(Problem::Io(format!("{}: {}", path.display(), err)))
            }
        }
    }

    pub fn build_from_reader<R: Read>(reader: R) -> CatalogBuildResult {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = match csv_reader.headers() {
            Ok(headers) => match Columns::from_headers(headers) {
                Ok(columns) => columns,
                Err(problem) => return CatalogBuildResult::failed(problem),
            },
            Err(err) => return CatalogBuildResult::failed(Problem::Io(err.to_string())),
        };

        let mut songs = Vec::new();
        let mut problems = Vec::new();

        for (index, record) in csv_reader.records().enumerate() {
            let row = index + 1;
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    problems.push(Problem::MalformedRow {
                        row,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let get = |i: usize| record.get(i).map(str::trim).unwrap_or_default();

            let song_name = get(columns.song_name);
            let emotion = get(columns.emotion);
            if song_name.is_empty() {
                problems.push(Problem::MissingSongName { row });
                continue;
            }
            if emotion.is_empty() {
                problems.push(Problem::MissingEmotion { row });
                continue;
            }

            songs.push(Song::new(
                song_name,
                columns.artist.map(get).unwrap_or_default(),
                columns.link.map(get).unwrap_or_default(),
                emotion,
            ));
        }

        if songs.is_empty() {
            problems.push(Problem::Empty);
            return CatalogBuildResult {
                catalog: None,
                problems,
            };
        }

        CatalogBuildResult {
            catalog: Some(Catalog { songs }),
            problems,
        }
    }

    pub fn from_songs(songs: Vec<Song>) -> Catalog {
        Catalog { songs }
    }

    pub fn dummy() -> Catalog {
        Catalog::from_songs(vec![
            Song::new("Happy", "Pharrell Williams", "https://example.com/happy", "happy"),
            Song::new("Walking on Sunshine", "Katrina and the Waves", "https://example.com/sunshine", "happy"),
            Song::new("Someone Like You", "Adele", "https://example.com/someone", "sad"),
        ])
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs tagged with `emotion`, compared case-insensitively, in catalog order.
    pub fn songs_for_emotion(&self, emotion: &str) -> Vec<&Song> {
        self.songs.iter().filter(|s| s.has_emotion(emotion)).collect()
    }

    /// Distinct lowercased emotions with their song counts, sorted by emotion.
    pub fn emotions(&self) -> Vec<EmotionCount> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for song in self.songs.iter() {
            *counts.entry(song.emotion.trim().to_lowercase()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(emotion, songs)| EmotionCount { emotion, songs })
            .collect()
    }
}
