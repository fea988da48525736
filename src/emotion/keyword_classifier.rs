//! Keyword based text emotion classification.
//!
//! Each label owns a list of keywords. A label scores one point for every
//! keyword found as a substring of the lowercased text, the best score wins
//! and ties go to the label declared first in [`KEYWORD_TABLE`].

use super::EmotionLabel;

/// Score reported by `/text` for keyword results. This is a fixed value,
/// not a confidence.
pub const KEYWORD_CLASSIFIER_SCORE: f64 = 0.95;

pub const KEYWORD_TABLE: [(EmotionLabel, &[&str]); 8] = [
    (
        EmotionLabel::Happy,
        &[
            "happy", "joy", "joyful", "excited", "great", "wonderful", "amazing", "fantastic",
            "good", "excellent", "love", "loving", "cheerful", "delighted", "pleased", "glad",
        ],
    ),
    (
        EmotionLabel::Sad,
        &[
            "sad", "depressed", "down", "unhappy", "miserable", "crying", "upset", "heartbroken",
            "disappointed", "lonely", "blue", "melancholy",
        ],
    ),
    (
        EmotionLabel::Angry,
        &[
            "angry", "mad", "furious", "annoyed", "irritated", "rage", "frustrated", "pissed",
            "livid", "outraged",
        ],
    ),
    (
        EmotionLabel::Fear,
        &[
            "scared", "afraid", "fearful", "anxious", "worried", "nervous", "terrified",
            "frightened", "panic",
        ],
    ),
    (
        EmotionLabel::Surprise,
        &[
            "surprised", "shocked", "amazed", "wow", "unexpected", "astonished", "stunned",
        ],
    ),
    (
        EmotionLabel::Disgust,
        &[
            "disgusted", "gross", "yuck", "horrible", "awful", "revolting", "sick",
        ],
    ),
    (
        EmotionLabel::Love,
        &[
            "love", "adore", "cherish", "affection", "romantic", "caring", "tender",
        ],
    ),
    (
        EmotionLabel::Neutral,
        &["okay", "fine", "alright", "normal", "meh", "whatever"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScore {
    pub label: EmotionLabel,
    pub score: usize,
    pub matched: Vec<&'static str>,
}

/// Scores every label of the table, in table order.
pub fn classify_with_scores(text: &str) -> Vec<LabelScore> {
    let text = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .map(|(label, keywords)| {
            let matched: Vec<&'static str> = keywords
                .iter()
                .copied()
                .filter(|keyword| text.contains(keyword))
                .collect();
            LabelScore {
                label: *label,
                score: matched.len(),
                matched,
            }
        })
        .collect()
}

pub fn classify(text: &str) -> EmotionLabel {
    let mut best: Option<(EmotionLabel, usize)> = None;
    for entry in classify_with_scores(text) {
        if entry.score == 0 {
            continue;
        }
        // Strictly greater, so the first declared label keeps ties.
        match best {
            Some((_, best_score)) if entry.score <= best_score => {}
            _ => best = Some((entry.label, entry.score)),
        }
    }
    best.map(|(label, _)| label).unwrap_or(EmotionLabel::Neutral)
}
