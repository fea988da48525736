use anyhow::{Context, Result};
use clap::Parser;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::get_styles;

use moodify_server::catalog::{load_catalog, Song};
use moodify_server::emotion::{
    classify_with_scores, detect_bytes_face_emotion, make_face_analyzer, FaceAnalyzer, LabelScore,
};
use moodify_server::recommend::{no_songs_message, Recommender};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Interactive mood-to-music recommender.
#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the CSV song catalog.
    #[clap(value_parser = parse_path)]
    pub catalog_path: PathBuf,

    /// Base URL of the facial emotion analysis service.
    #[clap(long)]
    pub face_analyzer_url: Option<String>,

    /// Timeout in seconds for facial analysis requests.
    #[clap(long, default_value_t = 30)]
    pub face_analyzer_timeout_sec: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Image,
    Text,
    Exit,
}

fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Image),
        "2" => Some(MenuChoice::Text),
        "3" => Some(MenuChoice::Exit),
        _ => None,
    }
}

fn print_menu() {
    println!();
    println!("Select input type:");
    println!("1. Image file (facial emotion)");
    println!("2. Text (type mood)");
    println!("3. Exit");
}

fn recommendation_lines(emotion: &str, song: Option<&Song>) -> Vec<String> {
    match song {
        Some(song) => vec![
            format!("Recommended song for '{}':", emotion),
            format!("{} by {}", song.song_name, song.artist),
            song.link.clone(),
        ],
        None => vec![no_songs_message(emotion)],
    }
}

/// "happy: 2 (happy, joy)" for every label with at least one match.
fn score_lines(scores: &[LabelScore]) -> Vec<String> {
    scores
        .iter()
        .filter(|score| score.score > 0)
        .map(|score| {
            format!(
                "{}: {} ({})",
                score.label,
                score.score,
                score.matched.join(", ")
            )
        })
        .collect()
}

fn print_recommendation(recommender: &Recommender, emotion: &str) {
    let song = recommender.recommend(emotion);
    let lines = recommendation_lines(emotion, song.as_ref());
    println!();
    match song {
        Some(_) => {
            println!("{}", lines[0]);
            cli_style::print_song_line(&lines[1]);
            cli_style::print_key_value("Link", &lines[2]);
        }
        None => cli_style::print_warning(&lines[0]),
    }
}

fn handle_text(rl: &mut DefaultEditor, recommender: &Recommender) -> rustyline::Result<()> {
    let text = rl.readline(&cli_style::get_prompt("Enter how you feel"))?;
    let scores = classify_with_scores(&text);
    let emotion = moodify_server::emotion::classify(&text);

    cli_style::print_section_header("Text analysis");
    cli_style::print_key_value("Detected text emotion", emotion.as_str());
    for line in score_lines(&scores) {
        cli_style::print_key_value("Matched", &line);
    }
    cli_style::print_section_footer();

    print_recommendation(recommender, emotion.as_str());
    Ok(())
}

async fn handle_image(
    rl: &mut DefaultEditor,
    recommender: &Recommender,
    face_analyzer: &dyn FaceAnalyzer,
) -> rustyline::Result<()> {
    let line = rl.readline(&cli_style::get_prompt("Image file path"))?;
    let path = PathBuf::from(line.trim());
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            cli_style::print_error(&format!("Could not read {:?}: {}", path, err));
            return Ok(());
        }
    };

    let detection = detect_bytes_face_emotion(face_analyzer, bytes).await;

    cli_style::print_section_header("Facial analysis");
    cli_style::print_key_value("Detected facial emotion", &detection.emotion);
    cli_style::print_section_footer();
    if let Some(warning) = &detection.warning {
        cli_style::print_warning(warning);
    }

    print_recommendation(recommender, &detection.emotion);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let catalog = load_catalog(&cli_args.catalog_path)?;
    let recommender = Recommender::new(Arc::new(catalog));
    let face_analyzer = make_face_analyzer(
        cli_args.face_analyzer_url.as_deref(),
        cli_args.face_analyzer_timeout_sec,
    )?;

    cli_style::print_banner();
    cli_style::print_success(&format!(
        "Loaded {} songs from {}",
        recommender.catalog().len(),
        cli_args.catalog_path.display()
    ));

    let mut rl = DefaultEditor::new().context("Could not initialize line editor")?;

    loop {
        print_menu();
        let readline = rl.readline(&cli_style::get_prompt("Enter choice"));

        let result = match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match parse_choice(&line) {
                    Some(MenuChoice::Image) => {
                        handle_image(&mut rl, &recommender, face_analyzer.as_ref()).await
                    }
                    Some(MenuChoice::Text) => handle_text(&mut rl, &recommender),
                    Some(MenuChoice::Exit) => break,
                    None => {
                        cli_style::print_error("Invalid choice. Try again.");
                        Ok(())
                    }
                }
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {}
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }

    cli_style::print_goodbye();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_choices() {
        assert_eq!(parse_choice("1"), Some(MenuChoice::Image));
        assert_eq!(parse_choice(" 2 \n"), Some(MenuChoice::Text));
        assert_eq!(parse_choice("3"), Some(MenuChoice::Exit));
        assert_eq!(parse_choice("4"), None);
        assert_eq!(parse_choice("text"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn formats_recommendation() {
        let song = Song::new("Happy", "Pharrell Williams", "https://example.com/happy", "happy");
        assert_eq!(
            recommendation_lines("happy", Some(&song)),
            vec![
                "Recommended song for 'happy':".to_string(),
                "Happy by Pharrell Williams".to_string(),
                "https://example.com/happy".to_string(),
            ]
        );
    }

    #[test]
    fn formats_missing_recommendation() {
        assert_eq!(
            recommendation_lines("fear", None),
            vec!["No songs found for 'fear' emotion.".to_string()]
        );
    }

    #[test]
    fn lists_only_matching_labels() {
        let lines = score_lines(&classify_with_scores("I am so happy and excited!"));
        assert_eq!(lines, vec!["happy: 2 (happy, excited)".to_string()]);
        assert!(score_lines(&classify_with_scores("nothing to see")).is_empty());
    }

    #[test]
    fn parses_relative_paths_against_cwd() {
        let path = parse_path("songs.csv").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("songs.csv"));
    }
}
