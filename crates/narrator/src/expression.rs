//! Narrator expressions and keyword mood detection

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expression {
    #[default]
    Neutral,
    Happy,
    Excited,
    Thinking,
    Speaking,
    Sad,
    Scared,
    Mysterious,
}

impl Expression {
    pub const ALL: [Expression; 8] = [
        Self::Neutral,
        Self::Happy,
        Self::Excited,
        Self::Thinking,
        Self::Speaking,
        Self::Sad,
        Self::Scared,
        Self::Mysterious,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
            Self::Sad => "sad",
            Self::Scared => "scared",
            Self::Mysterious => "mysterious",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| format!("unknown expression '{}'", s))
    }
}

/// Keyword classes, checked in order; the first class with any hit wins
const MOOD_KEYWORDS: [(Expression, &[&str]); 5] = [
    (
        Expression::Happy,
        &["happy", "joy", "laugh", "smile", "celebration"],
    ),
    (
        Expression::Scared,
        &["scary", "afraid", "fear", "dark", "monster"],
    ),
    (Expression::Sad, &["sad", "cry", "tear", "unhappy", "sorry"]),
    (
        Expression::Excited,
        &["exciting", "amazing", "wow", "incredible", "adventure"],
    ),
    (
        Expression::Mysterious,
        &["mysterious", "secret", "unknown", "magic", "wonder"],
    ),
];

/// Reads a mood off the first `sample_chars` characters of `text`
///
/// Keywords match as case-insensitive substrings, so "unhappy" counts as
/// happy. Text with no keyword is neutral.
pub fn detect_mood(text: &str, sample_chars: usize) -> Expression {
    let sample: String = text.chars().take(sample_chars).collect::<String>().to_lowercase();
    MOOD_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| sample.contains(w)))
        .map(|(mood, _)| *mood)
        .unwrap_or(Expression::Neutral)
}
