//! The closed set of moods and the canned tip and jokes for each.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Stressed,
    Calm,
    Angry,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mood '{0}'")]
pub struct ParseMoodError(pub String);

impl Mood {
    /// Menu order, as offered to the user.
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Stressed,
        Mood::Calm,
        Mood::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Calm => "calm",
            Mood::Angry => "angry",
        }
    }

    pub fn tip(self) -> &'static str {
        match self {
            Mood::Happy => "Keep up the positive vibes! 😊",
            Mood::Sad => "It's okay to feel sad. Talk to a friend. 💙",
            Mood::Anxious => "Take deep breaths and relax. 🧘‍♂",
            Mood::Stressed => "Stretch or take a break. 🌿",
            Mood::Calm => "Enjoy the peace. 🌸",
            Mood::Angry => "Count to 10 or go for a walk. 🚶‍♂",
        }
    }

    pub fn jokes(self) -> &'static [&'static str] {
        match self {
            Mood::Happy => {
                &["Why don't scientists trust atoms? Because they make up everything! 😄"]
            }
            Mood::Sad => &["Why did the cookie cry? Because his mom was a wafer too long! 🍪"],
            Mood::Anxious => {
                &["Why did the scarecrow win an award? He was outstanding in his field! 🌾"]
            }
            Mood::Stressed => &["Why don't programmers like nature? Too many bugs! 🐞"],
            Mood::Calm => &["What do you call a sleeping bull? A bulldozer! 🐂"],
            Mood::Angry => &["Why was the computer cold? It forgot to close its Windows! 🖥"],
        }
    }

    /// Comma-separated menu, e.g. "happy, sad, anxious, stressed, calm, angry".
    pub fn menu() -> String {
        Mood::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ParseMoodError;

    /// Exact keyword match after trimming, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| ParseMoodError(s.to_string()))
    }
}
