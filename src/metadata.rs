// src/metadata.rs
//! Labels derived from recording file names and directory layout
//!
//! Every lookup returns `Option` or `Result`; nothing here falls back to a
//! default label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Emotion class encoded in a recording file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionClass {
    Sad,
    Happy,
    Fear,
    Neutral,
}

impl EmotionClass {
    pub const ALL: [EmotionClass; 4] = [
        EmotionClass::Sad,
        EmotionClass::Happy,
        EmotionClass::Fear,
        EmotionClass::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionClass::Sad => "sad",
            EmotionClass::Happy => "happy",
            EmotionClass::Fear => "fear",
            EmotionClass::Neutral => "neutral",
        }
    }

    /// Single-letter code used in file names
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            's' => Some(EmotionClass::Sad),
            'h' => Some(EmotionClass::Happy),
            'f' => Some(EmotionClass::Fear),
            'n' => Some(EmotionClass::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for EmotionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eye condition of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyesStatus {
    Open,
    Closed,
}

impl EyesStatus {
    /// Directory-style label (`open eyes`, `close eyes`)
    pub fn as_str(&self) -> &'static str {
        match self {
            EyesStatus::Open => "open eyes",
            EyesStatus::Closed => "close eyes",
        }
    }
}

impl fmt::Display for EyesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Impairment category of a stroke participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeSeverity {
    Minor,
    Moderate,
    Severe,
}

impl StrokeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrokeSeverity::Minor => "minor",
            StrokeSeverity::Moderate => "moderate",
            StrokeSeverity::Severe => "severe",
        }
    }
}

impl fmt::Display for StrokeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("no emotion class code in '{0}'")]
    Missing(String),
    #[error("'{name}' names both {first} and {second}")]
    Ambiguous {
        name: String,
        first: EmotionClass,
        second: EmotionClass,
    },
}

/// Emotion class from a file base name
///
/// The name is split on non-alphanumeric characters; a token matches when it
/// is a lone class letter, digits followed by one class letter (`12h`), or a
/// full class name in any case (`happy`).
pub fn emotion_class(basename: &str) -> Result<EmotionClass, MetadataError> {
    let stem = Path::new(basename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(basename);

    let mut found: Option<EmotionClass> = None;
    for token in stem.split(|c: char| !c.is_ascii_alphanumeric()) {
        let Some(class) = class_token(token) else {
            continue;
        };
        match found {
            None => found = Some(class),
            Some(first) if first != class => {
                return Err(MetadataError::Ambiguous {
                    name: basename.to_string(),
                    first,
                    second: class,
                })
            }
            Some(_) => {}
        }
    }

    found.ok_or_else(|| MetadataError::Missing(basename.to_string()))
}

fn class_token(token: &str) -> Option<EmotionClass> {
    if let Some(class) = EmotionClass::ALL
        .into_iter()
        .find(|class| token.eq_ignore_ascii_case(class.as_str()))
    {
        return Some(class);
    }

    let mut chars = token.chars();
    let code = chars.next_back()?;
    if chars.as_str().chars().all(|c| c.is_ascii_digit()) {
        EmotionClass::from_code(code)
    } else {
        None
    }
}

/// `P<digits>` participant tag, searched from the file name up through its parents
pub fn participant_id(path: &Path) -> Option<String> {
    path.components()
        .rev()
        .find_map(|component| participant_tag(&component.as_os_str().to_string_lossy()))
}

fn participant_tag(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|i| {
        if bytes[i] != b'P' {
            return None;
        }
        let digits = bytes[i + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        (digits > 0).then(|| text[i..i + 1 + digits].to_string())
    })
}

/// Eye condition named by a directory path
pub fn eyes_status(dir: &Path) -> Option<EyesStatus> {
    let lowered = dir.to_string_lossy().to_lowercase();
    if lowered.contains("open eyes") || lowered.contains("open_eyes") {
        Some(EyesStatus::Open)
    } else if lowered.contains("close eyes") || lowered.contains("close_eyes") {
        Some(EyesStatus::Closed)
    } else {
        None
    }
}

/// First severity keyword in a directory path
pub fn severity(dir: &Path) -> Option<StrokeSeverity> {
    let lowered = dir.to_string_lossy().to_lowercase();
    [
        ("minor", StrokeSeverity::Minor),
        ("moderate", StrokeSeverity::Moderate),
        ("severe", StrokeSeverity::Severe),
    ]
    .into_iter()
    .filter_map(|(keyword, severity)| lowered.find(keyword).map(|pos| (pos, severity)))
    .min_by_key(|(pos, _)| *pos)
    .map(|(_, severity)| severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_class_from_token() {
        assert_eq!(emotion_class("P1_h_minor_open_eyes.csv"), Ok(EmotionClass::Happy));
        assert_eq!(emotion_class("S03_12s.csv"), Ok(EmotionClass::Sad));
        assert_eq!(emotion_class("subject-F-run2"), Ok(EmotionClass::Fear));
        assert_eq!(emotion_class("n_n_n.csv"), Ok(EmotionClass::Neutral));
    }

    #[test]
    fn test_emotion_class_from_full_name() {
        assert_eq!(emotion_class("P1_happy.csv"), Ok(EmotionClass::Happy));
        assert_eq!(emotion_class("Sad_P2.csv"), Ok(EmotionClass::Sad));
        assert_eq!(emotion_class("P3-FEAR-open_eyes.csv"), Ok(EmotionClass::Fear));
        assert_eq!(emotion_class("P4 neutral.csv"), Ok(EmotionClass::Neutral));
        // a name and a matching letter agree
        assert_eq!(emotion_class("P5_h_happy.csv"), Ok(EmotionClass::Happy));
        // names inside longer words never count
        assert!(emotion_class("P6_sadness.csv").is_err());
        assert_eq!(
            emotion_class("P7_happy_s.csv"),
            Err(MetadataError::Ambiguous {
                name: "P7_happy_s.csv".to_string(),
                first: EmotionClass::Happy,
                second: EmotionClass::Sad,
            })
        );
    }

    #[test]
    fn test_emotion_class_missing() {
        assert_eq!(
            emotion_class("P1.csv"),
            Err(MetadataError::Missing("P1.csv".to_string()))
        );
        // letters inside words never count
        assert!(emotion_class("session_eyes_closed.csv").is_err());
    }

    #[test]
    fn test_emotion_class_ambiguous() {
        let err = emotion_class("P2_h_s.csv").unwrap_err();
        assert_eq!(
            err,
            MetadataError::Ambiguous {
                name: "P2_h_s.csv".to_string(),
                first: EmotionClass::Happy,
                second: EmotionClass::Sad,
            }
        );
    }

    #[test]
    fn test_participant_id() {
        assert_eq!(
            participant_id(Path::new("data/minor/open eyes/P12_summary.csv")),
            Some("P12".to_string())
        );
        assert_eq!(participant_id(Path::new("data/Pilot/x.csv")), None);
        assert_eq!(
            participant_id(Path::new("P1_exports/severe/P7/psd_summary.csv")),
            Some("P7".to_string())
        );
    }

    #[test]
    fn test_directory_labels() {
        let dir = Path::new("/data/Stroke/Moderate/Close Eyes");
        assert_eq!(eyes_status(dir), Some(EyesStatus::Closed));
        assert_eq!(severity(dir), Some(StrokeSeverity::Moderate));

        assert_eq!(eyes_status(Path::new("out/severe/open_eyes")), Some(EyesStatus::Open));
        assert_eq!(severity(Path::new("/data/healthy")), None);
        assert_eq!(eyes_status(Path::new("/data/healthy")), None);
    }

    #[test]
    fn test_severity_first_keyword_wins() {
        assert_eq!(
            severity(Path::new("severe_cases/minor")),
            Some(StrokeSeverity::Severe)
        );
    }
}
