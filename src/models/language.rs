//! Target language model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::languages;

/// Language a submission is written in and a harness is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Cpp,
    Python,
    JavaScript,
    Java,
}

impl Language {
    /// Every supported target language
    pub const ALL: [Language; 4] = [
        Language::Cpp,
        Language::Python,
        Language::JavaScript,
        Language::Java,
    ];

    /// Canonical identifier (e.g., "cpp", "python")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpp => languages::CPP,
            Self::Python => languages::PYTHON,
            Self::JavaScript => languages::JAVASCRIPT,
            Self::Java => languages::JAVA,
        }
    }

    /// Source file name the sandbox expects for this language
    pub fn source_file(&self) -> &'static str {
        match self {
            Self::Cpp => "main.cpp",
            Self::Python => "main.py",
            Self::JavaScript => "main.js",
            Self::Java => "Main.java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a language name is not supported
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(Self::Cpp),
            "python" | "py" | "python3" => Ok(Self::Python),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("C++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(" Node ".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("java".parse::<Language>().unwrap(), Language::Java);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&Language::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let parsed: Language = serde_json::from_str("\"CPP\"").unwrap();
        assert_eq!(parsed, Language::Cpp);
    }

    #[test]
    fn test_all_matches_constants() {
        let names: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, languages::ALL);
    }
}
