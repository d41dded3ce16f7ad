//! The fixed phrase vocabulary.

use crate::error::SigncapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical label for a recognized sign.
///
/// Variant order is alphabetical so the derived `Ord` is the lexicographic
/// order used for every tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhraseToken {
    Hello,
    Repeat,
    Slow,
    Thanks,
}

impl PhraseToken {
    /// Every token, in tie-break order.
    pub const ALL: [PhraseToken; 4] = [
        PhraseToken::Hello,
        PhraseToken::Repeat,
        PhraseToken::Slow,
        PhraseToken::Thanks,
    ];

    /// Wire and gloss spelling, e.g. `"HELLO"`.
    pub fn as_str(self) -> &'static str {
        match self {
            PhraseToken::Hello => "HELLO",
            PhraseToken::Repeat => "REPEAT",
            PhraseToken::Slow => "SLOW",
            PhraseToken::Thanks => "THANKS",
        }
    }
}

impl fmt::Display for PhraseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhraseToken {
    type Err = SigncapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhraseToken::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SigncapError::UnknownToken {
                token: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut names: Vec<&str> = PhraseToken::ALL.iter().map(|t| t.as_str()).collect();
        let sorted = {
            let mut s = names.clone();
            s.sort();
            s
        };
        assert_eq!(names, sorted);
        names.dedup();
        assert_eq!(names.len(), 4);
        assert!(PhraseToken::Hello < PhraseToken::Thanks);
    }

    #[test]
    fn test_parse_accepts_any_case() {
        assert_eq!("slow".parse::<PhraseToken>().unwrap(), PhraseToken::Slow);
        assert_eq!(" REPEAT ".parse::<PhraseToken>().unwrap(), PhraseToken::Repeat);
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let err = "GOODBYE".parse::<PhraseToken>().unwrap_err();
        assert!(matches!(err, SigncapError::UnknownToken { ref token } if token == "GOODBYE"));
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&PhraseToken::Thanks).unwrap();
        assert_eq!(json, r#""THANKS""#);
        let parsed: PhraseToken = serde_json::from_str(r#""HELLO""#).unwrap();
        assert_eq!(parsed, PhraseToken::Hello);
    }
}
