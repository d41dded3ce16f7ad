//! Fixed caption text per token and style.

use crate::config::CaptionStyle;
use crate::recognition::token::PhraseToken;

/// Template caption for `token` in `style`.
pub fn template(token: PhraseToken, style: CaptionStyle) -> &'static str {
    match (token, style) {
        (PhraseToken::Hello, CaptionStyle::Concise) => "Hello",
        (PhraseToken::Hello, CaptionStyle::Detailed) => "Hello! The signer is greeting you.",
        (PhraseToken::Repeat, CaptionStyle::Concise) => "Repeat?",
        (PhraseToken::Repeat, CaptionStyle::Detailed) => {
            "Could you please repeat that? I didn't quite catch it."
        }
        (PhraseToken::Slow, CaptionStyle::Concise) => "Slower",
        (PhraseToken::Slow, CaptionStyle::Detailed) => {
            "Please go slower. I'm having trouble keeping up."
        }
        (PhraseToken::Thanks, CaptionStyle::Concise) => "Thanks",
        (PhraseToken::Thanks, CaptionStyle::Detailed) => {
            "Thank you for that. I really appreciate it."
        }
    }
}

/// Clarification prompt naming the two nearest candidates.
pub fn clarification(top2: (PhraseToken, PhraseToken)) -> String {
    format!("Unclear - did you mean {} or {}?", top2.0, top2.1)
}

/// Acknowledgement sent back after a user correction.
pub fn correction_ack(correct: PhraseToken) -> String {
    format!("Noted correction: {}", correct)
}
