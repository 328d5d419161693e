//! The closed set of completion backends.

use std::fmt;

/// Which completion backend a synthesis request is routed to.
///
/// The set is closed by design: adding a backend means adding a variant
/// here plus its entries in the request/normalization tables in
/// [`synthesizer`](crate::synthesizer), not a new code path at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI `gpt-4o-mini` via the chat-completions API.
    Gpt4oMini,
    /// Google Gemini via the generateContent API.
    GeminiFlash,
    /// DeepSeek chat (OpenAI-compatible chat completions).
    DeepseekChat,
    /// Anthropic Claude Haiku via the messages API.
    ClaudeHaiku,
}

/// Which tokenizer a provider's token estimate uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerFamily {
    /// `cl100k_base` byte-pair encoding.
    Cl100k,
    /// Whitespace-delimited word count. Directional only, used where no
    /// native tokenizer is available.
    Whitespace,
}

impl Provider {
    /// Every supported backend.
    pub const ALL: [Provider; 4] =
        [Provider::Gpt4oMini, Provider::GeminiFlash, Provider::DeepseekChat, Provider::ClaudeHaiku];

    /// Parse a user-facing provider key.
    ///
    /// Keys are the selection strings the report API accepts, matched
    /// case-insensitively. Unknown keys return `None`; the synthesizer
    /// degrades them to the fixed unrecognized-provider answer.
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "gpt-4o" => Some(Self::Gpt4oMini),
            "gemini flash free" => Some(Self::GeminiFlash),
            "deepseek" | "deepseek chat" => Some(Self::DeepseekChat),
            "claude" | "claude-3" | "claude-3.5 haiku" => Some(Self::ClaudeHaiku),
            _ => None,
        }
    }

    /// The canonical selection key for this backend.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o",
            Self::GeminiFlash => "gemini flash free",
            Self::DeepseekChat => "deepseek",
            Self::ClaudeHaiku => "claude-3.5 haiku",
        }
    }

    /// The wire-level model identifier sent to the backend.
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "gpt-4o-mini-2024-07-18",
            Self::GeminiFlash => "gemini-1.5-pro-latest",
            Self::DeepseekChat => "deepseek-chat",
            Self::ClaudeHaiku => "claude-3-5-haiku-20241022",
        }
    }

    /// The tokenizer family backing this provider's token estimates.
    pub fn tokenizer(&self) -> TokenizerFamily {
        match self {
            Self::Gpt4oMini | Self::DeepseekChat => TokenizerFamily::Cl100k,
            Self::GeminiFlash | Self::ClaudeHaiku => TokenizerFamily::Whitespace,
        }
    }

    /// USD per prompt token, for directional cost estimates.
    pub fn price_per_token(&self) -> f64 {
        match self {
            Self::Gpt4oMini => 0.15 / 1_000_000.0,
            Self::GeminiFlash => 0.0,
            Self::DeepseekChat => 0.07 / 1_000_000.0,
            Self::ClaudeHaiku => 0.80 / 1_000_000.0,
        }
    }

    /// The environment variable holding this backend's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Gpt4oMini => "OPENAI_API_KEY",
            Self::GeminiFlash => "GOOGLE_API_KEY",
            Self::DeepseekChat => "DEEPSEEK_API_KEY",
            Self::ClaudeHaiku => "CLAUDE_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_canonical_key() {
        for provider in Provider::ALL {
            assert_eq!(Provider::parse(provider.key()), Some(provider));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Provider::parse("GPT-4O"), Some(Provider::Gpt4oMini));
        assert_eq!(Provider::parse("Deepseek Chat"), Some(Provider::DeepseekChat));
    }

    #[test]
    fn parse_accepts_claude_aliases() {
        assert_eq!(Provider::parse("claude"), Some(Provider::ClaudeHaiku));
        assert_eq!(Provider::parse("claude-3"), Some(Provider::ClaudeHaiku));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert_eq!(Provider::parse("gpt-5"), None);
        assert_eq!(Provider::parse(""), None);
    }

    #[test]
    fn free_tier_prices_at_zero() {
        assert_eq!(Provider::GeminiFlash.price_per_token(), 0.0);
        assert!(Provider::ClaudeHaiku.price_per_token() > 0.0);
    }
}
