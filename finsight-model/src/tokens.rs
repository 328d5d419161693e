//! Provider-aware token counting.

use tiktoken_rs::CoreBPE;

use crate::error::{ModelError, Result};
use crate::provider::TokenizerFamily;

/// Counts prompt tokens under a provider's tokenizer family.
///
/// The byte-pair encoder is built once (the rank tables are embedded in
/// the binary) and shared by every count. Whitespace counting stands in
/// for providers whose native tokenizer is not available locally; the
/// resulting estimates are directional, not billing-accurate.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Build a counter with the `cl100k_base` encoding loaded.
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| ModelError::TokenizerError(format!("failed to load cl100k_base: {e}")))?;
        Ok(Self { bpe })
    }

    /// Count the tokens `text` occupies under the given family.
    pub fn count(&self, text: &str, family: TokenizerFamily) -> usize {
        match family {
            TokenizerFamily::Cl100k => self.bpe.encode_with_special_tokens(text).len(),
            TokenizerFamily::Whitespace => text.split_whitespace().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_family_counts_words() {
        let counter = TokenCounter::new().unwrap();
        assert_eq!(counter.count("three short words", TokenizerFamily::Whitespace), 3);
        assert_eq!(counter.count("", TokenizerFamily::Whitespace), 0);
        assert_eq!(counter.count("  padded   input ", TokenizerFamily::Whitespace), 2);
    }

    #[test]
    fn bpe_family_counts_subword_tokens() {
        let counter = TokenCounter::new().unwrap();
        // BPE splits below word granularity, so token count is at least
        // the word count for ordinary prose.
        let text = "Quarterly revenue grew substantially year over year.";
        let words = counter.count(text, TokenizerFamily::Whitespace);
        let tokens = counter.count(text, TokenizerFamily::Cl100k);
        assert!(tokens >= words, "expected {tokens} >= {words}");
        assert_eq!(counter.count("", TokenizerFamily::Cl100k), 0);
    }
}
