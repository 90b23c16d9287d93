use rust_stemmers::Stemmer;
use std::fmt;

use crate::language::Language;

/// Rule-based reduction of a single token, with no part-of-speech context.
pub trait TokenStemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Snowball stemmer; English uses the Porter2 rules.
///
/// Tokens are stemmed as given. Suffix rules only match lower-case text, so
/// capitalised prefixes survive and all-caps tokens come back unchanged.
pub struct SnowballStemmer {
    language: Language,
    inner: Stemmer,
}

impl SnowballStemmer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            inner: Stemmer::create(language.algorithm()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer").field("language", &self.language).finish()
    }
}

impl TokenStemmer for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}
