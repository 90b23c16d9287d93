use serde::{Deserialize, Serialize};

/// Coarse part-of-speech category understood by the lemmatizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosCategory {
    Adjective,
    Verb,
    Noun,
    Adverb,
}

impl PosCategory {
    pub const ALL: [PosCategory; 4] = [
        PosCategory::Noun,
        PosCategory::Verb,
        PosCategory::Adjective,
        PosCategory::Adverb,
    ];

    /// Maps a Penn Treebank style tag by its first character: `J`, `V`, `N`, `R`.
    ///
    /// Any other first character, or an empty tag, has no category.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.chars().next()? {
            'J' => Some(PosCategory::Adjective),
            'V' => Some(PosCategory::Verb),
            'N' => Some(PosCategory::Noun),
            'R' => Some(PosCategory::Adverb),
            _ => None,
        }
    }

    /// WordNet file suffix, as in `index.noun` or `verb.exc`.
    pub fn wordnet_name(&self) -> &'static str {
        match self {
            PosCategory::Adjective => "adj",
            PosCategory::Verb => "verb",
            PosCategory::Noun => "noun",
            PosCategory::Adverb => "adv",
        }
    }
}
