use std::collections::HashMap;
use serde_json;
use crate::error::Result;
use crate::pos::PosCategory;

pub fn load_tagdict() -> Result<HashMap<String, String>> {
    let data = include_str!("resources/tagger/tagdict.json");
    Ok(serde_json::from_str(data)?)
}

/// Embedded lemma index for `pos`, in WordNet `index.*` layout.
pub fn wordnet_index(pos: PosCategory) -> &'static str {
    match pos {
        PosCategory::Noun => include_str!("resources/wordnet/index.noun"),
        PosCategory::Verb => include_str!("resources/wordnet/index.verb"),
        PosCategory::Adjective => include_str!("resources/wordnet/index.adj"),
        PosCategory::Adverb => include_str!("resources/wordnet/index.adv"),
    }
}

/// Embedded exception list for `pos`, in WordNet `*.exc` layout.
pub fn wordnet_exceptions(pos: PosCategory) -> &'static str {
    match pos {
        PosCategory::Noun => include_str!("resources/wordnet/noun.exc"),
        PosCategory::Verb => include_str!("resources/wordnet/verb.exc"),
        PosCategory::Adjective => include_str!("resources/wordnet/adj.exc"),
        PosCategory::Adverb => include_str!("resources/wordnet/adv.exc"),
    }
}
