use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::data;
use crate::error::{Error, Result};
use crate::pos::PosCategory;

/// Maps a word and its part-of-speech category to a dictionary base form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str, pos: PosCategory) -> String;
}

const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const ADJ_RULES: &[(&str, &str)] = &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")];

#[derive(Debug, Default)]
struct PosTables {
    lemmas: HashSet<String>,
    exceptions: HashMap<String, Vec<String>>,
}

impl PosTables {
    /// Known lemmas among `forms`, first occurrence order, without duplicates.
    fn filter(&self, forms: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut seen = HashSet::new();
        forms
            .into_iter()
            .filter(|f| self.lemmas.contains(f) && seen.insert(f.clone()))
            .collect()
    }
}

/// WordNet-style morphological lemmatizer.
///
/// Irregular forms are resolved from the per-category exception lists; regular
/// ones by detaching inflectional suffixes until a known lemma appears.
#[derive(Debug)]
pub struct WordNetLexicon {
    noun: PosTables,
    verb: PosTables,
    adj: PosTables,
    adv: PosTables,
}

impl WordNetLexicon {
    /// The English lexicon compiled into the crate: a few thousand frequent
    /// lemmas and the common irregular forms. Rare words pass through
    /// unchanged; use [`from_dict_dir`](Self::from_dict_dir) for full WordNet.
    pub fn embedded() -> Result<Self> {
        Self::load(|pos| {
            let exc_path = PathBuf::from(format!("<embedded>/{}.exc", pos.wordnet_name()));
            Ok((
                data::wordnet_index(pos).to_string(),
                data::wordnet_exceptions(pos).to_string(),
                exc_path,
            ))
        })
    }

    /// Reads `index.{noun,verb,adj,adv}` and `{noun,verb,adj,adv}.exc` from a WordNet `dict/` directory.
    pub fn from_dict_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "loading wordnet dictionary");
        Self::load(|pos| {
            let index = fs::read_to_string(dir.join(format!("index.{}", pos.wordnet_name())))?;
            let exc_path = dir.join(format!("{}.exc", pos.wordnet_name()));
            let exceptions = fs::read_to_string(&exc_path)?;
            Ok((index, exceptions, exc_path))
        })
    }

    fn load(mut source: impl FnMut(PosCategory) -> Result<(String, String, PathBuf)>) -> Result<Self> {
        let mut table = |pos: PosCategory| -> Result<PosTables> {
            let (index, exceptions, exc_path) = source(pos)?;
            let tables = PosTables {
                lemmas: Self::parse_index(&index),
                exceptions: Self::parse_exceptions(&exceptions, &exc_path)?,
            };
            debug!(
                pos = pos.wordnet_name(),
                lemmas = tables.lemmas.len(),
                exceptions = tables.exceptions.len(),
                "loaded lexicon tables"
            );
            Ok(tables)
        };
        Ok(Self {
            noun: table(PosCategory::Noun)?,
            verb: table(PosCategory::Verb)?,
            adj: table(PosCategory::Adjective)?,
            adv: table(PosCategory::Adverb)?,
        })
    }

    fn parse_index(text: &str) -> HashSet<String> {
        text.lines()
            .filter(|line| !line.starts_with(' '))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect()
    }

    fn parse_exceptions(text: &str, path: &Path) -> Result<HashMap<String, Vec<String>>> {
        let mut exceptions: HashMap<String, Vec<String>> = HashMap::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(inflected), Some(first)) = (fields.next(), fields.next()) else {
                return Err(Error::InvalidDictionary {
                    path: path.to_path_buf(),
                    line: i + 1,
                });
            };
            let bases = exceptions.entry(inflected.to_string()).or_default();
            bases.push(first.to_string());
            bases.extend(fields.map(str::to_string));
        }
        Ok(exceptions)
    }

    fn table(&self, pos: PosCategory) -> &PosTables {
        match pos {
            PosCategory::Noun => &self.noun,
            PosCategory::Verb => &self.verb,
            PosCategory::Adjective => &self.adj,
            PosCategory::Adverb => &self.adv,
        }
    }

    pub fn substitutions(pos: PosCategory) -> &'static [(&'static str, &'static str)] {
        match pos {
            PosCategory::Noun => NOUN_RULES,
            PosCategory::Verb => VERB_RULES,
            PosCategory::Adjective => ADJ_RULES,
            PosCategory::Adverb => &[],
        }
    }

    fn apply_rules(forms: &[String], pos: PosCategory) -> Vec<String> {
        let rules = Self::substitutions(pos);
        forms
            .iter()
            .flat_map(|form| {
                rules.iter().filter_map(move |(old, new)| {
                    form.strip_suffix(old).map(|stem| format!("{}{}", stem, new))
                })
            })
            .collect()
    }

    pub fn is_known(&self, word: &str, pos: PosCategory) -> bool {
        self.table(pos).lemmas.contains(word)
    }

    /// All known base forms of `word` for `pos`, in discovery order.
    pub fn morphy(&self, word: &str, pos: PosCategory) -> Vec<String> {
        let table = self.table(pos);
        if let Some(bases) = table.exceptions.get(word) {
            return table.filter(std::iter::once(word.to_string()).chain(bases.iter().cloned()));
        }

        let mut forms = Self::apply_rules(&[word.to_string()], pos);
        let results = table.filter(std::iter::once(word.to_string()).chain(forms.iter().cloned()));
        if !results.is_empty() {
            return results;
        }
        while !forms.is_empty() {
            forms = Self::apply_rules(&forms, pos);
            let results = table.filter(forms.iter().cloned());
            if !results.is_empty() {
                return results;
            }
        }
        Vec::new()
    }
}

impl Lemmatizer for WordNetLexicon {
    /// Shortest known base form, or `word` itself when none is found.
    fn lemmatize(&self, word: &str, pos: PosCategory) -> String {
        let lemma = self
            .morphy(word, pos)
            .into_iter()
            .min_by_key(|form| form.chars().count())
            .unwrap_or_else(|| word.to_string());
        trace!(word, ?pos, %lemma, "lemmatized");
        lemma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> WordNetLexicon {
        WordNetLexicon::embedded().unwrap()
    }

    #[test]
    fn test_regular_noun_and_verb() {
        let lex = lexicon();
        assert_eq!(lex.lemmatize("cats", PosCategory::Noun), "cat");
        assert_eq!(lex.lemmatize("churches", PosCategory::Noun), "church");
        assert_eq!(lex.lemmatize("flies", PosCategory::Noun), "fly");
        assert_eq!(lex.lemmatize("walked", PosCategory::Verb), "walk");
        assert_eq!(lex.lemmatize("dances", PosCategory::Verb), "dance");
        assert_eq!(lex.lemmatize("smaller", PosCategory::Adjective), "small");
    }

    #[test]
    fn test_everyday_vocabulary() {
        let lex = lexicon();
        assert_eq!(lex.lemmatize("stores", PosCategory::Noun), "store");
        assert_eq!(lex.lemmatize("glasses", PosCategory::Noun), "glass");
        assert_eq!(lex.lemmatize("wolves", PosCategory::Noun), "wolf");
        assert_eq!(lex.lemmatize("barking", PosCategory::Verb), "bark");
        assert_eq!(lex.lemmatize("going", PosCategory::Verb), "go");
        assert_eq!(lex.lemmatize("grabbed", PosCategory::Verb), "grab");
        assert_eq!(lex.lemmatize("swept", PosCategory::Verb), "sweep");
        assert_eq!(lex.lemmatize("larger", PosCategory::Adjective), "large");
        assert_eq!(lex.lemmatize("loudly", PosCategory::Adverb), "loudly");
    }

    #[test]
    fn test_exceptions() {
        let lex = lexicon();
        assert_eq!(lex.lemmatize("are", PosCategory::Verb), "be");
        assert_eq!(lex.lemmatize("running", PosCategory::Verb), "run");
        assert_eq!(lex.lemmatize("children", PosCategory::Noun), "child");
        assert_eq!(lex.lemmatize("bigger", PosCategory::Adjective), "big");
        assert_eq!(lex.lemmatize("better", PosCategory::Adverb), "well");
    }

    #[test]
    fn test_category_changes_result() {
        let lex = lexicon();
        assert_eq!(lex.lemmatize("running", PosCategory::Noun), "running");
        assert_eq!(lex.lemmatize("running", PosCategory::Verb), "run");
    }

    #[test]
    fn test_unknown_and_degenerate_words_pass_through() {
        let lex = lexicon();
        assert_eq!(lex.lemmatize("blorfs", PosCategory::Verb), "blorfs");
        assert_eq!(lex.lemmatize("", PosCategory::Noun), "");
        assert_eq!(lex.lemmatize("quickly", PosCategory::Adverb), "quickly");
        // lookups are case-sensitive
        assert_eq!(lex.lemmatize("Cats", PosCategory::Noun), "Cats");
    }

    #[test]
    fn test_morphy_keeps_known_surface_form() {
        let lex = lexicon();
        assert_eq!(lex.morphy("post", PosCategory::Noun), vec!["post"]);
        assert!(lex.is_known("be", PosCategory::Verb));
        assert!(!lex.is_known("be", PosCategory::Noun));
    }

    #[test]
    fn test_from_dict_dir() {
        let dir = tempfile::tempdir().unwrap();
        for pos in PosCategory::ALL {
            fs::write(dir.path().join(format!("index.{}", pos.wordnet_name())), "  license text\n").unwrap();
            fs::write(dir.path().join(format!("{}.exc", pos.wordnet_name())), "").unwrap();
        }
        fs::write(
            dir.path().join("index.noun"),
            "  1 This software and database is being provided\ngoose n 2 1 @ 2 0 01855672 10136283\n",
        )
        .unwrap();
        fs::write(dir.path().join("noun.exc"), "geese goose\n").unwrap();

        let lex = WordNetLexicon::from_dict_dir(dir.path()).unwrap();
        assert_eq!(lex.lemmatize("geese", PosCategory::Noun), "goose");
        assert!(!lex.is_known("1", PosCategory::Noun));
    }

    #[test]
    fn test_malformed_exception_line() {
        let dir = tempfile::tempdir().unwrap();
        for pos in PosCategory::ALL {
            fs::write(dir.path().join(format!("index.{}", pos.wordnet_name())), "").unwrap();
            fs::write(dir.path().join(format!("{}.exc", pos.wordnet_name())), "").unwrap();
        }
        fs::write(dir.path().join("verb.exc"), "ran run\norphan\n").unwrap();

        match WordNetLexicon::from_dict_dir(dir.path()) {
            Err(Error::InvalidDictionary { path, line }) => {
                assert_eq!(line, 2);
                assert!(path.ends_with("verb.exc"));
            }
            other => panic!("expected InvalidDictionary, got {:?}", other),
        }
    }
}
