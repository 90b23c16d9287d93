use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::data;
use crate::error::{Error, Result};
use crate::token::TaggedToken;

/// Assigns one Penn Treebank style tag per token, in input order.
///
/// The whole sequence is passed at once so implementations may use context.
pub trait PosTagger: Send + Sync {
    fn tag<'a>(&self, tokens: &[&'a str]) -> Vec<TaggedToken<'a>>;
}

const START: [&str; 2] = ["-START-", "-START2-"];
const END: [&str; 2] = ["-END-", "-END2-"];

#[derive(Debug, Serialize, Deserialize)]
pub struct AveragedPerceptron {
    feature_weights: HashMap<String, HashMap<String, f32>>,
    classes: Vec<String>,
}

impl AveragedPerceptron {
    pub fn new(feature_weights: HashMap<String, HashMap<String, f32>>, classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::InvalidModel("class list is empty".to_string()));
        }
        Ok(Self { feature_weights, classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Highest scoring class; ties go to the lexically larger class name.
    /// `None` only for a model without classes.
    pub fn predict(&self, word_features: &HashMap<String, usize>) -> Option<(&str, f32)> {
        let mut scores: HashMap<&str, f32> = HashMap::new();
        for (feature, &value) in word_features {
            if value == 0 {
                continue;
            }
            if let Some(weights) = self.feature_weights.get(feature) {
                for (label, weight) in weights {
                    *scores.entry(label.as_str()).or_insert(0.0) += weight * value as f32;
                }
            }
        }

        let mut best: Option<(&str, f32)> = None;
        for class in &self.classes {
            let score = scores.get(class.as_str()).copied().unwrap_or(0.0);
            match best {
                Some((label, top)) if score < top || (score == top && class.as_str() <= label) => {}
                _ => best = Some((class.as_str(), score)),
            }
        }
        best
    }
}

pub struct PerceptronTagger {
    model: AveragedPerceptron,
    tags: HashMap<String, String>,
}

impl PerceptronTagger {
    pub fn new(model: AveragedPerceptron, tags: HashMap<String, String>) -> Self {
        Self { model, tags }
    }

    /// Builds a tagger from the three JSON documents of a trained model:
    /// feature weights, the unambiguous-word tag dictionary and the class list.
    pub fn from_json(weights_json: &str, tagdict_json: &str, classes_json: &str) -> Result<Self> {
        let feature_weights: HashMap<String, HashMap<String, f32>> = serde_json::from_str(weights_json)?;
        let tags: HashMap<String, String> = serde_json::from_str(tagdict_json)?;
        let classes: Vec<String> = serde_json::from_str(classes_json)?;
        debug!(
            features = feature_weights.len(),
            tagdict = tags.len(),
            classes = classes.len(),
            "loaded perceptron tagger"
        );
        Ok(Self::new(AveragedPerceptron::new(feature_weights, classes)?, tags))
    }

    /// Loads `weights.json`, `tagdict.json` and `classes.json` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "loading perceptron tagger model");
        let weights_json = fs::read_to_string(dir.join("weights.json"))?;
        let tagdict_json = fs::read_to_string(dir.join("tagdict.json"))?;
        let classes_json = fs::read_to_string(dir.join("classes.json"))?;
        Self::from_json(&weights_json, &tagdict_json, &classes_json)
    }

    fn normalize(word: &str) -> String {
        if word.contains('-') && !word.starts_with('-') {
            "!HYPHEN".to_string()
        } else if word.len() == 4 && word.bytes().all(|b| b.is_ascii_digit()) {
            "!YEAR".to_string()
        } else if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            "!DIGITS".to_string()
        } else {
            word.to_lowercase()
        }
    }

    fn suffix(word: &str) -> String {
        let skip = word.chars().count().saturating_sub(3);
        word.chars().skip(skip).collect()
    }

    fn get_features(i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> HashMap<String, usize> {
        let mut features = HashMap::new();
        let mut add = |name: String| *features.entry(name).or_insert(0) += 1;

        add("bias".to_string());
        add(format!("i suffix {}", Self::suffix(word)));
        add(format!("i pref1 {}", word.chars().next().map(String::from).unwrap_or_default()));
        add(format!("i-1 tag {}", prev));
        add(format!("i-2 tag {}", prev2));
        add(format!("i tag+i-2 tag {} {}", prev, prev2));
        add(format!("i word {}", context[i]));
        add(format!("i-1 tag+i word {} {}", prev, context[i]));
        add(format!("i-1 word {}", context[i - 1]));
        add(format!("i-1 suffix {}", Self::suffix(&context[i - 1])));
        add(format!("i-2 word {}", context[i - 2]));
        add(format!("i+1 word {}", context[i + 1]));
        add(format!("i+1 suffix {}", Self::suffix(&context[i + 1])));
        add(format!("i+2 word {}", context[i + 2]));

        features
    }
}

impl PosTagger for PerceptronTagger {
    fn tag<'a>(&self, words: &[&'a str]) -> Vec<TaggedToken<'a>> {
        let mut context: Vec<String> = Vec::with_capacity(words.len() + 4);
        context.extend(START.iter().map(|s| s.to_string()));
        context.extend(words.iter().map(|w| Self::normalize(w)));
        context.extend(END.iter().map(|s| s.to_string()));

        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        let mut output = Vec::with_capacity(words.len());

        for (i, &word) in words.iter().enumerate() {
            let (tag, conf) = match self.tags.get(word) {
                Some(tag) => (tag.clone(), 1.0),
                None => {
                    let features = Self::get_features(i + START.len(), word, &context, &prev, &prev2);
                    match self.model.predict(&features) {
                        Some((tag, conf)) => (tag.to_string(), conf),
                        None => ("NN".to_string(), 0.0),
                    }
                }
            };
            prev2 = std::mem::replace(&mut prev, tag.clone());
            output.push(TaggedToken::new(word, tag, conf));
        }
        output
    }
}

const BE_HAVE: &[&str] = &[
    "be", "been", "being", "is", "am", "are", "was", "were", "'s", "'re", "'m",
    "have", "has", "had", "having", "'ve", "'d",
];
const THIRD_PERSON: &[&str] = &["he", "she", "it"];
const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "able", "ible", "ive", "less", "ical", "ish", "ary"];

/// Dictionary and suffix-rule tagger backed by data compiled into the crate.
///
/// Closed-class and frequent words come from the embedded tag dictionary; every
/// other word is tagged from its shape, suffix and the tag to its left.
pub struct LexiconTagger {
    tags: HashMap<String, String>,
    number: Regex,
}

impl LexiconTagger {
    pub fn new(tags: HashMap<String, String>) -> Result<Self> {
        let number = Regex::new(r"^[+-]?\d+(?:[.,:/]\d+)*%?$")?;
        Ok(Self { tags, number })
    }

    pub fn embedded() -> Result<Self> {
        Self::new(data::load_tagdict()?)
    }

    fn lookup(&self, word: &str) -> Option<&str> {
        self.tags
            .get(word)
            .or_else(|| self.tags.get(&word.to_lowercase()))
            .map(String::as_str)
    }

    fn guess(&self, i: usize, word: &str, prev_word: &str, prev_tag: &str) -> &'static str {
        let lower = word.to_lowercase();
        let len = lower.chars().count();

        if word.is_empty() {
            return "NN";
        }
        if self.number.is_match(word) {
            return "CD";
        }
        if !word.chars().any(char::is_alphanumeric) {
            return "SYM";
        }
        if prev_tag == "TO" || prev_tag == "MD" {
            return "VB";
        }
        if len > 4 && lower.ends_with("ing") {
            return "VBG";
        }
        if len > 3 && lower.ends_with("ed") {
            let prev_lower = prev_word.to_lowercase();
            return if BE_HAVE.contains(&prev_lower.as_str()) { "VBN" } else { "VBD" };
        }
        if len > 3 && lower.ends_with("ly") {
            return "RB";
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| len > s.len() + 1 && lower.ends_with(s)) {
            return "JJ";
        }
        if i > 0 && word.chars().next().is_some_and(char::is_uppercase) {
            return "NNP";
        }
        if prev_tag == "PRP" {
            let prev_lower = prev_word.to_lowercase();
            return if THIRD_PERSON.contains(&prev_lower.as_str()) && lower.ends_with('s') {
                "VBZ"
            } else {
                "VBP"
            };
        }
        if len > 2 && lower.ends_with('s') && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
            return "NNS";
        }
        "NN"
    }
}

impl PosTagger for LexiconTagger {
    fn tag<'a>(&self, words: &[&'a str]) -> Vec<TaggedToken<'a>> {
        let mut output: Vec<TaggedToken<'a>> = Vec::with_capacity(words.len());
        for (i, &word) in words.iter().enumerate() {
            let (prev_word, prev_tag) = match output.last() {
                Some(prev) => (prev.text, prev.tag.as_str()),
                None => ("", START[0]),
            };
            let token = match self.lookup(word) {
                Some(tag) => TaggedToken::new(word, tag, 1.0),
                None => TaggedToken::new(word, self.guess(i, word, prev_word, prev_tag), 0.5),
            };
            output.push(token);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_of(tagger: &impl PosTagger, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split(' ').collect();
        tagger.tag(&words).into_iter().map(|t| t.tag).collect()
    }

    #[test]
    fn test_lexicon_tagger_sentence() {
        let tagger = LexiconTagger::embedded().unwrap();
        assert_eq!(tags_of(&tagger, "The cats are running"), vec!["DT", "NNS", "VBP", "VBG"]);
    }

    #[test]
    fn test_lexicon_tagger_preserves_order_and_length() {
        let tagger = LexiconTagger::embedded().unwrap();
        let words = ["she", "", "quickly", "walked", "2024", "!!", "Paris"];
        let tagged = tagger.tag(&words);
        assert_eq!(tagged.len(), words.len());
        for (t, w) in tagged.iter().zip(words.iter()) {
            assert_eq!(t.text, *w);
        }
        let tags: Vec<&str> = tagged.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["PRP", "NN", "RB", "VBD", "CD", "SYM", "NNP"]);
    }

    #[test]
    fn test_lexicon_tagger_context_rules() {
        let tagger = LexiconTagger::embedded().unwrap();
        assert_eq!(tags_of(&tagger, "we want to dance"), vec!["PRP", "VBP", "TO", "VB"]);
        assert_eq!(tags_of(&tagger, "it has ended"), vec!["PRP", "VBZ", "VBN"]);
        assert_eq!(tags_of(&tagger, "he jumps"), vec!["PRP", "VBZ"]);
        assert_eq!(tags_of(&tagger, "a joyful dog"), vec!["DT", "JJ", "NN"]);
    }

    #[test]
    fn test_lexicon_tagger_capitalisation_is_checked_after_suffixes() {
        let tagger = LexiconTagger::embedded().unwrap();
        assert_eq!(tags_of(&tagger, "we want to Dance"), vec!["PRP", "VBP", "TO", "VB"]);
        assert_eq!(tags_of(&tagger, "the Running"), vec!["DT", "VBG"]);
        assert_eq!(tags_of(&tagger, "the Wonderful"), vec!["DT", "JJ"]);
        assert_eq!(tags_of(&tagger, "the Ganges"), vec!["DT", "NNP"]);
    }

    #[test]
    fn test_lexicon_tagger_vbz_only_after_third_person() {
        let tagger = LexiconTagger::embedded().unwrap();
        assert_eq!(tags_of(&tagger, "they runs"), vec!["PRP", "VBP"]);
        assert_eq!(tags_of(&tagger, "she runs"), vec!["PRP", "VBZ"]);
        assert_eq!(tags_of(&tagger, "she run"), vec!["PRP", "VBP"]);
    }

    fn toy_model() -> PerceptronTagger {
        let weights = r#"{
            "i suffix ing": {"VBG": 2.0, "NN": 0.5},
            "i-1 tag DT": {"NN": 1.5, "JJ": 0.5},
            "bias": {"NN": 0.1}
        }"#;
        let tagdict = r#"{"the": "DT", "The": "DT"}"#;
        let classes = r#"["DT", "JJ", "NN", "VBG"]"#;
        PerceptronTagger::from_json(weights, tagdict, classes).unwrap()
    }

    #[test]
    fn test_perceptron_tagdict_and_model() {
        let tagger = toy_model();
        let tagged = tagger.tag(&["The", "dog", "running"]);
        assert_eq!(tagged[0].tag, "DT");
        assert_eq!(tagged[0].conf, 1.0);
        assert_eq!(tagged[1].tag, "NN");
        assert_eq!(tagged[2].tag, "VBG");
    }

    #[test]
    fn test_perceptron_tie_prefers_larger_class() {
        let model = AveragedPerceptron::new(HashMap::new(), vec!["NN".into(), "VB".into(), "JJ".into()]).unwrap();
        let (tag, score) = model.predict(&HashMap::from([("bias".to_string(), 1)])).unwrap();
        assert_eq!(tag, "VB");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_perceptron_without_classes_falls_back_to_noun() {
        let model = AveragedPerceptron {
            feature_weights: HashMap::new(),
            classes: vec![],
        };
        assert!(model.predict(&HashMap::from([("bias".to_string(), 1)])).is_none());

        let tagger = PerceptronTagger::new(model, HashMap::new());
        let tagged = tagger.tag(&["x", "y"]);
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|t| t.tag == "NN"));
    }

    #[test]
    fn test_perceptron_rejects_empty_classes() {
        let result = PerceptronTagger::from_json("{}", "{}", "[]");
        assert!(matches!(result, Err(Error::InvalidModel(_))));
    }

    #[test]
    fn test_perceptron_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("weights.json"), r#"{"bias": {"NN": 1.0}}"#).unwrap();
        fs::write(dir.path().join("tagdict.json"), r#"{"a": "DT"}"#).unwrap();
        fs::write(dir.path().join("classes.json"), r#"["DT", "NN"]"#).unwrap();
        let tagger = PerceptronTagger::from_dir(dir.path()).unwrap();
        assert_eq!(tagger.model.classes(), ["DT", "NN"]);
        assert_eq!(tags_of(&tagger, "a thing"), vec!["DT", "NN"]);
    }

    #[test]
    fn test_context_normalization() {
        assert_eq!(PerceptronTagger::normalize("well-known"), "!HYPHEN");
        assert_eq!(PerceptronTagger::normalize("-x"), "-x");
        assert_eq!(PerceptronTagger::normalize("1999"), "!YEAR");
        assert_eq!(PerceptronTagger::normalize("42nd"), "!DIGITS");
        assert_eq!(PerceptronTagger::normalize("Cats"), "cats");
    }
}
