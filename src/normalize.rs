use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lexicon::{Lemmatizer, WordNetLexicon};
use crate::pos::PosCategory;
use crate::stemmer::{SnowballStemmer, TokenStemmer};
use crate::tagger::{LexiconTagger, PerceptronTagger, PosTagger};
use crate::token::{join_tokens, split_tokens};

/// Which transform [`Normalizer::normalize`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    None,
    #[default]
    Lemmatize,
    Stem,
}

impl FromStr for NormalizationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(NormalizationMode::None),
            "lemmatize" | "lemma" => Ok(NormalizationMode::Lemmatize),
            "stem" => Ok(NormalizationMode::Stem),
            other => Err(Error::InvalidConfig(format!("unknown normalization mode '{}'", other))),
        }
    }
}

/// Lemmatizes space-separated text and lower-cases the result.
///
/// Tokens are tagged as one sequence. A token whose tag starts with `J`, `V`,
/// `N` or `R` is replaced by its lemma for that category; any other token is
/// kept as is. The token count never changes.
pub fn lemmatize<T, L>(text: &str, tagger: &T, lemmatizer: &L) -> String
where
    T: PosTagger + ?Sized,
    L: Lemmatizer + ?Sized,
{
    let tokens = split_tokens(text);
    let lemmas: Vec<String> = tagger
        .tag(&tokens)
        .into_iter()
        .map(|tagged| match PosCategory::from_tag(&tagged.tag) {
            Some(pos) => lemmatizer.lemmatize(tagged.text, pos),
            None => {
                trace!(token = tagged.text, tag = %tagged.tag, "no category, kept");
                tagged.text.to_string()
            }
        })
        .collect();
    join_tokens(&lemmas).to_lowercase()
}

/// Stems each space-separated token independently. Case is left to the stemmer.
pub fn stem<S>(text: &str, stemmer: &S) -> String
where
    S: TokenStemmer + ?Sized,
{
    let stems: Vec<String> = split_tokens(text).into_iter().map(|token| stemmer.stem(token)).collect();
    join_tokens(&stems)
}

/// Linguistic resources built once and shared by reference across calls and threads.
pub struct Normalizer {
    tagger: Box<dyn PosTagger>,
    lemmatizer: Box<dyn Lemmatizer>,
    stemmer: Box<dyn TokenStemmer>,
    mode: NormalizationMode,
}

impl Normalizer {
    pub fn new(config: &Config) -> Result<Self> {
        let tagger: Box<dyn PosTagger> = match &config.tagger.model_dir {
            Some(dir) => Box::new(PerceptronTagger::from_dir(dir)?),
            None => Box::new(LexiconTagger::embedded()?),
        };
        let lemmatizer = match &config.wordnet.dict_dir {
            Some(dir) => WordNetLexicon::from_dict_dir(dir)?,
            None => {
                warn!("wordnet.dict_dir not set, using the embedded English lexicon");
                WordNetLexicon::embedded()?
            }
        };
        debug!(
            mode = ?config.mode,
            language = %config.language,
            perceptron = config.tagger.model_dir.is_some(),
            wordnet_dir = config.wordnet.dict_dir.is_some(),
            "normalizer ready"
        );
        Ok(Self {
            tagger,
            lemmatizer: Box::new(lemmatizer),
            stemmer: Box::new(SnowballStemmer::new(config.language)),
            mode: config.mode,
        })
    }

    /// Embedded English resources, lemmatize mode.
    pub fn english() -> Result<Self> {
        Self::new(&Config::default())
    }

    pub fn from_parts(
        tagger: Box<dyn PosTagger>,
        lemmatizer: Box<dyn Lemmatizer>,
        stemmer: Box<dyn TokenStemmer>,
        mode: NormalizationMode,
    ) -> Self {
        Self {
            tagger,
            lemmatizer,
            stemmer,
            mode,
        }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    pub fn lemmatize(&self, text: &str) -> String {
        lemmatize(text, self.tagger.as_ref(), self.lemmatizer.as_ref())
    }

    pub fn stem(&self, text: &str) -> String {
        stem(text, self.stemmer.as_ref())
    }

    pub fn normalize(&self, text: &str) -> String {
        match self.mode {
            NormalizationMode::None => text.to_string(),
            NormalizationMode::Lemmatize => self.lemmatize(text),
            NormalizationMode::Stem => self.stem(text),
        }
    }

    pub fn normalize_all<'a, I>(&self, documents: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        documents.into_iter().map(|doc| self.normalize(doc)).collect()
    }
}
