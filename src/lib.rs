pub mod error;
pub mod token;
pub mod pos;
pub mod data;
pub mod tagger;
pub mod lexicon;
pub mod language;
pub mod stemmer;
pub mod normalize;
pub mod config;
pub mod metrics;
pub mod heatmap;
pub mod evaluation;

pub use config::Config;
pub use error::{Error, Result};
pub use language::Language;
pub use lexicon::{Lemmatizer, WordNetLexicon};
pub use normalize::{NormalizationMode, Normalizer, lemmatize, stem};
pub use pos::PosCategory;
pub use stemmer::{SnowballStemmer, TokenStemmer};
pub use tagger::{LexiconTagger, PerceptronTagger, PosTagger};
pub use token::TaggedToken;
