use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::language::Language;
use crate::normalize::NormalizationMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Directory holding `weights.json`, `tagdict.json` and `classes.json`.
    /// The embedded lexicon tagger is used when unset.
    pub model_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordNetConfig {
    /// A WordNet `dict/` directory. The embedded seed lexicon is used when unset.
    pub dict_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: NormalizationMode,
    /// Stemming language; lemmatization is English only.
    pub language: Language,
    pub tagger: TaggerConfig,
    pub wordnet: WordNetConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults with `POSTNORM_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(mode) = var("POSTNORM_MODE") {
            self.mode = mode.parse()?;
        }
        if let Some(language) = var("POSTNORM_LANGUAGE") {
            self.language = language.parse()?;
        }
        if let Some(dir) = var("POSTNORM_TAGGER_DIR") {
            self.tagger.model_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = var("POSTNORM_WORDNET_DIR") {
            self.wordnet.dict_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, NormalizationMode::Lemmatize);
        assert_eq!(config.language, Language::English);
        assert!(config.tagger.model_dir.is_none());
        assert!(config.wordnet.dict_dir.is_none());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postnorm.json");
        fs::write(&path, r#"{"mode": "stem", "wordnet": {"dict_dir": "/usr/share/wordnet"}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mode, NormalizationMode::Stem);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.wordnet.dict_dir, Some(PathBuf::from("/usr/share/wordnet")));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("POSTNORM_MODE", "none"),
            ("POSTNORM_LANGUAGE", "german"),
            ("POSTNORM_TAGGER_DIR", "/models/tagger"),
        ]);
        let config = Config::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.mode, NormalizationMode::None);
        assert_eq!(config.language, Language::German);
        assert_eq!(config.tagger.model_dir, Some(PathBuf::from("/models/tagger")));
        assert!(config.wordnet.dict_dir.is_none());
    }

    #[test]
    fn test_invalid_override() {
        let result = Config::default().with_overrides(|key| (key == "POSTNORM_MODE").then(|| "shout".to_string()));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
