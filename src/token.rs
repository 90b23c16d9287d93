use serde::Serialize;

/// A token paired with the tag a [`PosTagger`](crate::tagger::PosTagger) assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedToken<'a> {
    pub text: &'a str,
    pub tag: String,
    pub conf: f32,
}

impl<'a> TaggedToken<'a> {
    pub fn new(text: &'a str, tag: impl Into<String>, conf: f32) -> Self {
        Self {
            text,
            tag: tag.into(),
            conf,
        }
    }
}

/// Splits on single space characters.
///
/// No trimming or collapsing: `""` yields one empty token and `"a  b"` yields
/// `["a", "", "b"]`, so the token count always matches the number of separators plus one.
pub fn split_tokens(text: &str) -> Vec<&str> {
    text.split(' ').collect()
}

pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.as_ref().len() + 1).sum());
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_empty_tokens() {
        assert_eq!(split_tokens(""), vec![""]);
        assert_eq!(split_tokens("a  b"), vec!["a", "", "b"]);
        assert_eq!(split_tokens(" a "), vec!["", "a", ""]);
    }

    #[test]
    fn test_split_only_on_space() {
        assert_eq!(split_tokens("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn test_join_is_inverse_of_split() {
        for text in ["", "a", "The cats are running", " x  y "] {
            assert_eq!(join_tokens(&split_tokens(text)), text);
        }
    }
}
