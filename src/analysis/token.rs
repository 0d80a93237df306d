//! Tokens flowing through an analysis pipeline.

use std::fmt;

/// One word (or placeholder) cut out of a canonical message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Index of the token in the tokenizer's output, before any filtering.
    pub position: usize,
}

impl Token {
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }

    /// Same position, new text.
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        Token {
            text: text.into(),
            ..self
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lazily evaluated sequence of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Wrap already collected tokens as a stream.
pub fn stream(tokens: Vec<Token>) -> TokenStream {
    Box::new(tokens.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_keeps_position() {
        let token = Token::new("offers", 3).with_text("offer");
        assert_eq!(token, Token::new("offer", 3));
        assert_eq!(token.to_string(), "offer");
    }
}
