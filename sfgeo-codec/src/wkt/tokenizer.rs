use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CodecError;

lazy_static! {
    static ref NUMBER: Regex =
        Regex::new(r"^[-+]?(\d+(\.\d*)?|\.\d+)(e[-+]?\d+)?").expect("number pattern is valid");
    static ref WORD: Regex = Regex::new(r"^[a-z]+").expect("word pattern is valid");
}

/// Lexical unit of WKT text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'a> {
    Number(f64),
    Word(&'a str),
    Comma,
    Begin,
    End,
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Word(v) => write!(f, "{v}"),
            Token::Comma => write!(f, ","),
            Token::Begin => write!(f, "("),
            Token::End => write!(f, ")"),
        }
    }
}

/// Splits lower-cased WKT text into tokens. Square brackets are equivalent to parentheses.
pub(crate) struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn take(&mut self, len: usize) -> &'a str {
        let (token, rest) = self.rest.split_at(len);
        self.rest = rest;
        token
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rest = self.rest.trim_start();
        let first = self.rest.chars().next()?;

        let token = match first {
            '(' | '[' => {
                self.take(1);
                Token::Begin
            }
            ')' | ']' => {
                self.take(1);
                Token::End
            }
            ',' => {
                self.take(1);
                Token::Comma
            }
            'a'..='z' => {
                let len = WORD.find(self.rest).map_or(1, |m| m.end());
                Token::Word(self.take(len))
            }
            _ => match NUMBER.find(self.rest) {
                Some(m) => {
                    let text = self.take(m.end());
                    match text.parse() {
                        Ok(v) => Token::Number(v),
                        Err(_) => {
                            return Some(Err(CodecError::parse(format!("Bad number: {text}"))));
                        }
                    }
                }
                None => {
                    let bad = self.rest.chars().take(16).collect::<String>();
                    self.rest = "";
                    return Some(Err(CodecError::parse(format!("Bad token: {bad}"))));
                }
            },
        };

        Some(Ok(token))
    }
}
