//! Lexer for the expression text syntax.

use crate::error::IdentifyError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    P,
    E,
    Do,
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Comma,
    Semicolon,
    Star,
    Slash,
}

pub struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            chars: input.chars().peekable(),
            pos: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, IdentifyError> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '(' => {
                    self.bump();
                    tokens.push(Token::LParen);
                }
                ')' => {
                    self.bump();
                    tokens.push(Token::RParen);
                }
                '[' => {
                    self.bump();
                    tokens.push(Token::LBracket);
                }
                ']' => {
                    self.bump();
                    tokens.push(Token::RBracket);
                }
                '|' => {
                    self.bump();
                    tokens.push(Token::Pipe);
                }
                ',' => {
                    self.bump();
                    tokens.push(Token::Comma);
                }
                ';' => {
                    self.bump();
                    tokens.push(Token::Semicolon);
                }
                '*' => {
                    self.bump();
                    tokens.push(Token::Star);
                }
                '/' => {
                    self.bump();
                    tokens.push(Token::Slash);
                }
                c if c.is_ascii_alphabetic() => {
                    let word = self.bump_word();
                    tokens.push(match word.as_str() {
                        "P" => Token::P,
                        "E" => Token::E,
                        "do" => Token::Do,
                        _ => Token::Ident(word),
                    });
                }
                other => {
                    return Err(IdentifyError::ParseError {
                        position: self.pos,
                        message: format!("unexpected character '{other}'"),
                    });
                }
            }
        }
        Ok(tokens)
    }

    /// Consume a maximal run of `[A-Za-z0-9_]` starting at an alphabetic
    /// character, leaving case and further validation to
    /// [`crate::variable::Variable::new`].
    fn bump_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_p_atom() {
        let tokens = Tokenizer::new("P(Y|do(X),Z)").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::P,
                Token::LParen,
                Token::Ident("Y".to_string()),
                Token::Pipe,
                Token::Do,
                Token::LParen,
                Token::Ident("X".to_string()),
                Token::RParen,
                Token::Comma,
                Token::Ident("Z".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(Tokenizer::new("P(Y#)").tokenize().is_err());
    }
}
