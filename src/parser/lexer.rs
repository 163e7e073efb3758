//! SQL lexer.

use std::iter::Peekable;
use std::mem::take;
use std::str::Chars;

use super::{Error, Token};

/// Lexer.
pub struct Lexer<'a> {
    sql: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self { sql }
    }

    pub fn lex(self) -> Result<Vec<Token>, Error> {
        let mut tokens = vec![];
        let mut buffer = String::new();
        let mut iter = self.sql.chars().peekable();

        while let Some(c) = iter.next() {
            match c {
                '\'' => tokens.push(Token::String(quoted(&mut iter, c)?)),
                '"' | '`' => tokens.push(Token::Entity(quoted(&mut iter, c)?)),

                // -- comment
                '-' if iter.peek() == Some(&'-') => {
                    for c in iter.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }

                /* comment */
                '/' if iter.peek() == Some(&'*') => {
                    let _ = iter.next();
                    let mut star = false;
                    let mut closed = false;
                    for c in iter.by_ref() {
                        if star && c == '/' {
                            closed = true;
                            break;
                        }
                        star = c == '*';
                    }
                    if !closed {
                        return Err(Error::UnterminatedComment);
                    }
                }

                ',' => tokens.push(Token::Comma),
                '.' => tokens.push(Token::Dot),
                '=' => tokens.push(Token::Equals),
                '(' => tokens.push(Token::LeftParen),
                ')' => tokens.push(Token::RightParen),
                ';' => tokens.push(Token::End),

                c if c.is_whitespace() => continue,

                c if c.is_ascii_digit() => {
                    buffer.push(c);
                    while let Some(&next) = iter.peek() {
                        if next.is_ascii_digit() || next == '.' {
                            buffer.push(next);
                            let _ = iter.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push(Token::Number(take(&mut buffer)));
                }

                c if c.is_alphanumeric() || c == '_' || c == '$' => {
                    buffer.push(c);
                    while let Some(&next) = iter.peek() {
                        if next.is_alphanumeric() || next == '_' || next == '$' {
                            buffer.push(next);
                            let _ = iter.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push(Token::Word(take(&mut buffer)));
                }

                c => tokens.push(Token::Symbol(c)),
            }
        }

        Ok(tokens)
    }
}

/// Read until the closing quote. Doubled quotes are escapes.
fn quoted(iter: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, Error> {
    let mut buffer = String::new();

    while let Some(c) = iter.next() {
        if c == quote {
            if iter.peek() == Some(&quote) {
                let _ = iter.next();
                buffer.push(quote);
                continue;
            }

            return Ok(buffer);
        }

        buffer.push(c);
    }

    Err(Error::Unterminated(quote))
}
