//! SQL tokens.

/// SQL token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword or unquoted identifier, as written.
    Word(String),
    /// "users" or `users`
    Entity(String),
    /// 'users'
    String(String),
    /// 5, 5.5
    Number(String),
    /// ,
    Comma,
    /// .
    Dot,
    /// =
    Equals,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ;
    End,
    /// Any other symbol.
    Symbol(char),
}

impl Token {
    /// Unquoted word matching this keyword, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(word) if word.eq_ignore_ascii_case(keyword))
    }
}
