//! Tokenizer for the expression language.

use crate::error::{ExprError, Result};

/// Lexer token produced from expression source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Number(&'a str),
    Str(String),
    Ident(&'a str),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Question,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

impl Token<'_> {
    /// Source-like rendering for diagnostics.
    pub(crate) fn describe(&self) -> String {
        let s = match self {
            Token::Number(raw) | Token::Ident(raw) => return (*raw).to_string(),
            Token::Str(s) => return format!("\"{s}\""),
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Semicolon => ";",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::EqEqEq => "===",
            Token::NotEqEq => "!==",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Eof => "end of input",
        };
        s.to_string()
    }
}

/// Token paired with its byte offset.
#[derive(Debug, Clone)]
pub(crate) struct SpannedToken<'a> {
    pub token: Token<'a>,
    pub position: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) const fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    pub(crate) fn lex(mut self) -> Result<Vec<SpannedToken<'a>>> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while let Some(&ch) = bytes.get(self.offset) {
            let start = self.offset;
            let token = match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                    continue;
                }
                b'(' => self.single(Token::LParen),
                b')' => self.single(Token::RParen),
                b'[' => self.single(Token::LBracket),
                b']' => self.single(Token::RBracket),
                b'{' => self.single(Token::LBrace),
                b'}' => self.single(Token::RBrace),
                b',' => self.single(Token::Comma),
                b':' => self.single(Token::Colon),
                b'?' => self.single(Token::Question),
                b';' => self.single(Token::Semicolon),
                b'+' => self.single(Token::Plus),
                b'-' => self.single(Token::Minus),
                b'*' => self.single(Token::Star),
                b'/' => self.single(Token::Slash),
                b'%' => self.single(Token::Percent),
                b'.' if matches!(bytes.get(self.offset + 1), Some(b) if b.is_ascii_digit()) => {
                    self.number(bytes)?
                }
                b'.' => self.single(Token::Dot),
                b'!' => {
                    if self.rest().starts_with("!==") {
                        self.multi(Token::NotEqEq, 3)
                    } else if self.rest().starts_with("!=") {
                        self.multi(Token::NotEq, 2)
                    } else {
                        self.single(Token::Bang)
                    }
                }
                b'=' => {
                    if self.rest().starts_with("===") {
                        self.multi(Token::EqEqEq, 3)
                    } else if self.rest().starts_with("==") {
                        self.multi(Token::EqEq, 2)
                    } else {
                        return Err(self.unexpected("`==` or `===`"));
                    }
                }
                b'<' => {
                    if self.rest().starts_with("<=") {
                        self.multi(Token::Le, 2)
                    } else {
                        self.single(Token::Lt)
                    }
                }
                b'>' => {
                    if self.rest().starts_with(">=") {
                        self.multi(Token::Ge, 2)
                    } else {
                        self.single(Token::Gt)
                    }
                }
                b'&' => {
                    if self.rest().starts_with("&&") {
                        self.multi(Token::AndAnd, 2)
                    } else {
                        return Err(self.unexpected("`&&`"));
                    }
                }
                b'|' => {
                    if self.rest().starts_with("||") {
                        self.multi(Token::OrOr, 2)
                    } else {
                        return Err(self.unexpected("`||`"));
                    }
                }
                b'"' | b'\'' => Token::Str(self.string(ch)?),
                b'0'..=b'9' => self.number(bytes)?,
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                    self.consume_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
                    Token::Ident(&self.input[start..self.offset])
                }
                _ => return Err(self.unexpected("an expression")),
            };
            tokens.push(SpannedToken {
                token,
                position: start,
            });
        }

        if tokens.is_empty() {
            return Err(ExprError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn single(&mut self, token: Token<'a>) -> Token<'a> {
        self.offset += 1;
        token
    }

    fn multi(&mut self, token: Token<'a>, len: usize) -> Token<'a> {
        self.offset += len;
        token
    }

    fn unexpected(&self, expected: &'static str) -> ExprError {
        let found = self.rest().chars().next().map(String::from).unwrap_or_default();
        ExprError::UnexpectedToken {
            expected,
            found,
            position: self.offset,
        }
    }

    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Digits, optional fraction, optional exponent.
    fn number(&mut self, bytes: &[u8]) -> Result<Token<'a>> {
        let start = self.offset;
        self.consume_while(bytes, |b| b.is_ascii_digit());
        if bytes.get(self.offset) == Some(&b'.') {
            self.offset += 1;
            self.consume_while(bytes, |b| b.is_ascii_digit());
        }
        if matches!(bytes.get(self.offset), Some(b'e' | b'E')) {
            self.offset += 1;
            if matches!(bytes.get(self.offset), Some(b'+' | b'-')) {
                self.offset += 1;
            }
            let exp_start = self.offset;
            self.consume_while(bytes, |b| b.is_ascii_digit());
            if exp_start == self.offset {
                return Err(ExprError::InvalidNumber {
                    raw: self.input[start..self.offset].to_string(),
                    position: start,
                });
            }
        }
        Ok(Token::Number(&self.input[start..self.offset]))
    }

    /// Quoted string with JSON escapes. Either quote style may delimit.
    fn string(&mut self, quote: u8) -> Result<String> {
        let start = self.offset;
        self.offset += 1;
        let mut out = String::new();

        loop {
            let Some(c) = self.rest().chars().next() else {
                return Err(ExprError::UnterminatedString { position: start });
            };
            let escape_at = self.offset;
            self.offset += c.len_utf8();
            if c == char::from(quote) {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(esc) = self.rest().chars().next() else {
                return Err(ExprError::UnterminatedString { position: start });
            };
            self.offset += esc.len_utf8();
            match esc {
                '"' => out.push('"'),
                '\'' => out.push('\''),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000c}'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => out.push(self.unicode_escape(escape_at)?),
                _ => return Err(ExprError::InvalidEscape { position: escape_at }),
            }
        }
    }

    fn hex4(&mut self, escape_at: usize) -> Result<u32> {
        let digits = self
            .input
            .get(self.offset..self.offset + 4)
            .ok_or(ExprError::InvalidEscape { position: escape_at })?;
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| ExprError::InvalidEscape { position: escape_at })?;
        self.offset += 4;
        Ok(code)
    }

    fn unicode_escape(&mut self, escape_at: usize) -> Result<char> {
        let high = self.hex4(escape_at)?;
        if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
            self.offset += 2;
            let low = self.hex4(escape_at)?;
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF);
            return char::from_u32(combined).ok_or(ExprError::InvalidEscape { position: escape_at });
        }
        char::from_u32(high).ok_or(ExprError::InvalidEscape { position: escape_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn lexes_operators() {
        assert_eq!(
            kinds("a === b !== c && d || !e <= 1"),
            vec![
                Token::Ident("a"),
                Token::EqEqEq,
                Token::Ident("b"),
                Token::NotEqEq,
                Token::Ident("c"),
                Token::AndAnd,
                Token::Ident("d"),
                Token::OrOr,
                Token::Bang,
                Token::Ident("e"),
                Token::Le,
                Token::Number("1"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(
            kinds("1 2.5 .5 1e3 2E-2"),
            vec![
                Token::Number("1"),
                Token::Number("2.5"),
                Token::Number(".5"),
                Token::Number("1e3"),
                Token::Number("2E-2"),
                Token::Eof,
            ]
        );
        assert!(matches!(
            Lexer::new("1e").lex(),
            Err(ExprError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'c\'d' "é\n""#),
            vec![
                Token::Str("a\"b".into()),
                Token::Str("c'd".into()),
                Token::Str("é\n".into()),
                Token::Eof,
            ]
        );
        assert_eq!(kinds(r#""😀""#)[0], Token::Str("😀".into()));
    }

    #[test]
    fn unterminated_string_errors() {
        assert_eq!(
            Lexer::new("\"abc").lex().unwrap_err(),
            ExprError::UnterminatedString { position: 0 }
        );
    }

    #[test]
    fn single_ampersand_is_rejected() {
        let err = Lexer::new("a & b").lex().unwrap_err();
        assert!(matches!(err, ExprError::UnexpectedToken { position: 2, .. }));
    }

    #[test]
    fn assignment_is_rejected() {
        assert!(Lexer::new("a = 1").lex().is_err());
    }

    #[test]
    fn empty_input_errors() {
        assert_eq!(Lexer::new("   ").lex().unwrap_err(), ExprError::EmptyInput);
    }
}
