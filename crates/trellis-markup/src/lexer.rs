use crate::error::{ErrorKind, ParseError, Position};

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name`
    Open(String),
    /// `</name>`
    Close(String),
    /// Attribute name inside an opening tag.
    Name(String),
    /// Quoted or bare attribute value.
    Value(String),
    /// Raw character data between tags.
    Text(String),
    // Punctuation
    Eq,
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    // Sentinel
    Eof,
}

/// A token plus the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithPos {
    pub token: Token,
    pub at: Position,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

/// Two-mode lexer: character data outside tags, names and values inside.
pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
    in_tag: bool,
    expect_value: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1, in_tag: false, expect_value: false }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.token == Token::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn err(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(self.here(), kind)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        let start = self.here();
        self.advance_by(4); // consume `<!--`
        loop {
            if self.rest().starts_with("-->") {
                self.advance_by(3);
                return Ok(());
            }
            if self.advance().is_none() {
                return Err(ParseError::at(start, ErrorKind::UnterminatedComment));
            }
        }
    }

    fn next_token(&mut self) -> Result<TokenWithPos, ParseError> {
        if self.in_tag {
            self.skip_whitespace();
        } else {
            while self.rest().starts_with("<!--") {
                self.skip_comment()?;
            }
        }
        let at = self.here();
        let token = if self.in_tag { self.lex_in_tag()? } else { self.lex_content()? };
        Ok(TokenWithPos { token, at })
    }

    // ── Content mode ──────────────────────────────────────────────────────

    fn lex_content(&mut self) -> Result<Token, ParseError> {
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        if self.rest().starts_with("</") {
            self.advance_by(2);
            let name = self.lex_name()?;
            self.skip_whitespace();
            if self.advance() != Some('>') {
                return Err(self.err(ErrorKind::Unexpected(format!("expected '>' to end </{name}>"))));
            }
            return Ok(Token::Close(name));
        }

        if ch == '<' {
            self.advance();
            let name = self.lex_name()?;
            self.in_tag = true;
            return Ok(Token::Open(name));
        }

        let start = self.pos;
        while !matches!(self.peek(), None | Some('<')) {
            self.advance();
        }
        Ok(Token::Text(self.src[start..self.pos].to_string()))
    }

    fn lex_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        if start == self.pos {
            return Err(self.err(ErrorKind::Unexpected("expected a tag name".into())));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    // ── Tag mode ──────────────────────────────────────────────────────────

    fn lex_in_tag(&mut self) -> Result<Token, ParseError> {
        let Some(ch) = self.peek() else {
            return Err(self.err(ErrorKind::UnterminatedTag));
        };

        if self.expect_value {
            self.expect_value = false;
            return match ch {
                '"' | '\'' => self.lex_quoted(ch),
                _ => self.lex_bare(),
            };
        }

        match ch {
            '>' => {
                self.advance();
                self.in_tag = false;
                Ok(Token::TagEnd)
            }
            '/' => {
                self.advance();
                if self.advance() != Some('>') {
                    return Err(self.err(ErrorKind::Unexpected("expected '>' after '/'".into())));
                }
                self.in_tag = false;
                Ok(Token::SelfClose)
            }
            '=' => {
                self.advance();
                self.skip_whitespace();
                self.expect_value = true;
                Ok(Token::Eq)
            }
            c if is_name_char(c) => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if is_name_char(c)) {
                    self.advance();
                }
                Ok(Token::Name(self.src[start..self.pos].to_string()))
            }
            other => Err(self.err(ErrorKind::Unexpected(format!("unexpected character {other:?} inside tag")))),
        }
    }

    fn lex_quoted(&mut self, quote: char) -> Result<Token, ParseError> {
        let start_at = self.here();
        self.advance(); // consume opening quote
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::at(start_at, ErrorKind::UnterminatedValue)),
                Some(c) if c == quote => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        let value = self.src[start..self.pos].to_string();
        self.advance(); // consume closing quote
        Ok(Token::Value(value))
    }

    fn lex_bare(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '>' || self.rest().starts_with("/>") {
                break;
            }
            self.advance();
        }
        if start == self.pos {
            return Err(self.err(ErrorKind::Unexpected("expected an attribute value after '='".into())));
        }
        Ok(Token::Value(self.src[start..self.pos].to_string()))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}
