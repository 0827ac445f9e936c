use crate::ast::{Attribute, Content, Document, TagNode};
use crate::error::{ErrorKind, ParseError, Position};
use crate::lexer::{Lexer, Token, TokenWithPos};

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current_pos(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(Position::START, |t| t.at)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos)
            .map(|t| t.token.clone())
            .unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(self.current_pos(), kind)
    }

    fn unexpected(&self, detail: String) -> ParseError {
        self.err(ErrorKind::Unexpected(detail))
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut roots = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Open(_) => roots.push(self.parse_tag()?),
                Token::Text(s) if s.trim().is_empty() => { self.advance(); }
                Token::Text(_) => return Err(self.err(ErrorKind::TextOutsideTag)),
                Token::Close(name) => return Err(self.err(ErrorKind::StrayClose(name.clone()))),
                tok => return Err(self.unexpected(format!("unexpected {tok:?} at document level"))),
            }
        }
        Ok(Document { roots })
    }

    // ── Tag ───────────────────────────────────────────────────────────────

    fn parse_tag(&mut self) -> Result<TagNode, ParseError> {
        let line = self.current_pos().line;
        let name = match self.advance() {
            Token::Open(name) => name,
            tok => return Err(self.unexpected(format!("expected an opening tag, got {tok:?}"))),
        };

        let mut attributes: Vec<Attribute> = Vec::new();
        let self_closing = loop {
            match self.peek() {
                Token::Name(_) => {
                    let attribute = self.parse_attribute()?;
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        return Err(self.err(ErrorKind::DuplicateAttribute {
                            tag: name,
                            attribute: attribute.name,
                        }));
                    }
                    attributes.push(attribute);
                }
                Token::TagEnd    => { self.advance(); break false; }
                Token::SelfClose => { self.advance(); break true; }
                tok => return Err(self.unexpected(format!("unexpected {tok:?} inside <{name}>"))),
            }
        };

        let mut node = TagNode { name, attributes, content: Vec::new(), line };
        if !self_closing {
            self.parse_body(&mut node)?;
        }
        Ok(node)
    }

    /// Parse text and child tags up to the matching `</name>`.
    fn parse_body(&mut self, node: &mut TagNode) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Token::Text(_) => {
                    if let Token::Text(s) = self.advance() {
                        if !s.trim().is_empty() {
                            node.content.push(Content::Text(s));
                        }
                    }
                }
                Token::Open(_) => {
                    let child = self.parse_tag()?;
                    node.content.push(Content::Tag(child));
                }
                Token::Close(closing) => {
                    if closing != &node.name {
                        return Err(self.err(ErrorKind::MismatchedClose {
                            expected: node.name.clone(),
                            found: closing.clone(),
                        }));
                    }
                    self.advance();
                    break;
                }
                Token::Eof => return Err(self.err(ErrorKind::UnclosedTag(node.name.clone()))),
                tok => return Err(self.unexpected(format!("unexpected {tok:?} in body of <{}>", node.name))),
            }
        }
        Ok(())
    }

    // ── Attribute ─────────────────────────────────────────────────────────

    /// `name=value`, or a bare `name` which reads as `name="true"`.
    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let name = match self.advance() {
            Token::Name(name) => name,
            tok => return Err(self.unexpected(format!("expected attribute name, got {tok:?}"))),
        };
        if self.peek() != &Token::Eq {
            return Ok(Attribute { name, value: "true".to_string() });
        }
        self.advance(); // consume `=`
        match self.advance() {
            Token::Value(value) => Ok(Attribute { name, value }),
            tok => Err(self.unexpected(format!("expected a value for {name:?}, got {tok:?}"))),
        }
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse Trellis markup into a [`Document`].
pub fn parse_str(src: &str) -> Result<Document, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_document()
}
