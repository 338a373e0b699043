//! Recursive-descent parser: groups the token stream into terms and
//! library blocks.

use joy_core::{JoyError, SourceSpan};

use crate::ast::{EffectDecl, FieldDecl, LibrarySections, ParserItem, StackPatternItem, TypeDef, WordDef};
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn location(&self) -> SourceSpan {
        self.peek().map(|t| t.location.clone()).unwrap_or_default()
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, JoyError> {
        match self.advance() {
            Some(tok) if tok.kind == kind => Ok(tok),
            Some(tok) => Err(JoyError::Parse {
                message: format!("expected {what}, found `{}`", tok.text),
                span: tok.location,
            }),
            None => Err(JoyError::IncompleteParse {
                message: format!("expected {what}, found end of input"),
                span: SourceSpan::default(),
            }),
        }
    }

    fn expect_word(&mut self) -> Result<Token, JoyError> {
        self.expect(TokenKind::Word, "a name")
    }

    pub fn parse(mut self) -> Result<Vec<ParserItem>, JoyError> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            if matches!(self.peek_kind(), Some(TokenKind::Module | TokenKind::Private | TokenKind::Public)) {
                items.push(ParserItem::Library(self.parse_library()?));
            } else {
                items.push(ParserItem::Term(self.parse_term_tokens()?));
            }
        }
        Ok(items)
    }

    /// Read tokens for one free-standing term, consuming its terminating
    /// `.` (but not emitting it).
    fn parse_term_tokens(&mut self) -> Result<Vec<Token>, JoyError> {
        let mut depth = 0i32;
        let mut out = Vec::new();
        loop {
            let Some(tok) = self.peek().cloned() else {
                if depth != 0 {
                    return Err(JoyError::IncompleteParse {
                        message: "unterminated quotation `[`".to_string(),
                        span: self.location(),
                    });
                }
                break;
            };
            match tok.kind {
                TokenKind::LBracket => {
                    depth += 1;
                    out.push(tok);
                    self.advance();
                }
                TokenKind::RBracket => {
                    depth -= 1;
                    out.push(tok);
                    self.advance();
                }
                TokenKind::Dot if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {
                    out.push(tok);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    /// Read term tokens for a definition's body, stopping (without
    /// consuming) at a sibling separator or the end of the current
    /// section — mirroring `definition: NAME stack_effect? EQUALS term`
    /// inside a `;`-separated `definition_sequence`.
    fn parse_def_body(&mut self) -> Result<Vec<Token>, JoyError> {
        let mut depth = 0i32;
        let mut out = Vec::new();
        loop {
            let Some(tok) = self.peek().cloned() else {
                if depth != 0 {
                    return Err(JoyError::IncompleteParse {
                        message: "unterminated quotation `[`".to_string(),
                        span: self.location(),
                    });
                }
                break;
            };
            match tok.kind {
                TokenKind::LBracket => {
                    depth += 1;
                    out.push(tok);
                    self.advance();
                }
                TokenKind::RBracket => {
                    depth -= 1;
                    out.push(tok);
                    self.advance();
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::Private | TokenKind::Public | TokenKind::End | TokenKind::Dot if depth == 0 => break,
                _ => {
                    out.push(tok);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    fn parse_library(&mut self) -> Result<LibrarySections, JoyError> {
        let mut sections = LibrarySections::default();

        if matches!(self.peek_kind(), Some(TokenKind::Module)) {
            self.advance();
            let name = self.expect_word()?;
            sections.module = Some(name.text);
        }

        loop {
            match self.peek_kind() {
                Some(TokenKind::Private) => {
                    self.advance();
                    self.parse_definition_sequence(true, &mut sections)?;
                }
                Some(TokenKind::Public) => {
                    self.advance();
                    self.parse_definition_sequence(false, &mut sections)?;
                }
                Some(TokenKind::End) | Some(TokenKind::Dot) => {
                    self.advance();
                    break;
                }
                None => break,
                Some(_) => {
                    let tok = self.advance().unwrap();
                    return Err(JoyError::Parse {
                        message: format!("unexpected token `{}` in library block", tok.text),
                        span: tok.location,
                    });
                }
            }
        }
        Ok(sections)
    }

    fn parse_definition_sequence(&mut self, private: bool, sections: &mut LibrarySections) -> Result<(), JoyError> {
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Private) | Some(TokenKind::Public) | Some(TokenKind::End) | Some(TokenKind::Dot) => break,
                _ => {}
            }
            let name_tok = self.expect_word()?;

            if matches!(self.peek_kind(), Some(TokenKind::DoubleColon)) {
                self.advance();
                let fields = self.parse_fields()?;
                sections.types.push(TypeDef { name: name_tok.text, location: name_tok.location, fields });
                continue;
            }

            let signature = if matches!(self.peek_kind(), Some(TokenKind::Colon)) {
                self.advance();
                Some(self.parse_stack_effect()?)
            } else {
                None
            };
            self.expect(TokenKind::Equals, "`==`")?;
            let body = self.parse_def_body()?;
            let def = WordDef { name: name_tok.text, location: name_tok.location, signature, body };
            if private {
                sections.private.push(def);
            } else {
                sections.public.push(def);
            }
        }
        Ok(())
    }

    fn parse_fields(&mut self) -> Result<Vec<FieldDecl>, JoyError> {
        let mut fields = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Semicolon) | Some(TokenKind::Private) | Some(TokenKind::Public) | Some(TokenKind::End) | Some(TokenKind::Dot) => break,
                _ => {}
            }
            let tok = self.expect_word()?;
            if let Some((label, ty)) = tok.text.split_once(':') {
                fields.push(FieldDecl { label: label.to_string(), type_name: Some(ty.to_string()) });
            } else if matches!(self.peek_kind(), Some(TokenKind::Colon)) {
                self.advance();
                let ty = self.expect_word()?;
                fields.push(FieldDecl { label: tok.text, type_name: Some(ty.text) });
            } else {
                fields.push(FieldDecl { label: tok.text, type_name: None });
            }
        }
        if matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
            self.advance();
        }
        Ok(fields)
    }

    fn parse_stack_effect(&mut self) -> Result<EffectDecl, JoyError> {
        self.expect(TokenKind::LParen, "`(`")?;
        let inputs = self.parse_stack_pattern()?;
        self.expect(TokenKind::Arrow, "`--`")?;
        let outputs = self.parse_stack_pattern()?;
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(EffectDecl { inputs, outputs })
    }

    fn parse_stack_pattern(&mut self) -> Result<Vec<StackPatternItem>, JoyError> {
        let mut items = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::Arrow) | Some(TokenKind::RParen) => break,
                Some(TokenKind::LBracket) => {
                    self.advance();
                    // A single-slot bracket counts as one list-typed slot
                    // regardless of what's inside it (see DESIGN.md).
                    let mut depth = 1;
                    while depth > 0 {
                        match self.advance() {
                            Some(t) if t.kind == TokenKind::LBracket => depth += 1,
                            Some(t) if t.kind == TokenKind::RBracket => depth -= 1,
                            Some(_) => {}
                            None => {
                                return Err(JoyError::IncompleteParse {
                                    message: "unterminated `[` in stack-effect pattern".to_string(),
                                    span: self.location(),
                                });
                            }
                        }
                    }
                    items.push(StackPatternItem::BracketSlot);
                }
                Some(TokenKind::LBrace) => {
                    self.advance();
                    let mut depth = 1;
                    while depth > 0 {
                        match self.advance() {
                            Some(t) if t.kind == TokenKind::LBrace => depth += 1,
                            Some(t) if t.kind == TokenKind::RBrace => depth -= 1,
                            Some(_) => {}
                            None => {
                                return Err(JoyError::IncompleteParse {
                                    message: "unterminated `{` in stack-effect pattern".to_string(),
                                    span: self.location(),
                                });
                            }
                        }
                    }
                    items.push(StackPatternItem::BraceSlot);
                }
                Some(TokenKind::Word) => {
                    let tok = self.advance().unwrap();
                    if let Some((label, ty)) = tok.text.split_once(':') {
                        items.push(StackPatternItem::Typed(label.to_string(), ty.to_string()));
                    } else if tok.text.chars().next().is_some_and(|c| c.is_uppercase()) {
                        items.push(StackPatternItem::TypeName(tok.text));
                    } else {
                        items.push(StackPatternItem::Label(tok.text));
                    }
                }
                _ => {
                    let tok = self.advance();
                    return Err(JoyError::Parse {
                        message: format!("unexpected token in stack-effect pattern: {tok:?}"),
                        span: self.location(),
                    });
                }
            }
        }
        Ok(items)
    }
}

pub fn parse(source: &str, filename: impl Into<std::rc::Rc<str>>) -> Result<Vec<ParserItem>, JoyError> {
    let tokens = crate::lexer::tokenize(source, filename)?;
    Parser::new(tokens).parse()
}
