//! The AST shapes the parser hands to the linker, matching the external
//! parser contract (§6): a stream of `('term', tokens)` and
//! `('library', sections)` items.

use joy_core::SourceSpan;

use crate::token::Token;

/// One parsed unit: a free-standing term, or a library block.
#[derive(Debug, Clone)]
pub enum ParserItem {
    /// A term terminated by `.`; `tokens` is handed to the linker as-is.
    Term(Vec<Token>),
    Library(LibrarySections),
}

#[derive(Debug, Clone, Default)]
pub struct LibrarySections {
    pub module: Option<String>,
    pub private: Vec<WordDef>,
    pub public: Vec<WordDef>,
    /// Product-type declarations, collected regardless of which block
    /// they appeared in (struct types are registered globally).
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Clone)]
pub struct WordDef {
    pub name: String,
    pub location: SourceSpan,
    pub signature: Option<EffectDecl>,
    pub body: Vec<Token>,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub location: SourceSpan,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub label: String,
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EffectDecl {
    /// Top-down (index 0 nearest `--`, i.e. the top of stack).
    pub inputs: Vec<StackPatternItem>,
    pub outputs: Vec<StackPatternItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackPatternItem {
    /// A lowercase, untyped label — matches anything.
    Label(String),
    /// `label:Type`.
    Typed(String, String),
    /// A bare capitalized type name with no label.
    TypeName(String),
    /// `[slot]` — one list-typed slot.
    BracketSlot,
    /// `{slot ...}` — one structured (struct-typed) slot.
    BraceSlot,
}
