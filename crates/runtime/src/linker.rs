//! Turns one body's flat token list into linked values — literals and
//! `Value::Operation`s — consulting the library (through an [`Overlay`])
//! in the token-resolution order the runtime commits to.
//!
//! A bracket quotation links to a plain `Value::List`: its elements are
//! either literal `Value`s or `Value::Operation`s, so a quotation is
//! simultaneously data (inspectable, equatable) and code (`program_from_values`
//! turns it into a `Program` the interpreter can run).

use std::rc::Rc;

use joy_core::{
    Arity, ElementType, JoyError, Item, Operation, Program, Signature, SourceSpan, StructType,
    Symbol, Valency, Value, symbol,
};
use joy_syntax::{EffectDecl, StackPatternItem, Token, TokenKind};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Num;

use crate::combinators::combinator_for_name;
use crate::library::{LibraryHandle, Overlay, get_factory, get_function};

pub struct Linker<'a> {
    overlay: &'a Overlay,
}

impl<'a> Linker<'a> {
    pub fn new(overlay: &'a Overlay) -> Self {
        Linker { overlay }
    }

    /// Links a flat token list into a root value list plus the span
    /// covering every token consumed.
    pub fn link(&self, tokens: &[Token]) -> Result<(Vec<Value>, SourceSpan), JoyError> {
        let mut frames: Vec<Vec<Value>> = vec![Vec::new()];
        let mut span = SourceSpan::default();
        for tok in tokens {
            span.extend(&tok.location);
            match tok.kind {
                TokenKind::LBracket => frames.push(Vec::new()),
                TokenKind::RBracket => {
                    let done = frames.pop().ok_or_else(|| JoyError::Parse {
                        message: "unbalanced `]`".to_string(),
                        span: tok.location.clone(),
                    })?;
                    frames
                        .last_mut()
                        .ok_or_else(|| JoyError::Parse {
                            message: "unbalanced `]`".to_string(),
                            span: tok.location.clone(),
                        })?
                        .push(Value::list(done));
                }
                _ => {
                    let value = self.link_token(tok)?;
                    frames
                        .last_mut()
                        .expect("root frame always present")
                        .push(value);
                }
            }
        }
        if frames.len() != 1 {
            return Err(JoyError::IncompleteParse {
                message: "unterminated `[` in body".to_string(),
                span,
            });
        }
        Ok((frames.pop().unwrap(), span))
    }

    fn link_token(&self, tok: &Token) -> Result<Value, JoyError> {
        let text = tok.text.as_str();

        if let Some(comb) = combinator_for_name(text) {
            return Ok(Value::Operation(Rc::new(Operation::combinator(comb, tok.location.clone()))));
        }
        if let Some(v) = self.overlay.base().borrow().get_constant(text) {
            return Ok(v);
        }
        let factory_name = text.strip_prefix('@').unwrap_or(text);
        if let Some(v) = get_factory(self.overlay.base(), factory_name, false)? {
            return Ok(v);
        }
        if let Some(q) = self.overlay.resolve(text)? {
            let op = Operation::execute(Rc::from(text), q.program.clone(), tok.location.clone());
            return Ok(Value::Operation(Rc::new(op)));
        }
        if tok.kind == TokenKind::String {
            return Ok(Value::string(decode_string(text)));
        }
        if let Some(rest) = text.strip_prefix('\'') {
            return Ok(Value::symbol(rest.as_bytes().to_vec()));
        }
        if let Some(v) = try_rational(text) {
            return Ok(v);
        }
        if let Some(v) = try_integer(text) {
            return Ok(v);
        }
        if let Some(v) = try_float(text) {
            return Ok(v);
        }
        match get_function(self.overlay.base(), text) {
            Ok(fun) => Ok(Value::Operation(Rc::new(Operation::function(
                Rc::from(text),
                fun,
                tok.location.clone(),
            )))),
            Err(_) => Err(JoyError::Name {
                token: text.to_string(),
                message: "unknown name".to_string(),
                span: Some(tok.location.clone()),
            }),
        }
    }
}

/// Converts a linked value list (as produced for a bracket quotation, or
/// the root of a term) into an executable `Program`.
pub fn program_from_values(values: &[Value]) -> Program {
    values
        .iter()
        .map(|v| match v {
            Value::Operation(op) => Item::Op((**op).clone()),
            other => Item::Literal(other.clone()),
        })
        .collect()
}

fn decode_string(lexeme: &str) -> String {
    let inner = lexeme.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn try_integer(text: &str) -> Option<Value> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        BigInt::from_str_radix(text, 10).ok().map(Value::Int)
    } else {
        None
    }
}

fn try_float(text: &str) -> Option<Value> {
    if !(text.contains('.') || text.contains('e') || text.contains('E')) {
        return None;
    }
    text.parse::<f64>().ok().map(Value::Float)
}

fn try_rational(text: &str) -> Option<Value> {
    let (num, den) = text.split_once('⁄')?;
    let numer = BigInt::from_str_radix(num, 10).ok()?;
    let denom = BigInt::from_str_radix(den, 10).ok()?;
    if denom == BigInt::from(0) {
        return None;
    }
    Some(Value::Rational(BigRational::new(numer, denom)))
}

fn builtin_element_type(name: &str) -> Option<ElementType> {
    Some(match name {
        "int" | "Int" => ElementType::Int,
        "float" | "Float" => ElementType::Float,
        "rational" | "Rational" => ElementType::Rational,
        "bool" | "Bool" => ElementType::Bool,
        "string" | "String" => ElementType::String,
        "symbol" | "Symbol" => ElementType::Symbol,
        "list" | "List" => ElementType::List,
        "dict" | "Dict" => ElementType::Dict,
        "operation" | "Operation" | "any" | "Any" => ElementType::Any,
        _ => return None,
    })
}

fn resolve_element_type(name: &str, library: &LibraryHandle, span: &SourceSpan) -> Result<ElementType, JoyError> {
    if let Some(ty) = builtin_element_type(name) {
        return Ok(ty);
    }
    let key: Symbol = symbol(name.as_bytes().to_vec());
    if library.borrow().get_struct_type(&key).is_some() {
        Ok(ElementType::Struct(Rc::from(name)))
    } else {
        Err(JoyError::UnknownStruct { name: name.to_string(), span: Some(span.clone()) })
    }
}

fn resolve_pattern(
    items: &[StackPatternItem],
    library: &LibraryHandle,
    span: &SourceSpan,
) -> Result<Vec<ElementType>, JoyError> {
    items
        .iter()
        .map(|item| match item {
            StackPatternItem::Label(name) => Ok(ElementType::Var(Rc::from(name.as_str()))),
            StackPatternItem::Typed(_, ty) => resolve_element_type(ty, library, span),
            StackPatternItem::TypeName(ty) => resolve_element_type(ty, library, span),
            StackPatternItem::BracketSlot => Ok(ElementType::List),
            StackPatternItem::BraceSlot => Ok(ElementType::Any),
        })
        .collect()
}

/// Turns a parsed stack-effect annotation into a `Signature`, resolving any
/// struct-type names against the library (§4.2's extra linker duty).
pub fn resolve_signature(effect: &EffectDecl, library: &LibraryHandle, span: &SourceSpan) -> Result<Signature, JoyError> {
    let inputs = resolve_pattern(&effect.inputs, library, span)?;
    let outputs = resolve_pattern(&effect.outputs, library, span)?;
    Ok(Signature::new(Arity::Fixed(inputs.len()), Valency::Fixed(outputs.len()), inputs, outputs))
}

/// Builds a `StructType` from a parsed type declaration, resolving each
/// field's declared type the same way a stack-effect pattern is resolved.
pub fn build_struct_type(
    name: &str,
    fields: &[joy_syntax::FieldDecl],
    library: &LibraryHandle,
    span: &SourceSpan,
) -> Result<StructType, JoyError> {
    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        let declared_type = match &field.type_name {
            Some(ty) => Some(resolve_element_type(ty, library, span)?),
            None => None,
        };
        descriptors.push(joy_core::FieldDescriptor { label: Rc::from(field.label.as_str()), declared_type });
    }
    Ok(StructType { name: symbol(name.as_bytes().to_vec()), arity: descriptors.len(), fields: Rc::new(descriptors) })
}
