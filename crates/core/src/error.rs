//! The error taxonomy raised by every layer of the runtime.
//!
//! Kinds are distinct variants (not host exceptions) so that Joy code can
//! inspect a captured failure via `error-kind` / `error-message` /
//! `error-data` after `exec!` recovers it onto the stack.

use std::rc::Rc;

use crate::location::SourceSpan;

/// A runtime, link-time or load-time failure.
///
/// Every variant is fatal to whatever call raised it; the sole recovery
/// boundary is the `exec!` combinator, which converts any of these into a
/// `(error-value, false)` pair on its caller's stack instead of propagating.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JoyError {
    #[error("parse error at {span}: {message}")]
    Parse { message: String, span: SourceSpan },

    #[error("incomplete parse at {span}: {message}")]
    IncompleteParse { message: String, span: SourceSpan },

    #[error("name `{token}` not found: {message}")]
    Name {
        token: String,
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("module error: {message}")]
    Import {
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("native function `{name}` registered without a complete stack-effect signature")]
    TypeMissing { name: String },

    #[error("type error: {message}")]
    Type {
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("unknown struct type `{name}`")]
    UnknownStruct {
        name: String,
        span: Option<SourceSpan>,
    },

    #[error("struct type `{name}` redeclared with a conflicting shape")]
    TypeDuplicate { name: String },

    #[error("stack error: {message}")]
    Stack {
        message: String,
        op: Option<String>,
        span: Option<SourceSpan>,
        stack_snapshot: Vec<String>,
    },

    #[error("assertion failed{}", op.as_deref().map(|o| format!(" in `{o}`")).unwrap_or_default())]
    Assertion {
        op: Option<String>,
        span: Option<SourceSpan>,
    },

    #[error("runtime error in `{op}`: {message}")]
    Runtime {
        op: String,
        message: String,
        span: Option<SourceSpan>,
    },
}

impl JoyError {
    /// The error kind as Joy code sees it via `error-kind`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JoyError::Parse { .. } => "ParseError",
            JoyError::IncompleteParse { .. } => "IncompleteParse",
            JoyError::Name { .. } => "NameError",
            JoyError::Import { .. } => "ImportError",
            JoyError::TypeMissing { .. } => "TypeMissing",
            JoyError::Type { .. } => "TypeError",
            JoyError::UnknownStruct { .. } => "UnknownStruct",
            JoyError::TypeDuplicate { .. } => "TypeDuplicate",
            JoyError::Stack { .. } => "StackError",
            JoyError::Assertion { .. } => "AssertionError",
            JoyError::Runtime { .. } => "RuntimeError",
        }
    }

    /// The offending operation's display name, when one is attached.
    pub fn op_name(&self) -> Option<&str> {
        match self {
            JoyError::Stack { op, .. } => op.as_deref(),
            JoyError::Assertion { op, .. } => op.as_deref(),
            JoyError::Runtime { op, .. } => Some(op.as_str()),
            _ => None,
        }
    }

    /// The source span attached to this error, if any.
    pub fn span(&self) -> Option<&SourceSpan> {
        match self {
            JoyError::Parse { span, .. } | JoyError::IncompleteParse { span, .. } => Some(span),
            JoyError::Name { span, .. }
            | JoyError::Import { span, .. }
            | JoyError::Type { span, .. }
            | JoyError::UnknownStruct { span, .. }
            | JoyError::Stack { span, .. }
            | JoyError::Assertion { span, .. }
            | JoyError::Runtime { span, .. } => span.as_ref(),
            JoyError::TypeMissing { .. } | JoyError::TypeDuplicate { .. } => None,
        }
    }

    /// Wrap this error as the shared handle `Value::Error` carries.
    pub fn into_shared(self) -> Rc<JoyError> {
        Rc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_the_taxonomy() {
        let span = SourceSpan::default();
        assert_eq!(JoyError::Parse { message: String::new(), span: span.clone() }.kind_name(), "ParseError");
        assert_eq!(JoyError::IncompleteParse { message: String::new(), span: span.clone() }.kind_name(), "IncompleteParse");
        assert_eq!(JoyError::Name { token: String::new(), message: String::new(), span: None }.kind_name(), "NameError");
        assert_eq!(JoyError::Import { message: String::new(), span: None }.kind_name(), "ImportError");
        assert_eq!(JoyError::TypeMissing { name: String::new() }.kind_name(), "TypeMissing");
        assert_eq!(JoyError::Type { message: String::new(), span: None }.kind_name(), "TypeError");
        assert_eq!(JoyError::UnknownStruct { name: String::new(), span: None }.kind_name(), "UnknownStruct");
        assert_eq!(JoyError::TypeDuplicate { name: String::new() }.kind_name(), "TypeDuplicate");
        assert_eq!(JoyError::Stack { message: String::new(), op: None, span: None, stack_snapshot: vec![] }.kind_name(), "StackError");
        assert_eq!(JoyError::Assertion { op: None, span: None }.kind_name(), "AssertionError");
        assert_eq!(JoyError::Runtime { op: String::new(), message: String::new(), span: None }.kind_name(), "RuntimeError");
    }

    #[test]
    fn assertion_carries_offending_op_when_attached() {
        let err = JoyError::Assertion { op: Some("assert!".to_string()), span: None };
        assert_eq!(err.op_name(), Some("assert!"));
    }

    #[test]
    fn into_shared_wraps_in_rc() {
        let err = JoyError::TypeMissing { name: "foo".to_string() };
        let shared = err.into_shared();
        assert_eq!(shared.kind_name(), "TypeMissing");
    }
}
