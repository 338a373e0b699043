//! The library: the registry the linker and interpreter resolve every name
//! against.
//!
//! Functions, constants, factories, aliases and struct types live in flat
//! maps; quotations live in a map too, but during a module's own linking
//! pass a temporary [`Overlay`] shadows it so sibling definitions can see
//! each other under their bare names before they're exported under the
//! module's dotted prefix.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use joy_core::{
    Dict, ElementType, JoyError, NativeFunction, Quotation, SourceSpan, StructType, Symbol, Value,
    Visibility,
};

/// A zero-argument value producer, called fresh every time it's mentioned
/// (e.g. `{}` yielding a new empty dict each time rather than one shared
/// mutable dict).
pub type Factory = Rc<dyn Fn() -> Value>;

/// Populates the library with a namespace's native operators on first use.
pub trait NativeLoader {
    fn load(&self, namespace: &str, library: &LibraryHandle) -> Result<(), JoyError>;
}

/// Populates the library with a namespace's Joy-source definitions on
/// first use.
pub trait JoySourceLoader {
    fn load(&self, namespace: &str, library: &LibraryHandle) -> Result<(), JoyError>;
}

pub type LibraryHandle = Rc<RefCell<Library>>;

pub struct Library {
    functions: HashMap<Rc<str>, Rc<NativeFunction>>,
    constants: HashMap<Rc<str>, Value>,
    factories: HashMap<Rc<str>, Factory>,
    aliases: HashMap<Rc<str>, Rc<str>>,
    quotations: HashMap<Rc<str>, Quotation>,
    struct_types: HashMap<Symbol, StructType>,
    loaded_modules: HashSet<Rc<str>>,
    native_loader: Option<Rc<dyn NativeLoader>>,
    joy_loader: Option<Rc<dyn JoySourceLoader>>,
}

fn namespace_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(ns, _)| ns)
}

impl Library {
    pub fn new_handle(
        native_loader: Option<Rc<dyn NativeLoader>>,
        joy_loader: Option<Rc<dyn JoySourceLoader>>,
    ) -> LibraryHandle {
        Rc::new(RefCell::new(Library {
            functions: HashMap::new(),
            constants: HashMap::new(),
            factories: HashMap::new(),
            aliases: HashMap::new(),
            quotations: HashMap::new(),
            struct_types: HashMap::new(),
            loaded_modules: HashSet::new(),
            native_loader,
            joy_loader,
        }))
    }

    fn resolve_alias(&self, name: &str) -> Rc<str> {
        match self.aliases.get(name) {
            Some(target) => target.clone(),
            None => Rc::from(name),
        }
    }

    pub fn add_alias(&mut self, name: impl Into<Rc<str>>, target: impl Into<Rc<str>>) {
        self.aliases.insert(name.into(), target.into());
    }

    pub fn add_constant(&mut self, name: impl Into<Rc<str>>, value: Value) {
        self.constants.insert(name.into(), value);
    }

    pub fn get_constant(&self, name: &str) -> Option<Value> {
        let name = self.resolve_alias(name);
        self.constants.get(name.as_ref()).cloned()
    }

    pub fn add_factory(&mut self, name: impl Into<Rc<str>>, factory: Factory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn add_struct_type(&mut self, ty: StructType) -> Result<(), JoyError> {
        if let Some(existing) = self.struct_types.get(&ty.name) {
            if *existing != ty {
                return Err(JoyError::TypeDuplicate {
                    name: String::from_utf8_lossy(&ty.name).into_owned(),
                });
            }
            return Ok(());
        }
        self.struct_types.insert(ty.name.clone(), ty);
        Ok(())
    }

    pub fn get_struct_type(&self, name: &Symbol) -> Option<StructType> {
        self.struct_types.get(name).cloned()
    }

    /// Registers a native function. Fails if its signature's declared input
    /// list length disagrees with a fixed arity — the closest static proxy
    /// we have, in a language without optional-field signatures, for the
    /// reference loader's "missing annotation" check.
    pub fn add_function(&mut self, name: impl Into<Rc<str>>, fun: NativeFunction) -> Result<(), JoyError> {
        let name = name.into();
        if let joy_core::Arity::Fixed(n) = fun.signature.arity {
            if fun.signature.inputs.len() != n && !fun.signature.inputs.iter().any(|t| *t == ElementType::Any) {
                return Err(JoyError::TypeMissing { name: name.to_string() });
            }
        }
        self.functions.insert(name, Rc::new(fun));
        Ok(())
    }

    fn get_function_raw(&self, name: &str) -> Option<Rc<NativeFunction>> {
        self.functions.get(name).cloned()
    }

    /// Every currently-registered native operation's name.
    pub fn function_names(&self) -> Vec<Rc<str>> {
        self.functions.keys().cloned().collect()
    }

    pub fn add_quotation(&mut self, name: impl Into<Rc<str>>, quotation: Quotation) {
        self.quotations.insert(name.into(), quotation);
    }

    /// Visibility-filtered: only `Public` quotations are visible through
    /// the plain (non-overlay) accessor, matching "not callable from
    /// outside" for module-private definitions.
    pub fn get_quotation(&self, name: &str) -> Option<Quotation> {
        self.quotations
            .get(name)
            .filter(|q| q.visibility == Visibility::Public)
            .cloned()
    }

    pub fn get_quotation_raw(&self, name: &str) -> Option<Quotation> {
        self.quotations.get(name).cloned()
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded_modules.contains(namespace)
    }

    pub fn mark_loaded(&mut self, namespace: impl Into<Rc<str>>) {
        self.loaded_modules.insert(namespace.into());
    }
}

/// Ensures `ns` (for a dotted `name`) is loaded via the native loader,
/// running it at most once.
fn ensure_native_loaded(handle: &LibraryHandle, name: &str) -> Result<(), JoyError> {
    let Some(ns) = namespace_of(name) else { return Ok(()) };
    let already = handle.borrow().is_loaded(ns);
    if already {
        return Ok(());
    }
    let loader = handle.borrow().native_loader.clone();
    match loader {
        Some(loader) => {
            loader.load(ns, handle)?;
            handle.borrow_mut().mark_loaded(ns);
            Ok(())
        }
        None => Err(JoyError::Import {
            message: format!("no native module loader configured to resolve `{ns}`"),
            span: None,
        }),
    }
}

fn ensure_joy_loaded(handle: &LibraryHandle, name: &str) -> Result<(), JoyError> {
    let Some(ns) = namespace_of(name) else { return Ok(()) };
    let already = handle.borrow().is_loaded(ns);
    if already {
        return Ok(());
    }
    let loader = handle.borrow().joy_loader.clone();
    match loader {
        Some(loader) => {
            loader.load(ns, handle)?;
            handle.borrow_mut().mark_loaded(ns);
            Ok(())
        }
        None => Err(JoyError::Import {
            message: format!("no Joy-source module loader configured to resolve `{ns}`"),
            span: None,
        }),
    }
}

/// Resolves a (possibly dotted) function name, lazily loading its native
/// module on first reference.
pub fn get_function(handle: &LibraryHandle, name: &str) -> Result<Rc<NativeFunction>, JoyError> {
    let resolved = handle.borrow().resolve_alias(name);
    if handle.borrow().get_function_raw(&resolved).is_none() {
        ensure_native_loaded(handle, &resolved)?;
    }
    handle.borrow().get_function_raw(&resolved).ok_or_else(|| JoyError::Name {
        token: resolved.to_string(),
        message: "no such function".to_string(),
        span: None,
    })
}

/// Resolves a (possibly dotted) quotation name, lazily loading its Joy
/// source module on first reference. Returns `None` (not an error) when
/// nothing by that name exists after loading — callers fall through to the
/// next token-resolution rule.
pub fn get_quotation(handle: &LibraryHandle, name: &str) -> Result<Option<Quotation>, JoyError> {
    let resolved = handle.borrow().resolve_alias(name);
    if handle.borrow().get_quotation(&resolved).is_none() {
        ensure_joy_loaded(handle, &resolved)?;
    }
    Ok(handle.borrow().get_quotation(&resolved))
}

pub fn get_factory(handle: &LibraryHandle, name: &str, strict: bool) -> Result<Option<Value>, JoyError> {
    let resolved = handle.borrow().resolve_alias(name);
    if handle.borrow().factories.get(resolved.as_ref()).is_none() {
        let _ = ensure_native_loaded(handle, &resolved);
    }
    let factory = handle.borrow().factories.get(resolved.as_ref()).cloned();
    match factory {
        Some(f) => Ok(Some(f())),
        None if strict => Err(JoyError::Name {
            token: resolved.to_string(),
            message: "no such factory".to_string(),
            span: None,
        }),
        None => Ok(None),
    }
}

pub fn fresh_dict() -> Value {
    Value::Dict(Dict::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_one_level() {
        let handle = Library::new_handle(None, None);
        handle.borrow_mut().add_alias("+", "add");
        assert_eq!(handle.borrow().resolve_alias("+").as_ref(), "add");
        assert_eq!(handle.borrow().resolve_alias("add").as_ref(), "add");
    }

    #[test]
    fn private_quotation_is_invisible_through_plain_accessor() {
        let handle = Library::new_handle(None, None);
        let slot = crate::linker::program_from_values(&[]);
        handle.borrow_mut().add_quotation(
            "m.secret",
            Quotation {
                program: Rc::new(RefCell::new(Some(Rc::new(slot)))),
                location: SourceSpan::default(),
                signature: None,
                visibility: Visibility::Private,
                module: Some(Rc::from("m")),
            },
        );
        assert!(handle.borrow().get_quotation("m.secret").is_none());
        assert!(handle.borrow().get_quotation_raw("m.secret").is_some());
    }

    #[test]
    fn factory_produces_fresh_values() {
        let handle = Library::new_handle(None, None);
        handle.borrow_mut().add_factory("dict", Rc::new(fresh_dict));
        let a = get_factory(&handle, "dict", true).unwrap().unwrap();
        let b = get_factory(&handle, "dict", true).unwrap().unwrap();
        match (a, b) {
            (Value::Dict(a), Value::Dict(b)) => assert!(!Rc::ptr_eq(&a, &b)),
            _ => panic!("expected two dict values"),
        }
    }
}

/// A scoped write layer over a library's quotations, used while linking one
/// module's own definitions: sibling names resolve locally (regardless of
/// their eventual declared visibility) without being exported.
pub struct Overlay {
    base: LibraryHandle,
    local: RefCell<HashMap<Rc<str>, Quotation>>,
}

impl Overlay {
    pub fn new(base: LibraryHandle) -> Self {
        Overlay { base, local: RefCell::new(HashMap::new()) }
    }

    pub fn declare_local(&self, name: impl Into<Rc<str>>, quotation: Quotation) {
        self.local.borrow_mut().insert(name.into(), quotation);
    }

    /// Resolves `name` against the local overlay first, then the base
    /// library's already-public entries.
    pub fn resolve(&self, name: &str) -> Result<Option<Quotation>, JoyError> {
        if let Some(q) = self.local.borrow().get(name) {
            return Ok(Some(q.clone()));
        }
        get_quotation(&self.base, name)
    }

    pub fn base(&self) -> &LibraryHandle {
        &self.base
    }
}

pub fn with_overlay(base: &LibraryHandle) -> Overlay {
    Overlay::new(base.clone())
}

pub fn loc_here() -> SourceSpan {
    SourceSpan::default()
}
