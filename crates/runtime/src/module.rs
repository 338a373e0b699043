//! Module system (§4.3): native-extension modules, backed by a registry the
//! embedding host populates ahead of time, and Joy-source modules, read
//! from `ns.joy` files on a search path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use joy_core::{JoyError, NativeFunction};

use crate::library::{Factory, LibraryHandle, NativeLoader};
use crate::loader::install_library;

/// One host-language extension module: a declared registry of operators
/// (and, optionally, factories) the runtime imports on first reference to
/// its namespace.
pub trait NativeModule {
    fn operators(&self) -> Vec<(&'static str, NativeFunction)>;

    fn factories(&self) -> Vec<(&'static str, Factory)> {
        Vec::new()
    }
}

/// Maps a host identifier to its Joy name: underscore to dash, a trailing
/// `_q`/`_b` to `?`/`!`, and a leading `op_` stripped.
pub fn derive_joy_name(host_name: &str) -> String {
    let stripped = host_name.strip_prefix("op_").unwrap_or(host_name);
    let (base, suffix) = if let Some(base) = stripped.strip_suffix("_q") {
        (base, Some('?'))
    } else if let Some(base) = stripped.strip_suffix("_b") {
        (base, Some('!'))
    } else {
        (stripped, None)
    };
    let mut joy_name = base.replace('_', "-");
    if let Some(c) = suffix {
        joy_name.push(c);
    }
    joy_name
}

/// A native loader backed by modules the embedding host registers by name;
/// there is no dynamic (`dlopen`-style) discovery — out of scope for a
/// safe interpreter core (see `DESIGN.md`).
#[derive(Default)]
pub struct NativeModuleRegistry {
    modules: RefCell<HashMap<String, Rc<dyn NativeModule>>>,
}

impl NativeModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, namespace: impl Into<String>, module: Rc<dyn NativeModule>) {
        self.modules.borrow_mut().insert(namespace.into(), module);
    }
}

impl NativeLoader for NativeModuleRegistry {
    fn load(&self, namespace: &str, library: &LibraryHandle) -> Result<(), JoyError> {
        let module = self.modules.borrow().get(namespace).cloned().ok_or_else(|| JoyError::Import {
            message: format!("no native module registered for `{namespace}`"),
            span: None,
        })?;
        tracing::debug!(namespace, "loading native module");
        for (host_name, fun) in module.operators() {
            let joy_name = format!("{namespace}.{}", derive_joy_name(host_name));
            library.borrow_mut().add_function(joy_name, fun)?;
        }
        for (host_name, factory) in module.factories() {
            let joy_name = format!("{namespace}.{}", derive_joy_name(host_name));
            library.borrow_mut().add_factory(joy_name, factory);
        }
        Ok(())
    }
}

/// Joy-source module loader: finds `ns.joy` on the search path and installs
/// its definitions under the `ns.` prefix.
pub struct PathJoyLoader;

fn search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(var) = std::env::var("JOY_PATH") {
        roots.extend(std::env::split_paths(&var));
    }
    roots.push(PathBuf::from("lib"));
    roots
}

fn locate(namespace: &str) -> Result<PathBuf, JoyError> {
    let filename = format!("{namespace}.joy");
    for root in search_roots() {
        let candidate = root.join(&filename);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(JoyError::Import { message: format!("module `{namespace}` not found on JOY_PATH"), span: None })
}

impl crate::library::JoySourceLoader for PathJoyLoader {
    fn load(&self, namespace: &str, library: &LibraryHandle) -> Result<(), JoyError> {
        let path = locate(namespace)?;
        tracing::debug!(namespace, path = %path.display(), "loading Joy-source module");
        let source = std::fs::read_to_string(&path)
            .map_err(|e| JoyError::Import { message: format!("failed to read `{}`: {e}", path.display()), span: None })?;
        let items = joy_syntax::parse(&source, path.to_string_lossy().into_owned())?;
        for item in items {
            if let joy_syntax::ParserItem::Library(sections) = item {
                let ns = sections.module.as_deref().unwrap_or(namespace);
                install_library(&sections, library, Some(ns))?;
            }
        }
        Ok(())
    }
}
