//! Installs one parsed library block into a library (§4.2's body-population
//! protocol): register placeholders, link bodies against the siblings'
//! overlay, then export under the module's visibility (and dotted prefix,
//! if any).
//!
//! Pass 3 of the protocol ("patch any `Execute` whose target is still
//! null") is implicit here: every `Execute` created while linking a sibling
//! body already shares the same `QuotationSlot` `Rc`, so filling that slot
//! once linking succeeds is the only patching needed.

use std::rc::Rc;

use joy_core::{JoyError, Quotation, QuotationSlot, Signature, Visibility, empty_slot};
use joy_syntax::{LibrarySections, WordDef};

use crate::library::{LibraryHandle, Overlay};
use crate::linker::{Linker, build_struct_type, program_from_values, resolve_signature};

struct Pending<'a> {
    def: &'a WordDef,
    visibility: Visibility,
    slot: QuotationSlot,
    signature: Option<Signature>,
}

fn prepare<'a>(
    def: &'a WordDef,
    visibility: Visibility,
    overlay: &Overlay,
    library: &LibraryHandle,
    namespace: Option<&str>,
) -> Result<Pending<'a>, JoyError> {
    let slot = empty_slot();
    let signature = match &def.signature {
        Some(effect) => Some(resolve_signature(effect, library, &def.location)?),
        None => None,
    };
    let local = Quotation {
        program: slot.clone(),
        location: def.location.clone(),
        signature: signature.clone(),
        visibility: Visibility::Local,
        module: namespace.map(Rc::from),
    };
    overlay.declare_local(def.name.clone(), local);
    Ok(Pending { def, visibility, slot, signature })
}

/// Installs every type and word definition in `sections` into `library`.
/// `namespace`, when present, prefixes every exported quotation's name
/// (`ns.name`) and is recorded on the resulting `Quotation`.
pub fn install_library(sections: &LibrarySections, library: &LibraryHandle, namespace: Option<&str>) -> Result<(), JoyError> {
    for type_def in &sections.types {
        let ty = build_struct_type(&type_def.name, &type_def.fields, library, &type_def.location)?;
        library.borrow_mut().add_struct_type(ty)?;
    }

    let overlay = crate::library::with_overlay(library);
    let mut pending = Vec::new();
    for def in &sections.private {
        pending.push(prepare(def, Visibility::Private, &overlay, library, namespace)?);
    }
    for def in &sections.public {
        pending.push(prepare(def, Visibility::Public, &overlay, library, namespace)?);
    }

    let linker = Linker::new(&overlay);
    for entry in &pending {
        let (values, _span) = linker.link(&entry.def.body)?;
        let program = program_from_values(&values);
        *entry.slot.borrow_mut() = Some(Rc::new(program));
    }

    for entry in pending {
        let dotted: Rc<str> = match namespace {
            Some(ns) => Rc::from(format!("{ns}.{}", entry.def.name)),
            None => Rc::from(entry.def.name.as_str()),
        };
        tracing::trace!(name = %dotted, visibility = ?entry.visibility, "installing quotation");
        let quotation = Quotation {
            program: entry.slot,
            location: entry.def.location.clone(),
            signature: entry.signature,
            visibility: entry.visibility,
            module: namespace.map(Rc::from),
        };
        library.borrow_mut().add_quotation(dotted, quotation);
    }
    Ok(())
}
