//! The module ABI.
//!
//! A module is a Rust `cdylib` exporting one static [`ModuleDeclaration`]
//! under [`MODULE_DECLARATION_SYMBOL`]; the [`declare_module!`] macro emits
//! it. Host and module must be built with the same compiler and the same
//! `mew-runtime`, which [`MEW_ABI_VERSION`] guards.
//!
//! [`declare_module!`]: crate::declare_module

use std::any::type_name;

use crate::extension::Extension;

/// Bumped whenever the declaration layout or the extension trait changes.
pub const MEW_ABI_VERSION: u32 = 1;

/// Symbol name of the exported declaration, NUL-terminated.
pub const MODULE_DECLARATION_SYMBOL: &[u8] = b"mew_module_declaration\0";

/// Constructs one extension instance.
pub type ExtensionFactory = fn() -> Result<Box<dyn Extension>, String>;

/// One extension type exported by a module (or compiled into the host).
#[derive(Debug, Clone, Copy)]
pub struct ExportedExtension {
    /// Fully qualified type name, for diagnostics.
    pub type_name: &'static str,
    /// Factory constructing an instance.
    pub factory: ExtensionFactory,
}

impl ExportedExtension {
    /// Exports `T` through its `Default` implementation.
    pub fn of<T: Extension + Default + 'static>() -> Self {
        Self {
            type_name: type_name::<T>(),
            factory: default_factory::<T>,
        }
    }
}

fn default_factory<T: Extension + Default + 'static>() -> Result<Box<dyn Extension>, String> {
    Ok(Box::new(T::default()))
}

/// Collects the extension types a module exports.
#[derive(Debug, Default)]
pub struct ExtensionExports {
    exports: Vec<ExportedExtension>,
}

impl ExtensionExports {
    /// Exports an extension type with a custom factory.
    pub fn register(&mut self, type_name: &'static str, factory: ExtensionFactory) {
        self.exports.push(ExportedExtension { type_name, factory });
    }

    /// Exports `T` through its `Default` implementation.
    pub fn register_default<T: Extension + Default + 'static>(&mut self) {
        self.exports.push(ExportedExtension::of::<T>());
    }

    /// Returns the collected exports in registration order.
    pub fn into_vec(self) -> Vec<ExportedExtension> {
        self.exports
    }
}

/// The static a module exports to describe itself.
///
/// The layout is fixed with `abi_version` at offset zero, so the host can
/// read the version of any module before trusting the remaining fields.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ModuleDeclaration {
    /// Must equal [`MEW_ABI_VERSION`].
    pub abi_version: u32,
    /// `mew-runtime` version the module was built against.
    pub runtime_version: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Base names of modules that must be loaded alongside this one.
    pub dependencies: &'static [&'static str],
    /// Fills in the exported extension types.
    pub register: fn(&mut ExtensionExports),
}

impl ModuleDeclaration {
    /// Returns whether the declaration matches this host's ABI.
    pub fn is_compatible(&self) -> bool {
        self.abi_version == MEW_ABI_VERSION
    }

    /// Returns the exported extension types.
    pub fn exports(&self) -> Vec<ExportedExtension> {
        let mut exports = ExtensionExports::default();
        (self.register)(&mut exports);
        exports.into_vec()
    }
}
