//! Dynamic module backend using `libloading`.

use std::path::Path;

use libloading::Library;
use tracing::{debug, warn};

use mew_core::error::{AppError, ErrorKind};
use mew_core::result::AppResult;

use super::abi::{MEW_ABI_VERSION, MODULE_DECLARATION_SYMBOL, ModuleDeclaration};
use super::{LoadedModule, ModuleBackend, has_native_header};

/// Opens modules as shared libraries.
///
/// Files without a native image header, libraries without a module
/// declaration, and declarations of another ABI version are reported as
/// unrecognized. A native library that fails to open is an error.
#[derive(Debug, Default)]
pub struct LibraryBackend;

impl ModuleBackend for LibraryBackend {
    fn open(&self, name: &str, path: &Path) -> AppResult<Option<LoadedModule>> {
        if !has_native_header(path)? {
            debug!(path = %path.display(), "No native image header");
            return Ok(None);
        }

        // SAFETY: opening a library runs its initializers; the module
        // directory is trusted operator configuration.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            AppError::with_source(
                ErrorKind::ModuleLoad,
                format!("Failed to open module library '{}'", path.display()),
                e,
            )
        })?;

        let declaration_ptr = match unsafe { library.get::<*const ModuleDeclaration>(MODULE_DECLARATION_SYMBOL) } {
            Ok(symbol) => *symbol,
            Err(e) => {
                warn!(
                    module = %name,
                    path = %path.display(),
                    error = %e,
                    "Library exports no module declaration"
                );
                return Ok(None);
            }
        };

        // SAFETY: the symbol is the `#[repr(C)]` static emitted by
        // `declare_module!`; `abi_version` sits at offset zero in every
        // layout version, so only that field is read before the check.
        let abi_version = unsafe { std::ptr::addr_of!((*declaration_ptr).abi_version).read() };
        if abi_version != MEW_ABI_VERSION {
            warn!(
                module = %name,
                abi_version,
                expected = MEW_ABI_VERSION,
                "Module ABI version mismatch"
            );
            return Ok(None);
        }

        // SAFETY: same ABI version, so the full layout matches; copied out
        // while the library is still mapped.
        let declaration = unsafe { *declaration_ptr };
        Ok(Some(LoadedModule::new(name, path, declaration).with_library(library)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_native_file_is_unrecognized() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp
            .path()
            .join(format!("notes.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&path, b"just some text").expect("write");

        let opened = LibraryBackend.open("notes", &path).expect("open");
        assert!(opened.is_none());
    }

    #[test]
    fn test_truncated_native_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp
            .path()
            .join(format!("broken.{}", std::env::consts::DLL_EXTENSION));
        std::fs::write(&path, b"\x7FELF").expect("write");

        let err = LibraryBackend.open("broken", &path).expect_err("truncated image");
        assert_eq!(err.kind, ErrorKind::ModuleLoad);
    }
}
