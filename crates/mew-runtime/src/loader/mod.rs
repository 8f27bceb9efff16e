//! Module discovery, loading, and the process-wide module cache.
//!
//! Modules are files in the configured directory whose extension is the
//! platform's shared library extension `E` or `E-plugin`. Each is opened
//! at most once per process and cached by base name; dependency resolution
//! goes through the same cache.

pub mod abi;
#[cfg(feature = "dynamic")]
pub mod dynamic;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use mew_core::error::{AppError, ErrorKind};
use mew_core::result::AppResult;

pub use abi::{
    ExportedExtension, ExtensionExports, ExtensionFactory, MEW_ABI_VERSION,
    MODULE_DECLARATION_SYMBOL, ModuleDeclaration,
};
#[cfg(feature = "dynamic")]
pub use dynamic::LibraryBackend;

/// Returns the two module file extensions for this platform.
pub fn module_extensions() -> [String; 2] {
    let ext = std::env::consts::DLL_EXTENSION;
    [ext.to_string(), format!("{ext}-plugin")]
}

fn base_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Returns whether `magic` starts an ELF, PE, or Mach-O image.
pub fn is_native_magic(magic: &[u8]) -> bool {
    matches!(
        magic,
        [0x7F, b'E', b'L', b'F', ..]
            | [b'M', b'Z', ..]
            | [0xFE, 0xED, 0xFA, 0xCE | 0xCF, ..]
            | [0xCE | 0xCF, 0xFA, 0xED, 0xFE, ..]
            | [0xCA, 0xFE, 0xBA, 0xBE, ..]
    )
}

/// Returns whether the file at `path` carries a native image header.
pub fn has_native_header(path: &Path) -> AppResult<bool> {
    let mut magic = Vec::with_capacity(4);
    std::fs::File::open(path)?.take(4).read_to_end(&mut magic)?;
    Ok(is_native_magic(&magic))
}

/// A module opened by a [`ModuleBackend`].
pub struct LoadedModule {
    name: String,
    path: PathBuf,
    declaration: ModuleDeclaration,
    _library: Option<Box<dyn Any + Send + Sync>>,
}

impl LoadedModule {
    /// Creates a module record without a library handle.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, declaration: ModuleDeclaration) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            declaration,
            _library: None,
        }
    }

    /// Attaches the handle keeping the module's code mapped.
    pub fn with_library(mut self, library: impl Any + Send + Sync) -> Self {
        self._library = Some(Box::new(library));
        self
    }

    /// Returns the base name the module is cached under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file the module was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the module declaration.
    pub fn declaration(&self) -> &ModuleDeclaration {
        &self.declaration
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("declared_name", &self.declaration.name)
            .field("has_library", &self._library.is_some())
            .finish()
    }
}

/// Opens module files.
pub trait ModuleBackend: Send + Sync + fmt::Debug {
    /// Opens the module at `path`, cached as `name`.
    ///
    /// Returns `Ok(None)` when the file is not a module this backend
    /// recognizes; such files are skipped. Any other failure is an error.
    fn open(&self, name: &str, path: &Path) -> AppResult<Option<LoadedModule>>;
}

/// Backend resolving module files against declarations linked into the
/// host, for targets without dynamic loading and for tests.
#[derive(Debug, Default)]
pub struct StaticBackend {
    modules: HashMap<String, ModuleDeclaration>,
}

impl StaticBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `declaration` available under base name `name`.
    pub fn with_module(mut self, name: impl Into<String>, declaration: ModuleDeclaration) -> Self {
        self.modules.insert(name.into(), declaration);
        self
    }
}

impl ModuleBackend for StaticBackend {
    fn open(&self, name: &str, path: &Path) -> AppResult<Option<LoadedModule>> {
        let Some(declaration) = self.modules.get(name).copied() else {
            return Ok(None);
        };
        if !declaration.is_compatible() {
            warn!(
                module = %name,
                abi_version = declaration.abi_version,
                expected = MEW_ABI_VERSION,
                "Module ABI version mismatch"
            );
            return Ok(None);
        }
        Ok(Some(LoadedModule::new(name, path, declaration)))
    }
}

/// Backend used when the host was built without dynamic loading.
#[derive(Debug, Default)]
pub struct UnsupportedBackend;

impl ModuleBackend for UnsupportedBackend {
    fn open(&self, name: &str, path: &Path) -> AppResult<Option<LoadedModule>> {
        warn!(
            module = %name,
            path = %path.display(),
            "Host built without dynamic module support; skipping"
        );
        Ok(None)
    }
}

/// Returns the backend matching the enabled features.
pub fn default_backend() -> Arc<dyn ModuleBackend> {
    #[cfg(feature = "dynamic")]
    {
        Arc::new(LibraryBackend)
    }
    #[cfg(not(feature = "dynamic"))]
    {
        Arc::new(UnsupportedBackend)
    }
}

/// Cache of opened modules, keyed by base name.
///
/// Entries are never evicted. A module is cached before its dependencies
/// are resolved, so dependency cycles terminate.
#[derive(Debug)]
pub struct ModuleCache {
    directory: PathBuf,
    backend: Arc<dyn ModuleBackend>,
    modules: HashMap<String, Arc<LoadedModule>>,
}

impl ModuleCache {
    /// Creates an empty cache over `directory`.
    pub fn new(directory: impl Into<PathBuf>, backend: Arc<dyn ModuleBackend>) -> Self {
        Self {
            directory: directory.into(),
            backend,
            modules: HashMap::new(),
        }
    }

    /// Returns the module directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the cached module named `name`.
    pub fn get(&self, name: &str) -> Option<Arc<LoadedModule>> {
        self.modules.get(name).cloned()
    }

    /// Returns the number of cached modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns whether no module is cached.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Lists module files in the directory: every `E` file, then every
    /// `E-plugin` file, each group sorted by file name.
    pub fn discover(&self) -> AppResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut found = Vec::new();
        for ext in module_extensions() {
            found.extend(
                files
                    .iter()
                    .filter(|path| {
                        path.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case(&ext))
                    })
                    .cloned(),
            );
        }
        Ok(found)
    }

    /// Opens every module in the directory, creating the directory when it
    /// does not exist.
    ///
    /// Unrecognized files are skipped. Any other failure aborts the scan.
    /// Each base name is returned at most once, whether it was opened here
    /// or earlier as a dependency.
    pub fn scan(&mut self) -> AppResult<Vec<Arc<LoadedModule>>> {
        if !self.directory.exists() {
            std::fs::create_dir_all(&self.directory)?;
            info!(directory = %self.directory.display(), "Created module directory");
            return Ok(Vec::new());
        }

        let mut modules = Vec::new();
        let mut seen = HashSet::new();
        for path in self.discover()? {
            let Some(name) = base_name(&path) else {
                continue;
            };
            if !seen.insert(name.clone()) {
                warn!(
                    module = %name,
                    path = %path.display(),
                    "A module with this base name was already scanned; skipping"
                );
                continue;
            }

            let loaded = self.load(&name, &path).map_err(|e| {
                AppError::with_source(
                    ErrorKind::ModuleLoad,
                    format!("Failed to load module \"{}\"", path.display()),
                    e,
                )
            })?;
            modules.extend(loaded);
        }

        debug!(count = modules.len(), "Module scan complete");
        Ok(modules)
    }

    /// Opens the module at `path` under `name`, or returns the cached one.
    pub fn load(&mut self, name: &str, path: &Path) -> AppResult<Option<Arc<LoadedModule>>> {
        if let Some(module) = self.get(name) {
            return Ok(Some(module));
        }

        let Some(module) = self.backend.open(name, path)? else {
            warn!(module = %name, path = %path.display(), "Not a loadable module; skipping");
            return Ok(None);
        };

        let module = Arc::new(module);
        self.modules.insert(name.to_string(), module.clone());
        info!(
            module = %name,
            declared_name = %module.declaration().name,
            runtime_version = %module.declaration().runtime_version,
            path = %path.display(),
            "Module loaded"
        );

        for dependency in module.declaration().dependencies {
            self.resolve(dependency).map_err(|e| {
                AppError::module_load(format!(
                    "Module \"{name}\" depends on \"{dependency}\": {}",
                    e.message
                ))
            })?;
        }

        Ok(Some(module))
    }

    /// Returns the module named `name`, opening `<dir>/<name>.E` or
    /// `<dir>/<name>.E-plugin` if it is not cached yet.
    pub fn resolve(&mut self, name: &str) -> AppResult<Arc<LoadedModule>> {
        if let Some(module) = self.get(name) {
            return Ok(module);
        }

        for ext in module_extensions() {
            let candidate = self.directory.join(format!("{name}.{ext}"));
            if candidate.is_file() {
                return self.load(name, &candidate)?.ok_or_else(|| {
                    AppError::module_load(format!(
                        "\"{}\" is not a loadable module",
                        candidate.display()
                    ))
                });
            }
        }

        Err(AppError::module_load(format!(
            "Could not find module \"{name}\" in {}",
            self.directory.display()
        )))
    }
}
