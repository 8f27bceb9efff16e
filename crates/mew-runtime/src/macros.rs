//! Convenience macros for extension development.

/// Declares the module exported by an extension `cdylib`.
///
/// Emits the `mew_module_declaration` static the host looks up, exporting
/// each listed type through its `Default` implementation.
///
/// # Example
/// ```rust,ignore
/// mew_runtime::declare_module! {
///     name: "history",
///     dependencies: ["common"],
///     extensions: [HistoryExtension],
/// }
/// ```
#[macro_export]
macro_rules! declare_module {
    (
        name: $name:expr,
        extensions: [$($ext:ty),* $(,)?] $(,)?
    ) => {
        $crate::declare_module! {
            name: $name,
            dependencies: [],
            extensions: [$($ext),*],
        }
    };
    (
        name: $name:expr,
        dependencies: [$($dep:expr),* $(,)?],
        extensions: [$($ext:ty),* $(,)?] $(,)?
    ) => {
        #[doc(hidden)]
        fn __mew_register_extensions(exports: &mut $crate::loader::ExtensionExports) {
            $(exports.register_default::<$ext>();)*
        }

        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[unsafe(no_mangle)]
        pub static mew_module_declaration: $crate::loader::ModuleDeclaration =
            $crate::loader::ModuleDeclaration {
                abi_version: $crate::loader::MEW_ABI_VERSION,
                runtime_version: $crate::RUNTIME_VERSION,
                name: $name,
                dependencies: &[$($dep),*],
                register: __mew_register_extensions,
            };
    };
}

/// Builds an [`ExtensionInfo`](crate::extension::ExtensionInfo).
///
/// An unparsable version string yields `0.0.0`.
///
/// # Example
/// ```rust,ignore
/// fn info(&self) -> ExtensionInfo {
///     extension_info!(
///         name: "History",
///         version: env!("CARGO_PKG_VERSION"),
///         author: "Project Mew Team",
///         description: "Records command lines"
///     )
/// }
/// ```
#[macro_export]
macro_rules! extension_info {
    (
        name: $name:expr,
        version: $version:expr,
        author: $author:expr,
        description: $desc:expr
        $(, update_url: $url:expr)? $(,)?
    ) => {
        $crate::extension::ExtensionInfo {
            name: $name.to_string(),
            version: $crate::semver::Version::parse($version)
                .unwrap_or_else(|_| $crate::semver::Version::new(0, 0, 0)),
            author: $author.to_string(),
            description: $desc.to_string(),
            update_url: None $(.or(Some($url.to_string())))?,
        }
    };
}
