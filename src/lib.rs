//! A native plugin runtime: load shared libraries at run time and call their
//! functions through one uniform convention.
//!
//! Every callable plugin function has the same signature. It receives a single
//! bundle of named, typed arguments and may leave one typed value in a return
//! slot. Adding a function therefore never requires the host to know its native
//! signature: the caller names the function, names its arguments and states the
//! kind of value it expects back.
//!
//! # Core Concepts
//!
//! - [`Value`]: A reference-counted, immutable value tagged with a [`Kind`].
//! 	Integers of every width, floats, booleans, strings and raw pointers.
//!
//! - [`ArgumentBundle`]: The named arguments of one call, assembled with
//! 	[`ArgumentBundle::begin`]. Names are unique and the count is checked.
//!
//! - [`Module`]: A loaded and initialised plugin image. Created by
//! 	[`Module::load`] or [`Loader::load`], released by [`Module::unload`].
//!
//! - [`Export`]: A resolved plugin function, ready to call.
//!
//! - [`ApiManifest`]: The optional JSON document a plugin publishes to declare
//! 	its functions. Declared functions are resolved at load time and calls to
//! 	them are validated before the plugin runs.
//!
//! # Plugin Contract
//!
//! A plugin is a shared library exporting, unmangled:
//!
//! - `plugin_name`, `plugin_version`, `plugin_author`, `plugin_description`:
//! 	`extern "C" fn() -> *const c_char`, returning static NUL-terminated text.
//! - `plugin_init`: `extern "C" fn() -> c_int`, zero on success.
//! - `plugin_uninit`: `extern "C" fn()`.
//! - optionally `plugin_api`: `extern "C" fn() -> *const c_char`, returning the manifest.
//! - any number of callable functions: `extern "C" fn( *mut RawBundle )`.
//!
//! Plugins written in Rust get all of this from [`export_plugin!`] and
//! [`export_function!`]; see [`callee`].
//!
//! # Example
//!
//! Functions compiled into the host follow the same convention, which makes
//! the round trip easy to see without a shared library:
//!
//! ```
//! use dylib_link::{ export_function, ArgumentBundle, Call, CalleeError, Export, Kind };
//!
//! fn double( call: &mut Call ) -> Result<(), CalleeError> {
//! 	let n: i64 = call.arg( "n" )?;
//! 	call.set_return( n * 2 )
//! }
//!
//! export_function!( doc_double => double );
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut arguments = ArgumentBundle::begin( 1 );
//! arguments.add_scalar( "n", Kind::I64, 21_i64 )?;
//! let arguments = arguments.finish()?;
//!
//! let value = Export::from_fn( "double", doc_double ).call( Some( Kind::I64 ), &arguments )?;
//! assert_eq!( value.as_i64(), Some( 42 ));
//! # Ok(())
//! # }
//! ```
//!
//! Loading a plugin from disk:
//!
//! ```no_run
//! use dylib_link::{ Loader, Kind };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut module = Loader::new().with_env_search_paths().load( "calc" )?;
//! println!( "{} {}", module.info().name, module.info().version );
//!
//! let value = module.call_with( "add_one", Some( Kind::I32 ), 1, [( "n", Kind::I32, 41 )])?;
//! assert_eq!( value.as_i32(), Some( 42 ));
//!
//! module.unload()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Ownership
//!
//! Strings and owned pointer copies are freed when the last [`Value`] holding
//! them is dropped. A borrowed pointer is never freed by this crate. Strings and
//! owned pointers returned by a plugin are copied into host memory before the
//! call returns, so they stay valid after the plugin is unloaded. A borrowed
//! pointer returned by a plugin keeps the plugin's address and must not be
//! used once that plugin is unloaded.
//!
//! # Logging
//!
//! Loading, unloading and call failures are reported through [`tracing`]. Install
//! any subscriber to see them.

mod kind ;
mod value ;
mod arguments ;
mod frame ;
mod dispatch ;
mod manifest ;
mod module ;
mod loader ;
pub mod abi ;
pub mod callee ;

pub use kind::{ Kind, UnknownKind };
pub use value::{ Value, WeakValue, Payload, RawPointer, Scalar };
pub use arguments::{ Argument, ArgumentBundle, ArgumentBuilder, ArgumentError };
pub use frame::ReturnSlot ;
pub use dispatch::{ Export, DispatchError };
pub use manifest::{ ApiManifest, FunctionDecl, ArgumentDecl, ManifestError };
pub use module::{ Module, ModuleInfo, ModuleState, LoadError, UnloadError };
pub use loader::{ Loader, PartialSuccess, SEARCH_PATH_ENV };
pub use callee::{ Call, CalleeError, PointerArg };
