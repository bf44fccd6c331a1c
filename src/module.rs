//! Loading, initialising and unloading a single plugin image.

use std::collections::HashMap ;
use std::ffi::CStr ;
use std::path::{ Path, PathBuf };
use libloading::Library ;
use thiserror::Error ;
use tracing::{ debug, info, warn };

use crate::{ ApiManifest, DispatchError, Export, FunctionDecl, ManifestError };
use crate::abi::{ symbols, ExportFn, InitFn, MetadataFn, UninitFn };



/// Errors raised while bringing a plugin into memory.
///
/// Every failure after the image was opened closes it again before returning,
/// so a failed load never leaves a handle behind.
#[derive( Error, Debug )]
pub enum LoadError {
	#[error( "Failed to open module {path}: {source}" )]
	ModuleOpenFailed { path: PathBuf, #[source] source: libloading::Error },
	#[error( "Missing mandatory export {symbol}: {source}" )]
	MissingMandatoryExport { symbol: String, #[source] source: libloading::Error },
	#[error( "Export {symbol} returned null or non UTF-8 text" )]
	InvalidMetadata { symbol: &'static str },
	#[error( "Invalid API manifest: {0}" )]
	InvalidManifest( #[from] ManifestError ),
	#[error( "Initialisation of {module} failed with status {status}" )]
	InitFailed { module: String, status: i32 },
}

/// Errors raised while tearing a plugin down.
#[derive( Error, Debug )]
pub enum UnloadError {
	#[error( "Module was already unloaded" )]
	UnloadOfUnloadedHandle,
	#[error( "Failed to close module: {0}" )]
	CloseFailed( #[source] libloading::Error ),
}

/// Descriptive metadata copied out of a plugin.
///
/// Owned by the host, so it stays valid after the plugin is unloaded.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ModuleInfo {
	pub name: String,
	pub version: String,
	pub author: String,
	pub description: String,
	/// The declared API, if the plugin publishes one.
	pub api: Option<ApiManifest>,
}

/// Lifecycle of a [`Module`].
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum ModuleState {
	/// Initialisation succeeded; exports may be called.
	Initialized,
	/// Uninitialisation ran and the image was released.
	Finalized,
}

impl std::fmt::Display for ModuleState {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Initialized => write!( f, "initialized" ),
			Self::Finalized => write!( f, "finalized" ),
		}
	}
}

/// A loaded plugin.
///
/// A module is created initialised by [`Module::load`] and must be torn down
/// explicitly with [`Module::unload`]. Calls take `&self`, so one module can be
/// shared between threads; whether concurrent calls into the same plugin are
/// sound is up to the plugin.
///
/// Dropping a module that was never unloaded logs a warning and leaves the
/// image mapped without running `plugin_uninit`.
#[derive( Debug )]
pub struct Module {
	path: PathBuf,
	info: ModuleInfo,
	library: Option<Library>,
	uninit: UninitFn,
	exports: HashMap<String, ExportFn>,
	state: ModuleState,
}

impl Module {

	/// Opens the image at `path`, reads its metadata, resolves declared
	/// functions and runs `plugin_init`.
	///
	/// # Errors
	/// See [`LoadError`]. The image is closed again on every error.
	pub fn load( path: impl AsRef<Path> ) -> Result<Self, LoadError> {
		let path = path.as_ref();
		let library = open( path )?;
		let info = read_info( &library )?;

		let init = resolve_mandatory::<InitFn>( &library, symbols::INIT )?;
		let uninit = resolve_mandatory::<UninitFn>( &library, symbols::UNINIT )?;
		let exports = resolve_declared( &library, &info )?;

		// SAFETY: `plugin_init` follows the plugin contract.
		let status = unsafe { init() };
		if status != 0 {
			warn!( module = %info.name, path = %path.display(), status, "Module initialisation failed" );
			return Err( LoadError::InitFailed { module: info.name, status });
		}

		info!( module = %info.name, version = %info.version, path = %path.display(), exports = exports.len(), "Loaded module" );
		Ok( Self {
			path: path.to_path_buf(),
			info,
			library: Some( library ),
			uninit,
			exports,
			state: ModuleState::Initialized,
		})
	}

	/// Reads a plugin's metadata without running its initialisation.
	///
	/// # Errors
	/// Fails like [`Module::load`] does before initialisation.
	pub fn info_from_path( path: impl AsRef<Path> ) -> Result<ModuleInfo, LoadError> {
		let library = open( path.as_ref() )?;
		let info = read_info( &library )?;
		if let Err( err ) = library.close() {
			warn!( path = %path.as_ref().display(), error = %err, "Failed to close module after reading its metadata" );
		}
		Ok( info )
	}

	/// Runs `plugin_uninit` and closes the image.
	///
	/// # Errors
	/// [`UnloadError::UnloadOfUnloadedHandle`] on a second call;
	/// [`UnloadError::CloseFailed`] if the loader refuses to close the image, in
	/// which case the module is still finalized.
	pub fn unload( &mut self ) -> Result<(), UnloadError> {
		let library = self.library.take().ok_or( UnloadError::UnloadOfUnloadedHandle )?;
		// SAFETY: `plugin_uninit` follows the plugin contract and the image is still mapped.
		unsafe { ( self.uninit )() };
		self.exports.clear();
		self.state = ModuleState::Finalized ;
		library.close().map_err( UnloadError::CloseFailed )?;
		info!( module = %self.info.name, "Unloaded module" );
		Ok(())
	}

	/// Finds a callable export.
	///
	/// Declared functions come from the table filled at load time; any other
	/// name is looked up in the image on demand.
	///
	/// # Errors
	/// [`DispatchError::ModuleNotInitialized`] after unload,
	/// [`DispatchError::SymbolNotFound`] if the image has no such export.
	pub fn resolve( &self, function: &str ) -> Result<Export<'_>, DispatchError> {
		let library = match ( self.state, self.library.as_ref() ) {
			( ModuleState::Initialized, Some( library )) => library,
			_ => return Err( DispatchError::ModuleNotInitialized { module: self.info.name.clone() }),
		};
		let declaration = self.info.api.as_ref().and_then(| api | api.function( function ));

		if symbols::RESERVED.contains( &function ) {
			return Err( self.symbol_not_found( function ));
		}
		if let Some( func ) = self.exports.get( function ) {
			return Ok( Export::new( function, *func, declaration ));
		}
		// SAFETY: non-reserved exports follow the single-bundle calling convention.
		match unsafe { library.get::<ExportFn>( function.as_bytes() )} {
			Ok( symbol ) => Ok( Export::new( function, *symbol, declaration )),
			Err( err ) => {
				debug!( module = %self.info.name, function, error = %err, "Symbol lookup failed" );
				Err( self.symbol_not_found( function ))
			}
		}
	}

	fn symbol_not_found( &self, function: &str ) -> DispatchError {
		DispatchError::SymbolNotFound { module: self.info.name.clone(), function: function.to_string() }
	}

	#[inline] pub fn info( &self ) -> &ModuleInfo { &self.info }

	/// Functions declared in the module's API manifest; empty without one.
	pub fn functions( &self ) -> &[FunctionDecl] {
		self.info.api.as_ref().map(| api | api.functions.as_slice() ).unwrap_or_default()
	}

	#[inline] pub fn name( &self ) -> &str { &self.info.name }
	#[inline] pub fn path( &self ) -> &Path { &self.path }
	#[inline] pub fn state( &self ) -> ModuleState { self.state }

}

impl Drop for Module {
	fn drop( &mut self ) {
		if let Some( library ) = self.library.take() {
			warn!( module = %self.info.name, path = %self.path.display(), "Module dropped without unload; leaving it mapped" );
			std::mem::forget( library );
		}
	}
}

fn open( path: &Path ) -> Result<Library, LoadError> {
	// SAFETY: loading runs the image's static constructors; trusting them is the
	// caller's decision when it names the path.
	unsafe { Library::new( path )}.map_err(| source | {
		warn!( path = %path.display(), error = %source, "Failed to open module" );
		LoadError::ModuleOpenFailed { path: path.to_path_buf(), source }
	})
}

fn resolve_mandatory<T: Copy>( library: &Library, symbol: &str ) -> Result<T, LoadError> {
	// SAFETY: `T` is the signature the plugin contract fixes for `symbol`.
	unsafe { library.get::<T>( symbol.as_bytes() )}
		.map(| symbol | *symbol )
		.map_err(| source | LoadError::MissingMandatoryExport { symbol: symbol.to_string(), source })
}

fn read_text( library: &Library, symbol: &'static str ) -> Result<String, LoadError> {
	let func = resolve_mandatory::<MetadataFn>( library, symbol )?;
	// SAFETY: metadata exports return a static NUL-terminated string or null.
	let ptr = unsafe { func() };
	if ptr.is_null() { return Err( LoadError::InvalidMetadata { symbol }) }
	unsafe { CStr::from_ptr( ptr )}
		.to_str()
		.map( str::to_string )
		.map_err(|_| LoadError::InvalidMetadata { symbol })
}

fn read_info( library: &Library ) -> Result<ModuleInfo, LoadError> {
	Ok( ModuleInfo {
		name: read_text( library, symbols::NAME )?,
		version: read_text( library, symbols::VERSION )?,
		author: read_text( library, symbols::AUTHOR )?,
		description: read_text( library, symbols::DESCRIPTION )?,
		api: read_manifest( library )?,
	})
}

fn read_manifest( library: &Library ) -> Result<Option<ApiManifest>, LoadError> {
	match resolve_mandatory::<MetadataFn>( library, symbols::API ) {
		Ok( _ ) => Ok( Some( ApiManifest::parse( &read_text( library, symbols::API )? )? )),
		Err( _ ) => Ok( None ),
	}
}

fn resolve_declared( library: &Library, info: &ModuleInfo ) -> Result<HashMap<String, ExportFn>, LoadError> {
	info.api.iter()
		.flat_map(| api | api.functions.iter() )
		.map(| function | resolve_mandatory::<ExportFn>( library, &function.name ).map(| func | ( function.name.clone(), func )))
		.collect()
}
