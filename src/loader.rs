//! Locating plugin images on disk.

use std::ffi::OsStr ;
use std::path::{ Path, PathBuf };
use itertools::{ Either, Itertools };
use pipe_trait::Pipe ;
use tracing::{ debug, warn };

use crate::{ LoadError, Module, ModuleInfo };



/// Environment variable holding extra search directories, separated like `PATH`.
pub const SEARCH_PATH_ENV: &str = "DYLIB_LINK_PATH" ;

/// An operation that completed but skipped some items; the skipped items' errors
/// are returned alongside the result.
pub type PartialSuccess<T, E> = ( T, Vec<E> );

/// Resolves plugin names to files and loads them.
///
/// A bare name such as `"calc"` is searched for in each configured directory,
/// first verbatim and then as the platform library file name (`libcalc.so`,
/// `libcalc.dylib`, `calc.dll`). Anything containing a path separator is used
/// as given. If no directory has a match, the platform file name is handed to
/// the system loader, which applies its own search rules.
///
/// ```no_run
/// use dylib_link::Loader ;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = Loader::new()
/// 	.with_search_path( "/opt/app/plugins" )
/// 	.with_env_search_paths();
/// let mut module = loader.load( "calc" )?;
/// module.unload()?;
/// # Ok(())
/// # }
/// ```
#[derive( Debug, Clone, Default )]
pub struct Loader {
	search_paths: Vec<PathBuf>,
}

impl Loader {

	pub fn new() -> Self { Self::default() }

	/// Appends a directory to search.
	pub fn with_search_path( mut self, directory: impl Into<PathBuf> ) -> Self {
		self.search_paths.push( directory.into() );
		self
	}

	/// Appends several directories to search, in order.
	pub fn with_search_paths( mut self, directories: impl IntoIterator<Item = impl Into<PathBuf>> ) -> Self {
		self.search_paths.extend( directories.into_iter().map( Into::into ));
		self
	}

	/// Appends the directories listed in [`SEARCH_PATH_ENV`], if it is set.
	pub fn with_env_search_paths( self ) -> Self {
		match std::env::var_os( SEARCH_PATH_ENV ) {
			Some( value ) => std::env::split_paths( &value )
				.filter(| path | !path.as_os_str().is_empty() )
				.collect::<Vec<_>>()
				.pipe(| paths | self.with_search_paths( paths )),
			None => self,
		}
	}

	#[inline] pub fn search_paths( &self ) -> &[PathBuf] { &self.search_paths }

	/// The file [`Loader::load`] would open for `name`.
	pub fn locate( &self, name: impl AsRef<Path> ) -> PathBuf {
		let name = name.as_ref();
		if name.is_absolute() || name.components().count() > 1 {
			return name.to_path_buf();
		}
		let file_name = PathBuf::from( libloading::library_filename( name.as_os_str() ));
		let found = self.search_paths.iter()
			.flat_map(| directory | [ directory.join( name ), directory.join( &file_name )])
			.find(| candidate | candidate.is_file() );
		found.unwrap_or_else(|| match name.extension() {
				Some( _ ) => name.to_path_buf(),
				None => file_name,
			})
	}

	/// Locates and loads a plugin.
	///
	/// # Errors
	/// See [`Module::load`].
	pub fn load( &self, name: impl AsRef<Path> ) -> Result<Module, LoadError> {
		let path = self.locate( name );
		debug!( path = %path.display(), "Loading module" );
		Module::load( path )
	}

	/// Locates a plugin and reads its metadata without initialising it.
	///
	/// # Errors
	/// See [`Module::info_from_path`].
	pub fn info( &self, name: impl AsRef<Path> ) -> Result<ModuleInfo, LoadError> {
		Module::info_from_path( self.locate( name ))
	}

	/// Reads the metadata of every shared library in the search directories.
	///
	/// Files that fail to open or lack the plugin exports are skipped and their
	/// errors collected; unreadable directories are skipped with a warning.
	pub fn discover( &self ) -> PartialSuccess<Vec<( PathBuf, ModuleInfo )>, LoadError> {
		self.search_paths.iter()
			.flat_map(| directory | match std::fs::read_dir( directory ) {
				Ok( entries ) => entries.filter_map( Result::ok ).map(| entry | entry.path() ).collect::<Vec<_>>(),
				Err( err ) => {
					warn!( directory = %directory.display(), error = %err, "Skipping unreadable search directory" );
					Vec::new()
				}
			})
			.filter(| path | path.is_file() && path.extension() == Some( OsStr::new( std::env::consts::DLL_EXTENSION )))
			.sorted()
			.dedup()
			.partition_map(| path | match Module::info_from_path( &path ) {
				Ok( info ) => Either::Left(( path, info )),
				Err( err ) => {
					debug!( path = %path.display(), error = %err, "Not a plugin" );
					Either::Right( err )
				}
			})
	}

}
