#[macro_export]
macro_rules! fixtures {
	{ plugins = [ $( $field:ident: $package:literal ),* $(,)? ]; } => ( mod fixtures {

		#[allow( dead_code )]
		pub struct Plugins { $( pub $field: std::path::PathBuf ),* }

		#[allow( dead_code )]
		pub fn plugins() -> Plugins {
			$crate::fixture_building::init_logging();
			Plugins { $( $field: $crate::fixture_building::build( $package ) ),* }
		}

	});
}

#[allow( dead_code )]
mod fixture_building {

	use std::collections::HashMap ;
	use std::path::PathBuf ;
	use std::process::Command ;
	use std::sync::{ Mutex, PoisonError };
	use once_cell::sync::Lazy ;

	static BUILT: Lazy<Mutex<HashMap<&'static str, PathBuf>>> = Lazy::new(|| Mutex::new( HashMap::new() ));

	pub fn fixtures_target_dir() -> PathBuf {
		PathBuf::from( env!( "CARGO_TARGET_TMPDIR" )).join( "fixtures" )
	}

	/// Builds the fixture crate `package` once per test binary and returns the
	/// path of its shared library.
	pub fn build( package: &'static str ) -> PathBuf {
		let mut built = BUILT.lock().unwrap_or_else( PoisonError::into_inner );
		if let Some( path ) = built.get( package ) { return path.clone() }

		let target_dir = fixtures_target_dir();
		let cargo = std::env::var( "CARGO" ).unwrap_or_else(|_| "cargo".to_string() );
		let status = Command::new( cargo )
			.args([ "build", "--quiet", "--package", package, "--target-dir" ])
			.arg( &target_dir )
			.current_dir( env!( "CARGO_MANIFEST_DIR" ))
			.status()
			.expect( "Failed to run cargo" );
		assert!( status.success(), "Failed to build fixture {}", package );

		let path = target_dir.join( "debug" ).join( libloading::library_filename( package.replace( '-', "_" )));
		assert!( path.is_file(), "Fixture {} not found at {}", package, path.display() );
		built.insert( package, path.clone() );
		path
	}

	/// A copy of a built fixture under a fresh directory, for tests that need a
	/// search path of their own.
	pub fn isolated_copy( source: &std::path::Path, directory: &str ) -> PathBuf {
		let target = fixtures_target_dir().join( "isolated" ).join( directory );
		std::fs::create_dir_all( &target ).expect( "Failed to create fixture directory" );
		let destination = target.join( source.file_name().expect( "Fixture has no file name" ));
		std::fs::copy( source, &destination ).expect( "Failed to copy fixture" );
		destination
	}

	pub fn init_logging() {
		let _ = tracing_subscriber::fmt()
			.with_env_filter( tracing_subscriber::EnvFilter::from_default_env() )
			.with_test_writer()
			.try_init();
	}

}
