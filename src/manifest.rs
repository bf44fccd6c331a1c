//! The JSON document a plugin may publish through `plugin_api` to declare
//! its callable functions.
//!
//! ```json
//! { "API": [
//!     { "name": "add_one", "return_type": "int", "args": [ { "name": "n", "type": "int" } ] }
//! ] }
//! ```
//!
//! Declared functions are resolved eagerly at load time, and calls to them are
//! checked against their declaration before the plugin runs.

use itertools::Itertools ;
use serde::{ Deserialize, Serialize };

use crate::{ Kind, ArgumentBundle, ArgumentError, DispatchError };
use crate::abi::symbols ;



/// Functions a plugin declares.
#[derive( Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize )]
pub struct ApiManifest {
	#[serde( rename = "API", default )]
	pub functions: Vec<FunctionDecl>,
}

/// One declared function.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct FunctionDecl {
	pub name: String,
	#[serde( default )]
	pub return_type: Kind,
	#[serde( default )]
	pub args: Vec<ArgumentDecl>,
}

/// One declared argument.
#[derive( Debug, Clone, PartialEq, Eq, Serialize, Deserialize )]
pub struct ArgumentDecl {
	pub name: String,
	#[serde( rename = "type" )]
	pub kind: Kind,
}

/// Why a manifest was refused.
#[derive( thiserror::Error, Debug )]
pub enum ManifestError {
	#[error( "Malformed manifest: {0}" )] Malformed( #[from] serde_json::Error ),
	#[error( "Function declared twice: {0}" )] DuplicateFunction( String ),
	#[error( "Argument {argument} declared twice in {function}" )] DuplicateArgument { function: String, argument: String },
	#[error( "Reserved symbol declared as a function: {0}" )] ReservedName( String ),
}

impl ApiManifest {

	/// Parses and checks a manifest.
	///
	/// # Errors
	/// Fails on malformed JSON, unknown kind tokens, duplicate names, or a
	/// declared lifecycle or metadata symbol.
	pub fn parse( text: &str ) -> Result<Self, ManifestError> {
		let manifest: Self = serde_json::from_str( text )?;
		if let Some( function ) = manifest.functions.iter().find(| function | symbols::RESERVED.contains( &function.name.as_str() )) {
			return Err( ManifestError::ReservedName( function.name.clone() ));
		}
		if let Some( name ) = manifest.functions.iter().map(| function | function.name.as_str() ).duplicates().next() {
			return Err( ManifestError::DuplicateFunction( name.to_string() ));
		}
		manifest.functions.iter().try_for_each( FunctionDecl::check_unique_args )?;
		Ok( manifest )
	}

	/// The declaration of `name`, if any.
	pub fn function( &self, name: &str ) -> Option<&FunctionDecl> {
		self.functions.iter().find(| function | function.name == name )
	}

}

impl FunctionDecl {

	fn check_unique_args( &self ) -> Result<(), ManifestError> {
		match self.args.iter().map(| arg | arg.name.as_str() ).duplicates().next() {
			Some( argument ) => Err( ManifestError::DuplicateArgument { function: self.name.clone(), argument: argument.to_string() }),
			None => Ok(()),
		}
	}

	/// Checks a call against this declaration before the plugin runs.
	///
	/// # Errors
	/// A declared argument that is missing or has another kind fails, and so
	/// does a supplied argument the declaration does not name. The requested
	/// return kind must match the declared one.
	pub fn validate( &self, arguments: &ArgumentBundle<'_>, expected_return: Option<Kind> ) -> Result<(), DispatchError> {
		self.args.iter().try_for_each(| decl | arguments.lookup( &decl.name, decl.kind ).map(|_| () ))?;
		if let Some( extra ) = arguments.iter().find(| argument | self.args.iter().all(| decl | decl.name != argument.name() )) {
			return Err( ArgumentError::ArgumentNotFound( extra.name().to_string() ).into() );
		}
		match expected_return {
			Some( expected ) if expected != self.return_type => Err( DispatchError::ReturnTypeMismatch {
				function: self.name.clone(),
				expected,
				found: self.return_type,
			}),
			_ => Ok(()),
		}
	}

}
