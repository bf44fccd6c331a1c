use std::marker::PhantomData ;
use thiserror::Error ;
use tracing::debug ;

use crate::{ Kind, Value, Argument, ArgumentBundle, ArgumentError, FunctionDecl, Module };
use crate::abi::ExportFn ;
use crate::frame ;



/// Errors that can occur when calling into a plugin.
#[derive( Error, Debug, Clone, PartialEq )]
pub enum DispatchError {
	/// The module does not export a callable function by this name.
	#[error( "Symbol Not Found: {module}::{function}" )] SymbolNotFound { module: String, function: String },
	/// The module was unloaded.
	#[error( "Module Not Initialized: {module}" )] ModuleNotInitialized { module: String },
	/// The function produced, or is declared to produce, a different kind than the caller expects.
	#[error( "Return Type Mismatch in {function}: expected {expected}, found {found}" )] ReturnTypeMismatch { function: String, expected: Kind, found: Kind },
	/// The caller expects a value but the function never set one.
	#[error( "No Return Value from {function}" )] NoReturnValue { function: String },
	/// The arguments could not be assembled or do not match the declaration.
	#[error( "Argument Error: {0}" )] Argument( #[from] ArgumentError ),
}

/// A resolved, callable plugin function.
///
/// Borrowed from the [`Module`] it was resolved from, so it cannot outlive an
/// unload.
#[derive( Debug, Clone )]
pub struct Export<'m> {
	name: String,
	func: ExportFn,
	declaration: Option<&'m FunctionDecl>,
	_module: PhantomData<&'m Module>,
}

impl<'m> Export<'m> {

	pub(crate) fn new( name: &str, func: ExportFn, declaration: Option<&'m FunctionDecl> ) -> Self {
		Self { name: name.to_string(), func, declaration, _module: PhantomData }
	}

	/// Wraps a function compiled into the current binary.
	///
	/// Useful for hosting exports in-process and for exercising the calling
	/// convention without a shared library.
	pub fn from_fn( name: impl Into<String>, func: ExportFn ) -> Export<'static> {
		Export { name: name.into(), func, declaration: None, _module: PhantomData }
	}

	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// The manifest entry for this function, if the plugin declared one.
	#[inline] pub fn declaration( &self ) -> Option<&'m FunctionDecl> { self.declaration }

	/// Runs the function and returns whatever it left in the return slot.
	pub fn invoke( &self, arguments: &ArgumentBundle<'_> ) -> Option<Value> {
		debug!( function = %self.name, arguments = arguments.len(), "Invoking export" );
		// SAFETY: `func` was resolved from a mapped image (or supplied by the
		// caller) and follows the export calling convention.
		unsafe { frame::invoke( &self.name, self.func, arguments )}
	}

	/// Validates, runs and checks the result.
	///
	/// With `expected_return` set, the returned value must have that kind; an
	/// empty return slot is accepted only for [`Kind::Void`] and yields a void
	/// value. Without it, any value is accepted and an empty slot yields void.
	///
	/// # Errors
	/// See [`DispatchError`].
	pub fn call( &self, expected_return: Option<Kind>, arguments: &ArgumentBundle<'_> ) -> Result<Value, DispatchError> {
		if let Some( declaration ) = self.declaration {
			declaration.validate( arguments, expected_return )?;
		}
		let returned = self.invoke( arguments );
		debug!( function = %self.name, returned = ?returned.as_ref().map(| value | value.kind() ), "Export returned" );
		match ( returned, expected_return ) {
			( Some( value ), Some( expected )) if value.kind() != expected => Err( DispatchError::ReturnTypeMismatch {
				function: self.name.clone(),
				expected,
				found: value.kind(),
			}),
			( Some( value ), _ ) => Ok( value ),
			( None, None | Some( Kind::Void )) => Ok( Value::void() ),
			( None, Some( _ )) => {
				debug!( function = %self.name, "Export returned without setting a value" );
				Err( DispatchError::NoReturnValue { function: self.name.clone() })
			}
		}
	}

}

impl Module {

	/// Calls `function` with a prepared bundle.
	///
	/// # Errors
	/// See [`DispatchError`].
	pub fn call( &self, function: &str, expected_return: Option<Kind>, arguments: &ArgumentBundle<'_> ) -> Result<Value, DispatchError> {
		self.resolve( function )?.call( expected_return, arguments )
	}

	/// Builds the bundle from `(name, kind, value)` triples and calls `function`.
	///
	/// `argument_count` must equal the number of triples. Output pointers need
	/// an [`ArgumentBundle`] built with [`add_output`]( crate::ArgumentBuilder::add_output ).
	///
	/// # Errors
	/// Argument assembly errors are reported as [`DispatchError::Argument`],
	/// before the plugin is touched.
	pub fn call_with<N, V>(
		&self,
		function: &str,
		expected_return: Option<Kind>,
		argument_count: usize,
		arguments: impl IntoIterator<Item = ( N, Kind, V )>,
	) -> Result<Value, DispatchError>
	where
		N: Into<String>,
		V: Into<Value>,
	{
		let mut builder = ArgumentBundle::begin( argument_count );
		arguments.into_iter().try_for_each(| ( name, kind, value ) | {
			builder.add( Argument::scalar( name, kind, value )? ).map(|_| () )
		})?;
		let bundle = builder.finish()?;
		self.call( function, expected_return, &bundle )
	}

}
