//! Named arguments assembled by the caller for a single call.
//!
//! An [`ArgumentBundle`] is built once per call, handed to the callee as the
//! only parameter of the export, and dropped as soon as the callee returns. It
//! is never shared between calls or threads.

use std::marker::PhantomData ;
use itertools::Itertools ;
use thiserror::Error ;

use crate::{ Kind, Value };



/// Errors raised while assembling a bundle or reading from it.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ArgumentError {
	/// The number of arguments supplied differs from the count announced up front.
	#[error( "Argument Count Mismatch: expected {expected}, supplied {supplied}" )]
	ArgumentCountMismatch { expected: usize, supplied: usize },
	/// Two arguments in one bundle share a name.
	#[error( "Duplicate Argument Name: {0}" )]
	DuplicateArgumentName( String ),
	/// No argument with this name exists.
	#[error( "Argument Not Found: {0}" )]
	ArgumentNotFound( String ),
	/// The argument exists but holds a different kind than requested.
	#[error( "Argument Type Mismatch: {name} is {found}, requested {expected}" )]
	ArgumentTypeMismatch { name: String, expected: Kind, found: Kind },
}

/// One named entry of an [`ArgumentBundle`].
///
/// Pointer entries built from a borrowed buffer keep that buffer borrowed for
/// `'a`, so the callee can write through output pointers while the caller
/// cannot observe the buffer mid-call.
#[derive( Debug, Clone )]
pub struct Argument<'a> {
	name: String,
	value: Value,
	is_output: bool,
	_borrow: PhantomData<&'a mut [u8]>,
}

impl<'a> Argument<'a> {

	/// An argument whose kind is taken from the value.
	pub fn new( name: impl Into<String>, value: impl Into<Value> ) -> Self {
		Self { name: name.into(), value: value.into(), is_output: false, _borrow: PhantomData }
	}

	/// An argument declared with an explicit kind.
	///
	/// # Errors
	/// Fails with [`ArgumentError::ArgumentTypeMismatch`] if the value's kind is not `kind`.
	pub fn scalar( name: impl Into<String>, kind: Kind, value: impl Into<Value> ) -> Result<Self, ArgumentError> {
		let argument = Self::new( name, value );
		match argument.kind() == kind {
			true => Ok( argument ),
			false => Err( ArgumentError::ArgumentTypeMismatch {
				found: argument.kind(),
				name: argument.name,
				expected: kind,
			}),
		}
	}

	/// A raw pointer argument.
	///
	/// With `owns_copy` the bundle duplicates `len` bytes at `addr` and frees the
	/// copy with the bundle; otherwise the address is passed through and the
	/// caller keeps ownership.
	///
	/// # Safety
	/// `addr` must be valid for `len` reads when `owns_copy` is set, and for as
	/// long as the callee uses it otherwise.
	pub unsafe fn pointer( name: impl Into<String>, owns_copy: bool, addr: *mut u8, len: usize ) -> Self {
		Self::new( name, unsafe { Value::pointer( owns_copy, addr, len )})
	}

	/// A borrowed buffer the callee may write into.
	///
	/// Writes made by the callee are visible in `buffer` after the call returns.
	pub fn output( name: impl Into<String>, buffer: &'a mut [u8] ) -> Self {
		let value = unsafe { Value::pointer( false, buffer.as_mut_ptr(), buffer.len() )};
		Self { name: name.into(), value, is_output: true, _borrow: PhantomData }
	}

	/// The argument name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// The kind of the stored value.
	#[inline] pub fn kind( &self ) -> Kind { self.value.kind() }

	/// The stored value.
	#[inline] pub fn value( &self ) -> &Value { &self.value }

	/// Whether the callee may mutate the pointee in place.
	#[inline] pub fn is_output( &self ) -> bool { self.is_output }

}

/// The ordered, uniquely named arguments of one call.
#[derive( Debug, Clone, Default )]
pub struct ArgumentBundle<'a> {
	entries: Vec<Argument<'a>>,
}

impl<'a> ArgumentBundle<'a> {

	/// Starts assembling a bundle that must end up with exactly `expected_count` entries.
	pub fn begin( expected_count: usize ) -> ArgumentBuilder<'a> {
		ArgumentBuilder { expected_count, entries: Vec::with_capacity( expected_count )}
	}

	/// A bundle with no arguments.
	pub fn empty() -> Self { Self { entries: Vec::with_capacity( 0 )}}

	/// Builds a bundle from a list of arguments; the count is the list's length.
	///
	/// # Errors
	/// Fails with [`ArgumentError::DuplicateArgumentName`] if two entries share a name.
	pub fn from_arguments( arguments: impl IntoIterator<Item = Argument<'a>> ) -> Result<Self, ArgumentError> {
		let entries = arguments.into_iter().collect::<Vec<_>>();
		match entries.iter().map( Argument::name ).duplicates().next() {
			Some( name ) => Err( ArgumentError::DuplicateArgumentName( name.to_string() )),
			None => Ok( Self { entries }),
		}
	}

	/// Finds an argument by name and checks its kind.
	///
	/// # Errors
	/// [`ArgumentError::ArgumentNotFound`] if absent, [`ArgumentError::ArgumentTypeMismatch`]
	/// if present with another kind.
	pub fn lookup( &self, name: &str, kind: Kind ) -> Result<&Argument<'a>, ArgumentError> {
		let argument = self.get( name ).ok_or_else(|| ArgumentError::ArgumentNotFound( name.to_string() ))?;
		match argument.kind() == kind {
			true => Ok( argument ),
			false => Err( ArgumentError::ArgumentTypeMismatch {
				name: name.to_string(),
				expected: kind,
				found: argument.kind(),
			}),
		}
	}

	/// Finds an argument by name regardless of kind.
	pub fn get( &self, name: &str ) -> Option<&Argument<'a>> {
		self.entries.iter().find(| argument | argument.name() == name )
	}

	/// Arguments in insertion order.
	pub fn iter( &self ) -> std::slice::Iter<'_, Argument<'a>> { self.entries.iter() }

	#[inline] pub fn len( &self ) -> usize { self.entries.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

}

impl<'b, 'a> IntoIterator for &'b ArgumentBundle<'a> {
	type Item = &'b Argument<'a>;
	type IntoIter = std::slice::Iter<'b, Argument<'a>>;
	fn into_iter( self ) -> Self::IntoIter { self.entries.iter() }
}

/// An [`ArgumentBundle`] under construction.
///
/// Created by [`ArgumentBundle::begin`]. Entries are checked for duplicate
/// names as they are added; the announced count is checked by [`finish`]( Self::finish ).
#[derive( Debug )]
#[must_use = "call .finish() to obtain the bundle"]
pub struct ArgumentBuilder<'a> {
	expected_count: usize,
	entries: Vec<Argument<'a>>,
}

impl<'a> ArgumentBuilder<'a> {

	/// Adds a prepared argument.
	///
	/// # Errors
	/// Fails with [`ArgumentError::DuplicateArgumentName`] if the name is taken.
	pub fn add( &mut self, argument: Argument<'a> ) -> Result<&mut Self, ArgumentError> {
		if self.entries.iter().any(| entry | entry.name() == argument.name() ) {
			return Err( ArgumentError::DuplicateArgumentName( argument.name ));
		}
		self.entries.push( argument );
		Ok( self )
	}

	/// Adds a value with an explicitly declared kind.
	///
	/// # Errors
	/// Fails on a duplicate name or when `value` is not of kind `kind`.
	pub fn add_scalar( &mut self, name: impl Into<String>, kind: Kind, value: impl Into<Value> ) -> Result<&mut Self, ArgumentError> {
		self.add( Argument::scalar( name, kind, value )? )
	}

	/// Adds a raw pointer argument. See [`Argument::pointer`].
	///
	/// # Errors
	/// Fails on a duplicate name.
	///
	/// # Safety
	/// Same contract as [`Argument::pointer`].
	pub unsafe fn add_pointer( &mut self, name: impl Into<String>, owns_copy: bool, addr: *mut u8, len: usize ) -> Result<&mut Self, ArgumentError> {
		self.add( unsafe { Argument::pointer( name, owns_copy, addr, len )})
	}

	/// Adds a borrowed buffer the callee may write into.
	///
	/// # Errors
	/// Fails on a duplicate name.
	pub fn add_output( &mut self, name: impl Into<String>, buffer: &'a mut [u8] ) -> Result<&mut Self, ArgumentError> {
		self.add( Argument::output( name, buffer ))
	}

	/// Seals the bundle.
	///
	/// # Errors
	/// Fails with [`ArgumentError::ArgumentCountMismatch`] if the number of added
	/// entries differs from the count passed to [`ArgumentBundle::begin`].
	pub fn finish( self ) -> Result<ArgumentBundle<'a>, ArgumentError> {
		match self.entries.len() == self.expected_count {
			true => Ok( ArgumentBundle { entries: self.entries }),
			false => Err( ArgumentError::ArgumentCountMismatch {
				expected: self.expected_count,
				supplied: self.entries.len(),
			}),
		}
	}

}
