//! Plugin-side half of the calling convention.
//!
//! A plugin crate depends on this crate, declares its metadata with
//! [`export_plugin!`]( crate::export_plugin ) and its callable functions with
//! [`export_function!`]( crate::export_function ). Each function body receives
//! a [`Call`] to read arguments from and write its return value to:
//!
//! ```
//! use dylib_link::{ export_plugin, export_function, Call, CalleeError };
//!
//! export_plugin! {
//!     name: "calc",
//!     version: "1.0.0",
//!     author: "someone",
//!     description: "Arithmetic helpers",
//!     init: init,
//!     uninit: uninit,
//! }
//!
//! fn init() -> bool { true }
//! fn uninit() {}
//!
//! export_function!( add_one => increment );
//!
//! fn increment( call: &mut Call ) -> Result<(), CalleeError> {
//!     let n: i32 = call.arg( "n" )?;
//!     call.set_return( n + 1 )
//! }
//! ```

use std::ffi::{ c_int, c_void };
use std::marker::PhantomData ;
use std::panic::{ catch_unwind, AssertUnwindSafe };
use thiserror::Error ;
use tracing::{ error, warn };

use crate::{ Kind, Value, Scalar, ArgumentError };
use crate::abi::{ ABI_VERSION, AbiError, HostApi, RawBundle, RawValue, status };



/// Errors a plugin function can hit while talking to the host.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum CalleeError {
	#[error( "{0}" )] Argument( #[from] ArgumentError ),
	#[error( "Malformed value from host: {0}" )] Abi( #[from] AbiError ),
	#[error( "Return value rejected by host" )] ReturnRejected,
}

/// The view a running export has of its call.
pub struct Call<'a> {
	frame: *mut c_void,
	api: &'a HostApi,
}

impl<'a> Call<'a> {

	/// Wraps the bundle an export received.
	///
	/// Returns `None` for a null bundle or a host built against another ABI version.
	///
	/// # Safety
	/// `bundle` must be the pointer passed to the export by the host.
	pub unsafe fn from_raw( bundle: *mut RawBundle ) -> Option<Self> {
		let bundle = unsafe { bundle.as_ref() }?;
		let api = unsafe { bundle.api.as_ref() }?;
		match api.abi_version == ABI_VERSION {
			true => Some( Self { frame: bundle.frame, api }),
			false => None,
		}
	}

	/// Number of arguments the caller supplied.
	pub fn argument_count( &self ) -> usize {
		unsafe { ( self.api.argument_count )( self.frame )}
	}

	fn lookup_raw( &self, name: &str, kind: Kind ) -> Result<RawValue, ArgumentError> {
		let mut out = RawValue::default();
		let code = unsafe { ( self.api.lookup )( self.frame, name.as_ptr(), name.len(), kind.as_raw(), &mut out )};
		match code {
			status::OK => Ok( out ),
			status::TYPE_MISMATCH => Err( ArgumentError::ArgumentTypeMismatch {
				name: name.to_string(),
				expected: kind,
				found: Kind::from_raw( out.kind ).unwrap_or_default(),
			}),
			_ => Err( ArgumentError::ArgumentNotFound( name.to_string() )),
		}
	}

	/// Reads argument `name`, which must hold `kind`. Strings are copied.
	///
	/// # Errors
	/// [`ArgumentError::ArgumentNotFound`] or [`ArgumentError::ArgumentTypeMismatch`].
	pub fn lookup_scalar( &self, name: &str, kind: Kind ) -> Result<Value, CalleeError> {
		let raw = self.lookup_raw( name, kind )?;
		Ok( unsafe { raw.decode( false )}? )
	}

	/// Reads argument `name` as a Rust value of the matching kind.
	///
	/// # Errors
	/// Same as [`Call::lookup_scalar`].
	pub fn arg<T: Scalar>( &self, name: &str ) -> Result<T, CalleeError> {
		let value = self.lookup_scalar( name, T::KIND )?;
		T::from_value( &value ).ok_or_else(|| CalleeError::Argument( ArgumentError::ArgumentTypeMismatch {
			name: name.to_string(),
			expected: T::KIND,
			found: value.kind(),
		}))
	}

	/// Reads pointer argument `name` without copying its pointee.
	///
	/// # Errors
	/// [`ArgumentError::ArgumentNotFound`] or [`ArgumentError::ArgumentTypeMismatch`].
	pub fn lookup_pointer( &self, name: &str ) -> Result<PointerArg<'a>, CalleeError> {
		let raw = self.lookup_raw( name, Kind::Pointer )?;
		Ok( PointerArg { addr: raw.data, len: raw.len, is_output: raw.is_output, _call: PhantomData })
	}

	/// Stores the return value, replacing any earlier one.
	///
	/// # Errors
	/// [`CalleeError::ReturnRejected`] if the host refused the value.
	pub fn set_return( &mut self, value: impl Into<Value> ) -> Result<(), CalleeError> {
		let value = value.into();
		let raw = RawValue::encode( &value, false );
		match unsafe { ( self.api.set_return )( self.frame, &raw )} {
			status::OK => Ok(()),
			_ => Err( CalleeError::ReturnRejected ),
		}
	}

}

/// A pointer argument as seen by the callee.
#[derive( Debug )]
pub struct PointerArg<'a> {
	addr: *mut u8,
	len: usize,
	is_output: bool,
	_call: PhantomData<&'a ()>,
}

impl PointerArg<'_> {

	#[inline] pub fn addr( &self ) -> *mut u8 { self.addr }
	#[inline] pub fn len( &self ) -> usize { self.len }
	#[inline] pub fn is_empty( &self ) -> bool { self.len == 0 }
	/// Whether the caller allows writes through this pointer.
	#[inline] pub fn is_output( &self ) -> bool { self.is_output }

	/// The pointee as bytes.
	///
	/// # Safety
	/// The caller of the export must have passed memory valid for `len` reads.
	pub unsafe fn as_slice( &self ) -> &[u8] {
		match self.addr.is_null() || self.len == 0 {
			true => &[],
			false => unsafe { std::slice::from_raw_parts( self.addr, self.len )},
		}
	}

	/// The pointee as mutable bytes. `None` unless this is an output pointer.
	///
	/// # Safety
	/// Same as [`PointerArg::as_slice`], for writes.
	pub unsafe fn as_mut_slice( &mut self ) -> Option<&mut [u8]> {
		match self.is_output && !self.addr.is_null() {
			true => Some( unsafe { std::slice::from_raw_parts_mut( self.addr, self.len )}),
			false => None,
		}
	}

	/// Reads a `T` from the start of the pointee. `None` if it is too short.
	///
	/// # Safety
	/// The pointee's first `size_of::<T>()` bytes must be a valid `T`.
	pub unsafe fn read<T: Copy>( &self ) -> Option<T> {
		match !self.addr.is_null() && self.len >= size_of::<T>() {
			true => Some( unsafe { self.addr.cast::<T>().read_unaligned() }),
			false => None,
		}
	}

	/// Writes `value` at the start of the pointee. Returns `false` without
	/// writing if this is not an output pointer or the pointee is too short.
	///
	/// # Safety
	/// Same as [`PointerArg::as_mut_slice`].
	pub unsafe fn write<T: Copy>( &mut self, value: T ) -> bool {
		match self.is_output && !self.addr.is_null() && self.len >= size_of::<T>() {
			true => { unsafe { self.addr.cast::<T>().write_unaligned( value )}; true }
			false => false,
		}
	}

}

/// Runs an export body behind the boundary: builds the [`Call`], logs errors
/// and stops panics from unwinding into the host.
///
/// # Safety
/// `bundle` must be the pointer passed to the export by the host.
#[doc( hidden )]
pub unsafe fn run<E, F>( function: &str, bundle: *mut RawBundle, body: F )
where
	E: std::fmt::Display,
	F: FnOnce( &mut Call<'_> ) -> Result<(), E>,
{
	let Some( mut call ) = ( unsafe { Call::from_raw( bundle )}) else {
		error!( function, "Export invoked without a compatible bundle" );
		return;
	};
	match catch_unwind( AssertUnwindSafe(|| body( &mut call ))) {
		Ok( Ok(())) => {}
		Ok( Err( err )) => warn!( function, error = %err, "Export failed" ),
		Err( _ ) => error!( function, "Export panicked" ),
	}
}

#[doc( hidden )]
pub fn run_init( init: fn() -> bool ) -> c_int {
	match catch_unwind( init ) {
		Ok( true ) => 0,
		Ok( false ) => 1,
		Err( _ ) => { error!( "Plugin initialisation panicked" ); 2 }
	}
}

#[doc( hidden )]
pub fn run_uninit( uninit: fn() ) {
	if catch_unwind( uninit ).is_err() {
		error!( "Plugin uninitialisation panicked" );
	}
}

/// Emits the metadata and lifecycle exports every plugin must provide.
///
/// `init` is a `fn() -> bool` returning whether initialisation succeeded;
/// `uninit` is a `fn()`. `api`, if given, is the JSON manifest published
/// through `plugin_api`.
#[macro_export]
macro_rules! export_plugin {
	(
		name: $name:literal,
		version: $version:literal,
		author: $author:literal,
		description: $description:literal,
		init: $init:path,
		uninit: $uninit:path
		$(, api: $api:literal )?
		$(,)?
	) => {
		#[no_mangle]
		pub extern "C" fn plugin_name() -> *const ::std::ffi::c_char { concat!( $name, "\0" ).as_ptr().cast() }
		#[no_mangle]
		pub extern "C" fn plugin_version() -> *const ::std::ffi::c_char { concat!( $version, "\0" ).as_ptr().cast() }
		#[no_mangle]
		pub extern "C" fn plugin_author() -> *const ::std::ffi::c_char { concat!( $author, "\0" ).as_ptr().cast() }
		#[no_mangle]
		pub extern "C" fn plugin_description() -> *const ::std::ffi::c_char { concat!( $description, "\0" ).as_ptr().cast() }
		#[no_mangle]
		pub extern "C" fn plugin_init() -> ::std::ffi::c_int { $crate::callee::run_init( $init ) }
		#[no_mangle]
		pub extern "C" fn plugin_uninit() { $crate::callee::run_uninit( $uninit ) }
		$(
			#[no_mangle]
			pub extern "C" fn plugin_api() -> *const ::std::ffi::c_char { concat!( $api, "\0" ).as_ptr().cast() }
		)?
	};
}

/// Exports functions under the single-bundle calling convention.
///
/// Each `symbol => body` pair emits an unmangled `symbol` that runs `body`,
/// a `fn( &mut Call ) -> Result<(), E>` with `E: Display`. The emitted
/// function is an item named `symbol` in the invoking module, so `body` must
/// be named differently.
#[macro_export]
macro_rules! export_function {
	( $( $symbol:ident => $body:path ),* $(,)? ) => { $(
		#[no_mangle]
		#[allow( clippy::missing_safety_doc )]
		pub unsafe extern "C" fn $symbol( bundle: *mut $crate::abi::RawBundle ) {
			unsafe { $crate::callee::run( stringify!( $symbol ), bundle, $body ) }
		}
	)* };
}
