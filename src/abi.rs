//! The C-compatible surface shared by host and plugins.
//!
//! Host and plugin are compiled separately and may link different copies of
//! this crate, so nothing with a Rust layout crosses the boundary. An export
//! receives a [`RawBundle`] holding an opaque frame pointer and a table of host
//! callbacks ([`HostApi`]); every read and write goes through that table as a
//! [`RawValue`]. Text and bytes are passed as address plus length and copied by
//! whichever side keeps them.

use std::ffi::{ c_char, c_int, c_void };
use thiserror::Error ;

use crate::{ Kind, Value, Payload };



/// Bumped whenever a layout in this module changes.
pub const ABI_VERSION: u32 = 1 ;

/// Entry point of every callable export.
pub type ExportFn = unsafe extern "C" fn( bundle: *mut RawBundle );
/// `plugin_name`, `plugin_version`, `plugin_author`, `plugin_description` and `plugin_api`.
pub type MetadataFn = unsafe extern "C" fn() -> *const c_char ;
/// `plugin_init`. Zero means success.
pub type InitFn = unsafe extern "C" fn() -> c_int ;
/// `plugin_uninit`.
pub type UninitFn = unsafe extern "C" fn();

/// Symbol names every plugin is looked up by.
pub mod symbols {
	pub const NAME: &str = "plugin_name" ;
	pub const VERSION: &str = "plugin_version" ;
	pub const AUTHOR: &str = "plugin_author" ;
	pub const DESCRIPTION: &str = "plugin_description" ;
	pub const INIT: &str = "plugin_init" ;
	pub const UNINIT: &str = "plugin_uninit" ;
	/// Optional. Returns the JSON API manifest.
	pub const API: &str = "plugin_api" ;

	/// Names that are part of the plugin contract and never callable as exports.
	pub const RESERVED: [&str; 7] = [ NAME, VERSION, AUTHOR, DESCRIPTION, INIT, UNINIT, API ];
}

/// Status codes returned by [`HostApi`] callbacks.
pub mod status {
	use std::ffi::c_int ;
	pub const OK: c_int = 0 ;
	pub const NOT_FOUND: c_int = 1 ;
	pub const TYPE_MISMATCH: c_int = 2 ;
	pub const INVALID: c_int = 3 ;
}

/// What an export receives as its single parameter.
#[repr( C )]
#[derive( Debug )]
pub struct RawBundle {
	/// Host-owned call state. Opaque to plugins.
	pub frame: *mut c_void,
	/// Callbacks operating on `frame`.
	pub api: *const HostApi,
}

/// Callbacks the host exposes to a running export.
#[repr( C )]
#[derive( Debug )]
pub struct HostApi {
	pub abi_version: u32,
	/// Number of arguments in the frame.
	pub argument_count: unsafe extern "C" fn( frame: *mut c_void ) -> usize,
	/// Looks up argument `name` expecting `kind`. On [`status::OK`] `out` holds the
	/// argument; on [`status::TYPE_MISMATCH`] only `out.kind` is written.
	pub lookup: unsafe extern "C" fn(
		frame: *mut c_void,
		name: *const u8,
		name_len: usize,
		kind: u32,
		out: *mut RawValue,
	) -> c_int,
	/// Stores the return value, replacing any previous one. The host copies
	/// everything it needs before returning.
	pub set_return: unsafe extern "C" fn( frame: *mut c_void, value: *const RawValue ) -> c_int,
}

/// A value in transit.
///
/// Scalars travel in `bits`: integers sign or zero extended to 64 bits, floats
/// as their IEEE bit pattern, booleans as 0 or 1. Strings and pointers travel in
/// `data` and `len`, and are only valid for the duration of the callback that
/// produced them.
#[repr( C )]
#[derive( Debug, Clone, Copy )]
pub struct RawValue {
	pub kind: u32,
	pub bits: u64,
	pub data: *mut u8,
	pub len: usize,
	/// For pointers: the sender holds a private copy of the pointee.
	pub owns_copy: bool,
	/// For pointers: the receiver may write through `data`.
	pub is_output: bool,
}

/// A [`RawValue`] that cannot be turned back into a [`Value`].
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum AbiError {
	#[error( "Unknown kind discriminant: {0}" )] UnknownKind( u32 ),
	#[error( "String is not valid UTF-8" )] InvalidUtf8,
	#[error( "Null data with non-zero length {0}" )] NullData( usize ),
}

impl Default for RawValue {
	fn default() -> Self { Self::of_kind( Kind::Void )}
}

impl RawValue {

	/// An empty value carrying only a kind.
	pub fn of_kind( kind: Kind ) -> Self {
		Self { kind: kind.as_raw(), bits: 0, data: std::ptr::null_mut(), len: 0, owns_copy: false, is_output: false }
	}

	/// Describes `value` without copying it. The result borrows from `value`.
	#[allow( clippy::cast_sign_loss )]
	pub fn encode( value: &Value, is_output: bool ) -> Self {
		let mut raw = Self::of_kind( value.kind() );
		match value.payload() {
			Payload::Void => {}
			Payload::I8( v ) => raw.bits = i64::from( *v ) as u64,
			Payload::I16( v ) => raw.bits = i64::from( *v ) as u64,
			Payload::I32( v ) => raw.bits = i64::from( *v ) as u64,
			Payload::I64( v ) => raw.bits = *v as u64,
			Payload::U8( v ) => raw.bits = u64::from( *v ),
			Payload::U16( v ) => raw.bits = u64::from( *v ),
			Payload::U32( v ) => raw.bits = u64::from( *v ),
			Payload::U64( v ) => raw.bits = *v,
			Payload::Float( v ) => raw.bits = u64::from( v.to_bits() ),
			Payload::Double( v ) => raw.bits = v.to_bits(),
			Payload::Bool( v ) => raw.bits = u64::from( *v ),
			Payload::String( text ) => {
				raw.data = text.as_ptr().cast_mut();
				raw.len = text.len();
			}
			Payload::Pointer( pointer ) => {
				raw.data = pointer.addr();
				raw.len = pointer.len();
				raw.owns_copy = pointer.owns_copy();
				raw.is_output = is_output ;
			}
		}
		raw
	}

	/// Rebuilds a [`Value`], copying strings.
	///
	/// Pointers are duplicated into a private copy when `copy_pointee` is set and
	/// the sender marked its pointee as a copy; otherwise the address is kept as
	/// a borrowed pointer.
	///
	/// # Errors
	/// Fails on an unknown kind, non UTF-8 text, or null data with a length.
	///
	/// # Safety
	/// `data` must be valid for `len` reads.
	#[allow( clippy::cast_possible_truncation, clippy::cast_possible_wrap )]
	pub unsafe fn decode( &self, copy_pointee: bool ) -> Result<Value, AbiError> {
		let kind = Kind::from_raw( self.kind ).ok_or( AbiError::UnknownKind( self.kind ))?;
		if self.data.is_null() && self.len != 0 { return Err( AbiError::NullData( self.len )) }
		let bits = self.bits ;
		Ok( Value::new( match kind {
			Kind::Void => Payload::Void,
			Kind::I8 => Payload::I8( bits as i8 ),
			Kind::I16 => Payload::I16( bits as i16 ),
			Kind::I32 => Payload::I32( bits as i32 ),
			Kind::I64 => Payload::I64( bits as i64 ),
			Kind::U8 => Payload::U8( bits as u8 ),
			Kind::U16 => Payload::U16( bits as u16 ),
			Kind::U32 => Payload::U32( bits as u32 ),
			Kind::U64 => Payload::U64( bits ),
			Kind::Float => Payload::Float( f32::from_bits( bits as u32 )),
			Kind::Double => Payload::Double( f64::from_bits( bits )),
			Kind::Bool => Payload::Bool( bits != 0 ),
			Kind::String => {
				let bytes = unsafe { self.bytes() };
				let text = std::str::from_utf8( bytes ).map_err(|_| AbiError::InvalidUtf8 )?;
				Payload::String( text.into() )
			}
			Kind::Pointer => return Ok( unsafe { Value::pointer( copy_pointee && self.owns_copy, self.data, self.len )}),
		}))
	}

	/// The `data`/`len` pair as a byte slice.
	///
	/// # Safety
	/// `data` must be valid for `len` reads for the returned lifetime.
	pub unsafe fn bytes<'a>( &self ) -> &'a [u8] {
		match self.data.is_null() || self.len == 0 {
			true => &[],
			false => unsafe { std::slice::from_raw_parts( self.data, self.len )},
		}
	}

}
