//! The tagged value that crosses the plugin boundary.
//!
//! A [`Value`] is an immutable, reference-counted box around one [`Payload`].
//! Its [`Kind`] is fixed when it is built. Cloning a value ([`Value::retain`])
//! shares the payload; the payload is freed when the last holder drops it
//! ([`Value::release`]). The count is atomic, so holders may live on different
//! threads.

use std::sync::{ Arc, Weak };

use crate::Kind ;



/// Shared handle to a dynamically typed value.
#[derive( Clone, PartialEq )]
pub struct Value( Arc<Payload> );

/// A non-owning handle that tells whether a [`Value`]'s payload is still alive.
#[derive( Debug, Clone )]
pub struct WeakValue( Weak<Payload> );

impl WeakValue {
	/// A new holder of the payload, or `None` once it has been freed.
	pub fn upgrade( &self ) -> Option<Value> { self.0.upgrade().map( Value )}
}

/// The data held by a [`Value`]. The variant is the value's [`Kind`].
#[derive( Debug, PartialEq )]
pub enum Payload {
	Void,
	I8( i8 ),
	I16( i16 ),
	I32( i32 ),
	I64( i64 ),
	U8( u8 ),
	U16( u16 ),
	U32( u32 ),
	U64( u64 ),
	Float( f32 ),
	Double( f64 ),
	Bool( bool ),
	String( Box<str> ),
	Pointer( RawPointer ),
}

impl Payload {
	/// The kind this payload encodes.
	pub fn kind( &self ) -> Kind {
		match self {
			Self::Void => Kind::Void,
			Self::I8( _ ) => Kind::I8,
			Self::I16( _ ) => Kind::I16,
			Self::I32( _ ) => Kind::I32,
			Self::I64( _ ) => Kind::I64,
			Self::U8( _ ) => Kind::U8,
			Self::U16( _ ) => Kind::U16,
			Self::U32( _ ) => Kind::U32,
			Self::U64( _ ) => Kind::U64,
			Self::Float( _ ) => Kind::Float,
			Self::Double( _ ) => Kind::Double,
			Self::Bool( _ ) => Kind::Bool,
			Self::String( _ ) => Kind::String,
			Self::Pointer( _ ) => Kind::Pointer,
		}
	}
}

/// A raw address and its length in bytes.
///
/// A pointer either borrows memory that its creator keeps alive, or owns a
/// private copy that is freed together with the value. Nothing about the
/// pointee's layout is known here; caller and callee agree on it out of band.
pub struct RawPointer {
	addr: *mut u8,
	len: usize,
	owns_copy: bool,
}

// SAFETY: the pointer is either a private heap copy that is never handed out
// mutably while shared, or an address whose lifetime and synchronisation the
// creator took responsibility for when building the value.
unsafe impl Send for RawPointer {}
unsafe impl Sync for RawPointer {}

impl RawPointer {

	/// Stores `addr` as is. The caller keeps ownership of the memory.
	pub fn borrowed( addr: *mut u8, len: usize ) -> Self {
		Self { addr, len, owns_copy: false }
	}

	/// Copies `bytes` into memory owned by the pointer.
	pub fn copy_of( bytes: &[u8] ) -> Self {
		let len = bytes.len();
		let addr = Box::into_raw( Box::<[u8]>::from( bytes )).cast::<u8>();
		Self { addr, len, owns_copy: true }
	}

	/// Address of the first byte.
	#[inline] pub fn addr( &self ) -> *mut u8 { self.addr }

	/// Length of the pointee in bytes.
	#[inline] pub fn len( &self ) -> usize { self.len }

	/// Whether the pointee has zero length.
	#[inline] pub fn is_empty( &self ) -> bool { self.len == 0 }

	/// Whether the memory is a private copy freed with this pointer.
	#[inline] pub fn owns_copy( &self ) -> bool { self.owns_copy }

	/// Views the pointee as bytes.
	///
	/// # Safety
	/// For borrowed pointers the caller must guarantee that `addr` is valid for
	/// `len` reads and not mutated for the lifetime of the slice.
	pub unsafe fn as_slice( &self ) -> &[u8] {
		match self.addr.is_null() || self.len == 0 {
			true => &[],
			false => unsafe { std::slice::from_raw_parts( self.addr, self.len )},
		}
	}

}

impl Drop for RawPointer {
	fn drop( &mut self ) {
		if self.owns_copy {
			// SAFETY: `addr` came from `Box::<[u8]>::into_raw` with this exact length.
			drop( unsafe { Box::from_raw( std::ptr::slice_from_raw_parts_mut( self.addr, self.len ))});
		}
	}
}

impl PartialEq for RawPointer {
	fn eq( &self, other: &Self ) -> bool {
		match self.owns_copy && other.owns_copy {
			// SAFETY: owned copies are valid for their whole length.
			true => unsafe { self.as_slice() == other.as_slice() },
			false => self.addr == other.addr && self.len == other.len,
		}
	}
}

impl std::fmt::Debug for RawPointer {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "RawPointer" )
			.field( "addr", &self.addr )
			.field( "len", &self.len )
			.field( "owns_copy", &self.owns_copy )
			.finish()
	}
}

impl Value {

	/// Wraps a payload. The returned value is the only holder.
	pub fn new( payload: Payload ) -> Self { Self( Arc::new( payload ))}

	/// A value of kind [`Kind::Void`].
	pub fn void() -> Self { Self::new( Payload::Void )}

	/// A string value holding a private copy of `text`.
	pub fn string( text: impl Into<Box<str>> ) -> Self { Self::new( Payload::String( text.into() ))}

	/// A pointer value.
	///
	/// With `owns_copy` the `len` bytes at `addr` are duplicated into memory the
	/// value owns; otherwise the address is stored unmodified and the caller
	/// stays responsible for its lifetime.
	///
	/// A null `addr` with `owns_copy` yields an empty copy whatever `len` is.
	/// Pointers arriving over the ABI never take that path: the decoder
	/// refuses null data with a length as [`AbiError::NullData`]( crate::abi::AbiError::NullData ).
	///
	/// # Safety
	/// When `owns_copy` is true and `addr` is not null, `addr` must be valid for `len` reads.
	pub unsafe fn pointer( owns_copy: bool, addr: *mut u8, len: usize ) -> Self {
		Self::new( Payload::Pointer( match owns_copy {
			true if addr.is_null() || len == 0 => RawPointer::copy_of( &[] ),
			true => RawPointer::copy_of( unsafe { std::slice::from_raw_parts( addr, len )}),
			false => RawPointer::borrowed( addr, len ),
		}))
	}

	/// A pointer value owning a copy of `bytes`.
	pub fn bytes( bytes: &[u8] ) -> Self { Self::new( Payload::Pointer( RawPointer::copy_of( bytes )))}

	/// The kind fixed at construction.
	#[inline] pub fn kind( &self ) -> Kind { self.0.kind() }

	/// The payload.
	#[inline] pub fn payload( &self ) -> &Payload { &self.0 }

	/// Registers another holder and returns its handle.
	#[inline] pub fn retain( &self ) -> Self { Self( Arc::clone( &self.0 ))}

	/// Gives up this holder's share; frees the payload if it was the last one.
	#[inline] pub fn release( self ) { drop( self ) }

	/// Number of holders currently sharing the payload.
	#[inline] pub fn ref_count( &self ) -> usize { Arc::strong_count( &self.0 )}

	/// A handle that does not keep the payload alive.
	#[inline] pub fn downgrade( &self ) -> WeakValue { WeakValue( Arc::downgrade( &self.0 ))}

	/// Whether two handles share the same payload.
	#[inline] pub fn ptr_eq( &self, other: &Self ) -> bool { Arc::ptr_eq( &self.0, &other.0 )}

	/// Renders the value as text for diagnostics.
	pub fn to_text( &self ) -> String { self.to_string() }

	/// Extracts a scalar of the exact stored kind.
	pub fn get<T: Scalar>( &self ) -> Option<T> { T::from_value( self )}

	#[inline] pub fn as_str( &self ) -> Option<&str> {
		match self.payload() { Payload::String( text ) => Some( &**text ), _ => None }
	}

	#[inline] pub fn as_pointer( &self ) -> Option<&RawPointer> {
		match self.payload() { Payload::Pointer( pointer ) => Some( pointer ), _ => None }
	}

	#[inline] pub fn is_void( &self ) -> bool { matches!( self.payload(), Payload::Void )}

}

macro_rules! accessors {( $( $name:ident: $variant:ident => $ty:ty ),* $(,)? ) => {
	impl Value { $(
		#[doc = concat!( "Reads the payload if the kind is [`Kind::", stringify!( $variant ), "`]." )]
		#[inline] pub fn $name( &self ) -> Option<$ty> {
			match self.payload() { Payload::$variant( value ) => Some( *value ), _ => None }
		}
	)* }
}}

accessors! {
	as_i8: I8 => i8,
	as_i16: I16 => i16,
	as_i32: I32 => i32,
	as_i64: I64 => i64,
	as_u8: U8 => u8,
	as_u16: U16 => u16,
	as_u32: U32 => u32,
	as_u64: U64 => u64,
	as_f32: Float => f32,
	as_f64: Double => f64,
	as_bool: Bool => bool,
}

impl std::fmt::Display for Value {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match self.payload() {
			Payload::Void => Ok(()),
			Payload::I8( v ) => write!( f, "{}", v ),
			Payload::I16( v ) => write!( f, "{}", v ),
			Payload::I32( v ) => write!( f, "{}", v ),
			Payload::I64( v ) => write!( f, "{}", v ),
			Payload::U8( v ) => write!( f, "{}", v ),
			Payload::U16( v ) => write!( f, "{}", v ),
			Payload::U32( v ) => write!( f, "{}", v ),
			Payload::U64( v ) => write!( f, "{}", v ),
			Payload::Float( v ) => write!( f, "{:.6}", v ),
			Payload::Double( v ) => write!( f, "{:.6}", v ),
			Payload::Bool( v ) => f.write_str( if *v { "true" } else { "false" }),
			Payload::String( text ) => f.write_str( text ),
			Payload::Pointer( pointer ) => write!( f, "{:#x}", pointer.addr as usize ),
		}
	}
}

impl std::fmt::Debug for Value {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_tuple( "Value" ).field( &self.0 ).finish()
	}
}

/// A kind whose payload can be read out of a [`Value`] by copy.
pub trait Scalar: Sized {
	/// The kind a value must have to yield `Self`.
	const KIND: Kind ;
	/// Reads the payload if the value has kind [`Self::KIND`].
	fn from_value( value: &Value ) -> Option<Self> ;
	/// Wraps `self` into a fresh value.
	fn into_value( self ) -> Value ;
}

macro_rules! scalar {( $( $ty:ty => $variant:ident ),* $(,)? ) => { $(
	impl Scalar for $ty {
		const KIND: Kind = Kind::$variant ;
		fn from_value( value: &Value ) -> Option<Self> {
			match value.payload() { Payload::$variant( inner ) => Some( *inner ), _ => None }
		}
		fn into_value( self ) -> Value { Value::new( Payload::$variant( self ))}
	}
	impl From<$ty> for Value {
		fn from( value: $ty ) -> Self { Scalar::into_value( value )}
	}
)* }}

scalar! {
	i8 => I8, i16 => I16, i32 => I32, i64 => I64,
	u8 => U8, u16 => U16, u32 => U32, u64 => U64,
	f32 => Float, f64 => Double,
	bool => Bool,
}

impl Scalar for String {
	const KIND: Kind = Kind::String ;
	fn from_value( value: &Value ) -> Option<Self> { value.as_str().map( str::to_string )}
	fn into_value( self ) -> Value { Value::string( self )}
}

impl From<String> for Value {
	fn from( text: String ) -> Self { Value::string( text )}
}

impl From<&str> for Value {
	fn from( text: &str ) -> Self { Value::string( text )}
}

impl From<()> for Value {
	fn from( _: () ) -> Self { Value::void() }
}

impl From<Payload> for Value {
	fn from( payload: Payload ) -> Self { Value::new( payload )}
}
