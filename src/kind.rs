//! Value kinds shared by both sides of the plugin boundary.
//!
//! A [`Kind`] is the discriminator carried by every [`Value`]( crate::Value ),
//! every argument and every declared return. Its numeric encoding is part of the
//! ABI, so discriminants are fixed and must never be reordered.

use serde::{ Deserialize, Deserializer, Serialize, Serializer };



/// The closed set of kinds a [`Value`]( crate::Value ) can hold.
///
/// Numeric kinds are exact: an `I32` is never readable as an `I64` and vice
/// versa. Callers must request the width that was stored.
#[repr( u32 )]
#[derive( Copy, Clone, Eq, PartialEq, Hash, Debug, Default )]
pub enum Kind {
	/// No value. Used as the return kind of procedures.
	#[default] Void = 0,
	I8 = 1,
	I16 = 2,
	I32 = 3,
	I64 = 4,
	U8 = 5,
	U16 = 6,
	U32 = 7,
	U64 = 8,
	/// 32-bit IEEE float.
	Float = 9,
	/// 64-bit IEEE float.
	Double = 10,
	Bool = 11,
	/// Owned UTF-8 text.
	String = 12,
	/// A raw address plus a length in bytes.
	Pointer = 13,
}

impl Kind {

	/// Every kind, in discriminant order.
	pub const ALL: [Kind; 14] = [
		Self::Void,
		Self::I8, Self::I16, Self::I32, Self::I64,
		Self::U8, Self::U16, Self::U32, Self::U64,
		Self::Float, Self::Double,
		Self::Bool, Self::String, Self::Pointer,
	];

	/// Decodes the ABI representation of a kind.
	pub fn from_raw( raw: u32 ) -> Option<Self> {
		Self::ALL.get( raw as usize ).copied()
	}

	/// Encodes the kind for the ABI.
	#[inline] pub fn as_raw( self ) -> u32 { self as u32 }

	/// Canonical token used in API manifests and diagnostics.
	pub fn token( self ) -> &'static str {
		match self {
			Self::Void => "void",
			Self::I8 => "int8",
			Self::I16 => "int16",
			Self::I32 => "int",
			Self::I64 => "int64",
			Self::U8 => "uint8",
			Self::U16 => "uint16",
			Self::U32 => "uint",
			Self::U64 => "uint64",
			Self::Float => "float",
			Self::Double => "double",
			Self::Bool => "boolean",
			Self::String => "string",
			Self::Pointer => "pointer",
		}
	}

	/// Parses a canonical token, or the equivalent Rust type spelling.
	pub fn from_token( token: &str ) -> Option<Self> {
		Some( match token {
			"void" | "()" => Self::Void,
			"int8" | "i8" | "char" => Self::I8,
			"int16" | "i16" | "sint" => Self::I16,
			"int" | "i32" => Self::I32,
			"int64" | "i64" | "long" | "llong" => Self::I64,
			"uint8" | "u8" | "uchar" => Self::U8,
			"uint16" | "u16" | "usint" => Self::U16,
			"uint" | "u32" => Self::U32,
			"uint64" | "u64" | "ulong" | "ullong" => Self::U64,
			"float" | "f32" => Self::Float,
			"double" | "f64" => Self::Double,
			"boolean" | "bool" => Self::Bool,
			"string" | "String" | "str" => Self::String,
			"pointer" | "ptr" => Self::Pointer,
			_ => return None,
		})
	}

}

impl std::fmt::Display for Kind {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { f.write_str( self.token() )}
}

impl std::str::FromStr for Kind {
	type Err = UnknownKind ;
	fn from_str( token: &str ) -> Result<Self, Self::Err> {
		Self::from_token( token ).ok_or_else(|| UnknownKind( token.to_string() ))
	}
}

/// A kind token that does not name any [`Kind`].
#[derive( Debug, Clone, PartialEq, Eq, thiserror::Error )]
#[error( "Unknown kind: {0}" )]
pub struct UnknownKind( pub String );

impl Serialize for Kind {
	fn serialize<S: Serializer>( &self, serializer: S ) -> Result<S::Ok, S::Error> {
		serializer.serialize_str( self.token() )
	}
}

impl<'de> Deserialize<'de> for Kind {
	fn deserialize<D: Deserializer<'de>>( deserializer: D ) -> Result<Self, D::Error> {
		let token = String::deserialize( deserializer )?;
		token.parse().map_err( serde::de::Error::custom )
	}
}
