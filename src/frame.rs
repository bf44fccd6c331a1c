//! Host-side state of one call and the callbacks plugins use to reach it.

use std::ffi::{ c_int, c_void };
use tracing::{ debug, warn };

use crate::{ Kind, Value, ArgumentBundle, ArgumentError };
use crate::abi::{ ABI_VERSION, ExportFn, HostApi, RawBundle, RawValue, status };



/// Holds at most one value written by the callee.
///
/// A later write replaces the earlier one; the replaced value is released.
#[derive( Debug, Default )]
pub struct ReturnSlot( Option<Value> );

impl ReturnSlot {

	/// Stores `value`, returning the value it replaced.
	pub fn set( &mut self, value: Value ) -> Option<Value> { self.0.replace( value )}

	/// Removes and returns the stored value.
	pub fn take( &mut self ) -> Option<Value> { self.0.take() }

	#[inline] pub fn is_set( &self ) -> bool { self.0.is_some() }

}

struct CallFrame<'a> {
	function: &'a str,
	arguments: &'a ArgumentBundle<'a>,
	slot: ReturnSlot,
}

static HOST_API: HostApi = HostApi {
	abi_version: ABI_VERSION,
	argument_count: host_argument_count,
	lookup: host_lookup,
	set_return: host_set_return,
};

/// Runs `func` with `arguments` and returns whatever it left in the return slot.
///
/// # Safety
/// `func` must follow the export calling convention and still be mapped.
pub(crate) unsafe fn invoke( function: &str, func: ExportFn, arguments: &ArgumentBundle<'_> ) -> Option<Value> {
	let mut frame = CallFrame { function, arguments, slot: ReturnSlot::default() };
	let mut bundle = RawBundle {
		frame: std::ptr::from_mut( &mut frame ).cast::<c_void>(),
		api: &HOST_API,
	};
	unsafe { func( &mut bundle ) };
	frame.slot.take()
}

unsafe fn frame_ref<'f>( frame: *mut c_void ) -> Option<&'f mut CallFrame<'f>> {
	unsafe { frame.cast::<CallFrame<'f>>().as_mut() }
}

unsafe extern "C" fn host_argument_count( frame: *mut c_void ) -> usize {
	unsafe { frame_ref( frame )}.map_or( 0, | frame | frame.arguments.len() )
}

unsafe extern "C" fn host_lookup(
	frame: *mut c_void,
	name: *const u8,
	name_len: usize,
	kind: u32,
	out: *mut RawValue,
) -> c_int {
	let Some( frame ) = ( unsafe { frame_ref( frame )}) else { return status::INVALID };
	if name.is_null() || out.is_null() { return status::INVALID }
	let Ok( name ) = std::str::from_utf8( unsafe { std::slice::from_raw_parts( name, name_len )}) else { return status::INVALID };
	let Some( kind ) = Kind::from_raw( kind ) else { return status::INVALID };

	match frame.arguments.lookup( name, kind ) {
		Ok( argument ) => {
			unsafe { out.write( RawValue::encode( argument.value(), argument.is_output() )) };
			status::OK
		}
		Err( ArgumentError::ArgumentTypeMismatch { found, .. }) => {
			debug!( function = frame.function, argument = name, %kind, %found, "Argument requested with the wrong kind" );
			unsafe { out.write( RawValue::of_kind( found )) };
			status::TYPE_MISMATCH
		}
		Err( _ ) => {
			debug!( function = frame.function, argument = name, "Argument not found" );
			status::NOT_FOUND
		}
	}
}

unsafe extern "C" fn host_set_return( frame: *mut c_void, value: *const RawValue ) -> c_int {
	let Some( frame ) = ( unsafe { frame_ref( frame )}) else { return status::INVALID };
	let Some( raw ) = ( unsafe { value.as_ref() }) else { return status::INVALID };
	match unsafe { raw.decode( true ) } {
		Ok( value ) => {
			if let Some( previous ) = frame.slot.set( value ) {
				debug!( function = frame.function, previous = %previous, "Return value overwritten" );
			}
			status::OK
		}
		Err( err ) => {
			warn!( function = frame.function, error = %err, "Rejected malformed return value" );
			status::INVALID
		}
	}
}
