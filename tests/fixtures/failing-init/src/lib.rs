use dylib_link::{ export_plugin, export_function, Call, CalleeError };



export_plugin! {
	name: "failing-init",
	version: "0.1.0",
	author: "dylib-link",
	description: "Refuses to initialise",
	init: init,
	uninit: uninit,
}

fn init() -> bool { false }

fn uninit() {}

export_function!( unreachable_export => never_runs );

fn never_runs( call: &mut Call ) -> Result<(), CalleeError> {
	call.set_return( 0_i32 )
}
