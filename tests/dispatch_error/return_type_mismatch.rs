use dylib_link::{ ArgumentBundle, DispatchError, Kind, Module };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

#[test]
fn dispatch_error_value_of_other_kind() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call( "wrong_kind", Some( Kind::I32 ), &ArgumentBundle::empty() ) {
		Err( DispatchError::ReturnTypeMismatch { expected: Kind::I32, found: Kind::String, .. }) => {}
		value => panic!( "Expected ReturnTypeMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_width_is_exact() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "negate", Some( Kind::I32 ), 1, [( "flag", Kind::Bool, true )]) {
		Err( DispatchError::ReturnTypeMismatch { expected: Kind::I32, found: Kind::Bool, .. }) => {}
		value => panic!( "Expected ReturnTypeMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_declared_return_checked_before_call() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I64 ), 1, [( "n", Kind::I32, 1_i32 )]) {
		Err( DispatchError::ReturnTypeMismatch { function, expected: Kind::I64, found: Kind::I32 }) if function == "add_one" => {}
		value => panic!( "Expected ReturnTypeMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}
