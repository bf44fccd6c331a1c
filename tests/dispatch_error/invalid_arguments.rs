use dylib_link::{ ArgumentError, DispatchError, Kind, Module };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

#[test]
fn dispatch_error_count_mismatch() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I32 ), 2, [( "n", Kind::I32, 1_i32 )]) {
		Err( DispatchError::Argument( ArgumentError::ArgumentCountMismatch { expected: 2, supplied: 1 })) => {}
		value => panic!( "Expected ArgumentCountMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_duplicate_name() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "count_args", None, 2, [( "a", Kind::I32, 1_i32 ), ( "a", Kind::I32, 2_i32 )]) {
		Err( DispatchError::Argument( ArgumentError::DuplicateArgumentName( name ))) if name == "a" => {}
		value => panic!( "Expected DuplicateArgumentName, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_declared_kind_checked_before_call() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I32 ), 1, [( "n", Kind::I64, 41_i64 )]) {
		Err( DispatchError::Argument( ArgumentError::ArgumentTypeMismatch { expected: Kind::I32, found: Kind::I64, .. })) => {}
		value => panic!( "Expected ArgumentTypeMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_declared_argument_missing() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I32 ), 1, [( "m", Kind::I32, 41_i32 )]) {
		Err( DispatchError::Argument( ArgumentError::ArgumentNotFound( name ))) if name == "n" => {}
		value => panic!( "Expected ArgumentNotFound, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_declared_kind_mismatch_at_call_site() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I32 ), 1, [( "n", Kind::I32, 41_i64 )]) {
		Err( DispatchError::Argument( ArgumentError::ArgumentTypeMismatch { expected: Kind::I32, found: Kind::I64, .. })) => {}
		value => panic!( "Expected ArgumentTypeMismatch, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn dispatch_error_undeclared_argument() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "add_one", Some( Kind::I32 ), 2, [( "n", Kind::I32, 41_i32 ), ( "extra", Kind::I32, 0_i32 )]) {
		Err( DispatchError::Argument( ArgumentError::ArgumentNotFound( name ))) if name == "extra" => {}
		value => panic!( "Expected ArgumentNotFound, found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}
