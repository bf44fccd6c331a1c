use dylib_link::{ Kind, Module, Value };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

#[test]
fn dispatch_strings_round_trip() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	match module.call_with( "concat", Some( Kind::String ), 2, [
		( "left", Kind::String, "héllo, " ),
		( "right", Kind::String, "wörld" ),
	]) {
		Ok( value ) if value.as_str() == Some( "héllo, wörld" ) => {}
		value => panic!( "Expected Ok( String( \"héllo, wörld\" )), found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn argument_values_are_shared_not_consumed() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	let left = Value::string( "kept" );
	let result = module.call_with( "concat", Some( Kind::String ), 2, [
		( "left", Kind::String, left.retain() ),
		( "right", Kind::String, Value::string( "!" )),
	]);

	assert_eq!( left.ref_count(), 1 );
	assert_eq!( left.as_str(), Some( "kept" ));
	match result {
		Ok( value ) if value.as_str() == Some( "kept!" ) => {}
		value => panic!( "Expected Ok( String( \"kept!\" )), found: {:#?}", value ),
	}

	module.unload().expect( "Failed to unload calc" );

}
