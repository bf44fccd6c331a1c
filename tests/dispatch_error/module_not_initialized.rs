use dylib_link::{ ArgumentBundle, DispatchError, Kind, Module };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

#[test]
fn dispatch_error_after_unload() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );
	module.unload().expect( "Failed to unload calc" );

	match module.call( "no_return", Some( Kind::Void ), &ArgumentBundle::empty() ) {
		Err( DispatchError::ModuleNotInitialized { .. }) => {}
		value => panic!( "Expected ModuleNotInitialized, found: {:#?}", value ),
	}
	match module.resolve( "nonexistent_function" ) {
		Err( DispatchError::ModuleNotInitialized { .. }) => {}
		value => panic!( "Expected ModuleNotInitialized, found: {:#?}", value ),
	}

}
