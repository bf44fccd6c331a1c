use dylib_link::{ Kind, Module };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

#[test]
fn one_module_serves_many_threads() {

	let plugins = fixtures::plugins();
	let mut module = Module::load( &plugins.calc ).expect( "Failed to load calc" );

	std::thread::scope(| scope | {
		for thread in 0..8_i32 {
			let module = &module ;
			scope.spawn( move || {
				for n in 0..200_i32 {
					let input = thread * 1000 + n ;
					match module.call_with( "add_one", Some( Kind::I32 ), 1, [( "n", Kind::I32, input )]) {
						Ok( value ) if value.as_i32() == Some( input + 1 ) => {}
						value => panic!( "Expected Ok( I32( {} )), found: {:#?}", input + 1, value ),
					}
				}
			});
		}
	});

	module.unload().expect( "Failed to unload calc" );

}

#[test]
fn modules_load_concurrently() {

	let plugins = fixtures::plugins();

	std::thread::scope(| scope | {
		for _ in 0..4 {
			let path = &plugins.calc ;
			scope.spawn( move || {
				let mut module = Module::load( path ).expect( "Failed to load calc" );
				assert_eq!( module.name(), "calc" );
				module.unload().expect( "Failed to unload calc" );
			});
		}
	});

}
