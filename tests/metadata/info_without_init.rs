use dylib_link::{ Kind, Module };

fixtures! {
	plugins = [ calc: "fixture-calc" ];
}

fn init_calls( module: &Module ) -> Option<u32> {
	module.call_with( "init_calls", Some( Kind::U32 ), 0, Vec::<( &str, Kind, u32 )>::new() ).ok()?.as_u32()
}

#[test]
fn info_from_path_does_not_initialise() {

	let plugins = fixtures::plugins();
	let calc = crate::fixture_building::isolated_copy( &plugins.calc, "info_without_init" );

	let mut module = Module::load( &calc ).expect( "Failed to load calc" );
	assert_eq!( init_calls( &module ), Some( 1 ));

	let info = Module::info_from_path( &calc ).expect( "Failed to read calc metadata" );
	assert_eq!( info.name, "calc" );
	assert_eq!( info.version, "1.0.0" );
	assert_eq!( info.api.as_ref().map(| api | api.functions.len() ), Some( 2 ));
	assert_eq!( module.info(), &info );
	assert_eq!( init_calls( &module ), Some( 1 ), "plugin_init ran while reading metadata" );

	module.unload().expect( "Failed to unload calc" );

}
