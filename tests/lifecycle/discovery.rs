use dylib_link::{ Loader, LoadError };

fixtures! {
	plugins = [
		calc: "fixture-calc",
		missing_version: "fixture-missing-version",
	];
}

#[test]
fn discover_reads_every_plugin_in_search_path() {

	let plugins = fixtures::plugins();
	let calc = crate::fixture_building::isolated_copy( &plugins.calc, "discovery_ok" );
	let directory = calc.parent().expect( "copy has a parent" );

	let ( found, errors ) = Loader::new().with_search_path( directory ).discover();
	assert_no_errors!( errors );

	match found.as_slice() {
		[( path, info )] if path == &calc && info.name == "calc" => {}
		value => panic!( "Expected [( calc, calc info )], found: {:#?}", value ),
	}

}

#[test]
fn discover_collects_invalid_plugins_as_errors() {

	let plugins = fixtures::plugins();
	let calc = crate::fixture_building::isolated_copy( &plugins.calc, "discovery_mixed" );
	crate::fixture_building::isolated_copy( &plugins.missing_version, "discovery_mixed" );
	let directory = calc.parent().expect( "copy has a parent" );

	let ( found, errors ) = Loader::new()
		.with_search_path( directory )
		.with_search_path( "/nonexistent/search/dir" )
		.discover();

	assert_eq!( found.iter().map(|( _, info )| info.name.as_str() ).collect::<Vec<_>>(), [ "calc" ]);
	match errors.as_slice() {
		[ LoadError::MissingMandatoryExport { symbol, .. }] if symbol == "plugin_version" => {}
		value => panic!( "Expected [ MissingMandatoryExport ], found: {:#?}", value ),
	}

}
