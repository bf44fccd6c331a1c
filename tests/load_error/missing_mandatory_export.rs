use dylib_link::{ LoadError, Module };

fixtures! {
	plugins = [ missing_version: "fixture-missing-version" ];
}

#[test]
fn load_error_missing_version() {

	let plugins = fixtures::plugins();

	match Module::load( &plugins.missing_version ) {
		Err( LoadError::MissingMandatoryExport { symbol, .. }) if symbol == "plugin_version" => {}
		value => panic!( "Expected MissingMandatoryExport( plugin_version ), found: {:#?}", value ),
	}

}

#[test]
fn info_error_missing_version() {

	let plugins = fixtures::plugins();

	match Module::info_from_path( &plugins.missing_version ) {
		Err( LoadError::MissingMandatoryExport { symbol, .. }) if symbol == "plugin_version" => {}
		value => panic!( "Expected MissingMandatoryExport( plugin_version ), found: {:#?}", value ),
	}

}
