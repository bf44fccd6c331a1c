use dylib_link::{ Argument, ArgumentBundle, ArgumentError, Kind };

fn bundle() -> ArgumentBundle<'static> {
	ArgumentBundle::from_arguments([
		Argument::new( "count", 3_u32 ),
		Argument::new( "label", "widgets" ),
	]).expect( "Failed to build bundle" )
}

#[test]
fn lookup_by_name_and_kind() {

	let bundle = bundle();
	match bundle.lookup( "label", Kind::String ) {
		Ok( argument ) => assert_eq!( argument.value().as_str(), Some( "widgets" )),
		value => panic!( "Expected Ok( label ), found: {:#?}", value ),
	}

}

#[test]
fn lookup_missing_name() {

	match bundle().lookup( "absent", Kind::U32 ) {
		Err( ArgumentError::ArgumentNotFound( name )) if name == "absent" => {}
		value => panic!( "Expected ArgumentNotFound, found: {:#?}", value ),
	}

}

#[test]
fn lookup_with_wrong_kind() {

	match bundle().lookup( "count", Kind::I32 ) {
		Err( ArgumentError::ArgumentTypeMismatch { name, expected: Kind::I32, found: Kind::U32 }) if name == "count" => {}
		value => panic!( "Expected ArgumentTypeMismatch, found: {:#?}", value ),
	}
	match bundle().lookup( "count", Kind::Float ) {
		Err( ArgumentError::ArgumentTypeMismatch { expected: Kind::Float, found: Kind::U32, .. }) => {}
		value => panic!( "Expected ArgumentTypeMismatch, found: {:#?}", value ),
	}

}

#[test]
fn output_argument_borrows_buffer() {

	let mut buffer = [ 0_u8; 16 ];
	let address = buffer.as_ptr() as usize ;
	{
		let mut builder = ArgumentBundle::begin( 1 );
		builder.add_output( "out", &mut buffer ).expect( "add out" );
		let bundle = builder.finish().expect( "Failed to finish bundle" );

		let argument = bundle.lookup( "out", Kind::Pointer ).expect( "lookup out" );
		assert!( argument.is_output() );
		match argument.value().as_pointer() {
			Some( pointer ) => {
				assert!( !pointer.owns_copy() );
				assert_eq!( pointer.addr() as usize, address );
				assert_eq!( pointer.len(), 16 );
			}
			value => panic!( "Expected Some( RawPointer ), found: {:#?}", value ),
		}
	}
	assert_eq!( buffer, [ 0_u8; 16 ]);

}
