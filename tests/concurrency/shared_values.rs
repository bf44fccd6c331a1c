use dylib_link::Value ;

#[test]
fn retain_and_release_across_threads() {

	let value = Value::string( "contended" );

	std::thread::scope(| scope | {
		for _ in 0..8 {
			let value = &value ;
			scope.spawn( move || {
				for _ in 0..10_000 {
					let held = value.retain();
					assert_eq!( held.as_str(), Some( "contended" ));
					held.release();
				}
			});
		}
	});

	assert_eq!( value.ref_count(), 1 );

}

#[test]
fn last_holder_may_be_on_another_thread() {

	let value = Value::bytes( &[ 9; 64 ]);
	let handles = ( 0..4 )
		.map(|_| value.retain() )
		.map(| held | std::thread::spawn( move || held.ref_count() >= 1 ))
		.collect::<Vec<_>>();
	value.release();

	for handle in handles {
		assert!( handle.join().expect( "Thread panicked" ));
	}

}
