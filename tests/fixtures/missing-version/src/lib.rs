use std::ffi::{ c_char, c_int };



#[no_mangle]
pub extern "C" fn plugin_name() -> *const c_char { c"missing-version".as_ptr() }

#[no_mangle]
pub extern "C" fn plugin_author() -> *const c_char { c"dylib-link".as_ptr() }

#[no_mangle]
pub extern "C" fn plugin_description() -> *const c_char { c"Lacks plugin_version".as_ptr() }

#[no_mangle]
pub extern "C" fn plugin_init() -> c_int { 0 }

#[no_mangle]
pub extern "C" fn plugin_uninit() {}
