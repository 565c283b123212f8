//! FFI bindings for Persona Flux
//!
//! This module provides C-compatible functions for calling Flux from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `persona_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{events_to_profile, ProfileEngine};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score an event log and return profile JSON.
///
/// # Safety
/// - `events_json`, `base_json`, and `tuning_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_events_to_profile(
    events_json: *const c_char,
    base_json: *const c_char,
    tuning_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(events) = cstr_to_string(events_json) else {
        set_last_error("Invalid events string pointer");
        return ptr::null_mut();
    };
    let Some(base) = cstr_to_string(base_json) else {
        set_last_error("Invalid base config string pointer");
        return ptr::null_mut();
    };
    let Some(tuning) = cstr_to_string(tuning_json) else {
        set_last_error("Invalid tuning config string pointer");
        return ptr::null_mut();
    };

    match events_to_profile(events, base, tuning) {
        Ok(profile) => string_to_cstr(&profile),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a ProfileEngine
pub struct ProfileEngineHandle {
    engine: ProfileEngine,
}

/// Build an engine from the two configuration documents.
///
/// # Safety
/// - `base_json` and `tuning_json` must be valid null-terminated C strings.
/// - Must be freed with `persona_engine_free`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_engine_new(
    base_json: *const c_char,
    tuning_json: *const c_char,
) -> *mut ProfileEngineHandle {
    clear_last_error();

    let (Some(base), Some(tuning)) = (cstr_to_string(base_json), cstr_to_string(tuning_json))
    else {
        set_last_error("Invalid config string pointer");
        return ptr::null_mut();
    };

    match ProfileEngine::from_json(&base, &tuning) {
        Ok(engine) => Box::into_raw(Box::new(ProfileEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `persona_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_engine_free(engine: *mut ProfileEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Score an event log with an engine and return profile JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `persona_engine_new`.
/// - `events_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `persona_free_string`.
/// - Returns NULL on error; call `persona_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn persona_engine_score(
    engine: *const ProfileEngineHandle,
    events_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let Some(events) = cstr_to_string(events_json) else {
        set_last_error("Invalid events string pointer");
        return ptr::null_mut();
    };

    match handle.engine.score_json(&events) {
        Ok(profile) => string_to_cstr(&profile),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Flux.
///
/// # Safety
/// - `s` must be a pointer returned by a Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn persona_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn persona_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn persona_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
