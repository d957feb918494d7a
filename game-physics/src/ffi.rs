//! C ABI entry points matching `include/game_physics.h`.
//!
//! Every non-null pointer returned here is a NUL-terminated JSON buffer owned
//! by the caller until it is handed back to [`game_physics_free_string`].
//! Errors come back as `{"error": "..."}` buffers, never as null.

use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};

use log::warn;

use crate::boundary::{BoundaryError, TextRequest, error_text, generate_course_text, verify_text};
use crate::config::EngineConfig;
use crate::games::GameKind;

/// A response buffer with exactly one owner at a time.
#[derive(Debug)]
pub struct OwnedBuffer(CString);

impl OwnedBuffer {
    #[must_use]
    pub fn from_text(text: String) -> Self {
        match CString::new(text) {
            Ok(buffer) => Self(buffer),
            Err(err) => {
                let bytes: Vec<u8> = err.into_vec().into_iter().filter(|b| *b != 0).collect();
                Self(CString::new(bytes).unwrap_or_default())
            }
        }
    }

    /// Hand ownership to the caller.
    #[must_use]
    pub fn into_raw(self) -> *mut c_char {
        self.0.into_raw()
    }

    /// Take ownership back from a pointer produced by [`OwnedBuffer::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer returned by `into_raw` that has not
    /// been reclaimed already.
    pub unsafe fn reclaim(ptr: *mut c_char) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(unsafe { CString::from_raw(ptr) }))
        }
    }

    /// Buffer contents; lossy only if a host wrote into it.
    #[must_use]
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        self.0.to_string_lossy()
    }
}

/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated string valid for `'a`.
unsafe fn read_param<'a>(ptr: *const c_char, param: &'static str) -> Result<&'a str, BoundaryError> {
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer { param });
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| BoundaryError::InvalidUtf8 { param })
}

/// # Safety
///
/// Same contract as [`read_param`]; null means the parameter was omitted.
unsafe fn read_optional<'a>(
    ptr: *const c_char,
    param: &'static str,
) -> Result<Option<&'a str>, BoundaryError> {
    if ptr.is_null() {
        Ok(None)
    } else {
        unsafe { read_param(ptr, param) }.map(Some)
    }
}

fn respond(call: impl FnOnce() -> Result<String, BoundaryError>) -> *mut c_char {
    let text = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => error_text(&err),
        Err(_) => {
            warn!("panic caught at the foreign-call boundary");
            error_text(&"internal error")
        }
    };
    OwnedBuffer::from_text(text).into_raw()
}

/// # Safety
///
/// `seed` must be null or a valid NUL-terminated string.
unsafe fn generate(kind: GameKind, seed: *const c_char) -> *mut c_char {
    respond(|| {
        let seed = unsafe { read_param(seed, "seed") }?;
        generate_course_text(kind, seed, &EngineConfig::default())
    })
}

/// # Safety
///
/// Every pointer must be null or a valid NUL-terminated string.
unsafe fn verify(
    kind: GameKind,
    seed: *const c_char,
    inputs: *const c_char,
    claimed_score: i32,
    course: *const c_char,
    breakdown: *const c_char,
) -> *mut c_char {
    respond(|| {
        let request = TextRequest {
            seed: unsafe { read_param(seed, "seed") }?,
            inputs: unsafe { read_param(inputs, "inputs_json") }?,
            claimed_score: i64::from(claimed_score),
            course: unsafe { read_param(course, "obstacle_data_json") }?,
            breakdown: unsafe { read_optional(breakdown, "breakdown_json") }?,
        };
        verify_text(kind, &request, &EngineConfig::default())
    })
}

/// Release a buffer returned by any other entry point. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a buffer from this library not yet released.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn game_physics_free_string(ptr: *mut c_char) {
    drop(unsafe { OwnedBuffer::reclaim(ptr) });
}

/// # Safety
///
/// `seed` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rocketsol_generate_obstacles(seed: *const c_char) -> *mut c_char {
    unsafe { generate(GameKind::RocketSol, seed) }
}

/// RocketSol carries no breakdown.
///
/// # Safety
///
/// Every pointer must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rocketsol_verify(
    seed: *const c_char,
    inputs_json: *const c_char,
    claimed_score: i32,
    obstacle_data_json: *const c_char,
) -> *mut c_char {
    unsafe {
        verify(
            GameKind::RocketSol,
            seed,
            inputs_json,
            claimed_score,
            obstacle_data_json,
            std::ptr::null(),
        )
    }
}

/// # Safety
///
/// `seed` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drivehard_generate_obstacles(seed: *const c_char) -> *mut c_char {
    unsafe { generate(GameKind::DriveHard, seed) }
}

/// # Safety
///
/// Every pointer must be null or a valid NUL-terminated string.
/// `breakdown_json` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn drivehard_verify(
    seed: *const c_char,
    inputs_json: *const c_char,
    claimed_score: i32,
    obstacle_data_json: *const c_char,
    breakdown_json: *const c_char,
) -> *mut c_char {
    unsafe {
        verify(
            GameKind::DriveHard,
            seed,
            inputs_json,
            claimed_score,
            obstacle_data_json,
            breakdown_json,
        )
    }
}

/// # Safety
///
/// `seed` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn warp_generate_obstacles(seed: *const c_char) -> *mut c_char {
    unsafe { generate(GameKind::Warp, seed) }
}

/// # Safety
///
/// Every pointer must be null or a valid NUL-terminated string.
/// `breakdown_json` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn warp_verify(
    seed: *const c_char,
    inputs_json: *const c_char,
    claimed_score: i32,
    obstacle_data_json: *const c_char,
    breakdown_json: *const c_char,
) -> *mut c_char {
    unsafe {
        verify(
            GameKind::Warp,
            seed,
            inputs_json,
            claimed_score,
            obstacle_data_json,
            breakdown_json,
        )
    }
}
