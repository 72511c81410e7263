//! C FFI bindings for the Hadron particle engine.
//!
//! Engines live in a process-wide handle table and are addressed from C
//! by `u64` handles. Every entry point catches panics and reports them as
//! [`HadronStatus::Panicked`]; the message is kept per thread and can be
//! read with [`hadron_last_panic_message`]. This is the only crate in
//! the workspace that contains `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

// ── Panic capture ───────────────────────────────────────────────

thread_local! {
    static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Remember the message carried by a caught panic payload.
#[doc(hidden)]
pub fn record_panic(payload: Box<dyn Any + Send>) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    };
    log::warn!("panic caught at FFI boundary: {message}");
    LAST_PANIC.with(|slot| *slot.borrow_mut() = message);
}

/// Run a status-returning body, converting a panic into
/// [`HadronStatus::Panicked`]. `return` inside the body leaves the guard.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::HadronStatus::Panicked as i32, $body)
    };
}

/// Like `ffi_guard!`, but yields `$default` when the body panics.
macro_rules! ffi_guard_or {
    ($default:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(payload);
                $default
            }
        }
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing guard body
/// if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::HadronStatus::InternalError as i32,
        }
    };
}

pub mod engine;
mod handle;
pub mod status;
pub mod types;

pub use status::HadronStatus;
pub use types::{HadronLink, HadronParameters, HadronParticleInfo, HadronWorkerMetrics};

/// Copy the calling thread's most recent panic message into `buf`.
///
/// Returns the full message length in bytes, excluding the terminator,
/// or 0 if no panic has been caught on this thread. At most `cap - 1`
/// bytes are written, followed by a NUL. `buf` may be null to query the
/// length.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hadron_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|slot| {
        let message = slot.borrow();
        let bytes = message.as_bytes();
        if !buf.is_null() && cap > 0 {
            let n = bytes.len().min(cap - 1);
            // SAFETY: caller guarantees `buf` points to at least `cap`
            // writable bytes; we write `n + 1 <= cap`.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}
