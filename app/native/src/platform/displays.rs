//! Display reconfiguration notifications from CoreGraphics.
//!
//! The window server reports a change once per affected display, each with a
//! "begin" and a completion notification. A burst of completions collapses
//! into one handler call, made on a helper thread after the display list has
//! settled.

use std::ffi::c_void;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// `kCGDisplayBeginConfigurationFlag`.
const BEGIN_CONFIGURATION_FLAG: u32 = 1 << 0;

/// How long the window server needs to publish the new display list.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

type ReconfigurationCallback = extern "C" fn(display: u32, flags: u32, user_info: *mut c_void);

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: ReconfigurationCallback,
        user_info: *mut c_void,
    ) -> i32;
}

type Handler = Box<dyn Fn() + Send + Sync>;

static HANDLER: OnceLock<Handler> = OnceLock::new();
static SCHEDULED: AtomicBool = AtomicBool::new(false);

/// Whether a notification marks the end of a reconfiguration.
#[must_use]
pub const fn is_completion(flags: u32) -> bool { flags & BEGIN_CONFIGURATION_FLAG == 0 }

extern "C" fn on_reconfiguration(display: u32, flags: u32, _user_info: *mut c_void) {
    if !is_completion(flags) {
        return;
    }
    let Some(handler) = HANDLER.get() else {
        return;
    };
    if SCHEDULED.swap(true, Ordering::AcqRel) {
        return;
    }

    tracing::debug!(display, flags, "display reconfiguration detected");
    thread::spawn(move || {
        thread::sleep(SETTLE_DELAY);
        SCHEDULED.store(false, Ordering::Release);
        handler();
    });
}

/// Calls `handler` after every display reconfiguration.
///
/// Only the first registration takes effect. Returns `false` if a handler
/// was already installed or CoreGraphics rejected the callback.
pub fn observe(handler: impl Fn() + Send + Sync + 'static) -> bool {
    if HANDLER.set(Box::new(handler)).is_err() {
        return false;
    }

    let result = unsafe { CGDisplayRegisterReconfigurationCallback(on_reconfiguration, std::ptr::null_mut()) };
    if result != 0 {
        tracing::warn!(result, "failed to register display reconfiguration callback");
        return false;
    }
    true
}
