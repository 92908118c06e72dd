//! Accessibility permission utilities for macOS.
//!
//! Switching desktops sends synthetic Control+Arrow key presses, which macOS
//! only delivers for processes the user trusted in
//! System Settings > Privacy & Security > Accessibility.

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use core_foundation_sys::dictionary::CFDictionaryRef;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
}

const K_AX_TRUSTED_CHECK_OPTION_PROMPT: &str = "AXTrustedCheckOptionPrompt";

/// Returns `true` if the process may post synthetic keyboard events.
#[must_use]
pub fn is_trusted() -> bool { unsafe { AXIsProcessTrusted() } }

/// Checks the permission and shows the system prompt when it is missing.
///
/// Returns the permission state at the time of the call. A grant made from
/// the prompt usually takes effect only after the app restarts.
#[must_use]
pub fn check_and_prompt() -> bool {
    let key = CFString::new(K_AX_TRUSTED_CHECK_OPTION_PROMPT);
    let value = CFBoolean::true_value();

    let pairs = [(key.as_CFType(), value.as_CFType())];
    let options = CFDictionary::from_CFType_pairs(&pairs);

    unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) }
}
