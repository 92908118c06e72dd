//! Synthetic Control+Arrow presses used to move between desktops.
//!
//! The presses go through `osascript` and System Events, so they require the
//! accessibility permission (see [`super::accessibility`]).

use std::process::Command;
use std::thread;
use std::time::Duration;

const KEY_CODE_LEFT_ARROW: u16 = 123;
const KEY_CODE_RIGHT_ARROW: u16 = 124;

/// Pause between presses so Mission Control finishes each slide.
pub const PRESS_INTERVAL: Duration = Duration::from_millis(300);

/// Arrow key for a signed desktop distance, `None` for zero.
#[must_use]
pub const fn arrow_key_for(steps: i32) -> Option<u16> {
    match steps {
        0 => None,
        s if s > 0 => Some(KEY_CODE_RIGHT_ARROW),
        _ => Some(KEY_CODE_LEFT_ARROW),
    }
}

fn press_script(key_code: u16) -> String {
    format!("tell application \"System Events\" to key code {key_code} using control down")
}

fn press_with_control(key_code: u16) -> std::io::Result<()> {
    let output = Command::new("osascript").arg("-e").arg(press_script(key_code)).output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(String::from_utf8_lossy(&output.stderr).trim().to_string()))
    }
}

/// Moves `steps` desktops to the right (positive) or left (negative).
///
/// Blocks for roughly `|steps| * PRESS_INTERVAL`.
///
/// # Errors
///
/// Returns the first failed press; earlier presses already took effect.
pub fn move_desktops(steps: i32) -> std::io::Result<()> {
    let Some(key_code) = arrow_key_for(steps) else {
        return Ok(());
    };

    for press in 0..steps.unsigned_abs() {
        if press > 0 {
            thread::sleep(PRESS_INTERVAL);
        }
        press_with_control(key_code)?;
    }
    tracing::debug!(steps, "sent desktop switch key presses");
    Ok(())
}
