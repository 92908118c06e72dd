//! macOS platform abstractions for Deskmate.
//!
//! - [`accessibility`] - Accessibility permission utilities
//! - [`displays`] - Display reconfiguration notifications
//! - [`keyboard`] - Synthetic key presses for desktop switching
//! - [`spaces`] - Desktop (Space) enumeration via the window server
//! - [`window`] - Window level and collection behavior via `AppKit`

pub mod accessibility;
pub mod displays;
pub mod keyboard;
pub mod spaces;
pub mod window;

pub use window::{active_display_count, make_floating_widget};
