//! Centralized event definitions for Tauri frontend communication.
//!
//! All events emitted to the frontend are defined here to ensure consistency
//! and make it easy to keep Rust and TypeScript in sync.
//!
//! ## Naming Convention
//!
//! All events follow the pattern: `deskmate://<module>/<event-name>`
//!
//! - `deskmate://` - Prefix identifying this as a Deskmate event
//! - `<module>` - The module/feature that owns the event (e.g., `widget`, `workspace`)
//! - `<event-name>` - Descriptive kebab-case name for the event

/// Widget window events.
pub mod widget {
    /// Emitted to one widget window when its state changed during a poll.
    ///
    /// Payload: `WidgetSnapshot`
    pub const STATE_CHANGED: &str = "deskmate://widget/state-changed";

    /// Emitted to every window after displays were added, removed or rearranged.
    ///
    /// Payload: `usize` (number of displays)
    pub const MONITORS_CHANGED: &str = "deskmate://widget/monitors-changed";
}

/// Stored workspace data events.
pub mod workspace {
    /// Emitted to every window after the stored data changed outside a
    /// single widget (new session, restored context, custom color).
    ///
    /// Payload: `()` (no payload)
    pub const DATA_CHANGED: &str = "deskmate://workspace/data-changed";
}
