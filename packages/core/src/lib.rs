//! Deskmate core - the synchronization engine behind the per-desktop widget.
//!
//! The widget keeps one title and one task list per virtual desktop and
//! follows the user as they move between desktops. This crate holds every
//! piece of that behavior that does not need a window system:
//!
//! - `geometry` - anchor snap positions on a monitor
//! - `debounce` - coalescing of rapid writes per key
//! - `workspace` - the in-memory cache of per-desktop data
//! - `drift` - anchored/free tracking and auto-snap
//! - `collapse` - collapsed/expanded sizing
//! - `switcher` - detection of the active desktop
//! - `session` - one widget window's state, wired to its platform bridges
//! - `poller` - the async loop that drives a session
//! - `store` - the JSON data file shared by every window
//! - `config` - JSONC configuration loading
//!
//! Platform access goes through the traits in `bridge`, so the whole engine
//! runs against fakes in tests.

pub mod bridge;
pub mod collapse;
pub mod config;
pub mod debounce;
pub mod drift;
pub mod error;
pub mod geometry;
pub mod poller;
pub mod schema;
pub mod session;
pub mod store;
pub mod switcher;
pub mod types;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{DesktopBridge, WindowBridge};
pub use error::{BridgeError, BridgeResult, StoreError};
pub use geometry::{Anchor, AnchorMode, MonitorBounds, Position, WindowSize};
pub use poller::{SharedSession, rewrite_sessions, run_poll_loop};
pub use session::{SessionOptions, TickReport, WidgetSession, WidgetSnapshot};
pub use types::{ActiveWorkspace, TaskItem, WorkspaceId, WorkspaceRecord};
