//! Async poll loop driving one widget session.
//!
//! The loop ticks the session on a fixed interval and additionally wakes at
//! the next pending-write deadline so debounced saves land on time even
//! with a slow poll interval. Every tick and command takes the session lock,
//! so they never interleave.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::bridge::{DesktopBridge, WindowBridge};
use crate::session::{WidgetSession, WidgetSnapshot};

/// A session shared between its poll loop and command handlers.
pub type SharedSession<D, W> = Arc<Mutex<WidgetSession<D, W>>>;

/// Wraps a session for sharing.
pub fn shared<D, W>(session: WidgetSession<D, W>) -> SharedSession<D, W> { Arc::new(Mutex::new(session)) }

/// Changes the store underneath several sessions.
///
/// Every session is locked, in the order given, for the whole call: pending
/// edits are written, `rewrite` runs, then each session reloads. No tick or
/// command can slip an edit in between, so the reload never discards one.
/// Callers pass the sessions in a stable order.
pub fn rewrite_sessions<D, W, T>(sessions: &[SharedSession<D, W>], rewrite: impl FnOnce() -> T) -> T
where
    D: DesktopBridge,
    W: WindowBridge,
{
    let mut guards: Vec<_> = sessions.iter().map(|session| session.lock()).collect();
    for session in &mut guards {
        session.flush_all();
    }
    let result = rewrite();
    for session in &mut guards {
        session.reload();
    }
    result
}

/// Runs until `stop` turns `true` or its sender is dropped.
///
/// `on_change` is called with the session snapshot after every tick that
/// changed it, and once after the first tick.
pub async fn run_poll_loop<D, W, F>(
    session: SharedSession<D, W>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
    mut on_change: F,
) where
    D: DesktopBridge,
    W: WindowBridge,
    F: FnMut(&WidgetSnapshot),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<WidgetSnapshot> = None;

    loop {
        if *stop.borrow() {
            break;
        }
        let deadline = session.lock().next_deadline();

        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = {
                    let mut session = session.lock();
                    session.tick(Instant::now().into_std());
                    session.snapshot()
                };
                if last.as_ref() != Some(&snapshot) {
                    on_change(&snapshot);
                    last = Some(snapshot);
                }
            }
            () = wait_until(deadline) => {
                let flushed = session.lock().flush_due(Instant::now().into_std());
                tracing::trace!("poller: flushed {flushed} pending writes");
            }
            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("poller: stopped");
}

async fn wait_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}
