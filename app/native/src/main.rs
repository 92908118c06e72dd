#![allow(clippy::multiple_crate_versions)]

//! Deskmate - a floating notes and tasks widget that follows macOS desktops.
//!
//! This binary serves as both the desktop application and CLI:
//! - When called with no arguments or with `--desktop`: launches the widget
//! - When called with subcommands (e.g., `deskmate completed list`): runs CLI commands
//!
//! CLI commands work directly on the data file and do not need the app running.

// Emit a clear compile-time error if attempted to compile on unsupported platforms
#[cfg(not(target_os = "macos"))]
compile_error!("This application only supports macOS.");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Run as desktop app if:
    // - No arguments (just the binary name)
    // - First arg is --desktop
    // - Running from within an .app bundle
    let run_desktop = args.len() == 1
        || args.get(1).is_some_and(|arg| arg == "--desktop")
        || is_running_from_app_bundle();

    if run_desktop {
        deskmate_lib::run();
    } else if let Err(err) = deskmate_lib::cli::run() {
        eprintln!("deskmate: {err}");
        std::process::exit(1);
    }
}

/// Checks if the binary is running from within a macOS .app bundle.
///
/// When launched from Deskmate.app, the executable path will be something like:
/// `/Applications/Deskmate.app/Contents/MacOS/deskmate`
fn is_running_from_app_bundle() -> bool {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.to_str().map(|s| s.contains(".app/Contents/MacOS")))
        .unwrap_or(false)
}
