//! Session log shared by the engine and the CLI.
//!
//! One file per run, truncated on [`init`]. It lives at
//! `<data dir>/PhotoSmith/photosmith.log` unless `PHOTOSMITH_LOG` names
//! another path. Every line carries the time since the session started, so
//! per-filter durations can be read straight off the log.
//!
//! Writes before `init` are dropped, which keeps library use and tests free
//! of any setup.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

struct Session {
    file: Mutex<File>,
    started: Instant,
}

static SESSION: OnceLock<Session> = OnceLock::new();

/// Line tag. `Progress` is reserved for [`LogSink`](crate::ops::progress::LogSink).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Progress,
    Panic,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Progress => "PROGRESS",
            Level::Panic => "PANIC",
        }
    }
}

/// Append one line. I/O errors are swallowed; a full disk must not abort a
/// filter run.
pub fn write(level: Level, msg: &str) {
    let Some(session) = SESSION.get() else {
        return;
    };
    let elapsed = session.started.elapsed().as_secs_f64();
    if let Ok(mut file) = session.file.lock() {
        let _ = writeln!(file, "+{:>9.3}s {:<8} {}", elapsed, level.tag(), msg);
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Open the session log and route panics into it. Returns the file path, or
/// `None` when the file could not be created (the run continues unlogged).
pub fn init() -> Option<PathBuf> {
    let path = std::env::var_os("PHOTOSMITH_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("PhotoSmith").join("photosmith.log"));

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: session log {} unavailable: {}", path.display(), e);
            return None;
        }
    };
    let _ = SESSION.set(Session {
        file: Mutex::new(file),
        started: Instant::now(),
    });

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        previous(info);
    }));

    Some(path)
}

fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share"),
        None => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_before_init_are_dropped() {
        // No session in unit tests; this must simply return.
        write(Level::Info, "nobody is listening");
        crate::log_warn!("still {}", "fine");
    }

    #[test]
    fn level_tags() {
        assert_eq!(Level::Progress.tag(), "PROGRESS");
        assert_eq!(Level::Error.tag(), "ERROR");
    }
}
