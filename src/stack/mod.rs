//! Call-stack capture for error nodes.
//!
//! Every terminal builder operation captures a [`StackTrace`] exactly once,
//! at the moment it is called. Frames are walked outward from the caller and
//! filtered:
//!
//! - frames of the Rust runtime (`std`, `core`, `alloc`, the test harness and
//!   the `backtrace` crate itself) are dropped,
//! - frames of faultline's own code are dropped, except for its unit tests;
//!   demo programs and integration tests are separate crates and therefore
//!   always kept.
//!
//! The remaining frames have their paths shortened (see
//! [`StackFilter::strip_path`]) and their function names reduced to
//! `function`, `Type::method` or `function::{{closure}}`.
//!
//! Without the `backtrace` feature, or when every frame was filtered out, the
//! caller location is recorded as a single frame without a function name.

mod source;
#[cfg(feature = "backtrace")]
mod symbol;

use core::{fmt, panic::Location};
use std::path::PathBuf;

use crate::settings::StackFilter;

pub(crate) use self::source::source_context;

/// One captured call site.
#[derive(Clone, Debug)]
pub struct StackFrame {
    /// Program counter of the frame, or `0` when only a location is known.
    pub pc: usize,
    /// Source file, shortened according to the installed [`StackFilter`].
    pub file: String,
    /// Shortened function name; empty when it could not be resolved.
    pub function: String,
    /// Line number; `0` when unknown.
    pub line: u32,
    source_path: Option<PathBuf>,
}

impl StackFrame {
    /// Creates a frame that only records a source location.
    pub fn from_location(location: &Location<'_>, filter: &StackFilter) -> Self {
        Self {
            pc: 0,
            file: filter.strip_path(location.file()),
            function: String::new(),
            line: location.line(),
            source_path: Some(PathBuf::from(location.file())),
        }
    }

    /// Returns `true` if both frames point at the same file, line and
    /// function, regardless of program counter.
    pub fn same_location(&self, other: &StackFrame) -> bool {
        self.file == other.file && self.function == other.function && self.line == other.line
    }

    pub(crate) fn source_path(&self) -> Option<&std::path::Path> {
        self.source_path.as_deref()
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if !self.function.is_empty() {
            write!(f, " {}()", self.function)?;
        }
        Ok(())
    }
}

/// The frames captured when an error node was created, innermost call first.
#[derive(Clone, Debug, Default)]
pub struct StackTrace {
    frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Captures the current call stack according to `filter`.
    #[track_caller]
    pub fn capture(filter: &StackFilter) -> Self {
        if !filter.enabled || filter.max_depth == 0 {
            return Self::default();
        }

        let location = Location::caller();
        let mut frames = capture_frames(filter);
        if frames.is_empty() {
            frames.push(StackFrame::from_location(location, filter));
        }
        Self { frames }
    }

    /// The captured frames, innermost call first.
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// The innermost captured frame.
    pub fn top(&self) -> Option<&StackFrame> {
        self.frames.first()
    }

    /// Returns `true` if no frame was captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Renders the frames as `  --- at file:line function()` lines, stopping
    /// before the first frame at the same location as `stop`.
    ///
    /// Used to avoid repeating the frames an inner error shares with the
    /// error that wrapped it.
    pub fn render_until(&self, stop: Option<&StackFrame>) -> String {
        let mut out = String::new();
        for frame in &self.frames {
            if frame.file.is_empty() {
                continue;
            }
            if stop.is_some_and(|stop| frame.same_location(stop)) {
                break;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("  --- at ");
            out.push_str(&frame.to_string());
        }
        out
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_until(None))
    }
}

#[cfg(feature = "backtrace")]
fn capture_frames(filter: &StackFilter) -> Vec<StackFrame> {
    use self::symbol::{FrameOrigin, classify, shorten_function_name};

    let mut frames = Vec::new();
    let mut skipped_unresolved = 0usize;

    backtrace::trace(|frame| {
        let pc = frame.ip() as usize;
        backtrace::resolve_frame(frame, |symbol| {
            if frames.len() >= filter.max_depth {
                return;
            }
            let (Some(name), Some(path)) = (symbol.name(), symbol.filename()) else {
                skipped_unresolved += 1;
                return;
            };

            let symbol_name = format!("{name:#}");
            let raw_path = path.to_string_lossy();
            if classify(&symbol_name, &raw_path) != FrameOrigin::User {
                return;
            }

            frames.push(StackFrame {
                pc,
                file: filter.strip_path(&raw_path),
                function: shorten_function_name(&symbol_name),
                line: symbol.lineno().unwrap_or(0),
                source_path: Some(path.to_path_buf()),
            });
        });

        frames.len() < filter.max_depth
    });

    if skipped_unresolved > 0 {
        log_trace!(skipped_unresolved, "skipped unresolved stack frames");
    }

    frames
}

#[cfg(not(feature = "backtrace"))]
fn capture_frames(_filter: &StackFilter) -> Vec<StackFrame> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn a() -> StackTrace {
        b()
    }

    #[inline(never)]
    fn b() -> StackTrace {
        c()
    }

    #[inline(never)]
    fn c() -> StackTrace {
        d()
    }

    #[inline(never)]
    fn d() -> StackTrace {
        e()
    }

    #[inline(never)]
    fn e() -> StackTrace {
        f()
    }

    #[inline(never)]
    fn f() -> StackTrace {
        StackTrace::capture(&StackFilter::default())
    }

    fn frame(file: &str, line: u32, function: &str) -> StackFrame {
        StackFrame {
            pc: 0,
            file: file.to_owned(),
            function: function.to_owned(),
            line,
            source_path: None,
        }
    }

    #[test]
    #[cfg(feature = "backtrace")]
    fn test_capture_nested_calls() {
        let stack = a();
        let names: Vec<&str> = stack
            .frames()
            .iter()
            .map(|frame| frame.function.as_str())
            .collect();
        assert_eq!(
            names[..7],
            ["f", "e", "d", "c", "b", "a", "test_capture_nested_calls"]
        );
        // Past the test function only the harness closure wrapping it is kept.
        assert!(names.len() <= 8, "{names:?}");
        assert!(
            names[7..]
                .iter()
                .all(|name| name.starts_with("test_capture_nested_calls::")),
            "{names:?}"
        );
        for frame in stack.frames() {
            assert!(frame.file.ends_with("mod.rs"), "unexpected file {}", frame.file);
            assert!(frame.line > 0);
        }
    }

    #[test]
    fn test_capture_respects_max_depth() {
        let filter = StackFilter {
            max_depth: 2,
            ..StackFilter::default()
        };
        let stack = StackTrace::capture(&filter);
        assert!(!stack.is_empty());
        assert!(stack.frames().len() <= 2);
    }

    #[test]
    fn test_capture_disabled() {
        let filter = StackFilter {
            enabled: false,
            ..StackFilter::default()
        };
        assert!(StackTrace::capture(&filter).is_empty());
    }

    #[test]
    fn test_frame_display() {
        assert_eq!(frame("src/a.rs", 3, "load").to_string(), "src/a.rs:3 load()");
        assert_eq!(frame("src/a.rs", 3, "").to_string(), "src/a.rs:3");
    }

    #[test]
    fn test_render_until_stops_at_shared_frame() {
        let stack = StackTrace {
            frames: vec![
                frame("src/db.rs", 10, "query"),
                frame("src/repo.rs", 22, "Repo::load"),
                frame("src/main.rs", 5, "main"),
            ],
        };
        assert_eq!(
            stack.render_until(Some(&frame("src/repo.rs", 22, "Repo::load"))),
            "  --- at src/db.rs:10 query()"
        );
        assert_eq!(
            stack.to_string(),
            "  --- at src/db.rs:10 query()\n  --- at src/repo.rs:22 Repo::load()\n  --- at src/main.rs:5 main()"
        );
    }

    #[test]
    fn test_render_skips_frames_without_file() {
        let stack = StackTrace {
            frames: vec![frame("", 1, "ghost"), frame("src/a.rs", 2, "real")],
        };
        assert_eq!(stack.to_string(), "  --- at src/a.rs:2 real()");
    }
}
