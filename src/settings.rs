//! Process-wide settings for stack capture.
//!
//! Settings are read once. Either install them explicitly at start-up with
//! [`Settings::install`], or let the first captured error initialize them
//! from the environment through [`Settings::from_env`].
//!
//! # Environment variables
//!
//! - `RUST_BACKTRACE=full` - keep full file paths in captured frames
//! - `FAULTLINE_STACK` - comma-separated options:
//!   - `off` - do not capture call stacks at all
//!   - `full_paths` - keep full file paths in captured frames
//!   - `depth=N` - capture at most `N` frames per error
//! - `FAULTLINE_ROOT` - list of directories (separated like `PATH`) that are
//!   stripped from the front of frame paths. Defaults to the current working
//!   directory.
//!
//! # Examples
//!
//! ```rust
//! use faultline::settings::{Settings, StackFilter};
//!
//! Settings {
//!     stack: StackFilter {
//!         max_depth: 10,
//!         ..StackFilter::default()
//!     },
//! }
//! .install()
//! .expect("settings already installed");
//! ```

use std::{
    env, fmt,
    path::{Path, PathBuf},
};

/// Global settings for error construction.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    /// How call stacks are captured and shortened.
    pub stack: StackFilter,
}

/// Controls which frames are captured and how their paths are shortened.
#[derive(Clone, Debug)]
pub struct StackFilter {
    /// Whether terminal builder operations capture a call stack at all.
    pub enabled: bool,
    /// Maximum number of frames kept per captured stack.
    pub max_depth: usize,
    /// Directory prefixes removed from the front of frame paths. When more
    /// than one matches, the longest one wins.
    pub strip_prefixes: Vec<PathBuf>,
    /// Keep full paths, ignoring [`strip_prefixes`](Self::strip_prefixes).
    pub show_full_path: bool,
}

impl StackFilter {
    /// Default maximum number of frames per captured stack.
    pub const DEFAULT_MAX_DEPTH: usize = 50;

    /// Shortens `path` by the longest matching entry of
    /// [`strip_prefixes`](Self::strip_prefixes).
    ///
    /// Paths outside every prefix, and all paths when
    /// [`show_full_path`](Self::show_full_path) is set, are returned as-is.
    pub fn strip_path(&self, path: &str) -> String {
        if self.show_full_path {
            return path.to_owned();
        }

        let mut prefixes: Vec<&Path> = self.strip_prefixes.iter().map(PathBuf::as_path).collect();
        prefixes.sort_by_key(|prefix| core::cmp::Reverse(prefix.as_os_str().len()));

        let path_ref = Path::new(path);
        for prefix in prefixes {
            if prefix.as_os_str().is_empty() {
                continue;
            }
            if let Ok(rest) = path_ref.strip_prefix(prefix) {
                return rest.to_string_lossy().into_owned();
            }
        }
        path.to_owned()
    }
}

impl Default for StackFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            strip_prefixes: Vec::new(),
            show_full_path: false,
        }
    }
}

/// Returned by [`Settings::install`] when settings are already in place.
///
/// Carries the settings that could not be installed.
pub struct SettingsAlreadyInstalledError(pub Settings);

impl fmt::Debug for SettingsAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsAlreadyInstalledError").finish()
    }
}

impl fmt::Display for SettingsAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faultline settings are already installed")
    }
}

impl std::error::Error for SettingsAlreadyInstalledError {}

static SETTINGS: spin::Once<Settings> = spin::Once::new();

impl Settings {
    /// Builds settings from `RUST_BACKTRACE`, `FAULTLINE_STACK` and
    /// `FAULTLINE_ROOT`. See the [module documentation](self).
    pub fn from_env() -> Self {
        let mut stack = StackFilter {
            show_full_path: env::var_os("RUST_BACKTRACE").is_some_and(|var| var == "full"),
            ..StackFilter::default()
        };

        if let Some(var) = env::var_os("FAULTLINE_STACK") {
            for option in var.to_string_lossy().split(',').map(str::trim) {
                if option.eq_ignore_ascii_case("off") {
                    stack.enabled = false;
                } else if option.eq_ignore_ascii_case("full_paths") {
                    stack.show_full_path = true;
                } else if let Some(depth) = option.strip_prefix("depth=") {
                    match depth.parse() {
                        Ok(depth) => stack.max_depth = depth,
                        Err(_) => log_warn!(value = depth, "ignoring invalid FAULTLINE_STACK depth"),
                    }
                } else if !option.is_empty() {
                    log_warn!(option, "ignoring unknown FAULTLINE_STACK option");
                }
            }
        }

        stack.strip_prefixes = match env::var_os("FAULTLINE_ROOT") {
            Some(roots) => env::split_paths(&roots).collect(),
            None => env::current_dir().into_iter().collect(),
        };

        Self { stack }
    }

    /// Installs these settings for the rest of the process.
    ///
    /// Fails if settings were installed before, or if an error was already
    /// captured (which initializes the settings from the environment).
    pub fn install(self) -> Result<(), SettingsAlreadyInstalledError> {
        let mut pending = Some(self);
        SETTINGS.call_once(|| pending.take().unwrap_or_default());
        match pending {
            None => Ok(()),
            Some(rejected) => Err(SettingsAlreadyInstalledError(rejected)),
        }
    }

    /// Returns the installed settings, initializing them from the environment
    /// on first use.
    pub fn current() -> &'static Settings {
        SETTINGS.call_once(Settings::from_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_path_prefers_longest_prefix() {
        let filter = StackFilter {
            strip_prefixes: vec![PathBuf::from("/work"), PathBuf::from("/work/app")],
            ..StackFilter::default()
        };
        assert_eq!(filter.strip_path("/work/app/src/main.rs"), "src/main.rs");
        assert_eq!(filter.strip_path("/work/lib/src/lib.rs"), "lib/src/lib.rs");
        assert_eq!(filter.strip_path("/elsewhere/x.rs"), "/elsewhere/x.rs");
    }

    #[test]
    fn test_strip_path_respects_full_paths() {
        let filter = StackFilter {
            strip_prefixes: vec![PathBuf::from("/work")],
            show_full_path: true,
            ..StackFilter::default()
        };
        assert_eq!(filter.strip_path("/work/src/main.rs"), "/work/src/main.rs");
    }

    #[test]
    fn test_strip_path_does_not_cut_partial_components() {
        let filter = StackFilter {
            strip_prefixes: vec![PathBuf::from("/work")],
            ..StackFilter::default()
        };
        assert_eq!(filter.strip_path("/workspace/main.rs"), "/workspace/main.rs");
    }

    #[test]
    fn test_already_installed_error_displays() {
        let error = SettingsAlreadyInstalledError(Settings::default());
        assert_eq!(error.to_string(), "faultline settings are already installed");
        assert_eq!(format!("{error:?}"), "SettingsAlreadyInstalledError");
    }
}
