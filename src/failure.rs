use std::fmt::{Display, Error as FmtError, Formatter};
use std::path::PathBuf;

/// Why a `setLockScreenWallpaper` call did not succeed.
///
/// `Decode` and `Assign` share the `ERROR` wire code; the split only exists
/// for Rust callers and log output.
#[derive(Debug, Clone, PartialEq)]
pub enum WallpaperFailure {
    NoPath,
    NotFound(PathBuf),
    Unsupported,
    Decode(String),
    Assign(String),
}

impl WallpaperFailure {
    pub fn code(&self) -> &'static str {
        match *self {
            WallpaperFailure::NoPath => "NO_PATH",
            WallpaperFailure::NotFound(_) => "NOT_FOUND",
            WallpaperFailure::Unsupported => "UNSUPPORTED",
            WallpaperFailure::Decode(_) | WallpaperFailure::Assign(_) => "ERROR",
        }
    }

    pub fn message(&self) -> String {
        match *self {
            WallpaperFailure::NoPath => "No file path provided".to_string(),
            WallpaperFailure::NotFound(ref path) => format!("File not found: {}", path.display()),
            WallpaperFailure::Unsupported => {
                "Lock-screen wallpaper is not supported on this system".to_string()
            }
            WallpaperFailure::Decode(ref msg) | WallpaperFailure::Assign(ref msg) => msg.clone(),
        }
    }
}

impl Display for WallpaperFailure {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
