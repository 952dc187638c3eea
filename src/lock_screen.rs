use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat};
use log::{debug, warn};

use crate::error::AppErr;

const STORE_FILE_PREFIX: &str = "lock-screen-";
const STORE_FILE_SUFFIX: &str = ".png";

/// Host facility that owns the lock-screen surface.
pub trait LockScreen {
    /// Whether the host can assign a wallpaper to the lock screen alone.
    fn supports_lock_screen(&self) -> bool;

    /// Assign `image` to the lock screen, full image and no crop.
    fn assign(&self, image: &DynamicImage) -> Result<(), AppErr>;
}

/// Default store directory, `<data dir>/lockscreen-wallpaper`.
pub fn default_store_dir() -> Result<PathBuf, AppErr> {
    match dirs::data_dir() {
        Some(dir) => Ok(dir.join("lockscreen-wallpaper")),
        None => Err(AppErr::new("store", "Unable to determine the user data directory")),
    }
}

/// The configured store directory, or the default one when none was given.
pub fn resolve_store_dir(configured: Option<&Path>) -> Result<PathBuf, AppErr> {
    match configured {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_store_dir(),
    }
}

/// Re-encode `image` as PNG into `store_dir` and return the written path.
///
/// The OS settings only accept a file path, so the backends point them at
/// this copy rather than at the caller's file. Each call writes a new file
/// name so the setting always changes, and older copies are removed once the
/// new one is in place.
pub fn persist_image(store_dir: &Path, image: &DynamicImage) -> Result<PathBuf, AppErr> {
    fs::create_dir_all(store_dir)?;
    let target = unique_target(store_dir)?;
    let staging = store_dir.join(format!(
        ".{}.tmp",
        target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    ));

    debug!("Writing lock-screen image to {:?}", target);
    if let Err(err) = image.save_with_format(&staging, ImageFormat::Png) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    fs::rename(&staging, &target)?;

    remove_previous(store_dir, &target);
    Ok(target)
}

fn unique_target(store_dir: &Path) -> Result<PathBuf, AppErr> {
    let stamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let mut target = store_dir.join(format!("{}{}{}", STORE_FILE_PREFIX, stamp, STORE_FILE_SUFFIX));
    let mut n = 1;
    while target.exists() {
        target = store_dir.join(format!("{}{}-{}{}", STORE_FILE_PREFIX, stamp, n, STORE_FILE_SUFFIX));
        n += 1;
    }
    Ok(target)
}

fn remove_previous(store_dir: &Path, keep: &Path) {
    let entries = match fs::read_dir(store_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Unable to list {:?}: {}", store_dir, err);
            return;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path == keep || !name.starts_with(STORE_FILE_PREFIX) || !name.ends_with(STORE_FILE_SUFFIX) {
            continue;
        }
        debug!("Removing previous lock-screen image {:?}", path);
        if let Err(err) = fs::remove_file(&path) {
            warn!("Unable to remove {:?}: {}", path, err);
        }
    }
}

#[cfg(unix)]
pub fn platform(store_dir: Option<PathBuf>) -> impl LockScreen {
    crate::ffi_unix::GnomeLockScreen::new(store_dir)
}

#[cfg(windows)]
pub fn platform(store_dir: Option<PathBuf>) -> impl LockScreen {
    crate::ffi_windows::WindowsLockScreen::new(store_dir)
}

#[cfg(not(any(unix, windows)))]
pub fn platform(_store_dir: Option<PathBuf>) -> impl LockScreen {
    UnsupportedLockScreen
}

#[cfg(not(any(unix, windows)))]
struct UnsupportedLockScreen;

#[cfg(not(any(unix, windows)))]
impl LockScreen for UnsupportedLockScreen {
    fn supports_lock_screen(&self) -> bool {
        false
    }

    fn assign(&self, _image: &DynamicImage) -> Result<(), AppErr> {
        Err(AppErr::new("platform", "Lock-screen wallpaper is not supported on this platform"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    fn stored_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
        files.sort();
        files
    }

    #[test]
    fn test_persist_image_creates_store_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = tmp.path().join("nested").join("store");
        let image = solid(3, 2, [10, 20, 30, 255]);

        let written = persist_image(&store, &image).unwrap();

        assert_eq!(written.parent(), Some(store.as_path()));
        let reloaded = image::open(&written).unwrap();
        assert_eq!(reloaded.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn test_persist_image_replaces_previous_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let first = solid(1, 1, [0, 0, 0, 255]);
        let second = solid(4, 4, [255, 0, 0, 255]);

        let first_path = persist_image(tmp.path(), &first).unwrap();
        let second_path = persist_image(tmp.path(), &second).unwrap();

        assert_ne!(first_path, second_path);
        assert!(!first_path.exists());
        assert_eq!(stored_files(tmp.path()), vec![second_path.clone()]);
        let reloaded = image::open(&second_path).unwrap();
        assert_eq!(reloaded.width(), 4);
        assert_eq!(reloaded.to_rgba8(), second.to_rgba8());
    }

    #[test]
    fn test_persist_image_keeps_unrelated_files() {
        let tmp = tempfile::tempdir().unwrap();
        let notes = tmp.path().join("notes.txt");
        fs::write(&notes, "keep me").unwrap();

        persist_image(tmp.path(), &solid(2, 2, [1, 2, 3, 255])).unwrap();

        assert!(notes.exists());
        assert_eq!(stored_files(tmp.path()).len(), 2);
    }

    #[test]
    fn test_resolve_store_dir_prefers_configured() {
        let dir = Path::new("/var/lib/lock-store");
        assert_eq!(resolve_store_dir(Some(dir)).unwrap(), dir.to_path_buf());
    }
}
