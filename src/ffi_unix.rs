use std::env;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use log::{debug, info, warn};

use crate::error::AppErr;
use crate::lock_screen::{persist_image, resolve_store_dir, LockScreen};

const SCREENSAVER_SCHEMA: &str = "org.gnome.desktop.screensaver";

// GNOME Shell 3.36+ ignores the screensaver picture and blurs the desktop
// background instead, so only desktops whose lockers still read the key count.
const SCREENSAVER_PICTURE_DESKTOPS: &[&str] = &["budgie", "cinnamon", "x-cinnamon", "unity"];

/// Lock screen managed through the GNOME `org.gnome.desktop.screensaver`
/// settings schema.
pub struct GnomeLockScreen {
    store_dir: Option<PathBuf>,
}

impl GnomeLockScreen {
    pub fn new(store_dir: Option<PathBuf>) -> GnomeLockScreen {
        GnomeLockScreen { store_dir }
    }
}

impl LockScreen for GnomeLockScreen {
    fn supports_lock_screen(&self) -> bool {
        let desktop = env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
        if !reads_screensaver_picture(&desktop) {
            debug!("Desktop {:?} does not show the screensaver picture", desktop);
            return false;
        }

        let output = Command::new("gsettings")
            .args(["writable", SCREENSAVER_SCHEMA, "picture-uri"])
            .output();

        match output {
            Ok(out) if out.status.success() => parse_writable(&String::from_utf8_lossy(&out.stdout)),
            Ok(out) => {
                debug!("gsettings writable failed: {}", String::from_utf8_lossy(&out.stderr).trim());
                false
            }
            Err(err) => {
                warn!("Unable to run gsettings: {}", err);
                false
            }
        }
    }

    fn assign(&self, image: &DynamicImage) -> Result<(), AppErr> {
        let store_dir = resolve_store_dir(self.store_dir.as_deref())?;
        let stored = persist_image(&store_dir, image)?;

        info!("Setting GNOME lock-screen wallpaper to {:?}", stored);
        gsettings_set("picture-uri", &file_uri(&stored))?;
        gsettings_set("picture-options", "zoom")?;
        Ok(())
    }
}

fn gsettings_set(key: &str, value: &str) -> Result<(), AppErr> {
    let out = Command::new("gsettings")
        .args(["set", SCREENSAVER_SCHEMA, key, value])
        .output()?;

    if out.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&out.stderr);
        let message = format!("Failed to set {} {}: {}", SCREENSAVER_SCHEMA, key, stderr.trim());
        Err(AppErr::new("gsettings", &message))
    }
}

/// `XDG_CURRENT_DESKTOP` is a colon-separated list, e.g. `Budgie:GNOME`.
fn reads_screensaver_picture(xdg_current_desktop: &str) -> bool {
    xdg_current_desktop
        .split(':')
        .map(|d| d.trim().to_ascii_lowercase())
        .any(|d| SCREENSAVER_PICTURE_DESKTOPS.contains(&d.as_str()))
}

fn parse_writable(stdout: &str) -> bool {
    stdout.trim() == "true"
}

fn file_uri(path: &Path) -> String {
    let mut uri = String::from("file://");
    for &byte in path.as_os_str().as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'/' | b'-' | b'_' | b'.' | b'~' => {
                uri.push(byte as char)
            }
            _ => uri.push_str(&format!("%{:02X}", byte)),
        }
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    #[test]
    fn test_parse_writable() {
        assert!(parse_writable("true\n"));
        assert!(!parse_writable("false\n"));
        assert!(!parse_writable(""));
    }

    #[test]
    fn test_reads_screensaver_picture() {
        assert!(reads_screensaver_picture("Budgie:GNOME"));
        assert!(reads_screensaver_picture("X-Cinnamon"));
        assert!(reads_screensaver_picture("Unity"));
        assert!(!reads_screensaver_picture("GNOME"));
        assert!(!reads_screensaver_picture("ubuntu:GNOME"));
        assert!(!reads_screensaver_picture("KDE"));
        assert!(!reads_screensaver_picture(""));
    }

    #[test]
    fn test_file_uri_plain_path() {
        let uri = file_uri(Path::new("/home/user/.local/share/lockscreen-wallpaper/lock-screen-1.png"));
        assert_eq!(uri, "file:///home/user/.local/share/lockscreen-wallpaper/lock-screen-1.png");
    }

    #[test]
    fn test_file_uri_escapes_spaces() {
        let uri = file_uri(Path::new("/home/user/My Pictures/lock screen.png"));
        assert_eq!(uri, "file:///home/user/My%20Pictures/lock%20screen.png");
    }

    #[test]
    fn test_file_uri_keeps_non_utf8_bytes() {
        let path = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9/a.png"));
        assert_eq!(file_uri(path), "file:///tmp/caf%E9/a.png");
    }
}
