use std::path::PathBuf;

use image::DynamicImage;
use log::{info, warn};

use crate::error::AppErr;
use crate::lock_screen::{persist_image, resolve_store_dir, LockScreen};

// PersonalizationCSP first shipped with the Creators Update.
const MIN_LOCK_SCREEN_BUILD: u32 = 15063;

const CURRENT_VERSION_KEY: &str = "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion";
const PERSONALIZATION_CSP_KEY: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\PersonalizationCSP";

/// Lock screen managed through the machine-wide PersonalizationCSP registry
/// key. Writing it requires an elevated process.
pub struct WindowsLockScreen {
    store_dir: Option<PathBuf>,
}

impl WindowsLockScreen {
    pub fn new(store_dir: Option<PathBuf>) -> WindowsLockScreen {
        WindowsLockScreen { store_dir }
    }
}

impl LockScreen for WindowsLockScreen {
    fn supports_lock_screen(&self) -> bool {
        match current_build() {
            Ok(build) => build >= MIN_LOCK_SCREEN_BUILD,
            Err(err) => {
                warn!("Unable to read the Windows build number: {}", err);
                false
            }
        }
    }

    fn assign(&self, image: &DynamicImage) -> Result<(), AppErr> {
        let store_dir = resolve_store_dir(self.store_dir.as_deref())?;
        let stored = persist_image(&store_dir, image)?;

        info!("Setting Windows lock-screen registry keys");

        use winreg::enums::HKEY_LOCAL_MACHINE;
        use winreg::RegKey;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let (key_csp, _) = hklm.create_subkey(PERSONALIZATION_CSP_KEY)?;
        key_csp.set_value("LockScreenImagePath", &stored.as_os_str())?;
        key_csp.set_value("LockScreenImageUrl", &stored.as_os_str())?;
        key_csp.set_value("LockScreenImageStatus", &1u32)?;

        Ok(())
    }
}

fn current_build() -> Result<u32, AppErr> {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ};
    use winreg::RegKey;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key_version = hklm.open_subkey_with_flags(CURRENT_VERSION_KEY, KEY_READ)?;
    let build: String = key_version.get_value("CurrentBuildNumber")?;
    Ok(build.trim().parse::<u32>()?)
}
