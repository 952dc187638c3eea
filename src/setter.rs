use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::io::Reader as ImageReader;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::error::AppErr;
use crate::failure::WallpaperFailure;
use crate::lock_screen::LockScreen;

pub struct WallpaperSetter<L> {
    lock_screen: L,
}

impl<L: LockScreen> WallpaperSetter<L> {
    pub fn new(lock_screen: L) -> WallpaperSetter<L> {
        WallpaperSetter { lock_screen }
    }

    /// Decode the image at `file_path` and make it the lock-screen wallpaper.
    ///
    /// Checks run in order: path present, regular file, host capability,
    /// decode, assignment. The first failing check decides the result.
    pub fn set_lock_screen_wallpaper(&self, file_path: Option<&str>) -> Result<(), WallpaperFailure> {
        let file_path = match file_path {
            Some(p) if !p.is_empty() => Path::new(p),
            _ => return Err(WallpaperFailure::NoPath),
        };

        if !file_path.is_file() {
            return Err(WallpaperFailure::NotFound(file_path.to_path_buf()));
        }

        if !self.lock_screen.supports_lock_screen() {
            warn!("Host does not support a separate lock-screen wallpaper");
            return Err(WallpaperFailure::Unsupported);
        }

        let image = decode_image(file_path).map_err(|e| {
            warn!("Unable to decode {:?}: {}", file_path, e);
            WallpaperFailure::Decode(e.cause_message())
        })?;

        self.lock_screen.assign(&image).map_err(|e| {
            warn!("Unable to assign lock-screen wallpaper: {}", e);
            WallpaperFailure::Assign(e.cause_message())
        })?;

        info!("Lock-screen wallpaper set from {:?}", file_path);
        Ok(())
    }
}

fn decode_image(path: &Path) -> Result<DynamicImage, AppErr> {
    let file = File::open(path)?;
    let image = ImageReader::new(BufReader::new(file)).with_guessed_format()?.decode()?;

    debug!("Decoded {:?} ({}x{})", path, image.width(), image.height());
    check_dimensions(&image)?;
    Ok(image)
}

fn check_dimensions(image: &DynamicImage) -> Result<(), AppErr> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AppErr::new("decode", "Decoded image is empty"));
    }
    Ok(())
}
