//! Method-channel dispatch and its newline-delimited JSON transport.

use std::io::{BufRead, Write};

use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppErr;
use crate::failure::WallpaperFailure;
use crate::lock_screen::LockScreen;
use crate::setter::WallpaperSetter;

pub const CHANNEL: &str = "zwallpaper/wallpaper";

pub const SET_LOCK_SCREEN_WALLPAPER: &str = "setLockScreenWallpaper";

const MALFORMED_CALL: &str = "MALFORMED_CALL";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// String argument `key`, or `None` when absent or not a string.
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum MethodResponse {
    Success(Value),
    Error(ErrorEnvelope),
    NotImplemented,
}

impl MethodResponse {
    fn error(code: &str, message: String) -> MethodResponse {
        MethodResponse::Error(ErrorEnvelope { code: code.to_string(), message, details: None })
    }
}

impl From<Result<(), WallpaperFailure>> for MethodResponse {
    fn from(result: Result<(), WallpaperFailure>) -> Self {
        match result {
            Ok(()) => MethodResponse::Success(Value::Bool(true)),
            Err(failure) => MethodResponse::error(failure.code(), failure.message()),
        }
    }
}

pub struct WallpaperChannel<L> {
    setter: WallpaperSetter<L>,
}

impl<L: LockScreen> WallpaperChannel<L> {
    pub fn new(setter: WallpaperSetter<L>) -> WallpaperChannel<L> {
        WallpaperChannel { setter }
    }

    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        debug!("{} <- {}", CHANNEL, call.method);
        match call.method.as_str() {
            SET_LOCK_SCREEN_WALLPAPER => {
                let file_path = call.argument_str("filePath");
                self.setter.set_lock_screen_wallpaper(file_path).into()
            }
            _ => MethodResponse::NotImplemented,
        }
    }

    /// Answer one call per input line until `input` is exhausted.
    ///
    /// Lines are parsed as raw bytes, so a line that is not UTF-8 is answered
    /// like any other malformed call. Only read and write errors stop the loop.
    pub fn serve<R, W>(&self, mut input: R, mut output: W) -> Result<(), AppErr>
    where
        R: BufRead,
        W: Write,
    {
        info!("Serving {} on stdio", CHANNEL);
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let response = match serde_json::from_slice::<MethodCall>(&line) {
                Ok(call) => self.handle(&call),
                Err(err) => {
                    warn!("Ignoring malformed call: {}", err);
                    MethodResponse::error(MALFORMED_CALL, err.to_string())
                }
            };

            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        info!("Input closed, stopping {}", CHANNEL);
        Ok(())
    }
}
