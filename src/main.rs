use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgMatches, Command};
use log::{error, info};

mod channel;
mod error;
mod failure;
mod lock_screen;
mod log_level;
mod setter;

#[cfg(unix)]
mod ffi_unix;
#[cfg(windows)]
mod ffi_windows;

use crate::channel::WallpaperChannel;
use crate::error::AppErr;
use crate::log_level::{LogLevel, LogLevelValueParser};
use crate::setter::WallpaperSetter;

fn main() {
    let matches = cli().get_matches();

    let level = matches.get_one::<LogLevel>("log-level").cloned().unwrap_or_default();
    let logging = match matches.get_one::<PathBuf>("log-file") {
        Some(path) => simple_logging::log_to_file(path, level.to_filter()),
        None => {
            // stdout carries the channel protocol
            simple_logging::log_to_stderr(level.to_filter());
            Ok(())
        }
    };
    if let Err(err) = logging {
        eprintln!("Unable to open log file: {}", err);
        process::exit(2);
    }

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            process::exit(2);
        }
    }
}

fn cli() -> Command {
    Command::new("lockscreen-wallpaper")
        .about("Set the lock-screen wallpaper from a local image file")
        .subcommand_required(true)
        .arg(
            Arg::new("store-dir")
                .long("store-dir")
                .value_name("DIR")
                .help("Directory that keeps the image the lock screen points at")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Write logs to FILE instead of stderr")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("off, error, warn, info, debug or trace")
                .value_parser(LogLevelValueParser),
        )
        .subcommand(
            Command::new("set")
                .about("Set FILE as the lock-screen wallpaper")
                .arg(Arg::new("file").value_name("FILE").required(true)),
        )
        .subcommand(Command::new("serve").about("Answer setLockScreenWallpaper calls on stdin/stdout"))
}

fn run(matches: &ArgMatches) -> Result<i32, AppErr> {
    // resolved by the backend on assignment, after the call is validated
    let store_dir = matches.get_one::<PathBuf>("store-dir").cloned();
    if let Some(ref dir) = store_dir {
        info!("Using store directory {:?}", dir);
    }

    let setter = WallpaperSetter::new(lock_screen::platform(store_dir));

    match matches.subcommand() {
        Some(("set", sub)) => {
            let file = sub.get_one::<String>("file").map(String::as_str);
            match setter.set_lock_screen_wallpaper(file) {
                Ok(()) => {
                    println!("ok");
                    Ok(0)
                }
                Err(failure) => {
                    eprintln!("{}", failure);
                    Ok(1)
                }
            }
        }
        Some(("serve", _)) => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            WallpaperChannel::new(setter).serve(stdin.lock(), stdout.lock())?;
            Ok(0)
        }
        _ => Err(AppErr::new("cli", "Unknown command")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_cli_parses_set() {
        let matches = cli()
            .try_get_matches_from(["lockscreen-wallpaper", "--log-level", "debug", "set", "/tmp/wall.png"])
            .unwrap();

        assert_eq!(matches.get_one::<LogLevel>("log-level"), LogLevel::try_parse("debug").as_ref());
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "set");
        assert_eq!(sub.get_one::<String>("file").map(String::as_str), Some("/tmp/wall.png"));
    }

    #[test]
    fn test_cli_rejects_bad_log_level() {
        let result = cli().try_get_matches_from(["lockscreen-wallpaper", "--log-level", "loud", "serve"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_empty_path_needs_no_store_dir() {
        let matches = cli().try_get_matches_from(["lockscreen-wallpaper", "set", ""]).unwrap();

        assert_eq!(run(&matches).unwrap(), 1);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(cli().try_get_matches_from(["lockscreen-wallpaper"]).is_err());
    }
}
