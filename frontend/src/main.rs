//! `ootw <game_directory> [--scale N] [--pal|--ntsc] [--config PATH]
//! [--part ID]`: the playable frontend binary (spec §6's CLI contract).

use std::path::PathBuf;

use clap::Parser;
use ootw_core::res::game_part::{self, GamePart, GAME_PARTS};
use ootw_core::timing;

mod audio;
mod emulator;
mod input;
mod sdl_host;
mod video;

use input::{KeyMap, KeyMapConfig};

#[derive(Parser)]
#[command(name = "ootw", about = "Another World engine frontend")]
struct Cli {
    /// Path to a game data directory, or a `.zip` archive of one.
    game_directory: PathBuf,

    /// Window scale factor.
    #[arg(long, default_value_t = 3)]
    scale: u32,

    /// Run the PAL (50 Hz) timing. Default.
    #[arg(long, conflicts_with = "ntsc")]
    pal: bool,

    /// Run the NTSC (60 Hz) timing instead of PAL.
    #[arg(long, conflicts_with = "pal")]
    ntsc: bool,

    /// Path to a key-binding config file (defaults to
    /// `~/.config/ootw/keymap.toml` if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting game part id (defaults to the first entry in the part
    /// table). Hex or decimal, e.g. `0x3e80` or `16000`.
    #[arg(long)]
    part: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let refresh_hz = if cli.ntsc { timing::NTSC_HZ } else { timing::PAL_HZ };

    let key_map = load_key_map(cli.config.as_deref());

    let part = resolve_part(cli.part.as_deref()).unwrap_or_else(|| {
        eprintln!("unknown --part id, falling back to the first game part");
        GAME_PARTS[0]
    });

    let screenshot_dir = cli.game_directory.clone();

    let options = emulator::Options {
        game_directory: cli.game_directory,
        scale: cli.scale,
        refresh_hz,
        key_map,
        screenshot_dir,
    };

    if let Err(e) = emulator::run(options, &part) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_key_map(explicit_path: Option<&std::path::Path>) -> KeyMap {
    let path = explicit_path
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("ootw").join("keymap.toml")));

    let Some(path) = path else {
        return KeyMap::default_bindings();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<KeyMapConfig>(&contents) {
            Ok(config) => KeyMap::from_config(&config),
            Err(e) => {
                log::warn!("ignoring invalid keymap config {}: {e}", path.display());
                KeyMap::default_bindings()
            }
        },
        Err(_) => KeyMap::default_bindings(),
    }
}

fn resolve_part(arg: Option<&str>) -> Option<GamePart> {
    let id = match arg {
        None => return Some(GAME_PARTS[0]),
        Some(s) if s.starts_with("0x") || s.starts_with("0X") => u16::from_str_radix(&s[2..], 16).ok()?,
        Some(s) => s.parse().ok()?,
    };
    game_part::by_id(id).copied()
}
