use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tui_dispatch_debug::DebugCliArgs;

pub const MISCRITS_JSON_URL: &str = "https://miscrits-proxy.yatosquare.workers.dev/";
pub const CDN_BASE_URL: &str = "https://cdn.worldofmiscrits.com";
pub const ICON_BASE_URL: &str = "https://worldofmiscrits.com";

pub const PAGE_SIZE: usize = 16;
pub const CANVAS_SIZE: (u32, u32) = (256, 256);
pub const AVATAR_SIZE: (u32, u32) = (50, 50);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const SPRITE_FETCH_CONCURRENCY: usize = 16;

pub const GODOT_BIN_ENV: &str = "MISCRITS_GODOT_BIN";
pub const JSON_URL_ENV: &str = "MISCRITS_JSON_URL";
pub const LOG_FILTER_ENV: &str = "MISCRITS_LOG";

const DEFAULT_SCRIPT: &str = "gd_scripts/crits_single_encode.gd";

#[derive(Parser, Debug)]
#[command(name = "miscrits-tui")]
#[command(about = "Miscrits catalog browser, sprite patcher and moves editor")]
pub struct Args {
    #[command(flatten)]
    pub debug: DebugCliArgs,
    /// Remote miscrits.json URL
    #[arg(long)]
    pub json_url: Option<String>,
    /// Local miscrits.json (defaults to the game's Godot user-data cache)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
    #[arg(long, default_value = "bosses.json")]
    pub bosses: PathBuf,
    /// Godot binary used to encode patched sprites
    #[arg(long)]
    pub godot_bin: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    pub encode_script: PathBuf,
    /// Where exports and encoded sprites are written
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub json_url: String,
    pub local_dataset: Option<PathBuf>,
    pub bosses_path: PathBuf,
    pub godot_bin: PathBuf,
    pub encode_script: PathBuf,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl RuntimeConfig {
    pub fn from_args(args: &Args) -> Self {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// CLI flags win over environment overrides, which win over defaults.
    pub fn resolve(args: &Args, env: impl Fn(&str) -> Option<String>) -> Self {
        let json_url = args
            .json_url
            .clone()
            .or_else(|| env(JSON_URL_ENV))
            .unwrap_or_else(|| MISCRITS_JSON_URL.to_string());
        let godot_bin = args
            .godot_bin
            .clone()
            .or_else(|| env(GODOT_BIN_ENV).map(PathBuf::from))
            .unwrap_or_else(default_godot_bin);
        Self {
            json_url,
            local_dataset: args.dataset.clone().or_else(default_local_dataset),
            bosses_path: args.bosses.clone(),
            godot_bin,
            encode_script: args.encode_script.clone(),
            export_dir: args.export_dir.clone(),
            log_dir: args.log_dir.clone().unwrap_or_else(default_log_dir),
        }
    }
}

pub fn default_godot_bin() -> PathBuf {
    let name = if cfg!(windows) {
        "Godot_v4.4.1-stable_win64.exe"
    } else {
        "Godot_v4.1-stable_linux.x86_64"
    };
    PathBuf::from("bin").join(name)
}

/// Where the game's Godot runtime keeps its downloaded `miscrits.json`.
pub fn default_local_dataset() -> Option<PathBuf> {
    let godot = if cfg!(windows) { "Godot" } else { "godot" };
    dirs_next::data_dir().map(|dir| {
        dir.join(godot)
            .join("app_userdata")
            .join("Miscrits")
            .join("image_cache")
            .join("miscrits.json")
    })
}

fn default_log_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("miscrits-tui"))
        .unwrap_or_else(|| PathBuf::from("."))
}
