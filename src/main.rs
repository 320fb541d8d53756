mod app;

use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::terminal;
use log::{info, warn};

use flappy_arcade::audio::Audio;
use flappy_arcade::config::{self, Paths, Settings};
use flappy_arcade::highscore::{HighScoreStore, JsonFileStore, MemoryStore};
use flappy_arcade::input;

use crate::app::App;

/// Log to a file; the terminal belongs to the game.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let paths = Paths::resolve();
    if let Ok(paths) = &paths {
        init_logging(&paths.log);
    }
    info!("flappy-arcade {} starting", env!("CARGO_PKG_VERSION"));

    let (settings, store) = match &paths {
        Ok(paths) => {
            let settings = config::load_settings(&paths.settings);
            if !paths.settings.exists() {
                if let Err(e) = config::save_settings(&paths.settings, &settings) {
                    warn!("Could not write default settings: {}", e);
                }
            }
            (settings, Box::new(JsonFileStore::new(&paths.high_score)) as Box<dyn HighScoreStore>)
        }
        Err(e) => {
            warn!("{}; high score will not persist", e);
            (Settings::default(), Box::new(MemoryStore::default()) as Box<dyn HighScoreStore>)
        }
    };

    let audio = Audio::open(settings.sound);
    let pad = input::open_gamepad();

    let mut out = stdout();
    app::enter_terminal(&mut out).context("setting up terminal")?;
    let result = terminal::size()
        .context("reading terminal size")
        .and_then(|size| App::new(settings, store, audio, pad, size, Instant::now()).run(&mut out));
    let restored = app::leave_terminal(&mut out).context("restoring terminal");

    info!("Exiting");
    result.and(restored)
}
