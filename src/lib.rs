//! A Flappy Bird arcade game for the terminal.
//!
//! The simulation lives in [`game`] and is driven one frame at a time by a
//! queue of [`game::GameEvent`]s; everything else feeds that queue or carries
//! out the [`game::Effect`]s a frame produces.

pub mod audio;
pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod highscore;
pub mod input;
pub mod render;
pub mod spawner;
pub mod timer;
pub mod world;

pub use error::{Error, Result};
pub use game::{Effect, Game, GameEvent, Phase};
pub use world::Playfield;
