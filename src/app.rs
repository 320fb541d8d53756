//! The terminal front end: one loop that gathers events, steps the game,
//! carries out its effects and redraws.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute, terminal,
};
use log::{info, warn};

use flappy_arcade::audio::Audio;
use flappy_arcade::config::Settings;
use flappy_arcade::game::{Effect, Game, GameEvent};
use flappy_arcade::highscore::HighScoreStore;
use flappy_arcade::input::{self, Action, GamepadPoller, GamepadSource};
use flappy_arcade::render::Renderer;
use flappy_arcade::spawner::PipeSpawner;
use flappy_arcade::timer::Interval;

pub fn enter_terminal(out: &mut impl Write) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )
}

pub fn leave_terminal(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

pub struct App {
    settings: Settings,
    game: Game,
    renderer: Renderer,
    spawner: PipeSpawner,
    pad_timer: Interval,
    pad_poller: GamepadPoller,
    pad: Option<Box<dyn GamepadSource>>,
    audio: Audio,
    store: Box<dyn HighScoreStore>,
    queue: VecDeque<GameEvent>,
    quit: bool,
}

impl App {
    pub fn new(
        settings: Settings,
        store: Box<dyn HighScoreStore>,
        audio: Audio,
        pad: Option<Box<dyn GamepadSource>>,
        (cols, rows): (u16, u16),
        now: Instant,
    ) -> Self {
        let renderer = Renderer::new(cols, rows, settings.units_per_pixel);
        let high_score = store.load();
        info!("Loaded high score {}", high_score);
        Self {
            game: Game::new(renderer.playfield(), high_score),
            renderer,
            spawner: PipeSpawner::from_seed(
                Duration::from_millis(settings.pipe_interval_ms),
                now,
                settings.seed,
            ),
            pad_timer: Interval::new(Duration::from_millis(settings.gamepad_poll_ms), now),
            pad_poller: GamepadPoller::new(settings.pause_trigger),
            pad,
            audio,
            store,
            queue: VecDeque::new(),
            quit: false,
            settings,
        }
    }

    pub fn run(&mut self, out: &mut impl Write) -> Result<()> {
        let frame_dur = Duration::from_secs_f64(1.0 / self.settings.fps as f64);

        while !self.quit {
            let frame_start = Instant::now();

            while event::poll(Duration::ZERO).context("polling terminal events")? {
                let ev = event::read().context("reading terminal event")?;
                self.handle_terminal_event(ev);
            }
            if self.quit {
                break;
            }

            self.poll_timers(frame_start);
            self.step();

            self.renderer.draw(&self.game);
            self.renderer
                .present(out, &self.game, self.pad_poller.connected())
                .context("drawing frame")?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_dur {
                std::thread::sleep(frame_dur - elapsed);
            }
        }
        Ok(())
    }

    fn handle_terminal_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => match input::map_key(key) {
                Some(Action::Intent(intent)) => self.queue.push_back(intent.into()),
                Some(Action::Quit) => self.quit = true,
                None => {}
            },
            Event::Mouse(mouse) => {
                if let Some(intent) = input::map_mouse(mouse) {
                    self.queue.push_back(intent.into());
                }
            }
            Event::Resize(cols, rows) => {
                self.renderer.resize(cols, rows);
                self.game.resize(self.renderer.playfield());
            }
            _ => {}
        }
    }

    /// Let the wall-clock sources add their events behind the input already
    /// queued this frame.
    fn poll_timers(&mut self, now: Instant) {
        if self.pad_timer.fire(now) {
            let snapshot = self.pad.as_mut().and_then(|pad| pad.poll());
            let mut intents = Vec::new();
            self.pad_poller.poll(snapshot, self.game.is_game_over(), &mut intents);
            self.queue.extend(intents.into_iter().map(GameEvent::from));
        }
        if let Some(ev) = self.spawner.poll(now) {
            self.queue.push_back(ev);
        }
    }

    fn step(&mut self) {
        let effects = self.game.step(self.queue.drain(..));
        for effect in effects {
            match effect {
                Effect::Play(cue) => self.audio.play(cue),
                Effect::SaveHighScore(score) => {
                    if let Err(e) = self.store.save(score) {
                        warn!("Could not save high score {}: {}", score, e);
                    }
                }
            }
        }
    }
}
