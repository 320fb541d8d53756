//! The run state machine.
//!
//! [`Game`] owns the bird, the pipes and the run counters. Nothing else
//! mutates them: timers and input devices queue [`GameEvent`]s, and
//! [`Game::step`] applies them in order before advancing one frame. Side
//! effects come back as a list of [`Effect`]s for the shell to carry out.

use log::{debug, info};

use crate::audio::Cue;
use crate::collision;
use crate::input::Intent;
use crate::world::{Bird, Pipe, Playfield};

pub const INITIAL_PIPE_SPEED: f64 = 2.0;
pub const SPEED_STEP: f64 = 0.5;
/// Active frames between speed increases.
pub const SPEED_RAMP_FRAMES: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Input(Intent),
    /// Spawn timer fired; `roll` is uniform in `[0, 1)`.
    SpawnPipe { roll: f64 },
}

impl From<Intent> for GameEvent {
    fn from(intent: Intent) -> Self {
        GameEvent::Input(intent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Play(Cue),
    SaveHighScore(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    GameOver,
}

pub struct Game {
    field: Playfield,
    bird: Bird,
    pipes: Vec<Pipe>,
    score: u32,
    high_score: u32,
    pipe_speed: f64,
    frame_count: u64,
    game_over: bool,
    paused: bool,
    effects: Vec<Effect>,
}

impl Game {
    pub fn new(field: Playfield, high_score: u32) -> Self {
        Self {
            field,
            bird: Bird::spawn(&field),
            pipes: Vec::new(),
            score: 0,
            high_score,
            pipe_speed: INITIAL_PIPE_SPEED,
            frame_count: 0,
            game_over: false,
            paused: false,
            effects: Vec::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn pipe_speed(&self) -> f64 {
        self.pipe_speed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Running
        }
    }

    fn active(&self) -> bool {
        !self.game_over && !self.paused
    }

    // ── Frame function ──────────────────────────────────────────────────────

    /// Apply queued events in order, advance one frame and hand back the
    /// side effects produced along the way.
    pub fn step<I>(&mut self, events: I) -> Vec<Effect>
    where
        I: IntoIterator<Item = GameEvent>,
    {
        for event in events {
            self.handle(event);
        }
        self.advance_frame();
        self.take_effects()
    }

    pub fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::Input(Intent::Jump) => self.apply_jump(),
            GameEvent::Input(Intent::TogglePause) => self.toggle_pause(),
            GameEvent::Input(Intent::Restart) => self.reset(),
            GameEvent::SpawnPipe { roll } => self.spawn_pipe(roll),
        }
    }

    /// Drain effects produced by direct calls since the last drain.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ── Operations ──────────────────────────────────────────────────────────

    pub fn reset(&mut self) {
        self.bird = Bird::spawn(&self.field);
        self.pipes.clear();
        self.score = 0;
        self.pipe_speed = INITIAL_PIPE_SPEED;
        self.frame_count = 0;
        self.game_over = false;
        self.paused = false;
        debug!("Run reset");
    }

    pub fn apply_jump(&mut self) {
        if !self.active() {
            return;
        }
        self.bird.jump();
        self.effects.push(Effect::Play(Cue::Jump));
    }

    pub fn toggle_pause(&mut self) {
        if self.game_over {
            return;
        }
        self.paused = !self.paused;
        debug!("Paused: {}", self.paused);
    }

    pub fn spawn_pipe(&mut self, roll: f64) {
        if !self.active() {
            return;
        }
        let top = self.field.pipe_top_for_roll(roll);
        self.pipes.push(Pipe::new(self.field.width, top));
    }

    pub fn advance_frame(&mut self) {
        if !self.active() {
            return;
        }

        self.frame_count += 1;
        if self.frame_count % SPEED_RAMP_FRAMES == 0 {
            self.pipe_speed += SPEED_STEP;
        }

        self.bird.integrate();

        let mut crashed = false;
        for pipe in &mut self.pipes {
            pipe.x -= self.pipe_speed;
            // Score is frozen from the moment of the crash.
            if crashed {
                continue;
            }
            if collision::hits_pipe(&self.bird, pipe) {
                crashed = true;
                continue;
            }
            if collision::try_score(&self.bird, pipe) {
                self.score += 1;
            }
        }
        if crashed || collision::hits_boundary(&self.bird, &self.field) {
            self.end_run();
        }

        self.pipes.retain(|p| !p.is_off_screen());
    }

    pub fn end_run(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.effects.push(Effect::Play(Cue::Hit));
        info!("Run ended with score {}", self.score);

        if self.score > self.high_score {
            self.high_score = self.score;
            self.effects.push(Effect::SaveHighScore(self.score));
            info!("New high score: {}", self.score);
        }
    }

    /// Adopt a resized playfield. The run carries on; pipes keep their
    /// positions.
    pub fn resize(&mut self, field: Playfield) {
        self.field = field;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GAP_HEIGHT, JUMP_IMPULSE};

    fn game() -> Game {
        Game::new(Playfield::new(400.0, 500.0), 0)
    }

    /// A pipe with the gap around the spawn height.
    fn safe_pipe(x: f64) -> Pipe {
        Pipe::new(x, 200.0)
    }

    #[test]
    fn test_new_game_defaults() {
        let g = game();
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.score(), 0);
        assert_eq!(g.frame_count(), 0);
        assert!((g.pipe_speed() - 2.0).abs() < f64::EPSILON);
        assert!(g.pipes().is_empty());
        assert!((g.bird().y - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_one_frame_of_gravity() {
        let mut g = game();
        g.advance_frame();
        assert!((g.bird().velocity - 0.6).abs() < 1e-9);
        assert!((g.bird().y - 250.6).abs() < 1e-9);
        g.advance_frame();
        assert!((g.bird().velocity - 1.2).abs() < 1e-9);
        assert!((g.bird().y - 251.8).abs() < 1e-9);
    }

    #[test]
    fn test_jump_overrides_velocity() {
        let mut g = game();
        for _ in 0..10 {
            g.advance_frame();
        }
        assert!(g.bird().velocity > 5.0);
        g.apply_jump();
        assert!((g.bird().velocity - JUMP_IMPULSE).abs() < f64::EPSILON);
        assert_eq!(g.take_effects(), vec![Effect::Play(Cue::Jump)]);
    }

    #[test]
    fn test_jump_ignored_while_paused_or_over() {
        let mut g = game();
        g.toggle_pause();
        g.apply_jump();
        assert_eq!(g.bird().velocity, 0.0);
        assert!(g.take_effects().is_empty());

        g.toggle_pause();
        g.end_run();
        g.take_effects();
        g.apply_jump();
        assert_eq!(g.bird().velocity, 0.0);
        assert!(g.take_effects().is_empty());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut g = game();
        g.handle(GameEvent::SpawnPipe { roll: 0.5 });
        g.toggle_pause();
        assert_eq!(g.phase(), Phase::Paused);
        let y = g.bird().y;
        let x = g.pipes()[0].x;
        for _ in 0..100 {
            g.advance_frame();
        }
        assert_eq!(g.frame_count(), 0);
        assert_eq!(g.bird().y, y);
        assert_eq!(g.pipes()[0].x, x);
        assert!(!g.is_game_over());

        g.toggle_pause();
        assert_eq!(g.phase(), Phase::Running);
    }

    #[test]
    fn test_pause_has_no_effect_after_game_over() {
        let mut g = game();
        g.end_run();
        g.toggle_pause();
        assert!(!g.is_paused());
        assert_eq!(g.phase(), Phase::GameOver);
    }

    #[test]
    fn test_speed_ramp_every_600_frames() {
        let mut g = game();
        let mut last_speed = g.pipe_speed();
        for frame in 1..=1800u64 {
            // Keep the bird airborne
            if g.bird().y > 300.0 {
                g.apply_jump();
            }
            g.advance_frame();
            assert!(!g.is_game_over(), "bird crashed at frame {}", frame);
            assert!(g.pipe_speed() >= last_speed);
            last_speed = g.pipe_speed();
            let expected = 2.0 + 0.5 * (frame / 600) as f64;
            assert!((g.pipe_speed() - expected).abs() < f64::EPSILON);
        }
        assert!((g.pipe_speed() - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spawned_pipe_geometry() {
        let mut g = game();
        g.spawn_pipe(0.0);
        let pipe = &g.pipes()[0];
        assert!((pipe.x - 400.0).abs() < f64::EPSILON);
        assert!((pipe.top_height() - 20.0).abs() < f64::EPSILON);
        assert!((pipe.bottom_start() - pipe.top_height() - GAP_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spawn_dropped_unless_running() {
        let mut g = game();
        g.toggle_pause();
        g.spawn_pipe(0.3);
        assert!(g.pipes().is_empty());
        g.toggle_pause();
        g.end_run();
        g.spawn_pipe(0.3);
        assert!(g.pipes().is_empty());
    }

    #[test]
    fn test_pipes_scroll_by_speed() {
        let mut g = game();
        g.spawn_pipe(0.5);
        g.advance_frame();
        assert!((g.pipes()[0].x - 398.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_once_per_pipe() {
        let mut g = game();
        g.pipes.push(safe_pipe(1.0));
        g.bird.y = 230.0;
        g.advance_frame();
        assert_eq!(g.score(), 1);
        assert!(g.pipes()[0].scored);
        g.bird.velocity = 0.0;
        g.advance_frame();
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn test_pipe_collision_ends_run() {
        let mut g = game();
        g.pipes.push(Pipe::new(62.0, 20.0));
        // Bird at 250 is well below the gap [20, 160)
        g.advance_frame();
        assert!(g.is_game_over());
        assert_eq!(g.take_effects(), vec![Effect::Play(Cue::Hit)]);
    }

    #[test]
    fn test_floor_ends_run() {
        let mut g = game();
        g.bird.y = 467.0;
        g.bird.velocity = 2.0;
        g.advance_frame();
        assert!(g.is_game_over());
    }

    #[test]
    fn test_ceiling_ends_run() {
        let mut g = game();
        g.bird.y = 5.0;
        g.apply_jump();
        g.advance_frame();
        assert!(g.is_game_over());
    }

    #[test]
    fn test_no_scoring_after_crash_in_same_frame() {
        let mut g = game();
        g.pipes.push(Pipe::new(62.0, 20.0));
        g.pipes.push(safe_pipe(-1.0));
        g.advance_frame();
        assert!(g.is_game_over());
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_end_run_is_idempotent() {
        let mut g = game();
        g.score = 3;
        g.end_run();
        assert_eq!(
            g.take_effects(),
            vec![Effect::Play(Cue::Hit), Effect::SaveHighScore(3)]
        );
        g.end_run();
        assert!(g.take_effects().is_empty());
        assert!(g.is_game_over());
        assert_eq!(g.high_score(), 3);
    }

    #[test]
    fn test_high_score_only_increases() {
        let mut g = Game::new(Playfield::new(400.0, 500.0), 10);
        g.score = 4;
        g.end_run();
        assert_eq!(g.high_score(), 10);
        assert_eq!(g.take_effects(), vec![Effect::Play(Cue::Hit)]);

        g.reset();
        g.score = 10;
        g.end_run();
        assert_eq!(g.high_score(), 10);
        assert!(!g.take_effects().contains(&Effect::SaveHighScore(10)));

        g.reset();
        g.score = 11;
        g.end_run();
        assert_eq!(g.high_score(), 11);
        assert!(g.take_effects().contains(&Effect::SaveHighScore(11)));
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut g = game();
        g.frame_count = 700;
        g.pipe_speed = 2.5;
        g.bird.velocity = 4.0;
        g.score = 5;
        g.pipes.push(safe_pipe(100.0));
        g.end_run();
        g.paused = true;

        g.reset();
        assert_eq!(g.score(), 0);
        assert_eq!(g.frame_count(), 0);
        assert!((g.pipe_speed() - 2.0).abs() < f64::EPSILON);
        assert!(!g.is_game_over());
        assert!(!g.is_paused());
        assert!(g.pipes().is_empty());
        assert_eq!(g.bird().velocity, 0.0);
        assert!((g.bird().y - 250.0).abs() < f64::EPSILON);
        assert_eq!(g.high_score(), 5);
    }

    #[test]
    fn test_off_screen_pipes_are_pruned() {
        let mut g = game();
        g.pipes.push(safe_pipe(-49.0));
        g.pipes.push(safe_pipe(300.0));
        g.bird.y = 230.0;
        g.advance_frame();
        assert_eq!(g.pipes().len(), 1);
        assert!((g.pipes()[0].x - 298.0).abs() < f64::EPSILON);
        // The pruned pipe had been scored already or in this frame
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn test_step_applies_events_in_order() {
        let mut g = game();
        let effects = g.step([
            GameEvent::Input(Intent::TogglePause),
            GameEvent::Input(Intent::Jump),
            GameEvent::Input(Intent::TogglePause),
            GameEvent::SpawnPipe { roll: 0.0 },
        ]);
        // The jump landed while paused, so it was dropped
        assert!(effects.is_empty());
        assert_eq!(g.pipes().len(), 1);
        assert_eq!(g.frame_count(), 1);
        assert!((g.bird().velocity - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_restart_intent_resets() {
        let mut g = game();
        g.end_run();
        g.take_effects();
        g.step([GameEvent::from(Intent::Restart)]);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.frame_count(), 1);
    }

    #[test]
    fn test_resize_keeps_run() {
        let mut g = game();
        g.spawn_pipe(0.5);
        g.advance_frame();
        g.resize(Playfield::new(300.0, 400.0));
        assert_eq!(g.frame_count(), 1);
        assert_eq!(g.pipes().len(), 1);
        g.spawn_pipe(0.0);
        assert!((g.pipes()[1].x - 300.0).abs() < f64::EPSILON);
    }
}
