use std::time::Duration;

use fundsp::prelude::*;
use log::{debug, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

// ── Sounds ──────────────────────────────────────────────────────────────────

pub const SAMPLE_RATE: u32 = 44100;

/// The two sound cues the game triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Jump,
    Hit,
}

impl Cue {
    fn index(self) -> usize {
        match self {
            Cue::Jump => 0,
            Cue::Hit => 1,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Cue::Jump => Duration::from_millis(150),
            Cue::Hit => Duration::from_millis(500),
        }
    }

    /// Render the cue to mono samples at [`SAMPLE_RATE`].
    pub fn synthesize(self) -> Vec<f32> {
        match self {
            Cue::Jump => {
                // Quick upward chirp, 320Hz to 720Hz
                let freq = lfo(|t| lerp(320.0, 720.0, min(t / 0.12, 1.0)) as f32);
                let gain = lfo(|t| lerp(0.2, 0.0, min(t / 0.15, 1.0)) as f32);
                let mut sound = (freq >> sine::<f32>()) * gain;
                render(&mut sound, self.duration())
            }
            Cue::Hit => {
                // Falling sawtooth, 400Hz to 80Hz over 0.4s, fading out over 0.5s
                let freq = lfo(|t| lerp(400.0, 80.0, min(t / 0.4, 1.0)) as f32);
                let gain = lfo(|t| lerp(0.15, 0.0, min(t / 0.5, 1.0)) as f32);
                let mut sound = (freq >> saw()) * gain;
                render(&mut sound, self.duration())
            }
        }
    }
}

fn render(unit: &mut dyn AudioUnit, length: Duration) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    unit.reset();
    let frames = (SAMPLE_RATE as u128 * length.as_millis() / 1000) as usize;
    (0..frames).map(|_| unit.get_mono() as f32).collect()
}

// ── Playback ────────────────────────────────────────────────────────────────

struct Output {
    // Dropping the stream silences every sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Fire-and-forget cue player. Without an audio device every call is a no-op.
pub struct Audio {
    output: Option<Output>,
    samples: [Vec<f32>; 2],
    voices: [Option<Sink>; 2],
}

impl Audio {
    pub fn open(enabled: bool) -> Self {
        let output = if enabled {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(Output {
                    _stream: stream,
                    handle,
                }),
                Err(e) => {
                    warn!("No audio output, playing silently: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self::with_output(output)
    }

    pub fn silent() -> Self {
        Self::with_output(None)
    }

    fn with_output(output: Option<Output>) -> Self {
        // Nothing to synthesize if nothing will ever play.
        let samples = if output.is_some() {
            [Cue::Jump.synthesize(), Cue::Hit.synthesize()]
        } else {
            [Vec::new(), Vec::new()]
        };
        Self {
            output,
            samples,
            voices: [None, None],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some()
    }

    /// Play `cue` from the start, cutting off the previous play of the same cue.
    pub fn play(&mut self, cue: Cue) {
        let Some(output) = &self.output else {
            return;
        };
        let slot = cue.index();
        if let Some(previous) = self.voices[slot].take() {
            previous.stop();
        }
        match Sink::try_new(&output.handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, self.samples[slot].clone()));
                self.voices[slot] = Some(sink);
            }
            Err(e) => debug!("Dropped {:?} cue: {}", cue, e),
        }
    }
}
