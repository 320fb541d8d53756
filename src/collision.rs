//! Axis-aligned hit tests and pipe scoring.

use crate::world::{Bird, PIPE_WIDTH, Pipe, Playfield};

/// The bird and the pipe share some horizontal extent.
pub fn overlaps_horizontally(bird: &Bird, pipe: &Pipe) -> bool {
    bird.x < pipe.x + PIPE_WIDTH && bird.right() > pipe.x
}

/// The bird sticks out of the pipe's gap, ignoring horizontal position.
pub fn outside_gap(bird: &Bird, pipe: &Pipe) -> bool {
    bird.y < pipe.top_height() || bird.bottom() > pipe.bottom_start()
}

pub fn hits_pipe(bird: &Bird, pipe: &Pipe) -> bool {
    overlaps_horizontally(bird, pipe) && outside_gap(bird, pipe)
}

/// Ceiling or floor contact.
pub fn hits_boundary(bird: &Bird, field: &Playfield) -> bool {
    bird.y < 0.0 || bird.bottom() > field.height
}

/// Marks the pipe scored the first time its trailing edge is behind the bird.
/// Returns whether this call scored it.
pub fn try_score(bird: &Bird, pipe: &mut Pipe) -> bool {
    if !pipe.scored && pipe.right() < bird.x {
        pipe.scored = true;
        return true;
    }
    false
}
