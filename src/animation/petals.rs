use std::time::Duration;

use crate::animation::timing::{PETAL_COUNT, PETAL_WINDOW};

/// Which petal bitmap a sequence entry uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PetalImage {
    /// Drawn from the front-petal bitmap.
    Front,
    /// Drawn from the back-petal bitmap.
    Back,
}

/// One entry of the fixed petal sequence.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PetalSpec {
    /// Front or back bitmap.
    pub image: PetalImage,
    /// Direction from the flower centre, clockwise from +x in y-down space.
    pub angle_degrees: f64,
    /// Position in the fade-in order.
    pub sequence_index: usize,
}

/// Build the 16-entry petal sequence.
///
/// Front petals sit at multiples of 45°, back petals halfway between them; the order
/// alternates back/front (`back0, front0, back1, front1, ...`) so the two layers open in turn.
pub fn build_petal_sequence() -> [PetalSpec; PETAL_COUNT] {
    std::array::from_fn(|sequence_index| {
        let pair = (sequence_index / 2) as f64;
        let angle_front = pair * 45.0;
        if sequence_index % 2 == 0 {
            PetalSpec {
                image: PetalImage::Back,
                angle_degrees: angle_front + 22.5,
                sequence_index,
            }
        } else {
            PetalSpec {
                image: PetalImage::Front,
                angle_degrees: angle_front,
                sequence_index,
            }
        }
    })
}

/// Opacity (0..=255) of petal `index` after `petal_elapsed` of the sequence.
///
/// Petal `i` fades in linearly over `[i × window, (i + 1) × window)` and stays opaque after.
pub fn petal_alpha(index: usize, petal_elapsed: Duration) -> u8 {
    let window = PETAL_WINDOW.as_nanos();
    let start = window * index as u128;
    let end = start + window;
    let elapsed = petal_elapsed.as_nanos();

    if elapsed < start {
        0
    } else if elapsed >= end {
        255
    } else {
        // Truncating, so a petal is fully opaque only once its window has closed.
        ((elapsed - start) * 255 / window) as u8
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/petals.rs"]
mod tests;
