//! Hand-data wire layout.
//!
//! The controller receives hand data as a flat series of signed 16-bit
//! big-endian words; it derives the hand count from the payload length. Per
//! hand, in order:
//!
//! ```text
//! word  0      validity     0 invalid (low inference score), 1 valid
//! word  1      hand width   width of the squared hand outline, 0 if invalid
//! words 2..7   digit states thumb, index, middle, ring, little
//! word  7      which hand   0 left, 1 right (palms facing camera)
//! words 8..10  label anchor x, y of a reference point for drawing labels
//! words 10..52 landmarks    x, y of each of the 21 keypoints, in index order
//! ```
//!
//! 52 words (104 bytes) per hand, hands concatenated left-of-image first.
//! Coordinates are truncated to their low 16 bits when widening past the
//! wire range; cameras in this system never produce frames that large.

use super::{digits, HandObservation, LM_X, LM_Y};

/// Words emitted per hand.
pub const WORDS_PER_HAND: usize = 52;

/// Lay out the per-frame hand data as its wire word series.
///
/// Hands whose landmark score does not exceed `score_threshold` are marked
/// invalid (leading `0, 0` pair) but still occupy their full slot, so the
/// receiver's per-hand framing never shifts.
pub fn hand_data_words(hands: &[HandObservation], score_threshold: f32) -> Vec<i16> {
    let mut words = Vec::with_capacity(hands.len() * WORDS_PER_HAND);

    for hand in hands {
        if hand.lm_score <= score_threshold {
            words.push(0);
            words.push(0);
        } else {
            words.push(1);
            words.push(hand.rect_w.round() as i16);
        }

        let inference = digits::infer(hand);
        words.push(inference.digits.thumb);
        words.push(inference.digits.index);
        words.push(inference.digits.middle);
        words.push(inference.digits.ring);
        words.push(inference.digits.little);
        words.push(inference.handedness.word());

        // Label anchor: x of the palm base, y of the lowest landmark on
        // screen, handy for positioning overlay text around the hand.
        let anchor_x = hand.landmarks[0][LM_X];
        let anchor_y = hand
            .landmarks
            .iter()
            .map(|point| point[LM_Y])
            .max()
            .unwrap_or(0);
        words.push(anchor_x as i16);
        words.push(anchor_y as i16);

        for point in &hand.landmarks {
            words.push(point[LM_X] as i16);
            words.push(point[LM_Y] as i16);
        }
    }

    words
}
