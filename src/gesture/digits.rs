//! Digit-state inference from hand landmarks.
//!
//! All rules assume the palm faces the camera; gestures are only meant to be
//! recognized with hands held upright, so downward-pointing hands simply
//! decode as everything-retracted or unknown. Image coordinates have y
//! growing downward, which is why "above" compares with `<`.

use super::geometry::line_angle_degrees;
use super::landmark as lm;
use super::{
    DigitStates, HandDirection, HandInference, HandObservation, Handedness, DIGIT_EXTENDED_SIDE,
    DIGIT_EXTENDED_UP, DIGIT_RETRACTED, LM_X, LM_Y, UNKNOWN_DIGIT_POSITION,
};

/// Infer left vs right hand from the relative x positions of the thumb-side
/// and little-finger-side base landmarks.
///
/// The camera image mirrors the hands relative to the person viewing them; a
/// thumb-side base left of the little-finger side on screen means the left
/// hand.
pub fn infer_handedness(hand: &HandObservation) -> Handedness {
    if hand.landmarks[lm::INDEX_BASE][LM_X] < hand.landmarks[lm::LITTLE_TIP][LM_X] {
        Handedness::Left
    } else {
        Handedness::Right
    }
}

/// Infer whether the fingers point upward or sideways.
///
/// Uses the angle of the line from the index-finger base to the
/// little-finger base: a mostly-vertical knuckle line means the hand is held
/// sideways.
pub fn infer_direction(hand: &HandObservation) -> HandDirection {
    let angle = line_angle_degrees(
        hand.landmarks[lm::INDEX_BASE][LM_X],
        hand.landmarks[lm::INDEX_BASE][LM_Y],
        hand.landmarks[lm::LITTLE_BASE][LM_X],
        hand.landmarks[lm::LITTLE_BASE][LM_Y],
    );

    if angle > 45.0 && angle < 135.0 {
        HandDirection::Sideways
    } else {
        HandDirection::Upwards
    }
}

/// Infer the thumb state from the tip and its abutting joint.
///
/// For an upright hand the x ordering of tip vs abutting joint decides
/// extended-sideways vs retracted, mirrored between hands; for a sideways
/// hand the y ordering decides extended-up vs retracted.
pub fn infer_thumb_state(
    hand: &HandObservation,
    handedness: Handedness,
    direction: HandDirection,
) -> i16 {
    let tip_x = hand.landmarks[lm::THUMB_TIP][LM_X];
    let tip_y = hand.landmarks[lm::THUMB_TIP][LM_Y];
    let abut_x = hand.landmarks[lm::THUMB_TIP_ABUT][LM_X];
    let abut_y = hand.landmarks[lm::THUMB_TIP_ABUT][LM_Y];

    match (handedness, direction) {
        (Handedness::Left, HandDirection::Upwards) => {
            if tip_x < abut_x {
                DIGIT_EXTENDED_SIDE
            } else {
                DIGIT_RETRACTED
            }
        }
        (Handedness::Right, HandDirection::Upwards) => {
            if tip_x > abut_x {
                DIGIT_EXTENDED_SIDE
            } else {
                DIGIT_RETRACTED
            }
        }
        (_, HandDirection::Sideways) => {
            if tip_y < abut_y {
                DIGIT_EXTENDED_UP
            } else {
                DIGIT_RETRACTED
            }
        }
    }
}

/// Classify one finger from its tip, tip-abutting, and base-abutting joints.
///
/// Tip above the abutting joint above the lower joint reads as extended
/// straight up; tip hanging below the lower joint reads as retracted;
/// anything else cannot be classified.
fn finger_state(hand: &HandObservation, tip: usize, tip_abut: usize, base_abut: usize) -> i16 {
    let tip_y = hand.landmarks[tip][LM_Y];
    let tip_abut_y = hand.landmarks[tip_abut][LM_Y];
    let base_abut_y = hand.landmarks[base_abut][LM_Y];

    if tip_y < tip_abut_y && tip_abut_y < base_abut_y {
        DIGIT_EXTENDED_UP
    } else if base_abut_y < tip_y {
        DIGIT_RETRACTED
    } else {
        UNKNOWN_DIGIT_POSITION
    }
}

/// Run the full per-hand inference: handedness, direction, and all five
/// digit states.
///
/// Sideways hands report all four fingers retracted regardless of their
/// joint ordering; only the thumb is classified in that orientation.
pub fn infer(hand: &HandObservation) -> HandInference {
    let handedness = infer_handedness(hand);
    let direction = infer_direction(hand);

    let thumb = infer_thumb_state(hand, handedness, direction);

    let mut digits = DigitStates {
        thumb,
        index: finger_state(hand, lm::INDEX_TIP, lm::INDEX_TIP_ABUT, lm::INDEX_BASE_ABUT),
        middle: finger_state(hand, lm::MIDDLE_TIP, lm::MIDDLE_TIP_ABUT, lm::MIDDLE_BASE_ABUT),
        ring: finger_state(hand, lm::RING_TIP, lm::RING_TIP_ABUT, lm::RING_BASE_ABUT),
        little: finger_state(hand, lm::LITTLE_TIP, lm::LITTLE_TIP_ABUT, lm::LITTLE_BASE_ABUT),
    };

    if direction == HandDirection::Sideways {
        digits.index = DIGIT_RETRACTED;
        digits.middle = DIGIT_RETRACTED;
        digits.ring = DIGIT_RETRACTED;
        digits.little = DIGIT_RETRACTED;
    }

    HandInference {
        handedness,
        direction,
        digits,
    }
}
