//! Hand-pose data model and digit-state inference.
//!
//! The vision pipeline (external to this crate) delivers one
//! [`HandObservation`] per detected hand per frame: the 21 standard hand
//! landmarks in image pixel coordinates, a landmark confidence score, and the
//! width of the squared bounding box around the hand. This module turns those
//! raw landmarks into per-digit extended/retracted states and lays the result
//! out as the signed short-int series the controller expects.

pub mod digits;
pub mod geometry;
pub mod wire;

/// Digit cannot be classified from the landmarks.
pub const UNKNOWN_DIGIT_POSITION: i16 = i16::MAX;

/// Digit is curled into the palm.
pub const DIGIT_RETRACTED: i16 = i16::MAX - 1;

/// Digit extended, pointing straight up (0 degrees).
pub const DIGIT_EXTENDED_UP: i16 = 0;

/// Digit extended sideways (90 degrees CCW from straight up).
pub const DIGIT_EXTENDED_SIDE: i16 = 90;

/// Landmark indices of the hand keypoints.
///
/// Four points per digit, base to tip, plus the palm base at the wrist.
pub mod landmark {
    pub const PALM_BASE: usize = 0;

    pub const THUMB_BASE: usize = 1;
    pub const THUMB_BASE_ABUT: usize = 2;
    pub const THUMB_TIP_ABUT: usize = 3;
    pub const THUMB_TIP: usize = 4;

    pub const INDEX_BASE: usize = 5;
    pub const INDEX_BASE_ABUT: usize = 6;
    pub const INDEX_TIP_ABUT: usize = 7;
    pub const INDEX_TIP: usize = 8;

    pub const MIDDLE_BASE: usize = 9;
    pub const MIDDLE_BASE_ABUT: usize = 10;
    pub const MIDDLE_TIP_ABUT: usize = 11;
    pub const MIDDLE_TIP: usize = 12;

    pub const RING_BASE: usize = 13;
    pub const RING_BASE_ABUT: usize = 14;
    pub const RING_TIP_ABUT: usize = 15;
    pub const RING_TIP: usize = 16;

    pub const LITTLE_BASE: usize = 17;
    pub const LITTLE_BASE_ABUT: usize = 18;
    pub const LITTLE_TIP_ABUT: usize = 19;
    pub const LITTLE_TIP: usize = 20;

    /// Total landmark count per hand.
    pub const COUNT: usize = 21;
}

/// Index of the x coordinate within a landmark pair.
pub const LM_X: usize = 0;
/// Index of the y coordinate within a landmark pair.
pub const LM_Y: usize = 1;

/// One detected hand in one frame, as delivered by the vision pipeline.
#[derive(Debug, Clone)]
pub struct HandObservation {
    /// The 21 landmark keypoints in image pixel coordinates, `[x, y]`.
    /// Y grows downward, as in the source image.
    pub landmarks: [[i32; 2]; landmark::COUNT],
    /// Landmark inference confidence, 0.0 to 1.0.
    pub lm_score: f32,
    /// Width in pixels of the squared bounding box around the hand.
    pub rect_w: f32,
}

/// Which way the fingers point, assuming palms face the camera.
///
/// Fingers pointing outward from the body or downward with palms toward the
/// camera are uncomfortable holds and deliberately not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandDirection {
    /// Fingers upward.
    Upwards,
    /// Fingers sideways, toward the center between both hands.
    Sideways,
}

/// Left or right hand, inferred from landmark geometry.
///
/// Only accurate when the palm faces the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Wire encoding: 0 for left, 1 for right.
    pub const fn word(self) -> i16 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Per-digit extended/retracted/angle states for one hand.
///
/// Each value is one of [`UNKNOWN_DIGIT_POSITION`], [`DIGIT_RETRACTED`], or a
/// pointing angle in degrees CCW from straight up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitStates {
    pub thumb: i16,
    pub index: i16,
    pub middle: i16,
    pub ring: i16,
    pub little: i16,
}

/// Complete inference result for one hand.
#[derive(Debug, Clone, Copy)]
pub struct HandInference {
    pub handedness: Handedness,
    pub direction: HandDirection,
    pub digits: DigitStates,
}
