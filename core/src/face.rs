use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Number of faces on the die.
pub const FACE_COUNT: u8 = 6;

/// One face of a six-sided die, always in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FaceId(u8);

impl FaceId {
    pub const ONE: FaceId = FaceId(1);
    pub const SIX: FaceId = FaceId(FACE_COUNT);

    /// Every face, in pip order.
    pub const ALL: [FaceId; FACE_COUNT as usize] = [
        FaceId(1),
        FaceId(2),
        FaceId(3),
        FaceId(4),
        FaceId(5),
        FaceId(6),
    ];

    pub fn new(value: u8) -> Option<Self> {
        (1..=FACE_COUNT).contains(&value).then_some(Self(value))
    }

    /// Maps a uniform sample in `[0, 1)` onto a face: `floor(sample * 6) + 1`.
    ///
    /// Samples outside the half-open unit range (including NaN) are clamped
    /// into it so a misbehaving source can never produce face 0 or 7.
    pub fn from_unit_sample(sample: f64) -> Self {
        let sample = if sample.is_nan() {
            0.0
        } else {
            sample.clamp(0.0, 1.0)
        };
        let index = (sample * f64::from(FACE_COUNT)).floor() as u8;
        Self(index.min(FACE_COUNT - 1) + 1)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based position, handy for indexing per-face tables.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl Default for FaceId {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FaceId> for u8 {
    fn from(face: FaceId) -> Self {
        face.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("die face must be between 1 and 6, got {0}")]
pub struct InvalidFace(pub u8);

impl TryFrom<u8> for FaceId {
    type Error = InvalidFace;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FaceId::new(value).ok_or(InvalidFace(value))
    }
}
