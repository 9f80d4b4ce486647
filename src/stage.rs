//! Stage Transforms
//!
//! Every stage in an effect chain carries one [`Transform`]. Transforms mutate
//! a block of samples in place and never touch the chain topology, so the
//! feedback detector can treat them as opaque payload.

use serde::{Deserialize, Serialize};

/// Capability shared by anything that can transform a block of samples.
///
/// Implementations must only mutate `buffer`: no I/O, no allocation, no
/// link changes. An empty buffer is a no-op.
pub trait Process {
    fn process(&self, buffer: &mut [f32]);
}

/// The closed set of stage transforms
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Identity, buffer unchanged
    #[default]
    PassThrough,

    /// One-sided gate: samples above `threshold` are clamped down to it
    NoiseGate { threshold: f32 },

    /// Adds `ratio` to every sample
    GainBoost { ratio: f32 },

    /// Subtracts `offset` from every sample
    Compressor { offset: f32 },
}

impl Transform {
    pub fn noise_gate(threshold: f32) -> Self {
        Transform::NoiseGate { threshold }
    }

    pub fn gain_boost(ratio: f32) -> Self {
        Transform::GainBoost { ratio }
    }

    pub fn compressor(offset: f32) -> Self {
        Transform::Compressor { offset }
    }

    /// Short snake_case name of the variant, used in debug events
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::PassThrough => "pass_through",
            Transform::NoiseGate { .. } => "noise_gate",
            Transform::GainBoost { .. } => "gain_boost",
            Transform::Compressor { .. } => "compressor",
        }
    }

    /// Apply the transform to a single sample
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        match *self {
            Transform::PassThrough => sample,
            Transform::NoiseGate { threshold } => {
                if sample > threshold {
                    threshold
                } else {
                    sample
                }
            }
            Transform::GainBoost { ratio } => sample + ratio,
            Transform::Compressor { offset } => sample - offset,
        }
    }
}

impl Process for Transform {
    fn process(&self, buffer: &mut [f32]) {
        if matches!(self, Transform::PassThrough) {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = self.apply(*sample);
        }
    }
}
