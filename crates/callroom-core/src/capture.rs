//! Seam to the platform capture framework.

use serde::{Deserialize, Serialize};

use crate::tracks::{LocalAudioTrack, LocalVideoTrack};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPosition {
    #[default]
    Front,
    Back,
}

impl CameraPosition {
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Capture interruptions raised by a camera, e.g. when another app takes
/// the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraEvent {
    Interrupted,
    InterruptionEnded,
}

/// An active camera capture feeding a local video track.
pub trait Camera: Send {
    fn track(&self) -> &LocalVideoTrack;
    fn set_position(&mut self, position: CameraPosition);
}

pub trait CameraFactory: Send + Sync {
    /// Returns `None` when the device or permission is unavailable.
    fn make_camera(&self, position: CameraPosition) -> Option<Box<dyn Camera>>;
}

pub trait MicTrackFactory: Send + Sync {
    /// Returns `None` when the device or permission is unavailable.
    fn make_mic_track(&self) -> Option<LocalAudioTrack>;
}
