use serde::{Deserialize, Serialize};

use crate::events::TrackKind;

/// Track name used for published camera tracks.
pub const CAMERA_TRACK_NAME: &str = "camera";
/// Track name used for published screen-share tracks.
pub const SCREEN_TRACK_NAME: &str = "screen";
/// Track name used for published microphone tracks.
pub const MIC_TRACK_NAME: &str = "mic";

/// Role of a video track, derived from its published name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    Camera,
    Screen,
    Other,
}

impl TrackRole {
    pub fn from_name(name: &str) -> Self {
        if name == SCREEN_TRACK_NAME {
            Self::Screen
        } else if name.contains(CAMERA_TRACK_NAME) {
            Self::Camera
        } else {
            Self::Other
        }
    }
}

/// A renderable video track as seen by the view layer.
///
/// Presence means the track is published (local) or subscribed (remote);
/// `is_enabled` toggles independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTrack {
    pub sid: String,
    pub is_enabled: bool,
}

/// Locally captured microphone track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAudioTrack {
    pub sid: String,
    pub name: String,
    pub is_enabled: bool,
}

impl LocalAudioTrack {
    pub fn new(name: &str) -> Self {
        Self {
            sid: format!("TR-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            is_enabled: true,
        }
    }
}

/// Locally captured camera track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVideoTrack {
    pub sid: String,
    pub name: String,
    pub is_enabled: bool,
}

impl LocalVideoTrack {
    pub fn new(name: &str) -> Self {
        Self {
            sid: format!("TR-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            is_enabled: true,
        }
    }
}

impl From<&LocalVideoTrack> for VideoTrack {
    fn from(track: &LocalVideoTrack) -> Self {
        Self {
            sid: track.sid.clone(),
            is_enabled: track.is_enabled,
        }
    }
}

/// A track published by a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrackPublication {
    pub sid: String,
    pub name: String,
    pub kind: TrackKind,
    pub is_enabled: bool,
    pub is_subscribed: bool,
}

impl RemoteTrackPublication {
    pub fn role(&self) -> TrackRole {
        TrackRole::from_name(&self.name)
    }

    /// The renderable track, present only once subscribed.
    pub fn video_track(&self) -> Option<VideoTrack> {
        (self.kind == TrackKind::Video && self.is_subscribed).then(|| VideoTrack {
            sid: self.sid.clone(),
            is_enabled: self.is_enabled,
        })
    }
}

/// Per-track callbacks delivered by the vendor for a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackChange {
    Published { name: String, is_enabled: bool },
    Unpublished,
    Enabled,
    Disabled,
    Subscribed,
    Unsubscribed,
}
