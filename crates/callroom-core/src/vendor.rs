//! Seam to the real-time video SDK.
//!
//! The SDK owns media transport and signaling. The core only issues
//! connect/disconnect/publish commands and consumes the lifecycle and
//! track callbacks listed in [`VendorEvent`]. Callbacks are delivered on an
//! unbounded channel; draining it from the owning task is what marshals
//! vendor threads onto the single logical UI task.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::events::{NetworkQualityLevel, TrackKind};
use crate::settings::Settings;
use crate::tracks::{LocalAudioTrack, LocalVideoTrack, RemoteTrackPublication, TrackChange};

/// Everything the SDK needs to join a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub access_token: String,
    pub room_name: String,
    pub audio_tracks: Vec<LocalAudioTrack>,
    pub video_tracks: Vec<LocalVideoTrack>,
    pub dominant_speaker_enabled: bool,
    pub network_quality_enabled: bool,
}

pub trait ConnectOptionsFactory: Send + Sync {
    fn make_options(
        &self,
        access_token: String,
        room_name: &str,
        audio_tracks: Vec<LocalAudioTrack>,
        video_tracks: Vec<LocalVideoTrack>,
    ) -> ConnectOptions;
}

/// Builds options with the room-level feature flags taken from settings.
#[derive(Debug, Clone)]
pub struct DefaultConnectOptionsFactory {
    dominant_speaker_enabled: bool,
    network_quality_enabled: bool,
}

impl DefaultConnectOptionsFactory {
    pub fn new(settings: &Settings) -> Self {
        Self {
            dominant_speaker_enabled: settings.dominant_speaker_enabled,
            network_quality_enabled: settings.network_quality_enabled,
        }
    }
}

impl Default for DefaultConnectOptionsFactory {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl ConnectOptionsFactory for DefaultConnectOptionsFactory {
    fn make_options(
        &self,
        access_token: String,
        room_name: &str,
        audio_tracks: Vec<LocalAudioTrack>,
        video_tracks: Vec<LocalVideoTrack>,
    ) -> ConnectOptions {
        ConnectOptions {
            access_token,
            room_name: room_name.to_string(),
            audio_tracks,
            video_tracks,
            dominant_speaker_enabled: self.dominant_speaker_enabled,
            network_quality_enabled: self.network_quality_enabled,
        }
    }
}

/// Entry point of the SDK.
pub trait VideoSdk: Send + Sync {
    /// Starts joining a room. The outcome arrives on the returned channel as
    /// [`VendorEvent::Connected`] or [`VendorEvent::FailedToConnect`].
    fn connect(
        &self,
        options: ConnectOptions,
    ) -> (Arc<dyn VendorSession>, UnboundedReceiver<VendorEvent>);
}

/// A live (or pending) SDK room session.
pub trait VendorSession: Send + Sync {
    fn local_participant(&self) -> Arc<dyn VendorLocalParticipant>;
    fn disconnect(&self);
}

/// The SDK's handle for the local participant inside a session.
pub trait VendorLocalParticipant: Send + Sync {
    fn publish_audio_track(&self, track: &LocalAudioTrack);
    fn unpublish_audio_track(&self, track: &LocalAudioTrack);
    fn publish_video_track(&self, track: &LocalVideoTrack);
    fn unpublish_video_track(&self, track: &LocalVideoTrack);
}

/// State of a remote participant as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRemoteParticipant {
    pub identity: String,
    pub publications: Vec<RemoteTrackPublication>,
    pub network_quality_level: NetworkQualityLevel,
}

impl VendorRemoteParticipant {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            publications: Vec::new(),
            network_quality_level: NetworkQualityLevel::Unknown,
        }
    }
}

/// Callbacks delivered by the SDK.
#[derive(Debug, Clone)]
pub enum VendorEvent {
    Connected {
        remote_participants: Vec<VendorRemoteParticipant>,
    },
    FailedToConnect(String),
    /// `Some` when the session dropped unexpectedly.
    Disconnected(Option<String>),
    ParticipantConnected(VendorRemoteParticipant),
    ParticipantDisconnected {
        identity: String,
    },
    DominantSpeakerChanged(Option<String>),
    RemoteTrack {
        identity: String,
        kind: TrackKind,
        sid: String,
        change: TrackChange,
    },
    RemoteNetworkQualityChanged {
        identity: String,
        level: NetworkQualityLevel,
    },
    LocalNetworkQualityChanged(NetworkQualityLevel),
}
