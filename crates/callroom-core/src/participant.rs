use std::sync::Arc;

use crate::capture::{Camera, CameraEvent, CameraFactory, CameraPosition, MicTrackFactory};
use crate::events::{NetworkQualityLevel, TrackKind};
use crate::tracks::{
    LocalAudioTrack, LocalVideoTrack, RemoteTrackPublication, TrackChange, TrackRole, VideoTrack,
};
use crate::vendor::{VendorLocalParticipant, VendorRemoteParticipant};

/// Either kind of participant, borrowed from the room that owns it.
#[derive(Clone, Copy)]
pub enum Participant<'a> {
    Local(&'a LocalParticipant),
    Remote(&'a RemoteParticipant),
}

impl<'a> Participant<'a> {
    pub fn identity(&self) -> &'a str {
        match self {
            Self::Local(p) => p.identity(),
            Self::Remote(p) => p.identity(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn camera_video_track(&self) -> Option<VideoTrack> {
        match self {
            Self::Local(p) => p.camera_video_track(),
            Self::Remote(p) => p.camera_video_track(),
        }
    }

    /// The local participant never shares its screen.
    pub fn screen_video_track(&self) -> Option<VideoTrack> {
        match self {
            Self::Local(_) => None,
            Self::Remote(p) => p.screen_video_track(),
        }
    }

    pub fn is_mic_on(&self) -> bool {
        match self {
            Self::Local(p) => p.is_mic_on(),
            Self::Remote(p) => p.is_mic_on(),
        }
    }

    pub fn network_quality_level(&self) -> NetworkQualityLevel {
        match self {
            Self::Local(p) => p.network_quality_level(),
            Self::Remote(p) => p.network_quality_level(),
        }
    }

    pub fn is_dominant_speaker(&self) -> bool {
        match self {
            Self::Local(_) => false,
            Self::Remote(p) => p.is_dominant_speaker(),
        }
    }

    pub fn should_mirror_video(&self) -> bool {
        match self {
            Self::Local(p) => p.should_mirror_video(),
            Self::Remote(_) => false,
        }
    }
}

/// The participant on this device.
///
/// Owns the mic track and camera capture. Tracks created before the room
/// connects ride along in the connect options; afterwards they are
/// published through the bound SDK handle.
pub struct LocalParticipant {
    identity: String,
    mic_track: Option<LocalAudioTrack>,
    camera: Option<Box<dyn Camera>>,
    camera_position: CameraPosition,
    is_camera_interrupted: bool,
    network_quality_level: NetworkQualityLevel,
    vendor: Option<Arc<dyn VendorLocalParticipant>>,
    mic_factory: Arc<dyn MicTrackFactory>,
    camera_factory: Arc<dyn CameraFactory>,
}

impl LocalParticipant {
    pub fn new(
        identity: &str,
        mic_factory: Arc<dyn MicTrackFactory>,
        camera_factory: Arc<dyn CameraFactory>,
    ) -> Self {
        Self {
            identity: identity.to_string(),
            mic_track: None,
            camera: None,
            camera_position: CameraPosition::Front,
            is_camera_interrupted: false,
            network_quality_level: NetworkQualityLevel::Unknown,
            vendor: None,
            mic_factory,
            camera_factory,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn is_mic_on(&self) -> bool {
        self.mic_track.as_ref().is_some_and(|t| t.is_enabled)
    }

    pub fn is_camera_on(&self) -> bool {
        self.camera.as_ref().is_some_and(|c| c.track().is_enabled)
    }

    pub fn mic_track(&self) -> Option<&LocalAudioTrack> {
        self.mic_track.as_ref()
    }

    pub fn camera_track(&self) -> Option<&LocalVideoTrack> {
        self.camera.as_ref().map(|c| c.track())
    }

    pub fn camera_video_track(&self) -> Option<VideoTrack> {
        self.camera_track().map(VideoTrack::from)
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.camera_position
    }

    pub fn should_mirror_video(&self) -> bool {
        self.camera_position == CameraPosition::Front
    }

    pub fn is_camera_interrupted(&self) -> bool {
        self.is_camera_interrupted
    }

    pub fn network_quality_level(&self) -> NetworkQualityLevel {
        self.network_quality_level
    }

    pub fn is_connected(&self) -> bool {
        self.vendor.is_some()
    }

    /// Turns the microphone on or off. Returns `true` if the state changed.
    ///
    /// A mic that cannot be created leaves the state untouched.
    pub fn set_mic_on(&mut self, on: bool) -> bool {
        if on {
            if self.mic_track.is_some() {
                return false;
            }
            let Some(track) = self.mic_factory.make_mic_track() else {
                tracing::warn!("unable to create microphone track");
                return false;
            };
            if let Some(vendor) = &self.vendor {
                vendor.publish_audio_track(&track);
            }
            tracing::info!("microphone on: {}", track.sid);
            self.mic_track = Some(track);
        } else {
            let Some(track) = self.mic_track.take() else {
                return false;
            };
            if let Some(vendor) = &self.vendor {
                vendor.unpublish_audio_track(&track);
            }
            tracing::info!("microphone off: {}", track.sid);
        }
        true
    }

    /// Turns the camera on or off. Returns `true` if the state changed.
    pub fn set_camera_on(&mut self, on: bool) -> bool {
        if on {
            if self.camera.is_some() {
                return false;
            }
            let Some(camera) = self.camera_factory.make_camera(self.camera_position) else {
                tracing::warn!("unable to create camera");
                return false;
            };
            if let Some(vendor) = &self.vendor {
                vendor.publish_video_track(camera.track());
            }
            tracing::info!("camera on: {}", camera.track().sid);
            self.camera = Some(camera);
        } else {
            let Some(camera) = self.camera.take() else {
                return false;
            };
            if let Some(vendor) = &self.vendor {
                if !self.is_camera_interrupted {
                    vendor.unpublish_video_track(camera.track());
                }
            }
            tracing::info!("camera off: {}", camera.track().sid);
        }
        self.is_camera_interrupted = false;
        true
    }

    /// Switches between front and back camera. Returns `true` if the
    /// position changed, which also flips mirroring.
    pub fn set_camera_position(&mut self, position: CameraPosition) -> bool {
        if self.camera_position == position {
            return false;
        }
        self.camera_position = position;
        if let Some(camera) = self.camera.as_mut() {
            camera.set_position(position);
        }
        true
    }

    /// Unpublishes the camera track while capture is interrupted and
    /// republishes it afterwards. `is_camera_on` is unaffected.
    pub fn handle_camera_event(&mut self, event: CameraEvent) {
        let Some(camera) = self.camera.as_ref() else {
            return;
        };
        match event {
            CameraEvent::Interrupted if !self.is_camera_interrupted => {
                tracing::info!("camera interrupted");
                self.is_camera_interrupted = true;
                if let Some(vendor) = &self.vendor {
                    vendor.unpublish_video_track(camera.track());
                }
            }
            CameraEvent::InterruptionEnded if self.is_camera_interrupted => {
                tracing::info!("camera interruption ended");
                self.is_camera_interrupted = false;
                if let Some(vendor) = &self.vendor {
                    vendor.publish_video_track(camera.track());
                }
            }
            _ => {}
        }
    }

    /// Tracks to attach when joining a room.
    pub fn audio_tracks(&self) -> Vec<LocalAudioTrack> {
        self.mic_track.iter().cloned().collect()
    }

    pub fn video_tracks(&self) -> Vec<LocalVideoTrack> {
        if self.is_camera_interrupted {
            return Vec::new();
        }
        self.camera_track().into_iter().cloned().collect()
    }

    /// Binds to the session's local handle. Tracks created after the
    /// connect options were built (sids not in `attached`) are published now.
    pub(crate) fn bind(&mut self, vendor: Arc<dyn VendorLocalParticipant>, attached: &[String]) {
        if let Some(track) = &self.mic_track {
            if !attached.contains(&track.sid) {
                vendor.publish_audio_track(track);
            }
        }
        if let Some(camera) = &self.camera {
            if !self.is_camera_interrupted && !attached.contains(&camera.track().sid) {
                vendor.publish_video_track(camera.track());
            }
        }
        self.vendor = Some(vendor);
    }

    pub(crate) fn unbind(&mut self) {
        self.vendor = None;
        self.network_quality_level = NetworkQualityLevel::Unknown;
    }

    pub(crate) fn set_network_quality_level(&mut self, level: NetworkQualityLevel) {
        self.network_quality_level = level;
    }
}

/// A participant on another device, projected from SDK callbacks.
///
/// Media state cannot be changed locally; only the dominant-speaker flag is
/// set by the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipant {
    identity: String,
    publications: Vec<RemoteTrackPublication>,
    network_quality_level: NetworkQualityLevel,
    is_dominant_speaker: bool,
}

impl RemoteParticipant {
    pub fn from_vendor(participant: VendorRemoteParticipant) -> Self {
        Self {
            identity: participant.identity,
            publications: participant.publications,
            network_quality_level: participant.network_quality_level,
            is_dominant_speaker: false,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn publications(&self) -> &[RemoteTrackPublication] {
        &self.publications
    }

    pub fn camera_video_track(&self) -> Option<VideoTrack> {
        self.video_track_with_role(TrackRole::Camera)
    }

    pub fn screen_video_track(&self) -> Option<VideoTrack> {
        self.video_track_with_role(TrackRole::Screen)
    }

    pub fn is_mic_on(&self) -> bool {
        self.publications
            .iter()
            .find(|p| p.kind == TrackKind::Audio)
            .is_some_and(|p| p.is_enabled)
    }

    pub fn network_quality_level(&self) -> NetworkQualityLevel {
        self.network_quality_level
    }

    pub fn is_dominant_speaker(&self) -> bool {
        self.is_dominant_speaker
    }

    fn video_track_with_role(&self, role: TrackRole) -> Option<VideoTrack> {
        self.publications
            .iter()
            .filter(|p| p.kind == TrackKind::Video && p.role() == role)
            .find_map(|p| p.video_track())
    }

    /// Applies one track callback. Returns `false` for a track this
    /// participant does not know about.
    pub(crate) fn apply_track_change(&mut self, kind: TrackKind, sid: &str, change: TrackChange) -> bool {
        if let TrackChange::Published { name, is_enabled } = change {
            match self.publications.iter_mut().find(|p| p.sid == sid) {
                Some(existing) => {
                    existing.name = name;
                    existing.is_enabled = is_enabled;
                }
                None => self.publications.push(RemoteTrackPublication {
                    sid: sid.to_string(),
                    name,
                    kind,
                    is_enabled,
                    is_subscribed: false,
                }),
            }
            return true;
        }

        let Some(index) = self.publications.iter().position(|p| p.sid == sid) else {
            return false;
        };
        if change == TrackChange::Unpublished {
            self.publications.remove(index);
            return true;
        }
        let publication = &mut self.publications[index];
        match change {
            TrackChange::Enabled => publication.is_enabled = true,
            TrackChange::Disabled => publication.is_enabled = false,
            TrackChange::Subscribed => publication.is_subscribed = true,
            TrackChange::Unsubscribed => publication.is_subscribed = false,
            TrackChange::Published { .. } | TrackChange::Unpublished => {}
        }
        true
    }

    pub(crate) fn set_network_quality_level(&mut self, level: NetworkQualityLevel) {
        self.network_quality_level = level;
    }

    pub(crate) fn set_dominant_speaker(&mut self, is_dominant_speaker: bool) {
        self.is_dominant_speaker = is_dominant_speaker;
    }
}
