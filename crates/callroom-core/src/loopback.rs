//! In-process stand-ins for the video SDK, capture devices and token
//! service.
//!
//! Nothing leaves the process: sessions record the publish calls they
//! receive and a driver injects [`VendorEvent`]s by hand. Used by the
//! simulator binary and by the tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::auth::TokenProvider;
use crate::capture::{Camera, CameraFactory, CameraPosition, MicTrackFactory};
use crate::errors::CallError;
use crate::tracks::{CAMERA_TRACK_NAME, LocalAudioTrack, LocalVideoTrack, MIC_TRACK_NAME};
use crate::vendor::{ConnectOptions, VendorEvent, VendorLocalParticipant, VendorSession, VideoSdk};

/// A publish command observed by [`LoopbackLocalParticipant`], by track sid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishCall {
    PublishAudio(String),
    UnpublishAudio(String),
    PublishVideo(String),
    UnpublishVideo(String),
}

#[derive(Default)]
pub struct LoopbackLocalParticipant {
    calls: Mutex<Vec<PublishCall>>,
}

impl LoopbackLocalParticipant {
    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: PublishCall) {
        tracing::debug!("loopback: {call:?}");
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }
}

impl VendorLocalParticipant for LoopbackLocalParticipant {
    fn publish_audio_track(&self, track: &LocalAudioTrack) {
        self.record(PublishCall::PublishAudio(track.sid.clone()));
    }

    fn unpublish_audio_track(&self, track: &LocalAudioTrack) {
        self.record(PublishCall::UnpublishAudio(track.sid.clone()));
    }

    fn publish_video_track(&self, track: &LocalVideoTrack) {
        self.record(PublishCall::PublishVideo(track.sid.clone()));
    }

    fn unpublish_video_track(&self, track: &LocalVideoTrack) {
        self.record(PublishCall::UnpublishVideo(track.sid.clone()));
    }
}

pub struct LoopbackSession {
    options: ConnectOptions,
    local: Arc<LoopbackLocalParticipant>,
    events: UnboundedSender<VendorEvent>,
    disconnected: AtomicBool,
}

impl LoopbackSession {
    /// Options the session was created with.
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn local(&self) -> Arc<LoopbackLocalParticipant> {
        self.local.clone()
    }

    /// Delivers a callback as if the SDK raised it. Returns `false` once
    /// the receiving side has been dropped.
    pub fn send(&self, event: VendorEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

impl VendorSession for LoopbackSession {
    fn local_participant(&self) -> Arc<dyn VendorLocalParticipant> {
        self.local.clone()
    }

    fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

/// SDK whose sessions are driven by hand.
#[derive(Default)]
pub struct LoopbackSdk {
    sessions: Mutex<Vec<Arc<LoopbackSession>>>,
}

impl LoopbackSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_session(&self) -> Option<Arc<LoopbackSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl VideoSdk for LoopbackSdk {
    fn connect(
        &self,
        options: ConnectOptions,
    ) -> (Arc<dyn VendorSession>, UnboundedReceiver<VendorEvent>) {
        tracing::info!("loopback: connecting to {}", options.room_name);
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(LoopbackSession {
            options,
            local: Arc::new(LoopbackLocalParticipant::default()),
            events: tx,
            disconnected: AtomicBool::new(false),
        });
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(session.clone());
        (session as Arc<dyn VendorSession>, rx)
    }
}

/// Token provider answering every request with the same result.
pub struct StaticTokenProvider {
    result: Result<String, CallError>,
}

impl StaticTokenProvider {
    pub fn new(token: &str) -> Self {
        Self {
            result: Ok(token.to_string()),
        }
    }

    pub fn failing(error: CallError) -> Self {
        Self { result: Err(error) }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn fetch_access_token<'a>(
        &'a self,
        _room_name: &'a str,
    ) -> BoxFuture<'a, Result<String, CallError>> {
        let result = self.result.clone();
        async move { result }.boxed()
    }
}

pub struct LoopbackMicFactory {
    available: AtomicBool,
}

impl LoopbackMicFactory {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    /// Simulates a missing device or denied permission.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for LoopbackMicFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MicTrackFactory for LoopbackMicFactory {
    fn make_mic_track(&self) -> Option<LocalAudioTrack> {
        self.available
            .load(Ordering::SeqCst)
            .then(|| LocalAudioTrack::new(MIC_TRACK_NAME))
    }
}

pub struct LoopbackCamera {
    track: LocalVideoTrack,
    position: CameraPosition,
}

impl LoopbackCamera {
    pub fn position(&self) -> CameraPosition {
        self.position
    }
}

impl Camera for LoopbackCamera {
    fn track(&self) -> &LocalVideoTrack {
        &self.track
    }

    fn set_position(&mut self, position: CameraPosition) {
        self.position = position;
    }
}

pub struct LoopbackCameraFactory {
    available: AtomicBool,
}

impl LoopbackCameraFactory {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for LoopbackCameraFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraFactory for LoopbackCameraFactory {
    fn make_camera(&self, position: CameraPosition) -> Option<Box<dyn Camera>> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        Some(Box::new(LoopbackCamera {
            track: LocalVideoTrack::new(CAMERA_TRACK_NAME),
            position,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::{ConnectOptionsFactory, DefaultConnectOptionsFactory};

    #[tokio::test]
    async fn static_token_provider_answers() {
        let ok = StaticTokenProvider::new("tok");
        assert_eq!(ok.fetch_access_token("r").await.unwrap(), "tok");

        let failing = StaticTokenProvider::failing(CallError::Auth("denied".into()));
        assert_eq!(
            failing.fetch_access_token("r").await,
            Err(CallError::Auth("denied".into()))
        );
    }

    #[tokio::test]
    async fn sessions_forward_injected_events() {
        let sdk = LoopbackSdk::new();
        let options =
            DefaultConnectOptionsFactory::default().make_options("tok".into(), "r", vec![], vec![]);
        let (session, mut events) = sdk.connect(options);
        let loopback = sdk.last_session().unwrap();

        assert!(loopback.send(VendorEvent::DominantSpeakerChanged(None)));
        assert!(matches!(
            events.recv().await,
            Some(VendorEvent::DominantSpeakerChanged(None))
        ));

        session.disconnect();
        assert!(loopback.is_disconnected());
        drop(events);
        assert!(!loopback.send(VendorEvent::Disconnected(None)));
    }
}
