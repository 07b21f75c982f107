use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::auth::TokenProvider;
use crate::capture::CameraPosition;
use crate::errors::CallError;
use crate::events::{ConnectionState, EventEmitter, EventListener, RoomEvent};
use crate::participant::{LocalParticipant, Participant, RemoteParticipant};
use crate::vendor::{ConnectOptionsFactory, VendorEvent, VendorSession, VideoSdk};

/// Call lifecycle and roster of a single room.
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`, with
/// `Connecting -> Disconnected` when joining fails. The local participant
/// exists for the whole lifetime of the room; remote participants only
/// while connected.
///
/// Every operation returns the domain events it produced, in order, after
/// broadcasting them to registered listeners.
pub struct Room {
    state: ConnectionState,
    local_participant: LocalParticipant,
    remote_participants: Vec<RemoteParticipant>,
    dominant_speaker: Option<String>,
    token_provider: Arc<dyn TokenProvider>,
    options_factory: Arc<dyn ConnectOptionsFactory>,
    sdk: Arc<dyn VideoSdk>,
    session: Option<Arc<dyn VendorSession>>,
    vendor_events: Option<UnboundedReceiver<VendorEvent>>,
    /// Sids of the local tracks handed to the SDK in the connect options.
    attached_tracks: Vec<String>,
    emitter: EventEmitter<RoomEvent>,
}

impl Room {
    pub fn new(
        local_participant: LocalParticipant,
        token_provider: Arc<dyn TokenProvider>,
        options_factory: Arc<dyn ConnectOptionsFactory>,
        sdk: Arc<dyn VideoSdk>,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            local_participant,
            remote_participants: Vec::new(),
            dominant_speaker: None,
            token_provider,
            options_factory,
            sdk,
            session: None,
            vendor_events: None,
            attached_tracks: Vec::new(),
            emitter: EventEmitter::new(),
        }
    }

    /// Register a listener for room events.
    pub fn add_listener(&self, listener: Arc<dyn EventListener<RoomEvent>>) {
        self.emitter.add_listener(listener);
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn local_participant(&self) -> &LocalParticipant {
        &self.local_participant
    }

    pub fn local_participant_mut(&mut self) -> &mut LocalParticipant {
        &mut self.local_participant
    }

    /// Remote participants in arrival order.
    pub fn remote_participants(&self) -> &[RemoteParticipant] {
        &self.remote_participants
    }

    pub fn remote_participant(&self, identity: &str) -> Option<&RemoteParticipant> {
        self.remote_participants
            .iter()
            .find(|p| p.identity() == identity)
    }

    pub fn dominant_speaker(&self) -> Option<&RemoteParticipant> {
        self.dominant_speaker
            .as_deref()
            .and_then(|identity| self.remote_participant(identity))
    }

    /// Looks up the local or a remote participant by identity.
    pub fn participant(&self, identity: &str) -> Option<Participant<'_>> {
        if self.local_participant.identity() == identity {
            return Some(Participant::Local(&self.local_participant));
        }
        self.remote_participant(identity).map(Participant::Remote)
    }

    /// Fetches an access token and asks the SDK to join `room_name`.
    ///
    /// The join completes when the SDK delivers `Connected` or
    /// `FailedToConnect` through [`Room::next_vendor_event`].
    ///
    /// # Panics
    ///
    /// Panics if the room is not disconnected.
    pub async fn connect(&mut self, room_name: &str) -> Vec<RoomEvent> {
        assert_eq!(
            self.state,
            ConnectionState::Disconnected,
            "connect called on a room that is not disconnected"
        );
        let mut events = Vec::new();

        self.state = ConnectionState::Connecting;
        tracing::info!("connecting to room {room_name}");
        self.post(&mut events, RoomEvent::DidStartConnecting);

        let token_provider = self.token_provider.clone();
        match token_provider.fetch_access_token(room_name).await {
            Ok(token) => {
                let audio_tracks = self.local_participant.audio_tracks();
                let video_tracks = self.local_participant.video_tracks();
                self.attached_tracks = audio_tracks
                    .iter()
                    .map(|t| t.sid.clone())
                    .chain(video_tracks.iter().map(|t| t.sid.clone()))
                    .collect();

                let options =
                    self.options_factory
                        .make_options(token, room_name, audio_tracks, video_tracks);
                let (session, vendor_events) = self.sdk.connect(options);
                self.session = Some(session);
                self.vendor_events = Some(vendor_events);
            }
            Err(e) => {
                tracing::warn!("failed to fetch access token: {e}");
                self.state = ConnectionState::Disconnected;
                self.post(&mut events, RoomEvent::DidFailToConnect(e));
            }
        }

        events
    }

    /// Leaves the room. Callbacks still queued by the SDK are dropped.
    pub fn disconnect(&mut self) -> Vec<RoomEvent> {
        let mut events = Vec::new();
        if self.state == ConnectionState::Disconnected {
            return events;
        }

        if let Some(session) = &self.session {
            session.disconnect();
        }
        let removed = self.teardown();
        tracing::info!("disconnected from room");

        self.post(&mut events, RoomEvent::DidDisconnect { error: None });
        if !removed.is_empty() {
            self.post(&mut events, RoomEvent::DidRemoveRemoteParticipants(removed));
        }
        events
    }

    /// Turns the local microphone on or off. A change is announced as a
    /// participant update; a no-op or a failed capture announces nothing.
    pub fn set_mic_on(&mut self, on: bool) -> Vec<RoomEvent> {
        let changed = self.local_participant.set_mic_on(on);
        self.local_participant_did_update(changed)
    }

    pub fn set_camera_on(&mut self, on: bool) -> Vec<RoomEvent> {
        let changed = self.local_participant.set_camera_on(on);
        self.local_participant_did_update(changed)
    }

    pub fn set_camera_position(&mut self, position: CameraPosition) -> Vec<RoomEvent> {
        let changed = self.local_participant.set_camera_position(position);
        self.local_participant_did_update(changed)
    }

    /// Waits for the next SDK callback. Returns `None` when there is no
    /// session or the SDK closed its side.
    pub async fn next_vendor_event(&mut self) -> Option<VendorEvent> {
        let event = self.vendor_events.as_mut()?.recv().await;
        if event.is_none() {
            tracing::debug!("vendor event channel closed");
            self.vendor_events = None;
        }
        event
    }

    /// Applies one SDK callback to the room.
    pub fn handle_vendor_event(&mut self, event: VendorEvent) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        match event {
            VendorEvent::Connected { remote_participants } => {
                if self.state != ConnectionState::Connecting {
                    tracing::warn!("ignoring connected callback in state {:?}", self.state);
                    return events;
                }
                let Some(session) = self.session.clone() else {
                    return events;
                };
                self.local_participant
                    .bind(session.local_participant(), &self.attached_tracks);
                self.remote_participants = remote_participants
                    .into_iter()
                    .map(RemoteParticipant::from_vendor)
                    .collect();
                self.state = ConnectionState::Connected;
                tracing::info!(
                    "room connected with {} remote participants",
                    self.remote_participants.len()
                );

                self.post(&mut events, RoomEvent::DidConnect);
                if !self.remote_participants.is_empty() {
                    let added = self.remote_participants.clone();
                    self.post(&mut events, RoomEvent::DidAddRemoteParticipants(added));
                }
            }

            VendorEvent::FailedToConnect(reason) => {
                if self.state != ConnectionState::Connecting {
                    tracing::warn!("ignoring connect failure in state {:?}", self.state);
                    return events;
                }
                tracing::warn!("failed to connect: {reason}");
                self.teardown();
                self.post(
                    &mut events,
                    RoomEvent::DidFailToConnect(CallError::Connection(reason)),
                );
            }

            VendorEvent::Disconnected(reason) => {
                if self.state == ConnectionState::Disconnected {
                    return events;
                }
                tracing::info!("room disconnected: {reason:?}");
                let removed = self.teardown();
                self.post(
                    &mut events,
                    RoomEvent::DidDisconnect {
                        error: reason.map(CallError::Disconnected),
                    },
                );
                if !removed.is_empty() {
                    self.post(&mut events, RoomEvent::DidRemoveRemoteParticipants(removed));
                }
            }

            VendorEvent::ParticipantConnected(participant) => {
                if self.state != ConnectionState::Connected {
                    tracing::warn!("ignoring participant {} before connect", participant.identity);
                    return events;
                }
                if self.remote_participant(&participant.identity).is_some() {
                    tracing::warn!("participant {} already in room", participant.identity);
                    return events;
                }
                let participant = RemoteParticipant::from_vendor(participant);
                tracing::info!("participant joined: {}", participant.identity());
                self.remote_participants.push(participant.clone());
                self.post(
                    &mut events,
                    RoomEvent::DidAddRemoteParticipants(vec![participant]),
                );
            }

            VendorEvent::ParticipantDisconnected { identity } => {
                let Some(index) = self
                    .remote_participants
                    .iter()
                    .position(|p| p.identity() == identity)
                else {
                    return events;
                };
                let mut participant = self.remote_participants.remove(index);
                participant.set_dominant_speaker(false);
                if self.dominant_speaker.as_deref() == Some(identity.as_str()) {
                    self.dominant_speaker = None;
                }
                tracing::info!("participant left: {identity}");
                self.post(
                    &mut events,
                    RoomEvent::DidRemoveRemoteParticipants(vec![participant]),
                );
            }

            VendorEvent::DominantSpeakerChanged(identity) => {
                // A speaker that is not in the roster counts as nobody.
                let identity = identity.filter(|id| self.remote_participant(id).is_some());
                if identity == self.dominant_speaker {
                    return events;
                }
                for participant in self.remote_participants.iter_mut() {
                    let is_dominant = identity.as_deref() == Some(participant.identity());
                    participant.set_dominant_speaker(is_dominant);
                }
                tracing::debug!("dominant speaker: {identity:?}");
                self.dominant_speaker = identity.clone();
                self.post(&mut events, RoomEvent::DominantSpeakerDidChange(identity));
            }

            VendorEvent::RemoteTrack {
                identity,
                kind,
                sid,
                change,
            } => {
                let Some(participant) = self.remote_participant_mut(&identity) else {
                    return events;
                };
                if participant.apply_track_change(kind, &sid, change) {
                    self.post(&mut events, RoomEvent::ParticipantDidUpdate { identity });
                }
            }

            VendorEvent::RemoteNetworkQualityChanged { identity, level } => {
                let Some(participant) = self.remote_participant_mut(&identity) else {
                    return events;
                };
                participant.set_network_quality_level(level);
                self.post(&mut events, RoomEvent::ParticipantDidUpdate { identity });
            }

            VendorEvent::LocalNetworkQualityChanged(level) => {
                if self.state != ConnectionState::Connected {
                    return events;
                }
                self.local_participant.set_network_quality_level(level);
                let identity = self.local_participant.identity().to_string();
                self.post(&mut events, RoomEvent::ParticipantDidUpdate { identity });
            }
        }

        events
    }

    fn local_participant_did_update(&self, changed: bool) -> Vec<RoomEvent> {
        let mut events = Vec::new();
        if changed {
            let identity = self.local_participant.identity().to_string();
            self.post(&mut events, RoomEvent::ParticipantDidUpdate { identity });
        }
        events
    }

    fn remote_participant_mut(&mut self, identity: &str) -> Option<&mut RemoteParticipant> {
        self.remote_participants
            .iter_mut()
            .find(|p| p.identity() == identity)
    }

    /// Drops the session and returns the remote participants that were in
    /// the room.
    fn teardown(&mut self) -> Vec<RemoteParticipant> {
        self.session = None;
        self.vendor_events = None;
        self.attached_tracks.clear();
        self.local_participant.unbind();
        self.dominant_speaker = None;
        self.state = ConnectionState::Disconnected;

        let mut removed = std::mem::take(&mut self.remote_participants);
        for participant in removed.iter_mut() {
            participant.set_dominant_speaker(false);
        }
        removed
    }

    fn post(&self, events: &mut Vec<RoomEvent>, event: RoomEvent) {
        self.emitter.emit(event.clone());
        events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::events::{NetworkQualityLevel, TrackKind};
    use crate::loopback::{
        LoopbackCameraFactory, LoopbackMicFactory, LoopbackSdk, PublishCall, StaticTokenProvider,
    };
    use crate::tracks::TrackChange;
    use crate::vendor::{DefaultConnectOptionsFactory, VendorRemoteParticipant};

    fn make_room(tokens: StaticTokenProvider) -> (Room, Arc<LoopbackSdk>) {
        let sdk = Arc::new(LoopbackSdk::new());
        let local = LocalParticipant::new(
            "me",
            Arc::new(LoopbackMicFactory::new()),
            Arc::new(LoopbackCameraFactory::new()),
        );
        let room = Room::new(
            local,
            Arc::new(tokens),
            Arc::new(DefaultConnectOptionsFactory::default()),
            sdk.clone(),
        );
        (room, sdk)
    }

    fn remote(identity: &str) -> VendorRemoteParticipant {
        VendorRemoteParticipant::new(identity)
    }

    fn identities(participants: &[RemoteParticipant]) -> Vec<&str> {
        participants.iter().map(|p| p.identity()).collect()
    }

    async fn connected_room(initial: &[&str]) -> (Room, Arc<LoopbackSdk>) {
        let (mut room, sdk) = make_room(StaticTokenProvider::new("tok"));
        room.connect("daily").await;
        let session = sdk.last_session().unwrap();
        session.send(VendorEvent::Connected {
            remote_participants: initial.iter().map(|id| remote(id)).collect(),
        });
        let event = room.next_vendor_event().await.unwrap();
        room.handle_vendor_event(event);
        (room, sdk)
    }

    #[tokio::test]
    async fn connect_fetches_token_then_joins() {
        let (mut room, sdk) = make_room(StaticTokenProvider::new("tok"));
        room.local_participant_mut().set_mic_on(true);
        let mic_sid = room.local_participant().mic_track().unwrap().sid.clone();

        let events = room.connect("daily").await;
        assert!(matches!(events.as_slice(), [RoomEvent::DidStartConnecting]));
        assert_eq!(room.state(), ConnectionState::Connecting);

        let session = sdk.last_session().unwrap();
        assert_eq!(session.options().access_token, "tok");
        assert_eq!(session.options().room_name, "daily");
        assert_eq!(session.options().audio_tracks[0].sid, mic_sid);

        session.send(VendorEvent::Connected {
            remote_participants: vec![remote("bob"), remote("alice")],
        });
        let event = room.next_vendor_event().await.unwrap();
        let events = room.handle_vendor_event(event);

        assert_eq!(room.state(), ConnectionState::Connected);
        assert!(room.local_participant().is_connected());
        match events.as_slice() {
            [RoomEvent::DidConnect, RoomEvent::DidAddRemoteParticipants(added)] => {
                assert_eq!(identities(added), vec!["bob", "alice"]);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        // The mic track rode along in the options, so it is not published again.
        assert!(session.local().calls().is_empty());
    }

    #[tokio::test]
    async fn connect_into_empty_room_emits_only_did_connect() {
        let (mut room, sdk) = make_room(StaticTokenProvider::new("tok"));
        room.connect("daily").await;
        let events = room.handle_vendor_event(VendorEvent::Connected {
            remote_participants: vec![],
        });
        assert!(matches!(events.as_slice(), [RoomEvent::DidConnect]));
        assert_eq!(sdk.session_count(), 1);
    }

    #[tokio::test]
    async fn token_failure_fails_the_connect() {
        let (mut room, sdk) =
            make_room(StaticTokenProvider::failing(CallError::Auth("denied".into())));

        let events = room.connect("daily").await;

        assert_eq!(room.state(), ConnectionState::Disconnected);
        assert_eq!(sdk.session_count(), 0);
        match events.as_slice() {
            [RoomEvent::DidStartConnecting, RoomEvent::DidFailToConnect(e)] => {
                assert_eq!(e, &CallError::Auth("denied".into()));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[tokio::test]
    async fn vendor_failure_fails_the_connect() {
        let (mut room, _sdk) = make_room(StaticTokenProvider::new("tok"));
        room.connect("daily").await;

        let events = room.handle_vendor_event(VendorEvent::FailedToConnect("timeout".into()));

        assert_eq!(room.state(), ConnectionState::Disconnected);
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::DidFailToConnect(CallError::Connection(_))]
        ));
        assert!(room.next_vendor_event().await.is_none());
    }

    #[tokio::test]
    #[should_panic(expected = "not disconnected")]
    async fn connecting_twice_is_fatal() {
        let (mut room, _sdk) = make_room(StaticTokenProvider::new("tok"));
        room.connect("daily").await;
        room.connect("daily").await;
    }

    #[tokio::test]
    async fn disconnect_clears_roster_and_reports_removals() {
        let (mut room, sdk) = connected_room(&["bob", "alice"]).await;
        let session = sdk.last_session().unwrap();

        let events = room.disconnect();

        assert!(session.is_disconnected());
        assert_eq!(room.state(), ConnectionState::Disconnected);
        assert!(room.remote_participants().is_empty());
        assert!(!room.local_participant().is_connected());
        match events.as_slice() {
            [
                RoomEvent::DidDisconnect { error: None },
                RoomEvent::DidRemoveRemoteParticipants(removed),
            ] => assert_eq!(identities(removed), vec!["bob", "alice"]),
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(room.disconnect().is_empty());
    }

    #[tokio::test]
    async fn reconnect_starts_from_empty_roster() {
        let (mut room, sdk) = connected_room(&["bob"]).await;
        room.disconnect();

        room.connect("daily").await;
        assert!(room.remote_participants().is_empty());
        let events = room.handle_vendor_event(VendorEvent::Connected {
            remote_participants: vec![remote("carol")],
        });
        assert_eq!(sdk.session_count(), 2);
        assert_eq!(identities(room.remote_participants()), vec!["carol"]);
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn unexpected_drop_carries_error() {
        let (mut room, _sdk) = connected_room(&["bob"]).await;

        let events = room.handle_vendor_event(VendorEvent::Disconnected(Some("network lost".into())));

        assert!(room.remote_participants().is_empty());
        match events.as_slice() {
            [
                RoomEvent::DidDisconnect { error: Some(CallError::Disconnected(reason)) },
                RoomEvent::DidRemoveRemoteParticipants(removed),
            ] => {
                assert_eq!(reason, "network lost");
                assert_eq!(identities(removed), vec!["bob"]);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[tokio::test]
    async fn callbacks_after_disconnect_are_dropped() {
        let (mut room, sdk) = connected_room(&[]).await;
        let session = sdk.last_session().unwrap();
        room.disconnect();

        assert!(!session.send(VendorEvent::ParticipantConnected(remote("late"))));
        assert!(room.next_vendor_event().await.is_none());
        let events = room.handle_vendor_event(VendorEvent::Connected {
            remote_participants: vec![remote("late")],
        });
        assert!(events.is_empty());
        assert!(room.remote_participants().is_empty());
    }

    #[tokio::test]
    async fn roster_deltas_are_single_participants() {
        let (mut room, _sdk) = connected_room(&["bob"]).await;

        let events = room.handle_vendor_event(VendorEvent::ParticipantConnected(remote("alice")));
        match events.as_slice() {
            [RoomEvent::DidAddRemoteParticipants(added)] => {
                assert_eq!(identities(added), vec!["alice"])
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(
            room.handle_vendor_event(VendorEvent::ParticipantConnected(remote("alice")))
                .is_empty()
        );

        let events = room.handle_vendor_event(VendorEvent::ParticipantDisconnected {
            identity: "bob".into(),
        });
        match events.as_slice() {
            [RoomEvent::DidRemoveRemoteParticipants(removed)] => {
                assert_eq!(identities(removed), vec!["bob"])
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(
            room.handle_vendor_event(VendorEvent::ParticipantDisconnected {
                identity: "ghost".into(),
            })
            .is_empty()
        );
        assert_eq!(identities(room.remote_participants()), vec!["alice"]);
    }

    #[tokio::test]
    async fn dominant_speaker_flag_moves() {
        let (mut room, _sdk) = connected_room(&["bob", "alice"]).await;

        room.handle_vendor_event(VendorEvent::DominantSpeakerChanged(Some("alice".into())));
        assert_eq!(room.dominant_speaker().map(|p| p.identity()), Some("alice"));

        let events = room.handle_vendor_event(VendorEvent::DominantSpeakerChanged(Some("bob".into())));
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::DominantSpeakerDidChange(Some(id))] if id == "bob"
        ));
        let flagged: Vec<_> = room
            .remote_participants()
            .iter()
            .filter(|p| p.is_dominant_speaker())
            .map(|p| p.identity())
            .collect();
        assert_eq!(flagged, vec!["bob"]);

        assert!(
            room.handle_vendor_event(VendorEvent::DominantSpeakerChanged(Some("bob".into())))
                .is_empty()
        );

        room.handle_vendor_event(VendorEvent::DominantSpeakerChanged(None));
        assert!(room.dominant_speaker().is_none());
        assert!(room.remote_participants().iter().all(|p| !p.is_dominant_speaker()));
    }

    #[tokio::test]
    async fn dominant_speaker_leaving_clears_it() {
        let (mut room, _sdk) = connected_room(&["bob"]).await;
        room.handle_vendor_event(VendorEvent::DominantSpeakerChanged(Some("bob".into())));
        room.handle_vendor_event(VendorEvent::ParticipantDisconnected {
            identity: "bob".into(),
        });
        assert!(room.dominant_speaker().is_none());
    }

    #[tokio::test]
    async fn track_callbacks_update_participants() {
        let (mut room, _sdk) = connected_room(&["bob"]).await;

        let events = room.handle_vendor_event(VendorEvent::RemoteTrack {
            identity: "bob".into(),
            kind: TrackKind::Video,
            sid: "MT-s".into(),
            change: TrackChange::Published { name: "screen".into(), is_enabled: true },
        });
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::ParticipantDidUpdate { identity }] if identity == "bob"
        ));
        room.handle_vendor_event(VendorEvent::RemoteTrack {
            identity: "bob".into(),
            kind: TrackKind::Video,
            sid: "MT-s".into(),
            change: TrackChange::Subscribed,
        });
        assert!(room.remote_participant("bob").unwrap().screen_video_track().is_some());

        room.handle_vendor_event(VendorEvent::RemoteNetworkQualityChanged {
            identity: "bob".into(),
            level: NetworkQualityLevel::Four,
        });
        assert_eq!(
            room.participant("bob").unwrap().network_quality_level(),
            NetworkQualityLevel::Four
        );

        let events = room.handle_vendor_event(VendorEvent::RemoteTrack {
            identity: "ghost".into(),
            kind: TrackKind::Audio,
            sid: "MT-x".into(),
            change: TrackChange::Enabled,
        });
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn local_network_quality_updates_local() {
        let (mut room, _sdk) = connected_room(&[]).await;
        let events = room.handle_vendor_event(VendorEvent::LocalNetworkQualityChanged(
            NetworkQualityLevel::Five,
        ));
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::ParticipantDidUpdate { identity }] if identity == "me"
        ));
        assert_eq!(
            room.local_participant().network_quality_level(),
            NetworkQualityLevel::Five
        );
    }

    #[tokio::test]
    async fn mic_turned_on_while_connecting_is_published_on_connect() {
        let (mut room, sdk) = make_room(StaticTokenProvider::new("tok"));
        room.connect("daily").await;
        room.local_participant_mut().set_mic_on(true);
        let sid = room.local_participant().mic_track().unwrap().sid.clone();

        room.handle_vendor_event(VendorEvent::Connected {
            remote_participants: vec![],
        });

        let session = sdk.last_session().unwrap();
        assert_eq!(session.local().calls(), vec![PublishCall::PublishAudio(sid)]);
    }

    #[tokio::test]
    async fn listeners_see_every_event() {
        let (mut room, _sdk) = make_room(StaticTokenProvider::new("tok"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        room.add_listener(Arc::new(move |event: RoomEvent| {
            sink.lock().unwrap().push(format!("{event:?}"))
        }));

        room.connect("daily").await;
        room.handle_vendor_event(VendorEvent::Connected {
            remote_participants: vec![remote("bob")],
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], "DidConnect");
    }

    #[test]
    fn local_toggles_announce_only_real_changes() {
        let (mut room, _sdk) = make_room(StaticTokenProvider::new("tok"));

        let events = room.set_mic_on(true);
        assert!(matches!(
            events.as_slice(),
            [RoomEvent::ParticipantDidUpdate { identity }] if identity == "me"
        ));
        assert!(room.set_mic_on(true).is_empty());
        assert_eq!(room.set_camera_on(true).len(), 1);
        assert_eq!(room.set_camera_position(CameraPosition::Back).len(), 1);
        assert!(room.set_camera_position(CameraPosition::Back).is_empty());
        assert!(!room.local_participant().should_mirror_video());
    }

    #[test]
    fn failed_capture_announces_nothing() {
        let mic = Arc::new(LoopbackMicFactory::new());
        let camera = Arc::new(LoopbackCameraFactory::new());
        mic.set_available(false);
        camera.set_available(false);
        let local = LocalParticipant::new("me", mic, camera);
        let mut room = Room::new(
            local,
            Arc::new(StaticTokenProvider::new("tok")),
            Arc::new(DefaultConnectOptionsFactory::default()),
            Arc::new(LoopbackSdk::new()),
        );
        let seen = Arc::new(Mutex::new(0));
        let counter = seen.clone();
        room.add_listener(Arc::new(move |_: RoomEvent| *counter.lock().unwrap() += 1));

        assert!(room.set_mic_on(true).is_empty());
        assert!(room.set_camera_on(true).is_empty());
        assert!(!room.local_participant().is_mic_on());
        assert!(!room.local_participant().is_camera_on());
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn participant_lookup_covers_local_and_remote() {
        let (room, _sdk) = make_room(StaticTokenProvider::new("tok"));
        assert!(matches!(room.participant("me"), Some(Participant::Local(_))));
        assert!(room.participant("bob").is_none());
    }
}
