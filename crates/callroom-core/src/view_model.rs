use std::sync::Arc;

use serde::Serialize;

use crate::capture::{CameraEvent, CameraPosition};
use crate::errors::CallError;
use crate::events::{
    ConnectionState, MainParticipantChange, NetworkQualityLevel, ParticipantListChange, RoomEvent,
};
use crate::main_participant::MainParticipantStore;
use crate::participant::Participant;
use crate::participant_list::ParticipantList;
use crate::room::Room;
use crate::settings::Settings;
use crate::tracks::VideoTrack;
use crate::vendor::VendorEvent;

/// Callbacks for the screen showing a room. All methods default to no-ops.
pub trait RoomViewModelDelegate: Send + Sync {
    fn did_start_connecting(&self) {}
    fn did_connect(&self) {}
    fn did_fail_to_connect(&self, _error: &CallError) {}
    fn did_disconnect(&self, _error: Option<&CallError>) {}
    fn did_add_participants(&self, _indices: &[usize]) {}
    fn did_remove_participants(&self, _indices: &[usize]) {}
    fn did_move_participant(&self, _from: usize, _to: usize) {}
    fn did_update_participant_attributes(&self, _index: usize) {}
    fn did_update_main_participant(&self) {}
    fn did_update_main_participant_attributes(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererState {
    /// No track: no renderer attached.
    Detached,
    /// Track present but disabled: renderer attached and hidden.
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoConfig {
    pub track: Option<VideoTrack>,
    pub should_mirror: bool,
}

impl VideoConfig {
    pub fn renderer_state(&self) -> RendererState {
        match &self.track {
            None => RendererState::Detached,
            Some(track) if !track.is_enabled => RendererState::Hidden,
            Some(_) => RendererState::Visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub identity: String,
    pub is_mic_on: bool,
    pub network_quality_level: NetworkQualityLevel,
    pub is_pinned: bool,
    pub is_dominant_speaker: bool,
    pub video: VideoConfig,
}

impl ParticipantRow {
    fn new(participant: Participant<'_>, is_pinned: bool) -> Self {
        Self {
            identity: participant.identity().to_string(),
            is_mic_on: participant.is_mic_on(),
            network_quality_level: participant.network_quality_level(),
            is_pinned,
            is_dominant_speaker: participant.is_dominant_speaker(),
            video: VideoConfig {
                track: participant.camera_video_track(),
                should_mirror: participant.should_mirror_video(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainParticipantRow {
    pub identity: String,
    pub video: VideoConfig,
}

impl MainParticipantRow {
    fn new(participant: Participant<'_>) -> Self {
        // A shared screen is never mirrored.
        let (track, should_mirror) = match participant.screen_video_track() {
            Some(screen) => (Some(screen), false),
            None => (
                participant.camera_video_track(),
                participant.should_mirror_video(),
            ),
        };
        Self {
            identity: participant.identity().to_string(),
            video: VideoConfig {
                track,
                should_mirror,
            },
        }
    }
}

/// Immutable snapshot of everything the room screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomViewModelData {
    pub room_name: String,
    pub connection_state: ConnectionState,
    pub connection_label: String,
    pub participants: Vec<ParticipantRow>,
    pub main_participant: MainParticipantRow,
}

/// Glue between the room, the participant list and the main-participant
/// store. Entry points forward to the owning component; the resulting
/// events are replayed to the delegate in order.
pub struct RoomViewModel {
    room_name: String,
    room: Room,
    list: ParticipantList,
    main: MainParticipantStore,
    delegate: Option<Arc<dyn RoomViewModelDelegate>>,
    /// Last dominant speaker announced by the room, so its row can be
    /// refreshed when the flag moves.
    dominant_speaker: Option<String>,
}

impl RoomViewModel {
    /// Applies the join preferences from `settings` to the local
    /// participant. Later connects keep whatever the user set since.
    pub fn new(room_name: &str, mut room: Room, settings: &Settings) -> Self {
        room.set_camera_position(settings.camera_position);
        room.set_mic_on(settings.mic_enabled_on_join);
        room.set_camera_on(settings.camera_enabled_on_join);

        let mut list = ParticipantList::new();
        list.insert([Participant::Local(room.local_participant())]);
        list.insert(room.remote_participants().iter().map(Participant::Remote));
        let main = MainParticipantStore::new(&room, &list);

        Self {
            room_name: room_name.to_string(),
            room,
            list,
            main,
            delegate: None,
            dominant_speaker: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RoomViewModelDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn participant_list(&self) -> &ParticipantList {
        &self.list
    }

    pub fn main_participant_store(&self) -> &MainParticipantStore {
        &self.main
    }

    pub fn is_mic_on(&self) -> bool {
        self.room.local_participant().is_mic_on()
    }

    pub fn is_camera_on(&self) -> bool {
        self.room.local_participant().is_camera_on()
    }

    pub fn camera_position(&self) -> CameraPosition {
        self.room.local_participant().camera_position()
    }

    pub fn data(&self) -> RoomViewModelData {
        let participants = self
            .list
            .entries()
            .iter()
            .filter_map(|entry| {
                self.room
                    .participant(&entry.identity)
                    .map(|p| ParticipantRow::new(p, entry.is_pinned))
            })
            .collect();
        let main = self
            .main
            .main_participant(&self.room)
            .unwrap_or(Participant::Local(self.room.local_participant()));
        let state = self.room.state();

        RoomViewModelData {
            room_name: self.room_name.clone(),
            connection_state: state,
            connection_label: state.label().to_string(),
            participants,
            main_participant: MainParticipantRow::new(main),
        }
    }

    /// Joins the room with the local participant's current tracks.
    ///
    /// # Panics
    ///
    /// Panics if the room is not disconnected.
    pub async fn connect(&mut self) {
        let events = self.room.connect(&self.room_name).await;
        self.apply_room_events(events);
    }

    pub fn disconnect(&mut self) {
        let events = self.room.disconnect();
        self.apply_room_events(events);
    }

    pub fn toggle_pin(&mut self, index: usize) {
        let changes = self.list.toggle_pin(index);
        self.forward_list_changes(&changes);
        let change = self.main.update(&self.room, &self.list);
        self.forward_main_change(change);
    }

    pub fn set_mic_on(&mut self, on: bool) {
        let events = self.room.set_mic_on(on);
        self.apply_room_events(events);
    }

    pub fn set_camera_on(&mut self, on: bool) {
        let events = self.room.set_camera_on(on);
        self.apply_room_events(events);
    }

    pub fn flip_camera(&mut self) {
        let position = self.camera_position().flipped();
        let events = self.room.set_camera_position(position);
        self.apply_room_events(events);
    }

    pub fn handle_camera_event(&mut self, event: CameraEvent) {
        self.room.local_participant_mut().handle_camera_event(event);
    }

    pub fn handle_vendor_event(&mut self, event: VendorEvent) {
        let events = self.room.handle_vendor_event(event);
        self.apply_room_events(events);
    }

    /// Waits for and applies the next SDK callback. Returns `false` once
    /// there is nothing left to wait for.
    pub async fn next_vendor_event(&mut self) -> bool {
        match self.room.next_vendor_event().await {
            Some(event) => {
                self.handle_vendor_event(event);
                true
            }
            None => false,
        }
    }

    fn apply_room_events(&mut self, events: Vec<RoomEvent>) {
        for event in events {
            self.apply_room_event(event);
        }
    }

    fn apply_room_event(&mut self, event: RoomEvent) {
        let delegate = self.delegate.clone();
        match event {
            RoomEvent::DidStartConnecting => {
                if let Some(d) = &delegate {
                    d.did_start_connecting();
                }
            }
            RoomEvent::DidConnect => {
                if let Some(d) = &delegate {
                    d.did_connect();
                }
            }
            RoomEvent::DidFailToConnect(error) => {
                if let Some(d) = &delegate {
                    d.did_fail_to_connect(&error);
                }
            }
            RoomEvent::DidDisconnect { error } => {
                self.dominant_speaker = None;
                if let Some(d) = &delegate {
                    d.did_disconnect(error.as_ref());
                }
            }
            RoomEvent::DidAddRemoteParticipants(participants) => {
                let changes = self
                    .list
                    .insert(participants.iter().map(Participant::Remote));
                self.forward_list_changes(&changes);
                let change = self.main.update(&self.room, &self.list);
                self.forward_main_change(change);
            }
            RoomEvent::DidRemoveRemoteParticipants(participants) => {
                let changes = self.list.delete(participants.iter().map(|p| p.identity()));
                self.forward_list_changes(&changes);
                let change = self.main.update(&self.room, &self.list);
                self.forward_main_change(change);
            }
            RoomEvent::DominantSpeakerDidChange(identity) => {
                let previous = std::mem::replace(&mut self.dominant_speaker, identity.clone());
                for id in previous.iter().chain(identity.iter()) {
                    if let Some(participant) = self.room.participant(id) {
                        let changes = self.list.update(participant);
                        self.forward_list_changes(&changes);
                    }
                }
                let change = self.main.update(&self.room, &self.list);
                self.forward_main_change(change);
            }
            RoomEvent::ParticipantDidUpdate { identity } => {
                if let Some(participant) = self.room.participant(&identity) {
                    let changes = self.list.update(participant);
                    self.forward_list_changes(&changes);
                }
                let change = self
                    .main
                    .participant_did_update(&identity, &self.room, &self.list);
                self.forward_main_change(change);
            }
        }
    }

    fn forward_list_changes(&self, changes: &[ParticipantListChange]) {
        let Some(delegate) = &self.delegate else {
            return;
        };
        for change in changes {
            match change {
                ParticipantListChange::Inserted(indices) => delegate.did_add_participants(indices),
                ParticipantListChange::Deleted(indices) => {
                    delegate.did_remove_participants(indices)
                }
                ParticipantListChange::Moved { from, to } => {
                    delegate.did_move_participant(*from, *to)
                }
                ParticipantListChange::Updated(index) => {
                    delegate.did_update_participant_attributes(*index)
                }
            }
        }
    }

    fn forward_main_change(&self, change: Option<MainParticipantChange>) {
        let (Some(delegate), Some(change)) = (&self.delegate, change) else {
            return;
        };
        match change {
            MainParticipantChange::DidUpdateMainParticipant { .. } => {
                delegate.did_update_main_participant()
            }
            MainParticipantChange::DidUpdateAttributes { .. } => {
                delegate.did_update_main_participant_attributes()
            }
        }
    }
}
