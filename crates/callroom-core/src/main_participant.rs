use std::sync::Arc;

use crate::events::{EventEmitter, EventListener, MainParticipantChange};
use crate::participant::Participant;
use crate::participant_list::ParticipantList;
use crate::room::Room;

/// Picks the participant for the large view, first match wins:
/// pinned, screen sharer, dominant speaker, first remote in list order,
/// local.
///
/// With several screen sharers the first one in roster order is chosen.
pub fn select_main_participant<'r>(room: &'r Room, list: &ParticipantList) -> Participant<'r> {
    list.pinned()
        .and_then(|identity| room.participant(identity))
        .or_else(|| {
            room.remote_participants()
                .iter()
                .find(|p| p.screen_video_track().is_some())
                .map(Participant::Remote)
        })
        .or_else(|| room.dominant_speaker().map(Participant::Remote))
        .or_else(|| list.first_remote().and_then(|identity| room.participant(identity)))
        .unwrap_or(Participant::Local(room.local_participant()))
}

/// Tracks the main participant by identity and reports when it changes.
pub struct MainParticipantStore {
    main_identity: String,
    emitter: EventEmitter<MainParticipantChange>,
}

impl MainParticipantStore {
    pub fn new(room: &Room, list: &ParticipantList) -> Self {
        Self {
            main_identity: select_main_participant(room, list).identity().to_string(),
            emitter: EventEmitter::new(),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn EventListener<MainParticipantChange>>) {
        self.emitter.add_listener(listener);
    }

    pub fn main_identity(&self) -> &str {
        &self.main_identity
    }

    /// Resolves the current main participant in `room`.
    pub fn main_participant<'r>(&self, room: &'r Room) -> Option<Participant<'r>> {
        room.participant(&self.main_identity)
    }

    /// Re-runs selection after a roster, pin or dominant-speaker change.
    pub fn update(&mut self, room: &Room, list: &ParticipantList) -> Option<MainParticipantChange> {
        let selected = select_main_participant(room, list);
        if selected.identity() == self.main_identity {
            return None;
        }

        self.main_identity = selected.identity().to_string();
        tracing::debug!("main participant: {}", self.main_identity);
        let change = MainParticipantChange::DidUpdateMainParticipant {
            identity: self.main_identity.clone(),
        };
        self.emitter.emit(change.clone());
        Some(change)
    }

    /// Handles an attribute change of one participant. A change that moves
    /// the main slot (say, a new screen share) reports a new main
    /// participant; a change to the current main participant reports
    /// attributes only; anything else reports nothing.
    pub fn participant_did_update(
        &mut self,
        identity: &str,
        room: &Room,
        list: &ParticipantList,
    ) -> Option<MainParticipantChange> {
        if let Some(change) = self.update(room, list) {
            return Some(change);
        }
        if identity != self.main_identity {
            return None;
        }

        let change = MainParticipantChange::DidUpdateAttributes {
            identity: identity.to_string(),
        };
        self.emitter.emit(change.clone());
        Some(change)
    }
}
