use std::sync::Arc;

use crate::events::{EventEmitter, EventListener, ParticipantListChange};
use crate::participant::Participant;

/// One row of the participant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub identity: String,
    pub is_remote: bool,
    pub is_pinned: bool,
    /// Whether the participant was sharing its screen at the last insert or
    /// update.
    pub is_sharing_screen: bool,
}

/// Ordered participant list backing the thumbnail strip.
///
/// Ordering: the local participant at index 0, a screen-sharing remote
/// participant right after it, everyone else in arrival order. Entries are
/// keyed by identity. Operations on indices or identities that are no
/// longer present are silent no-ops, since SDK callbacks can race with
/// local edits.
pub struct ParticipantList {
    entries: Vec<ListEntry>,
    emitter: EventEmitter<ParticipantListChange>,
}

impl ParticipantList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            emitter: EventEmitter::new(),
        }
    }

    /// Register a listener for list changes.
    pub fn add_listener(&self, listener: Arc<dyn EventListener<ParticipantListChange>>) {
        self.emitter.add_listener(listener);
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identity.as_str())
    }

    pub fn index_of(&self, identity: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.identity == identity)
    }

    pub fn pinned(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_pinned)
            .map(|e| e.identity.as_str())
    }

    pub fn is_pinned(&self, identity: &str) -> bool {
        self.pinned() == Some(identity)
    }

    pub fn first_remote(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_remote)
            .map(|e| e.identity.as_str())
    }

    /// Where a screen-sharing participant belongs: the first remote slot.
    fn screen_index(&self) -> usize {
        self.entries
            .iter()
            .position(|e| e.is_remote)
            .unwrap_or(self.entries.len())
    }

    /// Inserts participants one at a time, each at the slot the ordering
    /// rules give it at that moment. Reports their final indices.
    pub fn insert<'a>(
        &mut self,
        participants: impl IntoIterator<Item = Participant<'a>>,
    ) -> Vec<ParticipantListChange> {
        let mut inserted = Vec::new();

        for participant in participants {
            let identity = participant.identity();
            if self.index_of(identity).is_some() {
                tracing::warn!("participant {identity} already listed");
                continue;
            }

            let is_sharing_screen = participant.screen_video_track().is_some();
            let index = if !participant.is_remote() {
                0
            } else if is_sharing_screen {
                self.screen_index()
            } else {
                self.entries.len()
            };

            self.entries.insert(
                index,
                ListEntry {
                    identity: identity.to_string(),
                    is_remote: participant.is_remote(),
                    is_pinned: false,
                    is_sharing_screen,
                },
            );
            inserted.push(identity);
        }

        if inserted.is_empty() {
            return Vec::new();
        }

        let mut indices: Vec<usize> = inserted
            .iter()
            .filter_map(|identity| self.index_of(identity))
            .collect();
        indices.sort_unstable();
        tracing::debug!("inserted participants at {indices:?}");

        let mut changes = Vec::new();
        self.post(&mut changes, ParticipantListChange::Inserted(indices));
        changes
    }

    /// Removes participants by identity. Reported indices refer to the list
    /// before removal.
    pub fn delete<'a>(
        &mut self,
        identities: impl IntoIterator<Item = &'a str>,
    ) -> Vec<ParticipantListChange> {
        let identities: Vec<&str> = identities.into_iter().collect();

        let mut indices: Vec<usize> = identities
            .iter()
            .filter_map(|identity| self.index_of(identity))
            .collect();
        if indices.is_empty() {
            return Vec::new();
        }
        indices.sort_unstable();
        indices.dedup();

        self.entries
            .retain(|e| !identities.contains(&e.identity.as_str()));
        tracing::debug!("deleted participants at {indices:?}");

        let mut changes = Vec::new();
        self.post(&mut changes, ParticipantListChange::Deleted(indices));
        changes
    }

    /// Reports an attribute change for `participant`'s row. A remote
    /// participant that has just started sharing its screen is moved to the
    /// screen slot; one that was already sharing stays where it is.
    pub fn update(&mut self, participant: Participant<'_>) -> Vec<ParticipantListChange> {
        let mut changes = Vec::new();
        let Some(index) = self.index_of(participant.identity()) else {
            return changes;
        };

        self.post(&mut changes, ParticipantListChange::Updated(index));

        let is_sharing_screen =
            participant.is_remote() && participant.screen_video_track().is_some();
        let started_sharing = is_sharing_screen && !self.entries[index].is_sharing_screen;
        self.entries[index].is_sharing_screen = is_sharing_screen;

        if started_sharing && index != self.screen_index() {
            let entry = self.entries.remove(index);
            let new_index = self.screen_index();
            self.entries.insert(new_index, entry);
            tracing::debug!(
                "moved screen sharer {} from {index} to {new_index}",
                participant.identity()
            );
            self.post(
                &mut changes,
                ParticipantListChange::Moved {
                    from: index,
                    to: new_index,
                },
            );
        }

        changes
    }

    /// Pins or unpins the participant at `index`, unpinning any other
    /// participant first.
    pub fn toggle_pin(&mut self, index: usize) -> Vec<ParticipantListChange> {
        let mut changes = Vec::new();
        if index >= self.entries.len() {
            return changes;
        }

        if let Some(old_index) = self.entries.iter().position(|e| e.is_pinned) {
            if old_index != index {
                self.entries[old_index].is_pinned = false;
                self.post(&mut changes, ParticipantListChange::Updated(old_index));
            }
        }

        let entry = &mut self.entries[index];
        entry.is_pinned = !entry.is_pinned;
        tracing::debug!("participant {} pinned: {}", entry.identity, entry.is_pinned);
        self.post(&mut changes, ParticipantListChange::Updated(index));
        changes
    }

    fn post(&self, changes: &mut Vec<ParticipantListChange>, change: ParticipantListChange) {
        self.emitter.emit(change.clone());
        changes.push(change);
    }
}

impl Default for ParticipantList {
    fn default() -> Self {
        Self::new()
    }
}
