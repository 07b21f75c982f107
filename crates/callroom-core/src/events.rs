use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::errors::CallError;
use crate::participant::RemoteParticipant;

/// Connection state of a [`Room`](crate::room::Room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Short label for the room header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
        }
    }
}

/// Network quality reported by the backend. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkQualityLevel {
    #[default]
    Unknown,
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl NetworkQualityLevel {
    /// Maps a raw 0-5 level; anything else is `Unknown`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Zero,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::Four,
            5 => Self::Five,
            _ => Self::Unknown,
        }
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Zero => Some(0),
            Self::One => Some(1),
            Self::Two => Some(2),
            Self::Three => Some(3),
            Self::Four => Some(4),
            Self::Five => Some(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Domain events broadcast by the room.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    DidStartConnecting,
    DidConnect,
    DidFailToConnect(CallError),
    DidDisconnect { error: Option<CallError> },
    DidAddRemoteParticipants(Vec<RemoteParticipant>),
    DidRemoveRemoteParticipants(Vec<RemoteParticipant>),
    DominantSpeakerDidChange(Option<String>), // participant identity
    ParticipantDidUpdate { identity: String },
}

/// Index diffs produced by the participant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantListChange {
    Inserted(Vec<usize>),
    Deleted(Vec<usize>),
    Moved { from: usize, to: usize },
    Updated(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainParticipantChange {
    /// A different participant is now the main participant.
    DidUpdateMainParticipant { identity: String },
    /// The main participant stayed the same but its attributes changed.
    DidUpdateAttributes { identity: String },
}

/// Trait for receiving typed events from a component.
/// Implementations must be Send + Sync.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: E);
}

impl<E, F> EventListener<E> for F
where
    F: Fn(E) + Send + Sync,
{
    fn on_event(&self, event: E) {
        self(event)
    }
}

/// Dispatches events of one type to the listeners registered on the
/// owning component. Listeners live as long as the emitter does.
pub struct EventEmitter<E> {
    listeners: Arc<RwLock<Vec<Arc<dyn EventListener<E>>>>>,
}

impl<E: Clone> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn EventListener<E>>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn emit(&self, event: E) {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }
}

impl<E: Clone> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}
