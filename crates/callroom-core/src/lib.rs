//! Callroom core state layer.
//!
//! Room lifecycle, participant projections, list ordering and the
//! main-participant selection behind a video-call screen. The media SDK,
//! capture devices and token service sit behind traits; `loopback` provides
//! in-process stand-ins for all of them.

pub mod auth;
pub mod capture;
pub mod errors;
pub mod events;
pub mod loopback;
pub mod main_participant;
pub mod participant;
pub mod participant_list;
pub mod room;
pub mod settings;
pub mod tracks;
pub mod vendor;
pub mod view_model;

pub use auth::{HttpTokenProvider, TokenProvider};
pub use capture::{CameraEvent, CameraPosition};
pub use errors::CallError;
pub use events::{
    ConnectionState, EventListener, MainParticipantChange, NetworkQualityLevel,
    ParticipantListChange, RoomEvent,
};
pub use main_participant::{MainParticipantStore, select_main_participant};
pub use participant::{LocalParticipant, Participant, RemoteParticipant};
pub use participant_list::ParticipantList;
pub use room::Room;
pub use settings::Settings;
pub use vendor::{DefaultConnectOptionsFactory, VendorEvent, VideoSdk};
pub use view_model::{RoomViewModel, RoomViewModelData, RoomViewModelDelegate};
