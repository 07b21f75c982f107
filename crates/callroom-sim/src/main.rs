use std::sync::Arc;

use callroom_core::events::TrackKind;
use callroom_core::loopback::{
    LoopbackCameraFactory, LoopbackMicFactory, LoopbackSdk, StaticTokenProvider,
};
use callroom_core::tracks::TrackChange;
use callroom_core::vendor::VendorRemoteParticipant;
use callroom_core::{
    CallError, DefaultConnectOptionsFactory, HttpTokenProvider, LocalParticipant,
    NetworkQualityLevel, Room, RoomViewModel, RoomViewModelDelegate, Settings, TokenProvider,
    VendorEvent,
};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callroom_core=debug,callroom_sim=info".into()),
        )
        .with_ansi(false)
        .init();
}

// ---------------------------------------------------------------------------
// Delegate: logs every callback the screen would receive
// ---------------------------------------------------------------------------

struct LoggingDelegate;

impl RoomViewModelDelegate for LoggingDelegate {
    fn did_start_connecting(&self) {
        tracing::info!("screen: connecting");
    }

    fn did_connect(&self) {
        tracing::info!("screen: connected");
    }

    fn did_fail_to_connect(&self, error: &CallError) {
        tracing::warn!("screen: failed to connect: {error}");
    }

    fn did_disconnect(&self, error: Option<&CallError>) {
        match error {
            Some(e) => tracing::warn!("screen: disconnected: {e}"),
            None => tracing::info!("screen: disconnected"),
        }
    }

    fn did_add_participants(&self, indices: &[usize]) {
        tracing::info!("screen: insert rows {indices:?}");
    }

    fn did_remove_participants(&self, indices: &[usize]) {
        tracing::info!("screen: delete rows {indices:?}");
    }

    fn did_move_participant(&self, from: usize, to: usize) {
        tracing::info!("screen: move row {from} -> {to}");
    }

    fn did_update_participant_attributes(&self, index: usize) {
        tracing::info!("screen: reload row {index}");
    }

    fn did_update_main_participant(&self) {
        tracing::info!("screen: refocus main view");
    }

    fn did_update_main_participant_attributes(&self) {
        tracing::info!("screen: refresh main view");
    }
}

// ---------------------------------------------------------------------------
// Scripted call
// ---------------------------------------------------------------------------

fn screen_track(identity: &str, change: TrackChange) -> VendorEvent {
    VendorEvent::RemoteTrack {
        identity: identity.to_string(),
        kind: TrackKind::Video,
        sid: format!("MT-screen-{identity}"),
        change,
    }
}

fn script() -> Vec<VendorEvent> {
    vec![
        VendorEvent::Connected {
            remote_participants: vec![
                VendorRemoteParticipant::new("bob"),
                VendorRemoteParticipant::new("alice"),
            ],
        },
        VendorEvent::LocalNetworkQualityChanged(NetworkQualityLevel::Four),
        VendorEvent::DominantSpeakerChanged(Some("alice".to_string())),
        VendorEvent::ParticipantConnected(VendorRemoteParticipant::new("carol")),
        screen_track(
            "carol",
            TrackChange::Published {
                name: "screen".to_string(),
                is_enabled: true,
            },
        ),
        screen_track("carol", TrackChange::Subscribed),
        VendorEvent::RemoteNetworkQualityChanged {
            identity: "bob".to_string(),
            level: NetworkQualityLevel::Two,
        },
        screen_track("carol", TrackChange::Unpublished),
        VendorEvent::ParticipantDisconnected {
            identity: "carol".to_string(),
        },
    ]
}

fn log_snapshot(vm: &RoomViewModel) {
    match serde_json::to_string_pretty(&vm.data()) {
        Ok(json) => tracing::info!("snapshot:\n{json}"),
        Err(e) => tracing::warn!("failed to serialize snapshot: {e}"),
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let settings = Settings::load(&data_dir);
    let identity = settings
        .display_name
        .clone()
        .unwrap_or_else(|| "me".to_string());

    let token_provider: Arc<dyn TokenProvider> =
        match HttpTokenProvider::from_settings(&settings, &identity) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::info!("{e}, using a static token");
                Arc::new(StaticTokenProvider::new("loopback-token"))
            }
        };

    let sdk = Arc::new(LoopbackSdk::new());
    let local = LocalParticipant::new(
        &identity,
        Arc::new(LoopbackMicFactory::new()),
        Arc::new(LoopbackCameraFactory::new()),
    );
    let room = Room::new(
        local,
        token_provider,
        Arc::new(DefaultConnectOptionsFactory::new(&settings)),
        sdk.clone(),
    );

    let mut vm = RoomViewModel::new("daily-standup", room, &settings);
    vm.set_delegate(Arc::new(LoggingDelegate));

    vm.connect().await;
    let Some(session) = sdk.last_session() else {
        tracing::warn!("no session was opened");
        return;
    };

    for event in script() {
        if !session.send(event) {
            break;
        }
        if !vm.next_vendor_event().await {
            break;
        }
    }
    log_snapshot(&vm);

    vm.toggle_pin(1);
    vm.set_camera_on(true);
    vm.flip_camera();
    log_snapshot(&vm);

    vm.disconnect();
    tracing::info!(
        "publish calls seen by the session: {:?}",
        session.local().calls()
    );
    log_snapshot(&vm);
}
