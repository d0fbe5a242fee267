// SPDX-License-Identifier: MPL-2.0
use super::*;
use crate::application::port::{MediaEvent, StreamErrorData, StreamErrorKind, StreamEvent};
use crate::domain::timemark::AnnotationKey;
use crate::testing::{
    FakeFullscreenHost, FakeMediaElement, FakeStreamClientFactory, FullscreenHandle,
    InMemoryTimemarkBackend, MediaElementHandle,
};

const URL: &str = "https://cdn.example.com/c1/3/intro.m3u8";

struct Rig {
    player: Player,
    media: MediaElementHandle,
    clients: FakeStreamClientFactory,
    fullscreen: FullscreenHandle,
}

fn rig_with(clients: FakeStreamClientFactory) -> Rig {
    let (media, media_handle) = FakeMediaElement::new();
    let (fullscreen, fullscreen_handle) = FakeFullscreenHost::new();
    let player = Player::new(
        Config::default(),
        PlayerPorts {
            media: Box::new(media),
            stream_clients: Box::new(clients.clone()),
            fullscreen: Box::new(fullscreen),
            timemarks: Arc::new(InMemoryTimemarkBackend::new()),
        },
    );
    Rig {
        player,
        media: media_handle,
        clients,
        fullscreen: fullscreen_handle,
    }
}

fn rig() -> Rig {
    rig_with(FakeStreamClientFactory::new())
}

fn network_error() -> StreamEvent {
    StreamEvent::Error(StreamErrorData::new(
        StreamErrorKind::Network,
        true,
        "fragLoadError",
    ))
}

#[test]
fn open_loads_manifest_and_registers_listeners() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");

    let client = rig.clients.latest().expect("client created");
    assert_eq!(client.loaded_urls(), vec![URL.to_string()]);
    assert_eq!(client.listener_count(), 1);
    assert_eq!(rig.media.listener_count(), 1);
    assert_eq!(rig.player.controller_state(), Some(ControllerState::Loading));
    assert_eq!(rig.clients.latest_config(), Some(rig.player.config().stream.clone()));
}

#[test]
fn manifest_selects_highest_bitrate_level() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    let client = rig.clients.latest().expect("client");

    client.parse_manifest(&[(360, 800_000), (1080, 5_000_000), (720, 2_500_000)]);
    assert!(rig.player.pump().is_empty());

    assert_eq!(rig.player.quality_levels().len(), 3);
    assert_eq!(rig.player.snapshot().active_quality_id, QualityId::Level(1));
    assert_eq!(client.level_requests(), vec![QualityId::Level(1)]);
    assert_eq!(rig.player.controller_state(), Some(ControllerState::Ready));
}

#[test]
fn opening_a_new_source_releases_the_previous_one() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open first");
    let first = rig.clients.latest().expect("first client");
    let first_session = rig.player.session_id();

    rig.player
        .open(MediaSource::new("https://cdn.example.com/c1/4/next.m3u8"))
        .expect("open second");

    assert!(first.is_destroyed());
    assert_eq!(first.listener_count(), 0);
    assert_eq!(rig.media.listener_count(), 1);
    assert_ne!(rig.player.session_id(), first_session);
    assert_eq!(rig.clients.handles().len(), 2);
}

#[test]
fn queued_messages_of_a_torn_down_session_are_dropped() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open first");
    let first = rig.clients.latest().expect("first client");
    first.parse_manifest(&[(720, 2_500_000)]);

    rig.player
        .open(MediaSource::new("https://cdn.example.com/c1/4/next.m3u8"))
        .expect("open second");
    rig.player.pump();

    assert!(rig.player.quality_levels().is_empty());
    assert_eq!(rig.player.snapshot().active_quality_id, QualityId::Auto);
    assert_eq!(rig.player.stale_dropped(), 1);
}

#[test]
fn play_and_pause_follow_element_events() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");

    rig.player.play().expect("play");
    rig.player.pump();
    assert!(rig.player.snapshot().is_playing);
    assert_eq!(rig.player.controller_state(), Some(ControllerState::Loading));
    assert!(rig.player.controls().is_countdown_armed());

    rig.player.pause().expect("pause");
    rig.player.pump();
    assert!(!rig.player.snapshot().is_playing);
    assert!(rig.player.controls().is_visible());
    assert!(!rig.player.controls().is_countdown_armed());
}

#[test]
fn controller_mirrors_play_state_once_ready() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    rig.clients
        .latest()
        .expect("client")
        .parse_manifest(&[(720, 2_500_000)]);
    rig.player.pump();

    rig.player.play().expect("play");
    rig.player.pump();
    assert_eq!(rig.player.controller_state(), Some(ControllerState::Playing));

    rig.player.pause().expect("pause");
    rig.player.pump();
    assert_eq!(rig.player.controller_state(), Some(ControllerState::Paused));
}

#[test]
fn fatal_error_is_reported_once_and_ends_the_session() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    let client = rig.clients.latest().expect("client");

    for _ in 0..3 {
        client.emit(network_error());
    }
    assert!(rig.player.pump().is_empty());
    assert_eq!(client.restart_count(), 3);

    client.emit(network_error());
    let events = rig.player.pump();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PlayerEvent::Fatal(PlaybackError::Network(_))));

    assert!(client.is_destroyed());
    assert!(rig.player.session_id().is_none());
    assert!(matches!(
        rig.player.fatal_error(),
        Some(PlaybackError::Network(_))
    ));
    assert!(rig.player.notifications().contains_key("error-playback-network"));

    client.emit(network_error());
    assert!(rig.player.pump().is_empty());
    assert!(matches!(rig.player.play(), Err(Error::NoActiveSession)));
}

#[test]
fn unsupported_environment_fails_open_without_event() {
    let mut rig = rig_with(FakeStreamClientFactory::unsupported());

    let result = rig.player.open(MediaSource::new(URL));

    assert!(matches!(
        result,
        Err(Error::Playback(PlaybackError::SourceUnsupported))
    ));
    assert!(rig.player.session_id().is_none());
    assert_eq!(
        rig.player.fatal_error(),
        Some(&PlaybackError::SourceUnsupported)
    );
    assert!(rig.player.notifications().contains_key("error-playback-unsupported"));
    assert!(rig.player.pump().is_empty());
    assert_eq!(rig.media.listener_count(), 0);
    let client = rig.clients.latest().expect("client");
    assert!(client.loaded_urls().is_empty());
}

#[test]
fn reopening_after_fatal_clears_the_error() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    rig.clients
        .latest()
        .expect("client")
        .emit(StreamEvent::Error(StreamErrorData::new(
            StreamErrorKind::Other,
            true,
            "internalException",
        )));
    rig.player.pump();
    assert!(rig.player.fatal_error().is_some());

    rig.player.open(MediaSource::new(URL)).expect("reopen");
    assert!(rig.player.fatal_error().is_none());
    assert!(!rig.player.notifications().contains_key("error-playback-general"));
}

#[test]
fn commands_without_session_are_rejected() {
    let mut rig = rig();
    assert!(matches!(rig.player.play(), Err(Error::NoActiveSession)));
    assert!(matches!(rig.player.seek(4.0), Err(Error::NoActiveSession)));
    assert!(matches!(rig.player.skip_forward(), Err(Error::NoActiveSession)));
    assert!(matches!(rig.player.set_volume(0.5), Err(Error::NoActiveSession)));
    assert!(matches!(
        rig.player.set_quality(QualityId::Auto),
        Err(Error::NoActiveSession)
    ));
    assert_eq!(rig.media.play_calls(), 0);
}

#[test]
fn start_offset_applies_after_metadata() {
    let mut rig = rig();
    rig.player
        .open(MediaSource::new(URL).starting_at(95.0))
        .expect("open");
    rig.player.pump();
    assert!(rig.media.seeks().is_empty());

    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.player.pump();

    assert_eq!(rig.media.seeks(), vec![95.0]);
    assert_eq!(rig.player.snapshot().current_time, 95.0);
}

#[test]
fn nothing_moves_the_playhead_before_metadata() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");

    rig.media.emit(MediaEvent::TimeUpdate { current_time: 42.0 });
    rig.player.pump();
    let snapshot = rig.player.snapshot();
    assert_eq!(snapshot.current_time, 0.0);
    assert_eq!(snapshot.duration, 0.0);

    rig.player.seek(1e9).expect("seek");
    rig.player.pump();
    assert!(rig.media.seeks().is_empty());

    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.player.pump();
    assert_eq!(rig.media.seeks(), vec![600.0]);
    assert_eq!(rig.player.snapshot().current_time, 600.0);
}

#[test]
fn seek_before_metadata_overrides_start_offset() {
    let mut rig = rig();
    rig.player
        .open(MediaSource::new(URL).starting_at(95.0))
        .expect("open");

    rig.player.seek(12.0).expect("seek");
    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.player.pump();

    assert_eq!(rig.media.seeks(), vec![12.0]);
}

#[test]
fn fatal_error_pauses_and_resets_the_snapshot() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    let client = rig.clients.latest().expect("client");
    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.player.play().expect("play");
    rig.player.pump();
    assert!(rig.player.snapshot().is_playing);

    client.emit(StreamEvent::Error(StreamErrorData::new(
        StreamErrorKind::Other,
        true,
        "internalException",
    )));
    let events = rig.player.pump();

    assert_eq!(events.len(), 1);
    assert!(rig.player.session_id().is_none());
    assert!(!rig.player.snapshot().is_playing);
    assert_eq!(rig.media.pause_calls(), 1);
    assert!(!rig.media.is_playing());
}

#[test]
fn timemark_selection_seeks_without_touching_play_state() {
    let mut rig = rig();
    let key = AnnotationKey::new("c1", "intro.m3u8");
    rig.player
        .open(MediaSource::new(URL).with_annotations(key))
        .expect("open");
    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.media.emit(MediaEvent::TimeUpdate { current_time: 42.0 });
    rig.player.pump();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let id = runtime.block_on(async {
        rig.player.create_timemark_draft().expect("draft");
        rig.player.set_timemark_content("Key definition").expect("content");
        rig.player.save_timemark().await.expect("save").id
    });
    assert!(rig.player.notifications().contains_key("notification-timemark-saved"));

    rig.media.advance(100.0);
    rig.player.pump();
    let target = rig.player.select_timemark(&id).expect("select");
    rig.player.pump();

    assert_eq!(target, 42.0);
    assert_eq!(rig.player.snapshot().current_time, 42.0);
    assert!(!rig.player.snapshot().is_playing);
    assert_eq!(rig.media.play_calls(), 0);
}

#[test]
fn timemark_commands_without_key_are_disabled() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");

    assert!(!rig.player.annotations_enabled());
    assert!(matches!(
        rig.player.create_timemark_draft(),
        Err(Error::Annotation(crate::error::AnnotationError::Disabled))
    ));
}

#[test]
fn fullscreen_works_without_session() {
    let mut rig = rig();
    rig.player.toggle_fullscreen().expect("enter");
    rig.player.fullscreen_changed(true);
    rig.player.toggle_fullscreen().expect("exit");

    assert_eq!(rig.fullscreen.requests(), 1);
    assert_eq!(rig.fullscreen.exits(), 1);
}

#[test]
fn close_tears_down_and_signals_host() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    let client = rig.clients.latest().expect("client");
    rig.media.emit(MediaEvent::LoadedMetadata { duration: 600.0 });
    rig.player.play().expect("play");
    rig.player.pump();
    assert!(rig.player.snapshot().is_playing);

    rig.player.close();

    assert_eq!(rig.player.pump(), vec![PlayerEvent::Close]);
    assert!(client.is_destroyed());
    assert_eq!(rig.media.listener_count(), 0);
    assert!(!rig.player.snapshot().is_playing);
    assert!(!rig.media.is_playing());
}

#[test]
fn drop_releases_everything() {
    let rig = rig();
    let Rig {
        mut player,
        media,
        clients,
        ..
    } = rig;
    player.open(MediaSource::new(URL)).expect("open");
    let client = clients.latest().expect("client");

    drop(player);

    assert!(client.is_destroyed());
    assert_eq!(client.listener_count(), 0);
    assert_eq!(media.listener_count(), 0);
}

#[test]
fn time_labels_format_snapshot() {
    let mut rig = rig();
    rig.player.open(MediaSource::new(URL)).expect("open");
    rig.media.emit(MediaEvent::LoadedMetadata { duration: 3725.0 });
    rig.media.emit(MediaEvent::TimeUpdate { current_time: 65.0 });
    rig.player.pump();

    assert_eq!(
        rig.player.time_labels(),
        ("1:05".to_string(), "1:02:05".to_string())
    );
}

#[test]
fn timemark_delete_needs_confirmation() {
    let mut rig = rig();
    rig.player
        .open(MediaSource::new(URL).with_annotations(AnnotationKey::new("c1", "intro.m3u8")))
        .expect("open");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        rig.player.create_timemark_draft().expect("draft");
        rig.player.set_timemark_content("Boundary case").expect("content");
        let saved = rig.player.save_timemark().await.expect("save");

        let token = rig.player.request_timemark_delete(&saved.id).expect("request");
        assert_eq!(rig.player.pending_timemark_delete(), Some(&saved.id));
        rig.player.cancel_timemark_delete();
        assert!(rig.player.confirm_timemark_delete(token).await.is_err());
        assert_eq!(rig.player.timemarks().len(), 1);

        let token = rig.player.request_timemark_delete(&saved.id).expect("request");
        rig.player.confirm_timemark_delete(token).await.expect("delete");
    });

    assert!(rig.player.timemarks().is_empty());
    assert!(rig.player.notifications().contains_key("notification-timemark-deleted"));
    assert!(rig.player.notifications().contains_key("notification-timemark-invalid"));
}
