// SPDX-License-Identifier: MPL-2.0
//! In-memory implementations of every port.
//!
//! Used by this crate's tests and available to hosts that want to drive a
//! [`Player`](crate::player::Player) without a real streaming stack. Each
//! fake comes with a cloneable handle for inspecting calls and injecting
//! events from the outside.
//!
//! The media element fake confirms commands synchronously by emitting the
//! event a real element would (`Play`, `Seeked`, `VolumeChange`, ...),
//! unless auto-confirmation is turned off.

use crate::application::port::{
    AdaptiveStreamClient, FullscreenHost, ListenerId, ManifestLevel, MediaElement, MediaEvent,
    MediaEventHandler, StreamClientFactory, StreamEvent, StreamEventHandler, TimemarkBackend,
};
use crate::config::StreamConfig;
use crate::domain::timemark::{
    AnnotationKey, NewTimemark, Timemark, TimemarkId, TimemarkUpdate, UserId,
};
use crate::domain::video::QualityId;
use crate::error::{AnnotationError, AnnotationOperation, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Listener registry shared by the event-emitting fakes.
struct Listeners<E> {
    next_id: u64,
    handlers: Vec<(ListenerId, Box<dyn FnMut(E) + Send>)>,
    delivered: usize,
}

impl<E: Clone> Listeners<E> {
    fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
            delivered: 0,
        }
    }

    fn add(&mut self, handler: Box<dyn FnMut(E) + Send>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.handlers.push((id, handler));
        id
    }

    fn remove(&mut self, id: ListenerId) {
        self.handlers.retain(|(listener, _)| *listener != id);
    }

    fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event.clone());
            self.delivered += 1;
        }
    }
}

// =============================================================================
// Media element
// =============================================================================

struct MediaState {
    listeners: Listeners<MediaEvent>,
    auto_confirm: bool,
    segment_duration: Option<f64>,
    playing: bool,
    current_time: f64,
    volume: f32,
    muted: bool,
    play_calls: usize,
    pause_calls: usize,
    seeks: Vec<f64>,
    rates: Vec<f64>,
}

impl MediaState {
    fn confirm(&mut self, event: MediaEvent) {
        if self.auto_confirm {
            self.listeners.emit(&event);
        }
    }
}

/// Media element double.
pub struct FakeMediaElement {
    state: Arc<Mutex<MediaState>>,
}

/// Inspects and drives a [`FakeMediaElement`].
#[derive(Clone)]
pub struct MediaElementHandle {
    state: Arc<Mutex<MediaState>>,
}

impl FakeMediaElement {
    #[must_use]
    pub fn new() -> (Self, MediaElementHandle) {
        let state = Arc::new(Mutex::new(MediaState {
            listeners: Listeners::new(),
            auto_confirm: true,
            segment_duration: None,
            playing: false,
            current_time: 0.0,
            volume: 1.0,
            muted: false,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
            rates: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            MediaElementHandle { state },
        )
    }
}

impl MediaElement for FakeMediaElement {
    fn play(&mut self) {
        let mut state = lock(&self.state);
        state.play_calls += 1;
        if !state.playing {
            state.playing = true;
            state.confirm(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        let mut state = lock(&self.state);
        state.pause_calls += 1;
        if state.playing {
            state.playing = false;
            state.confirm(MediaEvent::Pause);
        }
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut state = lock(&self.state);
        state.seeks.push(secs);
        // Real elements land on a segment boundary.
        let landed = match state.segment_duration {
            Some(segment) if segment > 0.0 => (secs / segment).floor() * segment,
            _ => secs,
        };
        state.current_time = landed;
        state.confirm(MediaEvent::Seeked {
            current_time: landed,
        });
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = lock(&self.state);
        state.volume = volume;
        let muted = state.muted;
        state.confirm(MediaEvent::VolumeChange { volume, muted });
    }

    fn set_muted(&mut self, muted: bool) {
        let mut state = lock(&self.state);
        state.muted = muted;
        let volume = state.volume;
        state.confirm(MediaEvent::VolumeChange { volume, muted });
    }

    fn set_playback_rate(&mut self, rate: f64) {
        let mut state = lock(&self.state);
        state.rates.push(rate);
        state.confirm(MediaEvent::RateChange { rate });
    }

    fn on(&mut self, handler: MediaEventHandler) -> ListenerId {
        lock(&self.state).listeners.add(handler)
    }

    fn off(&mut self, id: ListenerId) {
        lock(&self.state).listeners.remove(id);
    }
}

impl MediaElementHandle {
    /// Delivers an event to every registered listener.
    pub fn emit(&self, event: MediaEvent) {
        let mut state = lock(&self.state);
        match event {
            MediaEvent::Play => state.playing = true,
            MediaEvent::Pause | MediaEvent::Ended => state.playing = false,
            MediaEvent::TimeUpdate { current_time } | MediaEvent::Seeked { current_time } => {
                state.current_time = current_time;
            }
            _ => {}
        }
        state.listeners.emit(&event);
    }

    /// Moves the playhead forward by `secs` and reports it.
    pub fn advance(&self, secs: f64) {
        let current_time = lock(&self.state).current_time + secs;
        self.emit(MediaEvent::TimeUpdate { current_time });
    }

    /// Turns synchronous confirmation of commands on or off.
    pub fn set_auto_confirm(&self, enabled: bool) {
        lock(&self.state).auto_confirm = enabled;
    }

    /// Makes seeks land on the start of the enclosing segment.
    pub fn set_segment_duration(&self, secs: Option<f64>) {
        lock(&self.state).segment_duration = secs;
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.handlers.len()
    }

    /// Number of handler invocations so far.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        lock(&self.state).listeners.delivered
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        lock(&self.state).volume
    }

    #[must_use]
    pub fn muted(&self) -> bool {
        lock(&self.state).muted
    }

    #[must_use]
    pub fn play_calls(&self) -> usize {
        lock(&self.state).play_calls
    }

    #[must_use]
    pub fn pause_calls(&self) -> usize {
        lock(&self.state).pause_calls
    }

    #[must_use]
    pub fn seeks(&self) -> Vec<f64> {
        lock(&self.state).seeks.clone()
    }

    #[must_use]
    pub fn rates(&self) -> Vec<f64> {
        lock(&self.state).rates.clone()
    }
}

// =============================================================================
// Adaptive stream client
// =============================================================================

struct StreamState {
    supported: bool,
    listeners: Listeners<StreamEvent>,
    loaded_urls: Vec<String>,
    level_requests: Vec<QualityId>,
    restart_count: usize,
    recover_count: usize,
    destroy_count: usize,
}

/// Adaptive streaming client double. Never emits on its own; drive it
/// through its [`StreamClientHandle`].
pub struct FakeStreamClient {
    state: Arc<Mutex<StreamState>>,
}

#[derive(Clone)]
pub struct StreamClientHandle {
    state: Arc<Mutex<StreamState>>,
}

impl FakeStreamClient {
    #[must_use]
    pub fn new() -> (Self, StreamClientHandle) {
        Self::with_support(true)
    }

    /// A client whose environment cannot play adaptive streams.
    #[must_use]
    pub fn unsupported() -> (Self, StreamClientHandle) {
        Self::with_support(false)
    }

    fn with_support(supported: bool) -> (Self, StreamClientHandle) {
        let state = Arc::new(Mutex::new(StreamState {
            supported,
            listeners: Listeners::new(),
            loaded_urls: Vec::new(),
            level_requests: Vec::new(),
            restart_count: 0,
            recover_count: 0,
            destroy_count: 0,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            StreamClientHandle { state },
        )
    }
}

impl AdaptiveStreamClient for FakeStreamClient {
    fn is_supported(&self) -> bool {
        lock(&self.state).supported
    }

    fn on(&mut self, handler: StreamEventHandler) -> ListenerId {
        lock(&self.state).listeners.add(handler)
    }

    fn off(&mut self, id: ListenerId) {
        lock(&self.state).listeners.remove(id);
    }

    fn load(&mut self, url: &str) {
        lock(&self.state).loaded_urls.push(url.to_string());
    }

    fn set_level(&mut self, level: QualityId) {
        lock(&self.state).level_requests.push(level);
    }

    fn restart_load(&mut self) {
        lock(&self.state).restart_count += 1;
    }

    fn recover_media_error(&mut self) {
        lock(&self.state).recover_count += 1;
    }

    fn destroy(&mut self) {
        let mut state = lock(&self.state);
        state.destroy_count += 1;
        state.listeners.handlers.clear();
    }
}

impl StreamClientHandle {
    pub fn emit(&self, event: StreamEvent) {
        lock(&self.state).listeners.emit(&event);
    }

    /// Emits `ManifestParsed` for `(height, bitrate)` pairs.
    pub fn parse_manifest(&self, levels: &[(u32, u64)]) {
        self.emit(StreamEvent::ManifestParsed {
            levels: levels
                .iter()
                .map(|&(height, bitrate_bps)| ManifestLevel {
                    height,
                    bitrate_bps,
                })
                .collect(),
        });
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.handlers.len()
    }

    #[must_use]
    pub fn delivered_count(&self) -> usize {
        lock(&self.state).listeners.delivered
    }

    #[must_use]
    pub fn loaded_urls(&self) -> Vec<String> {
        lock(&self.state).loaded_urls.clone()
    }

    #[must_use]
    pub fn level_requests(&self) -> Vec<QualityId> {
        lock(&self.state).level_requests.clone()
    }

    #[must_use]
    pub fn restart_count(&self) -> usize {
        lock(&self.state).restart_count
    }

    #[must_use]
    pub fn recover_count(&self) -> usize {
        lock(&self.state).recover_count
    }

    #[must_use]
    pub fn destroy_count(&self) -> usize {
        lock(&self.state).destroy_count
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroy_count() > 0
    }
}

/// Hands out a new [`FakeStreamClient`] per source and keeps the handles.
#[derive(Clone, Default)]
pub struct FakeStreamClientFactory {
    unsupported: bool,
    created: Arc<Mutex<Vec<(StreamConfig, StreamClientHandle)>>>,
}

impl FakeStreamClientFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every client it creates reports no adaptive streaming support.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Handle of the most recently created client.
    #[must_use]
    pub fn latest(&self) -> Option<StreamClientHandle> {
        lock(&self.created).last().map(|(_, handle)| handle.clone())
    }

    #[must_use]
    pub fn handles(&self) -> Vec<StreamClientHandle> {
        lock(&self.created).iter().map(|(_, h)| h.clone()).collect()
    }

    /// Configuration passed to the most recent `create`.
    #[must_use]
    pub fn latest_config(&self) -> Option<StreamConfig> {
        lock(&self.created).last().map(|(config, _)| config.clone())
    }
}

impl StreamClientFactory for FakeStreamClientFactory {
    fn create(&self, config: &StreamConfig) -> Box<dyn AdaptiveStreamClient> {
        let (client, handle) = FakeStreamClient::with_support(!self.unsupported);
        lock(&self.created).push((config.clone(), handle));
        Box::new(client)
    }
}

// =============================================================================
// Fullscreen host
// =============================================================================

#[derive(Default)]
struct FullscreenState {
    unavailable: bool,
    requests: usize,
    exits: usize,
}

pub struct FakeFullscreenHost {
    state: Arc<Mutex<FullscreenState>>,
}

#[derive(Clone)]
pub struct FullscreenHandle {
    state: Arc<Mutex<FullscreenState>>,
}

impl FakeFullscreenHost {
    #[must_use]
    pub fn new() -> (Self, FullscreenHandle) {
        Self::build(false)
    }

    #[must_use]
    pub fn unavailable() -> (Self, FullscreenHandle) {
        Self::build(true)
    }

    fn build(unavailable: bool) -> (Self, FullscreenHandle) {
        let state = Arc::new(Mutex::new(FullscreenState {
            unavailable,
            ..FullscreenState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            FullscreenHandle { state },
        )
    }
}

impl FullscreenHost for FakeFullscreenHost {
    fn is_fullscreen_available(&self) -> bool {
        !lock(&self.state).unavailable
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        lock(&self.state).requests += 1;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        lock(&self.state).exits += 1;
        Ok(())
    }
}

impl FullscreenHandle {
    #[must_use]
    pub fn requests(&self) -> usize {
        lock(&self.state).requests
    }

    #[must_use]
    pub fn exits(&self) -> usize {
        lock(&self.state).exits
    }
}

// =============================================================================
// Timemark backend
// =============================================================================

#[derive(Default)]
struct BackendState {
    timemarks: Vec<Timemark>,
    next_id: u64,
    fail_next: Option<AnnotationOperation>,
    list_calls: usize,
    create_calls: usize,
    update_calls: usize,
    delete_calls: usize,
}

impl BackendState {
    fn injected_failure(&mut self, operation: AnnotationOperation) -> std::result::Result<(), AnnotationError> {
        if self.fail_next == Some(operation) {
            self.fail_next = None;
            return Err(AnnotationError::backend(operation, "injected failure"));
        }
        Ok(())
    }
}

/// Timemark store that lives as long as the value. Shares state between
/// players when wrapped in an `Arc`, which is how "reloading the video"
/// is simulated.
pub struct InMemoryTimemarkBackend {
    user: String,
    state: Mutex<BackendState>,
}

impl Default for InMemoryTimemarkBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTimemarkBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user: "user-1".to_string(),
            state: Mutex::new(BackendState::default()),
        }
    }

    /// Makes the next call of `operation` fail once.
    pub fn fail_next(&self, operation: AnnotationOperation) {
        lock(&self.state).fail_next = Some(operation);
    }

    #[must_use]
    pub fn stored(&self) -> Vec<Timemark> {
        lock(&self.state).timemarks.clone()
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        lock(&self.state).list_calls
    }

    #[must_use]
    pub fn create_calls(&self) -> usize {
        lock(&self.state).create_calls
    }

    #[must_use]
    pub fn update_calls(&self) -> usize {
        lock(&self.state).update_calls
    }

    #[must_use]
    pub fn delete_calls(&self) -> usize {
        lock(&self.state).delete_calls
    }
}

#[async_trait]
impl TimemarkBackend for InMemoryTimemarkBackend {
    async fn list(&self, key: &AnnotationKey) -> std::result::Result<Vec<Timemark>, AnnotationError> {
        let mut state = lock(&self.state);
        state.list_calls += 1;
        state.injected_failure(AnnotationOperation::List)?;
        // Newest first, like the production API.
        let mut found: Vec<Timemark> = state
            .timemarks
            .iter()
            .filter(|t| &t.key() == key)
            .cloned()
            .collect();
        found.reverse();
        Ok(found)
    }

    async fn create(&self, timemark: &NewTimemark) -> std::result::Result<Timemark, AnnotationError> {
        let mut state = lock(&self.state);
        state.create_calls += 1;
        state.injected_failure(AnnotationOperation::Create)?;
        state.next_id += 1;
        let now = Utc::now();
        let created = Timemark {
            id: TimemarkId::new(format!("tm-{}", state.next_id)),
            course_id: timemark.course_id.clone(),
            video_id: timemark.video_id.clone(),
            user_id: UserId::new(self.user.clone()),
            timestamp: timemark.timestamp,
            content: timemark.content.clone(),
            created_at: now,
            updated_at: now,
            is_saved: true,
            is_edited: false,
        };
        state.timemarks.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        key: &AnnotationKey,
        id: &TimemarkId,
        update: &TimemarkUpdate,
    ) -> std::result::Result<Timemark, AnnotationError> {
        let mut state = lock(&self.state);
        state.update_calls += 1;
        state.injected_failure(AnnotationOperation::Update)?;
        let existing = state
            .timemarks
            .iter_mut()
            .find(|t| &t.id == id && &t.key() == key)
            .ok_or_else(|| AnnotationError::NotFound(id.clone()))?;
        existing.timestamp = update.timestamp;
        existing.content = update.content.clone();
        existing.updated_at = Utc::now();
        existing.is_edited = true;
        Ok(existing.clone())
    }

    async fn delete(&self, key: &AnnotationKey, id: &TimemarkId) -> std::result::Result<(), AnnotationError> {
        let mut state = lock(&self.state);
        state.delete_calls += 1;
        state.injected_failure(AnnotationOperation::Delete)?;
        let before = state.timemarks.len();
        state.timemarks.retain(|t| !(&t.id == id && &t.key() == key));
        if state.timemarks.len() == before {
            return Err(AnnotationError::NotFound(id.clone()));
        }
        Ok(())
    }
}
