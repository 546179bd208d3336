//! The video playback widget.
//!
//! [`VideoWidget`] owns one [`PlaybackState`] and drives a media element and a
//! fullscreen host through capability traits. Each transient flag has its own
//! cancellable timer; rescheduling replaces the pending timer and unmounting
//! cancels both.
//!
//! The renderer mounts a widget over [`DetachedMedia`] to produce the initial
//! player markup, and `static/site.js` runs the same state machine in the
//! browser.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    application::guard::FetchGuard,
    domain::player::{
        CONTROLS_HIDE_DELAY, PAUSE_OVERLAY_DELAY, PlaybackState, PlayerCommand,
    },
};

const SOURCE: &str = "application::player::VideoWidget";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} was rejected: {message}")]
pub struct MediaError {
    pub operation: &'static str,
    pub message: String,
}

impl MediaError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// The element that actually decodes and plays the stream.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Ask the element to start playback; autoplay policies may refuse.
    async fn play(&self) -> Result<(), MediaError>;
    fn pause(&self);
    fn set_current_time(&self, seconds: f64);
    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
}

/// The container that can enter and leave fullscreen display.
pub trait FullscreenHost: Send + Sync {
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&self) -> Result<(), MediaError>;
    fn exit_fullscreen(&self) -> Result<(), MediaError>;
}

/// A single pending timer; scheduling again cancels the previous one.
#[derive(Default)]
struct TimerSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerSlot {
    fn schedule<F>(&self, delay: Duration, on_expiry: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expiry.await;
        });
        let previous = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    fn is_pending(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Media element stand-in for server-side rendering; every command is ignored.
pub struct DetachedMedia;

#[async_trait]
impl MediaElement for DetachedMedia {
    async fn play(&self) -> Result<(), MediaError> {
        Err(MediaError::new("play", "no media element attached"))
    }

    fn pause(&self) {}

    fn set_current_time(&self, _seconds: f64) {}

    fn set_volume(&self, _volume: f64) {}

    fn set_muted(&self, _muted: bool) {}
}

impl FullscreenHost for DetachedMedia {
    fn is_fullscreen(&self) -> bool {
        false
    }

    fn request_fullscreen(&self) -> Result<(), MediaError> {
        Err(MediaError::new("fullscreen", "no container attached"))
    }

    fn exit_fullscreen(&self) -> Result<(), MediaError> {
        Ok(())
    }
}

pub struct VideoWidget {
    src: String,
    poster: Option<String>,
    media: Arc<dyn MediaElement>,
    host: Arc<dyn FullscreenHost>,
    state: Arc<Mutex<PlaybackState>>,
    controls_timer: TimerSlot,
    overlay_timer: TimerSlot,
    lifetime: FetchGuard,
}

impl VideoWidget {
    /// Mount a widget for `src`. Timers need a tokio runtime, so the
    /// interactive operations must run inside one.
    pub fn mount(
        src: impl Into<String>,
        poster: Option<String>,
        media: Arc<dyn MediaElement>,
        host: Arc<dyn FullscreenHost>,
    ) -> Self {
        Self {
            src: src.into(),
            poster,
            media,
            host,
            state: Arc::new(Mutex::new(PlaybackState::new())),
            controls_timer: TimerSlot::default(),
            overlay_timer: TimerSlot::default(),
            lifetime: FetchGuard::new(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn poster(&self) -> Option<&str> {
        self.poster.as_deref()
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        lock_state(&self.state)
    }

    pub async fn toggle_play_pause(&self) {
        let playing = self.lock().is_playing();
        if playing {
            self.media.pause();
            {
                let mut state = self.lock();
                state.mark_paused();
                state.pause_overlay_visible = true;
            }
            let state = Arc::clone(&self.state);
            self.overlay_timer.schedule(PAUSE_OVERLAY_DELAY, async move {
                lock_state(&state).pause_overlay_visible = false;
            });
            return;
        }

        let ticket = self.lifetime.ticket();
        let outcome = self.media.play().await;
        if !ticket.is_current() {
            debug!(target = SOURCE, src = %self.src, "dropping play result for unmounted widget");
            return;
        }

        let mut state = self.lock();
        match outcome {
            Ok(()) => state.mark_playing(),
            Err(err) => {
                warn!(target = SOURCE, src = %self.src, error = %err, "Play failed");
                state.mark_paused();
            }
        }
    }

    /// Jump to `fraction` of the progress bar.
    pub fn seek(&self, fraction: f64) {
        let target = self.lock().seek_target(fraction);
        self.media.set_current_time(target);
        self.lock().set_current_time(target);
    }

    pub fn seek_by(&self, delta: f64) {
        let target = self.lock().seek_by_target(delta);
        self.media.set_current_time(target);
        self.lock().set_current_time(target);
    }

    pub fn set_volume(&self, volume: f64) {
        let (volume, muted) = {
            let mut state = self.lock();
            state.set_volume(volume);
            (state.volume, state.muted)
        };
        self.media.set_volume(volume);
        self.media.set_muted(muted);
    }

    pub fn toggle_mute(&self) {
        let (volume, muted) = {
            let mut state = self.lock();
            state.toggle_mute();
            (state.volume, state.muted)
        };
        self.media.set_volume(volume);
        self.media.set_muted(muted);
    }

    pub fn toggle_fullscreen(&self) {
        let result = if self.host.is_fullscreen() {
            self.host.exit_fullscreen()
        } else {
            self.host.request_fullscreen()
        };
        if let Err(err) = result {
            warn!(target = SOURCE, src = %self.src, error = %err, "fullscreen change failed");
        }
        self.lock().fullscreen = self.host.is_fullscreen();
    }

    /// Container fullscreen change reported by the host.
    pub fn on_fullscreen_change(&self) {
        self.lock().fullscreen = self.host.is_fullscreen();
    }

    /// Handle a key press on the container. Returns whether the key was used.
    pub async fn handle_key(&self, key: &str) -> bool {
        let Some(command) = PlayerCommand::from_key(key) else {
            return false;
        };
        match command {
            PlayerCommand::TogglePlay => self.toggle_play_pause().await,
            PlayerCommand::SeekBy(direction) => self.seek_by(direction.offset()),
            PlayerCommand::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerCommand::ToggleMute => self.toggle_mute(),
        }
        true
    }

    /// Pointer activity: show the controls and restart the inactivity timer.
    pub fn pointer_moved(&self) {
        self.lock().controls_visible = true;
        let state = Arc::clone(&self.state);
        self.controls_timer.schedule(CONTROLS_HIDE_DELAY, async move {
            lock_state(&state).controls_visible = false;
        });
    }

    pub fn on_time_update(&self, current_time: f64, buffered_end: Option<f64>) {
        self.lock().apply_time_update(current_time, buffered_end);
    }

    pub fn on_loaded_metadata(&self, duration: f64) {
        self.lock().apply_metadata(duration);
    }

    pub fn on_media_play(&self) {
        self.lock().mark_playing();
    }

    pub fn on_media_pause(&self) {
        self.lock().mark_paused();
    }

    pub fn has_pending_timers(&self) -> bool {
        self.controls_timer.is_pending() || self.overlay_timer.is_pending()
    }

    /// Tear the widget down, cancelling timers and dropping in-flight results.
    ///
    /// A play request still awaiting the media element is discarded when it
    /// settles.
    pub fn unmount(&self) {
        self.lifetime.close();
        self.controls_timer.cancel();
        self.overlay_timer.cancel();
    }
}

fn lock_state(state: &Mutex<PlaybackState>) -> MutexGuard<'_, PlaybackState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
