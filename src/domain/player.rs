//! Playback state for the custom video player.
//!
//! The transport has two states, paused and playing. Volume, mute,
//! fullscreen and the transient overlay flags are orthogonal to it. Nothing
//! here performs I/O; the widget in `application::player` drives a media
//! element and feeds its events back into [`PlaybackState`].

use std::time::Duration;

/// Arrow keys move the playhead by this many seconds.
pub const SEEK_STEP_SECONDS: f64 = 5.0;
/// Controls hide after this much pointer inactivity.
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_millis(3000);
/// The pause overlay flashes for this long after pausing.
pub const PAUSE_OVERLAY_DELAY: Duration = Duration::from_millis(600);
/// Unmuting a zero-volume player restores this level.
pub const UNMUTE_FALLBACK_VOLUME: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    TogglePlay,
    SeekBy(SeekDirection),
    ToggleFullscreen,
    ToggleMute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Back,
    Forward,
}

impl SeekDirection {
    pub fn offset(self) -> f64 {
        match self {
            SeekDirection::Back => -SEEK_STEP_SECONDS,
            SeekDirection::Forward => SEEK_STEP_SECONDS,
        }
    }
}

impl PlayerCommand {
    /// Map a keyboard `key` value to a player command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Space" | "Spacebar" => Some(Self::TogglePlay),
            "ArrowLeft" => Some(Self::SeekBy(SeekDirection::Back)),
            "ArrowRight" => Some(Self::SeekBy(SeekDirection::Forward)),
            "f" | "F" => Some(Self::ToggleFullscreen),
            "m" | "M" => Some(Self::ToggleMute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub transport: Transport,
    pub current_time: f64,
    /// Zero until metadata has loaded.
    pub duration: f64,
    /// End of the last buffered range, in seconds.
    pub buffered_end: f64,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
    pub controls_visible: bool,
    pub pause_overlay_visible: bool,
    pub initial_play_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            transport: Transport::Paused,
            current_time: 0.0,
            duration: 0.0,
            buffered_end: 0.0,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            controls_visible: false,
            pause_overlay_visible: false,
            initial_play_visible: true,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    fn has_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Gain actually applied to the output.
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Playhead position as a fraction of the duration; 0 while unknown.
    pub fn progress(&self) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        (self.current_time / self.duration).clamp(0.0, 1.0)
    }

    pub fn buffered_fraction(&self) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        (self.buffered_end / self.duration)
            .clamp(0.0, 1.0)
            .max(self.progress())
    }

    /// Target time for a click at `fraction` of the progress bar width.
    pub fn seek_target(&self, fraction: f64) -> f64 {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        fraction * self.duration.max(0.0)
    }

    /// Target time after moving the playhead by `delta` seconds.
    pub fn seek_by_target(&self, delta: f64) -> f64 {
        self.clamp_time(self.current_time + delta)
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        if !seconds.is_finite() {
            return 0.0;
        }
        if self.has_duration() {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        }
    }

    pub fn set_current_time(&mut self, seconds: f64) {
        self.current_time = self.clamp_time(seconds);
    }

    /// Apply a gain change; zero mutes and anything above zero unmutes.
    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.volume = volume;
        self.muted = volume == 0.0;
    }

    /// Flip the mute flag, restoring an audible level when unmuting from zero.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            if self.volume == 0.0 {
                self.volume = UNMUTE_FALLBACK_VOLUME;
            }
        } else {
            self.muted = true;
        }
    }

    pub fn mark_playing(&mut self) {
        self.transport = Transport::Playing;
        self.initial_play_visible = false;
    }

    pub fn mark_paused(&mut self) {
        self.transport = Transport::Paused;
    }

    pub fn apply_metadata(&mut self, duration: f64) {
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        self.current_time = self.clamp_time(self.current_time);
    }

    /// Mirror a time update from the media element.
    pub fn apply_time_update(&mut self, current_time: f64, buffered_end: Option<f64>) {
        self.current_time = self.clamp_time(current_time);
        if let Some(end) = buffered_end.filter(|end| end.is_finite()) {
            self.buffered_end = end.max(0.0);
        }
        if self.buffered_end < self.current_time {
            self.buffered_end = self.current_time;
        }
    }

    pub fn play_label(&self) -> &'static str {
        if self.is_playing() {
            "Pause (k)"
        } else {
            "Play (k)"
        }
    }

    pub fn mute_label(&self) -> &'static str {
        if self.muted { "Unmute (m)" } else { "Mute (m)" }
    }

    pub fn fullscreen_label(&self) -> &'static str {
        if self.fullscreen {
            "Exit fullscreen (f)"
        } else {
            "Fullscreen (f)"
        }
    }
}

pub const SUBTITLES_LABEL: &str = "Subtitles/CC (c)";
pub const SETTINGS_LABEL: &str = "Settings";

/// Render seconds as `m:ss`; non-finite or negative input shows `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_paused_with_full_volume() {
        let state = PlaybackState::new();
        assert_eq!(state.transport, Transport::Paused);
        assert_eq!(state.volume, 1.0);
        assert!(!state.muted);
        assert!(state.initial_play_visible);
        assert_eq!(state.progress(), 0.0);
        assert_eq!(state.buffered_fraction(), 0.0);
    }

    #[test]
    fn seek_half_of_hundred_seconds() {
        let mut state = PlaybackState::new();
        state.apply_metadata(100.0);
        assert_eq!(state.seek_target(0.5), 50.0);
    }

    #[test]
    fn progress_stays_within_unit_interval() {
        let mut state = PlaybackState::new();
        state.apply_metadata(80.0);
        for time in [0.0, 12.5, 40.0, 79.9, 80.0] {
            state.apply_time_update(time, Some(time));
            let progress = state.progress();
            assert!((0.0..=1.0).contains(&progress), "progress {progress} for {time}");
            assert!(state.buffered_fraction() >= progress);
        }
    }

    #[test]
    fn mute_then_unmute_restores_volume() {
        let mut state = PlaybackState::new();
        state.set_volume(0.37);
        state.toggle_mute();
        assert_eq!(state.effective_volume(), 0.0);
        state.toggle_mute();
        assert!(!state.muted);
        assert_eq!(state.volume, 0.37);
    }

    #[test]
    fn zero_volume_mutes_and_unmute_falls_back() {
        let mut state = PlaybackState::new();
        state.set_volume(0.0);
        assert!(state.muted);
        state.toggle_mute();
        assert!(!state.muted);
        assert_eq!(state.volume, UNMUTE_FALLBACK_VOLUME);

        state.set_volume(0.2);
        assert!(!state.muted);
    }

    #[test]
    fn time_updates_clamp_to_duration() {
        let mut state = PlaybackState::new();
        state.apply_metadata(30.0);
        state.apply_time_update(45.0, None);
        assert_eq!(state.current_time, 30.0);
        assert_eq!(state.seek_by_target(SEEK_STEP_SECONDS), 30.0);
        state.set_current_time(2.0);
        assert_eq!(state.seek_by_target(SeekDirection::Back.offset()), 0.0);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(PlayerCommand::from_key(" "), Some(PlayerCommand::TogglePlay));
        assert_eq!(
            PlayerCommand::from_key("ArrowLeft"),
            Some(PlayerCommand::SeekBy(SeekDirection::Back))
        );
        assert_eq!(
            PlayerCommand::from_key("F"),
            Some(PlayerCommand::ToggleFullscreen)
        );
        assert_eq!(PlayerCommand::from_key("m"), Some(PlayerCommand::ToggleMute));
        assert_eq!(PlayerCommand::from_key("x"), None);
    }

    #[test]
    fn formats_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn labels_follow_state() {
        let mut state = PlaybackState::new();
        assert_eq!(state.play_label(), "Play (k)");
        state.mark_playing();
        assert_eq!(state.play_label(), "Pause (k)");
        assert!(!state.initial_play_visible);
        state.toggle_mute();
        assert_eq!(state.mute_label(), "Unmute (m)");
        state.fullscreen = true;
        assert_eq!(state.fullscreen_label(), "Exit fullscreen (f)");
    }
}
