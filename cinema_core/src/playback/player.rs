// Video player controller: the state behind the player controls.
// The page forwards DOM events here and renders from `PlayerState`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::playback::clock::PlaybackClock;
use crate::playback::media::{JsMediaElement, MediaElement};
use crate::playback::menu::{ExclusiveMenu, MenuFlags, MenuState, SettingsPanel};
use crate::playback::time_format::{represent, TimeFormat, TimePoint};
use crate::timer::{BrowserScheduler, Debouncer, Scheduler};
use crate::types::VideoSource;

pub const MAX_VOLUME: u8 = 100;
const DEFAULT_QUALITY: &str = "HD";

/// Everything the controls render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub is_playing: bool,
    /// Playhead in milliseconds.
    pub current_time: f64,
    pub current_time_in_percentage: f64,
    /// `"<current> / <duration>"`, both as clock strings.
    pub time_display: String,
    pub volume: u8,
    pub max_volume: u8,
    pub is_mute: bool,
    /// Duration in milliseconds.
    pub duration: f64,
    pub buffer_progress: f64,
    pub is_controller_visible: bool,
    #[serde(flatten)]
    pub menus: MenuFlags,
    pub current_playback_rate: f64,
    pub current_video_quality: String,
    pub selected_video_index: usize,
    pub playback_rates: Vec<f64>,
}

impl PlayerState {
    fn initial(videos: &[VideoSource], selected: usize, config: &CoreConfig) -> Self {
        PlayerState {
            is_playing: false,
            current_time: 0.0,
            current_time_in_percentage: 0.0,
            time_display: "00:00 / 00:00".to_string(),
            volume: MAX_VOLUME,
            max_volume: MAX_VOLUME,
            is_mute: false,
            duration: 0.0,
            buffer_progress: 100.0,
            is_controller_visible: true,
            menus: MenuFlags::default(),
            current_playback_rate: 1.0,
            current_video_quality: videos
                .get(selected)
                .map(|video| video.quality.clone())
                .unwrap_or_else(|| DEFAULT_QUALITY.to_string()),
            selected_video_index: selected,
            playback_rates: config.playback_rates.clone(),
        }
    }

    /// Re-sample the time display and progress bar from the media.
    fn sync_time(&mut self, media: &dyn MediaElement) {
        let (current, duration) = (media.current_time(), media.duration());
        let clock = |point| represent(TimeFormat::HourMinSec, point, current, duration);
        self.time_display = format!("{} / {}", clock(TimePoint::Current), clock(TimePoint::Total));
        self.current_time =
            represent(TimeFormat::Milliseconds, TimePoint::Current, current, duration).as_f64();
        self.current_time_in_percentage =
            represent(TimeFormat::Percentage, TimePoint::Current, current, duration).as_f64();
    }
}

/// Controller for one video element and its renditions.
pub struct VideoPlayer {
    clock: PlaybackClock,
    state: Rc<RefCell<PlayerState>>,
    menu: ExclusiveMenu,
    hide_controller: Debouncer,
    videos: Vec<VideoSource>,
}

impl VideoPlayer {
    pub fn new(
        media: Rc<dyn MediaElement>,
        scheduler: Rc<dyn Scheduler>,
        videos: Vec<VideoSource>,
        default_video_index: usize,
        config: &CoreConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(PlayerState::initial(
            &videos,
            default_video_index,
            config,
        )));

        let clock = PlaybackClock::new(media.clone(), scheduler.clone(), config.tick_interval_ms);
        {
            let state = state.clone();
            clock.subscribe("controls", move || state.borrow_mut().sync_time(media.as_ref()));
        }

        let menu = {
            let (changed, reset) = (state.clone(), state.clone());
            ExclusiveMenu::with_effects(
                move |flags| changed.borrow_mut().menus = flags,
                move |flags| reset.borrow_mut().menus = flags,
            )
        };

        VideoPlayer {
            clock,
            state,
            menu,
            hide_controller: Debouncer::new(scheduler, config.controller_hide_delay_ms),
            videos,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    pub fn videos(&self) -> &[VideoSource] {
        &self.videos
    }

    /// The rendition currently selected, if the index points at one.
    pub fn current_video(&self) -> Option<&VideoSource> {
        self.videos.get(self.state.borrow().selected_video_index)
    }

    /// Register an extra tick handler, e.g. a UI redraw.
    pub fn subscribe(&self, name: impl Into<String>, handler: impl FnMut() + 'static) {
        self.clock.subscribe(name, handler);
    }

    pub fn toggle_play_pause(&mut self) {
        let playing = self.state.borrow().is_playing;
        if playing {
            self.clock.pause();
        } else {
            self.clock.play();
        }
        self.state.borrow_mut().is_playing = !playing;
    }

    pub fn on_video_ended(&mut self) {
        self.state.borrow_mut().is_playing = false;
        self.clock.reset();
    }

    pub fn toggle_mute(&mut self) {
        let mut state = self.state.borrow_mut();
        state.is_mute = !state.is_mute;
    }

    /// Set the volume, clamped to `0..=MAX_VOLUME`.
    pub fn set_volume(&mut self, volume: i64) {
        self.state.borrow_mut().volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
    }

    /// Select a rendition. The page swaps the element's source afterwards.
    pub fn select_quality(&mut self, index: usize) -> Result<&VideoSource> {
        let video = self.videos.get(index).ok_or_else(|| {
            CoreError::InvalidArgument(format!(
                "video index {} out of range for {} sources",
                index,
                self.videos.len()
            ))
        })?;
        let mut state = self.state.borrow_mut();
        state.selected_video_index = index;
        state.current_video_quality = video.quality.clone();
        Ok(video)
    }

    pub fn on_duration_change(&mut self) {
        self.state.borrow_mut().duration =
            self.clock.total_duration(TimeFormat::Milliseconds).as_f64();
    }

    /// Apply the sampled buffer level. A zero reading is dropped: the element
    /// reports an empty buffer when it serves the video from cache.
    pub fn on_buffer_progress(&mut self) {
        let progress = self.clock.buffer_progress();
        if progress > 0.0 {
            self.state.borrow_mut().buffer_progress = progress;
        }
    }

    /// Seek from the progress bar, which works in milliseconds.
    pub fn seek_ms(&mut self, ms: f64) {
        self.clock.seek_ms(ms);
        self.sync_time();
    }

    pub fn on_fullscreen_change(&mut self, is_fullscreen: bool) {
        if is_fullscreen {
            self.state.borrow_mut().is_controller_visible = false;
        } else {
            self.hide_controller.cancel();
            self.state.borrow_mut().is_controller_visible = true;
        }
    }

    /// Show the controls and hide them again after a quiet period. Only applies
    /// in fullscreen.
    pub fn on_mouse_move(&mut self, is_fullscreen: bool) {
        self.hide_controller.cancel();
        if !is_fullscreen {
            return;
        }

        self.state.borrow_mut().is_controller_visible = true;
        let state = self.state.clone();
        self.hide_controller
            .debounce(move || state.borrow_mut().is_controller_visible = false);
    }

    /// The element got a new source: stop, redraw the readouts and carry the
    /// playback rate over to the new source.
    pub fn on_video_src_change(&mut self) {
        self.state.borrow_mut().is_playing = false;
        self.clock.reset();
        self.sync_time();
        let rate = self.state.borrow().current_playback_rate;
        self.set_playback_rate(rate);
    }

    pub fn open_settings_menu(&mut self) {
        self.menu.set(MenuState::Open(SettingsPanel::Settings));
    }

    pub fn close_settings_menu(&mut self) {
        self.menu.reset_to_default();
    }

    pub fn open_playback_menu(&mut self) {
        self.menu.set(MenuState::Open(SettingsPanel::PlaybackSpeed));
    }

    pub fn open_quality_menu(&mut self) {
        self.menu.set(MenuState::Open(SettingsPanel::Quality));
    }

    /// Switch menus by panel name; unknown names are ignored.
    pub fn set_menu_state(&mut self, name: &str) {
        self.menu.set_state(name);
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.clock.set_playback_rate(rate);
        self.state.borrow_mut().current_playback_rate = rate;
    }

    fn sync_time(&self) {
        self.state
            .borrow_mut()
            .sync_time(self.clock.media().as_ref());
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.clock.reset();
        self.hide_controller.cancel();
    }
}

impl std::fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("state", &self.state.borrow())
            .field("clock", &self.clock)
            .field("videos", &self.videos.len())
            .finish()
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Player controller bound to an `HTMLVideoElement` and browser timers.
#[wasm_bindgen]
pub struct WasmVideoPlayer {
    inner: VideoPlayer,
}

#[wasm_bindgen]
impl WasmVideoPlayer {
    /// `videos_json` is an array of `{ quality, type, src }`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: JsValue,
        videos_json: &str,
        default_video_index: usize,
        config_json: &str,
    ) -> Result<WasmVideoPlayer, JsValue> {
        let config = CoreConfig::from_json(config_json).map_err(crate::to_js)?;
        let videos: Vec<VideoSource> = serde_json::from_str(videos_json).map_err(|e| {
            crate::to_js(CoreError::InvalidArgument(format!("invalid videos: {}", e)))
        })?;

        Ok(WasmVideoPlayer {
            inner: VideoPlayer::new(
                Rc::new(JsMediaElement::new(element)),
                Rc::new(BrowserScheduler::new()),
                videos,
                default_video_index,
                &config,
            ),
        })
    }

    /// Current state as JSON.
    pub fn state(&self) -> Result<String, JsValue> {
        crate::json_string(&self.inner.state())
    }

    /// Call `callback` on every tick while playing.
    pub fn subscribe(&self, name: &str, callback: js_sys::Function) {
        self.inner.subscribe(name, move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                tracing::debug!(?err, "tick callback threw");
            }
        });
    }

    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
    }

    pub fn on_video_ended(&mut self) {
        self.inner.on_video_ended();
    }

    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.inner.set_volume(i64::from(volume));
    }

    /// Returns the selected source as JSON.
    pub fn select_quality(&mut self, index: usize) -> Result<String, JsValue> {
        let video = self.inner.select_quality(index).map_err(crate::to_js)?;
        crate::json_string(video)
    }

    pub fn on_duration_change(&mut self) {
        self.inner.on_duration_change();
    }

    pub fn on_buffer_progress(&mut self) {
        self.inner.on_buffer_progress();
    }

    pub fn seek_ms(&mut self, ms: f64) {
        self.inner.seek_ms(ms);
    }

    pub fn on_fullscreen_change(&mut self, is_fullscreen: bool) {
        self.inner.on_fullscreen_change(is_fullscreen);
    }

    pub fn on_mouse_move(&mut self, is_fullscreen: bool) {
        self.inner.on_mouse_move(is_fullscreen);
    }

    pub fn on_video_src_change(&mut self) {
        self.inner.on_video_src_change();
    }

    pub fn set_menu_state(&mut self, name: &str) {
        self.inner.set_menu_state(name);
    }

    pub fn close_settings_menu(&mut self) {
        self.inner.close_settings_menu();
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.inner.set_playback_rate(rate);
    }
}
