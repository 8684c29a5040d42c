// Client-side playback: a tick-driven clock over a media element, time
// readings, exclusive settings menus and the player controller built on them.

pub mod clock;
pub mod media;
pub mod menu;
pub mod player;
pub mod time_format;

pub use clock::PlaybackClock;
pub use media::{buffer_progress, JsMediaElement, MediaElement, TimeRange};
pub use menu::{ExclusiveMenu, MenuFlags, MenuState, SettingsPanel};
pub use player::{PlayerState, VideoPlayer, WasmVideoPlayer};
pub use time_format::{clock as format_clock, represent, TimeFormat, TimePoint, TimeReading};
