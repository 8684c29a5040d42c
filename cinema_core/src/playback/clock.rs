// Tick-driven sampling of a media element while it plays.
// Handlers take no arguments and pull what they need from the clock.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::playback::media::{buffer_progress, MediaElement};
use crate::playback::time_format::{represent, TimeFormat, TimePoint, TimeReading};
use crate::timer::{Scheduler, TimerId};

type Handler = Rc<RefCell<dyn FnMut()>>;
type Handlers = Rc<RefCell<BTreeMap<String, Handler>>>;

/// Periodic sampler over a [`MediaElement`].
///
/// While playing, every registered handler runs once per tick, in name order.
/// Pausing clears the tick timer before returning, so no handler runs after
/// `pause()` or `reset()`.
pub struct PlaybackClock {
    media: Rc<dyn MediaElement>,
    scheduler: Rc<dyn Scheduler>,
    tick_ms: u32,
    handlers: Handlers,
    ticker: Option<TimerId>,
}

impl PlaybackClock {
    pub fn new(media: Rc<dyn MediaElement>, scheduler: Rc<dyn Scheduler>, tick_ms: u32) -> Self {
        PlaybackClock {
            media,
            scheduler,
            tick_ms,
            handlers: Rc::new(RefCell::new(BTreeMap::new())),
            ticker: None,
        }
    }

    pub fn media(&self) -> &Rc<dyn MediaElement> {
        &self.media
    }

    /// Register a tick handler under `name`, replacing any handler of that name.
    pub fn subscribe(&self, name: impl Into<String>, handler: impl FnMut() + 'static) {
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().insert(name.into(), handler);
    }

    pub fn unsubscribe(&self, name: &str) {
        self.handlers.borrow_mut().remove(name);
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start the media and the tick. Calling it while already ticking only
    /// re-issues `play` on the media.
    pub fn play(&mut self) {
        self.media.play();
        if self.ticker.is_some() {
            return;
        }

        let handlers = self.handlers.clone();
        let id = self.scheduler.set_interval(
            self.tick_ms,
            Box::new(move || {
                let due: Vec<Handler> = handlers.borrow().values().cloned().collect();
                for handler in due {
                    // A handler that re-enters the clock mid-call is skipped.
                    if let Ok(mut handler) = handler.try_borrow_mut() {
                        (*handler)();
                    }
                }
            }),
        );
        self.ticker = Some(id);
        tracing::debug!(tick_ms = self.tick_ms, "playback clock started");
    }

    /// Pause the media and stop ticking.
    pub fn pause(&mut self) {
        self.media.pause();
        self.stop_ticking();
    }

    /// Stop ticking without touching the media. Used when the source changes
    /// or playback ends.
    pub fn reset(&mut self) {
        self.stop_ticking();
    }

    fn stop_ticking(&mut self) {
        if let Some(id) = self.ticker.take() {
            self.scheduler.clear(id);
            tracing::debug!("playback clock stopped");
        }
    }

    pub fn current_time(&self, format: TimeFormat) -> TimeReading {
        self.read(format, TimePoint::Current)
    }

    pub fn total_duration(&self, format: TimeFormat) -> TimeReading {
        self.read(format, TimePoint::Total)
    }

    fn read(&self, format: TimeFormat, point: TimePoint) -> TimeReading {
        represent(format, point, self.media.current_time(), self.media.duration())
    }

    /// Buffered percentage from the last buffered range.
    pub fn buffer_progress(&self) -> f64 {
        buffer_progress(self.media.as_ref())
    }

    pub fn seek_ms(&self, ms: f64) {
        self.media.set_current_time(ms / 1000.0);
    }

    pub fn set_playback_rate(&self, rate: f64) {
        self.media.set_playback_rate(rate);
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.stop_ticking();
    }
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("tick_ms", &self.tick_ms)
            .field("handlers", &self.handlers.borrow().keys().collect::<Vec<_>>())
            .field("ticker", &self.ticker)
            .finish()
    }
}
