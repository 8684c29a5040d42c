// Time source seen by the playback clock: an HTML media element or a stand-in.
// All times are in seconds, as the media element reports them.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// A buffered span of the media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        TimeRange { start, end }
    }
}

/// The controls and readings the player needs from a media element.
///
/// Methods take `&self`: the element is a shared handle owned by the page and
/// mutates behind the reference.
pub trait MediaElement {
    fn current_time(&self) -> f64;
    /// Total length. `NaN` until metadata has loaded.
    fn duration(&self) -> f64;
    fn buffered(&self) -> Vec<TimeRange>;
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
    fn set_current_time(&self, seconds: f64);
    fn play(&self);
    fn pause(&self);
}

/// Percentage of the media buffered, judged from the last buffered range only.
///
/// Zero when the duration is unknown, nothing is buffered, or the playhead sits
/// before the start of the last range.
pub fn buffer_progress(media: &dyn MediaElement) -> f64 {
    let duration = media.duration();
    if duration.is_nan() || duration <= 0.0 {
        return 0.0;
    }
    match media.buffered().last() {
        Some(last) if last.start < media.current_time() => last.end * 100.0 / duration,
        _ => 0.0,
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// `HTMLMediaElement` reached through property reflection.
#[derive(Debug, Clone)]
pub struct JsMediaElement {
    element: JsValue,
}

impl JsMediaElement {
    pub fn new(element: JsValue) -> Self {
        JsMediaElement { element }
    }

    fn number(&self, property: &str) -> f64 {
        js_sys::Reflect::get(&self.element, &JsValue::from_str(property))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(f64::NAN)
    }

    fn set_number(&self, property: &str, value: f64) {
        if let Err(err) = js_sys::Reflect::set(
            &self.element,
            &JsValue::from_str(property),
            &JsValue::from_f64(value),
        ) {
            tracing::debug!(property, ?err, "media property not set");
        }
    }

    fn call(&self, method: &str) -> Option<JsValue> {
        let function = js_sys::Reflect::get(&self.element, &JsValue::from_str(method))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()?;
        function.call0(&self.element).ok()
    }
}

fn range_bound(ranges: &JsValue, bound: &str, index: u32) -> Option<f64> {
    js_sys::Reflect::get(ranges, &JsValue::from_str(bound))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()?
        .call1(ranges, &JsValue::from(index))
        .ok()?
        .as_f64()
}

impl MediaElement for JsMediaElement {
    fn current_time(&self) -> f64 {
        let time = self.number("currentTime");
        if time.is_nan() {
            0.0
        } else {
            time
        }
    }

    fn duration(&self) -> f64 {
        self.number("duration")
    }

    fn buffered(&self) -> Vec<TimeRange> {
        let Ok(ranges) = js_sys::Reflect::get(&self.element, &JsValue::from_str("buffered")) else {
            return Vec::new();
        };
        let length = js_sys::Reflect::get(&ranges, &JsValue::from_str("length"))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0) as u32;

        (0..length)
            .filter_map(|i| {
                Some(TimeRange::new(
                    range_bound(&ranges, "start", i)?,
                    range_bound(&ranges, "end", i)?,
                ))
            })
            .collect()
    }

    fn playback_rate(&self) -> f64 {
        let rate = self.number("playbackRate");
        if rate.is_nan() {
            1.0
        } else {
            rate
        }
    }

    fn set_playback_rate(&self, rate: f64) {
        self.set_number("playbackRate", rate);
    }

    fn set_current_time(&self, seconds: f64) {
        self.set_number("currentTime", seconds);
    }

    fn play(&self) {
        // play() returns a promise that rejects when autoplay is blocked;
        // the element stays paused and the next user gesture retries.
        if let Some(promise) = self.call("play") {
            if let Ok(promise) = promise.dyn_into::<js_sys::Promise>() {
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(err) = JsFuture::from(promise).await {
                        tracing::debug!(?err, "play rejected");
                    }
                });
            }
        }
    }

    fn pause(&self) {
        self.call("pause");
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scriptable media element for controller tests.
    #[derive(Debug)]
    pub struct FakeMedia {
        pub current_time: Cell<f64>,
        pub duration: Cell<f64>,
        pub buffered: RefCell<Vec<TimeRange>>,
        pub playback_rate: Cell<f64>,
        pub playing: Cell<bool>,
    }

    impl FakeMedia {
        pub fn new(duration: f64) -> Self {
            FakeMedia {
                current_time: Cell::new(0.0),
                duration: Cell::new(duration),
                buffered: RefCell::new(Vec::new()),
                playback_rate: Cell::new(1.0),
                playing: Cell::new(false),
            }
        }
    }

    impl MediaElement for FakeMedia {
        fn current_time(&self) -> f64 {
            self.current_time.get()
        }
        fn duration(&self) -> f64 {
            self.duration.get()
        }
        fn buffered(&self) -> Vec<TimeRange> {
            self.buffered.borrow().clone()
        }
        fn playback_rate(&self) -> f64 {
            self.playback_rate.get()
        }
        fn set_playback_rate(&self, rate: f64) {
            self.playback_rate.set(rate);
        }
        fn set_current_time(&self, seconds: f64) {
            self.current_time.set(seconds);
        }
        fn play(&self) {
            self.playing.set(true);
        }
        fn pause(&self) {
            self.playing.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeMedia;
    use super::*;

    #[test]
    fn buffer_progress_uses_last_range() {
        let media = FakeMedia::new(200.0);
        media.current_time.set(50.0);
        *media.buffered.borrow_mut() = vec![TimeRange::new(0.0, 20.0), TimeRange::new(40.0, 100.0)];
        assert_eq!(buffer_progress(&media), 50.0);
    }

    #[test]
    fn buffer_progress_zero_when_playhead_before_last_range() {
        let media = FakeMedia::new(200.0);
        media.current_time.set(10.0);
        *media.buffered.borrow_mut() = vec![TimeRange::new(40.0, 100.0)];
        assert_eq!(buffer_progress(&media), 0.0);
    }

    #[test]
    fn buffer_progress_zero_without_duration_or_ranges() {
        let media = FakeMedia::new(f64::NAN);
        media.current_time.set(5.0);
        *media.buffered.borrow_mut() = vec![TimeRange::new(0.0, 10.0)];
        assert_eq!(buffer_progress(&media), 0.0);

        let media = FakeMedia::new(100.0);
        media.current_time.set(5.0);
        assert_eq!(buffer_progress(&media), 0.0);
    }
}
