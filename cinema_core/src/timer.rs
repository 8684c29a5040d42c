// Timers behind a trait so ticking and debouncing run on browser timers in WASM
// and on virtual time in tests. Clearing is synchronous and idempotent.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Handle for a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Single-threaded timer source.
pub trait Scheduler {
    /// Call `callback` every `period_ms` until cleared.
    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> TimerId;

    /// Call `callback` once after `delay_ms` unless cleared first.
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a timer. Unknown, fired or already-cleared ids are ignored.
    fn clear(&self, id: TimerId);
}

// -----------------------------------------------------------------------------
// Browser timers
// -----------------------------------------------------------------------------

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setInterval)]
    fn js_set_interval(handler: &Closure<dyn FnMut()>, timeout: i32) -> JsValue;

    #[wasm_bindgen(js_name = clearInterval)]
    fn js_clear_interval(handle: &JsValue);

    #[wasm_bindgen(js_name = setTimeout)]
    fn js_set_timeout(handler: &Closure<dyn FnMut()>, timeout: i32) -> JsValue;

    #[wasm_bindgen(js_name = clearTimeout)]
    fn js_clear_timeout(handle: &JsValue);
}

struct BrowserTimer {
    handle: JsValue,
    repeating: bool,
    _closure: Closure<dyn FnMut()>,
}

/// `setInterval`/`setTimeout` on the JS global. Owns the closures so they
/// stay alive until cleared.
#[derive(Default)]
pub struct BrowserScheduler {
    next_id: Cell<u64>,
    timers: RefCell<HashMap<TimerId, BrowserTimer>>,
    /// Timeouts that already ran; their closures are dropped on the next call
    /// rather than from inside their own invocation.
    fired: Rc<RefCell<Vec<TimerId>>>,
}

impl BrowserScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        id
    }

    fn purge_fired(&self) {
        let fired: Vec<TimerId> = self.fired.borrow_mut().drain(..).collect();
        let mut timers = self.timers.borrow_mut();
        for id in fired {
            timers.remove(&id);
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> TimerId {
        self.purge_fired();
        let id = self.allocate();
        let closure = Closure::wrap(callback);
        let handle = js_set_interval(&closure, to_js_delay(period_ms));
        self.timers.borrow_mut().insert(
            id,
            BrowserTimer {
                handle,
                repeating: true,
                _closure: closure,
            },
        );
        id
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        self.purge_fired();
        let id = self.allocate();
        let fired = self.fired.clone();
        let mut callback = Some(callback);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
            fired.borrow_mut().push(id);
        }) as Box<dyn FnMut()>);
        let handle = js_set_timeout(&closure, to_js_delay(delay_ms));
        self.timers.borrow_mut().insert(
            id,
            BrowserTimer {
                handle,
                repeating: false,
                _closure: closure,
            },
        );
        id
    }

    fn clear(&self, id: TimerId) {
        self.purge_fired();
        if let Some(timer) = self.timers.borrow_mut().remove(&id) {
            if timer.repeating {
                js_clear_interval(&timer.handle);
            } else {
                js_clear_timeout(&timer.handle);
            }
        }
    }
}

impl std::fmt::Debug for BrowserScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserScheduler")
            .field("active", &self.timers.borrow().len())
            .finish()
    }
}

fn to_js_delay(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

// -----------------------------------------------------------------------------
// Virtual time
// -----------------------------------------------------------------------------

enum Callback {
    Repeating(Box<dyn FnMut()>),
    Once(Box<dyn FnOnce()>),
}

struct ManualTimer {
    due_ms: u64,
    period_ms: u64,
    callback: Callback,
}

#[derive(Default)]
struct ManualState {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, ManualTimer>,
    running: Option<TimerId>,
    running_cleared: bool,
}

/// Scheduler driven by [`ManualScheduler::advance`]. Fires due timers in
/// deadline order; ties fire in creation order.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Timers still scheduled.
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Move virtual time forward, running every callback that falls due.
    pub fn advance(&self, ms: u64) {
        let target = self.state.borrow().now_ms + ms;

        loop {
            let (id, timer) = {
                let mut state = self.state.borrow_mut();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by_key(|(id, timer)| (timer.due_ms, **id))
                    .map(|(id, _)| *id);
                let Some(id) = next else { break };
                let Some(timer) = state.timers.remove(&id) else { break };
                state.now_ms = timer.due_ms;
                state.running = Some(id);
                state.running_cleared = false;
                (id, timer)
            };

            let ManualTimer {
                due_ms,
                period_ms,
                callback,
            } = timer;
            match callback {
                Callback::Once(callback) => callback(),
                Callback::Repeating(mut callback) => {
                    callback();
                    let mut state = self.state.borrow_mut();
                    if !state.running_cleared {
                        state.timers.insert(
                            id,
                            ManualTimer {
                                due_ms: due_ms + period_ms,
                                period_ms,
                                callback: Callback::Repeating(callback),
                            },
                        );
                    }
                }
            }

            let mut state = self.state.borrow_mut();
            state.running = None;
            state.running_cleared = false;
        }

        self.state.borrow_mut().now_ms = target;
    }

    fn schedule(&self, delay_ms: u32, callback: Callback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let period_ms = u64::from(delay_ms.max(1));
        let due_ms = state.now_ms + period_ms;
        state.timers.insert(
            id,
            ManualTimer {
                due_ms,
                period_ms,
                callback,
            },
        );
        id
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> TimerId {
        self.schedule(period_ms, Callback::Repeating(callback))
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        self.schedule(delay_ms, Callback::Once(callback))
    }

    fn clear(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if state.running == Some(id) {
            state.running_cleared = true;
        }
        state.timers.remove(&id);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("now_ms", &state.now_ms)
            .field("pending", &state.timers.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Debounce
// -----------------------------------------------------------------------------

/// Runs only the last callback handed in within `delay_ms` of quiet.
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    delay_ms: u32,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay_ms: u32) -> Self {
        Debouncer {
            scheduler,
            delay_ms,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Replace any pending callback and restart the delay.
    pub fn debounce(&self, callback: impl FnOnce() + 'static) {
        self.cancel();
        let pending = self.pending.clone();
        let id = self.scheduler.set_timeout(
            self.delay_ms,
            Box::new(move || {
                pending.set(None);
                callback();
            }),
        );
        self.pending.set(Some(id));
    }

    /// Drop the pending callback. Safe when nothing is pending.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.clear(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay_ms", &self.delay_ms)
            .field("pending", &self.pending.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    #[test]
    fn interval_fires_each_period_until_cleared() {
        let scheduler = ManualScheduler::new();
        let (count, tick) = counter();
        let id = scheduler.set_interval(25, Box::new(tick));

        scheduler.advance(24);
        assert_eq!(count.get(), 0);
        scheduler.advance(1);
        assert_eq!(count.get(), 1);
        scheduler.advance(100);
        assert_eq!(count.get(), 5);

        scheduler.clear(id);
        scheduler.advance(1_000);
        assert_eq!(count.get(), 5);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn timeout_fires_once() {
        let scheduler = ManualScheduler::new();
        let (count, mut tick) = counter();
        scheduler.set_timeout(10, Box::new(move || tick()));
        scheduler.advance(100);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let scheduler = ManualScheduler::new();
        let (_, tick) = counter();
        let id = scheduler.set_interval(5, Box::new(tick));
        scheduler.clear(id);
        scheduler.clear(id);
        scheduler.clear(TimerId(99));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn interval_can_clear_itself() {
        let scheduler = Rc::new(ManualScheduler::new());
        let count = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let id = {
            let scheduler = scheduler.clone();
            let count = count.clone();
            let own_id = own_id.clone();
            scheduler.clone().set_interval(
                10,
                Box::new(move || {
                    count.set(count.get() + 1);
                    if let Some(id) = own_id.get() {
                        scheduler.clear(id);
                    }
                }),
            )
        };
        own_id.set(Some(id));

        scheduler.advance(100);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn debounce_runs_only_last_callback() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debouncer = Debouncer::new(scheduler.clone(), 200);
        let calls = Rc::new(RefCell::new(Vec::new()));

        for label in ["a", "b", "c"] {
            let calls = calls.clone();
            debouncer.debounce(move || calls.borrow_mut().push(label));
            scheduler.advance(100);
        }
        assert!(debouncer.is_pending());
        scheduler.advance(100);
        assert_eq!(*calls.borrow(), vec!["c"]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debounce_cancel_is_safe_to_repeat() {
        let scheduler = Rc::new(ManualScheduler::new());
        let debouncer = Debouncer::new(scheduler.clone(), 50);
        debouncer.cancel();

        let (count, mut tick) = counter();
        debouncer.debounce(move || tick());
        debouncer.cancel();
        debouncer.cancel();
        scheduler.advance(500);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.pending(), 0);
    }
}
