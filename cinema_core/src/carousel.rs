// Hero carousel on the home page: which hero is shown and its timed rotation.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::loader::{DataSource, JsonFetch, Resource};
use crate::timer::{BrowserScheduler, Scheduler, TimerId};
use crate::types::Hero;

fn heroes_unavailable(cause: String) -> CoreError {
    CoreError::HeroesUnavailable { cause }
}

/// Loads the hero list once.
#[derive(Debug)]
pub struct HeroService {
    resource: Resource<Vec<Hero>>,
}

impl HeroService {
    pub fn new(source: impl DataSource<Vec<Hero>> + 'static) -> Self {
        HeroService {
            resource: Resource::new("heroes", source, heroes_unavailable),
        }
    }

    pub async fn heroes(&self) -> Result<Rc<Vec<Hero>>> {
        self.resource.get().await
    }
}

/// Displayed index over `len` heroes, advanced by a rotation timer.
///
/// The index is shared with the timer callback, so reads always reflect the
/// latest rotation step.
pub struct HeroCarousel {
    len: Rc<Cell<usize>>,
    index: Rc<Cell<usize>>,
    scheduler: Rc<dyn Scheduler>,
    rotation: Option<TimerId>,
}

impl HeroCarousel {
    pub fn new(len: usize, scheduler: Rc<dyn Scheduler>) -> Self {
        HeroCarousel {
            len: Rc::new(Cell::new(len)),
            index: Rc::new(Cell::new(0)),
            scheduler,
            rotation: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    pub fn displayed_index(&self) -> usize {
        self.index.get()
    }

    /// Heroes arrived after rotation started. The index is kept if still valid.
    pub fn set_len(&mut self, len: usize) {
        self.len.set(len);
        if self.index.get() >= len {
            self.index.set(0);
        }
    }

    /// Advance one hero, wrapping to the first after the last.
    pub fn slide_to_next(&mut self) -> usize {
        step(&self.index, self.len.get())
    }

    /// Show the hero at `index`, e.g. from a radio button.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.len.get() {
            return Err(CoreError::InvalidArgument(format!(
                "hero index {} out of range for {} heroes",
                index,
                self.len.get()
            )));
        }
        self.index.set(index);
        Ok(())
    }

    /// Advance every `period_ms`, calling `on_slide` with the new index.
    /// Restarts the rotation if one is already running.
    pub fn start_rotation(&mut self, period_ms: u32, mut on_slide: impl FnMut(usize) + 'static) {
        self.stop_rotation();
        let (index, len) = (self.index.clone(), self.len.clone());
        let id = self.scheduler.set_interval(
            period_ms,
            Box::new(move || on_slide(step(&index, len.get()))),
        );
        self.rotation = Some(id);
    }

    pub fn stop_rotation(&mut self) {
        if let Some(id) = self.rotation.take() {
            self.scheduler.clear(id);
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }
}

fn step(index: &Cell<usize>, len: usize) -> usize {
    let next = if index.get() + 1 >= len { 0 } else { index.get() + 1 };
    index.set(next);
    next
}

impl Drop for HeroCarousel {
    fn drop(&mut self) {
        self.stop_rotation();
    }
}

impl std::fmt::Debug for HeroCarousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroCarousel")
            .field("len", &self.len.get())
            .field("index", &self.index.get())
            .field("rotation", &self.rotation)
            .finish()
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// Fetch `config.heroes_url`. Resolves to the hero list as JSON.
#[wasm_bindgen]
pub async fn load_heroes(fetch: js_sys::Function, config_json: String) -> Result<String, JsValue> {
    let config = CoreConfig::from_json(&config_json).map_err(crate::to_js)?;
    let service = HeroService::new(JsonFetch::new(fetch, config.heroes_url));
    let heroes = service.heroes().await.map_err(crate::to_js)?;
    crate::json_string(heroes.as_ref())
}

/// Carousel driven by browser timers.
#[wasm_bindgen]
pub struct WasmHeroCarousel {
    inner: HeroCarousel,
    rotation_ms: u32,
}

#[wasm_bindgen]
impl WasmHeroCarousel {
    /// Rotation period comes from `hero_rotation_ms` in `config_json`.
    #[wasm_bindgen(constructor)]
    pub fn new(len: usize, config_json: &str) -> Result<WasmHeroCarousel, JsValue> {
        let config = CoreConfig::from_json(config_json).map_err(crate::to_js)?;
        Ok(WasmHeroCarousel {
            inner: HeroCarousel::new(len, Rc::new(BrowserScheduler::new())),
            rotation_ms: config.hero_rotation_ms,
        })
    }

    pub fn displayed_index(&self) -> usize {
        self.inner.displayed_index()
    }

    pub fn set_len(&mut self, len: usize) {
        self.inner.set_len(len);
    }

    pub fn slide_to_next(&mut self) -> usize {
        self.inner.slide_to_next()
    }

    pub fn select(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.select(index).map_err(crate::to_js)
    }

    /// `on_slide` receives the new index after each automatic step.
    pub fn start_rotation(&mut self, on_slide: js_sys::Function) {
        self.inner.start_rotation(self.rotation_ms, move |index| {
            if let Err(err) = on_slide.call1(&JsValue::NULL, &JsValue::from(index as u32)) {
                tracing::debug!(?err, "slide callback threw");
            }
        });
    }

    pub fn stop_rotation(&mut self) {
        self.inner.stop_rotation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticSource;
    use crate::timer::ManualScheduler;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn slide_wraps_to_first() {
        let mut carousel = HeroCarousel::new(3, Rc::new(ManualScheduler::new()));
        assert_eq!(carousel.slide_to_next(), 1);
        assert_eq!(carousel.slide_to_next(), 2);
        assert_eq!(carousel.slide_to_next(), 0);
    }

    #[test]
    fn empty_carousel_stays_at_zero() {
        let mut carousel = HeroCarousel::new(0, Rc::new(ManualScheduler::new()));
        assert!(carousel.is_empty());
        assert_eq!(carousel.slide_to_next(), 0);
        assert!(carousel.select(0).is_err());
    }

    #[test]
    fn select_sets_index() {
        let mut carousel = HeroCarousel::new(4, Rc::new(ManualScheduler::new()));
        carousel.select(3).unwrap();
        assert_eq!(carousel.displayed_index(), 3);
        assert!(matches!(carousel.select(4), Err(CoreError::InvalidArgument(_))));
        assert_eq!(carousel.slide_to_next(), 0);
    }

    #[test]
    fn rotation_advances_until_stopped() {
        let scheduler = Rc::new(ManualScheduler::new());
        let mut carousel = HeroCarousel::new(3, scheduler.clone());
        let slides = Rc::new(RefCell::new(Vec::new()));
        let seen = slides.clone();

        carousel.start_rotation(5_000, move |index| seen.borrow_mut().push(index));
        scheduler.advance(15_000);
        assert_eq!(*slides.borrow(), vec![1, 2, 0]);
        assert_eq!(carousel.displayed_index(), 0);

        carousel.stop_rotation();
        carousel.stop_rotation();
        scheduler.advance(20_000);
        assert_eq!(slides.borrow().len(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn restarting_rotation_keeps_one_timer() {
        let scheduler = Rc::new(ManualScheduler::new());
        let mut carousel = HeroCarousel::new(2, scheduler.clone());
        carousel.start_rotation(100, |_| {});
        carousel.start_rotation(100, |_| {});
        assert_eq!(scheduler.pending(), 1);
        drop(carousel);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn late_heroes_keep_valid_index() {
        let mut carousel = HeroCarousel::new(0, Rc::new(ManualScheduler::new()));
        carousel.set_len(3);
        carousel.select(2).unwrap();
        carousel.set_len(2);
        assert_eq!(carousel.displayed_index(), 0);
    }

    #[test]
    fn service_loads_heroes() {
        let hero = Hero {
            src: "hero.jpg".to_string(),
            redirect_link: Some("/movie/1".to_string()),
            title: "Hero".to_string(),
            description: "A hero".to_string(),
        };
        let service = HeroService::new(StaticSource(vec![hero.clone()]));
        let heroes = block_on(service.heroes()).unwrap();
        assert_eq!(*heroes, vec![hero]);
    }
}
