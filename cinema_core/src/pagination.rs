// Pagination window: a bounded run of page numbers around the current page.
// `current_page` out of range is an error; `total_pages` and `window` are clamped.

use wasm_bindgen::prelude::*;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};

/// 1-based page number.
pub type PageNo = i64;

const MIN_WINDOW: i64 = 3;

/// Page numbers to render around `current_page`.
///
/// `total_pages < 1` is treated as 1 and `window` is clamped to
/// `[3, total_pages]`. The window grows outward from the current page, one
/// step left then one step right, so the current page sits in the middle when
/// there is room, is pinned first or last at either end, and for an even
/// window lands as the last element of the first half.
///
/// ```
/// use cinema_core::paginate;
///
/// assert_eq!(paginate(1, 9, 5).unwrap(), vec![1, 2, 3, 4, 5]);
/// assert_eq!(paginate(5, 9, 4).unwrap(), vec![4, 5, 6, 7]);
/// ```
pub fn paginate(current_page: PageNo, total_pages: i64, window: i64) -> Result<Vec<PageNo>> {
    let total_pages = total_pages.max(1);

    if !(1..=total_pages).contains(&current_page) {
        return Err(CoreError::OutOfBounds {
            current_page,
            total_pages,
        });
    }

    Ok(grow_window(current_page, total_pages, window))
}

/// Assumes `1 <= current_page <= total_pages`.
fn grow_window(current_page: PageNo, total_pages: i64, window: i64) -> Vec<PageNo> {
    match total_pages {
        1 => return vec![1],
        2 => return vec![1, 2],
        _ => {}
    }

    let window = window.clamp(MIN_WINDOW, total_pages);
    let mut pages = std::collections::VecDeque::new();
    let mut left = current_page;
    let mut right = current_page.checked_add(1);

    while (pages.len() as i64) < window {
        if left >= 1 {
            pages.push_front(left);
            left -= 1;
        }
        if pages.len() as i64 >= window {
            break;
        }
        if let Some(page) = right.filter(|&page| page <= total_pages) {
            pages.push_back(page);
            right = page.checked_add(1);
        }
    }

    pages.into()
}

/// Records per page as used for both counting and slicing: the magnitude,
/// at least 1.
pub(crate) fn page_size(per_page: i64) -> i64 {
    per_page.saturating_abs().max(1)
}

/// Number of pages needed for `count` records, `per_page` at a time.
pub fn total_pages(count: i64, per_page: i64) -> i64 {
    let per_page = page_size(per_page);
    let count = count.max(0);
    count / per_page + i64::from(count % per_page != 0)
}

/// Paginator state: current page plus the rendered window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: PageNo,
    total_pages: i64,
    window: i64,
    pages: Vec<PageNo>,
}

impl Paginator {
    pub fn new(current_page: PageNo, total_pages: i64, window: i64) -> Result<Self> {
        let pages = paginate(current_page, total_pages, window)?;
        Ok(Paginator {
            current_page,
            total_pages: total_pages.max(1),
            window,
            pages,
        })
    }

    pub fn current_page(&self) -> PageNo {
        self.current_page
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn pages(&self) -> &[PageNo] {
        &self.pages
    }

    /// Move forward one page. Returns the new page, or `None` on the last page.
    pub fn next(&mut self) -> Option<PageNo> {
        let next = self.current_page.checked_add(1).filter(|&next| next <= self.total_pages)?;
        self.move_to(next);
        Some(next)
    }

    /// Move back one page. Returns the new page, or `None` on the first page.
    pub fn previous(&mut self) -> Option<PageNo> {
        let previous = self.current_page - 1;
        if previous < 1 {
            return None;
        }
        self.move_to(previous);
        Some(previous)
    }

    pub fn go_to(&mut self, page: PageNo) -> Result<()> {
        self.pages = paginate(page, self.total_pages, self.window)?;
        self.current_page = page;
        Ok(())
    }

    /// Replace the page count, e.g. after a new search.
    pub fn set_total_pages(&mut self, total_pages: i64) -> Result<()> {
        let total_pages = total_pages.max(1);
        self.pages = paginate(self.current_page, total_pages, self.window)?;
        self.total_pages = total_pages;
        Ok(())
    }

    fn move_to(&mut self, page: PageNo) {
        self.current_page = page;
        self.pages = grow_window(page, self.total_pages, self.window);
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

fn integer_arg(name: &str, value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(CoreError::InvalidArgument(format!(
            "{} must be an integer, got {}",
            name, value
        )));
    }
    Ok(value as i64)
}

/// Arguments as JS numbers, validated as integers.
fn paginate_numbers(current_page: f64, total_pages: f64, window: f64) -> Result<Vec<PageNo>> {
    paginate(
        integer_arg("currentPage", current_page)?,
        integer_arg("totalPages", total_pages)?,
        integer_arg("window", window)?,
    )
}

/// Page window for JS. Returns a JSON array of page numbers.
#[wasm_bindgen(js_name = paginate)]
pub fn paginate_js(current_page: f64, total_pages: f64, window: f64) -> Result<String, JsValue> {
    let pages = paginate_numbers(current_page, total_pages, window).map_err(crate::to_js)?;
    serde_json::to_string(&pages)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Stateful paginator for the results page. Page numbers come back as JSON.
#[wasm_bindgen]
pub struct WasmPaginator {
    inner: Paginator,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Window width comes from `pagination_window` in `config_json`.
    #[wasm_bindgen(constructor)]
    pub fn new(current_page: f64, total_pages: f64, config_json: &str) -> Result<WasmPaginator, JsValue> {
        let config = CoreConfig::from_json(config_json).map_err(crate::to_js)?;
        let inner = Paginator::new(
            integer_arg("currentPage", current_page).map_err(crate::to_js)?,
            integer_arg("totalPages", total_pages).map_err(crate::to_js)?,
            config.pagination_window,
        )
        .map_err(crate::to_js)?;
        Ok(WasmPaginator { inner })
    }

    pub fn current_page(&self) -> f64 {
        self.inner.current_page() as f64
    }

    pub fn total_pages(&self) -> f64 {
        self.inner.total_pages() as f64
    }

    pub fn pages(&self) -> Result<String, JsValue> {
        crate::json_string(self.inner.pages())
    }

    /// New page number, or `undefined` on the last page.
    pub fn next(&mut self) -> Option<f64> {
        self.inner.next().map(|page| page as f64)
    }

    /// New page number, or `undefined` on the first page.
    pub fn previous(&mut self) -> Option<f64> {
        self.inner.previous().map(|page| page as f64)
    }

    pub fn go_to(&mut self, page: f64) -> Result<(), JsValue> {
        let page = integer_arg("page", page).map_err(crate::to_js)?;
        self.inner.go_to(page).map_err(crate::to_js)
    }

    pub fn set_total_pages(&mut self, total_pages: f64) -> Result<(), JsValue> {
        let total_pages = integer_arg("totalPages", total_pages).map_err(crate::to_js)?;
        self.inner.set_total_pages(total_pages).map_err(crate::to_js)
    }
}
