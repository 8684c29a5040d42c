// Catalog query engine: match + offset/limit windowing over the loaded movies.
// The backing collection is never mutated; queries return ordered views.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::loader::{DataSource, JsonFetch, Resource};
use crate::matcher::matches;
use crate::pagination::{page_size, total_pages};
use crate::types::{Movie, MovieMatch};

/// Offset/limit window applied after matching.
///
/// Negative values are sign-flipped rather than rejected, so `{ offset: -3 }`
/// behaves like `{ offset: 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl QueryOptions {
    pub fn new(offset: i64, limit: i64) -> Self {
        QueryOptions { offset, limit }
    }

    /// Every match from the start.
    pub fn unbounded() -> Self {
        QueryOptions {
            offset: 0,
            limit: i64::MAX,
        }
    }

    pub fn with_limit(limit: i64) -> Self {
        QueryOptions {
            offset: 0,
            limit,
        }
    }

    /// Window for a 1-based page of `per_page` records. Both arguments are
    /// taken by magnitude and `per_page` is at least 1.
    pub fn for_page(page_no: i64, per_page: i64) -> Self {
        let per_page = page_size(per_page);
        QueryOptions {
            offset: (page_no.saturating_abs() - 1).max(0).saturating_mul(per_page),
            limit: per_page,
        }
    }

    /// Normalized `(skip, take)`.
    fn window(&self) -> (usize, usize) {
        let clamp = |v: u64| usize::try_from(v).unwrap_or(usize::MAX);
        (
            clamp(self.offset.unsigned_abs()),
            clamp(self.limit.unsigned_abs()),
        )
    }
}

/// In-memory movie collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Catalog { movies }
    }

    /// Parse the mock data file contents.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::CatalogUnavailable {
            cause: e.to_string(),
        })
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Matching movies in collection order, windowed by `options`.
    pub fn query_by_spec(&self, spec: &MovieMatch, options: QueryOptions) -> Vec<&Movie> {
        let (skip, take) = options.window();
        self.movies
            .iter()
            .filter(|movie| matches(movie, spec))
            .skip(skip)
            .take(take)
            .collect()
    }

    /// Window over the whole collection.
    pub fn query_by_options_only(&self, options: QueryOptions) -> Vec<&Movie> {
        self.query_by_spec(&MovieMatch::any(), options)
    }

    pub fn count(&self, spec: &MovieMatch) -> usize {
        self.movies.iter().filter(|movie| matches(movie, spec)).count()
    }

    /// Exact, case-sensitive lookup. Blank ids are absent, not an error.
    pub fn query_by_id(&self, id: &str) -> Option<&Movie> {
        if id.trim().is_empty() {
            return None;
        }
        self.query_by_spec(&MovieMatch::with_isan(id), QueryOptions::with_limit(1))
            .into_iter()
            .next()
    }

    pub fn query_by_title(&self, title: &str, options: QueryOptions) -> Vec<&Movie> {
        self.query_by_spec(&MovieMatch::with_title(title), options)
    }

    pub fn count_by_title(&self, title: &str) -> usize {
        self.count(&MovieMatch::with_title(title))
    }

    pub fn query_by_filters(&self, filters: &[String], options: QueryOptions) -> Vec<&Movie> {
        self.query_by_spec(&MovieMatch::with_filters(filters.iter().cloned()), options)
    }

    pub fn count_by_filters(&self, filters: &[String]) -> usize {
        self.count(&MovieMatch::with_filters(filters.iter().cloned()))
    }

    /// Titles for the search box autosuggest. Blank input suggests nothing.
    pub fn suggest_titles(&self, prefix: &str, limit: usize) -> Vec<&str> {
        if prefix.trim().is_empty() {
            return Vec::new();
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_by_title(prefix, QueryOptions::with_limit(limit))
            .into_iter()
            .map(|movie| movie.title.as_str())
            .collect()
    }

    /// One page of search results with the page count.
    pub fn page(&self, spec: &MovieMatch, page_no: i64, per_page: i64) -> Result<ResultPage> {
        let per_page = page_size(per_page);
        let total = total_pages(self.count(spec) as i64, per_page);
        if page_no < 1 || page_no > total.max(1) {
            return Err(CoreError::OutOfBounds {
                current_page: page_no,
                total_pages: total,
            });
        }
        let movies = self
            .query_by_spec(spec, QueryOptions::for_page(page_no, per_page))
            .into_iter()
            .cloned()
            .collect();

        Ok(ResultPage {
            movies,
            current_page: page_no,
            total_pages: total,
        })
    }
}

/// A page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub movies: Vec<Movie>,
    pub current_page: i64,
    pub total_pages: i64,
}

fn catalog_unavailable(cause: String) -> CoreError {
    CoreError::CatalogUnavailable { cause }
}

/// Async front of the catalog: loads once, then answers queries.
///
/// Every query awaits the shared load, so concurrent callers never trigger
/// duplicate fetches. A failed load surfaces as
/// [`CoreError::CatalogUnavailable`] and is not retried automatically.
#[derive(Debug)]
pub struct CatalogService {
    resource: Resource<Catalog>,
}

impl CatalogService {
    pub fn new(source: impl DataSource<Catalog> + 'static) -> Self {
        CatalogService {
            resource: Resource::new("movies", source, catalog_unavailable),
        }
    }

    pub async fn catalog(&self) -> Result<Rc<Catalog>> {
        self.resource.get().await
    }

    pub async fn query_by_spec(&self, spec: &MovieMatch, options: QueryOptions) -> Result<Vec<Movie>> {
        let catalog = self.catalog().await?;
        Ok(owned(catalog.query_by_spec(spec, options)))
    }

    pub async fn query_by_options_only(&self, options: QueryOptions) -> Result<Vec<Movie>> {
        let catalog = self.catalog().await?;
        Ok(owned(catalog.query_by_options_only(options)))
    }

    pub async fn count(&self, spec: &MovieMatch) -> Result<usize> {
        Ok(self.catalog().await?.count(spec))
    }

    pub async fn query_by_title(&self, title: &str, options: QueryOptions) -> Result<Vec<Movie>> {
        let catalog = self.catalog().await?;
        Ok(owned(catalog.query_by_title(title, options)))
    }

    pub async fn count_by_title(&self, title: &str) -> Result<usize> {
        Ok(self.catalog().await?.count_by_title(title))
    }

    pub async fn query_by_filters(
        &self,
        filters: &[String],
        options: QueryOptions,
    ) -> Result<Vec<Movie>> {
        let catalog = self.catalog().await?;
        Ok(owned(catalog.query_by_filters(filters, options)))
    }

    pub async fn count_by_filters(&self, filters: &[String]) -> Result<usize> {
        Ok(self.catalog().await?.count_by_filters(filters))
    }

    /// Blank ids resolve to `None` without touching the data source.
    pub async fn query_by_id(&self, id: &str) -> Result<Option<Movie>> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.catalog().await?.query_by_id(id).cloned())
    }

    pub async fn suggest_titles(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let catalog = self.catalog().await?;
        Ok(catalog
            .suggest_titles(prefix, limit)
            .into_iter()
            .map(String::from)
            .collect())
    }

    pub async fn page(&self, spec: &MovieMatch, page_no: i64, per_page: i64) -> Result<ResultPage> {
        self.catalog().await?.page(spec, page_no, per_page)
    }
}

fn owned(movies: Vec<&Movie>) -> Vec<Movie> {
    movies.into_iter().cloned().collect()
}

// =============================================================================
// WASM Bindings
// =============================================================================

fn parse_spec(json: &str) -> Result<MovieMatch> {
    if json.trim().is_empty() {
        return Ok(MovieMatch::any());
    }
    serde_json::from_str(json).map_err(|e| CoreError::InvalidArgument(format!("match: {}", e)))
}

fn parse_options(json: &str, default_limit: i64) -> Result<QueryOptions> {
    if json.trim().is_empty() {
        return Ok(QueryOptions::with_limit(default_limit));
    }
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CoreError::InvalidArgument(format!("options: {}", e)))?;
    let mut options: QueryOptions = serde_json::from_value(value.clone())
        .map_err(|e| CoreError::InvalidArgument(format!("options: {}", e)))?;
    if value.get("limit").is_none() {
        options.limit = default_limit;
    }
    Ok(options)
}

/// WASM-exposed catalog. Queries take and return JSON strings and resolve
/// as Promises once the shared load has finished.
///
/// # Example
/// ```js
/// const catalog = new WasmCatalog((url) => fetch(url).then((r) => r.text()), "{}");
/// const movies = JSON.parse(await catalog.query('{"title":"incep"}', '{"limit":5}'));
/// ```
#[wasm_bindgen]
pub struct WasmCatalog {
    service: Rc<CatalogService>,
    config: Rc<CoreConfig>,
}

#[wasm_bindgen]
impl WasmCatalog {
    /// `fetch` is `(url) => Promise<string>`; `config_json` is a `CoreConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(fetch: js_sys::Function, config_json: &str) -> Result<WasmCatalog, JsValue> {
        let config = CoreConfig::from_json(config_json).map_err(crate::to_js)?;
        let source = JsonFetch::new(fetch, config.movies_url.clone());
        Ok(WasmCatalog {
            service: Rc::new(CatalogService::new(source)),
            config: Rc::new(config),
        })
    }

    /// Resolves to the number of movies once loaded.
    pub fn load(&self) -> js_sys::Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let catalog = service.catalog().await.map_err(crate::to_js)?;
            Ok(JsValue::from_f64(catalog.len() as f64))
        })
    }

    /// Resolves to a JSON array of movies matching `spec_json`.
    pub fn query(&self, spec_json: &str, options_json: &str) -> js_sys::Promise {
        let service = self.service.clone();
        let parsed = parse_spec(spec_json)
            .and_then(|spec| Ok((spec, parse_options(options_json, self.config.default_query_limit)?)));
        future_to_promise(async move {
            let (spec, options) = parsed.map_err(crate::to_js)?;
            let movies = service
                .query_by_spec(&spec, options)
                .await
                .map_err(crate::to_js)?;
            crate::json_value(&movies)
        })
    }

    /// Resolves to a JSON array windowed over the whole catalog.
    pub fn query_options_only(&self, options_json: &str) -> js_sys::Promise {
        let service = self.service.clone();
        let parsed = parse_options(options_json, self.config.default_query_limit);
        future_to_promise(async move {
            let options = parsed.map_err(crate::to_js)?;
            let movies = service
                .query_by_options_only(options)
                .await
                .map_err(crate::to_js)?;
            crate::json_value(&movies)
        })
    }

    /// Resolves to the number of matches for `spec_json`.
    pub fn count(&self, spec_json: &str) -> js_sys::Promise {
        let service = self.service.clone();
        let parsed = parse_spec(spec_json);
        future_to_promise(async move {
            let spec = parsed.map_err(crate::to_js)?;
            let count = service.count(&spec).await.map_err(crate::to_js)?;
            Ok(JsValue::from_f64(count as f64))
        })
    }

    /// Resolves to the movie JSON, or `null` when absent.
    pub fn query_by_id(&self, id: String) -> js_sys::Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            match service.query_by_id(&id).await.map_err(crate::to_js)? {
                Some(movie) => crate::json_value(&movie),
                None => Ok(JsValue::NULL),
            }
        })
    }

    /// Resolves to `{ movies, current_page, total_pages }` for a title search.
    pub fn search_titles(&self, title: String, page_no: u32) -> js_sys::Promise {
        let service = self.service.clone();
        let per_page = self.config.movies_per_page;
        future_to_promise(async move {
            let page = service
                .page(&MovieMatch::with_title(title.trim()), i64::from(page_no), per_page)
                .await
                .map_err(crate::to_js)?;
            crate::json_value(&page)
        })
    }

    /// Resolves to a JSON array of suggested titles.
    pub fn suggest(&self, prefix: String, limit: usize) -> js_sys::Promise {
        let service = self.service.clone();
        future_to_promise(async move {
            let titles = service
                .suggest_titles(&prefix, limit)
                .await
                .map_err(crate::to_js)?;
            crate::json_value(&titles)
        })
    }
}
