// Deferred loading of static JSON resources (movies, filters, heroes).
// One outstanding fetch per resource; every waiter sees the same outcome.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{CoreError, FetchError, Result};

/// Asynchronous producer of a resource, e.g. an HTTP GET of a JSON file.
pub trait DataSource<T> {
    fn fetch(&self) -> LocalBoxFuture<'static, std::result::Result<T, FetchError>>;
}

type SharedLoad<T> = Shared<LocalBoxFuture<'static, std::result::Result<Rc<T>, FetchError>>>;

/// Memoized resource.
///
/// The first [`Resource::get`] starts the fetch; later and concurrent calls
/// await the same shared future. Failures are cached too and mapped into the
/// resource's error kind. Nothing is retried until [`Resource::invalidate`].
pub struct Resource<T> {
    name: &'static str,
    source: Box<dyn DataSource<T>>,
    on_failure: fn(String) -> CoreError,
    load: RefCell<Option<SharedLoad<T>>>,
}

impl<T: 'static> Resource<T> {
    pub fn new(
        name: &'static str,
        source: impl DataSource<T> + 'static,
        on_failure: fn(String) -> CoreError,
    ) -> Self {
        Resource {
            name,
            source: Box::new(source),
            on_failure,
            load: RefCell::new(None),
        }
    }

    /// Resolve the resource, starting the fetch if none is outstanding.
    pub fn get(&self) -> impl Future<Output = Result<Rc<T>>> + 'static {
        let load = self
            .load
            .borrow_mut()
            .get_or_insert_with(|| {
                tracing::debug!(resource = self.name, "starting fetch");
                self.source
                    .fetch()
                    .map(|result| result.map(Rc::new))
                    .boxed_local()
                    .shared()
            })
            .clone();
        let on_failure = self.on_failure;

        async move { load.await.map_err(|err| on_failure(err.0)) }
    }

    /// Already-resolved value, if the fetch finished successfully.
    pub fn peek(&self) -> Option<Rc<T>> {
        self.load
            .borrow()
            .as_ref()
            .and_then(|load| load.peek().cloned())
            .and_then(|result| result.ok())
    }

    /// Drop the memoized outcome so the next `get` fetches again.
    pub fn invalidate(&self) {
        self.load.borrow_mut().take();
    }
}

impl<T> std::fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("started", &self.load.borrow().is_some())
            .finish()
    }
}

/// In-memory source. Hands out clones of a fixed value.
#[derive(Debug, Clone)]
pub struct StaticSource<T>(pub T);

impl<T: Clone + 'static> DataSource<T> for StaticSource<T> {
    fn fetch(&self) -> LocalBoxFuture<'static, std::result::Result<T, FetchError>> {
        future::ready(Ok(self.0.clone())).boxed_local()
    }
}

/// Source backed by a JS function `(url) => Promise<string>` returning JSON text.
#[derive(Debug, Clone)]
pub struct JsonFetch {
    fetch: js_sys::Function,
    url: String,
}

impl JsonFetch {
    pub fn new(fetch: js_sys::Function, url: impl Into<String>) -> Self {
        JsonFetch {
            fetch,
            url: url.into(),
        }
    }
}

impl<T: DeserializeOwned + 'static> DataSource<T> for JsonFetch {
    fn fetch(&self) -> LocalBoxFuture<'static, std::result::Result<T, FetchError>> {
        let fetch = self.fetch.clone();
        let url = self.url.clone();

        async move {
            let promise = fetch
                .call1(&JsValue::NULL, &JsValue::from_str(&url))
                .map_err(js_failure)?
                .dyn_into::<js_sys::Promise>()
                .map_err(|_| FetchError(format!("fetch for {} did not return a Promise", url)))?;
            let body = JsFuture::from(promise).await.map_err(js_failure)?;
            let text = body
                .as_string()
                .ok_or_else(|| FetchError(format!("fetch for {} did not resolve to text", url)))?;
            Ok::<T, FetchError>(serde_json::from_str(&text)?)
        }
        .boxed_local()
    }
}

fn js_failure(value: JsValue) -> FetchError {
    FetchError(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    struct Counting {
        calls: Rc<Cell<u32>>,
        outcome: std::result::Result<Vec<u32>, FetchError>,
    }

    impl DataSource<Vec<u32>> for Counting {
        fn fetch(&self) -> LocalBoxFuture<'static, std::result::Result<Vec<u32>, FetchError>> {
            self.calls.set(self.calls.get() + 1);
            future::ready(self.outcome.clone()).boxed_local()
        }
    }

    fn catalog_failure(cause: String) -> CoreError {
        CoreError::CatalogUnavailable { cause }
    }

    #[test]
    fn concurrent_waiters_share_one_fetch() {
        let calls = Rc::new(Cell::new(0));
        let resource = Resource::new(
            "numbers",
            Counting {
                calls: calls.clone(),
                outcome: Ok(vec![1, 2, 3]),
            },
            catalog_failure,
        );

        let (a, b) = block_on(async { futures::join!(resource.get(), resource.get()) });
        assert_eq!(*a.unwrap(), vec![1, 2, 3]);
        assert_eq!(*b.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.get(), 1);

        block_on(resource.get()).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failure_is_shared_and_mapped() {
        let calls = Rc::new(Cell::new(0));
        let resource = Resource::new(
            "numbers",
            Counting {
                calls: calls.clone(),
                outcome: Err(FetchError("404 Not Found".to_string())),
            },
            catalog_failure,
        );

        let first = block_on(resource.get()).unwrap_err();
        let second = block_on(resource.get()).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "Failed to get movies");
        assert_eq!(first.cause(), Some("404 Not Found"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn invalidate_allows_explicit_retry() {
        let calls = Rc::new(Cell::new(0));
        let resource = Resource::new(
            "numbers",
            Counting {
                calls: calls.clone(),
                outcome: Ok(vec![7]),
            },
            catalog_failure,
        );

        assert!(resource.peek().is_none());
        block_on(resource.get()).unwrap();
        assert_eq!(resource.peek().as_deref(), Some(&vec![7]));

        resource.invalidate();
        assert!(resource.peek().is_none());
        block_on(resource.get()).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn static_source_clones_value() {
        let resource = Resource::new("static", StaticSource(vec![4u32]), catalog_failure);
        assert_eq!(*block_on(resource.get()).unwrap(), vec![4]);
    }
}
