// Injected error logging. Callers decide how failures reach the user;
// the core itself never calls these.

use std::fmt::Display;

use wasm_bindgen::prelude::*;

const UNKNOWN_ERROR: &str = "An error occurred!";

/// Error-reporting capability handed to the UI layer.
pub trait ErrorLog {
    /// Report an error. `None` reports a generic message.
    fn error(&self, err: Option<&dyn Display>);
}

/// Routes errors to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn error(&self, err: Option<&dyn Display>) {
        match err {
            Some(err) => tracing::error!("{}", err),
            None => tracing::error!("{}", UNKNOWN_ERROR),
        }
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(message: &str);
}

/// Routes errors to the browser console.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog;

impl ErrorLog for ConsoleLog {
    fn error(&self, err: Option<&dyn Display>) {
        console_error(&message_for(err));
    }
}

/// Text logged for an error, with the generic fallback.
pub fn message_for(err: Option<&dyn Display>) -> String {
    err.map(|e| e.to_string())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::cell::RefCell;

    struct Recording(RefCell<Vec<String>>);

    impl ErrorLog for Recording {
        fn error(&self, err: Option<&dyn Display>) {
            self.0.borrow_mut().push(message_for(err));
        }
    }

    #[test]
    fn missing_error_uses_generic_message() {
        assert_eq!(message_for(None), "An error occurred!");
    }

    #[test]
    fn injected_log_receives_error_text() {
        let log = Recording(RefCell::new(Vec::new()));
        let err = CoreError::CatalogUnavailable {
            cause: "offline".to_string(),
        };
        log.error(Some(&err));
        log.error(None);
        assert_eq!(
            *log.0.borrow(),
            vec!["Failed to get movies".to_string(), UNKNOWN_ERROR.to_string()]
        );
    }

    #[test]
    fn tracing_log_accepts_both_forms() {
        TracingLog.error(Some(&"boom"));
        TracingLog.error(None);
    }
}
