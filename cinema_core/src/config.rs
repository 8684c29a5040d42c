// Core configuration passed from JS as JSON. Every field has a default.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Tunables for the catalog, filters, pagination and player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_movies_url")]
    pub movies_url: String,
    #[serde(default = "default_filters_url")]
    pub filters_url: String,
    #[serde(default = "default_heroes_url")]
    pub heroes_url: String,
    /// Window size used when a query gives no limit.
    #[serde(default = "default_query_limit")]
    pub default_query_limit: i64,
    #[serde(default = "default_movies_per_page")]
    pub movies_per_page: i64,
    /// Number of page links rendered by the paginator.
    #[serde(default = "default_pagination_window")]
    pub pagination_window: i64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u32,
    /// Idle time before the fullscreen controls hide.
    #[serde(default = "default_controller_hide_delay_ms")]
    pub controller_hide_delay_ms: u32,
    #[serde(default = "default_hero_rotation_ms")]
    pub hero_rotation_ms: u32,
    #[serde(default = "default_active_filters")]
    pub default_active_filters: Vec<String>,
    #[serde(default = "default_in_view_filters")]
    pub default_in_view_filters: Vec<String>,
    #[serde(default = "default_playback_rates")]
    pub playback_rates: Vec<f64>,
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidArgument(format!("invalid config: {}", e)))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            movies_url: default_movies_url(),
            filters_url: default_filters_url(),
            heroes_url: default_heroes_url(),
            default_query_limit: default_query_limit(),
            movies_per_page: default_movies_per_page(),
            pagination_window: default_pagination_window(),
            tick_interval_ms: default_tick_interval_ms(),
            controller_hide_delay_ms: default_controller_hide_delay_ms(),
            hero_rotation_ms: default_hero_rotation_ms(),
            default_active_filters: default_active_filters(),
            default_in_view_filters: default_in_view_filters(),
            playback_rates: default_playback_rates(),
        }
    }
}

fn default_movies_url() -> String {
    "assets/mock-data/movies.json".to_string()
}

fn default_filters_url() -> String {
    "assets/mock-data/movieGenres.json".to_string()
}

fn default_heroes_url() -> String {
    "assets/mock-data/heroes.json".to_string()
}

fn default_query_limit() -> i64 {
    10
}

fn default_movies_per_page() -> i64 {
    20
}

fn default_pagination_window() -> i64 {
    5
}

fn default_tick_interval_ms() -> u32 {
    25
}

fn default_controller_hide_delay_ms() -> u32 {
    3000
}

fn default_hero_rotation_ms() -> u32 {
    5000
}

fn default_active_filters() -> Vec<String> {
    vec!["Popular".to_string()]
}

fn default_in_view_filters() -> Vec<String> {
    ["Popular", "Television Series", "Movie", "New Release"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_playback_rates() -> Vec<f64> {
    vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.tick_interval_ms, 25);
        assert_eq!(config.default_active_filters, vec!["Popular"]);
    }

    #[test]
    fn overrides_single_field() {
        let config = CoreConfig::from_json(r#"{"movies_per_page": 12}"#).unwrap();
        assert_eq!(config.movies_per_page, 12);
        assert_eq!(config.pagination_window, 5);
    }

    #[test]
    fn invalid_json_is_invalid_argument() {
        let err = CoreConfig::from_json("{").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
}
