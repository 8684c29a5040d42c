// Data model shared by the catalog, matcher and carousel.
// Records are immutable once loaded; queries only produce views.

use serde::{Deserialize, Serialize};

/// One playable rendition of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VideoSource {
    /// Quality label shown in the quality menu ("HD", "SD", ...).
    pub quality: String,
    /// MIME type, e.g. `video/mp4`.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub src: String,
}

/// Movie record as served by the mock data file.
///
/// `isan` is the unique identifier. Uniqueness is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub title: String,
    pub description: String,
    pub isan: String,
    pub imdb_id: String,
    pub img_src: String,
    pub quality: String,
    pub actors: Vec<String>,
    pub countries: Vec<String>,
    pub directors: Vec<String>,
    pub genres: Vec<String>,
    pub filters: Vec<String>,
    /// Runtime in minutes.
    pub duration: u32,
    pub release_year: u32,
    pub video_src: Vec<VideoSource>,
}

/// Partial movie used as a query. Present fields are ANDed together.
///
/// String-array fields mean "the record must contain every listed value".
/// Image path and video sources are not matchable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MovieMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u32>,
}

impl MovieMatch {
    /// Matches every record.
    pub fn any() -> Self {
        MovieMatch::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        MovieMatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_filters<S: Into<String>>(filters: impl IntoIterator<Item = S>) -> Self {
        MovieMatch {
            filters: Some(filters.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_isan(isan: impl Into<String>) -> Self {
        MovieMatch {
            isan: Some(isan.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == MovieMatch::default()
    }
}

/// Hero carousel slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_link: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_parses_camel_case_with_missing_fields() {
        let json = r#"{
            "title": "Inception",
            "isan": "0000-0001",
            "imdbId": "tt1375666",
            "genres": ["Action", "Sci-Fi"],
            "releaseYear": 2010,
            "videoSrc": [{ "quality": "HD", "type": "video/mp4", "src": "a.mp4" }]
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.imdb_id, "tt1375666");
        assert_eq!(movie.release_year, 2010);
        assert_eq!(movie.video_src[0].mime_type, "video/mp4");
        assert!(movie.actors.is_empty());
    }

    #[test]
    fn movie_match_rejects_unknown_fields() {
        let result: std::result::Result<MovieMatch, _> =
            serde_json::from_str(r#"{ "imgSrc": "x.png" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn movie_match_rejects_wrong_field_type() {
        let result: std::result::Result<MovieMatch, _> =
            serde_json::from_str(r#"{ "title": 42 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_match_is_empty() {
        assert!(MovieMatch::any().is_empty());
        assert!(!MovieMatch::with_title("").is_empty());
    }
}
