// Query matcher: decides whether a movie satisfies a partial match field by field.
// Each field carries its own strategy; mismatched value types are unrepresentable.

use crate::types::{Movie, MovieMatch};

/// String fields compared by case-insensitive substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    ImdbId,
    Quality,
}

/// String-array fields compared by case-insensitive subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Actors,
    Countries,
    Directors,
    Genres,
    Filters,
}

/// Numeric fields compared by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    Duration,
    ReleaseYear,
}

/// A single field condition extracted from a [`MovieMatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion<'a> {
    /// Unique id: exact, case-sensitive.
    Isan(&'a str),
    Text(TextField, &'a str),
    Tags(TagField, &'a [String]),
    Number(NumberField, u32),
}

impl Movie {
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Description => &self.description,
            TextField::ImdbId => &self.imdb_id,
            TextField::Quality => &self.quality,
        }
    }

    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Actors => &self.actors,
            TagField::Countries => &self.countries,
            TagField::Directors => &self.directors,
            TagField::Genres => &self.genres,
            TagField::Filters => &self.filters,
        }
    }

    pub fn number(&self, field: NumberField) -> u32 {
        match field {
            NumberField::Duration => self.duration,
            NumberField::ReleaseYear => self.release_year,
        }
    }
}

impl MovieMatch {
    /// Conditions for every present field.
    pub fn criteria(&self) -> Vec<Criterion<'_>> {
        let mut criteria = Vec::new();

        if let Some(isan) = &self.isan {
            criteria.push(Criterion::Isan(isan));
        }

        let text = [
            (TextField::Title, &self.title),
            (TextField::Description, &self.description),
            (TextField::ImdbId, &self.imdb_id),
            (TextField::Quality, &self.quality),
        ];
        for (field, value) in text {
            if let Some(value) = value {
                criteria.push(Criterion::Text(field, value));
            }
        }

        let tags = [
            (TagField::Actors, &self.actors),
            (TagField::Countries, &self.countries),
            (TagField::Directors, &self.directors),
            (TagField::Genres, &self.genres),
            (TagField::Filters, &self.filters),
        ];
        for (field, value) in tags {
            if let Some(value) = value {
                criteria.push(Criterion::Tags(field, value));
            }
        }

        let numbers = [
            (NumberField::Duration, self.duration),
            (NumberField::ReleaseYear, self.release_year),
        ];
        for (field, value) in numbers {
            if let Some(value) = value {
                criteria.push(Criterion::Number(field, value));
            }
        }

        criteria
    }
}

/// Returns true if `movie` passes every present field of `spec`.
/// An empty spec matches every record.
pub fn matches(movie: &Movie, spec: &MovieMatch) -> bool {
    spec.criteria()
        .into_iter()
        .all(|criterion| satisfies(movie, criterion))
}

/// Check one condition against a record.
pub fn satisfies(movie: &Movie, criterion: Criterion<'_>) -> bool {
    match criterion {
        Criterion::Isan(id) => movie.isan == id,
        Criterion::Text(field, needle) => normalize(movie.text(field)).contains(&normalize(needle)),
        Criterion::Tags(field, wanted) => {
            let present: Vec<String> = movie.tags(field).iter().map(|t| normalize(t)).collect();
            wanted
                .iter()
                .all(|tag| present.contains(&normalize(tag)))
        }
        Criterion::Number(field, value) => movie.number(field) == value,
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}
