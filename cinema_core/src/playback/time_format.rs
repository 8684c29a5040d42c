// Three interchangeable readings of playback time: milliseconds, percent, clock.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a time is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFormat {
    Milliseconds,
    Percentage,
    HourMinSec,
}

/// Which end of the timeline is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePoint {
    Current,
    Total,
}

/// A time sampled in one [`TimeFormat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TimeReading {
    Number(f64),
    Clock(String),
}

impl TimeReading {
    /// Numeric value; clock strings read as 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            TimeReading::Number(value) => *value,
            TimeReading::Clock(_) => 0.0,
        }
    }
}

impl fmt::Display for TimeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeReading::Number(value) => write!(f, "{}", value),
            TimeReading::Clock(text) => f.write_str(text),
        }
    }
}

/// Read `point` in `format` from a playhead and duration given in seconds.
///
/// An unknown (`NaN`) or zero duration reads as 0 ms, 0 % and `00:00`.
/// The total in percent is always 100.
pub fn represent(format: TimeFormat, point: TimePoint, current_s: f64, duration_s: f64) -> TimeReading {
    let seconds = match point {
        TimePoint::Current => current_s,
        TimePoint::Total => duration_s,
    };

    match format {
        TimeFormat::Milliseconds => TimeReading::Number(finite_or_zero(seconds) * 1000.0),
        TimeFormat::Percentage => match point {
            TimePoint::Total => TimeReading::Number(100.0),
            TimePoint::Current if duration_s > 0.0 && duration_s.is_finite() => {
                TimeReading::Number(finite_or_zero(current_s) * 100.0 / duration_s)
            }
            TimePoint::Current => TimeReading::Number(0.0),
        },
        TimeFormat::HourMinSec => TimeReading::Clock(clock(seconds)),
    }
}

/// `MM:SS`, or `HH:MM:SS` once the hour is non-zero. Each segment is padded
/// to two digits.
pub fn clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clock_omits_zero_hour() {
        assert_eq!(clock(0.0), "00:00");
        assert_eq!(clock(f64::NAN), "00:00");
        assert_eq!(clock(5.0), "00:05");
        assert_eq!(clock(65.9), "01:05");
        assert_eq!(clock(3599.0), "59:59");
    }

    #[test]
    fn clock_shows_hour_when_present() {
        assert_eq!(clock(3600.0), "01:00:00");
        assert_eq!(clock(3723.0), "01:02:03");
        assert_eq!(clock(36_000.0), "10:00:00");
    }

    #[test]
    fn milliseconds() {
        let current = represent(TimeFormat::Milliseconds, TimePoint::Current, 1.5, 10.0);
        let total = represent(TimeFormat::Milliseconds, TimePoint::Total, 1.5, 10.0);
        assert_eq!(current, TimeReading::Number(1500.0));
        assert_eq!(total, TimeReading::Number(10_000.0));
        assert_eq!(
            represent(TimeFormat::Milliseconds, TimePoint::Total, 0.0, f64::NAN),
            TimeReading::Number(0.0)
        );
    }

    #[test]
    fn percentage() {
        assert_eq!(
            represent(TimeFormat::Percentage, TimePoint::Current, 25.0, 100.0),
            TimeReading::Number(25.0)
        );
        assert_eq!(
            represent(TimeFormat::Percentage, TimePoint::Total, 25.0, 100.0),
            TimeReading::Number(100.0)
        );
        assert_eq!(
            represent(TimeFormat::Percentage, TimePoint::Current, 25.0, f64::NAN),
            TimeReading::Number(0.0)
        );
    }

    #[test]
    fn hour_min_sec() {
        assert_eq!(
            represent(TimeFormat::HourMinSec, TimePoint::Total, 0.0, 5400.0).to_string(),
            "01:30:00"
        );
        assert_eq!(
            represent(TimeFormat::HourMinSec, TimePoint::Current, 90.0, 5400.0).to_string(),
            "01:30"
        );
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn clock_segments_are_two_digits(seconds in 0.0f64..359_999.0) {
                let text = clock(seconds);
                let segments: Vec<&str> = text.split(':').collect();
                prop_assert!(segments.len() == 2 || segments.len() == 3);
                for segment in &segments {
                    prop_assert_eq!(segment.len(), 2);
                }
                if segments.len() == 3 {
                    prop_assert_ne!(segments[0], "00");
                }
            }

            #[test]
            fn percentage_stays_in_range(duration in 0.001f64..100_000.0, ratio in 0.0f64..=1.0) {
                let value = represent(TimeFormat::Percentage, TimePoint::Current, duration * ratio, duration)
                    .as_f64();
                prop_assert!((0.0..=100.0 + 1e-9).contains(&value));
            }
        }
    }
}
