use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

pub const MAX_POSITION: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum DurationBucket {
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "3years")]
    ThreeYears,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 4] = [
        DurationBucket::ThreeMonths,
        DurationBucket::SixMonths,
        DurationBucket::OneYear,
        DurationBucket::ThreeYears,
    ];

    pub fn ceiling_days(self) -> i64 {
        match self {
            DurationBucket::ThreeMonths => 90,
            DurationBucket::SixMonths => 180,
            DurationBucket::OneYear => 365,
            DurationBucket::ThreeYears => 1095,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationBucket::ThreeMonths => "3months",
            DurationBucket::SixMonths => "6months",
            DurationBucket::OneYear => "1year",
            DurationBucket::ThreeYears => "3years",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::ThreeMonths => "3 Months",
            DurationBucket::SixMonths => "6 Months",
            DurationBucket::OneYear => "1 Year",
            DurationBucket::ThreeYears => "3 Years",
        }
    }
}

impl Default for DurationBucket {
    fn default() -> DurationBucket {
        DurationBucket::ThreeMonths
    }
}

impl Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationBucket {
    type Err = DurationBucketParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationBucket::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| DurationBucketParseError(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DurationBucketParseError(pub String);

impl Display for DurationBucketParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for DurationBucketParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Marker {
    Now,
    Quarter,
    Half,
    ThreeQuarters,
    Oldest,
}

impl Marker {
    pub const ALL: [Marker; 5] = [
        Marker::Now,
        Marker::Quarter,
        Marker::Half,
        Marker::ThreeQuarters,
        Marker::Oldest,
    ];

    pub fn position(self) -> u8 {
        match self {
            Marker::Now => 0,
            Marker::Quarter => 25,
            Marker::Half => 50,
            Marker::ThreeQuarters => 75,
            Marker::Oldest => MAX_POSITION,
        }
    }
}

pub fn days_ago(bucket: DurationBucket, position: u8) -> i64 {
    let position = f64::from(position.min(MAX_POSITION));
    (position / f64::from(MAX_POSITION) * bucket.ceiling_days() as f64).round() as i64
}

pub fn display_date(today: NaiveDate, days_ago: i64) -> String {
    if days_ago == 0 {
        return "Today".to_string();
    }

    (today - Duration::days(days_ago))
        .format("%b %-d, %Y")
        .to_string()
}

pub struct TimelineSelection {
    duration: DurationBucket,
    position: u8,
    on_time_change: Box<dyn FnMut(i64)>,
    on_collapse: Option<Box<dyn FnMut()>>,
}

impl TimelineSelection {
    pub fn new(on_time_change: impl FnMut(i64) + 'static) -> TimelineSelection {
        TimelineSelection {
            duration: DurationBucket::default(),
            position: 0,
            on_time_change: Box::new(on_time_change),
            on_collapse: None,
        }
    }

    pub fn with_on_collapse(mut self, on_collapse: impl FnMut() + 'static) -> TimelineSelection {
        self.on_collapse = Some(Box::new(on_collapse));
        self
    }

    pub fn duration(&self) -> DurationBucket {
        self.duration
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    // switching windows always jumps back to "now"
    pub fn set_duration(&mut self, duration: DurationBucket) {
        self.duration = duration;
        self.position = 0;
        self.notify();
    }

    pub fn set_position(&mut self, position: u8) {
        self.position = position.min(MAX_POSITION);
        self.notify();
    }

    pub fn select_marker(&mut self, marker: Marker) {
        self.set_position(marker.position());
    }

    pub fn collapse(&mut self) {
        if let Some(on_collapse) = self.on_collapse.as_mut() {
            on_collapse();
        }
    }

    pub fn days_ago(&self) -> i64 {
        days_ago(self.duration, self.position)
    }

    pub fn display_date(&self, today: NaiveDate) -> String {
        display_date(today, self.days_ago())
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days_ago())
    }

    fn notify(&mut self) {
        let days_ago = self.days_ago();
        trace!(
            duration = %self.duration,
            position = self.position,
            days_ago,
            "timeline changed"
        );
        (self.on_time_change)(days_ago);
    }
}

impl Debug for TimelineSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("TimelineSelection")
            .field("duration", &self.duration)
            .field("position", &self.position)
            .finish()
    }
}
