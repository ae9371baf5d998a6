use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// Spellings used across backend versions, first present wins
const TITLE_FIELDS: &[&str] = &["title", "name", "event_name"];
const VENUE_FIELDS: &[&str] = &["venue", "location"];
const START_DATE_FIELDS: &[&str] = &["start_date", "date", "event_date", "startDate"];
const END_DATE_FIELDS: &[&str] = &["end_date", "endDate"];

/// An event as shown on the participant dashboard
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Event {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub image: Option<String>,
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Event::from_fields(&fields))
    }
}

impl Event {
    /// Build from a raw record. A record may carry several spellings of the
    /// same field; the first non-empty one in each list is used.
    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            // Ids arrive as numbers from the admin API and as strings from
            // the participant API
            id: pick(fields, &["id"]),
            title: pick(fields, TITLE_FIELDS).unwrap_or_default(),
            description: pick(fields, &["description"]),
            venue: pick(fields, VENUE_FIELDS),
            start_date: pick(fields, START_DATE_FIELDS),
            end_date: pick(fields, END_DATE_FIELDS),
            image: pick(fields, &["image"]),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled event)"
        } else {
            &self.title
        }
    }

    /// Start date as "Feb 06, 2026"
    pub fn formatted_date(&self) -> String {
        match &self.start_date {
            Some(date) => match parse_date(date) {
                Some(d) => d.format("%b %d, %Y").to_string(),
                // Fall back to raw date string, truncate if too long
                None => date.chars().take(16).collect(),
            },
            None => "TBD".to_string(),
        }
    }

    pub fn start_day(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_date)
    }

    /// Events without a parseable date count as upcoming
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start_day().map(|d| d >= today).unwrap_or(true)
    }
}

/// Accepts "2026-02-06", "2026-02-06T19:00:00" and RFC 3339 timestamps
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn pick(fields: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|name| match fields.get(*name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Order events by start date, undated ones last
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| match (a.start_day(), b.start_day()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
}
