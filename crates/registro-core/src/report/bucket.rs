//! Calendar-day buckets for the access report.

use crate::session::EpochMillis;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;
use std::fmt;

pub const TODAY_LABEL: &str = "Oggi";
pub const YESTERDAY_LABEL: &str = "Ieri";

const MONTHS_IT: [&str; 12] = [
    "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
    "settembre", "ottobre", "novembre", "dicembre",
];

fn weekday_it(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunedì",
        Weekday::Tue => "martedì",
        Weekday::Wed => "mercoledì",
        Weekday::Thu => "giovedì",
        Weekday::Fri => "venerdì",
        Weekday::Sat => "sabato",
        Weekday::Sun => "domenica",
    }
}

/// Display grouping for one calendar day.
///
/// Two buckets are equal when they cover the same day, so every login of
/// that day lands in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub label: String,
}

impl Bucket {
    /// Assigns a login time to its bucket, relative to `now`.
    ///
    /// The calendar day is taken in the time zone of `now`.
    pub fn for_login<Tz: TimeZone>(login: EpochMillis, now: &DateTime<Tz>) -> Self {
        let login = DateTime::<Utc>::from_timestamp_millis(login)
            .unwrap_or_default()
            .with_timezone(&now.timezone());
        Self::for_date(login.date_naive(), now.date_naive())
    }

    /// Assigns a calendar day to its bucket, relative to `today`.
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        let label = if date == today {
            TODAY_LABEL.to_string()
        } else if today.pred_opt() == Some(date) {
            YESTERDAY_LABEL.to_string()
        } else {
            long_label(date, today)
        };
        Self { date, label }
    }

    pub fn is_today(&self) -> bool {
        self.label == TODAY_LABEL
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// "lunedì 12 ottobre", with the year when it differs from today's.
fn long_label(date: NaiveDate, today: NaiveDate) -> String {
    let month = MONTHS_IT[date.month0() as usize];
    let mut label = format!("{} {} {}", weekday_it(date.weekday()), date.day(), month);
    if date.year() != today.year() {
        label.push_str(&format!(" {}", date.year()));
    }
    label
}
