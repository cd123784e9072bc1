//! Grouping of session records into the access report.
//!
//! The report is a two-level structure: calendar-day bucket, then student,
//! then that student's sessions of the day. Buckets and students keep the
//! order in which they first appear in the input, so a recency-ordered input
//! yields a recency-ordered report.

use super::bucket::Bucket;
use super::duration::format_duration;
use crate::session::{EpochMillis, SessionRecord};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// The sessions of one student within one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentGroup {
    pub student_id: String,
    /// In input order
    pub sessions: Vec<SessionRecord>,
    /// Sum of member durations; malformed members count as zero
    pub total_duration_ms: i64,
    pub live_count: usize,
}

impl StudentGroup {
    fn new(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            sessions: Vec::new(),
            total_duration_ms: 0,
            live_count: 0,
        }
    }

    fn push(&mut self, session: &SessionRecord, now_ms: EpochMillis) {
        self.total_duration_ms = self
            .total_duration_ms
            .saturating_add(session.elapsed_ms(now_ms).max(0));
        if session.is_live() {
            self.live_count += 1;
        }
        self.sessions.push(session.clone());
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_live(&self) -> bool {
        self.live_count > 0
    }

    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.iter().map(|s| s.session_id.as_str())
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.total_duration_ms)
    }
}

/// All student groups of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketGroup {
    pub bucket: Bucket,
    pub students: Vec<StudentGroup>,
}

impl BucketGroup {
    pub fn student(&self, student_id: &str) -> Option<&StudentGroup> {
        self.students.iter().find(|g| g.student_id == student_id)
    }

    pub fn session_count(&self) -> usize {
        self.students.iter().map(StudentGroup::session_count).sum()
    }
}

/// Headline figures over the whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub sessions: usize,
    pub live_sessions: usize,
    pub students: usize,
    pub total_duration_ms: i64,
}

/// Sessions grouped by bucket and student, with per-group aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub buckets: Vec<BucketGroup>,
    /// Instant the live durations were measured at
    pub measured_at: EpochMillis,
}

impl SessionReport {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, label: &str) -> Option<&BucketGroup> {
        self.buckets.iter().find(|b| b.bucket.label == label)
    }

    /// Looks up the (bucket, student) group.
    pub fn group(&self, label: &str, student_id: &str) -> Option<&StudentGroup> {
        self.bucket(label).and_then(|b| b.student(student_id))
    }

    /// Concatenates every group back into one sequence.
    pub fn flatten(&self) -> Vec<&SessionRecord> {
        self.buckets
            .iter()
            .flat_map(|b| b.students.iter())
            .flat_map(|g| g.sessions.iter())
            .collect()
    }

    pub fn totals(&self) -> ReportTotals {
        let mut students = BTreeSet::new();
        let mut totals = ReportTotals::default();
        for group in self.buckets.iter().flat_map(|b| b.students.iter()) {
            students.insert(group.student_id.as_str());
            totals.sessions += group.session_count();
            totals.live_sessions += group.live_count;
            totals.total_duration_ms = totals
                .total_duration_ms
                .saturating_add(group.total_duration_ms);
        }
        totals.students = students.len();
        totals
    }
}

/// Groups sessions by calendar day and student.
///
/// Pure: identical input and `now` always yield an identical report.
/// Live sessions are measured against `now`.
pub fn aggregate<Tz: TimeZone>(sessions: &[SessionRecord], now: &DateTime<Tz>) -> SessionReport {
    let now_ms = now.timestamp_millis();
    let mut buckets: Vec<BucketGroup> = Vec::new();
    let mut bucket_index: HashMap<Bucket, usize> = HashMap::new();

    for session in sessions {
        let bucket = Bucket::for_login(session.login_timestamp, now);
        let b = *bucket_index.entry(bucket.clone()).or_insert_with(|| {
            buckets.push(BucketGroup {
                bucket,
                students: Vec::new(),
            });
            buckets.len() - 1
        });

        let students = &mut buckets[b].students;
        let s = match students
            .iter()
            .position(|g| g.student_id == session.student_id)
        {
            Some(s) => s,
            None => {
                students.push(StudentGroup::new(&session.student_id));
                students.len() - 1
            }
        };
        students[s].push(session, now_ms);
    }

    SessionReport {
        buckets,
        measured_at: now_ms,
    }
}
