//! Attendance decisions, subject percentages and the append-only history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::fingerprint::DeviceFingerprint;
use crate::roster::TraineeProfile;

/// Percentage points added by each present mark.
pub const PRESENT_STEP: u8 = 5;
pub const MAX_PERCENTAGE: u8 = 100;

/// Identifies one lesson occurrence for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LessonKey {
    pub subject: String,
    pub class: String,
    pub occurrence: u64,
}

impl LessonKey {
    pub fn new(subject: &str, class: &str, occurrence: u64) -> Self {
        Self {
            subject: subject.to_string(),
            class: class.to_string(),
            occurrence,
        }
    }
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}#{}", self.subject, self.class, self.occurrence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => f.write_str("Present"),
            AttendanceStatus::Absent => f.write_str("Absent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Carries the trainee's subject percentage after the mark.
    Recorded { percentage: u8 },
    AlreadyMarked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMarkOutcome {
    Recorded { percentage: u8 },
    AlreadyMarkedTrainee,
    AlreadyMarkedDevice,
}

/// One immutable line of the attendance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub class: String,
    pub subject: String,
    pub trainee: String,
    pub trainee_name: String,
    pub assessment_number: String,
    pub status: AttendanceStatus,
    pub percentage: u8,
    pub recorded_at: DateTime<Utc>,
}

/// Per-trainee line of a class summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub username: String,
    pub name: String,
    pub assessment_number: String,
    pub percentage: u8,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Default)]
struct LessonMarks {
    trainees: HashSet<String>,
    devices: HashSet<DeviceFingerprint>,
}

#[derive(Debug, Default)]
pub struct AttendanceLedger {
    marks: HashMap<LessonKey, LessonMarks>,
    percentages: HashMap<String, HashMap<String, u8>>,
    statuses: HashMap<(String, String), AttendanceStatus>,
    history: Vec<HistoryEntry>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_present(
        &mut self,
        key: &LessonKey,
        trainee: &TraineeProfile,
        now: DateTime<Utc>,
    ) -> MarkOutcome {
        if self.is_marked(key, &trainee.username) {
            return MarkOutcome::AlreadyMarked;
        }
        let percentage = self.record(key, trainee, AttendanceStatus::Present, now);
        MarkOutcome::Recorded { percentage }
    }

    pub fn mark_absent(
        &mut self,
        key: &LessonKey,
        trainee: &TraineeProfile,
        now: DateTime<Utc>,
    ) -> MarkOutcome {
        if self.is_marked(key, &trainee.username) {
            return MarkOutcome::AlreadyMarked;
        }
        let percentage = self.record(key, trainee, AttendanceStatus::Absent, now);
        MarkOutcome::Recorded { percentage }
    }

    /// Present mark gated by device: a device marks at most one trainee per lesson occurrence.
    pub fn mark_present_by_device(
        &mut self,
        key: &LessonKey,
        trainee: &TraineeProfile,
        device: DeviceFingerprint,
        now: DateTime<Utc>,
    ) -> DeviceMarkOutcome {
        if self
            .marks
            .get(key)
            .is_some_and(|m| m.devices.contains(&device))
        {
            return DeviceMarkOutcome::AlreadyMarkedDevice;
        }
        if self.is_marked(key, &trainee.username) {
            return DeviceMarkOutcome::AlreadyMarkedTrainee;
        }
        let percentage = self.record(key, trainee, AttendanceStatus::Present, now);
        self.marks.entry(key.clone()).or_default().devices.insert(device);
        DeviceMarkOutcome::Recorded { percentage }
    }

    fn is_marked(&self, key: &LessonKey, username: &str) -> bool {
        self.marks
            .get(key)
            .is_some_and(|m| m.trainees.contains(username))
    }

    fn record(
        &mut self,
        key: &LessonKey,
        trainee: &TraineeProfile,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> u8 {
        let slot = self
            .percentages
            .entry(trainee.username.clone())
            .or_default()
            .entry(key.subject.clone())
            .or_insert(0);
        if status == AttendanceStatus::Present {
            *slot = slot.saturating_add(PRESENT_STEP).min(MAX_PERCENTAGE);
        }
        let percentage = *slot;

        self.statuses
            .insert((trainee.username.clone(), key.subject.clone()), status);
        self.marks
            .entry(key.clone())
            .or_default()
            .trainees
            .insert(trainee.username.clone());
        self.history.push(HistoryEntry {
            date: now.date_naive(),
            class: key.class.clone(),
            subject: key.subject.clone(),
            trainee: trainee.username.clone(),
            trainee_name: trainee.full_name.clone(),
            assessment_number: trainee.assessment_number.clone(),
            status,
            percentage,
            recorded_at: now,
        });

        tracing::debug!(lesson = %key, trainee = %trainee.username, %status, percentage, "Attendance recorded");
        percentage
    }

    /// History in append order, optionally filtered by exact subject and class.
    pub fn history<'a>(
        &'a self,
        subject: Option<&'a str>,
        class: Option<&'a str>,
    ) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.history.iter().filter(move |e| {
            subject.is_none_or(|s| e.subject == s) && class.is_none_or(|c| e.class == c)
        })
    }

    /// One row per given trainee, defaulting to 0% and Absent when never marked.
    pub fn summary<'a, I>(&self, trainees: I, subject: &str, today: NaiveDate) -> Vec<SummaryRow>
    where
        I: IntoIterator<Item = &'a TraineeProfile>,
    {
        trainees
            .into_iter()
            .map(|t| SummaryRow {
                username: t.username.clone(),
                name: t.full_name.clone(),
                assessment_number: t.assessment_number.clone(),
                percentage: self.percentage(&t.username, subject),
                date: today,
                status: self.status(&t.username, subject),
            })
            .collect()
    }

    pub fn percentage(&self, username: &str, subject: &str) -> u8 {
        self.percentages
            .get(username)
            .and_then(|by_subject| by_subject.get(subject))
            .copied()
            .unwrap_or(0)
    }

    /// Every subject the trainee has a percentage for.
    pub fn percentages_for(&self, username: &str) -> HashMap<String, u8> {
        self.percentages.get(username).cloned().unwrap_or_default()
    }

    pub fn status(&self, username: &str, subject: &str) -> AttendanceStatus {
        self.statuses
            .get(&(username.to_string(), subject.to_string()))
            .copied()
            .unwrap_or(AttendanceStatus::Absent)
    }
}
