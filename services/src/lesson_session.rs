//! Per-class lesson state with lazy expiry.
//!
//! There is no background timer: an active lesson whose end time has passed is reset to
//! inactive the next time anything reads it through [`LessonSessionRegistry::get`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::ledger::LessonKey;

/// A running lesson for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveLesson {
    pub class: String,
    pub subject: String,
    /// Display name of the tutor who started it.
    pub tutor: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Registry-wide sequence number; every `start` gets a fresh one.
    pub occurrence: u64,
}

impl ActiveLesson {
    /// Identifier used to deduplicate marks within this lesson occurrence.
    pub fn key(&self) -> LessonKey {
        LessonKey::new(&self.subject, &self.class, self.occurrence)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.ends_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LessonSession {
    Inactive,
    Active(ActiveLesson),
}

impl LessonSession {
    pub fn is_active(&self) -> bool {
        matches!(self, LessonSession::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveLesson> {
        match self {
            LessonSession::Active(lesson) => Some(lesson),
            LessonSession::Inactive => None,
        }
    }

    pub fn into_active(self) -> Option<ActiveLesson> {
        match self {
            LessonSession::Active(lesson) => Some(lesson),
            LessonSession::Inactive => None,
        }
    }
}

/// Exactly one [`LessonSession`] per class label.
#[derive(Debug, Default)]
pub struct LessonSessionRegistry {
    sessions: HashMap<String, LessonSession>,
    occurrences: u64,
}

impl LessonSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an inactive session for each of `classes`.
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for class in classes {
            registry.ensure_class(class);
        }
        registry
    }

    /// Makes `class` known, leaving an existing session untouched.
    pub fn ensure_class(&mut self, class: impl Into<String>) {
        self.sessions
            .entry(class.into())
            .or_insert(LessonSession::Inactive);
    }

    /// Replaces whatever the class had with a lesson running `[now, now + duration]`.
    pub fn start(
        &mut self,
        class: &str,
        subject: &str,
        tutor: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> ActiveLesson {
        self.occurrences += 1;
        let lesson = ActiveLesson {
            class: class.to_string(),
            subject: subject.to_string(),
            tutor: tutor.to_string(),
            started_at: now,
            ends_at: now + duration,
            occurrence: self.occurrences,
        };
        if let Some(LessonSession::Active(previous)) = self
            .sessions
            .insert(class.to_string(), LessonSession::Active(lesson.clone()))
        {
            tracing::debug!(
                class,
                previous_subject = %previous.subject,
                subject,
                "Lesson start overwrote a running lesson"
            );
        }
        lesson
    }

    /// Sets the class inactive and returns the lesson that was running, if any.
    pub fn stop(&mut self, class: &str) -> Option<ActiveLesson> {
        self.sessions
            .insert(class.to_string(), LessonSession::Inactive)
            .and_then(LessonSession::into_active)
    }

    /// Current session for `class` after applying lazy expiry. Unknown classes read as inactive.
    pub fn get(&mut self, class: &str, now: DateTime<Utc>) -> LessonSession {
        let Some(session) = self.sessions.get_mut(class) else {
            return LessonSession::Inactive;
        };
        if let LessonSession::Active(lesson) = session {
            if lesson.is_expired_at(now) {
                tracing::info!(class, subject = %lesson.subject, "Lesson expired");
                *session = LessonSession::Inactive;
            }
        }
        session.clone()
    }

    /// Shorthand for the running lesson of `class`, with lazy expiry applied.
    pub fn active(&mut self, class: &str, now: DateTime<Utc>) -> Option<ActiveLesson> {
        self.get(class, now).into_active()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }
}
