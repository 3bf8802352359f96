//! Fire-and-forget notifications of committed state changes.
//!
//! The bus only enqueues; whoever holds the receiving end decides how (and whether)
//! updates reach connected clients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::ledger::AttendanceStatus;

/// Where an update is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Private channel of one trainee, by username.
    Trainee(String),
    /// Shared channel of a class.
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveUpdate {
    TokenIssued {
        trainee: String,
        token: String,
        expires_at: DateTime<Utc>,
    },
    LessonActivated {
        class: String,
        subject: String,
        tutor: String,
        ends_at: DateTime<Utc>,
    },
    LessonStopped {
        class: String,
        subject: String,
    },
    AttendanceMarked {
        class: String,
        trainee: String,
        trainee_name: String,
        subject: String,
        status: AttendanceStatus,
        percentage: u8,
    },
}

impl LiveUpdate {
    pub fn channel(&self) -> Channel {
        match self {
            LiveUpdate::TokenIssued { trainee, .. } => Channel::Trainee(trainee.clone()),
            LiveUpdate::LessonActivated { class, .. }
            | LiveUpdate::LessonStopped { class, .. }
            | LiveUpdate::AttendanceMarked { class, .. } => Channel::Class(class.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiveUpdateBus {
    tx: mpsc::UnboundedSender<LiveUpdate>,
}

impl LiveUpdateBus {
    /// A bus and the receiver its updates land on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LiveUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A bus whose updates go nowhere.
    pub fn disconnected() -> Self {
        Self::channel().0
    }

    pub fn publish(&self, update: LiveUpdate) {
        if self.tx.send(update).is_err() {
            tracing::debug!("Live update dropped: no receiver");
        }
    }

    pub fn publish_token(&self, trainee: &str, token: &str, expires_at: DateTime<Utc>) {
        self.publish(LiveUpdate::TokenIssued {
            trainee: trainee.to_string(),
            token: token.to_string(),
            expires_at,
        });
    }

    pub fn publish_lesson_activated(
        &self,
        class: &str,
        subject: &str,
        tutor: &str,
        ends_at: DateTime<Utc>,
    ) {
        self.publish(LiveUpdate::LessonActivated {
            class: class.to_string(),
            subject: subject.to_string(),
            tutor: tutor.to_string(),
            ends_at,
        });
    }

    pub fn publish_lesson_stopped(&self, class: &str, subject: &str) {
        self.publish(LiveUpdate::LessonStopped {
            class: class.to_string(),
            subject: subject.to_string(),
        });
    }

    pub fn publish_attendance(
        &self,
        class: &str,
        trainee: &str,
        trainee_name: &str,
        subject: &str,
        status: AttendanceStatus,
        percentage: u8,
    ) {
        self.publish(LiveUpdate::AttendanceMarked {
            class: class.to_string(),
            trainee: trainee.to_string(),
            trainee_name: trainee_name.to_string(),
            subject: subject.to_string(),
            status,
            percentage,
        });
    }
}
