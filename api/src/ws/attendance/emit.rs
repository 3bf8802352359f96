use serde::Serialize;
use services::LiveUpdate;
use util::ws::WebSocketManager;

use super::{payload, topics};
use crate::ws::core::{envelope, event::Event};

#[derive(Debug, Serialize)]
pub struct TokenIssuedEvent {
    #[serde(flatten)]
    pub payload: payload::TokenIssued,
}
impl Event for TokenIssuedEvent {
    const NAME: &'static str = "token.issued";
    fn topic_path(&self) -> String {
        topics::trainee_topic(&self.payload.trainee)
    }
}

#[derive(Debug, Serialize)]
pub struct LessonActivatedEvent {
    #[serde(flatten)]
    pub payload: payload::LessonActivated,
}
impl Event for LessonActivatedEvent {
    const NAME: &'static str = "lesson.activated";
    fn topic_path(&self) -> String {
        topics::class_topic(&self.payload.class)
    }
}

#[derive(Debug, Serialize)]
pub struct LessonStoppedEvent {
    #[serde(flatten)]
    pub payload: payload::LessonStopped,
}
impl Event for LessonStoppedEvent {
    const NAME: &'static str = "lesson.stopped";
    fn topic_path(&self) -> String {
        topics::class_topic(&self.payload.class)
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceMarkedEvent {
    #[serde(flatten)]
    pub payload: payload::AttendanceMarked,
}
impl Event for AttendanceMarkedEvent {
    const NAME: &'static str = "attendance.marked";
    fn topic_path(&self) -> String {
        topics::class_topic(&self.payload.class)
    }
}

/* ---------- one-liner helpers ---------- */

pub async fn token_issued(ws: &WebSocketManager, p: payload::TokenIssued) -> usize {
    envelope::emit(ws, &TokenIssuedEvent { payload: p }).await
}

pub async fn lesson_activated(ws: &WebSocketManager, p: payload::LessonActivated) -> usize {
    envelope::emit(ws, &LessonActivatedEvent { payload: p }).await
}

pub async fn lesson_stopped(ws: &WebSocketManager, p: payload::LessonStopped) -> usize {
    envelope::emit(ws, &LessonStoppedEvent { payload: p }).await
}

pub async fn attendance_marked(ws: &WebSocketManager, p: payload::AttendanceMarked) -> usize {
    envelope::emit(ws, &AttendanceMarkedEvent { payload: p }).await
}

/// Delivers one committed state change to its WebSocket topic.
pub async fn deliver(ws: &WebSocketManager, update: LiveUpdate) -> usize {
    match update {
        LiveUpdate::TokenIssued {
            trainee,
            token,
            expires_at,
        } => {
            token_issued(
                ws,
                payload::TokenIssued {
                    trainee,
                    token,
                    expires_at: expires_at.to_rfc3339(),
                },
            )
            .await
        }
        LiveUpdate::LessonActivated {
            class,
            subject,
            tutor,
            ends_at,
        } => {
            lesson_activated(
                ws,
                payload::LessonActivated {
                    class,
                    subject,
                    tutor,
                    ends_at: ends_at.to_rfc3339(),
                },
            )
            .await
        }
        LiveUpdate::LessonStopped { class, subject } => {
            lesson_stopped(ws, payload::LessonStopped { class, subject }).await
        }
        LiveUpdate::AttendanceMarked {
            class,
            trainee,
            trainee_name,
            subject,
            status,
            percentage,
        } => {
            attendance_marked(
                ws,
                payload::AttendanceMarked {
                    class,
                    trainee,
                    trainee_name,
                    subject,
                    status: status.to_string(),
                    percentage,
                },
            )
            .await
        }
    }
}
