use serde::Deserialize;
use services::AttendanceService;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;

use super::payload::{LessonState, TokenState};

/// Client frames understood on attendance channels. `{"type":"ping"}` is answered by
/// the serve loop before it gets here.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttendanceIncoming {
    /// Ask for the current state of the channel.
    Sync,
}

/// Private trainee channel. `sync` replies with the live token, if any.
pub struct TraineeWsHandler {
    pub attendance: AttendanceService,
    pub trainee: String,
}

impl WsHandler for TraineeWsHandler {
    type In = AttendanceIncoming;

    async fn on_message(&self, ctx: &WsContext, msg: Self::In) {
        match msg {
            AttendanceIncoming::Sync => {
                let token = self
                    .attendance
                    .latest_token(&self.trainee)
                    .await
                    .ok()
                    .flatten();
                let state = TokenState {
                    token: token.as_ref().map(|t| t.value.clone()),
                    expires_at: token.as_ref().map(|t| t.expires_at.to_rfc3339()),
                };
                reply(ctx, "token.state", &state).await;
            }
        }
    }
}

/// Shared class channel. `sync` replies with the lesson state.
pub struct ClassWsHandler {
    pub attendance: AttendanceService,
    pub class: String,
}

impl WsHandler for ClassWsHandler {
    type In = AttendanceIncoming;

    async fn on_message(&self, ctx: &WsContext, msg: Self::In) {
        match msg {
            AttendanceIncoming::Sync => {
                let lesson = self.attendance.class_lesson(&self.class).await;
                let state = LessonState {
                    class: self.class.clone(),
                    active: lesson.is_some(),
                    subject: lesson.as_ref().map(|l| l.subject.clone()),
                    tutor: lesson.as_ref().map(|l| l.tutor.clone()),
                    ends_at: lesson.as_ref().map(|l| l.ends_at.to_rfc3339()),
                };
                reply(ctx, "lesson.state", &state).await;
            }
        }
    }
}

/// Sends an enveloped event to this client only.
async fn reply<T: serde::Serialize>(ctx: &WsContext, event: &str, payload: &T) {
    if ctx.reply_event(event, payload).await.is_err() {
        tracing::debug!(topic = %ctx.topic, "Client went away before reply");
    }
}
