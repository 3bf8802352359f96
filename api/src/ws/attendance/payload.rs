use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TokenIssued {
    pub trainee: String,
    pub token: String,
    pub expires_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonActivated {
    pub class: String,
    pub subject: String,
    pub tutor: String,
    pub ends_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonStopped {
    pub class: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceMarked {
    pub class: String,
    pub trainee: String,
    pub trainee_name: String,
    pub subject: String,
    pub status: String,
    pub percentage: u8,
}

/// Reply to a `sync` request on a class channel.
#[derive(Debug, Clone, Serialize)]
pub struct LessonState {
    pub class: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
}

/// Reply to a `sync` request on a trainee channel.
#[derive(Debug, Clone, Serialize)]
pub struct TokenState {
    pub token: Option<String>,
    pub expires_at: Option<String>,
}
