//! The shared classroom state and every operation the HTTP layer performs on it.
//!
//! All in-memory state sits behind a single mutex. Directory reads and writes happen
//! before the lock is taken, and live updates are published after it is released.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use db::models::account::{AccountKind, Model as Account, NewAccount, Role, SubjectClasses};
use sea_orm::{DatabaseConnection, SqlErr};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AttendanceError, AttendanceResult};
use crate::fingerprint::DeviceFingerprint;
use crate::ledger::{
    AttendanceLedger, AttendanceStatus, DeviceMarkOutcome, HistoryEntry, MarkOutcome, SummaryRow,
};
use crate::lesson_session::{ActiveLesson, LessonSession, LessonSessionRegistry};
use crate::live::LiveUpdateBus;
use crate::roster::{Roster, TraineeProfile, TutorProfile};
use crate::token::{Token, TokenCheck, TokenIssuer};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassroomSettings {
    pub token_validity: Duration,
    pub default_lesson: Duration,
}

impl ClassroomSettings {
    pub fn from_config() -> Self {
        Self {
            token_validity: util::config::token_validity(),
            default_lesson: util::config::lesson_duration(),
        }
    }
}

impl Default for ClassroomSettings {
    fn default() -> Self {
        Self {
            token_validity: Duration::minutes(30),
            default_lesson: Duration::minutes(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub username: String,
    pub name: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// What a trainee sees on their home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraineeOverview {
    pub username: String,
    pub full_name: String,
    pub class: String,
    pub assessment_number: String,
    /// Every known subject, 0 when never marked.
    pub percentages: BTreeMap<String, u8>,
    pub active_lesson: Option<ActiveLesson>,
}

struct Classroom {
    roster: Roster,
    lessons: LessonSessionRegistry,
    tokens: TokenIssuer,
    ledger: AttendanceLedger,
}

impl Classroom {
    fn tutor(&self, username: &str) -> AttendanceResult<&TutorProfile> {
        self.roster.tutor(username).ok_or_else(|| {
            AttendanceError::AuthorizationDenied("Only tutors can do this".to_string())
        })
    }

    fn trainee(&self, username: &str) -> AttendanceResult<&TraineeProfile> {
        self.roster
            .trainee(username)
            .ok_or_else(|| AttendanceError::UnknownTrainee(username.to_string()))
    }

    /// The running lesson of `class`, provided `tutor` teaches its subject there.
    fn taught_lesson(
        &mut self,
        tutor: &str,
        class: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<ActiveLesson> {
        let lesson = self
            .lessons
            .active(class, now)
            .ok_or_else(|| AttendanceError::NoActiveLesson {
                class: class.to_string(),
            })?;
        if !self.tutor(tutor)?.teaches(&lesson.subject, class) {
            return Err(AttendanceError::AuthorizationDenied(format!(
                "You do not teach {} to {class}",
                lesson.subject
            )));
        }
        Ok(lesson)
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    db: DatabaseConnection,
    state: Arc<Mutex<Classroom>>,
    /// Held from the uniqueness checks through the insert.
    registration: Arc<Mutex<()>>,
    bus: LiveUpdateBus,
    settings: ClassroomSettings,
    clock: Clock,
}

impl AttendanceService {
    /// Builds the in-memory roster from every account in the directory.
    pub async fn load(
        db: DatabaseConnection,
        bus: LiveUpdateBus,
        settings: ClassroomSettings,
    ) -> AttendanceResult<Self> {
        let accounts = Account::all(&db).await?;
        let roster = Roster::from_accounts(&accounts);
        let lessons = LessonSessionRegistry::with_classes(roster.classes().map(str::to_string));
        tracing::info!(
            accounts = accounts.len(),
            classes = roster.classes().count(),
            "Classroom state loaded"
        );

        Ok(Self {
            db,
            state: Arc::new(Mutex::new(Classroom {
                roster,
                lessons,
                tokens: TokenIssuer::new(settings.token_validity),
                ledger: AttendanceLedger::new(),
            })),
            registration: Arc::new(Mutex::new(())),
            bus,
            settings,
            clock: Arc::new(Utc::now),
        })
    }

    /// Replaces the wall clock, mainly for tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> ClassroomSettings {
        self.settings
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // --- accounts -------------------------------------------------------------

    pub async fn register(&self, mut account: NewAccount) -> AttendanceResult<Account> {
        account.username = account.username.trim().to_string();
        let username = account.username.clone();
        if username.is_empty() || account.password.is_empty() {
            return Err(AttendanceError::InvalidAccount(
                "Username and password are required".to_string(),
            ));
        }
        if account.full_name.trim().is_empty() {
            return Err(AttendanceError::InvalidAccount(
                "Full name is required".to_string(),
            ));
        }
        if let AccountKind::Trainee { class, .. } = &account.kind {
            if class.trim().is_empty() {
                return Err(AttendanceError::InvalidAccount(
                    "Trainees need a class".to_string(),
                ));
            }
        }

        let _registering = self.registration.lock().await;
        if Account::find_by_username(&self.db, &username).await?.is_some() {
            return Err(AttendanceError::DuplicateAccount(
                "Username already exists".to_string(),
            ));
        }
        if matches!(account.kind, AccountKind::Trainee { .. })
            && Account::find_by_display_name(&self.db, &account.full_name, Role::Trainee)
                .await?
                .is_some()
        {
            return Err(AttendanceError::DuplicateAccount(
                "A trainee with that name already exists".to_string(),
            ));
        }

        let saved = Account::create(&self.db, account)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AttendanceError::DuplicateAccount("Username already exists".to_string())
                }
                _ => AttendanceError::Directory(e),
            })?;

        let mut state = self.state.lock().await;
        if let Some(class) = state.roster.register(&saved) {
            state.lessons.ensure_class(class);
        }
        drop(state);

        tracing::info!(username = %saved.username, role = %saved.role, "Account registered");
        Ok(saved)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> AttendanceResult<Account> {
        match Account::find_by_username(&self.db, username).await? {
            Some(account) if account.verify_password(password) => Ok(account),
            _ => Err(AttendanceError::InvalidCredentials),
        }
    }

    // --- tutor ----------------------------------------------------------------

    pub async fn tutor_subjects(&self, tutor: &str) -> AttendanceResult<SubjectClasses> {
        Account::tutor_subjects(&self.db, tutor).await?.ok_or_else(|| {
            AttendanceError::AuthorizationDenied("Only tutors can do this".to_string())
        })
    }

    pub async fn lesson(&self, tutor: &str, class: &str) -> AttendanceResult<LessonSession> {
        let now = self.now();
        let mut state = self.state.lock().await;
        if !state.tutor(tutor)?.teaches_class(class) {
            return Err(AttendanceError::AuthorizationDenied(format!(
                "You do not teach {class}"
            )));
        }
        Ok(state.lessons.get(class, now))
    }

    /// Starts (or overwrites) the lesson of `class`. `duration` defaults to the configured length.
    pub async fn start_lesson(
        &self,
        tutor: &str,
        class: &str,
        subject: &str,
        duration: Option<Duration>,
    ) -> AttendanceResult<ActiveLesson> {
        let now = self.now();
        let duration = duration.unwrap_or(self.settings.default_lesson);

        let mut state = self.state.lock().await;
        let profile = state.tutor(tutor)?;
        if !profile.teaches(subject, class) {
            return Err(AttendanceError::AuthorizationDenied(format!(
                "You do not teach {subject} to {class}"
            )));
        }
        let tutor_name = profile.full_name.clone();
        state.lessons.ensure_class(class);
        let lesson = state.lessons.start(class, subject, &tutor_name, duration, now);
        drop(state);

        tracing::info!(class, subject, tutor, ends_at = %lesson.ends_at, "Lesson started");
        self.bus
            .publish_lesson_activated(class, subject, &tutor_name, lesson.ends_at);
        Ok(lesson)
    }

    pub async fn stop_lesson(&self, tutor: &str, class: &str) -> AttendanceResult<Option<ActiveLesson>> {
        let mut state = self.state.lock().await;
        if !state.tutor(tutor)?.teaches_class(class) {
            return Err(AttendanceError::AuthorizationDenied(format!(
                "You do not teach {class}"
            )));
        }
        let stopped = state.lessons.stop(class);
        drop(state);

        if let Some(lesson) = &stopped {
            tracing::info!(class, subject = %lesson.subject, tutor, "Lesson stopped");
            self.bus.publish_lesson_stopped(class, &lesson.subject);
        }
        Ok(stopped)
    }

    /// Issues a fresh token to every trainee of `class`, replacing older ones.
    pub async fn issue_tokens(&self, tutor: &str, class: &str) -> AttendanceResult<Vec<IssuedToken>> {
        let now = self.now();
        let mut state = self.state.lock().await;
        state.taught_lesson(tutor, class, now)?;

        let trainees = state.roster.trainees_in(class);
        let issued: Vec<IssuedToken> = trainees
            .into_iter()
            .map(|t| {
                let token = state.tokens.issue(&t.username, now);
                IssuedToken {
                    username: t.username,
                    name: t.full_name,
                    token: token.value,
                    expires_at: token.expires_at,
                }
            })
            .collect();
        drop(state);

        tracing::info!(class, tutor, count = issued.len(), "Tokens issued");
        for token in &issued {
            self.bus
                .publish_token(&token.username, &token.token, token.expires_at);
        }
        Ok(issued)
    }

    /// Tutor records a decision for one trainee in the running lesson. Returns the new percentage.
    pub async fn tutor_mark(
        &self,
        tutor: &str,
        class: &str,
        trainee: &str,
        status: AttendanceStatus,
    ) -> AttendanceResult<u8> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let lesson = state.taught_lesson(tutor, class, now)?;
        let profile = state
            .trainee(trainee)
            .ok()
            .filter(|t| t.class == class)
            .cloned()
            .ok_or_else(|| AttendanceError::UnknownTrainee(trainee.to_string()))?;

        let key = lesson.key();
        let outcome = match status {
            AttendanceStatus::Present => state.ledger.mark_present(&key, &profile, now),
            AttendanceStatus::Absent => state.ledger.mark_absent(&key, &profile, now),
        };
        drop(state);

        match outcome {
            MarkOutcome::Recorded { percentage } => {
                self.bus.publish_attendance(
                    class,
                    &profile.username,
                    &profile.full_name,
                    &lesson.subject,
                    status,
                    percentage,
                );
                Ok(percentage)
            }
            MarkOutcome::AlreadyMarked => Err(AttendanceError::AlreadyMarked {
                trainee: profile.full_name,
            }),
        }
    }

    /// Class summary for `subject`, one row per trainee the directory lists for `class`.
    pub async fn summary(
        &self,
        tutor: &str,
        class: &str,
        subject: &str,
    ) -> AttendanceResult<Vec<SummaryRow>> {
        let trainees: Vec<TraineeProfile> = Account::trainees_by_class(&self.db, class)
            .await?
            .into_iter()
            .map(|a| TraineeProfile {
                username: a.username,
                full_name: a.full_name,
                class: a.class,
                assessment_number: a.assessment_number,
            })
            .collect();

        let today = self.today();
        let state = self.state.lock().await;
        if !state.tutor(tutor)?.teaches(subject, class) {
            return Err(AttendanceError::AuthorizationDenied(format!(
                "You do not teach {subject} to {class}"
            )));
        }
        Ok(state.ledger.summary(&trainees, subject, today))
    }

    pub async fn history(
        &self,
        tutor: &str,
        subject: Option<&str>,
        class: Option<&str>,
    ) -> AttendanceResult<Vec<HistoryEntry>> {
        let state = self.state.lock().await;
        state.tutor(tutor)?;
        Ok(state.ledger.history(subject, class).cloned().collect())
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    // --- live channels --------------------------------------------------------

    /// Whether `username` may follow the shared channel of `class`: its trainees and the
    /// tutors who teach it.
    pub async fn can_follow_class(&self, username: &str, class: &str) -> bool {
        let state = self.state.lock().await;
        state.roster.trainee(username).is_some_and(|t| t.class == class)
            || state.roster.tutor(username).is_some_and(|t| t.teaches_class(class))
    }

    /// Running lesson of `class`, with lazy expiry applied. No authorization.
    pub async fn class_lesson(&self, class: &str) -> Option<ActiveLesson> {
        let now = self.now();
        self.state.lock().await.lessons.active(class, now)
    }

    // --- trainee --------------------------------------------------------------

    pub async fn trainee_overview(&self, trainee: &str) -> AttendanceResult<TraineeOverview> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let profile = state.trainee(trainee)?.clone();
        let active_lesson = state.lessons.active(&profile.class, now);

        let mut percentages: BTreeMap<String, u8> =
            state.roster.subjects().map(|s| (s.to_string(), 0)).collect();
        percentages.extend(state.ledger.percentages_for(trainee));

        Ok(TraineeOverview {
            username: profile.username,
            full_name: profile.full_name,
            class: profile.class,
            assessment_number: profile.assessment_number,
            percentages,
            active_lesson,
        })
    }

    /// The trainee's live token, if any.
    pub async fn latest_token(&self, trainee: &str) -> AttendanceResult<Option<Token>> {
        let now = self.now();
        let state = self.state.lock().await;
        state.trainee(trainee)?;
        Ok(state.tokens.peek(trainee, now).cloned())
    }

    /// Checks and consumes the trainee's token.
    pub async fn submit_token(&self, trainee: &str, value: &str) -> AttendanceResult<()> {
        let now = self.now();
        let mut state = self.state.lock().await;
        state.trainee(trainee)?;
        match state.tokens.validate(trainee, value, now) {
            TokenCheck::Accepted => {
                tracing::info!(trainee, "Token accepted");
                Ok(())
            }
            TokenCheck::Rejected(reason) => {
                tracing::debug!(trainee, ?reason, "Token rejected");
                Err(AttendanceError::TokenRejected(reason))
            }
        }
    }

    pub async fn active_lesson_for(&self, trainee: &str) -> AttendanceResult<ActiveLesson> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let class = state.trainee(trainee)?.class.clone();
        state
            .lessons
            .active(&class, now)
            .ok_or(AttendanceError::NoActiveLesson { class })
    }

    /// One-tap present mark for the running lesson of the trainee's class.
    pub async fn mark_self_present(
        &self,
        trainee: &str,
        device: DeviceFingerprint,
    ) -> AttendanceResult<u8> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let profile = state.trainee(trainee)?.clone();
        let lesson = state
            .lessons
            .active(&profile.class, now)
            .ok_or_else(|| AttendanceError::NoActiveLesson {
                class: profile.class.clone(),
            })?;
        let outcome = state
            .ledger
            .mark_present_by_device(&lesson.key(), &profile, device, now);
        drop(state);

        match outcome {
            DeviceMarkOutcome::Recorded { percentage } => {
                tracing::info!(trainee, class = %profile.class, subject = %lesson.subject, %device, "Self-marked present");
                self.bus.publish_attendance(
                    &profile.class,
                    &profile.username,
                    &profile.full_name,
                    &lesson.subject,
                    AttendanceStatus::Present,
                    percentage,
                );
                Ok(percentage)
            }
            DeviceMarkOutcome::AlreadyMarkedDevice => {
                tracing::warn!(trainee, %device, "Device reuse blocked");
                Err(AttendanceError::DeviceAlreadyUsed)
            }
            DeviceMarkOutcome::AlreadyMarkedTrainee => Err(AttendanceError::AlreadyMarked {
                trainee: profile.full_name,
            }),
        }
    }
}
