//! Lesson, token and attendance state for the classroom tracker.
//!
//! The pure components (`LessonSessionRegistry`, `TokenIssuer`, `DeviceFingerprint`,
//! `AttendanceLedger`, `Roster`) take explicit timestamps and own no I/O. The
//! [`AttendanceService`] facade puts them behind one lock, talks to the account
//! directory and hands committed changes to the [`LiveUpdateBus`].

pub mod attendance;
pub mod error;
pub mod fingerprint;
pub mod ledger;
pub mod lesson_session;
pub mod live;
pub mod roster;
pub mod token;

pub use attendance::{AttendanceService, ClassroomSettings, Clock, IssuedToken, TraineeOverview};
pub use error::{AttendanceError, AttendanceResult};
pub use fingerprint::{ClientMetadata, DeviceFingerprint};
pub use ledger::{
    AttendanceLedger, AttendanceStatus, DeviceMarkOutcome, HistoryEntry, LessonKey, MarkOutcome,
    SummaryRow,
};
pub use lesson_session::{ActiveLesson, LessonSession, LessonSessionRegistry};
pub use live::{Channel, LiveUpdate, LiveUpdateBus};
pub use roster::{Roster, TraineeProfile, TutorProfile};
pub use token::{Token, TokenCheck, TokenIssuer, TokenRejection};
