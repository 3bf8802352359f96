//! In-memory view of the account directory: who is in which class, who teaches what.

use db::models::account::{Model as Account, Role, SubjectClasses};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraineeProfile {
    pub username: String,
    pub full_name: String,
    pub class: String,
    pub assessment_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorProfile {
    pub username: String,
    pub full_name: String,
    pub subjects: SubjectClasses,
}

impl TutorProfile {
    pub fn teaches(&self, subject: &str, class: &str) -> bool {
        self.subjects
            .get(subject)
            .is_some_and(|classes| classes.iter().any(|c| c == class))
    }

    pub fn teaches_class(&self, class: &str) -> bool {
        self.subjects.values().flatten().any(|c| c == class)
    }
}

#[derive(Debug, Default)]
pub struct Roster {
    trainees: BTreeMap<String, TraineeProfile>,
    tutors: BTreeMap<String, TutorProfile>,
    classes: BTreeSet<String>,
    subjects: BTreeSet<String>,
}

impl Roster {
    pub fn from_accounts<'a, I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = &'a Account>,
    {
        let mut roster = Self::default();
        for account in accounts {
            roster.register(account);
        }
        roster
    }

    /// Adds or replaces the account. Returns the class label if it was not known before.
    pub fn register(&mut self, account: &Account) -> Option<String> {
        self.trainees.remove(&account.username);
        self.tutors.remove(&account.username);

        match account.role {
            Role::Trainee => {
                self.trainees.insert(
                    account.username.clone(),
                    TraineeProfile {
                        username: account.username.clone(),
                        full_name: account.full_name.clone(),
                        class: account.class.clone(),
                        assessment_number: account.assessment_number.clone(),
                    },
                );
                if !account.class.is_empty() && self.classes.insert(account.class.clone()) {
                    return Some(account.class.clone());
                }
                None
            }
            Role::Tutor => {
                let subjects = account.subject_map();
                self.subjects.extend(subjects.keys().cloned());
                self.tutors.insert(
                    account.username.clone(),
                    TutorProfile {
                        username: account.username.clone(),
                        full_name: account.full_name.clone(),
                        subjects,
                    },
                );
                None
            }
        }
    }

    pub fn trainee(&self, username: &str) -> Option<&TraineeProfile> {
        self.trainees.get(username)
    }

    pub fn tutor(&self, username: &str) -> Option<&TutorProfile> {
        self.tutors.get(username)
    }

    /// Trainees of `class`, ordered by display name.
    pub fn trainees_in(&self, class: &str) -> Vec<TraineeProfile> {
        let mut trainees: Vec<_> = self
            .trainees
            .values()
            .filter(|t| t.class == class)
            .cloned()
            .collect();
        trainees.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        trainees
    }

    /// Whether a different trainee already uses `full_name`.
    pub fn display_name_taken(&self, full_name: &str, except_username: &str) -> bool {
        self.trainees
            .values()
            .any(|t| t.full_name == full_name && t.username != except_username)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(String::as_str)
    }
}
