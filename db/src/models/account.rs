use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, Set, sea_query::OnConflict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Subject name -> class labels a tutor teaches it to.
pub type SubjectClasses = BTreeMap<String, Vec<String>>;

/// One row of the `accounts` table: a trainee or a tutor.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Login name; stable identity for every piece of attendance state.
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    /// Display name shown to tutors and on exports.
    pub full_name: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    /// Class label (trainees only, empty for tutors).
    pub class: String,
    /// Assessment number (trainees only, empty for tutors).
    pub assessment_number: String,
    /// JSON-serialized [`SubjectClasses`] (tutors only, `{}` for trainees).
    #[sea_orm(column_type = "Text")]
    pub subjects: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Display, EnumString,
    Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "trainee")]
    Trainee,

    #[sea_orm(string_value = "tutor")]
    Tutor,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Role-specific attributes of an account being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    Trainee {
        class: String,
        assessment_number: String,
    },
    Tutor {
        subjects: SubjectClasses,
    },
}

/// Input for [`Model::upsert`]. `password` is plain text and gets hashed on write.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub kind: AccountKind,
}

impl Model {
    /// Inserts a new account. An existing username fails with a unique-constraint
    /// violation (see [`DbErr::sql_err`]) and leaves the stored row untouched.
    pub async fn create<C>(db: &C, account: NewAccount) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let username = account.username.trim().to_string();
        let active = active_model(account)?;
        Entity::insert(active).exec_without_returning(db).await?;
        Self::stored(db, &username).await
    }

    /// Inserts the account, or replaces every field of an existing one with the same username.
    pub async fn upsert<C>(db: &C, account: NewAccount) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let username = account.username.trim().to_string();
        let active = active_model(account)?;

        Entity::insert(active)
            .on_conflict(
                OnConflict::column(Column::Username)
                    .update_columns([
                        Column::FullName,
                        Column::Password,
                        Column::Role,
                        Column::Class,
                        Column::AssessmentNumber,
                        Column::Subjects,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::stored(db, &username).await
    }

    async fn stored<C>(db: &C, username: &str) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("account {username} vanished after write")))
    }

    pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(username.trim().to_string()).one(db).await
    }

    /// First account of `role` with the given display name.
    pub async fn find_by_display_name<C>(
        db: &C,
        full_name: &str,
        role: Role,
    ) -> Result<Option<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::FullName.eq(full_name))
            .filter(Column::Role.eq(role))
            .order_by_asc(Column::Username)
            .one(db)
            .await
    }

    /// Trainees assigned to `class`, ordered by display name.
    pub async fn trainees_by_class<C>(db: &C, class: &str) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::Role.eq(Role::Trainee))
            .filter(Column::Class.eq(class))
            .order_by_asc(Column::FullName)
            .all(db)
            .await
    }

    /// The subject map of a tutor, or `None` if `username` is not a tutor.
    pub async fn tutor_subjects<C>(db: &C, username: &str) -> Result<Option<SubjectClasses>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Self::find_by_username(db, username)
            .await?
            .filter(|a| a.role == Role::Tutor)
            .map(|a| a.subject_map()))
    }

    pub async fn all<C>(db: &C) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find().order_by_asc(Column::Username).all(db).await
    }

    /// Decodes the stored subject map. A corrupt value reads as no subjects.
    pub fn subject_map(&self) -> SubjectClasses {
        serde_json::from_str(&self.subjects).unwrap_or_else(|e| {
            tracing::warn!(username = %self.username, error = %e, "Unreadable subjects column");
            SubjectClasses::new()
        })
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

fn active_model(account: NewAccount) -> Result<ActiveModel, DbErr> {
    let username = account.username.trim().to_string();
    if username.is_empty() {
        return Err(DbErr::Custom("username cannot be empty".into()));
    }

    let password = hash_password(&account.password)?;
    let (role, class, assessment_number, subjects) = match account.kind {
        AccountKind::Trainee {
            class,
            assessment_number,
        } => (Role::Trainee, class, assessment_number, SubjectClasses::new()),
        AccountKind::Tutor { subjects } => (Role::Tutor, String::new(), String::new(), subjects),
    };
    let subjects = serde_json::to_string(&subjects)
        .map_err(|e| DbErr::Custom(format!("subjects serialization failed: {e}")))?;

    let now = Utc::now();
    Ok(ActiveModel {
        username: Set(username),
        full_name: Set(account.full_name),
        password: Set(password),
        role: Set(role),
        class: Set(class),
        assessment_number: Set(assessment_number),
        subjects: Set(subjects),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbErr::Custom(format!("password hashing failed: {e}")))
}
