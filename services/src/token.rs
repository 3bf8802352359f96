use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Inclusive range of token values.
pub const TOKEN_RANGE: std::ops::RangeInclusive<u16> = 1000..=9999;

/// Short-lived proof-of-presence for one trainee.
///
/// A token held by the issuer is always unconsumed: consuming it removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// Nothing issued, already used, or replaced.
    Missing,
    Expired,
    /// A live token exists but the value differs.
    Mismatch,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenRejection::Missing => f.write_str("No token has been issued for you yet"),
            TokenRejection::Expired => f.write_str("Your token has expired"),
            TokenRejection::Mismatch => f.write_str("Invalid token. Please check with your tutor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Accepted,
    Rejected(TokenRejection),
}

/// Holds at most one live token per trainee.
///
/// Values are only unique per trainee; two trainees may hold the same number.
#[derive(Debug)]
pub struct TokenIssuer {
    tokens: HashMap<String, Token>,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(validity: Duration) -> Self {
        Self {
            tokens: HashMap::new(),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a fresh random token for `trainee`, replacing any previous one.
    pub fn issue(&mut self, trainee: &str, now: DateTime<Utc>) -> Token {
        self.issue_with(trainee, now, &mut rand::rng())
    }

    pub fn issue_with<R: Rng + ?Sized>(
        &mut self,
        trainee: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Token {
        let token = Token {
            value: rng.random_range(TOKEN_RANGE).to_string(),
            issued_at: now,
            expires_at: now + self.validity,
        };
        self.tokens.insert(trainee.to_string(), token.clone());
        token
    }

    /// Checks `submitted` against the trainee's token and consumes it on success.
    ///
    /// Rejections leave the stored token untouched.
    pub fn validate(&mut self, trainee: &str, submitted: &str, now: DateTime<Utc>) -> TokenCheck {
        let Some(token) = self.tokens.get(trainee) else {
            return TokenCheck::Rejected(TokenRejection::Missing);
        };
        if !token.is_valid_at(now) {
            return TokenCheck::Rejected(TokenRejection::Expired);
        }
        if token.value != submitted.trim() {
            return TokenCheck::Rejected(TokenRejection::Mismatch);
        }
        self.tokens.remove(trainee);
        TokenCheck::Accepted
    }

    /// The trainee's live token, if one exists and has not expired.
    pub fn peek(&self, trainee: &str, now: DateTime<Utc>) -> Option<&Token> {
        self.tokens.get(trainee).filter(|t| t.is_valid_at(now))
    }
}
