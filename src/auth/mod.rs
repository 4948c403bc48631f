use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config;

/// Name of the session cookie carrying the signed token.
pub const SESSION_COOKIE: &str = "session";

/// The six entity kinds exposed on the CRUD surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Instructor,
    Student,
    Course,
    Section,
    Semester,
    Registration,
}

impl Entity {
    pub fn slug(self) -> &'static str {
        match self {
            Entity::Instructor => "instructor",
            Entity::Student => "student",
            Entity::Course => "course",
            Entity::Section => "section",
            Entity::Semester => "semester",
            Entity::Registration => "registration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Add,
    Change,
}

impl Action {
    pub fn slug(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Change => "change",
        }
    }
}

/// Permission string for an (entity, action) pair, e.g. `section.view_section`.
pub fn permission(entity: Entity, action: Action) -> String {
    format!("{e}.{a}_{e}", e = entity.slug(), a = action.slug())
}

/// Every permission string an account could hold.
pub fn all_permissions() -> Vec<String> {
    const ENTITIES: [Entity; 6] = [
        Entity::Instructor,
        Entity::Student,
        Entity::Course,
        Entity::Section,
        Entity::Semester,
        Entity::Registration,
    ];
    const ACTIONS: [Action; 3] = [Action::View, Action::Add, Action::Change];

    let mut perms = Vec::with_capacity(ENTITIES.len() * ACTIONS.len());
    for entity in ENTITIES {
        for action in ACTIONS {
            perms.push(permission(entity, action));
        }
    }
    perms
}

/// Signed session claims carried in the session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub account_id: i64,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: String, account_id: i64, permissions: Vec<String>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.session_expiry_hours;
        Self {
            sub: username,
            account_id,
            permissions,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session secret not configured")]
    MissingSecret,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

pub fn issue_token(claims: &Claims) -> Result<String, SessionError> {
    let secret = &config::config().security.session_secret;
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| SessionError::InvalidToken(e.to_string()))
}

pub fn verify_token(token: &str) -> Result<Claims, SessionError> {
    let secret = &config::config().security.session_secret;
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| SessionError::InvalidToken(e.to_string()))?;
    Ok(data.claims)
}

/// Hex-encoded SHA-256 digest used for stored passwords.
pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
