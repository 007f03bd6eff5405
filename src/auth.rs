//! Sign-up and sign-in against the credential store
//!
//! Hash format: `sha256$<salt>$<hex(sha256(salt || password))>`

use anyhow::Result;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::model::UserProfile;
use crate::store::JournalStore;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid sign-up details: {0}")]
    InvalidInput(String),
}

/// Sign-up form
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub dob: NaiveDate,
    pub height_cm: u32,
    pub weight_kg: u32,
}

const SCHEME: &str = "sha256";

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", SCHEME, salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt), Some(expected)) => {
            constant_time_eq(digest(salt, password).as_bytes(), expected.as_bytes())
        }
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn validate(user: &NewUser) -> Result<(), AuthError> {
    let username = user.username.trim();
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidInput(
            "username must be non-empty with no spaces".to_string(),
        ));
    }
    if user.password.is_empty() {
        return Err(AuthError::InvalidInput("password must not be empty".to_string()));
    }
    if user.name.trim().is_empty() {
        return Err(AuthError::InvalidInput("name must not be empty".to_string()));
    }
    if !(50..=250).contains(&user.height_cm) {
        return Err(AuthError::InvalidInput("height must be 50-250 cm".to_string()));
    }
    if !(20..=300).contains(&user.weight_kg) {
        return Err(AuthError::InvalidInput("weight must be 20-300 kg".to_string()));
    }
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    if user.dob < earliest || user.dob > chrono::Utc::now().date_naive() {
        return Err(AuthError::InvalidInput("date of birth out of range".to_string()));
    }
    Ok(())
}

pub fn sign_up(store: &JournalStore, user: NewUser) -> Result<UserProfile> {
    validate(&user)?;

    let profile = UserProfile {
        username: user.username.trim().to_string(),
        password_hash: hash_password(&user.password),
        name: user.name.trim().to_string(),
        dob: user.dob,
        height_cm: user.height_cm,
        weight_kg: user.weight_kg,
    };

    if !store.create_user(&profile)? {
        return Err(AuthError::UsernameTaken(profile.username).into());
    }

    tracing::info!(user = %profile.username, "created account");
    Ok(profile)
}

pub fn sign_in(store: &JournalStore, username: &str, password: &str) -> Result<UserProfile> {
    match store.get_user_profile(username.trim())? {
        Some(profile) if verify_password(password, &profile.password_hash) => Ok(profile),
        _ => {
            tracing::info!(user = username, "rejected sign-in");
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "correct horse".to_string(),
            name: "Ada".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            height_cm: 170,
            weight_kg: 65,
        }
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("pw");
        let b = hash_password("pw");
        assert_ne!(a, b);
        assert!(a.starts_with("sha256$"));
        assert!(verify_password("pw", &a));
        assert!(verify_password("pw", &b));
        assert!(!verify_password("pW", &a));
        assert!(!verify_password("pw", "plaintext"));
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let store = JournalStore::open_in_memory().unwrap();
        let created = sign_up(&store, new_user("ada")).unwrap();
        assert_ne!(created.password_hash, "correct horse");

        let profile = sign_in(&store, "ada", "correct horse").unwrap();
        assert_eq!(profile, created);
    }

    #[test]
    fn test_duplicate_sign_up_rejected() {
        let store = JournalStore::open_in_memory().unwrap();
        sign_up(&store, new_user("ada")).unwrap();
        let err = sign_up(&store, new_user("ada")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::UsernameTaken(name)) if name == "ada"
        ));
    }

    #[test]
    fn test_bad_credentials_look_the_same() {
        let store = JournalStore::open_in_memory().unwrap();
        sign_up(&store, new_user("ada")).unwrap();

        for (user, pw) in [("ada", "wrong"), ("nobody", "correct horse")] {
            let err = sign_in(&store, user, pw).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<AuthError>(),
                Some(AuthError::InvalidCredentials)
            ));
        }
    }

    #[test]
    fn test_invalid_sign_up_details() {
        let store = JournalStore::open_in_memory().unwrap();
        let mut user = new_user("has space");
        assert!(sign_up(&store, user.clone()).is_err());

        user.username = "ok".to_string();
        user.height_cm = 10;
        assert!(sign_up(&store, user).is_err());
        assert!(store.get_user_profile("ok").unwrap().is_none());
    }
}
