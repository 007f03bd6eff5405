//! Signup command implementation

use anyhow::Result;

use crate::auth::{self, NewUser};
use crate::store::JournalStore;

pub fn run(store: &JournalStore, user: NewUser) -> Result<()> {
    let profile = auth::sign_up(store, user)?;
    println!("Account '{}' created. Welcome, {}!", profile.username, profile.name);
    Ok(())
}
