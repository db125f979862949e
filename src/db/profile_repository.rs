use tracing::{debug, warn};

use super::{KeyValueStore, USER_DATA_KEY};
use crate::error::Result;
use crate::models::profile::UserProfile;

pub fn load_profile<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Option<UserProfile>> {
    let Some(raw) = storage.get(USER_DATA_KEY)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(profile) => Ok(Some(profile)),
        Err(e) => {
            // Older profiles hold an encoded password instead of a hash
            warn!("Ignoring unreadable user profile: {}", e);
            Ok(None)
        }
    }
}

pub fn save_profile<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    profile: &UserProfile,
) -> Result<()> {
    let raw = serde_json::to_string(profile)?;
    storage.set(USER_DATA_KEY, &raw)?;
    debug!(username = %profile.username, "profile saved");
    Ok(())
}
