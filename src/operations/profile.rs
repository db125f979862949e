use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::db::KeyValueStore;
use crate::db::profile_repository::{load_profile, save_profile};
use crate::error::{Error, Result};
use crate::models::profile::{ProfileUpdate, Registration, UserProfile};

pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

type Pattern = LazyLock<std::result::Result<Regex, regex::Error>>;

static USERNAME: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{3,20}$"));
static NAME: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,30}$"));
static EMAIL: Pattern =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"));
static PHONE: Pattern = LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$"));
static PASSWORD_CHARSET: Pattern = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&#]+$"));

const PASSWORD_SPECIALS: &str = "@$!%*?&#";
const MIN_PASSWORD_LEN: usize = 8;

fn compiled(pattern: &'static Pattern) -> Result<&'static Regex> {
    pattern.as_ref().map_err(|e| Error::Pattern(e.clone()))
}

fn invalid(message: &str) -> Error {
    Error::Validation(message.to_string())
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(message));
    }
    Ok(())
}

fn require_match(pattern: &'static Pattern, value: &str, message: &str) -> Result<()> {
    if !compiled(pattern)?.is_match(value) {
        return Err(invalid(message));
    }
    Ok(())
}

fn check_username(username: &str) -> Result<()> {
    require(username, "Username is required.")?;
    require_match(
        &USERNAME,
        username,
        "Username must be 3-20 characters, letters and numbers only (no spaces).",
    )
}

fn check_first_name(first_name: &str) -> Result<()> {
    require(first_name, "First name is required.")?;
    require_match(&NAME, first_name, "First name must be 2-30 letters only.")
}

fn check_last_name(last_name: &str) -> Result<()> {
    require(last_name, "Last name is required.")?;
    require_match(&NAME, last_name, "Last name must be 2-30 letters only.")
}

fn check_email(email: &str) -> Result<()> {
    require(email, "Email is required.")?;
    require_match(
        &EMAIL,
        email,
        "Please enter a valid email address (e.g., user@example.com).",
    )
}

fn check_phone(phone: &str) -> Result<()> {
    require(phone, "Phone number is required.")?;
    require_match(
        &PHONE,
        phone,
        "Phone number must be 10 digits starting with 6-9 (Indian format).",
    )
}

fn check_password(password: &str) -> Result<()> {
    require(password, "Password is required.")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid("Password must be at least 8 characters long."));
    }

    let strong = compiled(&PASSWORD_CHARSET)?.is_match(password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if !strong {
        return Err(invalid(concat!(
            "Password must contain: uppercase, lowercase, number, ",
            "and special character (@$!%*?&#)."
        )));
    }
    Ok(())
}

/// Checks a registration form field by field, reporting the first failure.
pub fn validate_registration(registration: &Registration) -> Result<()> {
    let first_name = registration.first_name.trim();
    let last_name = registration.last_name.trim();

    check_username(registration.username.trim())?;
    require(first_name, "First name is required.")?;
    require(last_name, "Last name is required.")?;
    check_first_name(first_name)?;
    check_last_name(last_name)?;
    check_email(registration.email.trim())?;
    check_phone(registration.phone.trim())?;
    check_password(&registration.password)
}

/// Validates the form, hashes the password and stores the profile,
/// replacing any previous one.
pub fn register<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    registration: &Registration,
    cost: u32,
) -> Result<UserProfile> {
    validate_registration(registration)?;

    let profile = UserProfile {
        username: registration.username.trim().to_string(),
        first_name: registration.first_name.trim().to_string(),
        last_name: registration.last_name.trim().to_string(),
        email: registration.email.trim().to_string(),
        phone: registration.phone.trim().to_string(),
        password_hash: bcrypt::hash(&registration.password, cost)?,
    };

    if let Some(previous) = load_profile(storage)? {
        warn!(previous = %previous.username, "replacing existing profile");
    }
    save_profile(storage, &profile)?;
    info!(username = %profile.username, "profile registered");
    Ok(profile)
}

/// Changes the personal details of the stored profile.
///
/// Each provided field is trimmed and held to the registration rules. Nothing
/// is written unless every provided field is valid.
pub fn update_profile<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    update: ProfileUpdate,
) -> Result<UserProfile> {
    let mut profile = load_profile(storage)?.ok_or(Error::ProfileNotFound)?;

    if let Some(first_name) = update.first_name {
        let first_name = first_name.trim();
        check_first_name(first_name)?;
        profile.first_name = first_name.to_string();
    }
    if let Some(last_name) = update.last_name {
        let last_name = last_name.trim();
        check_last_name(last_name)?;
        profile.last_name = last_name.to_string();
    }
    if let Some(email) = update.email {
        let email = email.trim();
        check_email(email)?;
        profile.email = email.to_string();
    }
    if let Some(phone) = update.phone {
        let phone = phone.trim();
        check_phone(phone)?;
        profile.phone = phone.to_string();
    }

    save_profile(storage, &profile)?;
    info!(username = %profile.username, "profile updated");
    Ok(profile)
}

/// Replaces the stored password hash after checking the current password.
pub fn change_password<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    current: &str,
    new: &str,
    confirm: &str,
    cost: u32,
) -> Result<()> {
    let mut profile = load_profile(storage)?.ok_or(Error::ProfileNotFound)?;

    if !bcrypt::verify(current, &profile.password_hash)? {
        return Err(invalid("Current password is incorrect."));
    }
    if new != confirm {
        return Err(invalid("Passwords do not match!"));
    }
    check_password(new)?;

    profile.password_hash = bcrypt::hash(new, cost)?;
    save_profile(storage, &profile)?;
    info!(username = %profile.username, "password changed");
    Ok(())
}

/// Returns the stored profile when `identifier` names it (username or email)
/// and `password` matches its hash.
pub fn verify_credentials<S: KeyValueStore + ?Sized>(
    storage: &S,
    identifier: &str,
    password: &str,
) -> Result<Option<UserProfile>> {
    let Some(profile) = load_profile(storage)? else {
        return Ok(None);
    };

    let identifier = identifier.trim();
    if identifier != profile.username && !identifier.eq_ignore_ascii_case(&profile.email) {
        return Ok(None);
    }

    if bcrypt::verify(password, &profile.password_hash)? {
        Ok(Some(profile))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, USER_DATA_KEY};

    const TEST_COST: u32 = 4;

    fn registration() -> Registration {
        Registration {
            username: "asha92".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            password: "Secret@123".to_string(),
        }
    }

    fn validation_message(registration: &Registration) -> String {
        match validate_registration(registration) {
            Err(Error::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn test_username_rules() {
        let mut form = registration();
        form.username = "  ".to_string();
        assert_eq!(validation_message(&form), "Username is required.");

        form.username = "as ha".to_string();
        assert!(validation_message(&form).starts_with("Username must be 3-20"));

        form.username = "ab".to_string();
        assert!(validation_message(&form).starts_with("Username must be 3-20"));
    }

    #[test]
    fn test_name_rules() {
        let mut form = registration();
        form.last_name = String::new();
        assert_eq!(validation_message(&form), "Last name is required.");

        form.last_name = "Rao".to_string();
        form.first_name = "A".to_string();
        assert_eq!(validation_message(&form), "First name must be 2-30 letters only.");
    }

    #[test]
    fn test_email_and_phone_rules() {
        let mut form = registration();
        form.email = "asha@example".to_string();
        assert!(validation_message(&form).starts_with("Please enter a valid email"));

        form = registration();
        form.phone = "5876543210".to_string();
        assert!(validation_message(&form).starts_with("Phone number must be 10 digits"));

        form.phone = "987654321".to_string();
        assert!(validation_message(&form).starts_with("Phone number must be 10 digits"));
    }

    #[test]
    fn test_password_rules() {
        let mut form = registration();
        form.password = "Ab@1".to_string();
        assert_eq!(
            validation_message(&form),
            "Password must be at least 8 characters long."
        );

        for weak in ["secret@123", "SECRET@123", "Secret@abc", "Secret1234", "Secret 12@"] {
            form.password = weak.to_string();
            assert!(
                validation_message(&form).starts_with("Password must contain"),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_register_stores_hash_not_password() {
        let mut storage = MemoryStore::new();
        let profile = register(&mut storage, &registration(), TEST_COST).unwrap();

        assert_ne!(profile.password_hash, "Secret@123");
        let raw = storage.get(USER_DATA_KEY).unwrap().unwrap();
        assert!(!raw.contains("Secret@123"));
        assert!(raw.contains("passwordHash"));
    }

    #[test]
    fn test_register_rejects_invalid_form_without_storing() {
        let mut storage = MemoryStore::new();
        let mut form = registration();
        form.phone = "123".to_string();

        assert!(register(&mut storage, &form, TEST_COST).is_err());
        assert_eq!(storage.get(USER_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn test_verify_credentials_by_username_or_email() {
        let mut storage = MemoryStore::new();
        register(&mut storage, &registration(), TEST_COST).unwrap();

        let by_username = verify_credentials(&storage, "asha92", "Secret@123").unwrap();
        assert_eq!(by_username.map(|p| p.first_name), Some("Asha".to_string()));

        assert!(verify_credentials(&storage, "ASHA@example.com", "Secret@123").unwrap().is_some());
    }

    #[test]
    fn test_verify_credentials_rejects_wrong_password_or_user() {
        let mut storage = MemoryStore::new();
        register(&mut storage, &registration(), TEST_COST).unwrap();

        assert!(verify_credentials(&storage, "asha92", "Secret@124").unwrap().is_none());
        assert!(verify_credentials(&storage, "someone", "Secret@123").unwrap().is_none());
    }

    #[test]
    fn test_verify_without_profile() {
        let storage = MemoryStore::new();
        assert!(verify_credentials(&storage, "asha92", "Secret@123").unwrap().is_none());
    }

    #[test]
    fn test_patterns_compile() {
        for pattern in [&USERNAME, &NAME, &EMAIL, &PHONE, &PASSWORD_CHARSET] {
            assert!(compiled(pattern).is_ok());
        }
    }

    #[test]
    fn test_update_profile_changes_only_given_fields() {
        let mut storage = MemoryStore::new();
        let registered = register(&mut storage, &registration(), TEST_COST).unwrap();

        let updated = update_profile(
            &mut storage,
            ProfileUpdate {
                last_name: Some(" Iyer ".to_string()),
                email: Some("asha.iyer@example.com".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.last_name, "Iyer");
        assert_eq!(updated.email, "asha.iyer@example.com");
        assert_eq!(updated.first_name, registered.first_name);
        assert_eq!(updated.phone, registered.phone);
        assert_eq!(updated.password_hash, registered.password_hash);
        assert_eq!(load_profile(&storage).unwrap(), Some(updated));
        assert!(verify_credentials(&storage, "asha.iyer@example.com", "Secret@123")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_update_profile_rejects_invalid_field_without_storing() {
        let mut storage = MemoryStore::new();
        let registered = register(&mut storage, &registration(), TEST_COST).unwrap();

        let result = update_profile(
            &mut storage,
            ProfileUpdate {
                first_name: Some("Asha".to_string()),
                phone: Some("12345".to_string()),
                ..Default::default()
            },
        );

        match result {
            Err(Error::Validation(message)) => {
                assert!(message.starts_with("Phone number must be 10 digits"))
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert_eq!(load_profile(&storage).unwrap(), Some(registered));
    }

    #[test]
    fn test_update_profile_without_registration() {
        let mut storage = MemoryStore::new();
        let result = update_profile(&mut storage, ProfileUpdate::default());
        assert!(matches!(result, Err(Error::ProfileNotFound)));
    }

    #[test]
    fn test_change_password() {
        let mut storage = MemoryStore::new();
        register(&mut storage, &registration(), TEST_COST).unwrap();

        change_password(&mut storage, "Secret@123", "Fresh#456x", "Fresh#456x", TEST_COST)
            .unwrap();

        assert!(verify_credentials(&storage, "asha92", "Secret@123").unwrap().is_none());
        assert!(verify_credentials(&storage, "asha92", "Fresh#456x").unwrap().is_some());
    }

    #[test]
    fn test_change_password_rejections_keep_old_password() {
        let mut storage = MemoryStore::new();
        register(&mut storage, &registration(), TEST_COST).unwrap();

        let cases = [
            ("Wrong@123", "Fresh#456x", "Fresh#456x", "Current password is incorrect."),
            ("Secret@123", "Fresh#456x", "Fresh#456y", "Passwords do not match!"),
            ("Secret@123", "short", "short", "Password must be at least 8 characters long."),
        ];
        for (current, new, confirm, expected) in cases {
            match change_password(&mut storage, current, new, confirm, TEST_COST) {
                Err(Error::Validation(message)) => assert_eq!(message, expected),
                other => panic!("expected a validation error, got {other:?}"),
            }
        }

        let weak = change_password(&mut storage, "Secret@123", "freshpass", "freshpass", TEST_COST);
        assert!(weak.is_err());
        assert!(verify_credentials(&storage, "asha92", "Secret@123").unwrap().is_some());
    }

    #[test]
    fn test_change_password_without_registration() {
        let mut storage = MemoryStore::new();
        let result = change_password(&mut storage, "a", "Fresh#456x", "Fresh#456x", TEST_COST);
        assert!(matches!(result, Err(Error::ProfileNotFound)));
    }
}
