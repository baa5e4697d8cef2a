//! Generated usernames and passwords for ephemeral database users.
//!
//! Both generators draw from the thread-local CSPRNG. Passwords are
//! alphanumeric-only so the value can never terminate the single-quoted
//! `'{{password}}'` literal in the default statement sets; custom templates
//! with different quoting must handle their own escaping.

use rand::Rng;

/// Prefix marking engine-generated users.
const USERNAME_PREFIX: &str = "v";
/// Redshift-family identifier limit.
const USERNAME_MAX_CHARS: usize = 63;
/// Display/role contribution to the username, before the random suffix.
const NAME_PART_CHARS: usize = 8;
/// Random characters in the username suffix.
const USERNAME_SUFFIX_CHARS: usize = 20;

/// Guarantees the upper/lower/digit classes Redshift requires of passwords.
const PASSWORD_PREFIX: &str = "A1a-";
/// Random characters appended after the class prefix.
const PASSWORD_RANDOM_CHARS: usize = 20;

const LOWER_ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ALPHANUMERIC: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Builds a username of the form
/// `v-<display>-<role>-<random suffix>-<unix epoch>`, lowercased and capped
/// at 63 characters.
///
/// Display and role names are truncated to eight characters each; the
/// 20-character random suffix makes collisions vanishingly unlikely even
/// for identical display/role pairs issued in the same second.
pub fn generate_username(display_name: &str, role_name: &str) -> String {
    let display: String = display_name.chars().take(NAME_PART_CHARS).collect();
    let role: String = role_name.chars().take(NAME_PART_CHARS).collect();
    let suffix = random_from(LOWER_ALPHANUMERIC, USERNAME_SUFFIX_CHARS);
    let epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());

    let username = format!("{USERNAME_PREFIX}-{display}-{role}-{suffix}-{epoch}").to_lowercase();
    username.chars().take(USERNAME_MAX_CHARS).collect()
}

/// Produces a fresh password: `A1a-` followed by 20 random alphanumerics.
pub fn generate_password() -> String {
    format!(
        "{PASSWORD_PREFIX}{}",
        random_from(ALPHANUMERIC, PASSWORD_RANDOM_CHARS)
    )
}

fn random_from(charset: &[u8], count: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_format() {
        let username = generate_username("test", "test");
        assert!(username.starts_with("v-test-test-"));
        assert!(username.len() <= USERNAME_MAX_CHARS);
        assert_eq!(username, username.to_lowercase());
    }

    #[test]
    fn test_username_truncates_long_inputs() {
        let username = generate_username("averylongdisplayname", "averylongrolename");
        assert!(username.starts_with("v-averylon-averylon-"));
        assert!(username.len() <= USERNAME_MAX_CHARS);
    }

    #[test]
    fn test_username_uniqueness() {
        let first = generate_username("test", "test");
        let second = generate_username("test", "test");
        assert_ne!(first, second);
    }

    #[test]
    fn test_username_lowercases_mixed_case_inputs() {
        let username = generate_username("Admin", "ReadOnly");
        assert!(username.starts_with("v-admin-readonly-"));
    }

    #[test]
    fn test_password_length_and_classes() {
        let password = generate_password();
        assert_eq!(password.len(), PASSWORD_PREFIX.len() + PASSWORD_RANDOM_CHARS);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_password_is_quote_safe() {
        for _ in 0..32 {
            let password = generate_password();
            assert!(
                password
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-'),
                "unexpected character in {password:?}"
            );
        }
    }

    #[test]
    fn test_password_uniqueness() {
        assert_ne!(generate_password(), generate_password());
    }
}
