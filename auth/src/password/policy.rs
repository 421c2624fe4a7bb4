use super::errors::PasswordPolicyError;

/// Password strength rules applied at registration.
///
/// A password is accepted when it is at least [`PasswordPolicy::MIN_LENGTH`]
/// characters long and mixes ASCII uppercase, lowercase and digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub const MIN_LENGTH: usize = 8;

    /// Check a candidate password against the policy.
    ///
    /// The length rule is evaluated first; composition is only reported for
    /// passwords that are long enough.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `MissingCharacterClasses` - No uppercase, lowercase or digit present
    pub fn validate(password: &str) -> Result<(), PasswordPolicyError> {
        Self::with_valid_length(password)?;
        Self::with_valid_composition(password)
    }

    fn with_valid_length(password: &str) -> Result<(), PasswordPolicyError> {
        let actual = password.chars().count();
        if actual < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual,
            })
        } else {
            Ok(())
        }
    }

    fn with_valid_composition(password: &str) -> Result<(), PasswordPolicyError> {
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if has_upper && has_lower && has_digit {
            Ok(())
        } else {
            Err(PasswordPolicyError::MissingCharacterClasses)
        }
    }
}
