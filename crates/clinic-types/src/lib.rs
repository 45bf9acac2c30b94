//! Validated value types shared by the clinic crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text is longer than the column that stores it
    #[error("Text too long: {len} characters (max: {max})")]
    TooLong { len: usize, max: usize },
    /// The input is not a plausible email address
    #[error("Invalid email address")]
    InvalidEmail,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a new `NonEmptyText` that is also at most `max` characters long.
    pub fn bounded(input: impl AsRef<str>, max: usize) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        let len = text.0.chars().count();
        if len > max {
            return Err(TextError::TooLong { len, max });
        }
        Ok(text)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// An email address with a minimal shape check.
///
/// The address is trimmed and lowercased so that uniqueness checks in storage
/// are not defeated by case differences. Only the overall `local@domain` shape is
/// checked; deliverability is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub const MAX_LEN: usize = 100;

    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let normalised = input.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(TextError::Empty);
        }

        let len = normalised.chars().count();
        if len > Self::MAX_LEN {
            return Err(TextError::TooLong {
                len,
                max: Self::MAX_LEN,
            });
        }

        let (local, domain) = normalised
            .split_once('@')
            .ok_or(TextError::InvalidEmail)?;
        let shape_ok = !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !normalised.chars().any(char::is_whitespace);
        if !shape_ok {
            return Err(TextError::InvalidEmail);
        }

        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Jane ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Jane");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn bounded_counts_characters_not_bytes() {
        assert!(NonEmptyText::bounded("Zoë", 3).is_ok());
        assert_eq!(
            NonEmptyText::bounded("Zoëy", 3),
            Err(TextError::TooLong { len: 4, max: 3 })
        );
    }

    #[test]
    fn email_is_lowercased() {
        let email = EmailAddress::parse(" Jane@Example.COM ").expect("valid email");
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn email_rejects_bad_shapes() {
        for bad in ["jane", "@example.com", "jane@", "jane@@example.com", "ja ne@example.com"] {
            assert_eq!(
                EmailAddress::parse(bad),
                Err(TextError::InvalidEmail),
                "{bad} should be rejected"
            );
        }
    }
}
