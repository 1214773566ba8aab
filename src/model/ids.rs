// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Validated identifiers for the boundary inputs (page ids, issue keys, fragment names).
//!
//! Every constructor validates, so holding an id means the caller input already passed the
//! boundary checks and no store call has to re-check it.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Upper bound for fragment names, counted in UTF-16 code units.
pub const FRAGMENT_NAME_MAX_UNITS: usize = 255;

/// Validation rules for one identifier family.
pub trait IdKind {
    fn validate(value: &str) -> Result<(), ValidationError>;
}

/// A validated, string-shaped identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdKind> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        T::validate(&value)?;
        Ok(Self { value, _marker: PhantomData })
    }
}

impl<T> Id<T> {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T: IdKind> FromStr for Id<T> {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T: IdKind> TryFrom<String> for Id<T> {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Caller-input errors, reported verbatim and always before any store interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    PageId,
    IssueKey,
    FragmentName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageId => f.write_str("Invalid page ID format"),
            Self::IssueKey => f.write_str("Invalid issue key format"),
            Self::FragmentName => f.write_str("Invalid source name format"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageIdTag {}
pub type PageId = Id<PageIdTag>;

impl IdKind for PageIdTag {
    fn validate(value: &str) -> Result<(), ValidationError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::PageId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKeyTag {}
pub type IssueKey = Id<IssueKeyTag>;

impl IdKind for IssueKeyTag {
    // `PROJ-123`: uppercase letter, uppercase letters/digits, a hyphen, then digits.
    fn validate(value: &str) -> Result<(), ValidationError> {
        let Some((project, number)) = value.split_once('-') else {
            return Err(ValidationError::IssueKey);
        };
        let mut project_chars = project.chars();
        let leads_with_letter = project_chars.next().is_some_and(|c| c.is_ascii_uppercase());
        let project_ok = leads_with_letter
            && project_chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        let number_ok = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());
        if !project_ok || !number_ok {
            return Err(ValidationError::IssueKey);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentNameTag {}
pub type FragmentName = Id<FragmentNameTag>;

impl IdKind for FragmentNameTag {
    fn validate(value: &str) -> Result<(), ValidationError> {
        let units = value.encode_utf16().count();
        if units == 0 || units > FRAGMENT_NAME_MAX_UNITS {
            return Err(ValidationError::FragmentName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{FragmentName, IssueKey, PageId, ValidationError, FRAGMENT_NAME_MAX_UNITS};

    #[rstest]
    #[case("12345", true)]
    #[case("0", true)]
    #[case("", false)]
    #[case("12a45", false)]
    #[case(" 123", false)]
    #[case("-1", false)]
    fn page_id_accepts_only_digits(#[case] raw: &str, #[case] ok: bool) {
        let result = PageId::new(raw);
        assert_eq!(result.is_ok(), ok, "page id {raw:?}");
        if !ok {
            assert_eq!(result, Err(ValidationError::PageId));
        }
    }

    #[rstest]
    #[case("PROJ-1", true)]
    #[case("AB2C-42", true)]
    #[case("proj-1", false)]
    #[case("1PROJ-1", false)]
    #[case("PROJ-", false)]
    #[case("PROJ1", false)]
    #[case("PROJ-1-2", false)]
    #[case("-12", false)]
    fn issue_key_requires_uppercase_project_and_number(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(IssueKey::new(raw).is_ok(), ok, "issue key {raw:?}");
    }

    #[test]
    fn fragment_name_is_bounded_in_utf16_units() {
        assert_eq!(FragmentName::new(""), Err(ValidationError::FragmentName));
        assert!(FragmentName::new("flow").is_ok());
        assert!(FragmentName::new("x".repeat(FRAGMENT_NAME_MAX_UNITS)).is_ok());
        assert!(FragmentName::new("x".repeat(FRAGMENT_NAME_MAX_UNITS + 1)).is_err());

        // U+1F600 takes two UTF-16 units.
        let emoji = "\u{1F600}".repeat(128);
        assert_eq!(FragmentName::new(emoji), Err(ValidationError::FragmentName));
    }

    #[test]
    fn validation_messages_are_caller_facing() {
        assert_eq!(ValidationError::PageId.to_string(), "Invalid page ID format");
        assert_eq!(ValidationError::IssueKey.to_string(), "Invalid issue key format");
        assert_eq!(ValidationError::FragmentName.to_string(), "Invalid source name format");
    }
}
