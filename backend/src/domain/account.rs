//! Account identity model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FieldViolation;
use super::password::PasswordCredential;

/// Maximum allowed length for a display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 50;
/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length, in characters.
pub const PASSWORD_MAX: usize = 40;

/// Input fields checked during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    Id,
    Name,
    Email,
    Password,
    PasswordConfirmation,
}

impl AccountField {
    /// Stable field name reported to callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::PasswordConfirmation => "password_confirmation",
        }
    }
}

/// Validation errors returned by account value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    InvalidId,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort { min: usize },
    PasswordTooLong { max: usize },
    PasswordConfirmationMismatch,
}

impl AccountValidationError {
    /// Field the error refers to.
    pub fn field(&self) -> AccountField {
        match self {
            Self::InvalidId => AccountField::Id,
            Self::EmptyDisplayName | Self::DisplayNameTooLong { .. } => AccountField::Name,
            Self::EmptyEmail | Self::InvalidEmail => AccountField::Email,
            Self::EmptyPassword | Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } => {
                AccountField::Password
            }
            Self::PasswordConfirmationMismatch => AccountField::PasswordConfirmation,
        }
    }

    /// Convert into the caller-facing violation record.
    pub fn to_violation(&self) -> FieldViolation {
        FieldViolation::new(self.field().as_str(), self.to_string())
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::PasswordConfirmationMismatch => {
                write!(f, "password confirmation does not match password")
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(AccountValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }

    /// Generate a new random [`AccountId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already validated UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Human readable display name for the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, AccountValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(AccountValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(AccountValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // ASCII-only classes and case folding.
        let pattern = r"(?i-u)^[\w+\-.]+@[a-z\d\-.]+\.[a-z]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Syntactically valid email address, stored with the caller's casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::EmailAddress;
    ///
    /// assert!(EmailAddress::new("THE_USER@foo.bar.org").is_ok());
    /// assert!(EmailAddress::new("user@foo,com").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, AccountValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }

    /// Case-folded form used as the uniqueness key.
    pub fn normalized(&self) -> NormalizedEmail {
        NormalizedEmail(self.0.to_lowercase())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-cased email used for lookups and the uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Normalised address text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account.
///
/// ## Invariants
/// - `credential` is fixed at registration and never serialised or printed.
/// - `admin` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    id: AccountId,
    display_name: DisplayName,
    email: EmailAddress,
    #[serde(skip)]
    credential: PasswordCredential,
    admin: bool,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Build a non-admin account from validated components.
    pub fn new(
        id: AccountId,
        display_name: DisplayName,
        email: EmailAddress,
        credential: PasswordCredential,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name,
            email,
            credential,
            admin: false,
            created_at,
        }
    }

    /// Return the account with the administrator flag set to `admin`.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// Stable account identifier.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Display name shown to other accounts.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Email with its original casing.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored salt and digest.
    pub fn credential(&self) -> &PasswordCredential {
        &self.credential
    }

    /// Administrator flag.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests;
