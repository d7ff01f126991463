//! Registration and login inputs.
//!
//! Raw caller input stays in [`RegistrationRequest`] and [`LoginCredentials`];
//! [`Registration::validate`] turns a request into validated components or
//! the full list of rejected fields. Plaintext passwords live in zeroising
//! buffers and are never printed.

use std::fmt;

use zeroize::Zeroizing;

use super::account::{
    AccountValidationError, DisplayName, EmailAddress, PASSWORD_MAX, PASSWORD_MIN,
};

/// Plaintext password that passed the length rules.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a plaintext password.
    pub fn new(raw: &str) -> Result<Self, AccountValidationError> {
        let length = raw.chars().count();
        if length == 0 {
            return Err(AccountValidationError::EmptyPassword);
        }
        if length < PASSWORD_MIN {
            return Err(AccountValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(AccountValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Unvalidated registration input as supplied by the caller.
#[derive(Clone)]
pub struct RegistrationRequest {
    name: String,
    email: String,
    password: Zeroizing<String>,
    password_confirmation: Zeroizing<String>,
}

impl RegistrationRequest {
    /// Capture raw registration fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: Zeroizing::new(password.into()),
            password_confirmation: Zeroizing::new(password_confirmation.into()),
        }
    }

    /// Requested display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Requested email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Registration input that satisfied every field rule.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Validated display name.
    pub display_name: DisplayName,
    /// Validated email, original casing preserved.
    pub email: EmailAddress,
    /// Validated plaintext password.
    pub password: Password,
}

impl Registration {
    /// Check every field, collecting all failures rather than stopping at the
    /// first.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{Registration, RegistrationRequest};
    ///
    /// let request = RegistrationRequest::new("", "bad", "foobar", "foobaz");
    /// let errors = Registration::validate(&request).unwrap_err();
    /// assert_eq!(errors.len(), 3);
    /// ```
    pub fn validate(request: &RegistrationRequest) -> Result<Self, Vec<AccountValidationError>> {
        let mut errors = Vec::new();

        let display_name = DisplayName::new(request.name.as_str())
            .map_err(|err| errors.push(err))
            .ok();
        let email = EmailAddress::new(request.email.as_str())
            .map_err(|err| errors.push(err))
            .ok();
        let password = Password::new(request.password.as_str())
            .map_err(|err| errors.push(err))
            .ok();
        if request.password.as_str() != request.password_confirmation.as_str() {
            errors.push(AccountValidationError::PasswordConfirmationMismatch);
        }

        match (display_name, email, password) {
            (Some(display_name), Some(email), Some(password)) if errors.is_empty() => Ok(Self {
                display_name,
                email,
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Login input. Never rejected at construction so every failure path
/// collapses into the same "no account" outcome.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Capture raw login fields.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Email string used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
