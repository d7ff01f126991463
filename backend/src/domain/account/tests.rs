//! Tests for the account model.

use super::*;
use crate::domain::password::{DIGEST_LEN, PasswordDigest, SALT_LEN, Salt};
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn credential() -> PasswordCredential {
    PasswordCredential::new(
        Salt::from_bytes([0xab; SALT_LEN]),
        PasswordDigest::from_bytes([0xcd; DIGEST_LEN]),
    )
}

#[fixture]
fn account(credential: PasswordCredential) -> Account {
    Account::new(
        AccountId::new(VALID_ID).expect("valid id"),
        DisplayName::new("User Example").expect("valid name"),
        EmailAddress::new("User@Example.com").expect("valid email"),
        credential,
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp"),
    )
}

#[rstest]
#[case("user@foo.com")]
#[case("THE_USER@foo.bar.org")]
#[case("first.last@foo.jp")]
#[case("a+tag@sub-domain.example.io")]
fn accepts_valid_email_addresses(#[case] address: &str) {
    assert!(EmailAddress::new(address).is_ok(), "{address} should be valid");
}

#[rstest]
#[case("user@foo,com")]
#[case("user_at_foo.org")]
#[case("example.user@foo")]
#[case(" user@foo.com")]
#[case("jos\u{e9}@foo.com")]
#[case("user@foo\u{661}.com")]
#[case("user@foo.\u{212a}om")]
fn rejects_invalid_email_addresses(#[case] address: &str) {
    assert_eq!(
        EmailAddress::new(address),
        Err(AccountValidationError::InvalidEmail)
    );
}

#[rstest]
fn rejects_empty_email() {
    assert_eq!(
        EmailAddress::new(""),
        Err(AccountValidationError::EmptyEmail)
    );
}

#[rstest]
fn normalisation_folds_case_only() {
    let email = EmailAddress::new("User@Example.COM").expect("valid email");
    assert_eq!(email.normalized().as_str(), "user@example.com");
    assert_eq!(email.as_ref(), "User@Example.COM");
}

#[rstest]
#[case("")]
#[case("   ")]
fn rejects_blank_display_names(#[case] name: &str) {
    assert_eq!(
        DisplayName::new(name),
        Err(AccountValidationError::EmptyDisplayName)
    );
}

#[rstest]
fn accepts_maximum_length_display_name() {
    let name = "a".repeat(DISPLAY_NAME_MAX);
    assert_eq!(
        DisplayName::new(name.clone()).expect("boundary").as_ref(),
        name
    );
}

#[rstest]
fn rejects_too_long_display_name() {
    assert_eq!(
        DisplayName::new("a".repeat(DISPLAY_NAME_MAX + 1)),
        Err(AccountValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        })
    );
}

#[rstest]
fn display_name_counts_characters_not_bytes() {
    let name = "é".repeat(DISPLAY_NAME_MAX);
    assert!(DisplayName::new(name).is_ok());
}

#[rstest]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ")]
fn rejects_malformed_ids(#[case] raw: &str) {
    assert_eq!(AccountId::new(raw), Err(AccountValidationError::InvalidId));
}

#[rstest]
fn new_accounts_are_not_admins(account: Account) {
    assert!(!account.is_admin());
    assert!(account.with_admin(true).is_admin());
}

#[rstest]
fn serialisation_omits_credentials(account: Account) {
    let value = serde_json::to_value(&account).expect("serialise account");
    assert_eq!(
        value,
        json!({
            "id": VALID_ID,
            "displayName": "User Example",
            "email": "User@Example.com",
            "admin": false,
            "createdAt": "2026-01-02T03:04:05Z",
        })
    );
}

#[rstest]
fn debug_output_redacts_credentials(account: Account) {
    let rendered = format!("{account:?}");
    assert!(rendered.contains("<redacted>"));
    assert!(!rendered.contains(&"ab".repeat(SALT_LEN)));
    assert!(!rendered.contains(&"cd".repeat(DIGEST_LEN)));
}

#[rstest]
fn validation_errors_map_to_fields() {
    let violation = AccountValidationError::PasswordConfirmationMismatch.to_violation();
    assert_eq!(violation.field, "password_confirmation");
    assert_eq!(violation.reason, "password confirmation does not match password");
}
