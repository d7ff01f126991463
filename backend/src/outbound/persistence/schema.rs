//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. `diesel print-schema`
//! regenerates them from a migrated database.

diesel::table! {
    /// Registered accounts.
    accounts (id) {
        id -> Uuid,
        /// At most 50 characters.
        display_name -> Varchar,
        /// Email as entered at registration.
        email -> Varchar,
        /// Lower-cased email; unique.
        email_normalized -> Varchar,
        /// 16-byte salt, hex encoded.
        password_salt -> Varchar,
        /// 32-byte Argon2id digest, hex encoded.
        password_digest -> Varchar,
        admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges keyed by the ordered pair.
    relationships (follower_id, followee_id) {
        follower_id -> Uuid,
        followee_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts written by accounts.
    posts (id) {
        id -> Uuid,
        author_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> accounts (author_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, posts, relationships);
