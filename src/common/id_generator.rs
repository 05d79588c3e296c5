// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., U_K7NP3X for users)
//!
//! Search events accumulate without bound, so they get a longer random part
//! than users do.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Search event (Q_) - Q for Query
    SearchEvent,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::SearchEvent => "Q",
        }
    }

    /// Number of random characters after the prefix
    pub fn random_len(&self) -> usize {
        match self {
            EntityPrefix::User => 6,
            EntityPrefix::SearchEvent => 10,
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Example
/// ```ignore
/// let user_id = generate_id(EntityPrefix::User);
/// // Returns something like "U_K7NP3X"
/// ```
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!(
        "{}_{}",
        prefix.as_str(),
        generate_crockford_string(prefix.random_len())
    )
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Search Event ID (Q_XXXXXXXXXX)
pub fn generate_search_event_id() -> String {
    generate_id(EntityPrefix::SearchEvent)
}
