//! Country-code validation.
//!
//! Location-scoped endpoints take an ISO 3166-1 alpha-2 country code. The
//! gateway rejects anything else with an opaque carrier error, so the format
//! is checked locally before any network call.

use crate::error::Error;

/// Validate an ISO 3166-1 alpha-2 country code (two ASCII uppercase letters).
pub fn validate_country_code(code: &str) -> Result<(), Error> {
    let valid = code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "country code must be two uppercase letters, got {code:?}"
        )))
    }
}
