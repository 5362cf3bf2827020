//! Secret redaction for private keys in logs and configuration dumps.
//!
//! [`Redacted`] never exposes its inner value through `Debug`, `Display` or
//! `Serialize`; all of them print `"<redacted>"`. Use [`Redacted::expose`] at
//! the single place the secret is actually consumed.

use std::fmt::{self, Debug, Display};

/// Wrapper that redacts its inner value when formatted or serialized.
///
/// ```ignore
/// use pos_bridge_rs::redact::Redacted;
///
/// let key = Redacted("0xac09...".to_string());
/// tracing::info!(key = %key, "Building signer");
/// // Logs: key = <redacted>
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Borrow the secret
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_formatting() {
        let key = Redacted("secret".to_string());
        assert_eq!(format!("{}", key), "<redacted>");
        assert_eq!(format!("{:?}", key), "<redacted>");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"<redacted>\"");
        assert_eq!(key.expose(), "secret");
    }
}
