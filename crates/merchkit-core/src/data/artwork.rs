//! Opaque handle to user-uploaded artwork.

use serde::{Deserialize, Serialize};
use std::fmt;

/// URL, object-store path or data URI of an uploaded raster image.
///
/// The customizer never interprets the string beyond picking a fetcher;
/// two references are the same artwork exactly when the strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkReference(String);

impl ArtworkReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Scheme of the reference (`data`, `file`, `memory`, `https`, ...) if any.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once(':')?;
        let valid = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        // single letters are Windows drive prefixes, not schemes
        (valid && scheme.len() > 1).then_some(scheme)
    }
}

impl fmt::Display for ArtworkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_data_uri() {
            // data URIs can be megabytes long
            let head: String = self.0.chars().take(32).collect();
            write!(f, "{}…", head)
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for ArtworkReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtworkReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_detection() {
        assert_eq!(ArtworkReference::new("data:image/png;base64,AAAA").scheme(), Some("data"));
        assert_eq!(ArtworkReference::new("memory://uploads/a.png").scheme(), Some("memory"));
        assert_eq!(ArtworkReference::new("uploads/a.png").scheme(), None);
        assert_eq!(ArtworkReference::new("C:\\art\\a.png").scheme(), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let r = ArtworkReference::new("memory://a.png");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"memory://a.png\"");
    }
}
