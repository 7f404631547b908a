//! Audio reference validation and resolution
//!
//! An audio reference is accepted in exactly three shapes:
//! - absolute URL (`https://host/a.mp3`, `file:///cache/a.mp3`)
//! - protocol-relative (`//host/a.mp3`)
//! - root-relative path (`/static/a.mp3`)
//!
//! Anything else is rejected before a fetch or bind is attempted.

use std::fmt;
use thiserror::Error;
use url::Url;

/// Reasons an audio reference is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("No audio reference provided")]
    Empty,

    #[error("Invalid audio reference '{reference}': {reason}")]
    Malformed { reference: String, reason: String },
}

impl ReferenceError {
    fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the offending reference text, if there was one
    pub fn reference(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Malformed { reference, .. } => reference,
        }
    }
}

/// Shape of a validated reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Absolute,
    ProtocolRelative,
    RootRelative,
}

/// A validated audio reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    raw: String,
    kind: ReferenceKind,
}

impl AudioRef {
    /// Validates a raw reference
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let kind = if let Some(rest) = trimmed.strip_prefix("//") {
            if rest.is_empty() || rest.starts_with('/') {
                return Err(ReferenceError::malformed(trimmed, "missing host"));
            }
            // Borrow a scheme just to let the URL parser check the authority
            Url::parse(&format!("https:{}", trimmed))
                .map_err(|e| ReferenceError::malformed(trimmed, e.to_string()))?;
            ReferenceKind::ProtocolRelative
        } else if trimmed.starts_with('/') {
            ReferenceKind::RootRelative
        } else {
            let url = Url::parse(trimmed)
                .map_err(|e| ReferenceError::malformed(trimmed, e.to_string()))?;
            if url.cannot_be_a_base() {
                return Err(ReferenceError::malformed(
                    trimmed,
                    "not a hierarchical URL",
                ));
            }
            if matches!(url.scheme(), "http" | "https") && url.host_str().is_none() {
                return Err(ReferenceError::malformed(trimmed, "missing host"));
            }
            ReferenceKind::Absolute
        };

        Ok(Self {
            raw: trimmed.to_string(),
            kind,
        })
    }

    /// Returns the reference exactly as validated
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the shape of this reference
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Returns true if the reference can be used without a base URL
    pub fn is_absolute(&self) -> bool {
        self.kind == ReferenceKind::Absolute
    }

    /// Resolves the reference into a fetchable URL
    ///
    /// Relative shapes are joined onto `base`; protocol-relative references
    /// inherit the base scheme.
    pub fn resolve(&self, base: &Url) -> Result<Url, ReferenceError> {
        match self.kind {
            ReferenceKind::Absolute => Url::parse(&self.raw),
            ReferenceKind::ProtocolRelative | ReferenceKind::RootRelative => base.join(&self.raw),
        }
        .map_err(|e| ReferenceError::malformed(&self.raw, e.to_string()))
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for AudioRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:5000/app/").expect("valid base")
    }

    #[test]
    fn test_accepts_absolute() {
        let r = AudioRef::parse("https://cdn.example.com/a.mp3").expect("valid");
        assert_eq!(r.kind(), ReferenceKind::Absolute);
    }

    #[test]
    fn test_accepts_file_url() {
        let r = AudioRef::parse("file:///var/cache/blob-s1").expect("valid");
        assert!(r.is_absolute());
    }

    #[test]
    fn test_accepts_protocol_relative() {
        let r = AudioRef::parse("//cdn.example.com/a.mp3").expect("valid");
        assert_eq!(r.kind(), ReferenceKind::ProtocolRelative);
    }

    #[test]
    fn test_accepts_root_relative() {
        let r = AudioRef::parse("/static/a.mp3").expect("valid");
        assert_eq!(r.kind(), ReferenceKind::RootRelative);
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!(AudioRef::parse(""), Err(ReferenceError::Empty));
        assert_eq!(AudioRef::parse("   "), Err(ReferenceError::Empty));
    }

    #[test]
    fn test_rejects_bare_words() {
        let err = AudioRef::parse("not-a-url").unwrap_err();
        assert_eq!(err.reference(), "not-a-url");
        assert!(AudioRef::parse("static/a.mp3").is_err());
        assert!(AudioRef::parse("http").is_err());
    }

    #[test]
    fn test_rejects_opaque_urls() {
        assert!(AudioRef::parse("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_rejects_hostless_protocol_relative() {
        assert!(AudioRef::parse("//").is_err());
        assert!(AudioRef::parse("///a.mp3").is_err());
    }

    #[test]
    fn test_resolve_root_relative() {
        let r = AudioRef::parse("/static/a.mp3").expect("valid");
        let url = r.resolve(&base()).expect("resolves");
        assert_eq!(url.as_str(), "http://localhost:5000/static/a.mp3");
    }

    #[test]
    fn test_resolve_protocol_relative_inherits_scheme() {
        let r = AudioRef::parse("//cdn.example.com/a.mp3").expect("valid");
        let url = r.resolve(&base()).expect("resolves");
        assert_eq!(url.as_str(), "http://cdn.example.com/a.mp3");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let r = AudioRef::parse("https://cdn.example.com/a.mp3").expect("valid");
        let url = r.resolve(&base()).expect("resolves");
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }
}
