// crates/network/src/auth.rs
//! Bearer tokens for authenticated calls

use std::sync::RwLock;

/// Supplies the current session token, if any
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// A token that is set once and may be cleared on sign-out
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// A provider with no session
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .ok()
            .and_then(|t| t.clone())
            .filter(|t| !t.trim().is_empty())
    }
}
