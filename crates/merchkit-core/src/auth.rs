//! Authentication session context.
//!
//! The identity provider is an external collaborator. Components that need
//! the current user receive an [`AuthSession`] explicitly instead of
//! registering their own listeners against a global.

use crate::error::AuthError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Subscription handle for unsubscribing from auth changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Identity handed out by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            is_admin: false,
        }
    }
}

type AuthListener = Box<dyn Fn(Option<&User>) + Send + Sync>;

/// Process-wide auth state, shared by cloning.
#[derive(Clone, Default)]
pub struct AuthSession {
    user: Arc<RwLock<Option<User>>>,
    listeners: Arc<RwLock<HashMap<SubscriptionId, AuthListener>>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// The signed-in user, or [`AuthError::NotSignedIn`].
    pub fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().ok_or(AuthError::NotSignedIn)
    }

    /// The signed-in user if they hold the admin role.
    pub fn require_admin(&self, action: &str) -> Result<User, AuthError> {
        let user = self.require_user()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(AuthError::Forbidden {
                uid: user.uid,
                action: action.to_string(),
            })
        }
    }

    /// Called by the provider integration when a user signs in.
    pub fn sign_in(&self, user: User) {
        tracing::info!("user {} signed in", user.uid);
        *self.user.write() = Some(user);
        self.notify();
    }

    /// Called by the provider integration when the user signs out.
    pub fn sign_out(&self) {
        if self.user.write().take().is_some() {
            tracing::info!("user signed out");
            self.notify();
        }
    }

    /// Register a listener; it is invoked on every sign-in/sign-out.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&User>) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.write().insert(id, Box::new(listener));
        tracing::debug!("auth listener {} registered", id);
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.write().remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn notify(&self) {
        let user = self.user.read().clone();
        let listeners = self.listeners.read();
        for listener in listeners.values() {
            listener(user.as_ref());
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &*self.user.read())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
