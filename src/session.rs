use std::sync::{Arc, RwLock};

/// Holds the bearer token of the current login.
///
/// Cloning a session shares the token, so a client and the flows that log
/// in or out see the same value. Nothing but [`Session::login`] and
/// [`Session::logout`] changes it.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token<S: Into<String>>(token: S) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    pub fn login<S: Into<String>>(&self, token: S) {
        *self.token.write().expect("failed to lock token") = Some(token.into());
    }

    pub fn logout(&self) {
        self.token.write().expect("failed to lock token").take();
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().expect("failed to lock token").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("failed to lock token").is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
