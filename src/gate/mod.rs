// SPDX-License-Identifier: MIT
//! Route guard over the session state.
//!
//! Two effective states, derived from the session store: authenticated and
//! unauthenticated.  Protected screens require the former; the sign-in and
//! registration screens are for the latter only — a signed-in user asking for
//! them is sent straight to the task screen instead of being shown a login
//! form.
//!
//! The gate only decides; callers enforce.  A protected screen's data loading
//! must not run unless the decision is [`Decision::Proceed`].

use std::sync::Arc;

use crate::session::SessionStore;

/// Screens a user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sign-in form — the unauthenticated entry point.
    Login,
    /// Registration form.
    Register,
    /// Task list and everything behind it.
    Tasks,
}

impl Route {
    fn is_protected(self) -> bool {
        matches!(self, Route::Tasks)
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Protected route without a session — go sign in first.
    RedirectToLogin,
    /// Sign-in/registration while already signed in — go straight to tasks.
    RedirectToTasks,
}

pub struct AccessGate {
    session: Arc<SessionStore>,
}

impl AccessGate {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decide whether `route` may proceed for the current session state.
    pub fn check(&self, route: Route) -> Decision {
        match (route.is_protected(), self.session.is_authenticated()) {
            (true, false) => Decision::RedirectToLogin,
            (false, true) => Decision::RedirectToTasks,
            _ => Decision::Proceed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gate_with_session(signed_in: bool) -> (AccessGate, TempDir) {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(SessionStore::load(dir.path()));
        if signed_in {
            session.login("tok-abc");
        }
        (AccessGate::new(session), dir)
    }

    #[test]
    fn signed_out_is_redirected_from_protected_routes() {
        let (gate, _dir) = gate_with_session(false);
        assert_eq!(gate.check(Route::Tasks), Decision::RedirectToLogin);
        assert_eq!(gate.check(Route::Login), Decision::Proceed);
        assert_eq!(gate.check(Route::Register), Decision::Proceed);
    }

    #[test]
    fn signed_in_is_redirected_forward_from_entry_routes() {
        let (gate, _dir) = gate_with_session(true);
        assert_eq!(gate.check(Route::Tasks), Decision::Proceed);
        assert_eq!(gate.check(Route::Login), Decision::RedirectToTasks);
        assert_eq!(gate.check(Route::Register), Decision::RedirectToTasks);
    }

    #[test]
    fn decisions_follow_session_transitions() {
        let (gate, _dir) = gate_with_session(false);
        let session = Arc::clone(&gate.session);

        assert_eq!(gate.check(Route::Tasks), Decision::RedirectToLogin);

        session.login("tok-xyz");
        assert_eq!(gate.check(Route::Tasks), Decision::Proceed);

        session.logout();
        assert_eq!(gate.check(Route::Tasks), Decision::RedirectToLogin);
    }
}
