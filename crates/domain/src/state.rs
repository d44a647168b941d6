//! Sign-in screen state.
//!
//! The screen starts out unauthenticated and moves to authenticated the
//! first time the identity service reports a session. There is no way
//! back within one mount: the screen navigates away on that transition.

use serde::{Deserialize, Serialize};

/// Authentication state as seen by the sign-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInState {
    /// No session observed yet.
    #[default]
    Unauthenticated,
    /// A session was observed and navigation has been triggered.
    Authenticated,
}

impl SignInState {
    /// Returns true once a session has been observed.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Applies a session-presence observation.
    ///
    /// Returns the next state and whether this observation is the one that
    /// authenticated the screen.
    #[must_use]
    pub const fn observe(self, session_present: bool) -> (Self, bool) {
        match (self, session_present) {
            (Self::Unauthenticated, true) => (Self::Authenticated, true),
            (state, _) => (state, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(SignInState::default(), SignInState::Unauthenticated);
        assert!(!SignInState::default().is_authenticated());
    }

    #[test]
    fn test_transitions() {
        let state = SignInState::Unauthenticated;
        assert_eq!(state.observe(false), (SignInState::Unauthenticated, false));

        let (state, fired) = state.observe(true);
        assert_eq!(state, SignInState::Authenticated);
        assert!(fired);

        assert_eq!(state.observe(true), (SignInState::Authenticated, false));
        assert_eq!(state.observe(false), (SignInState::Authenticated, false));
    }
}
