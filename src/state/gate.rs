use crate::state::AuthState;

/// What a protected region does for a given auth state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session restore still running, show a neutral indicator
    Wait,
    /// Nobody signed in, send the visitor back to the entry point
    Redirect,
    /// Render the protected children unchanged
    Render,
}

/// Loading wins over everything, so a restoring session is never bounced to
/// the login screen.
pub fn decide(state: &AuthState) -> GateDecision {
    if state.is_loading() {
        GateDecision::Wait
    } else if state.user().is_none() {
        GateDecision::Redirect
    } else {
        GateDecision::Render
    }
}
