use crate::navigation::{Navigator, Route, RouteAccess};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Route-entry decision. Token presence only; no network call. A stale token
/// is let through and rejected later by the backend.
pub fn check(route: Route, has_token: bool) -> GuardDecision {
    match (route.access(), has_token) {
        (RouteAccess::Protected, false) => GuardDecision::Redirect(Route::Login),
        (RouteAccess::PublicOnly, true) => GuardDecision::Redirect(Route::Dashboard),
        _ => GuardDecision::Allow,
    }
}

/// Apply the guard to a navigation: either enter `route` or follow the redirect.
pub fn enter(route: Route, store: &SessionStore, navigator: &Navigator) -> GuardDecision {
    let decision = check(route, store.is_authenticated());
    match decision {
        GuardDecision::Allow => {
            tracing::debug!("guard: entering {}", route);
            navigator.navigate(route);
        }
        GuardDecision::Redirect(target) => {
            tracing::info!("guard: {} denied, redirecting to {}", route, target);
            navigator.navigate(target);
        }
    }
    decision
}
