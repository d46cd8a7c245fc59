use std::fmt;
use std::sync::Mutex;

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Requires a token.
    Protected,
    /// Only reachable without a token (login/register).
    PublicOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Charts,
    Audit,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/auth/login",
            Route::Register => "/auth/register",
            Route::Dashboard => "/dashboard",
            Route::Charts => "/charts",
            Route::Audit => "/audit",
        }
    }

    /// Resolve a path; the empty path and anything unknown land on the dashboard.
    pub fn from_path(path: &str) -> Route {
        match path.trim().trim_end_matches('/') {
            "/auth/login" | "auth/login" => Route::Login,
            "/auth/register" | "auth/register" => Route::Register,
            "/charts" | "charts" => Route::Charts,
            "/audit" | "audit" => Route::Audit,
            _ => Route::Dashboard,
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Login | Route::Register => RouteAccess::PublicOnly,
            Route::Dashboard | Route::Charts | Route::Audit => RouteAccess::Protected,
        }
    }

    pub fn is_auth_page(&self) -> bool {
        self.access() == RouteAccess::PublicOnly
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug)]
struct NavigatorState {
    current: Option<Route>,
    history: Vec<Route>,
}

/// In-process router: the current route plus every navigation made.
#[derive(Debug)]
pub struct Navigator {
    state: Mutex<NavigatorState>,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current: None,
                history: Vec::new(),
            }),
        }
    }

    pub fn navigate(&self, route: Route) {
        if let Ok(mut state) = self.state.lock() {
            tracing::debug!("navigating to {}", route);
            state.current = Some(route);
            state.history.push(route);
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.state.lock().ok().and_then(|state| state.current)
    }

    pub fn history(&self) -> Vec<Route> {
        self.state
            .lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    /// Send the user to login unless they are already on an auth page.
    pub fn redirect_to_login(&self) {
        if !self.current().is_some_and(|route| route.is_auth_page()) {
            self.navigate(Route::Login);
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
