//! Client routes and the pre-navigation session guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation runs `guard` synchronously against the session store.
//! Session-required routes bounce signed-out users to `/login`; guest-only
//! routes bounce signed-in users to `/`. Paths without guard metadata always
//! proceed.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

/// Known client routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
}

/// Guard metadata attached to a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest: bool,
}

impl Route {
    pub const ALL: [Self; 3] = [Self::Home, Self::Login, Self::Register];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
        }
    }

    #[must_use]
    pub fn meta(self) -> RouteMeta {
        match self {
            Self::Home => RouteMeta { requires_auth: true, guest: false },
            Self::Login | Self::Register => RouteMeta { requires_auth: false, guest: true },
        }
    }

    /// Match a location path, ignoring any query/fragment and a trailing slash.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }
}

/// Outcome of the guard for one navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

/// Decide whether a navigation to `target` may proceed.
#[must_use]
pub fn guard(target: Option<Route>, authenticated: bool) -> Navigation {
    let meta = target.map(Route::meta).unwrap_or_default();
    if meta.requires_auth && !authenticated {
        Navigation::Redirect(Route::Login)
    } else if meta.guest && authenticated {
        Navigation::Redirect(Route::Home)
    } else {
        Navigation::Proceed
    }
}

/// Where navigation ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub route: Option<Route>,
    /// Path originally requested when the guard redirected.
    pub redirected_from: Option<String>,
}

impl Location {
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

/// Navigation history for one client process.
#[derive(Debug, Default)]
pub struct Router {
    history: Vec<Location>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to `path`, applying the guard. A redirect target is itself a
    /// guarded route whose rule the same session state already satisfies,
    /// so one hop always settles.
    pub fn navigate(&mut self, path: &str, authenticated: bool) -> &Location {
        let requested = Route::from_path(path);
        let location = match guard(requested, authenticated) {
            Navigation::Proceed => Location { path: path.to_owned(), route: requested, redirected_from: None },
            Navigation::Redirect(route) => {
                tracing::debug!(from = %path, to = route.path(), "navigation redirected");
                Location { path: route.path().to_owned(), route: Some(route), redirected_from: Some(path.to_owned()) }
            }
        };
        self.history.push(location);
        &self.history[self.history.len() - 1]
    }

    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.history.last()
    }

    #[must_use]
    pub fn history(&self) -> &[Location] {
        &self.history
    }
}
