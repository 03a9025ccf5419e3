//! Client-side routing
//!
//! Routes are the two top-level screens. Navigation requests are published on
//! a `watch` channel; the HTTP interceptor issues "hard" navigations, which
//! tear down whatever view is mounted.

use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: the dashboard, guarded by the session gate
    Dashboard,
    /// `/auth`: the login form
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Login => "/auth",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "" => Some(Route::Dashboard),
            "/auth" => Some(Route::Login),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    /// Hard navigations discard all mounted view state
    pub hard: bool,
    /// Increases with every request, so repeated requests for the same
    /// route are still observable
    pub seq: u64,
}

/// Publishes navigation requests
#[derive(Clone)]
pub struct Navigator {
    tx: watch::Sender<Navigation>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _) = watch::channel(Navigation {
            route: initial,
            hard: false,
            seq: 0,
        });
        Self { tx }
    }

    /// In-app navigation
    pub fn navigate(&self, route: Route) {
        self.publish(route, false);
    }

    /// Full reload onto `route`
    pub fn force(&self, route: Route) {
        self.publish(route, true);
    }

    fn publish(&self, route: Route, hard: bool) {
        self.tx.send_modify(|nav| {
            nav.route = route;
            nav.hard = hard;
            nav.seq += 1;
        });
        debug!("Navigate to {} (hard: {})", route, hard);
    }

    /// Latest navigation request
    pub fn current(&self) -> Navigation {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Navigation> {
        self.tx.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}
