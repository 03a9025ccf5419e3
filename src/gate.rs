//! Session Gate
//!
//! Root-route guard: decides between dashboard and login from token presence
//! alone. Token validity is discovered later, when a request fails.

use crate::navigation::Route;
use crate::session::SessionStore;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Presence not checked yet; show a loading indicator
    Resolving,
    Resolved(Route),
}

pub struct SessionGate {
    session: SessionStore,
    state: GateState,
}

impl SessionGate {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            state: GateState::Resolving,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Check the session and settle on a route
    pub fn resolve(&mut self) -> Route {
        let route = self.guard(Route::Dashboard);
        self.state = GateState::Resolved(route);
        debug!("Session gate resolved to {}", route);
        route
    }

    /// Route actually shown when `requested` is opened
    pub fn guard(&self, requested: Route) -> Route {
        match requested {
            Route::Dashboard if !self.session.is_present() => Route::Login,
            other => other,
        }
    }
}
