//! Application shell
//!
//! Owns the mounted screen and follows navigation requests published by the
//! views and the response interceptor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::auth::AuthService;
use crate::config::{BackendKind, Config};
use crate::error::DecanatError;
use crate::gate::SessionGate;
use crate::http::{ApiClient, ResponseInterceptor};
use crate::navigation::{Navigation, Navigator, Route};
use crate::services::{AuthApi, DomainApi, HttpBackend, MockBackend};
use crate::session::SessionStore;
use crate::views::{DashboardView, LoginView};

/// Upper bound on navigations followed by a single `settle`
const MAX_REDIRECTS: usize = 8;

/// Everything the screens share
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionStore,
    pub navigator: Navigator,
    pub auth: AuthService,
    pub api: Arc<dyn DomainApi>,
    pub notification_ttl: Duration,
}

impl AppContext {
    pub fn new(
        session: SessionStore,
        navigator: Navigator,
        auth_api: Arc<dyn AuthApi>,
        api: Arc<dyn DomainApi>,
        notification_ttl: Duration,
    ) -> Self {
        let auth = AuthService::new(auth_api, session.clone());
        Self {
            session,
            navigator,
            auth,
            api,
            notification_ttl,
        }
    }

    /// Wire the session file and the configured backend
    pub fn from_config(config: &Config) -> Result<Self, DecanatError> {
        let session = SessionStore::open(&config.storage_path)?;
        let navigator = Navigator::default();

        match config.backend {
            BackendKind::Mock => {
                info!("Using mock backend");
                let interceptor = ResponseInterceptor::new(session.clone(), navigator.clone());
                let backend = Arc::new(
                    MockBackend::new(session.clone(), config.mock_config())
                        .with_interceptor(interceptor),
                );
                Ok(Self::new(
                    session,
                    navigator,
                    backend.clone(),
                    backend,
                    config.notification_ttl,
                ))
            }
            BackendKind::Http => {
                info!("Using HTTP backend at {}", config.api_url);
                let client = ApiClient::new(&config.api_url, session.clone(), navigator.clone());
                let backend = Arc::new(HttpBackend::new(client));
                Ok(Self::new(
                    session,
                    navigator,
                    backend.clone(),
                    backend,
                    config.notification_ttl,
                ))
            }
        }
    }
}

/// The screen currently shown
pub enum Screen {
    Loading,
    Login(LoginView),
    Dashboard(DashboardView),
}

impl Screen {
    pub fn route(&self) -> Option<Route> {
        match self {
            Screen::Loading => None,
            Screen::Login(_) => Some(Route::Login),
            Screen::Dashboard(_) => Some(Route::Dashboard),
        }
    }
}

pub struct App {
    ctx: AppContext,
    gate: SessionGate,
    nav_rx: watch::Receiver<Navigation>,
    screen: Screen,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        let nav_rx = ctx.navigator.subscribe();
        let gate = SessionGate::new(ctx.session.clone());
        Self {
            ctx,
            gate,
            nav_rx,
            screen: Screen::Loading,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn route(&self) -> Option<Route> {
        self.screen.route()
    }

    /// Resolve the session gate and mount the first screen
    pub async fn start(&mut self) -> Route {
        let route = self.gate.resolve();
        self.open(route).await;
        self.settle().await
    }

    /// Mount the screen for `requested`, subject to the session guard
    pub async fn open(&mut self, requested: Route) -> Route {
        let route = self.gate.guard(requested);
        if route != requested {
            debug!("No session, redirecting {} to {}", requested, route);
        }

        match route {
            Route::Login => {
                self.screen = Screen::Login(LoginView::new(
                    self.ctx.auth.clone(),
                    self.ctx.navigator.clone(),
                ));
            }
            Route::Dashboard => {
                let view = DashboardView::new(
                    self.ctx.auth.clone(),
                    self.ctx.api.clone(),
                    self.ctx.navigator.clone(),
                    self.ctx.notification_ttl,
                );
                self.screen = Screen::Dashboard(view.clone());
                // Failures publish a navigation that settle() picks up
                let _ = view.mount().await;
            }
        }
        route
    }

    /// Follow navigation requests published since the last call
    pub async fn settle(&mut self) -> Route {
        for _ in 0..MAX_REDIRECTS {
            if !self.nav_rx.has_changed().unwrap_or(false) {
                break;
            }
            let nav = *self.nav_rx.borrow_and_update();

            // Keep the login form (and its error) if it is already up
            if nav.route == Route::Login && matches!(self.screen, Screen::Login(_)) {
                continue;
            }
            if !nav.hard && self.route() == Some(nav.route) {
                continue;
            }
            self.open(nav.route).await;
        }
        self.route().unwrap_or(Route::Login)
    }
}
