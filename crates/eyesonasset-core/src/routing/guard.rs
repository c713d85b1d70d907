use tracing::{debug, warn};

use crate::auth::SessionEvaluator;

use super::navigator::Navigator;
use super::routes::{normalize_path, RouteConfig};

/// Upper bound on redirects followed for one navigation
pub const MAX_REDIRECT_HOPS: usize = 4;

/// Outcome of guarding one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    PublicAllowed,
    ProtectedAllowed,
    RedirectToLogin,
    RedirectToHome,
}

impl GuardDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, GuardDecision::PublicAllowed | GuardDecision::ProtectedAllowed)
    }

    pub fn redirect_target(self, routes: &RouteConfig) -> Option<&str> {
        match self {
            GuardDecision::RedirectToLogin => Some(&routes.login_path),
            GuardDecision::RedirectToHome => Some(&routes.home_path),
            _ => None,
        }
    }
}

/// The transition table, without side effects. Rules apply in order:
///
/// 1. public, no session: render it
/// 2. protected, no session: go to login
/// 3. public with `redirect_when_authenticated`, session: go home
/// 4. anything else renders
pub fn decide(routes: &RouteConfig, path: &str, session_valid: bool) -> GuardDecision {
    let public = routes.find_public(path);
    match (public, session_valid) {
        (Some(_), false) => GuardDecision::PublicAllowed,
        (None, false) => GuardDecision::RedirectToLogin,
        (Some(route), true) if route.redirect_when_authenticated => GuardDecision::RedirectToHome,
        (Some(_), true) => GuardDecision::PublicAllowed,
        (None, true) => GuardDecision::ProtectedAllowed,
    }
}

/// Where a navigation finally landed after following redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: String,
    pub decision: GuardDecision,
    pub redirects: usize,
}

/// Guards navigation using the live session state.
///
/// Nothing is cached between calls: validity is re-read on every
/// navigation, so expiry and logout elsewhere are seen immediately.
#[derive(Clone)]
pub struct RouteGuard {
    routes: RouteConfig,
    evaluator: SessionEvaluator,
}

impl RouteGuard {
    pub fn new(routes: RouteConfig, evaluator: SessionEvaluator) -> anyhow::Result<Self> {
        routes.validate()?;
        Ok(Self { routes, evaluator })
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    pub fn evaluator(&self) -> &SessionEvaluator {
        &self.evaluator
    }

    pub fn evaluate(&self, path: &str) -> GuardDecision {
        let decision = decide(&self.routes, path, self.evaluator.is_valid());
        debug!(path, ?decision, "Route guard evaluated");
        decision
    }

    /// Evaluate `path` and tell `navigator` to render it or go elsewhere
    pub fn navigate<N: Navigator + ?Sized>(&self, path: &str, navigator: &mut N) -> GuardDecision {
        let decision = self.evaluate(path);
        match decision.redirect_target(&self.routes) {
            Some(target) => navigator.redirect(target),
            None => navigator.allow(path),
        }
        decision
    }

    /// Follow redirects until a page is allowed. Each hop is evaluated
    /// afresh, as a router would when the redirect triggers a navigation.
    pub fn resolve(&self, path: &str) -> Resolution {
        let mut current = normalize_path(path).to_string();
        let mut redirects = 0;
        loop {
            let decision = self.evaluate(&current);
            match decision.redirect_target(&self.routes) {
                Some(target) if redirects < MAX_REDIRECT_HOPS => {
                    current = target.to_string();
                    redirects += 1;
                }
                Some(_) => {
                    warn!(path = %current, "Redirect limit reached, sending to login");
                    return Resolution {
                        path: self.routes.login_path.clone(),
                        decision: GuardDecision::PublicAllowed,
                        redirects,
                    };
                }
                None => {
                    return Resolution {
                        path: current,
                        decision,
                        redirects,
                    }
                }
            }
        }
    }
}
