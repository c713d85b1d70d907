//! Route classification and the navigation guard.
//!
//! The guard is consulted before every page is shown. It is independent of
//! any particular router: front-ends implement `Navigator` and hand it in.

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{decide, GuardDecision, Resolution, RouteGuard, MAX_REDIRECT_HOPS};
pub use navigator::{NavigationEvent, NavigationLog, Navigator};
pub use routes::{normalize_path, PublicRoute, RouteConfig, DEFAULT_REGISTER_PATH};
