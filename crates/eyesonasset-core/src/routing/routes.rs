use serde::{Deserialize, Serialize};

/// Default login surface
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Default landing page after login
pub const DEFAULT_HOME_PATH: &str = "/app/owner";

pub const DEFAULT_REGISTER_PATH: &str = "/auth/register";

/// A path reachable without a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRoute {
    pub path: String,
    /// Send already-authenticated visitors to the home path instead
    #[serde(default)]
    pub redirect_when_authenticated: bool,
}

impl PublicRoute {
    pub fn new(path: impl Into<String>, redirect_when_authenticated: bool) -> Self {
        Self {
            path: path.into(),
            redirect_when_authenticated,
        }
    }
}

/// Redirect targets and the public path list. Everything not listed is
/// protected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login_path: String,
    pub home_path: String,
    /// Sign-up surface; `null` turns registration off
    #[serde(default = "default_register_path")]
    pub register_path: Option<String>,
    pub public_routes: Vec<PublicRoute>,
}

fn default_register_path() -> Option<String> {
    Some(DEFAULT_REGISTER_PATH.to_string())
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            register_path: default_register_path(),
            public_routes: vec![
                PublicRoute::new(DEFAULT_LOGIN_PATH, true),
                PublicRoute::new(DEFAULT_REGISTER_PATH, true),
            ],
        }
    }
}

impl RouteConfig {
    pub fn find_public(&self, path: &str) -> Option<&PublicRoute> {
        let path = normalize_path(path);
        self.public_routes
            .iter()
            .find(|route| normalize_path(&route.path) == path)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.find_public(path).is_some()
    }

    /// True when `path` is the configured sign-up page
    pub fn is_register(&self, path: &str) -> bool {
        self.register_path
            .as_deref()
            .is_some_and(|register| normalize_path(register) == normalize_path(path))
    }

    /// Reject configurations that would make the guard redirect forever
    pub fn validate(&self) -> anyhow::Result<()> {
        for path in [&self.login_path, &self.home_path] {
            if !path.starts_with('/') {
                anyhow::bail!("Route {:?} must start with '/'", path);
            }
        }
        if !self.is_public(&self.login_path) {
            anyhow::bail!(
                "Login path {:?} must be listed as a public route",
                self.login_path
            );
        }
        if let Some(register) = &self.register_path {
            if !self.is_public(register) {
                anyhow::bail!(
                    "Register path {:?} must be listed as a public route",
                    register
                );
            }
        }
        if let Some(home) = self.find_public(&self.home_path) {
            if home.redirect_when_authenticated {
                anyhow::bail!(
                    "Home path {:?} cannot redirect authenticated users",
                    self.home_path
                );
            }
        }
        Ok(())
    }
}

/// Drop query string, fragment and trailing slash: `/app/owner/?x=1` and
/// `/app/owner` are the same route.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/app/owner"), "/app/owner");
        assert_eq!(normalize_path("/app/owner/"), "/app/owner");
        assert_eq!(normalize_path("/app/owner?page=2"), "/app/owner");
        assert_eq!(normalize_path("/auth/login#top"), "/auth/login");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_default_routes() {
        let routes = RouteConfig::default();
        assert!(routes.is_public("/auth/login"));
        assert!(routes.is_public("/auth/register/"));
        assert!(!routes.is_public("/app/owner"));
        assert!(!routes.is_public("/"));
        assert!(routes.validate().is_ok());
    }

    #[test]
    fn test_root_can_be_configured_public() {
        let mut routes = RouteConfig::default();
        routes.public_routes.push(PublicRoute::new("/", false));
        assert!(routes.is_public("/"));
        assert!(routes.is_public("/?ref=mail"));
    }

    #[test]
    fn test_validate_rejects_protected_login() {
        let routes = RouteConfig {
            public_routes: vec![],
            ..RouteConfig::default()
        };
        assert!(routes.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_redirecting_home() {
        let routes = RouteConfig {
            home_path: "/auth/login".to_string(),
            ..RouteConfig::default()
        };
        assert!(routes.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_paths() {
        let routes = RouteConfig {
            home_path: "app/owner".to_string(),
            ..RouteConfig::default()
        };
        assert!(routes.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_protected_register() {
        let routes = RouteConfig {
            public_routes: vec![PublicRoute::new(DEFAULT_LOGIN_PATH, true)],
            ..RouteConfig::default()
        };
        assert!(routes.validate().is_err());

        let routes = RouteConfig {
            register_path: None,
            ..routes
        };
        assert!(routes.validate().is_ok());
        assert!(!routes.is_register(DEFAULT_REGISTER_PATH));
    }

    #[test]
    fn test_register_path_defaults_when_missing() {
        let routes: RouteConfig = serde_json::from_str(
            r#"{"login_path":"/auth/login","home_path":"/app/owner","public_routes":[]}"#,
        )
        .unwrap();
        assert_eq!(routes.register_path.as_deref(), Some(DEFAULT_REGISTER_PATH));
        assert!(routes.is_register("/auth/register/"));

        let routes: RouteConfig = serde_json::from_str(
            r#"{"login_path":"/auth/login","home_path":"/app/owner","register_path":null,"public_routes":[]}"#,
        )
        .unwrap();
        assert_eq!(routes.register_path, None);
    }

    #[test]
    fn test_deserialize_without_flag() {
        let route: PublicRoute = serde_json::from_str(r#"{"path":"/about"}"#).unwrap();
        assert!(!route.redirect_when_authenticated);
    }
}
