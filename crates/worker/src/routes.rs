//! Ordered request routing.
//!
//! Routes are evaluated in registration order and the first match wins, so
//! narrower rules must be registered ahead of broader ones. The default table
//! built by [`RouteTable::from_config`] mirrors the deployed setup: API reads,
//! then static assets, then the navigation fallback.

use regex::Regex;
use sahifa_core::cache::{API_CACHE, STATIC_ASSETS};
use sahifa_core::{AppConfig, ExpirationRule};

use crate::request::{Destination, RequestInfo};
use crate::strategy::StrategyKind;

/// How a rule decides whether it applies to a request.
#[derive(Debug, Clone)]
pub enum RoutePredicate {
    /// URL path starts with the given prefix.
    PathPrefix(String),
    /// URL path matches the given pattern.
    PathRegex(Regex),
    /// Request destination is one of the listed kinds.
    Destinations(Vec<Destination>),
    /// Full-page navigation request.
    Navigation,
}

impl RoutePredicate {
    pub fn matches(&self, request: &RequestInfo) -> bool {
        match self {
            RoutePredicate::PathPrefix(prefix) => request.url.path().starts_with(prefix.as_str()),
            RoutePredicate::PathRegex(pattern) => pattern.is_match(request.url.path()),
            RoutePredicate::Destinations(kinds) => kinds.contains(&request.destination),
            RoutePredicate::Navigation => request.is_navigation(),
        }
    }
}

/// What happens when a rule matches.
#[derive(Debug, Clone)]
pub enum RouteAction {
    /// Run a caching strategy against a named store.
    Strategy { kind: StrategyKind, store: String, expiration: ExpirationRule },
    /// Serve the precached entry point.
    NavigationFallback,
}

/// One predicate/action pair in the table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub predicate: RoutePredicate,
    pub action: RouteAction,
}

/// Ordered list of routing rules; first match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The deployed routing table: API prefix first, then sub-resource
    /// destinations, then the navigation fallback as the last rule.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(vec![
            RouteRule {
                predicate: RoutePredicate::PathPrefix(config.api_prefix.clone()),
                action: RouteAction::Strategy {
                    kind: StrategyKind::for_api(config),
                    store: API_CACHE.to_string(),
                    expiration: config.api_expiration(),
                },
            },
            RouteRule {
                predicate: RoutePredicate::Destinations(vec![Destination::Style, Destination::Script, Destination::Image]),
                action: RouteAction::Strategy {
                    kind: StrategyKind::CacheFirst,
                    store: STATIC_ASSETS.to_string(),
                    expiration: config.static_expiration(),
                },
            },
            RouteRule { predicate: RoutePredicate::Navigation, action: RouteAction::NavigationFallback },
        ])
    }

    /// First rule whose predicate matches, in registration order.
    pub fn match_request(&self, request: &RequestInfo) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.predicate.matches(request))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use url::Url;

    fn request(path: &str, destination: Destination) -> RequestInfo {
        let url = Url::parse(&format!("http://localhost:8000{path}")).unwrap();
        RequestInfo::new(Method::Get, url, destination)
    }

    #[test]
    fn test_first_match_wins() {
        let config = AppConfig::default();
        let table = RouteTable::from_config(&config);

        // An API document request hits the API rule, not the navigation rule.
        let req = request("/api/v1/knowledge/search", Destination::Document);
        let rule = table.match_request(&req).unwrap();
        match &rule.action {
            RouteAction::Strategy { store, .. } => assert_eq!(store, API_CACHE),
            RouteAction::NavigationFallback => panic!("API prefix must match before navigation"),
        }
    }

    #[test]
    fn test_static_destinations() {
        let config = AppConfig::default();
        let table = RouteTable::from_config(&config);

        for destination in [Destination::Style, Destination::Script, Destination::Image] {
            let rule = table.match_request(&request("/assets/app.bin", destination)).unwrap();
            match &rule.action {
                RouteAction::Strategy { kind, store, .. } => {
                    assert_eq!(store, STATIC_ASSETS);
                    assert!(matches!(kind, StrategyKind::CacheFirst));
                }
                RouteAction::NavigationFallback => panic!("static assets route to a strategy"),
            }
        }
    }

    #[test]
    fn test_navigation_fallback_is_last() {
        let config = AppConfig::default();
        let table = RouteTable::from_config(&config);

        let rule = table.match_request(&request("/surah/2", Destination::Document)).unwrap();
        assert!(matches!(rule.action, RouteAction::NavigationFallback));
    }

    #[test]
    fn test_no_match() {
        let config = AppConfig::default();
        let table = RouteTable::from_config(&config);

        // A font request is neither API, static-listed, nor a navigation.
        let req = request("/fonts/uthmani.woff2", Destination::Font);
        assert!(table.match_request(&req).is_none());
    }

    #[test]
    fn test_path_regex_predicate() {
        let predicate = RoutePredicate::PathRegex(Regex::new(r"\.(?:png|jpg|svg)$").unwrap());
        assert!(predicate.matches(&request("/img/logo.svg", Destination::Other)));
        assert!(!predicate.matches(&request("/img/logo.webp", Destination::Other)));
    }
}
