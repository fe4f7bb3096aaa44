//! Request interception engine.
//!
//! The engine glues the route table to the strategies: every request from the
//! page goes through [`WorkerEngine::handle_request`], which either produces a
//! response from a strategy or a precached document, or declares the request
//! pass-through so the page talks to the network directly.

use std::sync::Arc;

use sahifa_core::{AppConfig, CacheDb, Error};
use tracing::debug;

use crate::net::Network;
use crate::request::{Method, RequestInfo};
use crate::routes::{RouteAction, RouteTable};
use crate::strategy::{self, StrategyOutcome, WorkerResponse};

/// Outcome of intercepting one request.
#[derive(Debug)]
pub enum Handled {
    /// The engine produced a response.
    Response(StrategyOutcome),
    /// No rule applies; the request goes to the network untouched.
    PassThrough,
}

/// The interception engine: route table plus the stores and the upstream.
pub struct WorkerEngine {
    cache: CacheDb,
    network: Arc<dyn Network>,
    routes: RouteTable,
    entry_point: String,
}

impl WorkerEngine {
    pub fn new(cache: CacheDb, network: Arc<dyn Network>, routes: RouteTable, entry_point: String) -> Self {
        Self { cache, network, routes, entry_point }
    }

    /// Engine with the deployed routing table.
    pub fn from_config(cache: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Self {
        Self::new(cache, network, RouteTable::from_config(config), config.entry_point.clone())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Intercept one request.
    ///
    /// Non-GET requests and requests no rule matches pass through. A matched
    /// navigation with no installed entry point is a cache miss, not a
    /// pass-through, so the page can surface the offline state.
    pub async fn handle_request(&self, request: &RequestInfo) -> Result<Handled, Error> {
        if request.method != Method::Get {
            debug!(method = request.method.as_str(), url = %request.url, "non-GET, passing through");
            return Ok(Handled::PassThrough);
        }

        let Some(rule) = self.routes.match_request(request) else {
            debug!(url = %request.url, "no route, passing through");
            return Ok(Handled::PassThrough);
        };

        match &rule.action {
            RouteAction::Strategy { kind, store, expiration } => {
                let outcome = strategy::run(kind, &self.cache, &self.network, store, *expiration, &request.url).await?;
                Ok(Handled::Response(outcome))
            }
            RouteAction::NavigationFallback => {
                let entry = self
                    .cache
                    .get_precache_entry(&self.entry_point)
                    .await?
                    .ok_or_else(|| Error::CacheMiss(format!("precache: {}", self.entry_point)))?;
                Ok(Handled::Response(StrategyOutcome {
                    response: WorkerResponse::from_precache(entry),
                    revalidation: None,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::MockNetwork;
    use crate::precache::{ManifestEntry, PrecacheManifest};
    use crate::request::Destination;
    use crate::strategy::ServedFrom;
    use sahifa_core::config::ApiStrategy;
    use url::Url;

    async fn engine_with(mock: &Arc<MockNetwork>, config: &AppConfig) -> WorkerEngine {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let network: Arc<dyn Network> = mock.clone();
        WorkerEngine::from_config(cache, network, config)
    }

    async fn install_shell(engine: &WorkerEngine, mock: &Arc<MockNetwork>) {
        mock.insert("http://localhost:8000/index.html", 200, b"<html>shell</html>");
        let manifest = PrecacheManifest::new(vec![ManifestEntry {
            url: "/index.html".to_string(),
            revision: "r1".to_string(),
        }]);
        let base = Url::parse("http://localhost:8000").unwrap();
        crate::precache::install(&engine.cache, &engine.network, &base, &manifest)
            .await
            .unwrap();
    }

    fn response(handled: Handled) -> WorkerResponse {
        match handled {
            Handled::Response(outcome) => outcome.response,
            Handled::PassThrough => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_offline_navigation_serves_precached_shell() {
        let mock = MockNetwork::new();
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;
        install_shell(&engine, &mock).await;

        mock.set_offline(true);
        let req = RequestInfo::navigation(Url::parse("http://localhost:8000/surah/2").unwrap());
        let response = response(engine.handle_request(&req).await.unwrap());
        assert_eq!(response.served_from, ServedFrom::Precache);
        assert_eq!(response.body.as_ref(), b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_navigation_without_installed_shell_is_cache_miss() {
        let mock = MockNetwork::new();
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;

        let req = RequestInfo::navigation(Url::parse("http://localhost:8000/surah/2").unwrap());
        let result = engine.handle_request(&req).await;
        assert!(matches!(result, Err(Error::CacheMiss(_))));
    }

    #[tokio::test]
    async fn test_post_passes_through() {
        let mock = MockNetwork::new();
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;

        let url = Url::parse("http://localhost:8000/api/v1/scholars/register").unwrap();
        let req = RequestInfo::new(Method::Post, url, Destination::Other);
        assert!(matches!(engine.handle_request(&req).await.unwrap(), Handled::PassThrough));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unmatched_request_passes_through() {
        let mock = MockNetwork::new();
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;

        let url = Url::parse("http://localhost:8000/fonts/uthmani.woff2").unwrap();
        let req = RequestInfo::get(url, Destination::Font);
        assert!(matches!(engine.handle_request(&req).await.unwrap(), Handled::PassThrough));
    }

    #[tokio::test]
    async fn test_api_request_cached_then_served_offline() {
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/api/v1/knowledge", 200, b"{\"text\":\"x\"}");
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;

        let url = Url::parse("http://localhost:8000/api/v1/knowledge").unwrap();
        let req = RequestInfo::get(url, Destination::Other);
        let online = response(engine.handle_request(&req).await.unwrap());
        assert_eq!(online.served_from, ServedFrom::Network);

        mock.set_offline(true);
        let offline = response(engine.handle_request(&req).await.unwrap());
        assert_eq!(offline.served_from, ServedFrom::Cache);
        assert_eq!(offline.body.as_ref(), b"{\"text\":\"x\"}");
    }

    #[tokio::test]
    async fn test_api_route_honors_swr_configuration() {
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/api/v1/knowledge", 200, b"v1");
        let config = AppConfig { api_strategy: ApiStrategy::StaleWhileRevalidate, ..AppConfig::default() };
        let engine = engine_with(&mock, &config).await;

        let url = Url::parse("http://localhost:8000/api/v1/knowledge").unwrap();
        let req = RequestInfo::get(url, Destination::Other);

        // First hit populates the store from the network.
        response(engine.handle_request(&req).await.unwrap());

        // Second hit is served from cache with a background refresh.
        let handled = engine.handle_request(&req).await.unwrap();
        let Handled::Response(outcome) = handled else { panic!("expected a response") };
        assert_eq!(outcome.response.served_from, ServedFrom::Cache);
        outcome.revalidation.unwrap().await.unwrap();
        // One fetch for the initial miss, one for the revalidation.
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_static_asset_served_from_cache_when_offline() {
        let mock = MockNetwork::new();
        mock.insert("http://localhost:8000/assets/app.css", 200, b"body{}");
        let config = AppConfig::default();
        let engine = engine_with(&mock, &config).await;

        let url = Url::parse("http://localhost:8000/assets/app.css").unwrap();
        let req = RequestInfo::get(url, Destination::Style);
        response(engine.handle_request(&req).await.unwrap());

        mock.set_offline(true);
        let offline = response(engine.handle_request(&req).await.unwrap());
        assert_eq!(offline.served_from, ServedFrom::Cache);
    }
}
