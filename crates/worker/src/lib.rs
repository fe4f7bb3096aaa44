//! Offline interception engine for sahifa.
//!
//! Every outgoing request from the page is handed to [`WorkerEngine`], which
//! walks an ordered [`RouteTable`], runs the matched caching strategy against
//! the persistent stores, and falls back to the precached entry point for
//! unmatched navigations. [`WorkerHost`] owns the install/activate lifecycle
//! of precache versions and the `SKIP_WAITING` control message.

pub mod engine;
pub mod lifecycle;
pub mod net;
pub mod precache;
pub mod request;
pub mod routes;
pub mod strategy;

pub use engine::{Handled, WorkerEngine};
pub use lifecycle::{ClientMessage, WorkerHost, WorkerState, WorkerVersion};
pub use net::{FetchedResponse, Network};
pub use precache::{InstallReport, ManifestEntry, PrecacheManifest};
pub use request::{Destination, Method, RequestInfo};
pub use routes::{RouteAction, RoutePredicate, RouteRule, RouteTable};
pub use strategy::{ServedFrom, StrategyKind, StrategyOutcome, WorkerResponse};
