//! Worker version lifecycle.
//!
//! A new build installs its precache manifest and then either activates
//! immediately (no controlled clients, or no active version yet) or parks as
//! the waiting version until the last client disconnects. A `SKIP_WAITING`
//! message from the page promotes the waiting version right away.

use std::sync::Arc;

use sahifa_core::{CacheDb, Error};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::net::Network;
use crate::precache::{self, InstallReport, PrecacheManifest};

/// Lifecycle state of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

/// Control messages the page can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// One installed build: its manifest and where it is in the lifecycle.
#[derive(Debug, Clone)]
pub struct WorkerVersion {
    pub manifest: PrecacheManifest,
    pub state: WorkerState,
}

/// Owns the active and waiting versions and drives transitions between them.
pub struct WorkerHost {
    cache: CacheDb,
    network: Arc<dyn Network>,
    base: Url,
    active: Option<WorkerVersion>,
    waiting: Option<WorkerVersion>,
    controlled_clients: usize,
}

impl WorkerHost {
    pub fn new(cache: CacheDb, network: Arc<dyn Network>, base: Url) -> Self {
        Self { cache, network, base, active: None, waiting: None, controlled_clients: 0 }
    }

    pub fn active(&self) -> Option<&WorkerVersion> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&WorkerVersion> {
        self.waiting.as_ref()
    }

    pub fn controlled_clients(&self) -> usize {
        self.controlled_clients
    }

    /// Install a new build.
    ///
    /// A failed install leaves the current active version untouched. A
    /// successful one activates immediately when nothing would be disrupted,
    /// otherwise it replaces any previously waiting version.
    pub async fn install(&mut self, manifest: PrecacheManifest) -> Result<InstallReport, Error> {
        let mut version = WorkerVersion { manifest, state: WorkerState::Installing };
        let report = precache::install(&self.cache, &self.network, &self.base, &version.manifest).await?;
        version.state = WorkerState::Installed;

        if self.active.is_none() || self.controlled_clients == 0 {
            self.activate_version(version).await?;
        } else {
            info!("new version waiting behind {} controlled clients", self.controlled_clients);
            self.waiting = Some(version);
        }

        Ok(report)
    }

    /// Promote the waiting version, if any.
    pub async fn activate_waiting(&mut self) -> Result<(), Error> {
        if let Some(version) = self.waiting.take() {
            self.activate_version(version).await?;
        }
        Ok(())
    }

    /// Handle a control message posted by the page.
    pub async fn handle_message(&mut self, message: ClientMessage) -> Result<(), Error> {
        match message {
            ClientMessage::SkipWaiting => {
                info!("skip-waiting requested");
                self.activate_waiting().await
            }
        }
    }

    pub fn client_connected(&mut self) {
        self.controlled_clients += 1;
    }

    /// A controlled client went away; the waiting version activates once the
    /// last one is gone.
    pub async fn client_disconnected(&mut self) -> Result<(), Error> {
        self.controlled_clients = self.controlled_clients.saturating_sub(1);
        if self.controlled_clients == 0 {
            self.activate_waiting().await?;
        }
        Ok(())
    }

    async fn activate_version(&mut self, mut version: WorkerVersion) -> Result<(), Error> {
        version.state = WorkerState::Activating;
        precache::activate(&self.cache, &version.manifest).await?;
        version.state = WorkerState::Active;

        if self.active.replace(version).is_some() {
            info!("previous version retired");
        }
        info!("worker version active");
        Ok(())
    }
}
