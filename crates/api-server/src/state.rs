//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use hc_core::marketplace::FileMarketStore;
use hc_core::payment::{AutoApproveGateway, PaymentGateway};

use crate::auth::AuthStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    market: FileMarketStore,
    auth: AuthStore,
    payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf) -> hc_core::Result<Self> {
        let market = FileMarketStore::new(data_dir.join("market.json")).await?;
        let auth = AuthStore::new(data_dir.join("auth"))
            .await
            .map_err(|err| hc_core::Error::Storage(err.to_string()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                market,
                auth,
                payments: Arc::new(AutoApproveGateway),
            }),
        })
    }

    /// Get reference to the marketplace store
    pub fn market(&self) -> &FileMarketStore {
        &self.inner.market
    }

    /// Get reference to the user registry
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    /// Get the configured payment gateway
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }
}
