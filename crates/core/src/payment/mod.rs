//! Payment gateway abstraction
//!
//! Confirming a booking charges the configured gateway first; a failed charge
//! leaves the booking pending. The development gateway approves everything.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// How the guest pays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PaymentMethod {
    /// A tokenized card reference from the payment form
    Card { token: String },
    /// Settle at the property on arrival
    OnArrival,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::OnArrival
    }
}

/// Proof of a successful charge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub amount: f64,
    pub charged_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
}

/// Seam to a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` using `method`, returning a receipt on success.
    async fn charge(&self, amount: f64, method: &PaymentMethod) -> Result<Receipt, PaymentError>;
}

/// Gateway used in development and demos: every charge succeeds.
pub struct AutoApproveGateway;

#[async_trait]
impl PaymentGateway for AutoApproveGateway {
    async fn charge(&self, amount: f64, _method: &PaymentMethod) -> Result<Receipt, PaymentError> {
        Ok(Receipt {
            id: Uuid::new_v4(),
            amount,
            charged_at: Utc::now(),
        })
    }
}
