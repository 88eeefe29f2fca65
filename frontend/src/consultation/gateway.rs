use std::collections::BTreeMap;

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::consultation::errors::SubmissionError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: String,
}

/// One attempt per call, no automatic retry.
#[async_trait(?Send)]
pub trait SubmissionGateway {
    async fn submit(&self, payload: BTreeMap<String, String>) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Stand-in for the lead API: waits, then always accepts.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedGateway {
    /// Prefix of the receipt id, also used in the log line.
    form: &'static str,
    latency_ms: u32,
}

impl SimulatedGateway {
    pub fn new(form: &'static str, latency_ms: u32) -> Self {
        Self { form, latency_ms }
    }

    pub fn consultation() -> Self {
        Self::new("consultation", config::simulated_latency_ms(config::CONSULTATION_LATENCY_MS))
    }

    fn receipt_id(&self) -> String {
        format!("{}_{}", self.form, uuid::Uuid::new_v4().simple())
    }
}

#[async_trait(?Send)]
impl SubmissionGateway for SimulatedGateway {
    async fn submit(&self, payload: BTreeMap<String, String>) -> Result<SubmissionReceipt, SubmissionError> {
        TimeoutFuture::new(self.latency_ms).await;

        let body = serde_json::to_string(&payload).map_err(|e| SubmissionError::new(e.to_string()))?;
        info!("{} form submitted: {}", self.form, body);

        Ok(SubmissionReceipt { id: self.receipt_id() })
    }
}
