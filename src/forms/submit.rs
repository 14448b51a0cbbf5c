use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::error::{LogbookError, Result};

/// Outbound form endpoint. Treated as unreliable.
pub trait FormSubmitter {
    fn submit(&self, endpoint: &str, payload: &serde_json::Value) -> impl Future<Output = Result<()>>;
}

impl<F: FormSubmitter + ?Sized> FormSubmitter for &F {
    fn submit(&self, endpoint: &str, payload: &serde_json::Value) -> impl Future<Output = Result<()>> {
        (**self).submit(endpoint, payload)
    }
}

/// Posts JSON to a Formspree form.
pub struct FormspreeClient {
    client: reqwest::Client,
}

impl FormspreeClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LogbookError::Submission(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn post(&self, endpoint: &str, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(endpoint)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Form submission to {} failed: {}", endpoint, e);
                error!("{}", msg);
                LogbookError::Submission(msg)
            })?;

        let status = response.status();
        if !status.is_success() {
            let msg = format!("Form endpoint {} returned {}", endpoint, status);
            error!("{}", msg);
            return Err(LogbookError::Submission(msg));
        }

        info!("Submitted form to {}", endpoint);
        Ok(())
    }
}

impl FormSubmitter for FormspreeClient {
    fn submit(&self, endpoint: &str, payload: &serde_json::Value) -> impl Future<Output = Result<()>> {
        self.post(endpoint, payload)
    }
}
