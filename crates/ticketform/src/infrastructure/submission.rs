//! Ticket submitters

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::ports::outbound::{Submission, SubmissionReceipt, SubmitError, TicketSubmitter};

/// Stands in for the network: waits a fixed delay, then accepts
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl TicketSubmitter for SimulatedSubmitter {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmitError> {
        tokio::time::sleep(self.delay).await;

        let receipt = SubmissionReceipt {
            ticket_id: format!("TKT-{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase()),
            submitted_at: Utc::now(),
        };
        info!(
            form = %submission.form_id,
            ticket = %receipt.ticket_id,
            fields = submission.data.len(),
            files = submission.files.len(),
            "Ticket submitted"
        );
        Ok(receipt)
    }
}
