//! NATS-backed sink for user lifecycle events.

use async_nats::Client;
use async_trait::async_trait;
use domain_users::{UserEvent, UserEventSink};
use tracing::{error, info, instrument};

/// Publishes user events to NATS subjects (`user.login`, `user.created`,
/// `user.updated`, `user.deleted`). Failures are logged and swallowed so a
/// broker outage never fails the request that triggered the event.
#[derive(Clone)]
pub struct NatsEventSink {
    client: Client,
}

impl NatsEventSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserEventSink for NatsEventSink {
    #[instrument(skip(self, event), fields(subject = event.action.subject(), user_id = %event.user_id))]
    async fn publish(&self, event: UserEvent) {
        let subject = event.action.subject();
        match serde_json::to_vec(&event) {
            Ok(payload) => {
                if let Err(e) = self.client.publish(subject.to_string(), payload.into()).await {
                    error!(error = %e, subject, "Failed to publish user event");
                } else {
                    info!(subject, "User event published");
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize user event");
            }
        }
    }
}
