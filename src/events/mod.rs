use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    /// Event delivery is best-effort; domain operations never fail on it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

// The events that can occur in the catalog system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Product events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),

    // Option events
    OptionCreated {
        product_id: Uuid,
        option_id: Uuid,
    },
    OptionDeleted {
        product_id: Uuid,
        option_id: Uuid,
        variants_removed: u64,
    },
    OptionValueCreated {
        option_id: Uuid,
        value_id: Uuid,
    },
    OptionValueUpdated {
        value_id: Uuid,
        visible: bool,
    },
    OptionValueDeleted {
        option_id: Uuid,
        value_id: Uuid,
        variants_removed: u64,
    },

    // Variant matrix events
    VariantsGenerated {
        product_id: Uuid,
        created: u64,
        skipped_conflicts: u64,
    },
    VariantUpdated {
        product_id: Uuid,
        variant_id: Uuid,
    },
    VariantDeleted {
        product_id: Uuid,
        variant_id: Uuid,
    },
    TemplateApplied {
        product_id: Uuid,
        template: String,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Handlers implementing this trait process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Processes incoming events. Most events are only logged; generation
// conflicts get a warning because repeated occurrences indicate a UI
// double-submit pattern worth fixing upstream.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::VariantsGenerated {
                product_id,
                created,
                skipped_conflicts,
            } => {
                info!(
                    "Variant generation for product {}: created={}",
                    product_id, created
                );
                if *skipped_conflicts > 0 {
                    warn!(
                        "Variant generation for product {} skipped {} combinations already \
                         inserted by a concurrent call",
                        product_id, skipped_conflicts
                    );
                }
            }
            Event::OptionDeleted {
                product_id,
                option_id,
                variants_removed,
            } => {
                info!(
                    "Option {} deleted from product {} (cascade removed {} variants)",
                    option_id, product_id, variants_removed
                );
            }
            Event::OptionValueDeleted {
                option_id,
                value_id,
                variants_removed,
            } => {
                info!(
                    "Value {} deleted from option {} (cascade removed {} variants)",
                    value_id, option_id, variants_removed
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}
