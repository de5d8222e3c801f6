use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{BuyerProfile, BuyerProfileId, MatchRecord, Property, PropertyId};
use super::repository::{ContactDirectory, MatchStore, MessageSender};
use crate::config::NotificationPolicy;

/// Number of match reasons included in a notification.
pub const NOTIFIED_REASON_COUNT: usize = 3;

/// Per-batch notification accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub skipped_no_address: usize,
    pub skipped_already_notified: usize,
    pub failed: usize,
}

/// Renders matches into channel messages and sends them one recipient at a time.
///
/// A failure for one recipient is logged and counted; it never stops the batch and is
/// never retried.
pub struct NotificationDispatcher {
    contacts: Arc<dyn ContactDirectory>,
    sender: Arc<dyn MessageSender>,
    store: Arc<dyn MatchStore>,
    policy: NotificationPolicy,
}

impl NotificationDispatcher {
    pub fn new(
        contacts: Arc<dyn ContactDirectory>,
        sender: Arc<dyn MessageSender>,
        store: Arc<dyn MatchStore>,
        policy: NotificationPolicy,
    ) -> Self {
        Self {
            contacts,
            sender,
            store,
            policy,
        }
    }

    /// Successfully sent records are marked notified both in the store and in `matches`.
    pub fn dispatch(
        &self,
        matches: &mut [MatchRecord],
        properties: &HashMap<PropertyId, Property>,
        buyers: &HashMap<BuyerProfileId, BuyerProfile>,
        now: DateTime<Utc>,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for record in matches {
            if self.policy == NotificationPolicy::UnnotifiedOnly && record.notified {
                summary.skipped_already_notified += 1;
                continue;
            }

            let (Some(property), Some(buyer)) = (
                properties.get(&record.key.property_id),
                buyers.get(&record.key.buyer_profile_id),
            ) else {
                warn!(
                    property_id = %record.key.property_id,
                    buyer_profile_id = %record.key.buyer_profile_id,
                    "match references an entity missing from the run; notification skipped"
                );
                summary.failed += 1;
                continue;
            };

            let address = match self.contacts.outbound_address(&buyer.contact_id) {
                Ok(Some(address)) => address,
                Ok(None) => {
                    debug!(
                        buyer_profile_id = %buyer.id,
                        contact_id = %buyer.contact_id,
                        "buyer has no outbound address; notification skipped"
                    );
                    summary.skipped_no_address += 1;
                    continue;
                }
                Err(err) => {
                    warn!(buyer_profile_id = %buyer.id, error = %err, "contact lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };

            let body = render_match_message(property, record);
            if let Err(err) = self.sender.send_text(&address, &body) {
                warn!(
                    buyer_profile_id = %buyer.id,
                    property_id = %property.id,
                    error = %err,
                    "match notification failed"
                );
                summary.failed += 1;
                continue;
            }

            summary.sent += 1;
            record.notified = true;
            record.notified_at = Some(now);
            if let Err(err) = self.store.mark_notified(&record.key, now) {
                warn!(
                    buyer_profile_id = %buyer.id,
                    property_id = %property.id,
                    error = %err,
                    "notification sent but match could not be marked notified"
                );
            }
        }

        summary
    }
}

/// Message text for one match: headline, location, price, specs, and the top reasons.
pub fn render_match_message(property: &Property, record: &MatchRecord) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "New property match ({}% fit): {}",
        record.match_score, property.title
    );
    let _ = writeln!(body, "Location: {}", property.location.display());
    let _ = writeln!(body, "Price: {}", property.price_label());
    let _ = writeln!(body, "{}", property.specifications.summary());

    let reasons = record.top_reasons(NOTIFIED_REASON_COUNT);
    if !reasons.is_empty() {
        body.push_str("\nWhy it fits:\n");
        for reason in reasons {
            let _ = writeln!(body, "- {reason}");
        }
    }

    body.trim_end().to_string()
}
