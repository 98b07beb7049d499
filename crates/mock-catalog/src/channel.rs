//! Notification channel double.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watch_core::{NotificationChannel, NotifyError, PriceDrop};

/// A channel that records every delivery instead of sending it.
///
/// Individual chat IDs can be marked as failing to exercise the
/// all-or-nothing retry policy of the notify processor.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<(i64, PriceDrop)>>>,
    failing: Arc<Mutex<HashSet<i64>>>,
}

impl RecordingChannel {
    /// Create a channel that accepts every delivery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries to the given chat fail.
    pub fn fail_chat(&self, chat_id: i64) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    /// All successful deliveries so far, in delivery-attempt order.
    pub fn sent(&self) -> Vec<(i64, PriceDrop)> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of successful deliveries so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn notify(&self, chat_id: i64, price_drop: &PriceDrop) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(NotifyError::Rejected {
                chat_id,
                message: "simulated delivery failure".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id, price_drop.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingChannel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_drop() -> PriceDrop {
        PriceDrop {
            asin: "B012345678".to_string(),
            title: "Widget".to_string(),
            url: "https://www.amazon.com/dp/B012345678".to_string(),
            old_price: 100.0,
            new_price: 80.0,
        }
    }

    #[tokio::test]
    async fn test_records_and_fails_selectively() {
        let channel = RecordingChannel::new();
        channel.fail_chat(13);

        channel.notify(7, &sample_drop()).await.unwrap();
        let result = channel.notify(13, &sample_drop()).await;
        assert!(matches!(result, Err(NotifyError::Rejected { chat_id: 13, .. })));

        assert_eq!(channel.sent_count(), 1);
        assert_eq!(channel.sent()[0].0, 7);
    }
}
