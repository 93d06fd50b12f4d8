use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, TextEncoder};

static RECONNECTS_SCHEDULED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "notification_client_reconnects_scheduled_total",
        "Reconnect attempts scheduled after an unexpected socket close",
    )
    .expect("failed to create notification_client_reconnects_scheduled_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register notification_client_reconnects_scheduled_total");
    counter
});

static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "notification_client_messages_total",
            "Socket messages received, by parse outcome",
        ),
        &["outcome"],
    )
    .expect("failed to create notification_client_messages_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register notification_client_messages_total");
    counter
});

static CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "notification_client_connected",
        "1 while the notification socket reports connected",
    )
    .expect("failed to create notification_client_connected");
    prometheus::default_registry()
        .register(Box::new(gauge.clone()))
        .expect("failed to register notification_client_connected");
    gauge
});

pub fn record_reconnect_scheduled() {
    RECONNECTS_SCHEDULED_TOTAL.inc();
}

pub fn record_message(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    MESSAGES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn set_connected(connected: bool) {
    CONNECTED.set(i64::from(connected));
}

pub fn reconnects_scheduled() -> u64 {
    RECONNECTS_SCHEDULED_TOTAL.get()
}

pub fn messages(outcome: &str) -> u64 {
    MESSAGES_TOTAL.with_label_values(&[outcome]).get()
}

/// Prometheus text exposition of everything in the default registry
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %err, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_client_metrics() {
        record_message(false);
        set_connected(false);
        record_reconnect_scheduled();

        let text = render();
        assert!(text.contains("notification_client_messages_total"));
        assert!(text.contains("notification_client_connected"));
        assert!(reconnects_scheduled() >= 1);
        assert!(messages("rejected") >= 1);
    }
}
