use metrics::counter;

/// Count one fetch by outcome (`success` or `failure`).
pub fn record_fetch(outcome: &'static str) {
    counter!("notification_fetch_total", "outcome" => outcome).increment(1);
}
