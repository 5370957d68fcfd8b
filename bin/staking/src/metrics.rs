//! Prometheus metrics for the staking client.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;
use withdrawal::WithdrawalSummary;

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceResult {
    Confirmed,
    /// Final transaction submitted, receipt still outstanding
    Pending,
    /// Precondition failed, nothing submitted
    Invalid,
    Rejected,
    Failed,
}

impl SequenceResult {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Invalid => "invalid",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Aggregated metrics for the staking client.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "staking_sequences_total",
            "User actions by kind and result"
        );
        describe_histogram!(
            "staking_sequence_duration_seconds",
            "Time from submission start to result, by kind"
        );
        describe_counter!(
            "staking_transactions_submitted_total",
            "Transactions accepted by the wallet, by step label"
        );
        describe_gauge!(
            "staking_withdrawal_requests",
            "Withdrawal requests of the connected account by state"
        );
    }

    /// Record a finished user action.
    pub fn record_sequence(&self, kind: &'static str, result: SequenceResult, duration: Duration) {
        counter!("staking_sequences_total", "kind" => kind, "result" => result.as_str())
            .increment(1);
        histogram!("staking_sequence_duration_seconds", "kind" => kind)
            .record(duration.as_secs_f64());
    }

    /// Record submitted transactions.
    pub fn record_submitted(&self, labels: impl IntoIterator<Item = &'static str>) {
        for label in labels {
            counter!("staking_transactions_submitted_total", "step" => label).increment(1);
        }
    }

    /// Publish withdrawal request counts.
    pub fn set_withdrawals(&self, summary: &WithdrawalSummary) {
        gauge!("staking_withdrawal_requests", "state" => "pending")
            .set(summary.pending_count as f64);
        gauge!("staking_withdrawal_requests", "state" => "ready").set(summary.ready_count as f64);
        gauge!("staking_withdrawal_requests", "state" => "claimed")
            .set(summary.claimed_count as f64);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
