//! Prometheus Metrics for the Guide Reputation Ledger
//!
//! - **Guide Metrics**: registrations, tracked/verified guides, verification edges
//! - **Feedback Metrics**: submissions, recorded ratings, rating component distribution
//! - **Reward Metrics**: issued rewards and credited value
//! - **Rejections**: failed operations by operation and error kind
//!
//! Metrics are registered on a [`Registry`] and can be rendered in the text
//! exposition format with [`gather_text`].

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_vec_with_registry,
    register_int_gauge_with_registry, Encoder, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use lazy_static::lazy_static;
use parking_lot::RwLock;

/// Buckets for single rating components (1 to 5)
const RATING_COMPONENT_BUCKETS: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0];

lazy_static! {
    /// Global registry and the metrics registered on it
    static ref METRICS_REGISTRY: Arc<RwLock<Option<(Registry, Arc<ReputationMetrics>)>>> =
        Arc::new(RwLock::new(None));
}

/// Metrics collection for the reputation ledger
pub struct ReputationMetrics {
    // === GUIDE METRICS ===

    /// Total successful registrations, founding appointments included (Counter)
    pub guides_registered_total: IntCounter,

    /// Number of guide records (Gauge)
    pub guides_tracked: IntGauge,

    /// Number of currently verified guides (Gauge)
    pub guides_verified: IntGauge,

    /// Verification edges by direction: promoted / demoted (Counter)
    pub verification_transitions_total: IntCounterVec,

    /// Overall fixed-point average per guide, scaled by 1000 (Gauge)
    pub guide_overall_average: IntGaugeVec,

    // === FEEDBACK METRICS ===

    /// Total feedback entries submitted (Counter)
    pub feedback_submitted_total: IntCounter,

    /// Total ratings recorded (Counter)
    pub ratings_recorded_total: IntCounter,

    /// Distribution of rating components by metric (Histogram)
    pub rating_component: HistogramVec,

    // === REWARD METRICS ===

    /// Number of rewards issued (Counter)
    pub rewards_issued_total: IntCounter,

    /// Total value credited by rewards (Counter)
    pub rewards_issued_value: IntCounter,

    // === REJECTIONS ===

    /// Failed operations by operation and error kind (Counter)
    pub operations_rejected_total: IntCounterVec,
}

impl ReputationMetrics {
    /// Create and register the metrics collection on `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let guides_registered_total = register_int_counter_with_registry!(
            Opts::new("guidenet_guides_registered_total", "Total successful guide registrations"),
            registry
        )?;

        let guides_tracked = register_int_gauge_with_registry!(
            Opts::new("guidenet_guides_tracked", "Number of guide records"),
            registry
        )?;

        let guides_verified = register_int_gauge_with_registry!(
            Opts::new("guidenet_guides_verified", "Number of currently verified guides"),
            registry
        )?;

        let verification_transitions_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "guidenet_verification_transitions_total",
                "Verification state edges by direction"
            ),
            &["direction"],
            registry
        )?;

        let guide_overall_average = register_int_gauge_vec_with_registry!(
            Opts::new(
                "guidenet_guide_overall_average",
                "Overall fixed-point rating average per guide (scaled by 1000)"
            ),
            &["guide"],
            registry
        )?;

        let feedback_submitted_total = register_int_counter_with_registry!(
            Opts::new("guidenet_feedback_submitted_total", "Total feedback entries submitted"),
            registry
        )?;

        let ratings_recorded_total = register_int_counter_with_registry!(
            Opts::new("guidenet_ratings_recorded_total", "Total ratings recorded"),
            registry
        )?;

        let rating_component = register_histogram_vec_with_registry!(
            HistogramOpts::new("guidenet_rating_component", "Distribution of rating components")
                .buckets(RATING_COMPONENT_BUCKETS.to_vec()),
            &["metric"],
            registry
        )?;

        let rewards_issued_total = register_int_counter_with_registry!(
            Opts::new("guidenet_rewards_issued_total", "Number of rewards issued"),
            registry
        )?;

        let rewards_issued_value = register_int_counter_with_registry!(
            Opts::new("guidenet_rewards_issued_value", "Total value credited by rewards"),
            registry
        )?;

        let operations_rejected_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "guidenet_operations_rejected_total",
                "Rejected operations by operation and error kind"
            ),
            &["operation", "reason"],
            registry
        )?;

        Ok(Self {
            guides_registered_total,
            guides_tracked,
            guides_verified,
            verification_transitions_total,
            guide_overall_average,
            feedback_submitted_total,
            ratings_recorded_total,
            rating_component,
            rewards_issued_total,
            rewards_issued_value,
            operations_rejected_total,
        })
    }
}

/// Initialize the global metrics registry
///
/// Safe to call more than once: later calls return the metrics created by
/// the first one.
pub fn register_metrics() -> Result<Arc<ReputationMetrics>, prometheus::Error> {
    let mut registry_lock = METRICS_REGISTRY.write();

    if let Some((_, metrics)) = registry_lock.as_ref() {
        return Ok(Arc::clone(metrics));
    }

    let registry = Registry::new();
    let metrics = Arc::new(ReputationMetrics::new(&registry)?);
    *registry_lock = Some((registry, Arc::clone(&metrics)));

    Ok(metrics)
}

/// Get the global metrics registry, if initialized
pub fn get_registry() -> Option<Registry> {
    METRICS_REGISTRY
        .read()
        .as_ref()
        .map(|(registry, _)| registry.clone())
}

/// Render every metric of `registry` in the Prometheus text format
pub fn gather_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Record a registration and the new record count
pub fn record_guide_registered(metrics: &ReputationMetrics, tracked: usize) {
    metrics.guides_registered_total.inc();
    metrics.guides_tracked.set(tracked as i64);
}

/// Record a submitted feedback entry
pub fn record_feedback_submitted(metrics: &ReputationMetrics, tracked: usize) {
    metrics.feedback_submitted_total.inc();
    metrics.guides_tracked.set(tracked as i64);
}

/// Record a rating and its components
pub fn record_rating(metrics: &ReputationMetrics, expertise: u8, help: u8, recommend: u8) {
    metrics.ratings_recorded_total.inc();
    for (metric, value) in [("expertise", expertise), ("help", help), ("recommend", recommend)] {
        metrics
            .rating_component
            .with_label_values(&[metric])
            .observe(f64::from(value));
    }
}

/// Update the overall fixed-point average of a guide
pub fn update_guide_average(metrics: &ReputationMetrics, guide: &str, overall: u64) {
    metrics
        .guide_overall_average
        .with_label_values(&[guide])
        .set(overall as i64);
}

/// Record a verification edge
pub fn record_verification_transition(metrics: &ReputationMetrics, verified: bool, verified_now: usize) {
    let direction = if verified { "promoted" } else { "demoted" };
    metrics
        .verification_transitions_total
        .with_label_values(&[direction])
        .inc();
    metrics.guides_verified.set(verified_now as i64);
}

/// Record an issued reward
pub fn record_reward_issued(metrics: &ReputationMetrics, amount: u64) {
    metrics.rewards_issued_total.inc();
    metrics.rewards_issued_value.inc_by(amount);
}

/// Record a rejected operation
pub fn record_rejection(metrics: &ReputationMetrics, operation: &str, reason: &str) {
    metrics
        .operations_rejected_total
        .with_label_values(&[operation, reason])
        .inc();
}
