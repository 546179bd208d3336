use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const METRIC_CONTENT_QUERY_TOTAL: &str = "vgwritings_content_query_total";
pub const METRIC_CONTENT_QUERY_FAILURE_TOTAL: &str = "vgwritings_content_query_failure_total";
pub const METRIC_CONTENT_QUERY_MS: &str = "vgwritings_content_query_ms";
pub const METRIC_FORM_SUBMISSION_TOTAL: &str = "vgwritings_form_submission_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CONTENT_QUERY_TOTAL,
            Unit::Count,
            "Total number of queries sent to the content store."
        );
        describe_counter!(
            METRIC_CONTENT_QUERY_FAILURE_TOTAL,
            Unit::Count,
            "Total number of content store queries that failed."
        );
        describe_histogram!(
            METRIC_CONTENT_QUERY_MS,
            Unit::Milliseconds,
            "Content store query latency in milliseconds."
        );
        describe_counter!(
            METRIC_FORM_SUBMISSION_TOTAL,
            Unit::Count,
            "Total number of accepted reader form submissions."
        );
    });
}
