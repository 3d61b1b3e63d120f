// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter incremented once per flow attempt and once per outcome.
pub const FLOW_COUNTER: &str = "track_card_flow_total";

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;

	#[test]
	fn flow_labels_are_distinct_snake_case() {
		let kinds = [FlowKind::AccessToken, FlowKind::CatalogLookup, FlowKind::Render];
		let labels = kinds.iter().map(|kind| kind.as_str()).collect::<HashSet<_>>();

		assert_eq!(labels.len(), kinds.len());
		assert!(
			labels.iter().all(|l| l.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')),
			"labels must stay valid metric label values: {labels:?}"
		);
		assert!(FLOW_COUNTER.starts_with("track_card_"));
	}

	#[test]
	fn recording_every_render_outcome_is_safe_without_a_recorder() {
		for outcome in [FlowOutcome::Attempt, FlowOutcome::Success, FlowOutcome::Failure] {
			record_flow_outcome(FlowKind::Render, outcome);
		}
	}
}
