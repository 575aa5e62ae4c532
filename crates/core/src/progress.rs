//! Progress reporting.
//!
//! The optimizer notifies a [`ProgressSink`] synchronously at fixed pipeline
//! milestones. Sinks only observe: nothing they do can change the outcome.
//!
//! # Example
//!
//! ```rust
//! use yardplan_core::progress::{ProgressEvent, ProgressSink};
//!
//! let mut seen = Vec::new();
//! let mut sink = |event: &ProgressEvent| seen.push(event.message());
//! sink.report(&ProgressEvent::CandidatesGenerated { count: 12 });
//! assert_eq!(seen, vec!["Generated 12 candidate placements".to_string()]);
//! ```

/// Pipeline milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Lane carving is about to start.
    LaneGenerationStarted,
    /// Candidate generation finished.
    CandidatesGenerated {
        /// Number of candidates.
        count: usize,
    },
    /// Conflict graph finished.
    ConflictsBuilt {
        /// Number of conflict edges.
        count: usize,
    },
    /// The solver found an improving incumbent.
    IncumbentFound {
        /// Number of selected candidates in the incumbent.
        selected: usize,
    },
}

impl ProgressEvent {
    /// Human-readable description.
    pub fn message(&self) -> String {
        match self {
            Self::LaneGenerationStarted => "Generating lanes".to_string(),
            Self::CandidatesGenerated { count } => {
                format!("Generated {} candidate placements", count)
            }
            Self::ConflictsBuilt { count } => format!("Found {} conflicts", count),
            Self::IncumbentFound { selected } => {
                format!("Found solution with {} spaces", selected)
            }
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    /// Called once per milestone, in pipeline order.
    fn report(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ProgressEvent::LaneGenerationStarted.message(),
            "Generating lanes"
        );
        assert_eq!(
            ProgressEvent::ConflictsBuilt { count: 3 }.message(),
            "Found 3 conflicts"
        );
        assert_eq!(
            ProgressEvent::IncumbentFound { selected: 7 }.message(),
            "Found solution with 7 spaces"
        );
    }

    #[test]
    fn test_closure_sink_preserves_order() {
        let mut events = Vec::new();
        {
            let mut sink = |e: &ProgressEvent| events.push(*e);
            sink.report(&ProgressEvent::LaneGenerationStarted);
            sink.report(&ProgressEvent::CandidatesGenerated { count: 1 });
        }
        assert_eq!(
            events,
            vec![
                ProgressEvent::LaneGenerationStarted,
                ProgressEvent::CandidatesGenerated { count: 1 }
            ]
        );
        NoProgress.report(&ProgressEvent::LaneGenerationStarted);
    }
}
