//! Progress reporting for the ingestion pipeline.
//!
//! The pipeline talks to a [`ProgressSink`] only through a [`ProgressTracker`],
//! which enforces the ordering consumers rely on: progress never decreases,
//! stages never move backward, and `complete / 100` is emitted once, last,
//! and only when extraction succeeded.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Loading,
    Extracting,
    Ocr,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: Stage,
    pub progress: u8,
    pub message: String,
}

/// Receiver of progress notifications. Advisory only: nothing a sink does
/// can influence the extraction.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        // A closed receiver means the client went away; extraction carries on.
        let _ = self.send(event);
    }
}

pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    stage: Stage,
    progress: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            stage: Stage::Loading,
            progress: 0,
        }
    }

    /// Emits an intermediate event. `100` is reserved for completion, so
    /// intermediate progress tops out at 99.
    pub fn report(&mut self, stage: Stage, progress: u8, message: impl Into<String>) {
        debug_assert!(stage != Stage::Complete, "use ProgressTracker::complete");
        let stage = stage.max(self.stage).min(Stage::Ocr);
        let progress = progress.min(99).max(self.progress);

        self.stage = stage;
        self.progress = progress;
        self.sink.emit(ProgressEvent {
            stage,
            progress,
            message: message.into(),
        });
    }

    /// Emits the terminal event. Consumes the tracker so it cannot fire twice.
    pub fn complete(self, message: impl Into<String>) {
        self.sink.emit(ProgressEvent {
            stage: Stage::Complete,
            progress: 100,
            message: message.into(),
        });
    }
}

/// Linear position of step `done` of `total` inside the `[start, end]` band.
pub fn band(start: u8, end: u8, done: usize, total: usize) -> u8 {
    if total == 0 || end <= start {
        return start;
    }
    let span = f64::from(end - start);
    let fraction = (done.min(total) as f64) / (total as f64);
    start + (span * fraction).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_never_decreases() {
        let mut events = Vec::new();
        let mut tracker = ProgressTracker::new(&mut events);
        tracker.report(Stage::Loading, 10, "a");
        tracker.report(Stage::Extracting, 5, "b");
        tracker.report(Stage::Extracting, 40, "c");
        tracker.complete("done");

        let progress: Vec<u8> = events.iter().map(|e| e.progress).collect();
        assert_eq!(progress, vec![10, 10, 40, 100]);
    }

    #[test]
    fn test_stage_never_moves_backward() {
        let mut events = Vec::new();
        let mut tracker = ProgressTracker::new(&mut events);
        tracker.report(Stage::Ocr, 60, "ocr");
        tracker.report(Stage::Extracting, 70, "late extracting");

        assert_eq!(events[1].stage, Stage::Ocr);
    }

    #[test]
    fn test_intermediate_events_stop_short_of_100() {
        let mut events = Vec::new();
        let mut tracker = ProgressTracker::new(&mut events);
        tracker.report(Stage::Extracting, 100, "almost");
        assert_eq!(events[0].progress, 99);
    }

    #[test]
    fn test_complete_is_last_and_unique() {
        let mut events = Vec::new();
        let mut tracker = ProgressTracker::new(&mut events);
        tracker.report(Stage::Loading, 0, "start");
        tracker.complete("done");

        let completes = events.iter().filter(|e| e.stage == Stage::Complete).count();
        assert_eq!(completes, 1);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent {
                stage: Stage::Complete,
                progress: 100,
                message: "done".to_string(),
            })
        );
    }

    #[test]
    fn test_band() {
        assert_eq!(band(10, 50, 0, 4), 10);
        assert_eq!(band(10, 50, 2, 4), 30);
        assert_eq!(band(10, 50, 4, 4), 50);
        assert_eq!(band(10, 50, 9, 4), 50);
        assert_eq!(band(50, 95, 1, 0), 50);
    }

    #[test]
    fn test_event_serializes_lowercase_stage() {
        let event = ProgressEvent {
            stage: Stage::Ocr,
            progress: 55,
            message: "x".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "ocr");
        assert_eq!(json["progress"], 55);
    }

    #[tokio::test]
    async fn test_channel_sink_survives_closed_receiver() {
        let (mut tx, rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
        drop(rx);
        let mut tracker = ProgressTracker::new(&mut tx);
        tracker.report(Stage::Loading, 0, "nobody listening");
        tracker.complete("done");
    }
}
