use serde::Serialize;

/// Status of a batch job as reported to HTTP clients polling for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum JobStatus {
    Pending,
    InProgress { processed: usize, total: usize },
    Completed { entries: usize },
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed(_))
    }
}

/// Messages sent by the rendering worker back to the coordinator.
///
/// Every variant carries the id of the job it belongs to; consumers must
/// ignore messages whose id is not the job they are waiting on. `Error` and
/// `Done` are terminal: nothing follows them for the same id.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Progress {
        id: String,
        /// `processed / total`, in `0.0..=1.0`.
        progress: f64,
        processed: usize,
        total: usize,
    },
    Error {
        id: String,
        error: String,
    },
    Done {
        id: String,
        /// The finished zip archive. Ownership passes to the receiver.
        buffer: Vec<u8>,
    },
}

impl WorkerMessage {
    pub fn id(&self) -> &str {
        match self {
            WorkerMessage::Progress { id, .. }
            | WorkerMessage::Error { id, .. }
            | WorkerMessage::Done { id, .. } => id,
        }
    }

    pub fn progress(id: &str, processed: usize, total: usize) -> Self {
        let progress = if total > 0 {
            processed as f64 / total as f64
        } else {
            0.0
        };
        WorkerMessage::Progress {
            id: id.to_string(),
            progress,
            processed,
            total,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_ratio_is_processed_over_total() {
        let msg = WorkerMessage::progress("job", 250, 1000);
        assert_eq!(
            msg,
            WorkerMessage::Progress {
                id: "job".to_string(),
                progress: 0.25,
                processed: 250,
                total: 1000,
            }
        );
        assert!(!msg.is_terminal());
    }

    #[test]
    fn terminal_messages_expose_their_id() {
        let msg = WorkerMessage::Error {
            id: "abc".to_string(),
            error: "boom".to_string(),
        };
        assert_eq!(msg.id(), "abc");
        assert!(msg.is_terminal());
    }
}
