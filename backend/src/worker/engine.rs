//! # Archive Engine
//!
//! Renders every item of a [`BatchJob`] in order, adds each artifact to a zip
//! archive and reports progress every `chunk` items and once more at the end.
//! Any failure aborts the job: the caller gets a single `Error` message and no
//! partial archive.

use crate::error::ArchiveError;
use crate::worker::archive::ArchiveWriter;
use crate::worker::render::{QrRenderer, RenderedArtifact};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::jobs::WorkerMessage;
use common::model::batch::BatchJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// Rendering the item at this 0-based position.
    Rendering(usize),
    Finalizing,
    Done,
    Failed,
}

pub struct ArchiveEngine<'r> {
    renderer: &'r dyn QrRenderer,
    state: EngineState,
}

impl<'r> ArchiveEngine<'r> {
    pub fn new(renderer: &'r dyn QrRenderer) -> Self {
        ArchiveEngine {
            renderer,
            state: EngineState::Idle,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Processes `job`, sending every message through `emit`. The last
    /// message is always `Done` or `Error` for `job.id`.
    pub fn run(&mut self, job: BatchJob, emit: &mut dyn FnMut(WorkerMessage)) -> EngineState {
        match self.assemble(&job, emit) {
            Ok(buffer) => {
                self.transition(EngineState::Done);
                log::info!("Job {}: archive of {} bytes", job.id, buffer.len());
                emit(WorkerMessage::Done { id: job.id, buffer });
            }
            Err(e) => {
                self.transition(EngineState::Failed);
                log::error!("Job {} failed: {}", job.id, e);
                emit(WorkerMessage::Error {
                    id: job.id,
                    error: e.to_string(),
                });
            }
        }
        self.state
    }

    fn assemble(
        &mut self,
        job: &BatchJob,
        emit: &mut dyn FnMut(WorkerMessage),
    ) -> Result<Vec<u8>, ArchiveError> {
        let total = job.items.len();
        let chunk = job.options.effective_chunk();
        let mut archive = ArchiveWriter::new();

        for (position, item) in job.items.iter().enumerate() {
            self.transition(EngineState::Rendering(position));
            let name = item.entry_name(job.format);
            let artifact = self
                .renderer
                .render(&item.payload, job.format, &job.options)
                .map_err(|source| ArchiveError::Render {
                    index: item.index,
                    source,
                })?;

            match artifact {
                RenderedArtifact::Svg(document) => archive.add(&name, document.as_bytes())?,
                RenderedArtifact::RasterBase64(data) => {
                    let bytes = decode_raster(&data).map_err(|source| ArchiveError::Decode {
                        index: item.index,
                        source,
                    })?;
                    archive.add(&name, &bytes)?;
                }
            }

            let processed = position + 1;
            if processed % chunk == 0 || processed == total {
                emit(WorkerMessage::progress(&job.id, processed, total));
            }
        }

        self.transition(EngineState::Finalizing);
        log::debug!("Job {}: finalizing {} entries", job.id, archive.entries());
        archive.finish()
    }

    fn transition(&mut self, next: EngineState) {
        // Per-item transitions are too chatty even for debug.
        if !matches!(next, EngineState::Rendering(_)) {
            log::debug!("Engine {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}

/// Decodes raster data, tolerating a `data:<mime>;base64,` prefix.
pub fn decode_raster(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, body)| body),
        None => data,
    };
    BASE64.decode(encoded.trim())
}
