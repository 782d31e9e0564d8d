//! Background batch worker.
//!
//! Runs in a dedicated thread so model loading and inference never block
//! the GUI. Files are processed strictly in list order; a failure is
//! reported for that file and the batch moves on.

use crate::audio::{self, AudioError};
use crate::config::Config;
use crate::engine::{WhisperEngine, WhisperError};
use crate::export::{self, ExportError, ExportFormat};
use crate::models::{self, ModelError};
use crate::queue::{JobUpdate, TranscriptionJob};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Whisper(#[from] WhisperError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything the worker needs, resolved up front from the config.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub model_path: PathBuf,
    pub language: String,
    pub translate: bool,
    pub threads: u32,
    pub output_dir: PathBuf,
    pub formats: Vec<ExportFormat>,
    pub fallback_window_secs: f32,
}

impl WorkerSettings {
    /// Build settings from the loaded config, resolving the model to an
    /// installed file so a missing model fails before any job starts.
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let model_path = models::resolve(&config.model.name)?;
        Ok(Self {
            model_path,
            language: config.model.language.clone(),
            translate: config.model.translate,
            threads: config.model.threads,
            output_dir: config.output_dir(),
            formats: config.export.enabled_formats(),
            fallback_window_secs: config.export.fallback_window_secs,
        })
    }
}

/// Sequential batch worker.
pub struct BatchWorker {
    jobs: Vec<TranscriptionJob>,
    settings: WorkerSettings,
    update_tx: mpsc::Sender<JobUpdate>,
}

impl BatchWorker {
    pub fn new(
        jobs: Vec<TranscriptionJob>,
        settings: WorkerSettings,
        update_tx: mpsc::Sender<JobUpdate>,
    ) -> Self {
        Self {
            jobs,
            settings,
            update_tx,
        }
    }

    /// Run the batch to completion (blocking, runs in a dedicated thread).
    pub fn run(self) {
        info!("Batch worker started ({} files)", self.jobs.len());

        // The engine is loaded once and reused for the whole batch
        let engine = match WhisperEngine::new(
            &self.settings.model_path,
            &self.settings.language,
            self.settings.translate,
            self.settings.threads,
        ) {
            Ok(engine) => engine,
            Err(e) => {
                error!("Failed to load model: {}", e);
                let message = e.to_string();
                for job in &self.jobs {
                    self.send(JobUpdate::Failed {
                        id: job.id,
                        error: message.clone(),
                    });
                }
                self.send(JobUpdate::BatchFinished);
                return;
            }
        };

        for job in &self.jobs {
            self.send(JobUpdate::Started { id: job.id });

            match process_job(&engine, job, &self.settings) {
                Ok((text, exports)) => {
                    info!("Completed {}", job.path.display());
                    self.send(JobUpdate::Completed {
                        id: job.id,
                        text,
                        exports,
                    });
                }
                Err(e) => {
                    error!("Transcription failed for {}: {}", job.path.display(), e);
                    self.send(JobUpdate::Failed {
                        id: job.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.send(JobUpdate::BatchFinished);
        info!("Batch worker finished");
    }

    fn send(&self, update: JobUpdate) {
        // The receiver going away means the UI is gone; nothing to do
        let _ = self.update_tx.blocking_send(update);
    }
}

/// Transcribe one file and write its exports.
fn process_job(
    engine: &WhisperEngine,
    job: &TranscriptionJob,
    settings: &WorkerSettings,
) -> Result<(String, Vec<PathBuf>), JobError> {
    let buffer = audio::load_audio(&job.path)?;
    let transcription = engine.transcribe(&buffer)?;

    let exports = export::export_all(
        &transcription,
        &job.file_stem(),
        &settings.formats,
        &settings.output_dir,
        settings.fallback_window_secs,
    )?;

    Ok((transcription.text, exports))
}

/// Spawn a batch on a dedicated thread and return the update channel.
pub fn spawn_batch(
    jobs: Vec<TranscriptionJob>,
    settings: WorkerSettings,
) -> mpsc::Receiver<JobUpdate> {
    let (tx, rx) = mpsc::channel(64);
    let worker = BatchWorker::new(jobs, settings, tx);
    std::thread::Builder::new()
        .name("transcription-batch".into())
        .spawn(move || worker.run())
        .expect("failed to spawn batch worker thread");
    rx
}
