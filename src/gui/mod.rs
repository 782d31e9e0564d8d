//! GUI using egui: drop zone, file list with per-file status, batch controls.

use crate::audio;
use crate::config::Config;
use crate::queue::worker::{self, WorkerSettings};
use crate::queue::{JobStatus, JobUpdate, TranscriptionJob};
use eframe::egui;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Run the GUI as the main window, optionally pre-populated with files.
pub fn run(initial_files: Vec<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();
    let is_dark = config.appearance.theme.is_dark();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 480.0])
            .with_min_inner_size([500.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Talskrift",
        options,
        Box::new(move |cc| {
            apply_theme(&cc.egui_ctx, is_dark);
            Ok(Box::new(TalskriftApp::new(config, initial_files)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))
}

/// Apply light or dark theme to egui context
fn apply_theme(ctx: &egui::Context, is_dark: bool) {
    if is_dark {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

/// One row in the file list.
struct FileRow {
    id: u64,
    path: PathBuf,
    status: JobStatus,
    text: Option<String>,
    error: Option<String>,
}

pub struct TalskriftApp {
    config: Config,
    rows: Vec<FileRow>,
    next_id: u64,
    processing: bool,
    last_error: Option<String>,
    /// Update channel from the running batch worker
    updates: Option<mpsc::Receiver<JobUpdate>>,
    /// Manual path entry next to the drop zone
    path_input: String,
}

impl TalskriftApp {
    fn new(config: Config, initial_files: Vec<PathBuf>) -> Self {
        let mut app = Self {
            config,
            rows: Vec::new(),
            next_id: 0,
            processing: false,
            last_error: None,
            updates: None,
            path_input: String::new(),
        };
        for path in initial_files {
            app.add_file(path);
        }
        app
    }

    fn add_file(&mut self, path: PathBuf) {
        if self.rows.iter().any(|row| row.path == path) {
            return;
        }
        if !audio::is_audio_file(&path) {
            warn!("Ignoring non-audio file: {}", path.display());
            return;
        }

        self.rows.push(FileRow {
            id: self.next_id,
            path,
            status: JobStatus::Pending,
            text: None,
            error: None,
        });
        self.next_id += 1;
        self.last_error = None;
    }

    fn clear_files(&mut self) {
        self.rows.clear();
        self.last_error = None;
    }

    fn start_batch(&mut self) {
        let jobs: Vec<TranscriptionJob> = self
            .rows
            .iter()
            .filter(|row| row.status == JobStatus::Pending)
            .map(|row| TranscriptionJob {
                id: row.id,
                path: row.path.clone(),
            })
            .collect();

        if jobs.is_empty() {
            return;
        }

        let settings = match WorkerSettings::from_config(&self.config) {
            Ok(settings) => settings,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };

        info!("Starting batch of {} files", jobs.len());
        self.updates = Some(worker::spawn_batch(jobs, settings));
        self.processing = true;
        self.last_error = None;
    }

    /// Drain worker updates, enforcing forward-only status transitions.
    fn poll_updates(&mut self) {
        let Some(rx) = self.updates.as_mut() else {
            return;
        };

        let mut finished = false;
        while let Ok(update) = rx.try_recv() {
            match update {
                JobUpdate::Started { id } => {
                    if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
                        if row.status.can_advance_to(JobStatus::Processing) {
                            row.status = JobStatus::Processing;
                        }
                    }
                }
                JobUpdate::Completed { id, text, .. } => {
                    if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
                        if row.status.can_advance_to(JobStatus::Completed) {
                            row.status = JobStatus::Completed;
                            row.text = Some(text);
                        }
                    }
                }
                JobUpdate::Failed { id, error } => {
                    if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
                        if row.status.can_advance_to(JobStatus::Failed) {
                            row.status = JobStatus::Failed;
                            row.error = Some(error.clone());
                        }
                    }
                    self.last_error = Some(error);
                }
                JobUpdate::BatchFinished => {
                    finished = true;
                }
            }
        }

        if finished {
            self.processing = false;
            self.updates = None;
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.processing {
            return;
        }
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.add_file(path);
            }
        }
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui, hovering: bool) {
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), 180.0),
            egui::Sense::hover(),
        );

        let visuals = ui.visuals();
        let stroke_color = if hovering {
            visuals.selection.stroke.color
        } else {
            visuals.weak_text_color()
        };
        let fill = if hovering {
            visuals.selection.bg_fill.linear_multiply(0.2)
        } else {
            visuals.faint_bg_color
        };

        ui.painter()
            .rect(rect, 12.0, fill, egui::Stroke::new(2.0, stroke_color));

        let center = rect.center();
        ui.painter().text(
            center - egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_CENTER,
            "Släpp ljudfiler här",
            egui::FontId::proportional(18.0),
            stroke_color,
        );
        ui.painter().text(
            center + egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_CENTER,
            "Stöds: MP3, WAV, M4A, FLAC",
            egui::FontId::proportional(12.0),
            ui.visuals().weak_text_color(),
        );
    }

    fn show_file_list(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .max_height(260.0)
            .show(ui, |ui| {
                for row in &self.rows {
                    ui.horizontal(|ui| {
                        let (glyph, color) = status_glyph(row.status, ui);
                        ui.colored_label(color, glyph);

                        ui.vertical(|ui| {
                            let name = row
                                .path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or("<okänd fil>");
                            ui.strong(name);
                            ui.weak(row.path.display().to_string());

                            if let Some(error) = &row.error {
                                ui.colored_label(egui::Color32::RED, error);
                            }

                            if let Some(text) = &row.text {
                                egui::CollapsingHeader::new("Visa transkription")
                                    .id_salt(row.id)
                                    .show(ui, |ui| {
                                        ui.label(text);
                                    });
                            }
                        });
                    });
                    ui.separator();
                }
            });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.processing, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.path_input)
                        .hint_text("Sökväg till ljudfil...")
                        .desired_width(220.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if (ui.button("Lägg till").clicked() || submitted)
                    && !self.path_input.trim().is_empty()
                {
                    let path = PathBuf::from(self.path_input.trim());
                    self.add_file(path);
                    self.path_input.clear();
                }
            });

            if !self.rows.is_empty() {
                ui.add_enabled_ui(!self.processing, |ui| {
                    if ui.button("Rensa alla").clicked() {
                        self.clear_files();
                    }

                    if ui.button("Transkribera").clicked() {
                        self.start_batch();
                    }
                });
            }
        });
    }

    fn show_status(&mut self, ui: &mut egui::Ui) {
        if self.processing {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Transkriberar...");
            });
        }

        if let Some(error) = &self.last_error {
            ui.colored_label(egui::Color32::RED, format!("Fel: {}", error));
        }

        if self.rows.iter().any(|r| r.status == JobStatus::Completed) {
            let output_dir = self.config.output_dir();
            ui.horizontal(|ui| {
                ui.weak(format!("Sparade till {}", output_dir.display()));
                if ui.small_button("Öppna mapp").clicked() {
                    if let Err(e) = open::that(&output_dir) {
                        warn!("Failed to open output directory: {}", e);
                    }
                }
            });
        }
    }
}

fn status_glyph(status: JobStatus, ui: &egui::Ui) -> (&'static str, egui::Color32) {
    match status {
        JobStatus::Pending => ("⏳", egui::Color32::from_rgb(230, 160, 30)),
        JobStatus::Processing => ("⟳", ui.visuals().strong_text_color()),
        JobStatus::Completed => ("✔", egui::Color32::from_rgb(60, 170, 60)),
        JobStatus::Failed => ("✘", egui::Color32::RED),
    }
}

impl eframe::App for TalskriftApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_updates();
        self.handle_dropped_files(ctx);

        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Talskrift");
                ui.weak("Transkribera svenska ljudfiler med AI");
            });
            ui.add_space(12.0);

            if self.rows.is_empty() {
                self.show_drop_zone(ui, hovering_files);
            } else {
                self.show_file_list(ui);
            }

            ui.add_space(12.0);
            self.show_controls(ui);
            ui.add_space(8.0);
            self.show_status(ui);
        });

        // Keep polling while a batch runs, even without input events
        if self.processing {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> TalskriftApp {
        TalskriftApp::new(Config::default(), Vec::new())
    }

    #[test]
    fn test_add_file_sets_pending_status() {
        let mut app = app();
        app.add_file(PathBuf::from("/tmp/tal.wav"));
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].status, JobStatus::Pending);
    }

    #[test]
    fn test_add_file_ignores_duplicates_and_non_audio() {
        let mut app = app();
        app.add_file(PathBuf::from("/tmp/tal.wav"));
        app.add_file(PathBuf::from("/tmp/tal.wav"));
        app.add_file(PathBuf::from("/tmp/anteckningar.txt"));
        assert_eq!(app.rows.len(), 1);
    }

    #[test]
    fn test_add_file_clears_last_error() {
        let mut app = app();
        app.last_error = Some("Fel".into());
        app.add_file(PathBuf::from("/tmp/tal.wav"));
        assert!(app.last_error.is_none());
    }

    #[test]
    fn test_clear_files() {
        let mut app = app();
        app.add_file(PathBuf::from("/tmp/a.wav"));
        app.add_file(PathBuf::from("/tmp/b.mp3"));
        app.clear_files();
        assert!(app.rows.is_empty());
    }

    /// Feed a batch of updates through the worker channel and drain them.
    fn apply_updates(app: &mut TalskriftApp, updates: Vec<JobUpdate>) {
        let (tx, rx) = mpsc::channel(updates.len().max(1));
        for update in updates {
            tx.try_send(update).unwrap();
        }
        app.updates = Some(rx);
        app.processing = true;
        app.poll_updates();
    }

    #[test]
    fn test_failed_update_without_started_marks_row_failed() {
        // When the engine fails to load, the worker fails every job
        // without sending Started first.
        let mut app = app();
        app.add_file(PathBuf::from("/tmp/a.wav"));
        app.add_file(PathBuf::from("/tmp/b.wav"));

        apply_updates(
            &mut app,
            vec![
                JobUpdate::Failed {
                    id: 0,
                    error: "Modellfil saknas".into(),
                },
                JobUpdate::Failed {
                    id: 1,
                    error: "Modellfil saknas".into(),
                },
                JobUpdate::BatchFinished,
            ],
        );

        for row in &app.rows {
            assert_eq!(row.status, JobStatus::Failed);
            assert_eq!(row.error.as_deref(), Some("Modellfil saknas"));
        }
        assert_eq!(app.last_error.as_deref(), Some("Modellfil saknas"));
        assert!(!app.processing);
    }

    #[test]
    fn test_completed_update_stores_transcription() {
        let mut app = app();
        app.add_file(PathBuf::from("/tmp/a.wav"));

        apply_updates(
            &mut app,
            vec![
                JobUpdate::Started { id: 0 },
                JobUpdate::Completed {
                    id: 0,
                    text: "Hej världen".into(),
                    exports: Vec::new(),
                },
                JobUpdate::BatchFinished,
            ],
        );

        assert_eq!(app.rows[0].status, JobStatus::Completed);
        assert_eq!(app.rows[0].text.as_deref(), Some("Hej världen"));
    }

    #[test]
    fn test_initial_files_are_listed() {
        let app = TalskriftApp::new(
            Config::default(),
            vec![PathBuf::from("/tmp/a.wav"), PathBuf::from("/tmp/b.flac")],
        );
        assert_eq!(app.rows.len(), 2);
    }
}
