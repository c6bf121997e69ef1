//! Per-interaction session state.
//!
//! Each CLI command opens one `SessionContext` after the registration
//! resolves and closes it when the command finishes; nothing survives
//! across invocations. This is the explicit replacement for the implicit
//! per-user state bag a hosted UI framework would provide.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::plate::Registration;
use crate::report::VehicleReport;

pub struct SessionContext {
    registration: Registration,
    source_image: Option<PathBuf>,
    report: Option<VehicleReport>,
    started_at: DateTime<Local>,
}

impl SessionContext {
    /// Opens a session for one user interaction.
    pub fn new(registration: Registration) -> Self {
        Self {
            registration,
            source_image: None,
            report: None,
            started_at: Local::now(),
        }
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Records the photo the registration was read from, when scanning.
    pub fn set_source_image(&mut self, path: PathBuf) {
        self.source_image = Some(path);
    }

    pub fn source_image(&self) -> Option<&Path> {
        self.source_image.as_deref()
    }

    pub fn attach_report(&mut self, report: VehicleReport) {
        self.report = Some(report);
    }

    pub fn report(&self) -> Option<&VehicleReport> {
        self.report.as_ref()
    }

    /// Closes the session. All held state is discarded; only the duration
    /// is logged.
    pub fn finish(self) {
        let elapsed = Local::now().signed_duration_since(self.started_at);
        crate::log(&format!(
            "session for {} closed after {} ms",
            self.registration,
            elapsed.num_milliseconds()
        ));
    }
}
