//! Dialog state for a cube operation.

/// Visible state of the operation dialog: progress indicator, abort button
/// and status line.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    /// Whether the dialog is still open.
    pub is_open: bool,
    /// Whether a new run may be started.
    pub start_enabled: bool,
    /// Whether the progress indicator is shown.
    pub progress_visible: bool,
    /// Whether the abort button is enabled.
    pub abort_enabled: bool,
    /// Progress value in the 0-100 display range.
    pub progress: f64,
    /// User-facing status message.
    pub status_text: String,
    /// Message of the last failed run.
    pub last_error: Option<String>,
}

impl Default for DialogState {
    fn default() -> Self {
        Self {
            is_open: true,
            start_enabled: true,
            progress_visible: false,
            abort_enabled: false,
            progress: 0.0,
            status_text: "Ready".to_string(),
            last_error: None,
        }
    }
}

impl DialogState {
    pub(crate) fn show_running(&mut self) {
        self.start_enabled = false;
        self.progress_visible = true;
        self.abort_enabled = true;
        self.progress = 0.0;
        self.status_text = "Running...".to_string();
        self.last_error = None;
    }

    pub(crate) fn reset_progress(&mut self, status: impl Into<String>) {
        self.start_enabled = true;
        self.progress_visible = false;
        self.abort_enabled = false;
        self.progress = 0.0;
        self.status_text = status.into();
    }
}
