use crate::error::ExportError;
use report::ExportRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    InFlight,
    Done { succeeded: bool },
}

/// Guards against starting a second export while one is running
#[derive(Debug, Default)]
pub struct ExportSession {
    state: ExportState,
}

impl ExportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == ExportState::InFlight
    }

    /// Outcome of the last finished export
    pub fn last_succeeded(&self) -> Option<bool> {
        match self.state {
            ExportState::Done { succeeded } => Some(succeeded),
            _ => None,
        }
    }

    pub fn begin(&mut self) -> Result<(), ExportError> {
        if self.is_in_flight() {
            return Err(ExportError::InFlight);
        }
        self.state = ExportState::InFlight;
        Ok(())
    }

    pub fn finish(&mut self, succeeded: bool) {
        self.state = ExportState::Done { succeeded };
    }

    /// Whether an export of `request` could start now
    pub fn can_export(&self, request: &ExportRequest) -> bool {
        !self.is_in_flight() && request.validate().is_ok()
    }
}
