use super::controller::{Button, Controller};

/// Why the render loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    WindowClosed,
    EscapePressed,
    SetupFailed,
    /// The device ran out of memory while presenting
    DeviceLost,
}

/// Render loop state. `ShouldClose` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Running,
    ShouldClose(ExitReason),
}

impl LoopState {
    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }

    /// Move to `ShouldClose`. Once closed, later requests keep the first reason.
    pub fn request_close(&mut self, reason: ExitReason) {
        if self.is_running() {
            *self = LoopState::ShouldClose(reason);
        }
    }

    /// Close when the controller reports Escape held
    pub fn poll_exit(&mut self, controller: &dyn Controller) {
        if controller.is_down(Button::Escape) {
            self.request_close(ExitReason::EscapePressed);
        }
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self {
            LoopState::Running => None,
            LoopState::ShouldClose(reason) => Some(*reason),
        }
    }

    /// Process exit code: -1 after a failure, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoopState::ShouldClose(ExitReason::SetupFailed | ExitReason::DeviceLost) => -1,
            _ => 0,
        }
    }
}
