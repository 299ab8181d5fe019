pub mod clock;
pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod lifecycle;

pub use clock::{FpsCounter, FrameClock};
pub use controller::{Button, Controller};
pub use gpu_context::{GpuContext, DEPTH_FORMAT};
pub use input_adapter::InputState;
pub use lifecycle::{ExitReason, LoopState};
