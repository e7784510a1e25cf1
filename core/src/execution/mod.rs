//! Stepwise execution: frames, the emitter that yields them, and recorded runs
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod frame;
pub mod emitter;
pub mod history;

pub use self::emitter::StepEmitter;
pub use self::frame::{FlowDelta, Frame, FrameView, MatchDelta, MatchDeltaView, StepKind};
pub use self::history::{FrameHistory, HistoryError};
