//! Correctness checks over graph state
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod invariants;

pub use self::invariants::{check_flow, check_matching, InvariantViolation};
