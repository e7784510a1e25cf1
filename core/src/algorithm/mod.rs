//! FLOWSCOPE Algorithm Framework
//! Steppable augmenting-path engines over the residual graph
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod graph;

pub use self::traits::*;
pub use self::graph::*;
