//! Augmenting-path graph algorithms: bipartite matching and maximum flow
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod matching;
pub mod max_flow;
pub mod push_relabel;

pub use self::matching::BipartiteMatching;
pub use self::max_flow::{min_cut, AugmentingPathFlow, FlowStrategy, MinCut};
pub use self::push_relabel::PushRelabel;
