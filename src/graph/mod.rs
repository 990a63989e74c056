//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod compressed;
pub mod snapshot;
pub mod view;

pub use compressed::WeightedGraph;
pub use snapshot::{GraphSnapshot, Link, LinkEndpoint, Node, Position};
pub use view::GraphView;
