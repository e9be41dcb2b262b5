pub mod command;
pub mod engine;
pub mod filter_graph;
