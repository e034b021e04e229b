pub mod persistence;
pub mod subgraph;
pub mod web;
