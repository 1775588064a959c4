pub mod benchmark;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod filter;
pub mod frame;
pub mod pipeline;
pub mod results;
pub mod session;
pub mod sizing;
pub mod split;
