pub mod extract;
pub mod fetcher;
pub mod frontier;
