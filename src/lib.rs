pub mod api;
pub mod cache;
pub mod demo_feed;
pub mod feed;
pub mod filter;
pub mod heatmap;
pub mod poll;
pub mod simulator;
pub mod state;
pub mod table;
