pub mod board;
pub mod clock;
pub mod config;
pub mod movegen;
pub mod piece;
pub mod ranking;
pub mod session;
pub mod stats;
pub mod web;

pub use board::*;
pub use clock::*;
pub use config::*;
pub use piece::*;
pub use session::*;
pub use stats::*;
