//! ironrally: a turn engine for simultaneous-programming robot races.
//!
//! Robots are programmed five registers at a time from a dealt hand of cards.
//! Each register resolves card moves in priority order, then board elements,
//! lasers and checkpoints. The engine is synchronous and takes the current time
//! as an argument; `room` wraps it in a tokio task for live play.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod protocol;
pub mod resolve;
pub mod room;
pub mod selfplay;
pub mod timer;
