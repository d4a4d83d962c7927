pub mod clock;
pub mod config;
pub mod engine;
pub mod games;
pub mod gate;
pub mod presenter;
pub mod runtime;
pub mod score;
pub mod session;
pub mod signal;
pub mod ui;
