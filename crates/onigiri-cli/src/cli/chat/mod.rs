//! Interactive chat session.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;

pub use loop_runner::run_chat_loop;
