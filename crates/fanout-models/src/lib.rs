//! Concrete remote-client implementations for Fanout.

pub mod chat;

pub use chat::{ChatClient, ChatParameters};
