//! Conversational Banking Assistant
//!
//! A console banking assistant that:
//! - Answers general questions through a hosted chat-completion model
//! - Exposes a closed set of deterministic tools (time, weather,
//!   exchange rates, currency conversion, FAQ lookup)
//! - Runs a sequential account-opening dialogue with per-step validation
//! - Tracks LLM usage in a local JSON log
//!
//! LOOP: INPUT → (GREETING | QUIT | DIALOGUE | MODEL+TOOLS) → REPLY

pub mod agent;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod faq;
pub mod llm;
pub mod models;
pub mod services;
pub mod tools;
pub mod usage;

pub use error::Result;

// Re-export common types
pub use dialogue::{AccountType, DialogueSession, DialogueStep};
pub use faq::{FaqEntry, FaqIndex};
pub use models::*;
