//! Babel Relay - real-time chat relay with automatic translation
//!
//! This library provides the core of the relay:
//! - Presence (sessions, join/leave, typing indicators)
//! - Ordered broadcast of raw chat and voice messages
//! - Best-effort translation and transcription through an external
//!   generative-language gateway
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Clients                          │
//! │        one full-duplex WebSocket per client          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Babel Relay                         │
//! │   Registry  │  Broadcast Router  │  Voice Pipeline  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        Translation Gateway (external engine)         │
//! │          translate  │  transcribe                    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Raw messages always reach everyone immediately; the translated or
//! transcribed counterpart follows whenever its gateway call resolves, and
//! may interleave arbitrarily with unrelated traffic.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lang;
pub mod registry;
pub mod relay;

pub use config::Config;
pub use error::{Error, GatewayError, Result};
pub use gateway::GatewayClient;
pub use lang::Language;
pub use registry::{ConnectionId, Registry, Session};
pub use relay::Relay;
pub use relay::credential::CredentialStore;
pub use relay::protocol::{ClientEvent, ServerEvent};
