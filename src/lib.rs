//! WHEELWISE — Roulette session discipline assistant.
//!
//! Pattern analytics, a configurable rule engine, and bankroll
//! guardrails for European-wheel sessions. The core is pure and
//! synchronous; the API layer serializes mutation per session.

pub mod analysis;
pub mod api;
pub mod config;
pub mod rules;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod types;
pub mod wheel;
