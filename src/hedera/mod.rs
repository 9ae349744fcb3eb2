//! Hedera network plumbing: operator credentials and the mirror node
//! REST client the toolkit reads from.

pub mod client;
pub mod mirror;

pub use client::{HederaClient, Operator};
pub use mirror::MirrorNodeClient;
