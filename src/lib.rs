//! Connects a merchant store to its remote payments account: cached account
//! status, the onboarding-disabled signal and the OAuth redirect handshake.

pub mod account;
pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod payments;
pub mod settings;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod middleware;
