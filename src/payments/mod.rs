//! Boundary to the remote payments API.

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;
pub mod utils;

pub use client::PaymentsApiClient;
pub use error::{GatewayError, GatewayResult};
pub use gateway::AccountGateway;
pub use types::{
    AccountRecord, AccountSnapshot, AccountStatus, DepositsStatus, LoginData, MerchantInfo,
    OAuthRedirect,
};
