// src/oracle/mod.rs
// Text-completion oracle: hosted chat client, credential cache, request types

mod client;
mod http_client;
mod logging;
mod provider;
pub mod token;
mod types;
mod wire;

pub use client::HostedChatClient;
pub use http_client::OracleHttpClient;
pub use provider::Oracle;
pub use token::{AccessToken, CredentialSource, TokenCache};
pub use types::{Message, OracleRequest, Role, SamplingParams};
