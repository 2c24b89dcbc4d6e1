// src/oracle/provider.rs
// Oracle abstraction: an opaque function from message history to reply text

use crate::error::Result;
use async_trait::async_trait;

use super::OracleRequest;

/// Trait for text-completion oracles - the hosted client and test doubles implement this
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send one completion request and return the reply text.
    ///
    /// Exactly one attempt is made unless the implementation is configured
    /// otherwise; callers decide how to degrade on error.
    async fn complete(&self, request: OracleRequest) -> Result<String>;

    /// Model name for logging
    fn model_name(&self) -> String;
}
