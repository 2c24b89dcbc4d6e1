// src/oracle/logging.rs
// Shared oracle logging helpers

use super::wire::Usage;
use tracing::{info, warn};

/// Log usage statistics for an oracle call.
pub fn log_usage(request_id: &str, stage: &str, usage: &Usage) {
    info!(
        request_id = %request_id,
        stage = stage,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "Oracle usage stats"
    );
}

/// Log completion summary for an oracle call.
pub fn log_completion(request_id: &str, stage: &str, duration_ms: u64, content_len: usize) {
    info!(
        request_id = %request_id,
        stage = stage,
        duration_ms = duration_ms,
        content_len = content_len,
        "Oracle call complete"
    );
}

/// Log a failed oracle call. The caller decides the fallback.
pub fn log_failure(request_id: &str, stage: &str, duration_ms: u64, error: &dyn std::fmt::Display) {
    warn!(
        request_id = %request_id,
        stage = stage,
        duration_ms = duration_ms,
        error = %error,
        "Oracle call failed"
    );
}
