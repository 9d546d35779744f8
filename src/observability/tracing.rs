//! Span construction for checkpoint calls.
//!
//! Every call gets a fresh `call_id` so the submission, each poll and the
//! final decision can be correlated in logs.

use tracing::Span;
use uuid::Uuid;

/// Span wrapping one `checkpoint` invocation.
pub fn checkpoint_span(checkpoint_name: &str) -> Span {
    let call_id = Uuid::new_v4();
    tracing::info_span!(
        "dodgeball.checkpoint",
        call_id = %call_id,
        checkpoint = %checkpoint_name,
        verification_id = tracing::field::Empty,
    )
}
