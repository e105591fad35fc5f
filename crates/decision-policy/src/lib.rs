//! Decision policy boundary.
//!
//! The action loop consumes exactly one contract: given the task, the
//! current candidate list, the rolling history and the current URL,
//! produce a well-formed [`Decision`]. Implementations never fail
//! visibly to the loop; anything that goes wrong inside the boundary
//! (unreachable backend, malformed output, invalid references) degrades
//! to the deterministic fallback selector and surfaces only through the
//! decision's diagnostic reason.

use async_trait::async_trait;

use uitrail_core_types::{CandidateAction, Decision, Task};

pub mod fallback;
pub mod llm;
pub mod scripted;
pub mod validate;

pub use fallback::{fallback_decision, FallbackPolicy};
pub use llm::{LlmPolicy, LlmPolicyConfig};
pub use scripted::ScriptedPolicy;
pub use validate::{validate_proposal, DecisionProposal};

/// Picks the next UI action for one iteration.
///
/// Backends are selected at construction time (remote API, scripted
/// double, pure fallback); the loop never inspects which one it holds.
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    async fn choose_action(
        &self,
        task: &Task,
        candidates: &[CandidateAction],
        history_summary: &str,
        current_url: &str,
    ) -> Decision;
}
