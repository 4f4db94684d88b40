//! Progress checks for lab steps.

use async_trait::async_trait;
use rand::Rng;

use crate::catalog::Step;

/// Decides whether a step's tasks are done.
///
/// The lab ships without a real verifier; implementations can inspect the
/// sandbox or terminal history and be injected into the controller.
#[async_trait]
pub trait ProgressCheck: Send + Sync {
    async fn check(&self, step_index: usize, step: &Step) -> bool;
}

/// Placeholder check: a fair coin flip, independent of any lab state.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinFlip;

#[async_trait]
impl ProgressCheck for CoinFlip {
    async fn check(&self, step_index: usize, step: &Step) -> bool {
        let passed = rand::thread_rng().gen_bool(0.5);
        tracing::debug!(step = step_index, id = step.id, passed, "coin flip progress check");
        passed
    }
}

/// A check with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub bool);

#[async_trait]
impl ProgressCheck for FixedOutcome {
    async fn check(&self, _step_index: usize, _step: &Step) -> bool {
        self.0
    }
}
