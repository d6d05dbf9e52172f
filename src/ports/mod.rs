// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::domain::model::{ProcessResult, ToolInvocation};
use crate::engine::progress::ExtractionObserver;
use crate::error::TrimXResult;

/// Port for running one external tool invocation to completion
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Run the invocation and return its captured output.
    ///
    /// Returns only after the process exited. A non-zero exit is reported
    /// through `ProcessResult::succeeded`; `Err` is reserved for failing to
    /// start the tool at all. `observer.on_tick` is called while waiting.
    async fn run(
        &self,
        invocation: &ToolInvocation,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<ProcessResult>;
}
