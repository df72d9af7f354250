//! AssistantApi trait definition.
//!
//! This is the seam between callers and the HTTP transport. Uses native
//! async fn in traits (RPITIT, Rust 2024 edition); the streaming result
//! rides inside [`ExecuteOutcome`] as a boxed byte stream, so no method
//! here needs its own boxed return.
//!
//! Every operation accepts an optional [`CancellationToken`]; a cancelled
//! call surfaces through the same fault path as any transport failure.
//! Implementations live in `colloquy-client` (e.g. `GatewayClient`).

use tokio_util::sync::CancellationToken;

use colloquy_types::action::ExecuteRequest;
use colloquy_types::conversation::{FindConversationsPage, FindConversationsParams};
use colloquy_types::fault::Fault;
use colloquy_types::knowledge_base::{KnowledgeBaseAck, KnowledgeBaseStatus};

use crate::outcome::ExecuteOutcome;

/// Client-side operations against the assistant gateway.
///
/// The execute path never returns an error to the caller -- every failure
/// folds into the outcome. The knowledge-base and conversation paths return
/// the fault as a value via `Result<T, Fault>`; callers branch on the shape.
pub trait AssistantApi: Send + Sync {
    /// Invoke a connector, buffered or streamed per the request's flag.
    fn execute(
        &self,
        request: ExecuteRequest,
        cancel: Option<CancellationToken>,
    ) -> impl std::future::Future<Output = ExecuteOutcome> + Send;

    /// Read provisioning status of the knowledge base, or of one named
    /// resource when `resource` is given.
    fn knowledge_base_status(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> impl std::future::Future<Output = Result<KnowledgeBaseStatus, Fault>> + Send;

    /// Provision the knowledge base, or load one named resource into it.
    fn create_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> impl std::future::Future<Output = Result<KnowledgeBaseAck, Fault>> + Send;

    /// Tear down the knowledge base, or remove one named resource from it.
    fn delete_knowledge_base(
        &self,
        resource: Option<&str>,
        cancel: Option<CancellationToken>,
    ) -> impl std::future::Future<Output = Result<KnowledgeBaseAck, Fault>> + Send;

    /// List conversations matching the query parameters.
    fn find_conversations(
        &self,
        params: FindConversationsParams,
        cancel: Option<CancellationToken>,
    ) -> impl std::future::Future<Output = Result<FindConversationsPage, Fault>> + Send;
}
