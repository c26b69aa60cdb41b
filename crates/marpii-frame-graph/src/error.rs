use thiserror::Error;

use crate::{graph::NodeId, resource::AnyResKey};

///Reasons a task descriptor is rejected at creation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task has no regions")]
    NoRegions,
    #[error("Region {0} has a size of zero")]
    EmptyRegion(usize),
    #[error("Regions {0} and {1} overlap")]
    OverlappingRegions(usize, usize),
    #[error("Null resource handle in slot \"{0}\"")]
    NullHandle(&'static str),
    #[error("Resource {0} is requested in conflicting layouts by the same task")]
    DuplicateResource(AnyResKey),
    #[error("Source and destination of an image operation must differ")]
    SameImage,
    #[error("Resolve source must be multisampled, but has {0} sample(s)")]
    NotMultisampled(u32),
    #[error("Draw has no color or depth target")]
    NoDrawTarget,
    #[error("Draw or dispatch has no work (zero count)")]
    NoWork,
    #[error("Update payload must contain 1..={max} bytes, was {len}")]
    UpdateSize { len: usize, max: usize },
    #[error("Acceleration structure build has no geometry")]
    NoGeometry,
}

///Errors while building a [TaskGraph](crate::TaskGraph).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Graph was not constructed")]
    NotConstructed,
    #[error("Graph is already constructed and holds {0} task(s). Tear it down first")]
    AlreadyConstructed(usize),
    #[error("Task \"{name}\" is invalid: {error}")]
    InvalidTask {
        name: String,
        #[source]
        error: TaskError,
    },
    #[error("Task \"{0}\" declares itself as dependency")]
    SelfDependency(String),
    #[error("Dependency {0:?} does not exist in this graph (anymore?)")]
    UnknownDependency(NodeId),
    #[error("Node {0:?} is already registered")]
    DuplicateNode(NodeId),
    #[error("Dependency cycle involving {0:?}")]
    Cycle(Vec<NodeId>),
    #[error("Resource {0} was imported after a task already accessed it")]
    ImportAfterUse(AnyResKey),
    #[error("Graph is unusable after an earlier construction error. Tear it down and rebuild")]
    Poisoned,
    #[error("Graph was already executed")]
    AlreadyExecuted,
}

///Errors reported by the [GraphExecutor](crate::GraphExecutor).
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Graph can not be executed: {0}")]
    Graph(#[from] GraphError),
    #[error("Executor is not idle. Reset it before executing another graph")]
    BusyExecutor,
    #[error("Task \"{name}\" ({node:?}) failed: {error:#}")]
    TaskFailed {
        node: NodeId,
        name: String,
        error: anyhow::Error,
    },
}

#[cfg(test)]
mod test {
    use static_assertions::assert_impl_all;

    use crate::error::{ExecutionError, GraphError, TaskError};

    #[test]
    fn assure_send_sync() {
        assert_impl_all!(TaskError: Send, Sync);
        assert_impl_all!(GraphError: Send, Sync);
        assert_impl_all!(ExecutionError: Send, Sync);
    }
}
