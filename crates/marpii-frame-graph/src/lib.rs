//! # Frame graph
//!
//! Per command buffer task graph. Tasks (copies, clears, draws, dispatches ...) are added in submission order,
//! optionally with explicit dependencies. The graph derives the remaining dependencies from resource hazards
//! (read after write, write after read, write after write) and records which barrier each task needs before it may
//! run.
//!
//! # Building
//! A [TaskGraph] is [constructed](TaskGraph::construct) once per frame. Every [add_task](TaskGraph::add_task)
//! returns a [NodeId] that can be passed as dependency of later tasks. Tasks without any dependency form the entry
//! set of the graph. After the frame the graph is [torn down](TaskGraph::tear_down), which invalidates all handles.
//!
//! # Executing
//! The [GraphExecutor] walks the graph in dependency order, emits the recorded barriers and lets each task record
//! itself into an [ExecutionContext]. The context is the only thing that talks to an actual graphics API, which
//! keeps the graph testable without a device. [CommandList] is a recording context for exactly that.
//!
//! # Debugging
//! With the `dot` feature the [DebugGraphDumper] renders a graph as graphviz DOT. With `log_reasoning` every barrier
//! and scheduling decision is written to the `TRACE` level of `log`.

mod context;
pub use context::{CommandList, ExecutionContext, RecordedCommand};

mod error;
pub use error::{ExecutionError, GraphError, TaskError};

mod executor;
pub use executor::{ExecutionReport, ExecutorState, GraphExecutor, TaskFailure};

mod graph;
pub use graph::{GraphConfig, GraphState, NodeId, TaskGraph};

mod hazard;
pub use hazard::{
    AccessState, Barrier, BarrierRequirement, Hazard, ImportState, LayoutTransition,
    ResourceHazardTracker, TrackedState,
};

mod resource;
pub use resource::{
    AccessMode, AnyResKey, BufferInfo, BufferKey, ImageInfo, ImageKey, ImageLayout, QueueKind,
    ResourceUsage, Resources,
};

///Task descriptors of all supported task kinds.
pub mod task;
pub use task::{FrameTask, TaskDesc, TaskKind};

#[cfg(feature = "dot")]
mod dot;
#[cfg(feature = "dot")]
pub use dot::DebugGraphDumper;
