//! # Execution context
//!
//! The graph never talks to a graphics API directly. Whatever records native commands implements
//! [ExecutionContext] and is handed to the [GraphExecutor](crate::GraphExecutor) for a single traversal.
//!
//! [CommandList] is a recording implementation that just stores what it was asked to do. It is used by tests
//! and the headless demo, and is a good starting point when writing a real backend.

use ahash::AHashSet;
use anyhow::bail;

use crate::{
    graph::NodeId,
    hazard::Barrier,
    task::{
        BlitImage, BuildAccelerationStructure, ClearColorImage, ClearDepthStencil, CopyBuffer,
        CopyBufferToImage, CopyImage, CopyImageToBuffer, Dispatch, Draw, FillBuffer, ReadBuffer,
        ResolveImage, TaskKind, UpdateBuffer,
    },
};

///Records native commands for the tasks of a graph.
///
/// Every task method defaults to an error, so a backend only has to implement the kinds it supports. Using an
/// unsupported kind fails the node (and its dependees) at execution time.
pub trait ExecutionContext {
    ///Records one batch of same-queue barriers that have to happen before `node`.
    fn pipeline_barrier(&mut self, node: NodeId, barriers: &[Barrier]) -> anyhow::Result<()>;

    ///Records the release/acquire pair that moves a resource to the graph's queue.
    fn queue_ownership_transfer(&mut self, node: NodeId, barrier: &Barrier) -> anyhow::Result<()>;

    ///Debug marker before the task's commands.
    fn begin_task(&mut self, _node: NodeId, _name: &str) {}
    ///Debug marker after the task's commands.
    fn end_task(&mut self, _node: NodeId) {}

    fn copy_buffer(&mut self, _node: NodeId, _task: &CopyBuffer) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::CopyBuffer.name())
    }
    fn copy_image(&mut self, _node: NodeId, _task: &CopyImage) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::CopyImage.name())
    }
    fn copy_buffer_to_image(
        &mut self,
        _node: NodeId,
        _task: &CopyBufferToImage,
    ) -> anyhow::Result<()> {
        bail!(
            "{} is not supported by this context",
            TaskKind::CopyBufferToImage.name()
        )
    }
    fn copy_image_to_buffer(
        &mut self,
        _node: NodeId,
        _task: &CopyImageToBuffer,
    ) -> anyhow::Result<()> {
        bail!(
            "{} is not supported by this context",
            TaskKind::CopyImageToBuffer.name()
        )
    }
    fn update_buffer(&mut self, _node: NodeId, _task: &UpdateBuffer) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::UpdateBuffer.name())
    }
    fn fill_buffer(&mut self, _node: NodeId, _task: &FillBuffer) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::FillBuffer.name())
    }
    fn clear_color_image(&mut self, _node: NodeId, _task: &ClearColorImage) -> anyhow::Result<()> {
        bail!(
            "{} is not supported by this context",
            TaskKind::ClearColorImage.name()
        )
    }
    fn clear_depth_stencil(
        &mut self,
        _node: NodeId,
        _task: &ClearDepthStencil,
    ) -> anyhow::Result<()> {
        bail!(
            "{} is not supported by this context",
            TaskKind::ClearDepthStencil.name()
        )
    }
    fn blit_image(&mut self, _node: NodeId, _task: &BlitImage) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::BlitImage.name())
    }
    fn resolve_image(&mut self, _node: NodeId, _task: &ResolveImage) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::ResolveImage.name())
    }
    fn draw(&mut self, _node: NodeId, _task: &Draw) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::Draw.name())
    }
    fn dispatch(&mut self, _node: NodeId, _task: &Dispatch) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::Dispatch.name())
    }
    fn build_acceleration_structure(
        &mut self,
        _node: NodeId,
        _task: &BuildAccelerationStructure,
    ) -> anyhow::Result<()> {
        bail!(
            "{} is not supported by this context",
            TaskKind::BuildAccelerationStructure.name()
        )
    }
    fn read_buffer(&mut self, _node: NodeId, _task: &ReadBuffer) -> anyhow::Result<()> {
        bail!("{} is not supported by this context", TaskKind::ReadBuffer.name())
    }
}

///Single entry of a [CommandList].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCommand {
    BeginTask { node: NodeId, name: String },
    PipelineBarrier { node: NodeId, barriers: Vec<Barrier> },
    OwnershipTransfer { node: NodeId, barrier: Barrier },
    Task { node: NodeId, kind: TaskKind },
    EndTask { node: NodeId },
}

impl RecordedCommand {
    pub fn node(&self) -> NodeId {
        match self {
            RecordedCommand::BeginTask { node, .. }
            | RecordedCommand::PipelineBarrier { node, .. }
            | RecordedCommand::OwnershipTransfer { node, .. }
            | RecordedCommand::Task { node, .. }
            | RecordedCommand::EndTask { node } => *node,
        }
    }
}

///Recording [ExecutionContext]. Stores every call instead of talking to a device.
#[derive(Default)]
pub struct CommandList {
    commands: Vec<RecordedCommand>,
    failing: AHashSet<NodeId>,
    reject_ownership_transfers: bool,
}

impl CommandList {
    pub fn new() -> Self {
        CommandList::default()
    }

    ///Lets the task of `node` fail when it is processed.
    pub fn with_failing_node(mut self, node: NodeId) -> Self {
        self.failing.insert(node);
        self
    }

    ///Makes every queue ownership transfer fail, as a backend without the needed queue family would.
    pub fn rejecting_ownership_transfers(mut self) -> Self {
        self.reject_ownership_transfers = true;
        self
    }

    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    ///Nodes whose task was recorded, in recording order.
    pub fn recorded_tasks(&self) -> Vec<NodeId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::Task { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, node: NodeId, kind: TaskKind) -> anyhow::Result<()> {
        if self.failing.contains(&node) {
            bail!("{} of {} was set up to fail", kind.name(), node);
        }
        self.commands.push(RecordedCommand::Task { node, kind });
        Ok(())
    }
}

impl ExecutionContext for CommandList {
    fn pipeline_barrier(&mut self, node: NodeId, barriers: &[Barrier]) -> anyhow::Result<()> {
        self.commands.push(RecordedCommand::PipelineBarrier {
            node,
            barriers: barriers.to_vec(),
        });
        Ok(())
    }

    fn queue_ownership_transfer(&mut self, node: NodeId, barrier: &Barrier) -> anyhow::Result<()> {
        if self.reject_ownership_transfers {
            bail!(
                "Ownership transfer of {} ({:?}) is not possible",
                barrier.resource,
                barrier.requirement
            );
        }
        self.commands.push(RecordedCommand::OwnershipTransfer {
            node,
            barrier: *barrier,
        });
        Ok(())
    }

    fn begin_task(&mut self, node: NodeId, name: &str) {
        self.commands.push(RecordedCommand::BeginTask {
            node,
            name: name.to_string(),
        });
    }

    fn end_task(&mut self, node: NodeId) {
        self.commands.push(RecordedCommand::EndTask { node });
    }

    fn copy_buffer(&mut self, node: NodeId, _task: &CopyBuffer) -> anyhow::Result<()> {
        self.record(node, TaskKind::CopyBuffer)
    }
    fn copy_image(&mut self, node: NodeId, _task: &CopyImage) -> anyhow::Result<()> {
        self.record(node, TaskKind::CopyImage)
    }
    fn copy_buffer_to_image(
        &mut self,
        node: NodeId,
        _task: &CopyBufferToImage,
    ) -> anyhow::Result<()> {
        self.record(node, TaskKind::CopyBufferToImage)
    }
    fn copy_image_to_buffer(
        &mut self,
        node: NodeId,
        _task: &CopyImageToBuffer,
    ) -> anyhow::Result<()> {
        self.record(node, TaskKind::CopyImageToBuffer)
    }
    fn update_buffer(&mut self, node: NodeId, _task: &UpdateBuffer) -> anyhow::Result<()> {
        self.record(node, TaskKind::UpdateBuffer)
    }
    fn fill_buffer(&mut self, node: NodeId, _task: &FillBuffer) -> anyhow::Result<()> {
        self.record(node, TaskKind::FillBuffer)
    }
    fn clear_color_image(&mut self, node: NodeId, _task: &ClearColorImage) -> anyhow::Result<()> {
        self.record(node, TaskKind::ClearColorImage)
    }
    fn clear_depth_stencil(
        &mut self,
        node: NodeId,
        _task: &ClearDepthStencil,
    ) -> anyhow::Result<()> {
        self.record(node, TaskKind::ClearDepthStencil)
    }
    fn blit_image(&mut self, node: NodeId, _task: &BlitImage) -> anyhow::Result<()> {
        self.record(node, TaskKind::BlitImage)
    }
    fn resolve_image(&mut self, node: NodeId, _task: &ResolveImage) -> anyhow::Result<()> {
        self.record(node, TaskKind::ResolveImage)
    }
    fn draw(&mut self, node: NodeId, _task: &Draw) -> anyhow::Result<()> {
        self.record(node, TaskKind::Draw)
    }
    fn dispatch(&mut self, node: NodeId, _task: &Dispatch) -> anyhow::Result<()> {
        self.record(node, TaskKind::Dispatch)
    }
    fn build_acceleration_structure(
        &mut self,
        node: NodeId,
        _task: &BuildAccelerationStructure,
    ) -> anyhow::Result<()> {
        self.record(node, TaskKind::BuildAccelerationStructure)
    }
    fn read_buffer(&mut self, node: NodeId, _task: &ReadBuffer) -> anyhow::Result<()> {
        self.record(node, TaskKind::ReadBuffer)
    }
}
