//! # Task graph
//!
//! Owns the nodes of one command buffer, wires their dependencies and keeps track of the entry set. Dependencies
//! are either declared by the caller, or derived from resource hazards when a task is added.
//!
//! Nodes live in an index based arena. A [NodeId] is the position of the node (which equals its submission index)
//! plus the id of the graph instance and the epoch it was created in. Tearing the graph down bumps the epoch, which
//! invalidates all handles of the previous frame. Handles of one graph are never valid in another one.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::{
    error::GraphError,
    hazard::{Barrier, ImportState, ResourceHazardTracker, TrackedState},
    resource::{AnyResKey, QueueKind},
    task::{FrameTask, TaskDesc},
};

///Source of unique [TaskGraph] instance ids.
static NEXT_GRAPH_ID: AtomicU32 = AtomicU32::new(0);

///Handle to a node of a [TaskGraph]. Only valid for the graph instance and epoch it was returned from.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct NodeId {
    index: u32,
    graph: u32,
    epoch: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, graph: u32, epoch: u32) -> Self {
        NodeId {
            index,
            graph,
            epoch,
        }
    }

    ///Submission index of the node.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.index)
    }
}

///Run time configuration of a graph, passed to [TaskGraph::construct].
#[derive(Clone, Debug)]
pub struct GraphConfig {
    ///Debug name, usually the name of the command buffer.
    pub name: String,
    ///Queue the graph's command buffer is submitted to.
    pub queue: QueueKind,
    ///Number of nodes to pre-allocate.
    pub node_capacity: usize,
    ///If set, failing or cyclic graphs are dumped to the log in debug builds.
    pub dump_on_failure: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            name: String::from("FrameGraph"),
            queue: QueueKind::Graphics,
            node_capacity: 64,
            dump_on_failure: true,
        }
    }
}

impl GraphConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_queue(mut self, queue: QueueKind) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    pub fn with_dump_on_failure(mut self, dump: bool) -> Self {
        self.dump_on_failure = dump;
        self
    }
}

///Lifecycle of a [TaskGraph].
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum GraphState {
    ///New or torn down. Needs [construct](TaskGraph::construct).
    Unconstructed,
    ///Accepts tasks.
    Building,
    ///Was traversed by an executor. Needs a tear down before it can be reused.
    Executed,
    ///A construction error happened. Needs a tear down before it can be reused.
    Poisoned,
}

///Per command buffer task graph.
///
/// Usage per frame: [construct](Self::construct), [import](Self::import) whatever state is known from outside, add
/// tasks via [add_task](Self::add_task), execute via a [GraphExecutor](crate::GraphExecutor), then
/// [tear_down](Self::tear_down).
pub struct TaskGraph {
    config: GraphConfig,
    state: GraphState,
    id: u32,
    epoch: u32,
    nodes: Vec<FrameTask>,
    entries: Vec<NodeId>,
    tracker: ResourceHazardTracker,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    ///Creates an unconstructed graph.
    pub fn new() -> Self {
        let config = GraphConfig::default();
        TaskGraph {
            tracker: ResourceHazardTracker::new(config.queue),
            config,
            state: GraphState::Unconstructed,
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            nodes: Vec::new(),
            entries: Vec::new(),
        }
    }

    ///Prepares the graph for a new frame. Fails if the graph already holds tasks.
    pub fn construct(&mut self, config: GraphConfig) -> Result<(), GraphError> {
        match self.state {
            GraphState::Unconstructed => {}
            GraphState::Building if self.nodes.is_empty() => {}
            GraphState::Poisoned => return Err(GraphError::Poisoned),
            GraphState::Building | GraphState::Executed => {
                return Err(GraphError::AlreadyConstructed(self.nodes.len()));
            }
        }

        self.nodes.clear();
        self.nodes.reserve(config.node_capacity);
        self.entries.clear();
        self.tracker.reset(config.queue);

        #[cfg(feature = "logging")]
        log::info!(
            "Constructing graph \"{}\" on {} queue (epoch {})",
            config.name,
            config.queue,
            self.epoch
        );

        self.config = config;
        self.state = GraphState::Building;
        Ok(())
    }

    ///Releases all nodes. Every [NodeId] handed out before becomes invalid. Calling it on an unconstructed graph
    /// does nothing.
    pub fn tear_down(&mut self) {
        if self.state == GraphState::Unconstructed {
            #[cfg(feature = "logging")]
            log::warn!(
                "Tear down of graph \"{}\" that is not constructed, ignoring",
                self.config.name
            );
            return;
        }

        #[cfg(feature = "logging")]
        log::info!(
            "Tearing down graph \"{}\" with {} node(s)",
            self.config.name,
            self.nodes.len()
        );

        self.nodes.clear();
        self.entries.clear();
        self.tracker.reset(self.config.queue);
        self.epoch = self.epoch.wrapping_add(1);
        self.state = GraphState::Unconstructed;
    }

    ///Seeds the state of a resource whose current owner or layout is known from outside the graph. Must happen
    /// before any task accesses the resource, otherwise the graph is poisoned.
    pub fn import(
        &mut self,
        resource: impl Into<AnyResKey>,
        state: ImportState,
    ) -> Result<(), GraphError> {
        self.check_building()?;
        let resource = resource.into();
        if self.tracker.is_accessed(resource) {
            #[cfg(feature = "logging")]
            log::error!(
                "Import of {} into graph \"{}\" after it was already used by a task",
                resource,
                self.config.name
            );
            self.state = GraphState::Poisoned;
            return Err(GraphError::ImportAfterUse(resource));
        }
        self.tracker.import(resource, state);
        Ok(())
    }

    ///Adds an unnamed task. See [add_named_task](Self::add_named_task).
    pub fn add_task(
        &mut self,
        desc: impl Into<TaskDesc>,
        dependencies: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let desc = desc.into();
        let name = format!("{}#{}", desc.kind().name(), self.nodes.len());
        self.add_named_task(name, desc, dependencies)
    }

    ///Adds a task that runs after all `dependencies`, and after every earlier task it has a resource hazard with.
    ///
    /// Any error poisons the graph.
    pub fn add_named_task(
        &mut self,
        name: impl Into<String>,
        desc: impl Into<TaskDesc>,
        dependencies: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.check_building()?;
        let id = self.next_id();
        let mut node = FrameTask::create(id, name, desc.into(), dependencies);

        if let Err(e) = self.validate_node(&node) {
            #[cfg(feature = "logging")]
            log::error!(
                "Could not add task \"{}\" to graph \"{}\": {}",
                node.name(),
                self.config.name,
                e
            );
            self.state = GraphState::Poisoned;
            return Err(e);
        }

        //hazard derived dependencies and barriers
        for usage in node.desc().usages() {
            let hazard = self.tracker.record_access(usage, id);
            for dep in &hazard.wait_on {
                node.add_implicit_dependency(*dep);
            }
            if hazard.needs_barrier() {
                node.push_barrier(Barrier {
                    resource: usage.resource,
                    requirement: hazard.requirement,
                    src_access: hazard.src_access,
                    dst_access: usage.mode,
                    transition: hazard.transition,
                });
            }
        }

        if node.inputs().is_empty() {
            self.entries.push(id);
        } else {
            for dep in node.inputs() {
                self.nodes[dep.index()].attach(id);
            }
        }

        #[cfg(feature = "log_reasoning")]
        log::trace!(
            "Added {} \"{}\" after {:?} with {} barrier(s)",
            id,
            node.name(),
            node.inputs(),
            node.barriers().len()
        );

        self.nodes.push(node);
        Ok(id)
    }

    fn next_id(&self) -> NodeId {
        NodeId::new(self.nodes.len() as u32, self.id, self.epoch)
    }

    fn check_building(&self) -> Result<(), GraphError> {
        match self.state {
            GraphState::Building => Ok(()),
            GraphState::Unconstructed => Err(GraphError::NotConstructed),
            GraphState::Executed => Err(GraphError::AlreadyExecuted),
            GraphState::Poisoned => Err(GraphError::Poisoned),
        }
    }

    fn validate_node(&self, node: &FrameTask) -> Result<(), GraphError> {
        if let Some(error) = node.validation_error() {
            return Err(GraphError::InvalidTask {
                name: node.name().to_string(),
                error: error.clone(),
            });
        }

        let id = node.id();
        if self.nodes.len() != id.index() {
            return Err(GraphError::DuplicateNode(id));
        }
        for dep in node.inputs() {
            if *dep == id {
                return Err(GraphError::SelfDependency(node.name().to_string()));
            }
            if !self.owns(*dep) || dep.index() >= self.nodes.len() {
                return Err(GraphError::UnknownDependency(*dep));
            }
        }
        Ok(())
    }

    ///Handle the next added task will get. Handles are only ever handed out in increasing order, so a task can
    /// never depend on a node that is added after it.
    pub fn peek_next_id(&self) -> NodeId {
        self.next_id()
    }

    ///Checks that every node is reachable from the entry set without running into a cycle. Returns the nodes
    /// that are part of, or behind, a cycle otherwise.
    pub fn check_acyclic(&self) -> Result<(), GraphError> {
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.inputs().len()).collect();
        let mut stack: Vec<usize> = self.entries.iter().map(|e| e.index()).collect();
        let mut visited = 0;

        while let Some(idx) = stack.pop() {
            visited += 1;
            for succ in self.nodes[idx].attached() {
                let s = succ.index();
                pending[s] -= 1;
                if pending[s] == 0 {
                    stack.push(s);
                }
            }
        }

        if visited == self.nodes.len() {
            Ok(())
        } else {
            let left: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|n| pending[n.id().index()] > 0)
                .map(|n| n.id())
                .collect();
            Err(GraphError::Cycle(left))
        }
    }

    ///Called by the executor once the graph was traversed.
    pub(crate) fn mark_executed(&mut self) {
        self.state = GraphState::Executed;
    }

    pub(crate) fn poison(&mut self) {
        self.state = GraphState::Poisoned;
    }

    ///Nodes without any dependency, in submission order.
    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    ///Returns the node for `id`, or None if the handle is stale or unknown.
    pub fn node(&self, id: NodeId) -> Option<&FrameTask> {
        if !self.owns(id) {
            return None;
        }
        self.nodes.get(id.index())
    }

    ///True if `id` was handed out by this graph in its current epoch.
    fn owns(&self, id: NodeId) -> bool {
        id.graph == self.id && id.epoch == self.epoch
    }

    pub fn nodes_in_submission_order(&self) -> &[FrameTask] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ResourceHazardTracker {
        &self.tracker
    }

    ///State every touched resource is left in after the graph ran. Can be handed to the next frame's
    /// [import](Self::import).
    pub fn final_states(&self) -> Vec<(AnyResKey, TrackedState)> {
        self.tracker.states()
    }
}

impl Display for TaskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Graph \"{}\" on {} queue, {} node(s), {:?}:",
            self.config.name,
            self.config.queue,
            self.nodes.len(),
            self.state
        )?;
        for node in &self.nodes {
            let deps: Vec<String> = node.inputs().iter().map(|d| d.to_string()).collect();
            write!(
                f,
                "    {} {} [{}] <- [{}]",
                node.id(),
                node.name(),
                node.kind().name(),
                deps.join(", ")
            )?;
            if !node.barriers().is_empty() {
                write!(f, " barriers:")?;
                for b in node.barriers() {
                    write!(f, " {}:{:?}", b.resource, b.requirement)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::TaskError,
        hazard::BarrierRequirement,
        resource::{AccessMode, BufferKey, ImageLayout, Resources},
        task::{
            Binding, BufferCopyRegion, ColorTarget, CopyBuffer, Dispatch, DispatchSize, Draw,
            DrawCall, FillBuffer, LoadOp, ReadBuffer,
        },
    };

    fn graph() -> TaskGraph {
        let mut g = TaskGraph::new();
        g.construct(GraphConfig::default().with_name("test")).unwrap();
        g
    }

    fn copy(src: BufferKey, dst: BufferKey) -> CopyBuffer {
        CopyBuffer {
            src,
            dst,
            regions: vec![BufferCopyRegion {
                src_offset: 0,
                dst_offset: 0,
                size: 64,
            }],
        }
    }

    fn fill(dst: BufferKey) -> FillBuffer {
        FillBuffer {
            dst,
            offset: 0,
            size: 64,
            value: 0,
        }
    }

    fn read(buffer: BufferKey) -> ReadBuffer {
        ReadBuffer {
            buffer,
            offset: 0,
            size: 64,
        }
    }

    fn draw(res: &mut Resources, name: &str) -> Draw {
        Draw {
            color_targets: vec![ColorTarget {
                image: res.add_image(name, [32, 32, 1], 1),
                load: LoadOp::Clear,
            }],
            depth_target: None,
            vertex_buffers: vec![res.add_buffer(format!("{name}_vertices"), 128)],
            index_buffer: None,
            bindings: vec![],
            call: DrawCall::Direct {
                vertex_count: 3,
                instance_count: 1,
            },
        }
    }

    //copy then read back with explicit dependency
    #[test]
    fn copy_then_read() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let b = res.add_buffer("b", 64);
        let mut g = graph();

        let cp = g.add_task(copy(a, b), &[]).unwrap();
        let rd = g.add_task(read(b), &[cp]).unwrap();

        assert_eq!(g.entries(), &[cp]);
        assert_eq!(g.node(cp).unwrap().attached(), &[rd]);
        let barriers = g.node(rd).unwrap().barriers();
        assert_eq!(barriers.len(), 1);
        assert_eq!(barriers[0].requirement, BarrierRequirement::Memory);
        assert_eq!(barriers[0].resource, AnyResKey::Buffer(b));
        assert!(g.check_acyclic().is_ok());
    }

    //independent draws
    #[test]
    fn independent_draws() {
        let mut res = Resources::new();
        let mut g = graph();
        let d0 = g.add_task(draw(&mut res, "first"), &[]).unwrap();
        let d1 = g.add_task(draw(&mut res, "second"), &[]).unwrap();

        assert_eq!(g.entries(), &[d0, d1]);
        assert!(g.node(d0).unwrap().barriers().is_empty());
        assert!(g.node(d1).unwrap().barriers().is_empty());
    }

    //write after write without declared dependency
    #[test]
    fn implicit_write_dependency() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let mut g = graph();
        let w0 = g.add_task(fill(r), &[]).unwrap();
        let w1 = g.add_task(fill(r), &[]).unwrap();

        assert_eq!(g.entries(), &[w0]);
        assert_eq!(g.node(w1).unwrap().inputs(), &[w0]);
        assert_eq!(g.node(w0).unwrap().attached(), &[w1]);
    }

    #[test]
    fn self_dependency_is_rejected() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let mut g = graph();
        g.add_task(fill(r), &[]).unwrap();

        let me = g.peek_next_id();
        let err = g.add_named_task("selfish", fill(r), &[me]).unwrap_err();
        assert_eq!(err, GraphError::SelfDependency("selfish".to_string()));
        assert_eq!(g.state(), GraphState::Poisoned);
        assert_eq!(g.add_task(fill(r), &[]), Err(GraphError::Poisoned));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn invalid_task_poisons() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let mut g = graph();
        let err = g
            .add_named_task(
                "empty",
                CopyBuffer {
                    src: a,
                    dst: a,
                    regions: vec![],
                },
                &[],
            )
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidTask {
                name: "empty".to_string(),
                error: TaskError::NoRegions
            }
        );
        assert_eq!(g.state(), GraphState::Poisoned);
        //invalid tasks do not leak into the tracker
        assert!(g.tracker().is_empty());
    }

    #[test]
    fn double_tear_down() {
        let mut g = graph();
        g.tear_down();
        g.tear_down();
        assert_eq!(g.state(), GraphState::Unconstructed);
        assert!(g.is_empty());
        assert!(g.construct(GraphConfig::default()).is_ok());
    }

    #[test]
    fn stale_handles() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let mut g = graph();
        let old = g.add_task(fill(r), &[]).unwrap();
        g.tear_down();
        g.construct(GraphConfig::default()).unwrap();

        assert!(g.node(old).is_none());
        assert_eq!(
            g.add_task(fill(r), &[old]),
            Err(GraphError::UnknownDependency(old))
        );
    }

    #[test]
    fn rebuild_matches_fresh_graph() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let b = res.add_buffer("b", 64);

        let build = |g: &mut TaskGraph| {
            let c = g.add_task(copy(a, b), &[]).unwrap();
            g.add_task(read(b), &[]).unwrap();
            g.add_task(fill(a), &[c]).unwrap();
        };

        let mut reused = graph();
        build(&mut reused);
        reused.tear_down();
        reused.construct(GraphConfig::default().with_name("test")).unwrap();
        build(&mut reused);

        let mut fresh = graph();
        build(&mut fresh);

        assert_eq!(reused.entries().len(), fresh.entries().len());
        for (r, f) in reused
            .nodes_in_submission_order()
            .iter()
            .zip(fresh.nodes_in_submission_order())
        {
            let idx = |ids: &[NodeId]| ids.iter().map(|i| i.index()).collect::<Vec<_>>();
            assert_eq!(idx(r.inputs()), idx(f.inputs()));
            assert_eq!(idx(r.attached()), idx(f.attached()));
            assert_eq!(r.barriers(), f.barriers());
        }
        assert_eq!(reused.final_states(), fresh.final_states());
    }

    #[test]
    fn construct_twice() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let mut g = TaskGraph::new();
        assert_eq!(g.add_task(fill(r), &[]), Err(GraphError::NotConstructed));

        g.construct(GraphConfig::default()).unwrap();
        //restart is fine while empty
        g.construct(GraphConfig::default().with_queue(QueueKind::Compute))
            .unwrap();
        g.add_task(fill(r), &[]).unwrap();
        assert_eq!(
            g.construct(GraphConfig::default()),
            Err(GraphError::AlreadyConstructed(1))
        );
        assert_eq!(g.config().queue, QueueKind::Compute);
    }

    #[test]
    fn handles_of_other_graphs() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let s = res.add_buffer("s", 64);

        let mut first = graph();
        let mut second = graph();
        let foreign = first.add_task(fill(r), &[]).unwrap();
        //same index and epoch exist in the second graph
        second.add_task(fill(s), &[]).unwrap();

        assert!(second.node(foreign).is_none());
        assert_eq!(
            second.add_task(fill(s), &[foreign]),
            Err(GraphError::UnknownDependency(foreign))
        );
        assert_eq!(second.state(), GraphState::Poisoned);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn import_after_use_is_rejected() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let untouched = res.add_buffer("untouched", 64);
        let mut g = graph();

        g.add_task(fill(r), &[]).unwrap();
        //importing resources nobody used yet is fine
        g.import(untouched, ImportState::default()).unwrap();
        assert_eq!(
            g.import(r, ImportState::default()),
            Err(GraphError::ImportAfterUse(AnyResKey::Buffer(r)))
        );
        assert_eq!(g.state(), GraphState::Poisoned);
        assert_eq!(g.add_task(fill(r), &[]), Err(GraphError::Poisoned));

        //the write hazard on `r` survives a rebuild where the import happens first
        g.tear_down();
        g.construct(GraphConfig::default()).unwrap();
        g.import(r, ImportState::default()).unwrap();
        let w0 = g.add_task(fill(r), &[]).unwrap();
        let w1 = g.add_task(fill(r), &[]).unwrap();
        assert_eq!(g.entries(), &[w0]);
        assert_eq!(g.node(w1).unwrap().inputs(), &[w0]);
        assert_eq!(
            g.node(w1).unwrap().barriers()[0].requirement,
            BarrierRequirement::Memory
        );
    }

    //Entries are exactly the nodes without dependencies, and every edge goes forward in submission order.
    #[test]
    fn entries_and_edges() {
        let mut res = Resources::new();
        let bufs: Vec<BufferKey> = (0..6).map(|i| res.add_buffer(format!("b{i}"), 64)).collect();
        let img = res.add_image("storage", [8, 8, 1], 1);
        let mut g = graph();

        let mut ids = Vec::new();
        for i in 0..24usize {
            let a = bufs[i % bufs.len()];
            let b = bufs[(i * 7 + 3) % bufs.len()];
            let id = match i % 4 {
                0 => g.add_task(fill(a), &[]),
                1 => g.add_task(read(a), &[]),
                2 if a != b => g.add_task(copy(a, b), &[]),
                _ => {
                    let deps: Vec<NodeId> = ids.iter().rev().take(1).copied().collect();
                    g.add_task(
                        Dispatch {
                            size: DispatchSize::Groups([1, 1, 1]),
                            bindings: vec![
                                Binding::StorageBuffer {
                                    buffer: a,
                                    mode: AccessMode::ReadWrite,
                                },
                                Binding::StorageImage {
                                    image: img,
                                    mode: AccessMode::Write,
                                },
                            ],
                        },
                        &deps,
                    )
                }
            }
            .unwrap();
            ids.push(id);
        }

        for node in g.nodes_in_submission_order() {
            assert_eq!(
                g.entries().contains(&node.id()),
                node.inputs().is_empty(),
                "{}",
                node.id()
            );
            for dep in node.inputs() {
                assert!(dep.index() < node.id().index());
                assert!(g.node(*dep).unwrap().attached().contains(&node.id()));
            }
        }
        assert!(g.check_acyclic().is_ok());

        let img_state = g.tracker().state(img.into()).unwrap();
        assert_eq!(img_state.layout, Some(ImageLayout::General));
    }

    #[test]
    fn display_lists_nodes() {
        let mut res = Resources::new();
        let r = res.add_buffer("r", 64);
        let mut g = graph();
        g.add_named_task("clear", fill(r), &[]).unwrap();
        g.add_named_task("again", fill(r), &[]).unwrap();
        let text = g.to_string();
        assert!(text.contains("n0 clear [FillBuffer] <- []"));
        assert!(text.contains("n1 again [FillBuffer] <- [n0] barriers:"));
    }
}
