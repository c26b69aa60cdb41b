//! # Graph execution
//!
//! Traverses a [TaskGraph] exactly once in dependency order. Ready nodes are kept in a min heap keyed by their
//! submission index. Since dependencies always point to earlier submitted nodes, this visits independent nodes in
//! submission order, and the same graph always yields the same traversal.
//!
//! Before a node's work is recorded, all barriers that were derived for the node while building the graph are
//! emitted through the [ExecutionContext].

use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    context::ExecutionContext,
    error::{ExecutionError, GraphError},
    graph::{GraphState, NodeId, TaskGraph},
    hazard::Barrier,
    task::FrameTask,
};

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum ExecutorState {
    ///Ready to execute a graph.
    Idle,
    ///Currently walking a graph.
    Traversing,
    ///Last graph finished without failures.
    Completed,
    ///Last graph finished, but at least one node failed, or the graph could not be executed at all.
    Failed,
}

///A node that failed during execution.
#[derive(Debug)]
pub struct TaskFailure {
    pub node: NodeId,
    pub name: String,
    pub error: anyhow::Error,
}

///Outcome of a single [GraphExecutor::execute] call.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    ///Every node in the order it was visited, including skipped nodes.
    pub order: Vec<NodeId>,
    ///Failed nodes in the order they failed.
    pub failures: Vec<TaskFailure>,
    ///Nodes whose work was not recorded because a node they depend on failed.
    pub skipped: Vec<NodeId>,
    ///Number of individual barriers that were emitted.
    pub barriers_emitted: usize,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&TaskFailure> {
        self.failures.first()
    }

    pub fn has_failed(&self, node: NodeId) -> bool {
        self.failures.iter().any(|f| f.node == node)
    }

    pub fn was_skipped(&self, node: NodeId) -> bool {
        self.skipped.contains(&node)
    }

    ///Turns the report into an error, if any node failed. The error carries the first failing node.
    pub fn result(self) -> Result<ExecutionReport, ExecutionError> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        let mut failures = self.failures;
        let first = failures.swap_remove(0);
        Err(ExecutionError::TaskFailed {
            node: first.node,
            name: first.name,
            error: first.error,
        })
    }
}

///Dependency ordered walk over all nodes. `visit` returns whether the node succeeded. Successors of nodes that
/// did not succeed are visited with `tainted = true`.
fn traverse(
    graph: &TaskGraph,
    mut visit: impl FnMut(&FrameTask, bool) -> bool,
) -> Result<(), GraphError> {
    let nodes = graph.nodes_in_submission_order();
    let mut pending: Vec<usize> = nodes.iter().map(|n| n.inputs().len()).collect();
    let mut tainted = vec![false; nodes.len()];
    let mut ready: BinaryHeap<Reverse<usize>> =
        graph.entries().iter().map(|e| Reverse(e.index())).collect();
    let mut visited = 0;

    while let Some(Reverse(idx)) = ready.pop() {
        let node = &nodes[idx];
        let succeeded = visit(node, tainted[idx]);
        visited += 1;

        for succ in node.attached() {
            let s = succ.index();
            if !succeeded {
                tainted[s] = true;
            }
            pending[s] -= 1;
            if pending[s] == 0 {
                #[cfg(feature = "log_reasoning")]
                log::trace!("{} ready after {}", succ, node.id());
                ready.push(Reverse(s));
            }
        }
    }

    if visited != nodes.len() {
        let left = nodes
            .iter()
            .filter(|n| pending[n.id().index()] > 0)
            .map(|n| n.id())
            .collect();
        return Err(GraphError::Cycle(left));
    }
    Ok(())
}

///Walks [TaskGraph]s and records them into an [ExecutionContext].
pub struct GraphExecutor {
    state: ExecutorState,
}

impl Default for GraphExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphExecutor {
    pub fn new() -> Self {
        GraphExecutor {
            state: ExecutorState::Idle,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    ///Makes the executor idle again after a completed or failed execution.
    pub fn reset(&mut self) {
        self.state = ExecutorState::Idle;
    }

    ///Order in which [execute](Self::execute) would visit the nodes of `graph`, without executing anything.
    pub fn plan(graph: &TaskGraph) -> Result<Vec<NodeId>, GraphError> {
        match graph.state() {
            GraphState::Building | GraphState::Executed => {}
            GraphState::Unconstructed => return Err(GraphError::NotConstructed),
            GraphState::Poisoned => return Err(GraphError::Poisoned),
        }
        let mut order = Vec::with_capacity(graph.len());
        traverse(graph, |node, _| {
            order.push(node.id());
            true
        })?;
        Ok(order)
    }

    ///Executes `graph` into `ctx`.
    ///
    /// Returns an error if the graph can't be executed at all. Failing nodes do not abort the traversal. They are
    /// collected in the report, use [ExecutionReport::result] to surface them.
    pub fn execute<C: ExecutionContext>(
        &mut self,
        graph: &mut TaskGraph,
        ctx: &mut C,
    ) -> Result<ExecutionReport, ExecutionError> {
        if self.state != ExecutorState::Idle {
            return Err(ExecutionError::BusyExecutor);
        }
        match graph.state() {
            GraphState::Building => {}
            GraphState::Unconstructed => return Err(GraphError::NotConstructed.into()),
            GraphState::Executed => return Err(GraphError::AlreadyExecuted.into()),
            GraphState::Poisoned => return Err(GraphError::Poisoned.into()),
        }

        if let Err(e) = graph.check_acyclic() {
            #[cfg(feature = "logging")]
            log::error!("Graph \"{}\" can not be executed: {}", graph.config().name, e);
            Self::dump(graph, None);
            graph.poison();
            self.state = ExecutorState::Failed;
            return Err(e.into());
        }

        self.state = ExecutorState::Traversing;
        let mut report = ExecutionReport {
            order: Vec::with_capacity(graph.len()),
            ..Default::default()
        };

        let traversal = traverse(graph, |node, tainted| {
            report.order.push(node.id());
            let barriers = Self::emit_barriers(node, ctx);

            if tainted {
                #[cfg(feature = "logging")]
                log::warn!(
                    "Skipping {} \"{}\", a dependency failed",
                    node.id(),
                    node.name()
                );
                match barriers {
                    Ok(count) => report.barriers_emitted += count,
                    #[allow(unused_variables)]
                    Err(error) => {
                        #[cfg(feature = "logging")]
                        log::warn!(
                            "Barriers of skipped {} \"{}\" failed: {:#}",
                            node.id(),
                            node.name(),
                            error
                        );
                    }
                }
                report.skipped.push(node.id());
                return false;
            }

            let result = match barriers {
                Ok(count) => {
                    report.barriers_emitted += count;
                    ctx.begin_task(node.id(), node.name());
                    let res = node.process(ctx);
                    ctx.end_task(node.id());
                    res
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => true,
                Err(error) => {
                    #[cfg(feature = "logging")]
                    log::error!("{} \"{}\" failed: {:#}", node.id(), node.name(), error);
                    report.failures.push(TaskFailure {
                        node: node.id(),
                        name: node.name().to_string(),
                        error,
                    });
                    false
                }
            }
        });

        if let Err(e) = traversal {
            //check_acyclic already passed, so this is a broken graph
            graph.poison();
            self.state = ExecutorState::Failed;
            return Err(e.into());
        }

        graph.mark_executed();
        if report.is_success() {
            self.state = ExecutorState::Completed;
            #[cfg(feature = "logging")]
            log::info!(
                "Executed graph \"{}\": {} node(s), {} barrier(s)",
                graph.config().name,
                report.order.len(),
                report.barriers_emitted
            );
        } else {
            self.state = ExecutorState::Failed;
            #[cfg(feature = "logging")]
            log::error!(
                "Graph \"{}\" finished with {} failed and {} skipped node(s)",
                graph.config().name,
                report.failures.len(),
                report.skipped.len()
            );
            Self::dump(graph, Some(&report));
        }

        Ok(report)
    }

    ///Emits the node's barriers. Same queue barriers are batched into one call. Returns the number of barriers.
    fn emit_barriers<C: ExecutionContext>(node: &FrameTask, ctx: &mut C) -> anyhow::Result<usize> {
        let (transfers, local): (Vec<Barrier>, Vec<Barrier>) = node
            .barriers()
            .iter()
            .copied()
            .partition(|b| b.is_ownership_transfer());

        for transfer in &transfers {
            ctx.queue_ownership_transfer(node.id(), transfer)?;
        }
        if !local.is_empty() {
            ctx.pipeline_barrier(node.id(), &local)?;
        }
        Ok(transfers.len() + local.len())
    }

    ///Logs the DOT dump of a failed graph. Debug builds only.
    #[allow(unused_variables)]
    fn dump(graph: &TaskGraph, report: Option<&ExecutionReport>) {
        if !cfg!(debug_assertions) || !graph.config().dump_on_failure {
            return;
        }
        #[cfg(all(feature = "dot", feature = "logging"))]
        log::error!("{}", Self::render_dump(graph, report));
    }

    #[cfg(all(feature = "dot", feature = "logging"))]
    fn render_dump(graph: &TaskGraph, report: Option<&ExecutionReport>) -> String {
        let dumper = crate::dot::DebugGraphDumper::new(graph);
        match report {
            Some(report) => dumper.with_report(report).render(),
            None => dumper.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{
        context::{CommandList, RecordedCommand},
        graph::GraphConfig,
        hazard::{BarrierRequirement, ImportState},
        resource::{BufferKey, QueueKind, Resources},
        task::{BufferCopyRegion, CopyBuffer, FillBuffer, ReadBuffer},
    };

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

    fn graph() -> TaskGraph {
        let mut g = TaskGraph::new();
        g.construct(GraphConfig::default().with_dump_on_failure(false))
            .unwrap();
        g
    }

    #[test]
    fn assure_send_sync() {
        assert_impl_all!(GraphExecutor: Send, Sync);
        assert_impl_all!(TaskGraph: Send, Sync);
        assert_impl_all!(ExecutionReport: Send, Sync);
    }

    #[test]
    fn copy_before_read() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let b = res.add_buffer("b", 64);
        let mut g = graph();
        let cp = g.add_task(copy(a, b), &[]).unwrap();
        let rd = g.add_task(read(b), &[cp]).unwrap();

        let mut exec = GraphExecutor::new();
        let mut ctx = CommandList::new();
        let report = exec.execute(&mut g, &mut ctx).unwrap();

        assert!(report.is_success());
        assert_eq!(report.order, vec![cp, rd]);
        assert_eq!(report.barriers_emitted, 1);
        assert_eq!(exec.state(), ExecutorState::Completed);
        assert_eq!(g.state(), GraphState::Executed);

        //barrier is emitted right before the read
        let cmds = ctx.commands();
        let barrier_pos = cmds
            .iter()
            .position(|c| matches!(c, RecordedCommand::PipelineBarrier { .. }))
            .unwrap();
        assert_eq!(cmds[barrier_pos].node(), rd);
        assert!(matches!(
            cmds[barrier_pos + 1],
            RecordedCommand::BeginTask { node, .. } if node == rd
        ));
        assert_eq!(ctx.recorded_tasks(), vec![cp, rd]);
    }

    #[test]
    fn dependencies_before_dependees() {
        let mut res = Resources::new();
        let bufs: Vec<BufferKey> = (0..4).map(|i| res.add_buffer(format!("b{i}"), 64)).collect();
        let mut g = graph();
        let mut ids = Vec::new();
        for i in 0..20 {
            let dst = bufs[(i * 3) % 4];
            let src = bufs[(i * 3 + 1) % 4];
            //explicit dependency on some earlier task, independent of hazards
            let deps: Vec<NodeId> = if i % 5 == 4 { vec![ids[i / 2]] } else { vec![] };
            let id = if i % 2 == 0 {
                g.add_task(fill(dst), &deps).unwrap()
            } else {
                g.add_task(copy(src, dst), &deps).unwrap()
            };
            ids.push(id);
        }

        let plan = GraphExecutor::plan(&g).unwrap();
        let mut exec = GraphExecutor::new();
        let report = exec.execute(&mut g, &mut CommandList::new()).unwrap();
        assert_eq!(plan, report.order);
        assert_eq!(report.order.len(), g.len());

        let position = |id: NodeId| report.order.iter().position(|o| *o == id).unwrap();
        for node in g.nodes_in_submission_order() {
            for dep in node.inputs() {
                assert!(position(*dep) < position(node.id()));
            }
        }
    }

    #[test]
    fn independent_nodes_keep_submission_order() {
        let mut res = Resources::new();
        let mut g = graph();
        let ids: Vec<NodeId> = (0..6)
            .map(|i| g.add_task(fill(res.add_buffer(format!("b{i}"), 64)), &[]).unwrap())
            .collect();
        assert_eq!(g.entries(), ids.as_slice());

        let first = GraphExecutor::plan(&g).unwrap();
        let second = GraphExecutor::plan(&g).unwrap();
        assert_eq!(first, ids);
        assert_eq!(first, second);
    }

    #[test]
    fn failure_skips_dependees_only() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let b = res.add_buffer("b", 64);
        let mut g = graph();

        let fa = g.add_named_task("fill a", fill(a), &[]).unwrap();
        let fb = g.add_named_task("fill b", fill(b), &[]).unwrap();
        let ra = g.add_named_task("read a", read(a), &[]).unwrap();
        let rb = g.add_named_task("read b", read(b), &[]).unwrap();

        let mut exec = GraphExecutor::new();
        let mut ctx = CommandList::new().with_failing_node(fa);
        let report = exec.execute(&mut g, &mut ctx).unwrap();

        assert_eq!(report.order, vec![fa, fb, ra, rb]);
        assert!(report.has_failed(fa));
        assert!(report.was_skipped(ra));
        assert!(!report.was_skipped(rb));
        assert_eq!(ctx.recorded_tasks(), vec![fb, rb]);
        assert_eq!(exec.state(), ExecutorState::Failed);

        match report.result() {
            Err(ExecutionError::TaskFailed { node, name, .. }) => {
                assert_eq!(node, fa);
                assert_eq!(name, "fill a");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejected_ownership_transfer_fails_node() {
        let mut res = Resources::new();
        let staging = res.add_buffer("staging", 64);
        let mut g = graph();
        g.import(
            staging,
            ImportState {
                queue: Some(QueueKind::Transfer),
                layout: None,
            },
        )
        .unwrap();
        let rd = g.add_task(read(staging), &[]).unwrap();
        assert_eq!(
            g.node(rd).unwrap().barriers()[0].requirement,
            BarrierRequirement::OwnershipTransfer {
                src: QueueKind::Transfer,
                dst: QueueKind::Graphics
            }
        );

        let report = GraphExecutor::new()
            .execute(&mut g, &mut CommandList::new().rejecting_ownership_transfers())
            .unwrap();
        assert!(report.has_failed(rd));
        assert!(report.result().is_err());
    }

    #[test]
    fn skipped_node_with_failing_transfer() {
        let mut res = Resources::new();
        let staging = res.add_buffer("staging", 64);
        let readback = res.add_buffer("readback", 64);
        let mut g = graph();
        for buf in [staging, readback] {
            g.import(
                buf,
                ImportState {
                    queue: Some(QueueKind::Transfer),
                    layout: None,
                },
            )
            .unwrap();
        }
        let first = g.add_task(read(staging), &[]).unwrap();
        let second = g.add_task(read(readback), &[first]).unwrap();

        let report = GraphExecutor::new()
            .execute(&mut g, &mut CommandList::new().rejecting_ownership_transfers())
            .unwrap();
        assert!(report.has_failed(first));
        assert!(!report.has_failed(second));
        assert_eq!(report.skipped, vec![second]);
        assert_eq!(report.order, vec![first, second]);
        assert_eq!(report.barriers_emitted, 0);
    }

    #[test]
    fn refuses_unusable_graphs() {
        let mut res = Resources::new();
        let a = res.add_buffer("a", 64);
        let mut exec = GraphExecutor::new();
        let mut ctx = CommandList::new();

        let mut unconstructed = TaskGraph::new();
        assert!(matches!(
            exec.execute(&mut unconstructed, &mut ctx),
            Err(ExecutionError::Graph(GraphError::NotConstructed))
        ));

        let mut g = graph();
        g.add_task(fill(a), &[]).unwrap();
        exec.execute(&mut g, &mut ctx).unwrap();
        assert!(matches!(
            exec.execute(&mut g, &mut ctx),
            Err(ExecutionError::BusyExecutor)
        ));
        exec.reset();
        assert!(matches!(
            exec.execute(&mut g, &mut ctx),
            Err(ExecutionError::Graph(GraphError::AlreadyExecuted))
        ));
        assert_eq!(g.add_task(fill(a), &[]), Err(GraphError::AlreadyExecuted));

        //next frame
        g.tear_down();
        g.construct(GraphConfig::default()).unwrap();
        g.add_task(fill(a), &[]).unwrap();
        assert!(exec.execute(&mut g, &mut ctx).unwrap().is_success());
    }
}
