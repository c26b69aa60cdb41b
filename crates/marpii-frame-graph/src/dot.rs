//! # Debug dumps
//!
//! Renders a [TaskGraph] as a graphviz DOT graph. Nodes are emitted in submission order, so the same graph always
//! renders to the same text.
//!
//! ```ignore
//! let dot = DebugGraphDumper::new(&graph)
//!     .with_resources(&resources)
//!     .render();
//! std::fs::write("frame.dot", dot)?;
//! ```

use std::path::Path;

use graphviz_rust::{
    dot_structures::{
        Attribute, Edge, EdgeTy, Graph, Id, Node, NodeId as DotNodeId, Stmt, Vertex,
    },
    printer::{DotPrinter, PrinterContext},
};

use crate::{
    executor::ExecutionReport,
    graph::{NodeId, TaskGraph},
    hazard::{Barrier, BarrierRequirement},
    resource::{AnyResKey, Resources},
    task::FrameTask,
};

fn quoted(s: &str) -> Id {
    Id::Escaped(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")))
}

fn attr(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), quoted(value))
}

fn dot_id(node: NodeId) -> DotNodeId {
    DotNodeId(Id::Plain(node.to_string()), None)
}

///Builds DOT output for a graph, optionally annotated with resource names and execution results.
pub struct DebugGraphDumper<'a> {
    graph: &'a TaskGraph,
    resources: Option<&'a Resources>,
    report: Option<&'a ExecutionReport>,
}

impl<'a> DebugGraphDumper<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        DebugGraphDumper {
            graph,
            resources: None,
            report: None,
        }
    }

    ///Uses the registry's debug names in labels.
    pub fn with_resources(mut self, resources: &'a Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    ///Colors failed and skipped nodes.
    pub fn with_report(mut self, report: &'a ExecutionReport) -> Self {
        self.report = Some(report);
        self
    }

    fn resource_name(&self, res: AnyResKey) -> String {
        self.resources
            .and_then(|r| r.name_of(res))
            .map(|n| n.to_string())
            .unwrap_or_else(|| res.to_string())
    }

    fn barrier_label(&self, barrier: &Barrier) -> String {
        let req = match barrier.requirement {
            BarrierRequirement::None => "none".to_string(),
            BarrierRequirement::Execution => "execution".to_string(),
            BarrierRequirement::Memory => "memory".to_string(),
            BarrierRequirement::OwnershipTransfer { src, dst } => format!("{src}->{dst}"),
        };
        match barrier.transition {
            Some(t) => format!(
                "{} {} ({:?}->{:?})",
                self.resource_name(barrier.resource),
                req,
                t.old,
                t.new
            ),
            None => format!("{} {}", self.resource_name(barrier.resource), req),
        }
    }

    fn node_stmt(&self, node: &FrameTask) -> Stmt {
        let mut attributes = vec![
            attr(
                "label",
                &format!("{} {}\\n{}", node.submission(), node.name(), node.kind().name()),
            ),
            attr("shape", "box"),
        ];
        if node.inputs().is_empty() {
            //entry node
            attributes.push(Attribute(
                Id::Plain("peripheries".to_string()),
                Id::Plain("2".to_string()),
            ));
        }
        if let Some(report) = self.report {
            if report.has_failed(node.id()) {
                attributes.push(attr("color", "red"));
                attributes.push(attr("style", "bold"));
            } else if report.was_skipped(node.id()) {
                attributes.push(attr("color", "gray"));
                attributes.push(attr("style", "dashed"));
            }
        }
        Stmt::Node(Node {
            id: dot_id(node.id()),
            attributes,
        })
    }

    fn edge_stmt(&self, src: &FrameTask, dst: &FrameTask) -> Stmt {
        let src_resources: Vec<AnyResKey> =
            src.desc().usages().iter().map(|u| u.resource).collect();
        let labels: Vec<String> = dst
            .barriers()
            .iter()
            .filter(|b| src_resources.contains(&b.resource))
            .map(|b| self.barrier_label(b))
            .collect();

        let attributes = if labels.is_empty() {
            vec![attr("style", "dashed")]
        } else {
            vec![attr("label", &labels.join("\\n"))]
        };
        Stmt::Edge(Edge {
            ty: EdgeTy::Pair(Vertex::N(dot_id(src.id())), Vertex::N(dot_id(dst.id()))),
            attributes,
        })
    }

    ///Builds the graphviz structure.
    pub fn to_graph(&self) -> Graph {
        let nodes = self.graph.nodes_in_submission_order();
        let mut stmts = vec![Stmt::Attribute(Attribute(
            Id::Plain("rankdir".to_string()),
            Id::Plain("LR".to_string()),
        ))];
        for node in nodes {
            stmts.push(self.node_stmt(node));
        }
        for node in nodes {
            for succ in node.attached() {
                stmts.push(self.edge_stmt(node, &nodes[succ.index()]));
            }
        }

        Graph::DiGraph {
            id: quoted(&self.graph.config().name),
            strict: false,
            stmts,
        }
    }

    ///DOT text of the graph.
    pub fn render(&self) -> String {
        self.to_graph().print(&mut PrinterContext::default())
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::CommandList,
        executor::GraphExecutor,
        graph::GraphConfig,
        task::{FillBuffer, ReadBuffer},
    };

    #[test]
    fn renders_nodes_and_edges() {
        let mut res = Resources::new();
        let buf = res.add_buffer("particles", 64);
        let mut graph = TaskGraph::new();
        graph
            .construct(GraphConfig::default().with_name("dump").with_dump_on_failure(false))
            .unwrap();
        let fill = graph
            .add_named_task(
                "init",
                FillBuffer {
                    dst: buf,
                    offset: 0,
                    size: 64,
                    value: 0,
                },
                &[],
            )
            .unwrap();
        graph
            .add_named_task(
                "download",
                ReadBuffer {
                    buffer: buf,
                    offset: 0,
                    size: 64,
                },
                &[],
            )
            .unwrap();

        let report = GraphExecutor::new()
            .execute(&mut graph, &mut CommandList::new().with_failing_node(fill))
            .unwrap();

        let dumper = DebugGraphDumper::new(&graph)
            .with_resources(&res)
            .with_report(&report);
        let text = dumper.render();

        assert!(text.contains("digraph"));
        assert!(text.contains("n0"));
        assert!(text.contains("n1"));
        assert!(text.contains("->"));
        assert!(text.contains("particles memory"));
        assert!(text.contains("red"));
        assert!(text.contains("gray"));
        //deterministic
        assert_eq!(text, dumper.render());
    }
}
