//! # Hazard tracking
//!
//! Keeps the last known access of every resource that was touched while building a graph. Each new access is
//! classified against that state, which yields the barrier that must precede the access, and the earlier tasks the
//! accessing task has to wait for.
//!
//! The decision table is the usual one:
//!
//! | prior access | new access  | requirement                        |
//! |--------------|-------------|------------------------------------|
//! | none         | any         | none                               |
//! | read         | read        | none (memory on layout change)     |
//! | read         | (read)write | execution (memory on layout change)|
//! | write        | any         | memory                             |
//!
//! A known owner on another queue always turns the requirement into an ownership transfer.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    graph::NodeId,
    resource::{AccessMode, AnyResKey, ImageLayout, QueueKind, ResourceUsage},
};

///Last access kind of a tracked resource.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Default)]
pub enum AccessState {
    #[default]
    None,
    Read,
    Write,
}

///Synchronization that has to happen before an access.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Default)]
pub enum BarrierRequirement {
    ///No synchronization needed.
    #[default]
    None,
    ///Prior reads must finish before the resource is written (WAR).
    Execution,
    ///Prior writes must be made visible (RAW/WAW), or the image changes its layout.
    Memory,
    ///Resource is owned by another queue and has to be released by `src` and acquired by `dst`.
    OwnershipTransfer { src: QueueKind, dst: QueueKind },
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct LayoutTransition {
    pub old: ImageLayout,
    pub new: ImageLayout,
}

///Result of classifying a single access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hazard {
    pub requirement: BarrierRequirement,
    pub transition: Option<LayoutTransition>,
    ///Access state the resource was in before.
    pub src_access: AccessState,
    ///Earlier tasks the accessing task must be ordered after.
    pub wait_on: SmallVec<[NodeId; 4]>,
}

impl Hazard {
    pub fn needs_barrier(&self) -> bool {
        self.requirement != BarrierRequirement::None
    }
}

///Barrier a task emits before its own work is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrier {
    pub resource: AnyResKey,
    pub requirement: BarrierRequirement,
    pub src_access: AccessState,
    pub dst_access: AccessMode,
    pub transition: Option<LayoutTransition>,
}

impl Barrier {
    pub fn is_ownership_transfer(&self) -> bool {
        matches!(
            self.requirement,
            BarrierRequirement::OwnershipTransfer { .. }
        )
    }
}

///State of a resource before the graph first touches it. Used for resources that are handed in from a previous
/// frame or from another queue.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Default)]
pub struct ImportState {
    ///Queue that currently owns the resource, if any.
    pub queue: Option<QueueKind>,
    ///Current layout. Only meaningful for images.
    pub layout: Option<ImageLayout>,
}

///Publicly visible state of a tracked resource. Also used to export final states after a graph was built.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Default)]
pub struct TrackedState {
    pub access: AccessState,
    pub layout: Option<ImageLayout>,
    pub queue: Option<QueueKind>,
}

#[derive(Clone, Debug, Default)]
struct ResourceEntry {
    access: AccessState,
    last_write: Option<NodeId>,
    readers: SmallVec<[NodeId; 4]>,
    layout: Option<ImageLayout>,
    queue: Option<QueueKind>,
    imported: bool,
}

///Per resource access tracking of one graph. Entries are created lazily on first access.
pub struct ResourceHazardTracker {
    queue: QueueKind,
    entries: AHashMap<AnyResKey, ResourceEntry>,
}

impl ResourceHazardTracker {
    ///Creates a tracker for a graph that is submitted on `queue`.
    pub fn new(queue: QueueKind) -> Self {
        ResourceHazardTracker {
            queue,
            entries: AHashMap::default(),
        }
    }

    pub fn queue(&self) -> QueueKind {
        self.queue
    }

    ///Forgets all tracked resources and switches to `queue`.
    pub fn reset(&mut self, queue: QueueKind) {
        self.queue = queue;
        self.entries.clear();
    }

    ///Seeds the state of `resource` before any task accesses it. Overwrites whatever was known before.
    pub fn import(&mut self, resource: AnyResKey, state: ImportState) {
        self.entries.insert(
            resource,
            ResourceEntry {
                layout: state.layout,
                queue: state.queue,
                imported: true,
                ..Default::default()
            },
        );
    }

    ///True if a task already accessed `resource` since the last reset.
    pub fn is_accessed(&self, resource: AnyResKey) -> bool {
        self.entries
            .get(&resource)
            .map(|e| e.access != AccessState::None)
            .unwrap_or(false)
    }

    ///Classifies the access of `task` to `usage.resource` and updates the resource's state to reflect the access.
    pub fn record_access(&mut self, usage: ResourceUsage, task: NodeId) -> Hazard {
        let queue = self.queue;
        let entry = self.entries.entry(usage.resource).or_default();

        let transition = match (entry.layout, usage.layout) {
            (Some(old), Some(new)) if old != new => Some(LayoutTransition { old, new }),
            //imported without a known layout
            (None, Some(new)) if entry.imported => Some(LayoutTransition {
                old: ImageLayout::Undefined,
                new,
            }),
            _ => None,
        };

        let src_access = entry.access;
        let (requirement, wait_on): (BarrierRequirement, SmallVec<[NodeId; 4]>) = match entry
            .access
        {
            AccessState::None => {
                let req = if transition.is_some() {
                    BarrierRequirement::Memory
                } else {
                    BarrierRequirement::None
                };
                (req, SmallVec::new())
            }
            AccessState::Read => {
                if usage.mode.is_write() {
                    let req = if transition.is_some() {
                        BarrierRequirement::Memory
                    } else {
                        BarrierRequirement::Execution
                    };
                    (req, entry.readers.clone())
                } else if transition.is_some() {
                    (BarrierRequirement::Memory, entry.readers.clone())
                } else {
                    //only ordered after the producer, the producing barrier was already emitted
                    (
                        BarrierRequirement::None,
                        entry.last_write.into_iter().collect(),
                    )
                }
            }
            AccessState::Write => (
                BarrierRequirement::Memory,
                entry.last_write.into_iter().collect(),
            ),
        };

        let requirement = match entry.queue {
            Some(owner) if owner != queue => BarrierRequirement::OwnershipTransfer {
                src: owner,
                dst: queue,
            },
            _ => requirement,
        };

        #[cfg(feature = "log_reasoning")]
        log::trace!(
            "{} by {:?}: {:?} -> {:?} ({:?}), transition={:?}, waits on {:?}",
            usage.resource,
            task,
            src_access,
            usage.mode,
            requirement,
            transition,
            wait_on
        );

        //update state
        if usage.mode.is_write() {
            entry.access = AccessState::Write;
            entry.last_write = Some(task);
            entry.readers.clear();
        } else {
            //after a write or a layout change all earlier readers are already ordered before `task`
            if entry.access != AccessState::Read || transition.is_some() {
                entry.readers.clear();
            }
            if !entry.readers.contains(&task) {
                entry.readers.push(task);
            }
            entry.access = AccessState::Read;
        }
        if let Some(layout) = usage.layout {
            entry.layout = Some(layout);
        }
        entry.queue = Some(queue);

        Hazard {
            requirement,
            transition,
            src_access,
            wait_on,
        }
    }

    ///State of `resource`, or None if it was never imported or accessed.
    pub fn state(&self, resource: AnyResKey) -> Option<TrackedState> {
        self.entries.get(&resource).map(|e| TrackedState {
            access: e.access,
            layout: e.layout,
            queue: e.queue,
        })
    }

    ///All tracked states, sorted by resource key.
    pub fn states(&self) -> Vec<(AnyResKey, TrackedState)> {
        let mut states: Vec<_> = self
            .entries
            .iter()
            .map(|(k, e)| {
                (
                    *k,
                    TrackedState {
                        access: e.access,
                        layout: e.layout,
                        queue: e.queue,
                    },
                )
            })
            .collect();
        states.sort_by_key(|(k, _)| *k);
        states
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
