//! Per-node event registration and dispatch.
//!
//! Observers are plain callbacks owned by the executive's node slot, never
//! by the algorithm, so a node cannot retain its observers and observers
//! cannot retain the node. Callbacks that need to influence execution
//! capture an `Arc<AtomicBool>` abort flag or a channel sender.

use crate::id::{NodeId, ObserverId};
use crossbeam_channel::Sender;

/// Event classes an observer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTag {
    Start,
    End,
    Progress,
    Error,
    Warning,
    Modified,
    /// Application-defined events by integer id.
    User(u32),
}

/// An event delivered to observers of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Start,
    End,
    /// Fraction complete, monotone non-decreasing within one execution.
    Progress(f64),
    Error(String),
    Warning(String),
    Modified,
    User { id: u32, message: String },
}

impl PipelineEvent {
    pub fn tag(&self) -> EventTag {
        match self {
            PipelineEvent::Start => EventTag::Start,
            PipelineEvent::End => EventTag::End,
            PipelineEvent::Progress(_) => EventTag::Progress,
            PipelineEvent::Error(_) => EventTag::Error,
            PipelineEvent::Warning(_) => EventTag::Warning,
            PipelineEvent::Modified => EventTag::Modified,
            PipelineEvent::User { id, .. } => EventTag::User(*id),
        }
    }
}

/// A registered observer callback.
pub type ObserverCallback = Box<dyn FnMut(NodeId, &PipelineEvent) + Send>;

struct ObserverSlot {
    id: ObserverId,
    tag: EventTag,
    callback: ObserverCallback,
}

/// The observers registered on one node, invoked in registration order.
#[derive(Default)]
pub struct ObserverSet {
    slots: Vec<ObserverSlot>,
    next_id: u64,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: EventTag, callback: ObserverCallback) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.slots.push(ObserverSlot { id, tag, callback });
        id
    }

    /// Remove by handle. Returns whether a slot was removed.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        self.slots.len() != before
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Invoke, synchronously and in registration order, every observer
    /// subscribed to the event's tag.
    pub fn dispatch(&mut self, node: NodeId, event: &PipelineEvent) {
        let tag = event.tag();
        for slot in &mut self.slots {
            if slot.tag == tag {
                (slot.callback)(node, event);
            }
        }
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.slots.len())
            .finish()
    }
}

/// An observer callback that forwards events to another thread over a
/// crossbeam channel. Send failures are ignored; a dropped receiver must
/// not fail the pipeline.
pub fn channel_observer(tx: Sender<(NodeId, PipelineEvent)>) -> ObserverCallback {
    Box::new(move |node, event| {
        let _ = tx.send((node, event.clone()));
    })
}
