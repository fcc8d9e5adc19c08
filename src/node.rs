//! Algorithm abstraction for the pipeline.
//!
//! An algorithm declares its ports via static descriptor arrays and
//! implements up to four lifecycle callbacks, one per request pass. The
//! executive hands each callback a context holding snapshots of the
//! relevant information bags and data objects; callbacks never touch the
//! graph directly, so a node cannot alias the executive's state.

use crate::clock::ModTick;
use crate::data::DataObject;
use crate::error::PipelineResult;
use crate::id::NodeId;
use crate::info::{keys, InfoBag};
use crate::observer::{ObserverSet, PipelineEvent};
use crate::port::{InputPortDescriptor, OutputPortDescriptor};
use crate::request::RequestKind;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A pipeline node. Implementations provide port declarations and a
/// `produce_data` callback; the metadata callbacks default to reasonable
/// pass-through behavior.
pub trait Algorithm: Any + Send {
    /// Class name used in error payloads and logs.
    fn type_name(&self) -> &'static str;

    fn input_ports(&self) -> &'static [InputPortDescriptor];

    fn output_ports(&self) -> &'static [OutputPortDescriptor];

    /// Extra modification tick folded into the node's pipeline mtime. Source
    /// nodes wrapping external state (a held data object, a file stamp)
    /// report it here.
    fn source_mtime(&self) -> ModTick {
        ModTick::NONE
    }

    /// Read upstream information, publish own (`WHOLE_EXTENT`,
    /// `TIME_STEPS`, ...). Runs at least once after construction.
    fn produce_information(&mut self, _ctx: &mut InfoContext) -> PipelineResult<()> {
        Ok(())
    }

    /// Translate the update keys on this node's outputs into requests on
    /// its inputs. The default copies the update keys of output port 0 to
    /// every input connection.
    fn request_update_extent(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        ctx.copy_update_keys_upstream();
        Ok(())
    }

    /// Refresh metadata that depends on the requested time.
    fn produce_time_dependent_information(&mut self, _ctx: &mut InfoContext) -> PipelineResult<()> {
        Ok(())
    }

    /// Produce output data for the current request.
    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()>;
}

/// Context for the metadata passes (`Information`, `UpdateExtent`,
/// `TimeDependentInformation`).
///
/// Input bags are snapshots of the upstream output-port bags; output bags
/// are the node's own, written back by the executive after the callback.
/// During `UpdateExtent` the node writes per-connection request bags that
/// the executive merges onto the upstream ports.
pub struct InfoContext {
    kind: RequestKind,
    /// `[input port][connection]`.
    inputs: Vec<Vec<InfoBag>>,
    /// One per output port.
    outputs: Vec<InfoBag>,
    /// `[input port][connection]`, only populated for `UpdateExtent`.
    upstream_requests: Vec<Vec<InfoBag>>,
}

impl InfoContext {
    pub(crate) fn new(kind: RequestKind, inputs: Vec<Vec<InfoBag>>, outputs: Vec<InfoBag>) -> Self {
        let upstream_requests = inputs
            .iter()
            .map(|conns| vec![InfoBag::new(); conns.len()])
            .collect();
        Self {
            kind,
            inputs,
            outputs,
            upstream_requests,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn num_input_ports(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_output_ports(&self) -> usize {
        self.outputs.len()
    }

    /// Connections on `port`. Zero for an unconnected optional port.
    pub fn input_count(&self, port: usize) -> usize {
        self.inputs.get(port).map_or(0, Vec::len)
    }

    /// Upstream information for connection `conn` of `port`; `None` marks an
    /// absent optional input.
    pub fn input_info(&self, port: usize, conn: usize) -> Option<&InfoBag> {
        self.inputs.get(port)?.get(conn)
    }

    pub fn output_info(&self, port: usize) -> &InfoBag {
        &self.outputs[port]
    }

    pub fn output_info_mut(&mut self, port: usize) -> &mut InfoBag {
        &mut self.outputs[port]
    }

    /// Request bag merged onto the upstream port feeding connection `conn`
    /// of `port` after the callback returns. `UpdateExtent` pass only.
    pub fn upstream_request_mut(&mut self, port: usize, conn: usize) -> &mut InfoBag {
        &mut self.upstream_requests[port][conn]
    }

    /// Default `UpdateExtent` behavior: forward the update keys of output
    /// port 0 verbatim to every input connection.
    pub fn copy_update_keys_upstream(&mut self) {
        let Some(out) = self.outputs.first() else {
            return;
        };
        let forwarded: Vec<_> = keys::UPDATE_KEYS
            .iter()
            .copied()
            .filter_map(|key| out.get(key).map(|value| (key, value.clone())))
            .collect();
        for port in &mut self.upstream_requests {
            for request in port {
                for &(key, ref value) in &forwarded {
                    // Kinds always match; the value came from the same key.
                    let _ = request.set(key, value.clone());
                }
            }
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<InfoBag>, Vec<Vec<InfoBag>>) {
        (self.outputs, self.upstream_requests)
    }
}

/// Context for the `Data` pass.
///
/// Inputs are shallow clones of the upstream caches; a consumer forks
/// before mutating. Outputs are slots this node fills. Progress reports
/// dispatch `Progress` events synchronously and report the abort flag.
pub struct DataContext<'a> {
    node: NodeId,
    /// `[input port][connection]`; `None` when the connection produced
    /// nothing.
    inputs: Vec<Vec<Option<DataObject>>>,
    input_info: Vec<Vec<InfoBag>>,
    outputs: Vec<Option<DataObject>>,
    output_info: Vec<InfoBag>,
    observers: &'a mut ObserverSet,
    abort: Arc<AtomicBool>,
    last_progress: f64,
}

impl<'a> DataContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        inputs: Vec<Vec<Option<DataObject>>>,
        input_info: Vec<Vec<InfoBag>>,
        output_info: Vec<InfoBag>,
        observers: &'a mut ObserverSet,
        abort: Arc<AtomicBool>,
    ) -> Self {
        let outputs = vec![None; output_info.len()];
        Self {
            node,
            inputs,
            input_info,
            outputs,
            output_info,
            observers,
            abort,
            last_progress: 0.0,
        }
    }

    pub fn num_input_ports(&self) -> usize {
        self.inputs.len()
    }

    pub fn input_count(&self, port: usize) -> usize {
        self.inputs.get(port).map_or(0, Vec::len)
    }

    /// Data on connection `conn` of `port`; `None` marks an absent optional
    /// input or a connection that produced nothing.
    pub fn input_data(&self, port: usize, conn: usize) -> Option<&DataObject> {
        self.inputs.get(port)?.get(conn)?.as_ref()
    }

    pub fn input_info(&self, port: usize, conn: usize) -> Option<&InfoBag> {
        self.input_info.get(port)?.get(conn)
    }

    /// The information bag of this node's output `port`, including the
    /// update keys of the current request.
    pub fn output_info(&self, port: usize) -> &InfoBag {
        &self.output_info[port]
    }

    pub fn output_info_mut(&mut self, port: usize) -> &mut InfoBag {
        &mut self.output_info[port]
    }

    pub fn set_output(&mut self, port: usize, data: DataObject) {
        self.outputs[port] = Some(data);
    }

    pub fn output(&self, port: usize) -> Option<&DataObject> {
        self.outputs.get(port)?.as_ref()
    }

    /// Report progress in `[0, 1]`. Values never decrease within one
    /// execution; regressions are clamped to the last reported value.
    /// Returns `false` once an abort has been requested — callers poll this
    /// and bail out with [`PipelineError::Aborted`](crate::PipelineError::Aborted).
    pub fn progress(&mut self, fraction: f64) -> bool {
        let fraction = fraction.clamp(self.last_progress, 1.0);
        self.last_progress = fraction;
        self.observers
            .dispatch(self.node, &PipelineEvent::Progress(fraction));
        !self.aborted()
    }

    pub fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    /// Emit a non-fatal warning to this node's observers.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.observers
            .dispatch(self.node, &PipelineEvent::Warning(message.into()));
    }

    /// Emit an application-defined event to observers registered for
    /// `EventTag::User(id)`.
    pub fn emit_user(&mut self, id: u32, message: impl Into<String>) {
        self.observers.dispatch(
            self.node,
            &PipelineEvent::User {
                id,
                message: message.into(),
            },
        );
    }

    pub(crate) fn into_parts(self) -> (Vec<Option<DataObject>>, Vec<InfoBag>) {
        (self.outputs, self.output_info)
    }
}
