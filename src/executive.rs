//! The executive — graph topology, per-port caches, and the pull scheduler.
//!
//! Evaluation is demand-driven: a caller asks for a node's output and the
//! executive walks upstream, running the information pass, the update-extent
//! pass, and finally the data pass. Each node's output cache is stamped with
//! a production tick and the request it served; a later update reuses the
//! cache when nothing upstream moved and the new request is a subset of the
//! cached one.
//!
//! Evaluation is single-threaded and cooperative: node callbacks and
//! observers all run on the calling thread, in depth-first upstream order.

use crate::clock::{next_tick, ModTick};
use crate::data::{DataObject, EMPTY_EXTENT};
use crate::error::{PipelineError, PipelineResult};
use crate::id::{NodeId, ObserverId};
use crate::info::{keys, InfoBag};
use crate::node::{Algorithm, DataContext, InfoContext};
use crate::observer::{EventTag, ObserverCallback, ObserverSet, PipelineEvent};
use crate::port::{Cardinality, TypeSignature};
use crate::request::{RequestKind, RequestSignature};
use crate::streaming::split_extent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A directed edge: the upstream endpoint feeding one input connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub src: NodeId,
    pub src_port: usize,
}

/// Cache state of one output port.
#[derive(Debug, Default)]
pub enum OutputCache {
    #[default]
    Empty,
    Valid {
        data: DataObject,
        produced: ModTick,
        request: RequestSignature,
    },
}

impl OutputCache {
    pub fn is_valid(&self) -> bool {
        matches!(self, OutputCache::Valid { .. })
    }

    fn produced(&self) -> Option<ModTick> {
        match self {
            OutputCache::Valid { produced, .. } => Some(*produced),
            OutputCache::Empty => None,
        }
    }
}

#[derive(Debug, Default)]
struct OutputSlot {
    info: InfoBag,
    cache: OutputCache,
}

/// A node plus everything the executive tracks for it.
struct NodeSlot {
    /// `None` while one of this node's callbacks is running; doubles as the
    /// re-entrancy guard behind `CyclicEvaluation`.
    algorithm: Option<Box<dyn Algorithm>>,
    name: String,
    type_name: &'static str,
    mtime: ModTick,
    /// Pipeline mtime at the last successful information pass.
    info_tick: ModTick,
    /// Tick of the last successful data pass.
    data_tick: ModTick,
    observers: ObserverSet,
    abort: Arc<AtomicBool>,
    /// `[input port][connection]`.
    inputs: Vec<Vec<Connection>>,
    outputs: Vec<OutputSlot>,
}

impl NodeSlot {
    fn new(algorithm: Box<dyn Algorithm>, name: Option<String>) -> Self {
        let type_name = algorithm.type_name();
        let inputs = vec![Vec::new(); algorithm.input_ports().len()];
        let outputs = (0..algorithm.output_ports().len())
            .map(|_| OutputSlot::default())
            .collect();
        Self {
            algorithm: Some(algorithm),
            name: name.unwrap_or_else(|| type_name.to_string()),
            type_name,
            mtime: next_tick(),
            info_tick: ModTick::NONE,
            data_tick: ModTick::NONE,
            observers: ObserverSet::new(),
            abort: Arc::new(AtomicBool::new(false)),
            inputs,
            outputs,
        }
    }

    /// Own mtime folded with whatever external state the algorithm tracks.
    fn node_mtime(&self) -> ModTick {
        let source = self
            .algorithm
            .as_ref()
            .map_or(ModTick::NONE, |alg| alg.source_mtime());
        self.mtime.max(source)
    }

    fn error_payload(&self, message: &str) -> String {
        format!("{} ('{}'): {}", self.type_name, self.name, message)
    }
}

/// The pipeline: node graph, caches, and the request scheduler.
#[derive(Default)]
pub struct Executive {
    nodes: Vec<NodeSlot>,
}

impl Executive {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Graph building ──

    /// Add a node. Its display name defaults to the algorithm's type name.
    pub fn add_node(&mut self, algorithm: Box<dyn Algorithm>) -> NodeId {
        self.insert_node(algorithm, None)
    }

    pub fn add_node_named(&mut self, algorithm: Box<dyn Algorithm>, name: &str) -> NodeId {
        self.insert_node(algorithm, Some(name.to_string()))
    }

    fn insert_node(&mut self, algorithm: Box<dyn Algorithm>, name: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot::new(algorithm, name));
        tracing::debug!(node = %id, name = %self.nodes[id.index()].name, "node added");
        id
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.index()).map(|slot| slot.name.as_str())
    }

    /// Connect `src`'s output port to `dst`'s input port.
    ///
    /// Fails with `BadPort` for out-of-range indices, `InvalidType` when no
    /// alternative on the input accepts the producer's declared output, and
    /// `Cycle` when the edge would close a directed cycle (self-edges
    /// included). The graph is unchanged on failure. A `Single` or
    /// `Optional` input replaces its existing connection; a `Repeatable`
    /// input appends.
    pub fn connect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> PipelineResult<()> {
        let (out_sig, in_desc) = self.check_connection_ports(src, src_port, dst, dst_port)?;

        if !in_desc.accepts_signature(out_sig) {
            return Err(PipelineError::InvalidType {
                output: out_sig.name().to_string(),
                input: in_desc.name.to_string(),
            });
        }

        if src == dst || self.reaches_downstream(dst, src) {
            return Err(PipelineError::Cycle);
        }

        let cardinality = in_desc.cardinality;
        let connections = &mut self.nodes[dst.index()].inputs[dst_port];
        match cardinality {
            Cardinality::Single | Cardinality::Optional => {
                connections.clear();
                connections.push(Connection { src, src_port });
            }
            Cardinality::Repeatable => connections.push(Connection { src, src_port }),
        }

        tracing::debug!(%src, src_port, %dst, dst_port, "connected");
        self.touch(dst);
        Ok(())
    }

    /// Remove the matching connection, if present. Downstream caches go
    /// stale: the downstream node is touched whether or not a replacement
    /// is connected later.
    pub fn disconnect(
        &mut self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> PipelineResult<()> {
        self.check_connection_ports(src, src_port, dst, dst_port)?;
        let connections = &mut self.nodes[dst.index()].inputs[dst_port];
        let before = connections.len();
        connections.retain(|c| !(c.src == src && c.src_port == src_port));
        if connections.len() != before {
            tracing::debug!(%src, src_port, %dst, dst_port, "disconnected");
            self.touch(dst);
        }
        Ok(())
    }

    pub fn num_input_connections(&self, node: NodeId, port: usize) -> usize {
        self.nodes
            .get(node.index())
            .and_then(|slot| slot.inputs.get(port))
            .map_or(0, Vec::len)
    }

    pub fn input_connection(
        &self,
        node: NodeId,
        port: usize,
        index: usize,
    ) -> Option<(NodeId, usize)> {
        let conn = self
            .nodes
            .get(node.index())?
            .inputs
            .get(port)?
            .get(index)?;
        Some((conn.src, conn.src_port))
    }

    /// Attach a pre-built data object to an input port, as if produced by a
    /// source that returns it unchanged. Returns the implicit producer's id.
    pub fn set_input_data(
        &mut self,
        node: NodeId,
        port: usize,
        data: DataObject,
    ) -> PipelineResult<NodeId> {
        // Validate before inserting the implicit producer so a rejected
        // connection leaves no orphan node behind.
        let slot = self
            .nodes
            .get(node.index())
            .ok_or(PipelineError::BadNode(node))?;
        let alg = slot
            .algorithm
            .as_ref()
            .ok_or(PipelineError::CyclicEvaluation(node))?;
        let in_desc = alg
            .input_ports()
            .get(port)
            .ok_or(PipelineError::BadPort { node_id: node, port })?;
        if !in_desc.accepts(data.kind()) {
            return Err(PipelineError::InvalidType {
                output: data.type_name().to_string(),
                input: in_desc.name.to_string(),
            });
        }

        let producer = self.add_node(Box::new(crate::nodes::TrivialProducer::new(data)));
        self.connect(producer, 0, node, port)?;
        Ok(producer)
    }

    // ── Observers ──

    pub fn add_observer(
        &mut self,
        node: NodeId,
        tag: EventTag,
        callback: ObserverCallback,
    ) -> PipelineResult<ObserverId> {
        let slot = self
            .nodes
            .get_mut(node.index())
            .ok_or(PipelineError::BadNode(node))?;
        Ok(slot.observers.add(tag, callback))
    }

    pub fn remove_observer(&mut self, node: NodeId, id: ObserverId) -> bool {
        self.nodes
            .get_mut(node.index())
            .is_some_and(|slot| slot.observers.remove(id))
    }

    /// The node's cooperative abort flag. Observers capture a clone and set
    /// it; `DataContext::progress` reports it to the running callback.
    pub fn abort_flag(&self, node: NodeId) -> Option<Arc<AtomicBool>> {
        self.nodes
            .get(node.index())
            .map(|slot| Arc::clone(&slot.abort))
    }

    pub fn request_abort(&self, node: NodeId) {
        if let Some(slot) = self.nodes.get(node.index()) {
            slot.abort.store(true, Ordering::Relaxed);
        }
    }

    // ── Node state ──

    /// Apply a property mutation to the concrete algorithm behind `node`,
    /// advance the node's mtime, and fire `Modified`. This is the one road
    /// to a node's setters, so a configuration change can never outrun the
    /// modified-tick.
    pub fn modify<T, F>(&mut self, node: NodeId, f: F) -> PipelineResult<()>
    where
        T: Algorithm,
        F: FnOnce(&mut T),
    {
        let slot = self
            .nodes
            .get_mut(node.index())
            .ok_or(PipelineError::BadNode(node))?;
        let alg = slot
            .algorithm
            .as_deref_mut()
            .ok_or(PipelineError::CyclicEvaluation(node))?;
        let any: &mut dyn std::any::Any = alg;
        let concrete = any.downcast_mut::<T>().ok_or_else(|| PipelineError::Node {
            node_id: node,
            message: format!("modify: node is not a {}", std::any::type_name::<T>()),
        })?;
        f(concrete);
        self.touch(node);
        Ok(())
    }

    /// Advance the node's modified tick and fire `Modified`.
    pub fn touch(&mut self, node: NodeId) {
        if let Some(slot) = self.nodes.get_mut(node.index()) {
            slot.mtime = next_tick();
            self.emit(node, &PipelineEvent::Modified);
        }
    }

    pub fn mtime(&self, node: NodeId) -> ModTick {
        self.nodes
            .get(node.index())
            .map_or(ModTick::NONE, NodeSlot::node_mtime)
    }

    /// The produced data on `port`, valid only after a successful update.
    /// The returned object shares payloads with the cache; fork before
    /// mutating.
    pub fn output(&self, node: NodeId, port: usize) -> Option<DataObject> {
        match &self.nodes.get(node.index())?.outputs.get(port)?.cache {
            OutputCache::Valid { data, .. } => Some(data.shallow_copy()),
            OutputCache::Empty => None,
        }
    }

    pub fn output_information(&self, node: NodeId, port: usize) -> Option<&InfoBag> {
        Some(&self.nodes.get(node.index())?.outputs.get(port)?.info)
    }

    pub fn output_is_cached(&self, node: NodeId, port: usize) -> bool {
        self.nodes
            .get(node.index())
            .and_then(|slot| slot.outputs.get(port))
            .is_some_and(|out| out.cache.is_valid())
    }

    /// Drop the cached data on `port`; the next update re-runs the node.
    pub fn release_output(&mut self, node: NodeId, port: usize) {
        if let Some(out) = self
            .nodes
            .get_mut(node.index())
            .and_then(|slot| slot.outputs.get_mut(port))
        {
            out.cache = OutputCache::Empty;
        }
    }

    // ── Driver entry points ──

    /// Pull `node`'s output port 0 up to date.
    pub fn update(&mut self, node: NodeId) -> PipelineResult<()> {
        self.update_port(node, 0)
    }

    /// Pull one output port up to date: information pass, update-extent
    /// pass, then the data pass.
    pub fn update_port(&mut self, node: NodeId, port: usize) -> PipelineResult<()> {
        self.check_output_port(node, port)?;
        self.reset_abort_flags();
        self.information_pass(node)?;
        self.fill_default_update_extent(node, port);
        let wants_time = self.nodes[node.index()].outputs[port]
            .info
            .has(&keys::UPDATE_TIME_STEP);
        if wants_time {
            self.time_dependent_information_pass(node)?;
        }
        self.update_extent_pass(node)?;
        self.data_pass(node)
    }

    /// Run only the information pass.
    pub fn update_information(&mut self, node: NodeId) -> PipelineResult<()> {
        self.check_node(node)?;
        self.information_pass(node)
    }

    /// Refresh time-dependent metadata for the currently requested time.
    pub fn update_time_dependent_information(&mut self, node: NodeId) -> PipelineResult<()> {
        self.check_node(node)?;
        self.time_dependent_information_pass(node)
    }

    /// Request a specific time step on `node`'s port 0, then update.
    pub fn update_time_step(&mut self, node: NodeId, time: f64) -> PipelineResult<()> {
        self.update_time_step_port(node, time, 0)
    }

    pub fn update_time_step_port(
        &mut self,
        node: NodeId,
        time: f64,
        port: usize,
    ) -> PipelineResult<()> {
        self.check_output_port(node, port)?;
        self.information_pass(node)?;
        self.nodes[node.index()].outputs[port]
            .info
            .set_double(&keys::UPDATE_TIME_STEP, time)?;
        self.update_port(node, port)
    }

    /// Request one piece of a partitioned update on `node`'s port 0.
    pub fn update_piece(
        &mut self,
        node: NodeId,
        piece: usize,
        num_pieces: usize,
        ghost_levels: usize,
    ) -> PipelineResult<()> {
        self.update_piece_port(node, piece, num_pieces, ghost_levels, 0)
    }

    pub fn update_piece_port(
        &mut self,
        node: NodeId,
        piece: usize,
        num_pieces: usize,
        ghost_levels: usize,
        port: usize,
    ) -> PipelineResult<()> {
        self.check_output_port(node, port)?;
        self.information_pass(node)?;
        let bag = &mut self.nodes[node.index()].outputs[port].info;
        bag.set_int(&keys::UPDATE_PIECE_NUMBER, piece as i64)?;
        bag.set_int(&keys::UPDATE_NUMBER_OF_PIECES, num_pieces.max(1) as i64)?;
        bag.set_int(&keys::UPDATE_GHOST_LEVELS, ghost_levels as i64)?;
        self.update_port(node, port)
    }

    /// Request a sub-extent of `node`'s port 0, then update. Producers that
    /// cannot honor sub-extents are handed the whole extent instead and the
    /// consumer clips.
    pub fn update_extent(&mut self, node: NodeId, extent: crate::data::Extent) -> PipelineResult<()> {
        self.check_output_port(node, 0)?;
        self.information_pass(node)?;
        self.nodes[node.index()].outputs[0]
            .info
            .set_extent(&keys::UPDATE_EXTENT, extent)?;
        self.update_port(node, 0)
    }

    /// Request a specific ensemble member on `node`'s port 0, then update.
    pub fn update_member(&mut self, node: NodeId, member: i64) -> PipelineResult<()> {
        self.check_output_port(node, 0)?;
        self.information_pass(node)?;
        self.nodes[node.index()].outputs[0]
            .info
            .set_int(&keys::UPDATE_MEMBER, member)?;
        self.update_port(node, 0)
    }

    // ── Information pass (upstream-first) ──

    fn information_pass(&mut self, node: NodeId) -> PipelineResult<()> {
        for conn in self.all_connections(node) {
            self.information_pass(conn.src)?;
        }

        let pipeline_mtime = self.pipeline_mtime(node);
        let slot = &self.nodes[node.index()];
        if !slot.info_tick.is_none() && slot.info_tick >= pipeline_mtime {
            return Ok(());
        }

        let result = self.run_info_callback(node, RequestKind::Information);
        if result.is_ok() {
            self.nodes[node.index()].info_tick = pipeline_mtime;
        }
        result
    }

    fn time_dependent_information_pass(&mut self, node: NodeId) -> PipelineResult<()> {
        for conn in self.all_connections(node) {
            self.time_dependent_information_pass(conn.src)?;
        }
        self.run_info_callback(node, RequestKind::TimeDependentInformation)
    }

    // ── Update-extent pass (downstream-first) ──

    fn update_extent_pass(&mut self, node: NodeId) -> PipelineResult<()> {
        self.apply_capability_rules(node);
        self.run_info_callback(node, RequestKind::UpdateExtent)?;
        for conn in self.all_connections(node) {
            self.update_extent_pass(conn.src)?;
        }
        Ok(())
    }

    /// If this node advertises sub-extent support, translate a piece request
    /// into a slab of the whole extent. If it does not, widen any sub-extent
    /// request back to the whole extent; downstream clips.
    fn apply_capability_rules(&mut self, node: NodeId) {
        let slot = &mut self.nodes[node.index()];
        for out in &mut slot.outputs {
            let bag = &mut out.info;
            let Some(whole) = bag.get_extent(&keys::WHOLE_EXTENT) else {
                continue;
            };
            let can_sub = bag.get_int(&keys::CAN_PRODUCE_SUB_EXTENT) == Some(1);

            if can_sub {
                if let (Some(piece), Some(pieces)) = (
                    bag.get_int(&keys::UPDATE_PIECE_NUMBER),
                    bag.get_int(&keys::UPDATE_NUMBER_OF_PIECES),
                ) {
                    let extent = split_extent(&whole, piece as usize, pieces.max(1) as usize)
                        .unwrap_or(EMPTY_EXTENT);
                    let _ = bag.set_extent(&keys::UPDATE_EXTENT, extent);
                }
            } else if let Some(update) = bag.get_extent(&keys::UPDATE_EXTENT) {
                if update != whole {
                    tracing::warn!(
                        %node,
                        ?update,
                        ?whole,
                        "sub-extent requested from a producer without sub-extent support; widening"
                    );
                    let _ = bag.set_extent(&keys::UPDATE_EXTENT, whole);
                }
            }
        }
    }

    fn fill_default_update_extent(&mut self, node: NodeId, port: usize) {
        let bag = &mut self.nodes[node.index()].outputs[port].info;
        if !bag.has(&keys::UPDATE_EXTENT) {
            if let Some(whole) = bag.get_extent(&keys::WHOLE_EXTENT) {
                let _ = bag.set_extent(&keys::UPDATE_EXTENT, whole);
            }
        }
    }

    // ── Data pass (upstream-first) ──

    fn data_pass(&mut self, node: NodeId) -> PipelineResult<()> {
        let idx = node.index();

        // Cardinality is enforced at evaluation entry, not connect time.
        let missing = {
            let slot = &self.nodes[idx];
            let alg = slot
                .algorithm
                .as_ref()
                .ok_or(PipelineError::CyclicEvaluation(node))?;
            alg.input_ports()
                .iter()
                .enumerate()
                .find(|(port, desc)| {
                    desc.cardinality == Cardinality::Single && slot.inputs[*port].is_empty()
                })
                .map(|(port, _)| port)
        };
        if let Some(port) = missing {
            let payload = self.nodes[idx].error_payload(&format!(
                "required input missing on port {port}"
            ));
            self.emit(node, &PipelineEvent::Error(payload));
            return Err(PipelineError::MissingInput { node_id: node, port });
        }

        for conn in self.all_connections(node) {
            self.data_pass(conn.src)?;
        }

        if self.node_cache_valid(node) {
            tracing::debug!(%node, "cache valid, reusing");
            return Ok(());
        }

        self.execute_data(node)
    }

    /// Whether every output cache can serve the current request without
    /// re-running the node. Called after upstream recursion, so upstream
    /// caches are fresh.
    fn node_cache_valid(&self, node: NodeId) -> bool {
        let slot = &self.nodes[node.index()];
        if slot.data_tick.is_none() || slot.data_tick <= slot.node_mtime() {
            return false;
        }
        for conns in &slot.inputs {
            for conn in conns {
                let upstream = &self.nodes[conn.src.index()].outputs[conn.src_port];
                match upstream.cache.produced() {
                    Some(produced) if produced < slot.data_tick => {}
                    _ => return false,
                }
            }
        }
        for out in &slot.outputs {
            match &out.cache {
                OutputCache::Empty => return false,
                OutputCache::Valid { request, .. } => {
                    let current = RequestSignature::capture(&out.info);
                    if !request.satisfies(&current) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn execute_data(&mut self, node: NodeId) -> PipelineResult<()> {
        let idx = node.index();
        let inputs = self.collect_input_data(node);
        let input_info = self.collect_input_bags(node);

        let slot = &mut self.nodes[idx];
        let mut algorithm = slot
            .algorithm
            .take()
            .ok_or(PipelineError::CyclicEvaluation(node))?;
        let output_info: Vec<InfoBag> = slot
            .outputs
            .iter_mut()
            .map(|out| std::mem::take(&mut out.info))
            .collect();
        let mut observers = std::mem::take(&mut slot.observers);
        let abort = Arc::clone(&slot.abort);

        observers.dispatch(node, &PipelineEvent::Start);

        let mut ctx = DataContext::new(
            node,
            inputs,
            input_info,
            output_info,
            &mut observers,
            Arc::clone(&abort),
        );
        let mut result = algorithm.produce_data(&mut ctx);
        if result.is_ok() && abort.load(Ordering::Relaxed) {
            result = Err(PipelineError::Aborted);
        }
        let (outputs, output_info) = ctx.into_parts();

        let slot = &mut self.nodes[idx];
        let output_signatures: Vec<RequestSignature> =
            output_info.iter().map(RequestSignature::capture).collect();
        for (out, info) in slot.outputs.iter_mut().zip(output_info) {
            out.info = info;
        }
        let out_descriptors = algorithm.output_ports();
        slot.algorithm = Some(algorithm);

        match result {
            Ok(()) => {
                let produced = next_tick();
                slot.data_tick = produced;
                for ((out, data), (descriptor, request)) in slot
                    .outputs
                    .iter_mut()
                    .zip(outputs)
                    .zip(out_descriptors.iter().zip(output_signatures))
                {
                    // A port the node left unfilled gets a default instance
                    // when its type is concrete, else stays empty.
                    let data = data.or_else(|| match descriptor.signature {
                        TypeSignature::Kind(kind) => {
                            Some((crate::data::descriptor(kind).new_instance)())
                        }
                        _ => None,
                    });
                    out.cache = match data {
                        Some(data) => OutputCache::Valid {
                            data,
                            produced,
                            request,
                        },
                        None => OutputCache::Empty,
                    };
                }
                observers.dispatch(node, &PipelineEvent::End);
                slot.observers = observers;
                tracing::debug!(%node, ?produced, "produced");
                Ok(())
            }
            Err(error) => {
                slot.data_tick = ModTick::NONE;
                for out in &mut slot.outputs {
                    out.cache = OutputCache::Empty;
                }
                let message = match &error {
                    PipelineError::Aborted => "aborted".to_string(),
                    other => other.to_string(),
                };
                let payload = slot.error_payload(&message);
                observers.dispatch(node, &PipelineEvent::Error(payload));
                slot.observers = observers;
                tracing::debug!(%node, %error, "data pass failed");
                Err(error)
            }
        }
    }

    // ── Shared plumbing ──

    /// Run one of the metadata callbacks with a freshly assembled context,
    /// then write back output bags and (for `UpdateExtent`) merge the
    /// requests the node wrote onto its upstream ports.
    fn run_info_callback(&mut self, node: NodeId, kind: RequestKind) -> PipelineResult<()> {
        let idx = node.index();
        let input_bags = self.collect_input_bags(node);

        let slot = &mut self.nodes[idx];
        let mut algorithm = slot
            .algorithm
            .take()
            .ok_or(PipelineError::CyclicEvaluation(node))?;
        let output_bags: Vec<InfoBag> = slot
            .outputs
            .iter_mut()
            .map(|out| std::mem::take(&mut out.info))
            .collect();

        let mut ctx = InfoContext::new(kind, input_bags, output_bags);
        let result = match kind {
            RequestKind::Information => algorithm.produce_information(&mut ctx),
            RequestKind::UpdateExtent => algorithm.request_update_extent(&mut ctx),
            RequestKind::TimeDependentInformation => {
                algorithm.produce_time_dependent_information(&mut ctx)
            }
            RequestKind::Data => unreachable!("data pass uses execute_data"),
        };
        let (output_bags, upstream_requests) = ctx.into_parts();

        let slot = &mut self.nodes[idx];
        for (out, bag) in slot.outputs.iter_mut().zip(output_bags) {
            out.info = bag;
        }
        slot.algorithm = Some(algorithm);

        if let Err(error) = result {
            let payload = self.nodes[idx].error_payload(&error.to_string());
            self.emit(node, &PipelineEvent::Error(payload));
            return Err(error);
        }

        if kind == RequestKind::UpdateExtent {
            let inputs = self.nodes[idx].inputs.clone();
            for (port, conns) in inputs.iter().enumerate() {
                for (conn_index, conn) in conns.iter().enumerate() {
                    let request = &upstream_requests[port][conn_index];
                    let upstream_bag =
                        &mut self.nodes[conn.src.index()].outputs[conn.src_port].info;
                    for (key, value) in request.iter() {
                        // Kinds match: the value was written under this key.
                        let _ = upstream_bag.set(key, value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Max modified tick over this node and its entire upstream closure.
    fn pipeline_mtime(&self, node: NodeId) -> ModTick {
        let mut max = ModTick::NONE;
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let idx = current.index();
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let slot = &self.nodes[idx];
            max = max.max(slot.node_mtime());
            for conns in &slot.inputs {
                stack.extend(conns.iter().map(|c| c.src));
            }
        }
        max
    }

    /// All of `node`'s input connections in port order.
    fn all_connections(&self, node: NodeId) -> Vec<Connection> {
        self.nodes[node.index()]
            .inputs
            .iter()
            .flatten()
            .copied()
            .collect()
    }

    /// Snapshots of the upstream output bags feeding each input connection.
    fn collect_input_bags(&self, node: NodeId) -> Vec<Vec<InfoBag>> {
        self.nodes[node.index()]
            .inputs
            .iter()
            .map(|conns| {
                conns
                    .iter()
                    .map(|c| self.nodes[c.src.index()].outputs[c.src_port].info.clone())
                    .collect()
            })
            .collect()
    }

    /// Shallow clones of the upstream caches feeding each input connection.
    /// Callers run after the upstream data pass, so a `None` slot means the
    /// upstream produced nothing on that port.
    fn collect_input_data(&self, node: NodeId) -> Vec<Vec<Option<DataObject>>> {
        self.nodes[node.index()]
            .inputs
            .iter()
            .map(|conns| {
                conns
                    .iter()
                    .map(|c| match &self.nodes[c.src.index()].outputs[c.src_port].cache {
                        OutputCache::Valid { data, .. } => Some(data.shallow_copy()),
                        OutputCache::Empty => None,
                    })
                    .collect()
            })
            .collect()
    }

    /// Dispatch an event on a node, in registration order.
    fn emit(&mut self, node: NodeId, event: &PipelineEvent) {
        if let Some(slot) = self.nodes.get_mut(node.index()) {
            let mut observers = std::mem::take(&mut slot.observers);
            observers.dispatch(node, event);
            self.nodes[node.index()].observers = observers;
        }
    }

    fn reset_abort_flags(&mut self) {
        for slot in &self.nodes {
            slot.abort.store(false, Ordering::Relaxed);
        }
    }

    /// True if walking downstream edges from `from` reaches `target`.
    fn reaches_downstream(&self, from: NodeId, target: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            let idx = current.index();
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            for (consumer_index, slot) in self.nodes.iter().enumerate() {
                let feeds_consumer = slot
                    .inputs
                    .iter()
                    .flatten()
                    .any(|conn| conn.src == current);
                if feeds_consumer {
                    stack.push(NodeId(consumer_index as u32));
                }
            }
        }
        false
    }

    fn check_node(&self, node: NodeId) -> PipelineResult<()> {
        if node.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(PipelineError::BadNode(node))
        }
    }

    fn check_output_port(&self, node: NodeId, port: usize) -> PipelineResult<()> {
        self.check_node(node)?;
        if port < self.nodes[node.index()].outputs.len() {
            Ok(())
        } else {
            Err(PipelineError::BadPort { node_id: node, port })
        }
    }

    fn check_connection_ports(
        &self,
        src: NodeId,
        src_port: usize,
        dst: NodeId,
        dst_port: usize,
    ) -> PipelineResult<(TypeSignature, &'static crate::port::InputPortDescriptor)> {
        self.check_node(src)?;
        self.check_node(dst)?;
        let src_alg = self.nodes[src.index()]
            .algorithm
            .as_ref()
            .ok_or(PipelineError::CyclicEvaluation(src))?;
        let dst_alg = self.nodes[dst.index()]
            .algorithm
            .as_ref()
            .ok_or(PipelineError::CyclicEvaluation(dst))?;
        let out = src_alg
            .output_ports()
            .get(src_port)
            .ok_or(PipelineError::BadPort {
                node_id: src,
                port: src_port,
            })?;
        let input = dst_alg
            .input_ports()
            .get(dst_port)
            .ok_or(PipelineError::BadPort {
                node_id: dst,
                port: dst_port,
            })?;
        Ok((out.signature, input))
    }
}

impl std::fmt::Debug for Executive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executive")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
