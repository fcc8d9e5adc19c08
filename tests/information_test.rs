//! Information pass: fixpoint behavior and metadata propagation.

mod common;

use common::builders::{run_counter, BoxSmoothFilter, GradientImageSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vispipe_rs::info::keys;
use vispipe_rs::{
    Algorithm, Cardinality, DataContext, Executive, InfoBag, InfoContext, InputPortDescriptor,
    OutputPortDescriptor, PipelineResult, TypeSignature,
};

/// Pass-through filter that counts `produce_information` invocations.
struct InfoCountingFilter {
    info_runs: Arc<AtomicUsize>,
}

static ANY_INPUT: &[InputPortDescriptor] = &[InputPortDescriptor {
    name: "in",
    types: &[TypeSignature::Any],
    cardinality: Cardinality::Single,
}];

static ANY_OUTPUT: &[OutputPortDescriptor] = &[OutputPortDescriptor {
    name: "out",
    signature: TypeSignature::Any,
}];

impl Algorithm for InfoCountingFilter {
    fn type_name(&self) -> &'static str {
        "InfoCountingFilter"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        ANY_INPUT
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        ANY_OUTPUT
    }

    fn produce_information(&mut self, _ctx: &mut InfoContext) -> PipelineResult<()> {
        self.info_runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        if let Some(input) = ctx.input_data(0, 0) {
            let forwarded = input.shallow_copy();
            ctx.set_output(0, forwarded);
        }
        Ok(())
    }
}

#[test]
fn test_information_fixpoint() {
    let runs = run_counter();
    let mut exec = Executive::new();
    let source = exec.add_node(Box::new(GradientImageSource::new(
        [0, 9, 0, 9, 0, 0],
        10.0,
        runs.clone(),
    )));
    let smooth = exec.add_node(Box::new(BoxSmoothFilter::new(run_counter())));
    exec.connect(source, 0, smooth, 0).unwrap();

    exec.update_information(smooth).unwrap();
    let first: Vec<InfoBag> = [source, smooth]
        .iter()
        .map(|&node| exec.output_information(node, 0).unwrap().clone())
        .collect();

    exec.update_information(smooth).unwrap();
    let second: Vec<InfoBag> = [source, smooth]
        .iter()
        .map(|&node| exec.output_information(node, 0).unwrap().clone())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_information_runs_once_after_construction() {
    let info_runs = Arc::new(AtomicUsize::new(0));
    let mut exec = Executive::new();
    let source_runs = run_counter();
    let source = exec.add_node(Box::new(GradientImageSource::new(
        [0, 3, 0, 3, 0, 0],
        1.0,
        source_runs,
    )));
    let filter = exec.add_node(Box::new(InfoCountingFilter {
        info_runs: info_runs.clone(),
    }));
    exec.connect(source, 0, filter, 0).unwrap();

    exec.update_information(filter).unwrap();
    assert_eq!(info_runs.load(Ordering::SeqCst), 1);

    // An unchanged graph does not re-run the callback.
    exec.update_information(filter).unwrap();
    assert_eq!(info_runs.load(Ordering::SeqCst), 1);

    // Mutating the node does.
    exec.touch(filter);
    exec.update_information(filter).unwrap();
    assert_eq!(info_runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_information_idempotent_across_sibling_mutation() {
    let info_runs_a = Arc::new(AtomicUsize::new(0));
    let info_runs_b = Arc::new(AtomicUsize::new(0));

    let mut exec = Executive::new();
    let source = exec.add_node(Box::new(GradientImageSource::new(
        [0, 3, 0, 3, 0, 0],
        1.0,
        run_counter(),
    )));
    let a = exec.add_node(Box::new(InfoCountingFilter {
        info_runs: info_runs_a.clone(),
    }));
    let b = exec.add_node(Box::new(InfoCountingFilter {
        info_runs: info_runs_b.clone(),
    }));
    exec.connect(source, 0, a, 0).unwrap();
    exec.connect(source, 0, b, 0).unwrap();

    exec.update_information(a).unwrap();
    exec.update_information(b).unwrap();

    // Mutating branch B leaves branch A's information fresh.
    exec.touch(b);
    exec.update_information(a).unwrap();
    assert_eq!(info_runs_a.load(Ordering::SeqCst), 1);

    exec.update_information(b).unwrap();
    assert_eq!(info_runs_b.load(Ordering::SeqCst), 2);
}

#[test]
fn test_whole_extent_flows_downstream() {
    let mut exec = Executive::new();
    let source = exec.add_node(Box::new(GradientImageSource::new(
        [0, 19, 0, 9, 0, 0],
        1.0,
        run_counter(),
    )));
    let smooth = exec.add_node(Box::new(BoxSmoothFilter::new(run_counter())));
    exec.connect(source, 0, smooth, 0).unwrap();

    exec.update_information(smooth).unwrap();
    let bag = exec.output_information(smooth, 0).unwrap();
    assert_eq!(bag.get_extent(&keys::WHOLE_EXTENT), Some([0, 19, 0, 9, 0, 0]));
}
