//! Benchmarks for pipeline update traversal
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vispipe_rs::data::{DataArray, ImageData};
use vispipe_rs::info::keys;
use vispipe_rs::{
    Algorithm, Cardinality, DataContext, DataObject, Executive, InfoContext, InputPortDescriptor,
    NodeId, OutputPortDescriptor, PipelineError, PipelineResult, TypeSignature,
};

static NO_INPUTS: &[InputPortDescriptor] = &[];

static IMAGE_OUTPUT: &[OutputPortDescriptor] = &[OutputPortDescriptor {
    name: "out",
    signature: TypeSignature::Kind(vispipe_rs::DataKind::Image),
}];

static IMAGE_INPUT: &[InputPortDescriptor] = &[InputPortDescriptor {
    name: "in",
    types: &[TypeSignature::Kind(vispipe_rs::DataKind::Image)],
    cardinality: Cardinality::Single,
}];

struct RampSource {
    extent: [i32; 6],
}

impl Algorithm for RampSource {
    fn type_name(&self) -> &'static str {
        "RampSource"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        NO_INPUTS
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        IMAGE_OUTPUT
    }

    fn produce_information(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        ctx.output_info_mut(0)
            .set_extent(&keys::WHOLE_EXTENT, self.extent)
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        let mut image = ImageData::new(self.extent);
        let n = image.num_points();
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        image.point_data.set_array(DataArray::new("v", 1, values));
        ctx.set_output(0, DataObject::Image(image));
        Ok(())
    }
}

struct ScaleFilter;

impl Algorithm for ScaleFilter {
    fn type_name(&self) -> &'static str {
        "ScaleFilter"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        IMAGE_INPUT
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        IMAGE_OUTPUT
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        let input = ctx
            .input_data(0, 0)
            .and_then(DataObject::as_image)
            .ok_or_else(|| PipelineError::algorithm("input image missing"))?;
        let mut output = input.shallow_copy();
        if let Some(values) = output.point_data.array_mut("v") {
            for v in values.values_mut() {
                *v *= 2.0;
            }
        }
        ctx.set_output(0, DataObject::Image(output));
        Ok(())
    }
}

/// A linear pipeline: source followed by `depth` scale filters.
fn build_pipeline(side: i32, depth: usize) -> (Executive, NodeId, NodeId) {
    let mut exec = Executive::new();
    let source = exec.add_node(Box::new(RampSource {
        extent: [0, side - 1, 0, side - 1, 0, 0],
    }));
    let mut tail = source;
    for _ in 0..depth {
        let filter = exec.add_node(Box::new(ScaleFilter));
        exec.connect(tail, 0, filter, 0).unwrap();
        tail = filter;
    }
    (exec, source, tail)
}

fn bench_cached_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_update");

    for depth in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let (mut exec, _, sink) = build_pipeline(64, depth);
            exec.update(sink).unwrap();
            b.iter(|| {
                // Nothing changed: measures traversal + validity checks only.
                exec.update(black_box(sink)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_invalidated_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("invalidated_update");

    for side in [16i32, 64, 256] {
        group.bench_with_input(BenchmarkId::new("side", side), &side, |b, &side| {
            let (mut exec, source, sink) = build_pipeline(side, 2);
            exec.update(sink).unwrap();
            b.iter(|| {
                exec.touch(source);
                exec.update(black_box(sink)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for depth in [8usize, 64] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let (exec, _, _) = build_pipeline(8, black_box(depth));
                black_box(exec.num_nodes())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_update,
    bench_invalidated_update,
    bench_graph_construction
);
criterion_main!(benches);
