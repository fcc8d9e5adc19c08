//! Programmable test algorithms with invocation counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vispipe_rs::data::{DataArray, ImageData, Table};
use vispipe_rs::info::keys;
use vispipe_rs::{
    Algorithm, Cardinality, DataContext, DataObject, InfoContext, InputPortDescriptor,
    OutputPortDescriptor, PipelineError, PipelineResult, TypeSignature,
};

pub fn run_counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

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

static TABLE_OUTPUT: &[OutputPortDescriptor] = &[OutputPortDescriptor {
    name: "out",
    signature: TypeSignature::Kind(vispipe_rs::DataKind::Table),
}];

static ANY_INPUT: &[InputPortDescriptor] = &[InputPortDescriptor {
    name: "in",
    types: &[TypeSignature::Any],
    cardinality: Cardinality::Single,
}];

static ANY_OUTPUT: &[OutputPortDescriptor] = &[OutputPortDescriptor {
    name: "out",
    signature: TypeSignature::Any,
}];

/// Image source producing `v(i, j) = i + y_scale * j` over the requested
/// extent. Counts `produce_data` invocations.
pub struct GradientImageSource {
    whole_extent: [i32; 6],
    y_scale: f64,
    can_sub_extent: bool,
    runs: Arc<AtomicUsize>,
}

impl GradientImageSource {
    pub fn new(whole_extent: [i32; 6], y_scale: f64, runs: Arc<AtomicUsize>) -> Self {
        Self {
            whole_extent,
            y_scale,
            can_sub_extent: false,
            runs,
        }
    }

    pub fn streamable(mut self) -> Self {
        self.can_sub_extent = true;
        self
    }

    pub fn set_y_scale(&mut self, y_scale: f64) {
        self.y_scale = y_scale;
    }
}

impl Algorithm for GradientImageSource {
    fn type_name(&self) -> &'static str {
        "GradientImageSource"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        NO_INPUTS
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        IMAGE_OUTPUT
    }

    fn produce_information(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        let bag = ctx.output_info_mut(0);
        bag.set_extent(&keys::WHOLE_EXTENT, self.whole_extent)?;
        if self.can_sub_extent {
            bag.set_int(&keys::CAN_PRODUCE_SUB_EXTENT, 1)?;
        }
        Ok(())
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let extent = ctx
            .output_info(0)
            .get_extent(&keys::UPDATE_EXTENT)
            .unwrap_or(self.whole_extent);

        let mut image = ImageData::new(extent);
        let mut values = DataArray::zeros("v", 1, image.num_points());
        for k in extent[4]..=extent[5] {
            for j in extent[2]..=extent[3] {
                for i in extent[0]..=extent[1] {
                    let index = image.point_index(i, j, k);
                    values.set(index, 0, i as f64 + self.y_scale * j as f64);
                }
            }
        }
        image.point_data.set_array(values);
        ctx.set_output(0, DataObject::Image(image));
        Ok(())
    }
}

/// 3-point box filter along x with boundary replication.
pub struct BoxSmoothFilter {
    runs: Arc<AtomicUsize>,
}

impl BoxSmoothFilter {
    pub fn new(runs: Arc<AtomicUsize>) -> Self {
        Self { runs }
    }
}

impl Algorithm for BoxSmoothFilter {
    fn type_name(&self) -> &'static str {
        "BoxSmoothFilter"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        IMAGE_INPUT
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        IMAGE_OUTPUT
    }

    fn produce_information(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        // The smoothed image covers the same extent as its input.
        if let Some(whole) = ctx
            .input_info(0, 0)
            .and_then(|bag| bag.get_extent(&keys::WHOLE_EXTENT))
        {
            ctx.output_info_mut(0).set_extent(&keys::WHOLE_EXTENT, whole)?;
        }
        Ok(())
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let input = ctx
            .input_data(0, 0)
            .and_then(DataObject::as_image)
            .ok_or_else(|| PipelineError::algorithm("input image missing"))?;
        let source = input
            .point_data
            .array("v")
            .ok_or_else(|| PipelineError::algorithm("input array 'v' missing"))?
            .clone();
        let extent = input.extent();

        let mut output = input.shallow_copy();
        let mut smoothed = DataArray::zeros("v", 1, output.num_points());
        for k in extent[4]..=extent[5] {
            for j in extent[2]..=extent[3] {
                for i in extent[0]..=extent[1] {
                    let sample = |x: i32| {
                        let x = x.clamp(extent[0], extent[1]);
                        source.get(output.point_index(x, j, k))
                    };
                    let mean = (sample(i - 1) + sample(i) + sample(i + 1)) / 3.0;
                    smoothed.set(output.point_index(i, j, k), 0, mean);
                }
            }
        }
        output.point_data.set_array(smoothed);
        ctx.set_output(0, DataObject::Image(output));
        Ok(())
    }
}

/// Table source whose single cell equals the requested time step.
pub struct TimeTableSource {
    time_steps: Vec<f64>,
    runs: Arc<AtomicUsize>,
}

impl TimeTableSource {
    pub fn new(time_steps: Vec<f64>, runs: Arc<AtomicUsize>) -> Self {
        Self { time_steps, runs }
    }
}

impl Algorithm for TimeTableSource {
    fn type_name(&self) -> &'static str {
        "TimeTableSource"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        NO_INPUTS
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        TABLE_OUTPUT
    }

    fn produce_information(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        let bag = ctx.output_info_mut(0);
        bag.set_double_vec(&keys::TIME_STEPS, self.time_steps.clone())?;
        let range = match (self.time_steps.first(), self.time_steps.last()) {
            (Some(&first), Some(&last)) => vec![first, last],
            _ => vec![],
        };
        bag.set_double_vec(&keys::TIME_RANGE, range)?;
        Ok(())
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let time = ctx
            .output_info(0)
            .get_double(&keys::UPDATE_TIME_STEP)
            .unwrap_or_else(|| self.time_steps.first().copied().unwrap_or(0.0));

        let mut table = Table::new();
        table.set_column(DataArray::new("t", 1, vec![time]));
        ctx.set_output(0, DataObject::Table(table));
        Ok(())
    }
}

/// Forwards its input unchanged. Counts invocations.
pub struct PassThroughFilter {
    runs: Arc<AtomicUsize>,
}

impl PassThroughFilter {
    pub fn new(runs: Arc<AtomicUsize>) -> Self {
        Self { runs }
    }
}

impl Algorithm for PassThroughFilter {
    fn type_name(&self) -> &'static str {
        "PassThroughFilter"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        ANY_INPUT
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        ANY_OUTPUT
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let input = ctx
            .input_data(0, 0)
            .ok_or_else(|| PipelineError::algorithm("input missing"))?
            .shallow_copy();
        ctx.set_output(0, input);
        Ok(())
    }
}

/// Always fails in `produce_data`.
pub struct FailingFilter {
    runs: Arc<AtomicUsize>,
}

impl FailingFilter {
    pub fn new(runs: Arc<AtomicUsize>) -> Self {
        Self { runs }
    }
}

impl Algorithm for FailingFilter {
    fn type_name(&self) -> &'static str {
        "FailingFilter"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        ANY_INPUT
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        ANY_OUTPUT
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let _ = ctx;
        Err(PipelineError::algorithm("synthetic failure"))
    }
}

/// Source that reports progress in `steps` increments and honors the
/// cooperative abort flag.
pub struct LongRunningSource {
    steps: usize,
}

impl LongRunningSource {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }
}

impl Algorithm for LongRunningSource {
    fn type_name(&self) -> &'static str {
        "LongRunningSource"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        NO_INPUTS
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        TABLE_OUTPUT
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        for step in 0..=self.steps {
            let fraction = step as f64 / self.steps as f64;
            if !ctx.progress(fraction) {
                return Err(PipelineError::Aborted);
            }
        }
        let mut table = Table::new();
        table.set_column(DataArray::new("done", 1, vec![1.0]));
        ctx.set_output(0, DataObject::Table(table));
        Ok(())
    }
}
