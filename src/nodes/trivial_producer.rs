//! TrivialProducer — wraps a pre-built data object as a source.
//!
//! Backs `Executive::set_input_data`: the held object is handed downstream
//! unchanged, and the node's effective modification time tracks the
//! object's mtime, so replacing or touching the data invalidates dependent
//! caches like any other property change.

use crate::clock::ModTick;
use crate::data::DataObject;
use crate::error::PipelineResult;
use crate::info::keys;
use crate::node::{Algorithm, DataContext, InfoContext};
use crate::port::{InputPortDescriptor, OutputPortDescriptor, TypeSignature};

static OUTPUTS: &[OutputPortDescriptor] = &[OutputPortDescriptor {
    name: "out",
    signature: TypeSignature::Any,
}];

/// A source that produces a caller-supplied data object unchanged.
pub struct TrivialProducer {
    data: Option<DataObject>,
}

impl TrivialProducer {
    pub fn new(data: DataObject) -> Self {
        Self { data: Some(data) }
    }

    pub fn empty() -> Self {
        Self { data: None }
    }

    pub fn set_data(&mut self, data: DataObject) {
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&DataObject> {
        self.data.as_ref()
    }
}

impl Algorithm for TrivialProducer {
    fn type_name(&self) -> &'static str {
        "TrivialProducer"
    }

    fn input_ports(&self) -> &'static [InputPortDescriptor] {
        &[]
    }

    fn output_ports(&self) -> &'static [OutputPortDescriptor] {
        OUTPUTS
    }

    fn source_mtime(&self) -> ModTick {
        self.data.as_ref().map_or(ModTick::NONE, DataObject::mtime)
    }

    fn produce_information(&mut self, ctx: &mut InfoContext) -> PipelineResult<()> {
        if let Some(DataObject::Image(image)) = &self.data {
            ctx.output_info_mut(0)
                .set_extent(&keys::WHOLE_EXTENT, image.extent())?;
        }
        Ok(())
    }

    fn produce_data(&mut self, ctx: &mut DataContext) -> PipelineResult<()> {
        if let Some(data) = &self.data {
            ctx.set_output(0, data.shallow_copy());
        }
        Ok(())
    }
}
