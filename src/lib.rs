//! # VisPipe-RS: Pull-Based Visualization Pipeline Core
//!
//! A demand-driven dataflow pipeline for scientific-visualization
//! workflows. Algorithms with typed input/output ports form a directed
//! acyclic graph; data objects and metadata flow along connections; the
//! executive evaluates on demand, caching each output against a
//! modification-tick clock and re-running only what a request actually
//! needs.
//!
//! ## Architecture
//!
//! ```text
//! [Source] ──► [Filter] ──► [Filter] ──► sink calls Update()
//!    ▲   metadata (information pass)        │
//!    └── update requests (extent pass) ◄────┘
//! ```
//!
//! - **Executive** — pull scheduler: information pass, update-extent pass,
//!   data pass; per-port caches stamped with production ticks and request
//!   signatures.
//! - **Data objects** — images, grids, meshes, tables, trees, composites;
//!   `Arc`-shared payloads with shallow/deep copy contracts.
//! - **Information bags** — identity-keyed typed metadata carried on ports
//!   and requests.
//! - **Streaming** — an outer loop splitting one update into pieces and
//!   appending the results.
//! - **Observers** — per-node Start/End/Progress/Error/Warning/Modified
//!   callbacks, dispatched synchronously.
//!
//! ## Example
//!
//! ```ignore
//! use vispipe_rs::{Executive, TrivialProducer, DataObject};
//!
//! let mut exec = Executive::new();
//! let source = exec.add_node(Box::new(MyImageSource::new()));
//! let filter = exec.add_node(Box::new(MySmoothingFilter::new()));
//! exec.connect(source, 0, filter, 0)?;
//! exec.update(filter)?;
//! let image = exec.output(filter, 0).unwrap();
//! ```

pub mod clock;
pub mod data;
pub mod error;
pub mod executive;
pub mod id;
pub mod info;
pub mod node;
pub mod nodes;
pub mod observer;
pub mod port;
pub mod request;
pub mod streaming;

// Re-export commonly used types
pub use clock::{next_tick, ModTick};
pub use data::{DataKind, DataObject};
pub use error::{PipelineError, PipelineResult};
pub use executive::{Executive, OutputCache};
pub use id::{NodeId, ObserverId};
pub use info::{InfoBag, InfoKey, InfoValue, ValueKind};
pub use node::{Algorithm, DataContext, InfoContext};
pub use nodes::TrivialProducer;
pub use observer::{channel_observer, EventTag, ObserverSet, PipelineEvent};
pub use port::{Cardinality, InputPortDescriptor, OutputPortDescriptor, TypeSignature};
pub use request::{RequestKind, RequestSignature};
pub use streaming::{append_data, split_extent, StreamingCoordinator};
