//! Shared helpers for pipeline integration tests.

// Each test binary compiles its own copy; not every binary uses every helper.
#![allow(dead_code)]

pub mod builders;

use std::sync::{Arc, Mutex};
use vispipe_rs::{EventTag, Executive, NodeId, PipelineEvent};

/// Opt-in log capture: `RUST_LOG=vispipe_rs=debug cargo test -- --nocapture`.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A shared, ordered log of observer firings.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn event_label(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::Start => "Start".into(),
        PipelineEvent::End => "End".into(),
        PipelineEvent::Progress(p) => format!("Progress({p:.2})"),
        PipelineEvent::Error(_) => "Error".into(),
        PipelineEvent::Warning(_) => "Warning".into(),
        PipelineEvent::Modified => "Modified".into(),
        PipelineEvent::User { id, .. } => format!("User({id})"),
    }
}

/// Record Start/End/Error firings on `node` into `log`, labeled with `name`.
pub fn observe_lifecycle(exec: &mut Executive, node: NodeId, name: &str, log: &EventLog) {
    for tag in [EventTag::Start, EventTag::End, EventTag::Error] {
        let log = Arc::clone(log);
        let name = name.to_string();
        exec.add_observer(
            node,
            tag,
            Box::new(move |_, event| {
                log.lock().unwrap().push(format!("{}({})", event_label(event), name));
            }),
        )
        .unwrap();
    }
}
