//! Concrete subjects and observers built on `subject-observer`.

use std::sync::atomic::{AtomicU32, Ordering};

use subject_observer::Message;

mod dual_role;
mod journal;
mod metrics_monitor;
mod value_entity;
mod value_monitor;

pub use dual_role::DualRole;
pub use journal::{Journal, LogJournal, MemoryJournal, Observation};
pub use metrics_monitor::MetricsMonitor;
pub use value_entity::ValueEntity;
pub use value_monitor::ValueMonitor;

/// Message sent when the value held by an entity changes.
pub const VALUE_CHANGED: Message = 1;

fn next_id(counter: &AtomicU32) -> u32 {
    counter.fetch_add(1, Ordering::Relaxed)
}
