//! Publisher/watcher relationships between independently owned objects.
//!
//! A [`Subject`] keeps an ordered list of attached observers and an
//! [`Observer`] watches at most one subject. Neither side owns the other:
//! both hold `Weak` handles, and the relationship is kept symmetric by the
//! attach and detach operations of this crate. An observer is listed by a
//! subject if and only if it names that subject as its current one.
//!
//! Objects take part by embedding a [`SubjectLink`] or an [`ObserverLink`]
//! bound to their own `Rc`:
//!
//! ```ignore
//! Rc::new_cyclic(|me| Thermometer {
//!     link: SubjectLink::bound(me.clone()),
//!     celsius: Cell::new(20),
//! })
//! ```

#![forbid(unsafe_code)]

mod dispatch;
mod error;
mod link;
mod relationship;
mod typed;

#[cfg(test)]
mod fixtures;

pub use dispatch::{Message, Notification};
pub use error::{LinkError, LinkResult, Role};
pub use link::{ObserverLink, SubjectLink};
pub use typed::{Observer, Subject};
