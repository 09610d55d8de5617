//! Link state embedded in every subject and observer.
//!
//! Both directions are non-owning: a subject keeps `Weak` handles to its
//! observers and an observer keeps a `Weak` handle to its subject. A link
//! is bound once to the `Rc` allocation of the object that embeds it; that
//! allocation address is the object's identity inside the core.

use std::{
    any::Any,
    cell::{Cell, OnceCell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use log::warn;

use crate::{
    dispatch::Notification,
    typed::{Observer, Subject},
};

/// Untyped view of a subject, as seen by the relationship core.
pub(crate) trait SubjectNode: Any {
    fn link(&self) -> &SubjectLink;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Untyped view of an observer, as seen by the relationship core.
pub(crate) trait ObserverNode {
    fn link(&self) -> &ObserverLink;

    fn on_init(&self, subject: &dyn SubjectNode) -> bool;

    fn on_uninit(&self, subject: &dyn SubjectNode) -> bool;

    fn on_update(&self, subject: &dyn SubjectNode, notification: Notification) -> bool;
}

impl<S: Subject> SubjectNode for S {
    fn link(&self) -> &SubjectLink {
        self.subject_link()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl<O: Observer> ObserverNode for O {
    fn link(&self) -> &ObserverLink {
        self.observer_link()
    }

    fn on_init(&self, subject: &dyn SubjectNode) -> bool {
        subject
            .as_any()
            .downcast_ref::<O::Subject>()
            .is_some_and(|subject| self.init(subject))
    }

    fn on_uninit(&self, subject: &dyn SubjectNode) -> bool {
        subject
            .as_any()
            .downcast_ref::<O::Subject>()
            .is_some_and(|subject| self.uninit(subject))
    }

    fn on_update(&self, subject: &dyn SubjectNode, notification: Notification) -> bool {
        subject
            .as_any()
            .downcast_ref::<O::Subject>()
            .is_some_and(|subject| self.update(subject, notification))
    }
}

pub(crate) fn addr<T: ?Sized>(node: &T) -> *const () {
    (node as *const T).cast::<()>()
}

fn weak_addr<T: ?Sized>(handle: &Weak<T>) -> *const () {
    handle.as_ptr().cast::<()>()
}

/// An observer as stored in a subject's membership list.
///
/// `typed` holds a `Weak<dyn Observer<Subject = S>>` for the subject type
/// the observer was bound with, so the typed view can hand observers back
/// without any unchecked conversion.
#[derive(Clone)]
pub(crate) struct ObserverHandle {
    pub(crate) node: Weak<dyn ObserverNode>,
    typed: Rc<dyn Any>,
}

impl ObserverHandle {
    fn new<O: Observer>(me: Weak<O>) -> Self {
        let typed: Weak<dyn Observer<Subject = O::Subject>> = me.clone();
        ObserverHandle {
            node: me,
            typed: Rc::new(typed),
        }
    }

    pub(crate) fn address(&self) -> *const () {
        weak_addr(&self.node)
    }

    pub(crate) fn typed<S: Subject>(&self) -> Option<Rc<dyn Observer<Subject = S>>> {
        self.typed
            .downcast_ref::<Weak<dyn Observer<Subject = S>>>()
            .and_then(Weak::upgrade)
    }
}

/// Subject side of the relationship: the ordered list of attached observers.
#[derive(Default)]
pub struct SubjectLink {
    me: OnceCell<Weak<dyn SubjectNode>>,
    observers: RefCell<Vec<ObserverHandle>>,
}

impl SubjectLink {
    /// Creates a link already bound to the subject that will own it,
    /// typically from within `Rc::new_cyclic`.
    pub fn bound<S: Subject>(me: Weak<S>) -> Self {
        let link = SubjectLink::default();
        link.bind(me);
        link
    }

    /// Binds an unbound link to its owning subject. Returns `false` if the
    /// link was already bound.
    pub fn bind<S: Subject>(&self, me: Weak<S>) -> bool {
        let me: Weak<dyn SubjectNode> = me;
        self.me.set(me).is_ok()
    }

    pub fn is_bound(&self) -> bool {
        self.me.get().is_some()
    }

    pub(crate) fn handle(&self) -> Option<&Weak<dyn SubjectNode>> {
        self.me.get()
    }

    pub(crate) fn is_handle_of(&self, subject: *const ()) -> bool {
        self.me.get().is_some_and(|me| weak_addr(me) == subject)
    }

    pub(crate) fn handles(&self) -> Vec<ObserverHandle> {
        self.observers.borrow().clone()
    }

    pub(crate) fn last(&self) -> Option<ObserverHandle> {
        self.observers.borrow().last().cloned()
    }

    pub(crate) fn push(&self, handle: ObserverHandle) {
        self.observers.borrow_mut().push(handle);
    }

    pub(crate) fn remove(&self, observer: *const ()) -> bool {
        let mut observers = self.observers.borrow_mut();
        match observers
            .iter()
            .position(|handle| handle.address() == observer)
        {
            Some(index) => {
                observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops entries whose observer no longer exists.
    pub(crate) fn prune(&self) {
        self.observers
            .borrow_mut()
            .retain(|handle| handle.node.strong_count() > 0);
    }

    pub(crate) fn live_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|handle| handle.node.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for SubjectLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectLink")
            .field("bound", &self.is_bound())
            .field("observer_count", &self.live_count())
            .finish()
    }
}

// Safety net for subjects whose Drop did not call `detach_all_observers`.
// Hooks cannot be dispatched from here, so observers are only severed.
impl Drop for SubjectLink {
    fn drop(&mut self) {
        let remaining = std::mem::take(self.observers.get_mut());
        if remaining.is_empty() {
            return;
        }

        warn!(
            "Subject dropped with {} observer(s) still attached, severing them without uninit",
            remaining.len()
        );
        let Some(me) = self.me.get() else {
            return;
        };
        for handle in remaining.iter().rev() {
            if let Some(observer) = handle.node.upgrade() {
                let link = observer.link();
                if link.observes(weak_addr(me)) {
                    link.set_subject(None);
                }
            }
        }
    }
}

/// Observer side of the relationship: the single subject currently observed.
#[derive(Default)]
pub struct ObserverLink {
    me: OnceCell<ObserverHandle>,
    subject: RefCell<Option<Weak<dyn SubjectNode>>>,
    in_hook: Cell<bool>,
}

impl ObserverLink {
    /// Creates a link already bound to the observer that will own it,
    /// typically from within `Rc::new_cyclic`.
    pub fn bound<O: Observer>(me: Weak<O>) -> Self {
        let link = ObserverLink::default();
        link.bind(me);
        link
    }

    /// Binds an unbound link to its owning observer. Returns `false` if the
    /// link was already bound.
    pub fn bind<O: Observer>(&self, me: Weak<O>) -> bool {
        self.me.set(ObserverHandle::new(me)).is_ok()
    }

    pub fn is_bound(&self) -> bool {
        self.me.get().is_some()
    }

    pub(crate) fn handle(&self) -> Option<&ObserverHandle> {
        self.me.get()
    }

    pub(crate) fn subject(&self) -> Option<Weak<dyn SubjectNode>> {
        self.subject.borrow().clone()
    }

    pub(crate) fn observes(&self, subject: *const ()) -> bool {
        self.subject
            .borrow()
            .as_ref()
            .is_some_and(|current| weak_addr(current) == subject)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.subject.borrow().is_some()
    }

    pub(crate) fn set_subject(&self, subject: Option<Weak<dyn SubjectNode>>) {
        *self.subject.borrow_mut() = subject;
    }

    pub(crate) fn in_hook(&self) -> bool {
        self.in_hook.get()
    }

    /// Runs a lifecycle hook with the re-entrancy guard raised.
    pub(crate) fn run_hook(&self, hook: impl FnOnce() -> bool) -> bool {
        let outer = self.in_hook.replace(true);
        let outcome = hook();
        self.in_hook.set(outer);
        outcome
    }
}

impl fmt::Debug for ObserverLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverLink")
            .field("bound", &self.is_bound())
            .field("attached", &self.is_attached())
            .field("in_hook", &self.in_hook.get())
            .finish()
    }
}

impl Drop for ObserverLink {
    fn drop(&mut self) {
        if self
            .subject
            .get_mut()
            .as_ref()
            .is_some_and(|subject| subject.strong_count() > 0)
        {
            warn!("Observer dropped while still attached, its Drop must call `detach` first");
        }
    }
}
