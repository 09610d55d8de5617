use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{link::addr, Message, Notification, Observer, ObserverLink, Subject, SubjectLink};

pub(crate) const CHANGED: Message = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Init(u32, bool),
    Uninit(u32, bool),
    Update(u32, i32),
}

#[derive(Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }
}

pub(crate) struct Probe {
    link: SubjectLink,
    pub(crate) value: Cell<i32>,
    teardown: bool,
}

impl Probe {
    fn build(teardown: bool) -> Rc<Self> {
        Rc::new_cyclic(|me| Probe {
            link: SubjectLink::bound(me.clone()),
            value: Cell::new(0),
            teardown,
        })
    }

    pub(crate) fn new() -> Rc<Self> {
        Self::build(true)
    }

    pub(crate) fn without_teardown() -> Rc<Self> {
        Self::build(false)
    }

    pub(crate) fn unbound() -> Rc<Self> {
        Rc::new(Probe {
            link: SubjectLink::default(),
            value: Cell::new(0),
            teardown: true,
        })
    }

    /// A probe whose link names `other` instead of itself.
    pub(crate) fn bound_to(other: &Rc<Probe>) -> Rc<Self> {
        Rc::new(Probe {
            link: SubjectLink::bound(Rc::downgrade(other)),
            value: Cell::new(0),
            teardown: true,
        })
    }

    pub(crate) fn bind_self(self: &Rc<Self>) -> bool {
        self.link.bind(Rc::downgrade(self))
    }

    pub(crate) fn set(&self, value: i32) {
        self.value.set(value);
        self.notify_observers(CHANGED);
    }

    fn is_listing(&self, watcher: &Watcher) -> bool {
        self.link
            .handles()
            .iter()
            .any(|handle| handle.address() == addr(watcher))
    }

    pub(crate) fn subject_link_contains_dead_entries(&self) -> bool {
        self.link.handles().len() != self.link.live_count()
    }
}

impl Subject for Probe {
    fn subject_link(&self) -> &SubjectLink {
        &self.link
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        if self.teardown {
            self.detach_all_observers();
        }
    }
}

type Hook = Box<dyn Fn(&Watcher, &Probe)>;

pub(crate) struct Watcher {
    link: ObserverLink,
    id: u32,
    log: Option<EventLog>,
    refusing: bool,
    teardown: bool,
    updates: Cell<usize>,
    last_message: Cell<Option<Message>>,
    on_init: RefCell<Option<Hook>>,
    on_uninit: RefCell<Option<Hook>>,
    on_update: RefCell<Option<Hook>>,
}

impl Watcher {
    fn build(id: u32, log: Option<&EventLog>, refusing: bool, teardown: bool) -> Self {
        Watcher {
            link: ObserverLink::default(),
            id,
            log: log.cloned(),
            refusing,
            teardown,
            updates: Cell::new(0),
            last_message: Cell::new(None),
            on_init: RefCell::new(None),
            on_uninit: RefCell::new(None),
            on_update: RefCell::new(None),
        }
    }

    fn bound(watcher: Watcher) -> Rc<Self> {
        let watcher = Rc::new(watcher);
        watcher.link.bind(Rc::downgrade(&watcher));
        watcher
    }

    pub(crate) fn new(id: u32) -> Rc<Self> {
        Self::bound(Self::build(id, None, false, true))
    }

    pub(crate) fn unbound(id: u32) -> Rc<Self> {
        Rc::new(Self::build(id, None, false, true))
    }

    pub(crate) fn with_log(id: u32, log: &EventLog) -> Rc<Self> {
        Self::bound(Self::build(id, Some(log), false, true))
    }

    pub(crate) fn refusing(id: u32) -> Rc<Self> {
        Self::bound(Self::build(id, None, true, true))
    }

    pub(crate) fn without_teardown(id: u32) -> Rc<Self> {
        Self::bound(Self::build(id, None, false, false))
    }

    pub(crate) fn on_init(&self, hook: impl Fn(&Watcher, &Probe) + 'static) {
        *self.on_init.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn on_uninit(&self, hook: impl Fn(&Watcher, &Probe) + 'static) {
        *self.on_uninit.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn on_update(&self, hook: impl Fn(&Watcher, &Probe) + 'static) {
        *self.on_update.borrow_mut() = Some(Box::new(hook));
    }

    pub(crate) fn updates(&self) -> usize {
        self.updates.get()
    }

    pub(crate) fn last_message(&self) -> Option<Message> {
        self.last_message.get()
    }

    pub(crate) fn is_observing(&self, subject: &Probe) -> bool {
        self.current_subject()
            .is_some_and(|current| std::ptr::eq(&*current, subject))
    }

    fn record(&self, event: Event) {
        if let Some(log) = &self.log {
            log.push(event);
        }
    }

    fn run(&self, hook: &RefCell<Option<Hook>>, subject: &Probe) {
        if let Some(hook) = hook.borrow().as_ref() {
            hook(self, subject);
        }
    }
}

impl Observer for Watcher {
    type Subject = Probe;

    fn observer_link(&self) -> &ObserverLink {
        &self.link
    }

    fn update(&self, subject: &Probe, notification: Notification) -> bool {
        self.updates.set(self.updates.get() + 1);
        self.last_message.set(Some(notification.message()));
        self.record(Event::Update(self.id, subject.value.get()));
        self.run(&self.on_update, subject);
        !self.refusing && notification.message() == CHANGED
    }

    fn init(&self, subject: &Probe) -> bool {
        let registered = subject.is_listing(self);
        self.record(Event::Init(self.id, registered));
        self.run(&self.on_init, subject);
        true
    }

    fn uninit(&self, subject: &Probe) -> bool {
        let registered = subject.is_listing(self);
        self.record(Event::Uninit(self.id, registered));
        self.run(&self.on_uninit, subject);
        true
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if self.teardown {
            self.detach();
        }
    }
}

/// An observer relying on the default lifecycle hooks.
pub(crate) struct Bystander {
    link: ObserverLink,
}

impl Bystander {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new_cyclic(|me| Bystander {
            link: ObserverLink::bound(me.clone()),
        })
    }
}

impl Observer for Bystander {
    type Subject = Probe;

    fn observer_link(&self) -> &ObserverLink {
        &self.link
    }

    fn update(&self, _subject: &Probe, _notification: Notification) -> bool {
        false
    }
}

impl Drop for Bystander {
    fn drop(&mut self) {
        self.detach();
    }
}

fn same<T: ?Sized, U: ?Sized>(left: &Rc<T>, right: &Rc<U>) -> bool {
    Rc::as_ptr(left).cast::<()>() == Rc::as_ptr(right).cast::<()>()
}

/// Checks that every listed observer names its subject and every attached
/// observer is listed exactly once by the subject it names.
pub(crate) fn assert_symmetry(subjects: &[&Rc<Probe>], watchers: &[&Rc<Watcher>]) {
    for subject in subjects {
        for observer in subject.observers() {
            assert!(
                observer
                    .current_subject()
                    .is_some_and(|current| same(&current, *subject)),
                "Should only list observers that name this subject"
            );
        }
    }
    for watcher in watchers {
        let listings = subjects
            .iter()
            .map(|subject| {
                subject
                    .observers()
                    .iter()
                    .filter(|observer| same(*observer, *watcher))
                    .count()
            })
            .sum::<usize>();
        let expected = match watcher.current_subject() {
            Some(current) if subjects.iter().any(|subject| same(*subject, &current)) => 1,
            _ => 0,
        };
        assert_eq!(
            expected, listings,
            "Should list an attached observer exactly once, and a detached one nowhere"
        );
    }
}
