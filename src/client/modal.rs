use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::lock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Other(String),
}

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Document-level key listener registry.
#[derive(Default)]
pub struct KeyBindings {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, (Key, Handler)>>,
}

impl KeyBindings {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `handler` for `key` until the returned guard is dropped.
    pub fn bind(self: &Arc<Self>, key: Key, handler: impl Fn() + Send + Sync + 'static) -> Binding {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).insert(id, (key, Arc::new(handler)));
        Binding {
            registry: Arc::clone(self),
            id,
        }
    }

    /// Invoke every handler bound to `key`; returns how many ran.
    pub fn dispatch(&self, key: &Key) -> usize {
        // Handlers run outside the lock so they may bind/unbind
        let handlers: Vec<Handler> = lock(&self.listeners)
            .values()
            .filter(|(bound, _)| bound == key)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its listener on drop.
pub struct Binding {
    registry: Arc<KeyBindings>,
    id: u64,
}

impl Drop for Binding {
    fn drop(&mut self) {
        lock(&self.registry.listeners).remove(&self.id);
    }
}

/// Currently focused element id.
#[derive(Default)]
pub struct Focus {
    current: Mutex<Option<String>>,
}

impl Focus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn focus(&self, target: &str) {
        *lock(&self.current) = Some(target.to_string());
    }

    pub fn current(&self) -> Option<String> {
        lock(&self.current).clone()
    }
}

/// Escape-to-close and initial focus for a modal dialog.
///
/// The Escape listener exists only while the modal is open. The close
/// callback sits behind a shared cell, so replacing it never rebinds.
pub struct ModalKeys {
    bindings: Arc<KeyBindings>,
    focus: Arc<Focus>,
    initial_focus: String,
    on_close: Arc<RwLock<Handler>>,
    escape: Option<Binding>,
    bind_count: usize,
}

impl ModalKeys {
    pub fn new(
        bindings: Arc<KeyBindings>,
        focus: Arc<Focus>,
        initial_focus: impl Into<String>,
        on_close: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            bindings,
            focus,
            initial_focus: initial_focus.into(),
            on_close: Arc::new(RwLock::new(Arc::new(on_close))),
            escape: None,
            bind_count: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.escape.is_some()
    }

    pub fn set_open(&mut self, open: bool) {
        match (open, self.escape.is_some()) {
            (true, false) => {
                let on_close = Arc::clone(&self.on_close);
                self.escape = Some(self.bindings.bind(Key::Escape, move || {
                    let close = on_close.read().unwrap_or_else(|p| p.into_inner()).clone();
                    close();
                }));
                self.bind_count += 1;
                self.focus.focus(&self.initial_focus);
            }
            (false, true) => self.escape = None,
            _ => {}
        }
    }

    /// Swap the close callback without touching the listener.
    pub fn set_on_close(&self, on_close: impl Fn() + Send + Sync + 'static) {
        *self.on_close.write().unwrap_or_else(|p| p.into_inner()) = Arc::new(on_close);
    }

    /// How many times the Escape listener has been bound.
    pub fn bind_count(&self) -> usize {
        self.bind_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        (hits, move || {
            h.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn escape_bound_only_while_open() {
        let bindings = KeyBindings::new();
        let focus = Focus::new();
        let (closes, on_close) = counter();
        let mut modal = ModalKeys::new(Arc::clone(&bindings), Arc::clone(&focus), "customer-name", on_close);

        assert_eq!(bindings.dispatch(&Key::Escape), 0);

        modal.set_open(true);
        assert_eq!(focus.current().as_deref(), Some("customer-name"));
        assert_eq!(bindings.dispatch(&Key::Escape), 1);
        assert_eq!(bindings.dispatch(&Key::Enter), 0);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        modal.set_open(false);
        assert!(bindings.is_empty());
        assert_eq!(bindings.dispatch(&Key::Escape), 0);
    }

    #[test]
    fn replacing_callback_does_not_rebind() {
        let bindings = KeyBindings::new();
        let (first, on_first) = counter();
        let (second, on_second) = counter();
        let mut modal = ModalKeys::new(Arc::clone(&bindings), Focus::new(), "ok", on_first);

        modal.set_open(true);
        modal.set_open(true);
        modal.set_on_close(on_second);
        bindings.dispatch(&Key::Escape);

        assert_eq!(modal.bind_count(), 1);
        assert_eq!(bindings.len(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_modal_releases_listener() {
        let bindings = KeyBindings::new();
        let (_, on_close) = counter();
        let mut modal = ModalKeys::new(Arc::clone(&bindings), Focus::new(), "ok", on_close);
        modal.set_open(true);
        assert_eq!(bindings.len(), 1);
        drop(modal);
        assert!(bindings.is_empty());
    }
}
