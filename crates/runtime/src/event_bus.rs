use foundation::ids::LayerId;

/// Pointer and camera events delivered by the host map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Click,
    MouseMove,
    MouseLeave,
    /// The camera started moving (pan, zoom or programmatic change).
    MoveStart,
}

/// Subscription key: an event kind, optionally scoped to one layer.
///
/// `layer == None` means the handler listens on the whole map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub kind: EventKind,
    pub layer: Option<LayerId>,
}

impl EventKey {
    pub fn map(kind: EventKind) -> Self {
        Self { kind, layer: None }
    }

    pub fn layer(kind: EventKind, layer: LayerId) -> Self {
        Self {
            kind,
            layer: Some(layer),
        }
    }

    /// Keys an event hitting `layer` is routed through: the layer-scoped key
    /// first, then the map-wide key.
    pub fn routes(kind: EventKind, layer: Option<LayerId>) -> impl Iterator<Item = EventKey> {
        layer
            .map(|l| EventKey::layer(kind, l))
            .into_iter()
            .chain(std::iter::once(EventKey::map(kind)))
    }
}

/// Explicit dispatch table from [`EventKey`] to handlers.
///
/// Ordering contract:
/// - Handlers for one key are yielded in registration order.
/// - `keys()` lists each distinct key once, in first-registration order.
#[derive(Debug, Clone)]
pub struct HandlerTable<H> {
    entries: Vec<(EventKey, H)>,
}

impl<H> Default for HandlerTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: PartialEq> HandlerTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers `handler` under `key`.
    ///
    /// Returns `false` if the exact pair was already registered.
    pub fn register(&mut self, key: EventKey, handler: H) -> bool {
        if self.contains(key, &handler) {
            return false;
        }
        self.entries.push((key, handler));
        true
    }

    /// Removes the `(key, handler)` pair.
    ///
    /// Returns `true` if the table changed.
    pub fn unregister(&mut self, key: EventKey, handler: &H) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, h)| !(*k == key && h == handler));
        self.entries.len() != before
    }

    pub fn contains(&self, key: EventKey, handler: &H) -> bool {
        self.entries.iter().any(|(k, h)| *k == key && h == handler)
    }

    pub fn handlers(&self, key: EventKey) -> impl Iterator<Item = &H> + '_ {
        self.entries
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, h)| h)
    }

    pub fn keys(&self) -> Vec<EventKey> {
        let mut out: Vec<EventKey> = Vec::new();
        for (k, _) in &self.entries {
            if !out.contains(k) {
                out.push(*k);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{EventKey, EventKind, HandlerTable};
    use foundation::ids::LayerId;

    #[test]
    fn handlers_are_yielded_in_registration_order() {
        let mut table = HandlerTable::new();
        let key = EventKey::map(EventKind::Click);
        table.register(key, "b");
        table.register(key, "a");
        table.register(EventKey::map(EventKind::MoveStart), "c");

        let got: Vec<_> = table.handlers(key).copied().collect();
        assert_eq!(got, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut table = HandlerTable::new();
        let key = EventKey::layer(EventKind::Click, LayerId(3));
        assert!(table.register(key, 1));
        assert!(!table.register(key, 1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unregister_is_symmetric_with_register() {
        let mut table = HandlerTable::new();
        let click = EventKey::layer(EventKind::Click, LayerId(1));
        let hover = EventKey::layer(EventKind::MouseMove, LayerId(1));
        table.register(click, 'x');
        table.register(hover, 'y');

        assert!(table.unregister(click, &'x'));
        assert!(!table.unregister(click, &'x'));
        assert_eq!(table.keys(), vec![hover]);

        assert!(table.unregister(hover, &'y'));
        assert!(table.keys().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn routes_try_layer_before_map() {
        let routes: Vec<_> = EventKey::routes(EventKind::Click, Some(LayerId(7))).collect();
        assert_eq!(
            routes,
            vec![
                EventKey::layer(EventKind::Click, LayerId(7)),
                EventKey::map(EventKind::Click)
            ]
        );

        let routes: Vec<_> = EventKey::routes(EventKind::MoveStart, None).collect();
        assert_eq!(routes, vec![EventKey::map(EventKind::MoveStart)]);
    }
}
