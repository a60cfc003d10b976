pub use crossbeam_channel::Receiver;

/// Identifies a registered callback so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Fans a change event out to callbacks and channel subscribers.
///
/// Callbacks run synchronously, in registration order, on the thread that
/// calls [`Notifier::notify`]. Subscribers receive a clone of the event over
/// an unbounded channel; a subscriber whose receiver was dropped is pruned the
/// next time an event is sent.
pub struct Notifier<E> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
    subscribers: Vec<crossbeam_channel::Sender<E>>,
    next_id: usize,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E: Clone> Notifier<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);

        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));

        id
    }

    /// Returns `true` if a listener with this id was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();

        self.listeners.retain(|(listener_id, _)| *listener_id != id);

        self.listeners.len() != before
    }

    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = crossbeam_channel::unbounded();

        self.subscribers.push(tx);

        rx
    }

    pub fn notify(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }

        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.subscribers.is_empty()
    }
}
