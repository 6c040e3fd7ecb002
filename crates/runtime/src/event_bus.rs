use tokio::sync::mpsc;

/// Typed event inbox for the single owner of mutable state.
///
/// Async tasks hold an [`EventSender`] and post results; the owner drains the
/// bus once per frame. All state mutation therefore happens on one task.
#[derive(Debug)]
pub struct EventBus<T> {
    tx: mpsc::UnboundedSender<T>,
    rx: mpsc::UnboundedReceiver<T>,
}

#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Returns `false` once the bus has been dropped.
    pub fn emit(&self, event: T) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves when the bus is dropped.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender<T> {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything posted so far, in arrival order.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            out.push(event);
        }
        out
    }

    /// Waits for the next event. The bus keeps a sender of its own, so this
    /// never returns `None` while the bus is alive.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
