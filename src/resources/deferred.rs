//! Cross-thread deferred calls.
//!
//! Other threads (asset loaders, tooling) never touch a scene directly. They
//! submit closures through a [`DeferredCallSender`]; the
//! [`SceneManager`](crate::scenemanager::SceneManager) drains the queue once
//! per tick, before the scene update, and runs each closure on the
//! simulation thread with exclusive access to the manager.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::scenemanager::SceneManager;

pub type DeferredCall = Box<dyn FnOnce(&mut SceneManager) + Send>;

/// Cloneable, thread-safe submit side of the queue.
#[derive(Clone)]
pub struct DeferredCallSender {
    tx: Sender<DeferredCall>,
}

impl DeferredCallSender {
    /// Queue `call` for the next tick. Returns false if the manager is gone.
    pub fn submit(&self, call: impl FnOnce(&mut SceneManager) + Send + 'static) -> bool {
        self.tx.send(Box::new(call)).is_ok()
    }
}

pub struct DeferredCalls {
    tx: Sender<DeferredCall>,
    rx: Receiver<DeferredCall>,
}

impl Default for DeferredCalls {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredCalls {
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<DeferredCall>();
        Self { tx, rx }
    }

    pub fn sender(&self) -> DeferredCallSender {
        DeferredCallSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every call queued so far. Calls submitted while the returned
    /// batch runs wait for the next drain.
    pub fn take_pending(&self) -> Vec<DeferredCall> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_from_other_threads_are_queued_in_order() {
        let calls = DeferredCalls::new();
        let sender = calls.sender();
        let worker = std::thread::spawn(move || {
            sender.submit(|_| {}) && sender.submit(|_| {})
        });
        assert!(worker.join().unwrap());
        assert_eq!(calls.len(), 2);

        let pending = calls.take_pending();
        assert_eq!(pending.len(), 2);
        assert!(calls.is_empty());
    }

    #[test]
    fn submit_fails_once_queue_is_gone() {
        let calls = DeferredCalls::new();
        let sender = calls.sender();
        drop(calls);
        assert!(!sender.submit(|_| {}));
    }
}
