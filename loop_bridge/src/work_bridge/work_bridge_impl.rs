// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Hand-off from producers of any kind to the host poll loop. See [`WorkBridge`].

use super::{WorkBridgeError, WorkOrigin, WorkPackage};
use crate::{IdAllocator, TaskId};
use tokio::sync::mpsc::{self,
                        error::{TryRecvError, TrySendError}};

/// Queue bound for a [`WorkBridge`]. This is the only back-pressure knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeCapacity {
    #[default]
    Unbounded,
    /// At least `1`. `Bounded(0)` is treated as `Bounded(1)`.
    Bounded(usize),
}

/// A thread-safe queue of [`WorkPackage`]s with a non-blocking consumer side.
///
/// There is no consumer thread. The poll loop pulls packages itself (see
/// [`WorkBridgeDrain`]), and each pull returns immediately.
///
/// | Producer                  | Call                                    | Blocks?              |
/// | :------------------------ | :-------------------------------------- | :------------------- |
/// | worker thread             | [`WorkSender::send_blocking()`]         | only when bounded    |
/// | cooperative loop task     | [`WorkSender::send_cooperative()`]      | yields to tokio      |
/// | anywhere, must not wait   | [`WorkSender::try_send()`]              | never                |
/// | poll loop (consumer)      | [`WorkReceiver::try_receive()`]         | never                |
///
/// [`WorkBridgeDrain`]: crate::WorkBridgeDrain
#[derive(Debug)]
pub struct WorkBridge;

impl WorkBridge {
    /// Creates the queue. Every package made through [`WorkSender::produce_blocking()`]
    /// gets its id from `ids`.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new<P>(capacity: BridgeCapacity, ids: IdAllocator) -> (WorkSender<P>, WorkReceiver<P>) {
        let (sender, receiver) = match capacity {
            BridgeCapacity::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                (SenderKind::Unbounded(tx), ReceiverKind::Unbounded(rx))
            }
            BridgeCapacity::Bounded(size) => {
                let (tx, rx) = mpsc::channel(size.max(1));
                (SenderKind::Bounded(tx), ReceiverKind::Bounded(rx))
            }
        };
        (
            WorkSender {
                kind: sender,
                ids,
            },
            WorkReceiver { kind: receiver },
        )
    }
}

enum SenderKind<P> {
    Unbounded(mpsc::UnboundedSender<WorkPackage<P>>),
    Bounded(mpsc::Sender<WorkPackage<P>>),
}

enum ReceiverKind<P> {
    Unbounded(mpsc::UnboundedReceiver<WorkPackage<P>>),
    Bounded(mpsc::Receiver<WorkPackage<P>>),
}

/// Why [`WorkSender::try_send_or_reclaim()`] failed. Either way the package is handed
/// back.
#[derive(Debug)]
pub enum TrySendFailure<P> {
    Full(WorkPackage<P>),
    Disconnected(WorkPackage<P>),
}

impl<P> TrySendFailure<P> {
    pub fn into_package(self) -> WorkPackage<P> {
        match self {
            Self::Full(it) | Self::Disconnected(it) => it,
        }
    }
}

/// Producer side. Clone one per producer.
#[allow(missing_debug_implementations)]
pub struct WorkSender<P> {
    kind: SenderKind<P>,
    ids: IdAllocator,
}

impl<P> Clone for WorkSender<P> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            SenderKind::Unbounded(tx) => SenderKind::Unbounded(tx.clone()),
            SenderKind::Bounded(tx) => SenderKind::Bounded(tx.clone()),
        };
        Self {
            kind,
            ids: self.ids.clone(),
        }
    }
}

impl<P> WorkSender<P> {
    /// Non-blocking enqueue. Returns `false` when a bounded bridge is full or when the
    /// receiver is gone (the package is dropped in both cases).
    pub fn try_send(&self, package: WorkPackage<P>) -> bool {
        self.try_send_or_reclaim(package).is_ok()
    }

    /// Like [`try_send()`], but hands the package back on failure.
    ///
    /// # Errors
    ///
    /// [`TrySendFailure::Full`] or [`TrySendFailure::Disconnected`], carrying the package.
    ///
    /// [`try_send()`]: Self::try_send
    pub fn try_send_or_reclaim(&self, package: WorkPackage<P>) -> Result<(), TrySendFailure<P>> {
        match &self.kind {
            SenderKind::Unbounded(tx) => tx
                .send(package)
                .map_err(|error| TrySendFailure::Disconnected(error.0)),
            SenderKind::Bounded(tx) => tx.try_send(package).map_err(|error| match error {
                TrySendError::Full(it) => TrySendFailure::Full(it),
                TrySendError::Closed(it) => TrySendFailure::Disconnected(it),
            }),
        }
    }

    /// Enqueue from a worker thread, waiting for room when the bridge is bounded.
    ///
    /// # Panics
    ///
    /// When called on a bounded bridge from inside a tokio runtime. Use
    /// [`send_cooperative()`] there.
    ///
    /// # Errors
    ///
    /// [`WorkBridgeError::Disconnected`] when the receiver is gone.
    ///
    /// [`send_cooperative()`]: Self::send_cooperative
    pub fn send_blocking(&self, package: WorkPackage<P>) -> Result<(), WorkBridgeError> {
        match &self.kind {
            SenderKind::Unbounded(tx) => tx.send(package).map_err(|error| {
                WorkBridgeError::Disconnected {
                    task_id: error.0.id(),
                }
            }),
            SenderKind::Bounded(tx) => tx.blocking_send(package).map_err(|error| {
                WorkBridgeError::Disconnected {
                    task_id: error.0.id(),
                }
            }),
        }
    }

    /// Enqueue from a cooperative loop task. While the bridge is full this retries
    /// [`try_send_or_reclaim()`], yielding to the runtime between attempts.
    ///
    /// # Errors
    ///
    /// [`WorkBridgeError::Disconnected`] when the receiver is gone.
    ///
    /// [`try_send_or_reclaim()`]: Self::try_send_or_reclaim
    pub async fn send_cooperative(&self, package: WorkPackage<P>) -> Result<(), WorkBridgeError> {
        let mut package = package;
        loop {
            match self.try_send_or_reclaim(package) {
                Ok(()) => return Ok(()),
                Err(TrySendFailure::Full(it)) => {
                    package = it;
                    tokio::task::yield_now().await;
                }
                Err(TrySendFailure::Disconnected(it)) => {
                    return Err(WorkBridgeError::Disconnected { task_id: it.id() });
                }
            }
        }
    }

    /// Free-standing producer convenience: wraps `payload` in a package with a fresh id
    /// and sends it with [`send_blocking()`].
    ///
    /// # Errors
    ///
    /// [`WorkBridgeError::Disconnected`] when the receiver is gone.
    ///
    /// [`send_blocking()`]: Self::send_blocking
    pub fn produce_blocking(&self, payload: P, origin: WorkOrigin) -> Result<TaskId, WorkBridgeError> {
        let id = self.ids.next_id();
        self.send_blocking(WorkPackage::new(id, payload, origin))?;
        Ok(id)
    }

    #[must_use]
    pub fn ids(&self) -> &IdAllocator { &self.ids }

    /// `true` once the receiver is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match &self.kind {
            SenderKind::Unbounded(tx) => tx.is_closed(),
            SenderKind::Bounded(tx) => tx.is_closed(),
        }
    }
}

/// Result of one non-blocking pull.
#[derive(Debug, PartialEq, Eq)]
pub enum TryReceive<P> {
    Item(WorkPackage<P>),
    /// Nothing queued right now.
    Empty,
    /// Nothing queued, and every sender is gone. No item can ever arrive.
    Disconnected,
}

/// Consumer side, owned by the poll loop.
#[allow(missing_debug_implementations)]
pub struct WorkReceiver<P> {
    kind: ReceiverKind<P>,
}

impl<P> WorkReceiver<P> {
    /// Returns immediately, whether or not anything is queued.
    pub fn try_receive(&mut self) -> TryReceive<P> {
        let result = match &mut self.kind {
            ReceiverKind::Unbounded(rx) => rx.try_recv(),
            ReceiverKind::Bounded(rx) => rx.try_recv(),
        };
        match result {
            Ok(package) => TryReceive::Item(package),
            Err(TryRecvError::Empty) => TryReceive::Empty,
            Err(TryRecvError::Disconnected) => TryReceive::Disconnected,
        }
    }

    /// [`try_receive()`] flattened to an `Option`.
    ///
    /// [`try_receive()`]: Self::try_receive
    pub fn try_receive_item(&mut self) -> Option<WorkPackage<P>> {
        match self.try_receive() {
            TryReceive::Item(it) => Some(it),
            TryReceive::Empty | TryReceive::Disconnected => None,
        }
    }

    /// Stops accepting packages. Already queued ones can still be received.
    pub fn close(&mut self) {
        match &mut self.kind {
            ReceiverKind::Unbounded(rx) => rx.close(),
            ReceiverKind::Bounded(rx) => rx.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{thread,
              time::{Duration, Instant}};
    use test_case::test_case;

    fn package(id: u64) -> WorkPackage<String> {
        WorkPackage::new(TaskId::new(id), format!("payload {id}"), WorkOrigin::BlockingWorker)
    }

    #[test_case(BridgeCapacity::Unbounded ; "unbounded")]
    #[test_case(BridgeCapacity::Bounded(4) ; "bounded")]
    fn try_receive_on_empty_bridge_returns_immediately(capacity: BridgeCapacity) {
        let (_tx, mut rx) = WorkBridge::new::<String>(capacity, IdAllocator::new());

        let started = Instant::now();
        assert_eq!(rx.try_receive(), TryReceive::Empty);
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test_case(BridgeCapacity::Unbounded ; "unbounded")]
    #[test_case(BridgeCapacity::Bounded(8) ; "bounded")]
    fn packages_arrive_in_send_order(capacity: BridgeCapacity) {
        let (tx, mut rx) = WorkBridge::new::<String>(capacity, IdAllocator::new());
        for id in 1..=3 {
            assert!(tx.try_send(package(id)));
        }

        let ids: Vec<u64> = std::iter::from_fn(|| rx.try_receive_item())
            .map(|it| it.id().as_u64())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn disconnected_only_after_queue_is_drained() {
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, IdAllocator::new());
        assert!(tx.try_send(package(1)));
        drop(tx);

        assert!(matches!(rx.try_receive(), TryReceive::Item(_)));
        assert_eq!(rx.try_receive(), TryReceive::Disconnected);
    }

    #[test]
    fn full_bounded_bridge_rejects_and_reclaims() {
        let (tx, _rx) = WorkBridge::new::<String>(BridgeCapacity::Bounded(1), IdAllocator::new());
        assert!(tx.try_send(package(1)));
        assert!(!tx.try_send(package(2)));

        let failure = tx.try_send_or_reclaim(package(3)).unwrap_err();
        assert!(matches!(failure, TrySendFailure::Full(_)));
        assert_eq!(failure.into_package().id(), TaskId::new(3));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Bounded(0), IdAllocator::new());
        assert!(tx.try_send(package(1)));
        assert!(rx.try_receive_item().is_some());
    }

    #[test]
    fn send_after_receiver_dropped_fails() {
        let (tx, rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, IdAllocator::new());
        drop(rx);

        assert!(tx.is_closed());
        assert!(!tx.try_send(package(1)));
        assert!(matches!(
            tx.send_blocking(package(2)),
            Err(WorkBridgeError::Disconnected { task_id }) if task_id == TaskId::new(2)
        ));
    }

    #[test]
    fn send_blocking_waits_for_room() {
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Bounded(1), IdAllocator::new());
        assert!(tx.try_send(package(1)));

        let producer = {
            let tx = tx.clone();
            thread::spawn(move || tx.send_blocking(package(2)))
        };
        thread::sleep(Duration::from_millis(20));

        assert_eq!(rx.try_receive_item().unwrap().id(), TaskId::new(1));
        producer.join().unwrap().unwrap();
        assert_eq!(rx.try_receive_item().unwrap().id(), TaskId::new(2));
    }

    #[tokio::test]
    async fn send_cooperative_yields_until_room() {
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Bounded(1), IdAllocator::new());
        assert!(tx.try_send(package(1)));

        let pending = {
            let tx = tx.clone();
            tokio::spawn(async move { tx.send_cooperative(package(2)).await })
        };
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        assert_eq!(rx.try_receive_item().unwrap().id(), TaskId::new(1));
        pending.await.unwrap().unwrap();
        assert_eq!(rx.try_receive_item().unwrap().id(), TaskId::new(2));
    }

    #[test]
    fn produce_blocking_allocates_fresh_ids() {
        let ids = IdAllocator::new();
        let (tx, mut rx) = WorkBridge::new::<&str>(BridgeCapacity::Unbounded, ids.clone());

        assert_eq!(tx.produce_blocking("a", WorkOrigin::BlockingWorker).unwrap(), TaskId::new(1));
        assert_eq!(ids.next_id(), TaskId::new(2));
        assert_eq!(tx.produce_blocking("b", WorkOrigin::CooperativeTask).unwrap(), TaskId::new(3));

        let first = rx.try_receive_item().unwrap();
        assert_eq!((first.id(), first.into_payload()), (TaskId::new(1), "a"));
        let second = rx.try_receive_item().unwrap();
        assert_eq!(second.origin(), WorkOrigin::CooperativeTask);
    }

    #[test]
    fn close_keeps_queued_items() {
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, IdAllocator::new());
        assert!(tx.try_send(package(1)));
        rx.close();

        assert!(!tx.try_send(package(2)));
        assert_eq!(rx.try_receive_item().unwrap().id(), TaskId::new(1));
    }
}
