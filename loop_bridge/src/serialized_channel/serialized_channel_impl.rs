// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! See [`SerializedChannel`].

use super::ChannelError;
use crate::ThreadCensus;
use std::{sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          thread::JoinHandle};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// What travels through a [`SerializedChannel`]. The [`Sentinel`] tells
/// [`run_consumer()`] to return.
///
/// [`Sentinel`]: Self::Sentinel
#[derive(Debug)]
pub enum ChannelMessage<T> {
    Item(T),
    Sentinel,
}

/// An unbounded FIFO queue with exactly one dedicated consumer thread.
///
/// - [`ChannelSender::send()`] never blocks, so it is safe from the host poll loop, from
///   worker threads, and from inside the cooperative tokio loop.
/// - The consumer thread is the only place the handler runs, so items are handled in one
///   total order. Items from a single producer keep their send order. Items from racing
///   producers are ordered by the channel's internal arbitration.
/// - [`shutdown()`] is the one blocking operation: it enqueues the sentinel and joins the
///   consumer thread.
///
/// ```text
/// producer A ──┐
/// producer B ──┼──► [ mpsc queue ] ──► consumer thread ──► handler(item)
/// producer C ──┘                              ▲
///                shutdown(): Sentinel ────────┘ then join()
/// ```
///
/// [`shutdown()`]: Self::shutdown
#[allow(missing_debug_implementations)]
pub struct SerializedChannel<T> {
    sender: ChannelSender<T>,
    consumer: Option<JoinHandle<()>>,
    thread_name: String,
}

impl<T: Send + 'static> SerializedChannel<T> {
    /// Spawns the consumer thread (named `thread_name`), which runs [`run_consumer()`]
    /// with `handler` until [`shutdown()`] is called.
    ///
    /// # Errors
    ///
    /// [`ChannelError::ThreadSpawn`] if the OS refuses to create the thread.
    ///
    /// [`shutdown()`]: Self::shutdown
    pub fn spawn<H>(thread_name: impl Into<String>, handler: H) -> Result<Self, ChannelError>
    where
        H: FnMut(T) + Send + 'static,
    {
        let thread_name = thread_name.into();
        let (tx, rx) = unbounded_channel();

        let consumer = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let _census = ThreadCensus::process().enter();
                run_consumer(rx, handler);
            })
            .map_err(ChannelError::ThreadSpawn)?;

        Ok(Self {
            sender: ChannelSender {
                tx,
                closed: Arc::new(AtomicBool::new(false)),
            },
            consumer: Some(consumer),
            thread_name,
        })
    }
}

impl<T> SerializedChannel<T> {
    /// Returns a new producer handle. Handles are cheap to clone and may be moved to any
    /// thread.
    #[must_use]
    pub fn sender(&self) -> ChannelSender<T> { self.sender.clone() }

    /// Convenience for `self.sender().send(item)`.
    ///
    /// # Errors
    ///
    /// [`ChannelError::Closed`] after [`shutdown()`].
    ///
    /// [`shutdown()`]: Self::shutdown
    pub fn send(&self, item: T) -> Result<(), ChannelError> { self.sender.send(item) }

    #[must_use]
    pub fn thread_name(&self) -> &str { &self.thread_name }

    /// `true` until the consumer thread has exited.
    #[must_use]
    pub fn is_consumer_running(&self) -> bool {
        self.consumer
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Closes the channel, enqueues the sentinel, and blocks until the consumer thread
    /// has exited.
    ///
    /// Items sent before this call are all handled before the consumer exits. Calling it
    /// again after it succeeded is a no-op that returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::ShutdownFromConsumerThread`] when called by the handler (the
    ///   consumer can't join itself). The channel stays open.
    /// - [`ChannelError::ConsumerPanicked`] when the handler panicked at some point.
    pub fn shutdown(&mut self) -> Result<(), ChannelError> {
        let Some(consumer) = self.consumer.take() else {
            return Ok(());
        };

        if consumer.thread().id() == std::thread::current().id() {
            self.consumer = Some(consumer);
            return Err(ChannelError::ShutdownFromConsumerThread {
                thread_name: self.thread_name.clone(),
            });
        }

        self.sender.closed.store(true, Ordering::SeqCst);

        // The send fails only if the consumer is already gone (it panicked); join()
        // reports that below.
        self.sender.tx.send(ChannelMessage::Sentinel).ok();

        consumer
            .join()
            .map_err(|_| ChannelError::ConsumerPanicked {
                thread_name: self.thread_name.clone(),
            })
    }
}

impl<T> Drop for SerializedChannel<T> {
    fn drop(&mut self) {
        if self.consumer.is_some() {
            self.shutdown().ok();
        }
    }
}

/// Producer side of a [`SerializedChannel`].
#[allow(missing_debug_implementations)]
pub struct ChannelSender<T> {
    tx: UnboundedSender<ChannelMessage<T>>,
    closed: Arc<AtomicBool>,
}

impl<T> Clone for ChannelSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<T> ChannelSender<T> {
    /// Enqueues `item` for FIFO delivery. Never blocks.
    ///
    /// # Errors
    ///
    /// [`ChannelError::Closed`] once [`SerializedChannel::shutdown()`] has started, or if
    /// the consumer thread is gone.
    pub fn send(&self, item: T) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.tx
            .send(ChannelMessage::Item(item))
            .map_err(|_| ChannelError::Closed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.tx.is_closed()
    }

    /// `true` if both handles feed the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool { self.tx.same_channel(&other.tx) }
}

/// The consumer loop. Blocks the calling thread on the queue, hands every item to
/// `handler` in FIFO order, and returns when the [`ChannelMessage::Sentinel`] arrives or
/// every sender is gone.
///
/// A producer can pass the closed check just before shutdown starts and land its item
/// behind the sentinel. So after the sentinel the receiver is closed and whatever is
/// already queued is still handled: a send that returned `Ok` is always handled, and
/// every send after the close fails.
///
/// # Panics
///
/// If called from inside an async runtime (it uses [`blocking_recv()`]). It is meant for
/// a dedicated plain OS thread, which is what [`SerializedChannel::spawn()`] provides.
///
/// [`blocking_recv()`]: tokio::sync::mpsc::UnboundedReceiver::blocking_recv
pub fn run_consumer<T, H>(mut receiver: UnboundedReceiver<ChannelMessage<T>>, mut handler: H)
where
    H: FnMut(T),
{
    while let Some(message) = receiver.blocking_recv() {
        match message {
            ChannelMessage::Item(item) => handler(item),
            ChannelMessage::Sentinel => break,
        }
    }

    receiver.close();
    while let Ok(message) = receiver.try_recv() {
        if let ChannelMessage::Item(item) = message {
            handler(item);
        }
    }
}
