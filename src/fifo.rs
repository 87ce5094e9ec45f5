//! FIFO channels feeding and draining the streaming conversion.

use std::collections::VecDeque;

/// Read side of a stream.
///
/// Callers check [`StreamSource::is_empty`] before every [`StreamSource::read`];
/// a read on an empty source returns `None` rather than blocking.
pub trait StreamSource<T> {
    fn is_empty(&self) -> bool;
    fn read(&mut self) -> Option<T>;
}

/// Write side of a stream. Writes are always accepted.
pub trait StreamSink<T> {
    fn write(&mut self, value: T);
}

/// Unbounded in-memory FIFO.
#[derive(Debug, Clone, Default)]
pub struct Fifo<T> {
    queue: VecDeque<T>,
}

impl<T> Fifo<T> {
    pub fn new() -> Self {
        Fifo {
            queue: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Drains every pending element in order.
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.drain(..).collect()
    }
}

impl<T> FromIterator<T> for Fifo<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Fifo {
            queue: iter.into_iter().collect(),
        }
    }
}

impl<T> StreamSource<T> for Fifo<T> {
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn read(&mut self) -> Option<T> {
        self.queue.pop_front()
    }
}

impl<T> StreamSink<T> for Fifo<T> {
    fn write(&mut self, value: T) {
        self.queue.push_back(value);
    }
}

impl<T> StreamSink<T> for Vec<T> {
    fn write(&mut self, value: T) {
        self.push(value);
    }
}
