//! Single-producer/single-consumer byte ring buffer
//!
//! Decouples the serial reader (producer context) from the main loop
//! (consumer context). Each cursor has exactly one writer, so no lock is
//! taken: the producer publishes `write` with `Release` after storing the
//! byte, and the consumer publishes `read` with `Release` after loading it.
//! Each side observes the other's cursor with `Acquire`.

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::BufferOverflow;

/// Line terminator searched for by [`Consumer::peek_line_end`]
pub const LINE_FEED: u8 = b'\n';

/// Default usable capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024;

struct Shared {
    /// One slot more than the usable capacity so that `write == read`
    /// unambiguously means empty.
    slots: Box<[UnsafeCell<u8>]>,
    write: AtomicUsize,
    read: AtomicUsize,
    overflows: AtomicUsize,
}

// SAFETY: a slot is written only by the producer while it lies outside the
// readable window `[read, write)`, and read only by the consumer while it lies
// inside it. The Release/Acquire pairs on the cursors order those accesses.
unsafe impl Sync for Shared {}
unsafe impl Send for Shared {}

impl Shared {
    fn advance(&self, cursor: usize) -> usize {
        let next = cursor + 1;
        if next == self.slots.len() { 0 } else { next }
    }

    fn distance(&self, from: usize, to: usize) -> usize {
        if to >= from {
            to - from
        } else {
            self.slots.len() - from + to
        }
    }
}

/// Fixed-capacity byte queue, allocated once and never resized.
///
/// Construct with [`RingBuffer::with_capacity`], which hands back the two
/// ends. Neither end is `Clone`, so each cursor keeps a single writer.
pub struct RingBuffer;

impl RingBuffer {
    /// Allocate a buffer able to hold `capacity` unread bytes (at least one)
    pub fn with_capacity(capacity: usize) -> (Producer, Consumer) {
        let capacity = capacity.max(1);
        let slots = (0..capacity + 1)
            .map(|_| UnsafeCell::new(0u8))
            .collect::<Box<[_]>>();
        let shared = Arc::new(Shared {
            slots,
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            overflows: AtomicUsize::new(0),
        });
        (
            Producer {
                shared: shared.clone(),
            },
            Consumer { shared },
        )
    }
}

/// Producer end, owned by the serial reader context
pub struct Producer {
    shared: Arc<Shared>,
}

impl Producer {
    /// Store `byte` at the write cursor.
    ///
    /// When the buffer is full the byte is rejected, the overflow counter is
    /// bumped and already-buffered data is left untouched.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferOverflow> {
        let shared = &*self.shared;
        let write = shared.write.load(Ordering::Relaxed);
        let next = shared.advance(write);
        if next == shared.read.load(Ordering::Acquire) {
            shared.overflows.fetch_add(1, Ordering::Relaxed);
            return Err(BufferOverflow);
        }

        // SAFETY: `write` is outside the readable window until published below.
        unsafe {
            *shared.slots[write].get() = byte;
        }
        shared.write.store(next, Ordering::Release);
        Ok(())
    }

    /// Usable capacity in bytes
    pub fn capacity(&self) -> usize {
        self.shared.slots.len() - 1
    }
}

/// Consumer end, owned by the main loop
pub struct Consumer {
    shared: Arc<Shared>,
}

impl Consumer {
    /// Take the oldest unread byte, or `None` if the buffer is empty
    pub fn try_pop(&mut self) -> Option<u8> {
        let shared = &*self.shared;
        let read = shared.read.load(Ordering::Relaxed);
        if read == shared.write.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `read` is inside the readable window published by the producer.
        let byte = unsafe { *shared.slots[read].get() };
        shared.read.store(shared.advance(read), Ordering::Release);
        Some(byte)
    }

    /// Offset from the read cursor to the first line feed, without consuming.
    ///
    /// An offset of `0` means the next unread byte is the terminator.
    pub fn peek_line_end(&self) -> Option<usize> {
        let shared = &*self.shared;
        let read = shared.read.load(Ordering::Relaxed);
        let write = shared.write.load(Ordering::Acquire);

        let mut cursor = read;
        let mut offset = 0;
        while cursor != write {
            // SAFETY: every slot between `read` and the observed `write` is readable.
            if unsafe { *shared.slots[cursor].get() } == LINE_FEED {
                return Some(offset);
            }
            cursor = shared.advance(cursor);
            offset += 1;
        }
        None
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        let shared = &*self.shared;
        shared.distance(
            shared.read.load(Ordering::Relaxed),
            shared.write.load(Ordering::Acquire),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity in bytes
    pub fn capacity(&self) -> usize {
        self.shared.slots.len() - 1
    }

    /// Total bytes rejected by the producer so far
    pub fn overflow_count(&self) -> usize {
        self.shared.overflows.load(Ordering::Relaxed)
    }
}
