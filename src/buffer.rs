//! Flat per-element buffers and a pool of reusable scratch buffers.

use crate::element::{ElementCount, ElementIndex};
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec as AllocVec;
use core::cell::RefCell;
use core::ops::{Deref, DerefMut, Index, IndexMut};

/// A fixed-size, index-addressed array of element attributes.
///
/// The buffer is allocated once with `buffer_size` slots (the padded element
/// count); `element_count` is the number of slots that hold real elements.
#[derive(Clone, Debug)]
pub struct Buffer<T> {
    data: AllocVec<T>,
    element_count: ElementCount,
}

impl<T: Clone> Buffer<T> {
    pub fn new(buffer_size: ElementCount, element_count: ElementCount, fill: T) -> Self {
        debug_assert!(element_count <= buffer_size);
        Buffer {
            data: vec![fill; buffer_size as usize],
            element_count,
        }
    }

    /// Overwrite every slot, padding included.
    pub fn fill(&mut self, value: T) {
        for slot in self.data.iter_mut() {
            *slot = value.clone();
        }
    }
}

impl<T> Buffer<T> {
    pub fn element_count(&self) -> ElementCount {
        self.element_count
    }

    pub fn buffer_size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<ElementIndex> for Buffer<T> {
    type Output = T;

    fn index(&self, index: ElementIndex) -> &T {
        &self.data[index as usize]
    }
}

impl<T> IndexMut<ElementIndex> for Buffer<T> {
    fn index_mut(&mut self, index: ElementIndex) -> &mut T {
        &mut self.data[index as usize]
    }
}

struct Pool<T> {
    free: AllocVec<Buffer<T>>,
    outstanding: usize,
}

/// Hands out scratch buffers sized to a container's capacity and takes them
/// back when the returned guard is dropped, so per-step computations do not
/// touch the heap once the pool is warm.
///
/// Requesting more than `max_outstanding` buffers at once panics: it means a
/// caller is holding buffers it should have returned.
pub struct BufferAllocator<T> {
    buffer_size: ElementCount,
    element_count: ElementCount,
    max_outstanding: usize,
    pool: Rc<RefCell<Pool<T>>>,
}

/// Default number of scratch buffers that may be out at the same time.
pub const DEFAULT_MAX_OUTSTANDING_BUFFERS: usize = 4;

impl<T: Clone + Default> BufferAllocator<T> {
    pub fn new(buffer_size: ElementCount, element_count: ElementCount) -> Self {
        Self::with_max_outstanding(buffer_size, element_count, DEFAULT_MAX_OUTSTANDING_BUFFERS)
    }

    pub fn with_max_outstanding(
        buffer_size: ElementCount,
        element_count: ElementCount,
        max_outstanding: usize,
    ) -> Self {
        BufferAllocator {
            buffer_size,
            element_count,
            max_outstanding,
            pool: Rc::new(RefCell::new(Pool { free: AllocVec::new(), outstanding: 0 })),
        }
    }

    /// Take a buffer out of the pool, creating it on first use.
    ///
    /// The contents are whatever the previous user left behind; callers that
    /// accumulate must `fill` first.
    pub fn allocate(&self) -> PooledBuffer<T> {
        let mut pool = self.pool.borrow_mut();
        assert!(
            pool.outstanding < self.max_outstanding,
            "scratch buffer pool exhausted: {} buffers already outstanding",
            pool.outstanding
        );
        pool.outstanding += 1;
        let buffer = pool
            .free
            .pop()
            .unwrap_or_else(|| Buffer::new(self.buffer_size, self.element_count, T::default()));
        PooledBuffer { buffer: Some(buffer), pool: Rc::clone(&self.pool) }
    }

    /// Number of buffers currently handed out.
    pub fn outstanding(&self) -> usize {
        self.pool.borrow().outstanding
    }

    /// Number of buffers waiting in the pool.
    pub fn available(&self) -> usize {
        self.pool.borrow().free.len()
    }
}

/// A scratch buffer on loan from a [`BufferAllocator`].
pub struct PooledBuffer<T> {
    buffer: Option<Buffer<T>>,
    pool: Rc<RefCell<Pool<T>>>,
}

impl<T> Deref for PooledBuffer<T> {
    type Target = Buffer<T>;

    fn deref(&self) -> &Buffer<T> {
        // Only `drop` takes the buffer out.
        match &self.buffer {
            Some(buffer) => buffer,
            None => unreachable!("pooled buffer used after release"),
        }
    }
}

impl<T> DerefMut for PooledBuffer<T> {
    fn deref_mut(&mut self) -> &mut Buffer<T> {
        match &mut self.buffer {
            Some(buffer) => buffer,
            None => unreachable!("pooled buffer used after release"),
        }
    }
}

impl<T> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let mut pool = self.pool.borrow_mut();
            pool.outstanding -= 1;
            pool.free.push(buffer);
        }
    }
}
