use parking_lot::RwLock;
use std::sync::Arc;

/// A shared, lock-guarded cell.
///
/// Used wherever a value must be mutated through a shared handle: the lazily
/// resolved backtrace of an error, the documents of a collection and the index
/// registry next to them.
pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

/// Runs a closure under the read lock of an [Atomic].
pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

/// Runs a closure under the write lock of an [Atomic].
///
/// The lock is held for the whole closure, so a multi-document update applied
/// through `write_with` is never observed half-done by a reader.
pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}
