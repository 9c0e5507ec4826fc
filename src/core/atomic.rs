use std::sync::Mutex;

/// Mutual-exclusion wrapper around one mutable value.
///
/// Every piece of shared state in this crate (rejection slots, observer
/// lists, the snapshot first-error slot) is guarded by its own `Locked`
/// instance rather than a shared global lock, so independent operations
/// never contend and nested sections on different containers cannot
/// deadlock. Critical sections must stay short: no I/O inside `modify`.
pub struct Locked<T> {
    inner: Mutex<T>,
}

impl<T> Locked<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Runs `f` with exclusive access to the value. No other `get`, `set`,
    /// or `modify` on this container can observe an intermediate state.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn set(&self, value: T) {
        self.modify(|v| *v = value);
    }
}

impl<T: Clone> Locked<T> {
    pub fn get(&self) -> T {
        self.modify(|v| v.clone())
    }
}

impl<T> Locked<T> {
    /// Consumes the container, returning the inner value once no other
    /// handle can touch it.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Default> Default for Locked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Locked<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Ok(guard) => f.debug_tuple("Locked").field(&*guard).finish(),
            Err(_) => f.write_str("Locked(<held>)"),
        }
    }
}
