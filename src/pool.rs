use std::cmp::max;
use std::collections::TryReserveError;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::*;

use parking_lot::Mutex;

use crate::{DataFactory, Entry, Error, OwnedEntry};

/// Slot count allocated by the first [`Pool::recycle`] into an empty pool.
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Storage grows to `capacity * GROWTH_NUMERATOR / GROWTH_DENOMINATOR`.
pub const GROWTH_NUMERATOR: usize = 3;
/// See [`GROWTH_NUMERATOR`].
pub const GROWTH_DENOMINATOR: usize = 2;

/// A concurrent, unbounded pool of factory-constructed data.
///
/// Idle data is kept in a single array shared by all threads to maximize
/// reuse. Data is either taken from the pool or created through the
/// [`DataFactory`] on [`borrow`](Pool::borrow), and handed back with
/// [`recycle`](Pool::recycle). The pool never inspects the data.
///
/// All bookkeeping is guarded by one mutex. Factory calls in `borrow` and in
/// `reset` are made outside of it, so a slow factory does not stall other
/// threads.
///
/// # Examples
///
/// ```rust
/// use data_pool::{FnFactory, Pool};
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// let pool = Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(vec![0u8; 1024]))));
/// pool.reserve(4).unwrap();
/// assert_eq!(pool.stat().idle, 4);
///
/// let buf = pool.borrow().unwrap();
/// assert_eq!(buf.len(), 1024);
/// assert_eq!(pool.stat().idle, 3);
///
/// pool.recycle(buf);
/// assert_eq!(pool.stat().idle, 4);
/// assert_eq!(pool.stat().created, 4);
/// ```
pub struct Pool<F: DataFactory + ?Sized> {
    inner: Mutex<Inner<F>>,
    /// Number of idle items. Written under the lock, peeked without it.
    size: AtomicUsize,
    /// Logical capacity of the storage. Written under the lock, peeked without it.
    capacity: AtomicUsize,
    /// Items created since the last reset. Diagnostic only.
    created: AtomicUsize,
    /// Capacity used when `recycle` grows an empty storage.
    initial_capacity: usize,
}

struct Inner<F: DataFactory + ?Sized> {
    /// `idle[..]` are live items; `idle.len() <= capacity`.
    idle: Vec<F::Data>,
    capacity: usize,
    factory: Option<Arc<F>>,
}

impl<F: DataFactory + ?Sized> Inner<F> {
    /// Make room for `new_cap` items in total.
    fn grow_to(&mut self, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(new_cap > self.capacity);
        self.idle.try_reserve_exact(new_cap - self.idle.len())?;
        self.capacity = new_cap;
        Ok(())
    }
}

/// Point-in-time counters of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    /// Items currently idle in the pool.
    pub idle: usize,
    /// Items created through the factory since the last reset.
    pub created: usize,
}

/// Configuration of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Capacity allocated when recycling into a pool without storage.
    pub initial_capacity: usize,
    /// Number of items to create when the pool is built.
    pub prealloc: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            prealloc: 0,
        }
    }
}

impl Config {
    pub(crate) fn post_process(&mut self) {
        if self.initial_capacity == 0 {
            self.initial_capacity = 1;
        }
    }
}

/// Geometric growth step; always grows by at least one slot.
pub(crate) fn grown_capacity(capacity: usize) -> usize {
    max(
        capacity.saturating_mul(GROWTH_NUMERATOR) / GROWTH_DENOMINATOR,
        capacity.saturating_add(1),
    )
}

impl<F: DataFactory + ?Sized> Drop for Pool<F> {
    fn drop(&mut self) {
        self.reset(None);
    }
}

impl<F: DataFactory + ?Sized> std::fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.size.load(Relaxed))
            .field("capacity", &self.capacity.load(Relaxed))
            .field("created", &self.created.load(Relaxed))
            .field("initial_capacity", &self.initial_capacity)
            .finish_non_exhaustive()
    }
}

impl<F: DataFactory + ?Sized> Pool<F> {
    /// Create an empty pool bound to `factory`. Nothing is created eagerly.
    pub fn new(factory: Arc<F>) -> Self {
        Self::with_factory(Some(factory), Config::default())
    }

    /// Create a pool without a factory.
    ///
    /// Borrowing from it fails with [`Error::NoFactory`] until a factory is
    /// installed with [`reset`](Pool::reset), but recycled data is still kept.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{Error, FnFactory, Pool};
    /// use std::convert::Infallible;
    ///
    /// type Factory = FnFactory<fn() -> Result<u32, Infallible>, u32, Infallible>;
    ///
    /// let pool: Pool<Factory> = Pool::empty();
    /// assert!(matches!(pool.borrow(), Err(Error::NoFactory)));
    /// pool.recycle(7);
    /// assert_eq!(pool.borrow().unwrap(), 7);
    /// ```
    pub fn empty() -> Self {
        Self::with_factory(None, Config::default())
    }

    /// Create a pool with the given configuration, creating `config.prealloc`
    /// items up front on a best-effort basis.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{Config, FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let mut config = Config::default();
    /// config.prealloc = 8;
    /// let factory = Arc::new(FnFactory::new(|| Ok::<_, Infallible>(0u64)));
    /// let pool = Pool::with_config(Some(factory), config);
    /// assert_eq!(pool.stat().idle, 8);
    /// assert_eq!(pool.capacity(), 8);
    /// ```
    pub fn with_config(factory: Option<Arc<F>>, config: Config) -> Self {
        let prealloc = config.prealloc;
        let pool = Self::with_factory(factory, config);
        if prealloc > 0 {
            // Stops at the first failure; whatever was created stays pooled.
            let _ = pool.reserve(prealloc);
        }
        pool
    }

    /// Like [`with_config`](Pool::with_config), but fails if the
    /// preallocation could not be completed.
    pub fn try_with_config(
        factory: Option<Arc<F>>,
        config: Config,
    ) -> Result<Self, Error<F::Error>> {
        let prealloc = config.prealloc;
        let pool = Self::with_factory(factory, config);
        if prealloc > 0 {
            pool.reserve(prealloc)?;
        }
        Ok(pool)
    }

    fn with_factory(factory: Option<Arc<F>>, mut config: Config) -> Self {
        config.post_process();
        Self {
            inner: Mutex::new(Inner {
                idle: Vec::new(),
                capacity: 0,
                factory,
            }),
            size: AtomicUsize::new(0),
            capacity: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            initial_capacity: config.initial_capacity,
        }
    }

    /// Get the currently installed factory.
    pub fn factory(&self) -> Option<Arc<F>> {
        self.inner.lock().factory.clone()
    }

    /// Get the current storage capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Get the number of idle items.
    pub fn idle(&self) -> usize {
        self.inner.lock().idle.len()
    }

    /// Get the number of items created since the last reset.
    pub fn created(&self) -> usize {
        self.created.load(Relaxed)
    }

    /// Get a best-effort snapshot of the pool counters.
    ///
    /// Neither counter takes the lock; each is read atomically, but the pair
    /// is not ordered against concurrent operations.
    pub fn stat(&self) -> Stat {
        Stat {
            idle: self.size.load(Relaxed),
            created: self.created.load(Relaxed),
        }
    }

    /// Detach all idle items and the factory, destroy the items with the old
    /// factory, then install `factory` with empty storage and zeroed counters.
    ///
    /// Destruction happens after the lock is released. If no factory was
    /// installed, the detached items are dropped without being handed to any
    /// factory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// type Create = fn() -> Result<u8, Infallible>;
    ///
    /// let pool = Pool::new(Arc::new(FnFactory::new((|| Ok::<_, Infallible>(1u8)) as Create)));
    /// pool.reserve(3).unwrap();
    /// pool.reset(Some(Arc::new(FnFactory::new((|| Ok::<_, Infallible>(2u8)) as Create))));
    /// assert_eq!(pool.stat().idle, 0);
    /// assert_eq!(pool.created(), 0);
    /// assert_eq!(pool.borrow().unwrap(), 2);
    /// ```
    pub fn reset(&self, factory: Option<Arc<F>>) {
        let (saved, saved_factory) = {
            let mut inner = self.inner.lock();
            let saved = mem::take(&mut inner.idle);
            let saved_factory = mem::replace(&mut inner.factory, factory);
            inner.capacity = 0;
            self.size.store(0, Relaxed);
            self.capacity.store(0, Relaxed);
            self.created.store(0, Relaxed);
            (saved, saved_factory)
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            destroyed = saved.len(),
            had_factory = saved_factory.is_some(),
            "pool reset"
        );

        if let Some(factory) = saved_factory {
            for data in saved {
                factory.destroy_data(data);
            }
        }
    }

    /// Ensure the storage can hold `n` items and fill the pool up to `n`
    /// idle items.
    ///
    /// Returns at once if the capacity already covers `n`. Storage grows to
    /// `max(capacity * 3 / 2, n)`; if that allocation fails, nothing more is
    /// reserved and `Ok` is returned. Creation stops at the first factory
    /// failure, which is returned, keeping whatever was created so far.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let pool = Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(()))));
    /// pool.reserve(10).unwrap();
    /// assert_eq!(pool.capacity(), 10);
    /// pool.reserve(12).unwrap();
    /// assert_eq!(pool.capacity(), 15);
    /// assert_eq!(pool.stat().idle, 12);
    /// ```
    pub fn reserve(&self, n: usize) -> Result<(), Error<F::Error>> {
        if self.capacity.load(Relaxed) >= n {
            return Ok(());
        }
        let mut inner = self.inner.lock();
        if inner.capacity >= n {
            return Ok(());
        }
        let Some(factory) = inner.factory.clone() else {
            return Err(Error::NoFactory);
        };

        let new_cap = max(grown_capacity(inner.capacity), n);
        if inner.grow_to(new_cap).is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                requested = new_cap,
                "pool storage allocation failed in reserve"
            );
            return Ok(());
        }
        self.capacity.store(new_cap, Relaxed);

        #[cfg(feature = "tracing")]
        tracing::trace!(capacity = new_cap, "pool storage grown by reserve");

        let mut result = Ok(());
        while inner.idle.len() < n {
            match factory.create_data() {
                Ok(data) => {
                    self.created.fetch_add(1, Relaxed);
                    inner.idle.push(data);
                }
                Err(e) => {
                    result = Err(Error::Create(e));
                    break;
                }
            }
        }
        self.size.store(inner.idle.len(), Relaxed);
        result
    }

    /// Take an idle item, or create one through the factory if none is idle.
    ///
    /// The data is owned by the caller until it is handed back with
    /// [`recycle`](Pool::recycle). Creation runs without holding the lock.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let pool = Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(String::new()))));
    /// let mut s = pool.borrow().unwrap();
    /// s.push_str("session");
    /// pool.recycle(s);
    /// assert_eq!(pool.borrow().unwrap(), "session");
    /// assert_eq!(pool.created(), 1);
    /// ```
    pub fn borrow(&self) -> Result<F::Data, Error<F::Error>> {
        // Unlocked peek; a stale value only costs a lock that finds nothing.
        let factory = if self.size.load(Relaxed) > 0 {
            let mut inner = self.inner.lock();
            if let Some(data) = inner.idle.pop() {
                self.size.store(inner.idle.len(), Relaxed);
                return Ok(data);
            }
            inner.factory.clone()
        } else {
            self.factory()
        };

        let factory = factory.ok_or(Error::NoFactory)?;
        let data = factory.create_data().map_err(Error::Create)?;
        self.created.fetch_add(1, Relaxed);
        Ok(data)
    }

    /// Hand data back to the pool for reuse.
    ///
    /// When the storage is full it grows to 128 slots (or the configured
    /// initial capacity) if empty, else by half. If that allocation fails the
    /// data is destroyed through the current factory instead.
    pub fn recycle(&self, data: F::Data) {
        let mut inner = self.inner.lock();
        if inner.idle.len() == inner.capacity {
            let new_cap = if inner.capacity == 0 {
                self.initial_capacity
            } else {
                grown_capacity(inner.capacity)
            };
            if inner.grow_to(new_cap).is_err() {
                let factory = inner.factory.clone();
                drop(inner);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    requested = new_cap,
                    "pool storage allocation failed, destroying data"
                );

                match factory {
                    Some(factory) => factory.destroy_data(data),
                    None => drop(data),
                }
                return;
            }
            self.capacity.store(new_cap, Relaxed);

            #[cfg(feature = "tracing")]
            tracing::trace!(capacity = new_cap, "pool storage grown by recycle");
        }
        inner.idle.push(data);
        self.size.store(inner.idle.len(), Relaxed);
    }

    /// Hand back optional data; `None` is a no-op.
    pub fn recycle_opt(&self, data: Option<F::Data>) {
        if let Some(data) = data {
            self.recycle(data);
        }
    }

    /// Borrow an item wrapped in an [`Entry`] that recycles it when dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let pool = Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(0u32))));
    /// {
    ///     let mut item = pool.pull().unwrap();
    ///     *item = 42;
    /// }
    /// assert_eq!(pool.stat().idle, 1);
    /// assert_eq!(*pool.pull().unwrap(), 42);
    /// ```
    pub fn pull(&self) -> Result<Entry<'_, F>, Error<F::Error>> {
        self.borrow().map(|data| Entry::new(data, self))
    }

    /// Borrow an item and apply `func` to it before handing it out.
    pub fn pull_with<I>(&self, func: I) -> Result<Entry<'_, F>, Error<F::Error>>
    where
        I: FnOnce(&mut F::Data),
    {
        self.pull().map(|mut entry| {
            func(&mut *entry);
            entry
        })
    }

    /// Borrow an item wrapped in an [`OwnedEntry`], which keeps the pool alive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let pool = Arc::new(Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(0u32)))));
    /// let item = pool.pull_owned().unwrap();
    /// std::thread::spawn(move || assert_eq!(*item, 0)).join().unwrap();
    /// assert_eq!(pool.stat().idle, 1);
    /// ```
    pub fn pull_owned(self: &Arc<Self>) -> Result<OwnedEntry<F>, Error<F::Error>> {
        self.borrow().map(|data| OwnedEntry::new(data, self.clone()))
    }

    /// Borrow an owned item and apply `func` to it before handing it out.
    pub fn pull_owned_with<I>(self: &Arc<Self>, func: I) -> Result<OwnedEntry<F>, Error<F::Error>>
    where
        I: FnOnce(&mut F::Data),
    {
        self.pull_owned().map(|mut entry| {
            func(&mut *entry);
            entry
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_is_one_and_a_half() {
        assert_eq!(grown_capacity(128), 192);
        assert_eq!(grown_capacity(192), 288);
        assert_eq!(grown_capacity(10), 15);
    }

    #[test]
    fn growth_always_makes_progress() {
        assert_eq!(grown_capacity(0), 1);
        assert_eq!(grown_capacity(1), 2);
        assert_eq!(grown_capacity(2), 3);
        assert_eq!(grown_capacity(usize::MAX - 1), usize::MAX);
    }

    #[test]
    fn zero_initial_capacity_is_normalized() {
        let mut config = Config {
            initial_capacity: 0,
            prealloc: 0,
        };
        config.post_process();
        assert_eq!(config.initial_capacity, 1);
    }

    #[test]
    fn failed_growth_keeps_storage() {
        struct Unit;
        impl DataFactory for Unit {
            type Data = u64;
            type Error = std::convert::Infallible;
            fn create_data(&self) -> Result<u64, Self::Error> {
                Ok(0)
            }
        }

        let mut inner: Inner<Unit> = Inner {
            idle: vec![1, 2, 3],
            capacity: 3,
            factory: None,
        };
        assert!(inner.grow_to(usize::MAX).is_err());
        assert_eq!(inner.capacity, 3);
        assert_eq!(inner.idle, vec![1, 2, 3]);
    }
}
