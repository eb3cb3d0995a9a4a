use std::fmt::Debug;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{DataFactory, Pool};

/// Data borrowed from a [`Pool`].
///
/// `Entry` holds the borrowed data and a reference to the [`Pool`].
/// When the `Entry` is dropped, the data is recycled into the pool.
pub struct Entry<'a, F: DataFactory + ?Sized> {
    // `data` is always `Some` until it is taken on drop or in `into_inner`.
    data: Option<F::Data>,
    pool: &'a Pool<F>,
}

impl<'a, F: DataFactory + ?Sized> Entry<'a, F> {
    pub(crate) fn new(data: F::Data, pool: &'a Pool<F>) -> Self {
        Self {
            data: Some(data),
            pool,
        }
    }

    /// Get the pool this entry was borrowed from.
    pub fn pool(&self) -> &'a Pool<F> {
        self.pool
    }

    /// Detach the data from the entry without recycling it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use data_pool::{FnFactory, Pool};
    /// use std::convert::Infallible;
    /// use std::sync::Arc;
    ///
    /// let pool = Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(5u8))));
    /// let data = pool.pull().unwrap().into_inner();
    /// assert_eq!(pool.stat().idle, 0);
    /// pool.recycle(data);
    /// assert_eq!(pool.stat().idle, 1);
    /// ```
    pub fn into_inner(mut self) -> F::Data {
        self.data.take().unwrap()
    }
}

impl<F: DataFactory + ?Sized> Drop for Entry<'_, F> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            self.pool.recycle(data);
        }
    }
}

impl<F: DataFactory + ?Sized> Deref for Entry<'_, F> {
    type Target = F::Data;
    fn deref(&self) -> &Self::Target {
        self.data.as_ref().unwrap()
    }
}

impl<F: DataFactory + ?Sized> DerefMut for Entry<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data.as_mut().unwrap()
    }
}

impl<F> Debug for Entry<'_, F>
where
    F: DataFactory + ?Sized,
    F::Data: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Entry").field(&**self).finish()
    }
}

#[cfg(feature = "serde")]
impl<F> serde::Serialize for Entry<'_, F>
where
    F: DataFactory + ?Sized,
    F::Data: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (**self).serialize(serializer)
    }
}

/// Owned data borrowed from a [`Pool`].
///
/// `OwnedEntry` holds the borrowed data and an `Arc` reference to the
/// [`Pool`], so it can be sent to other threads independently of the pool.
/// When the `OwnedEntry` is dropped, the data is recycled into the pool.
pub struct OwnedEntry<F: DataFactory + ?Sized> {
    // `data` is always `Some` until it is taken on drop or in `into_inner`.
    data: Option<F::Data>,
    pool: Arc<Pool<F>>,
}

impl<F: DataFactory + ?Sized> OwnedEntry<F> {
    pub(crate) fn new(data: F::Data, pool: Arc<Pool<F>>) -> Self {
        Self {
            data: Some(data),
            pool,
        }
    }

    /// Get the pool this entry was borrowed from.
    pub fn pool(&self) -> &Arc<Pool<F>> {
        &self.pool
    }

    /// Detach the data from the entry without recycling it.
    pub fn into_inner(mut self) -> F::Data {
        self.data.take().unwrap()
    }
}

impl<F: DataFactory + ?Sized> Drop for OwnedEntry<F> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            self.pool.recycle(data);
        }
    }
}

impl<F: DataFactory + ?Sized> Deref for OwnedEntry<F> {
    type Target = F::Data;
    fn deref(&self) -> &Self::Target {
        self.data.as_ref().unwrap()
    }
}

impl<F: DataFactory + ?Sized> DerefMut for OwnedEntry<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data.as_mut().unwrap()
    }
}

impl<F> Debug for OwnedEntry<F>
where
    F: DataFactory + ?Sized,
    F::Data: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OwnedEntry").field(&**self).finish()
    }
}

#[cfg(feature = "serde")]
impl<F> serde::Serialize for OwnedEntry<F>
where
    F: DataFactory + ?Sized,
    F::Data: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (**self).serialize(serializer)
    }
}
