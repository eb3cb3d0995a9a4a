use std::marker::PhantomData;
use std::sync::Arc;

/// Creates and destroys the data held by a [`Pool`](crate::Pool).
///
/// The pool never constructs or drops data by itself, it only decides *when*
/// to call into the factory. Both operations may be called concurrently from
/// any thread, and `destroy_data` may run on a different thread than the
/// `create_data` call that produced the value.
///
/// # Example
///
/// ```rust
/// use data_pool::DataFactory;
/// use std::convert::Infallible;
///
/// struct Buffers;
///
/// impl DataFactory for Buffers {
///     type Data = Vec<u8>;
///     type Error = Infallible;
///
///     fn create_data(&self) -> Result<Vec<u8>, Infallible> {
///         Ok(Vec::with_capacity(4096))
///     }
/// }
///
/// let buf = Buffers.create_data().unwrap();
/// assert_eq!(buf.capacity(), 4096);
/// ```
pub trait DataFactory: Send + Sync {
    /// The pooled data.
    type Data: Send;
    /// Returned when new data cannot be created.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Allocate and initialize one reusable value.
    fn create_data(&self) -> Result<Self::Data, Self::Error>;

    /// Release a value previously produced by `create_data` of this factory.
    ///
    /// The default implementation just drops it.
    fn destroy_data(&self, data: Self::Data) {
        drop(data);
    }
}

impl<F: DataFactory + ?Sized> DataFactory for Arc<F> {
    type Data = F::Data;
    type Error = F::Error;

    #[inline]
    fn create_data(&self) -> Result<Self::Data, Self::Error> {
        (**self).create_data()
    }

    #[inline]
    fn destroy_data(&self, data: Self::Data) {
        (**self).destroy_data(data)
    }
}

impl<F: DataFactory + ?Sized> DataFactory for Box<F> {
    type Data = F::Data;
    type Error = F::Error;

    #[inline]
    fn create_data(&self) -> Result<Self::Data, Self::Error> {
        (**self).create_data()
    }

    #[inline]
    fn destroy_data(&self, data: Self::Data) {
        (**self).destroy_data(data)
    }
}

/// A [`DataFactory`] built from a closure. Destruction drops the value.
///
/// # Example
///
/// ```rust
/// use data_pool::{FnFactory, Pool};
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// let factory = FnFactory::new(|| Ok::<_, Infallible>(String::with_capacity(64)));
/// let pool = Pool::new(Arc::new(factory));
/// let s = pool.borrow().unwrap();
/// assert!(s.capacity() >= 64);
/// ```
pub struct FnFactory<C, T, E> {
    create: C,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<C, T, E> FnFactory<C, T, E>
where
    C: Fn() -> Result<T, E>,
{
    /// Wrap a creation closure.
    pub fn new(create: C) -> Self {
        Self {
            create,
            _marker: PhantomData,
        }
    }
}

impl<C, T, E> std::fmt::Debug for FnFactory<C, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}

impl<C, T, E> DataFactory for FnFactory<C, T, E>
where
    C: Fn() -> Result<T, E> + Send + Sync,
    T: Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Data = T;
    type Error = E;

    #[inline]
    fn create_data(&self) -> Result<T, E> {
        (self.create)()
    }
}
