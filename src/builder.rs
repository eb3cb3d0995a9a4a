use std::sync::Arc;

use crate::{Config, DataFactory, Error, Pool};

/// A builder for creating a [`Pool`] with custom configuration.
///
/// # Example
///
/// ```rust
/// use data_pool::{Builder, FnFactory};
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// let pool = Builder::new()
///     .factory(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(0usize))))
///     .initial_capacity(16)
///     .prealloc(4)
///     .build();
/// assert_eq!(pool.stat().idle, 4);
/// assert_eq!(pool.capacity(), 4);
/// ```
pub struct Builder<F: DataFactory + ?Sized> {
    /// Configuration of the pool.
    config: Config,
    factory: Option<Arc<F>>,
}

impl<F: DataFactory + ?Sized> Default for Builder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: DataFactory + ?Sized> Builder<F> {
    /// Create a new builder with default configuration and no factory.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            factory: None,
        }
    }

    /// Set the factory the pool creates and destroys data with.
    pub fn factory(&mut self, factory: Arc<F>) -> &mut Self {
        self.factory = Some(factory);
        self
    }

    /// Set the capacity allocated when data is recycled into an empty pool.
    pub fn initial_capacity(&mut self, capacity: usize) -> &mut Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Set the number of items created when the pool is built.
    pub fn prealloc(&mut self, prealloc: usize) -> &mut Self {
        self.config.prealloc = prealloc;
        self
    }

    /// Build the pool with the current configuration.
    ///
    /// Preallocation is best-effort and stops at the first failure.
    pub fn build(&mut self) -> Pool<F> {
        let config = std::mem::take(&mut self.config);
        Pool::with_config(self.factory.take(), config)
    }

    /// Build the pool, failing if preallocation could not be completed.
    pub fn try_build(&mut self) -> Result<Pool<F>, Error<F::Error>> {
        let config = std::mem::take(&mut self.config);
        Pool::try_with_config(self.factory.take(), config)
    }
}
