/// Failure indicator returned by [`Pool::borrow`](crate::Pool::borrow) and
/// [`Pool::reserve`](crate::Pool::reserve).
///
/// Failing to grow the pool's own storage is never reported here: reserving
/// just stops, and recycling hands the data back to the factory instead.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// No factory is installed, so nothing can be created.
    #[error("no data factory is installed in the pool")]
    NoFactory,
    /// The factory failed to create new data.
    #[error("data factory failed to create data")]
    Create(#[source] E),
}

impl<E> Error<E> {
    /// Returns the factory error, if that is what failed.
    pub fn into_create_error(self) -> Option<E> {
        match self {
            Error::NoFactory => None,
            Error::Create(e) => Some(e),
        }
    }
}
