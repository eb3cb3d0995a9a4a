use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

use data_pool::{Builder, DataFactory, Error, FnFactory, Pool};

#[derive(Debug, thiserror::Error)]
#[error("out of sessions")]
struct OutOfSessions;

/// Creates at most `limit` values.
struct Limited {
    created: AtomicUsize,
    limit: usize,
}

impl DataFactory for Limited {
    type Data = usize;
    type Error = OutOfSessions;

    fn create_data(&self) -> Result<usize, OutOfSessions> {
        let n = self.created.fetch_add(1, SeqCst);
        if n >= self.limit {
            return Err(OutOfSessions);
        }
        Ok(n)
    }
}

fn limited(limit: usize) -> Arc<Limited> {
    Arc::new(Limited {
        created: AtomicUsize::new(0),
        limit,
    })
}

#[test]
fn build_pool() {
    let mut builder = Builder::new();
    let pool = builder.factory(limited(100)).prealloc(5).build();
    assert_eq!(pool.capacity(), 5);
    assert_eq!(pool.stat().idle, 5);
    assert_eq!(pool.created(), 5);
}

#[test]
fn build_without_factory() {
    let pool: Pool<Limited> = Builder::new().build();
    assert!(pool.factory().is_none());
    assert!(matches!(pool.borrow(), Err(Error::NoFactory)));
}

#[test]
fn build_with_initial_capacity() {
    let pool = Builder::new().factory(limited(100)).initial_capacity(4).build();
    pool.recycle(pool.borrow().unwrap());
    assert_eq!(pool.capacity(), 4);
    for _ in 0..4 {
        pool.recycle(7);
    }
    assert_eq!(pool.capacity(), 6);
}

#[test]
fn build_with_zero_initial_capacity() {
    let pool = Builder::new().factory(limited(100)).initial_capacity(0).build();
    pool.recycle(1);
    assert_eq!(pool.capacity(), 1);
    pool.recycle(2);
    assert_eq!(pool.capacity(), 2);
    pool.recycle(3);
    assert_eq!(pool.capacity(), 3);
}

#[test]
fn build_keeps_partial_prealloc() {
    let pool = Builder::new().factory(limited(3)).prealloc(10).build();
    assert_eq!(pool.stat().idle, 3);
    assert_eq!(pool.capacity(), 10);
}

#[test]
fn try_build_reports_prealloc_failure() {
    let err = Builder::new()
        .factory(limited(3))
        .prealloc(10)
        .try_build()
        .unwrap_err();
    assert!(matches!(err, Error::Create(OutOfSessions)));
    assert_eq!(err.to_string(), "data factory failed to create data");

    let pool = Builder::new()
        .factory(limited(3))
        .prealloc(3)
        .try_build()
        .unwrap();
    assert_eq!(pool.stat().idle, 3);
}

#[test]
fn build_with_closure_factory() {
    let factory = Arc::new(FnFactory::new(|| Ok::<_, Infallible>(String::from("fresh"))));
    let pool = Builder::new().factory(factory).prealloc(2).build();
    assert_eq!(pool.borrow().unwrap(), "fresh");
    assert_eq!(pool.stat().idle, 1);
}

#[test]
fn build_with_trait_object_factory() {
    type Dyn = dyn DataFactory<Data = usize, Error = OutOfSessions>;
    let first: Arc<Dyn> = limited(10);
    let pool: Pool<Dyn> = Builder::new().factory(first).prealloc(2).build();
    assert_eq!(pool.created(), 2);

    let second: Arc<Dyn> = Arc::new(FnFactory::new(|| Ok::<_, OutOfSessions>(42usize)));
    pool.reset(Some(second));
    assert_eq!(pool.borrow().unwrap(), 42);
}

#[cfg(feature = "serde")]
#[test]
fn config_from_json() {
    use data_pool::Config;

    let config: Config = serde_json::from_str(r#"{"prealloc":2}"#).unwrap();
    assert_eq!(
        config,
        Config {
            initial_capacity: data_pool::DEFAULT_INITIAL_CAPACITY,
            prealloc: 2,
        }
    );
    let pool = Pool::with_config(Some(limited(10)), config);
    assert_eq!(pool.stat().idle, 2);
}
