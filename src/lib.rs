//! A concurrent, growable pool for reusing factory-constructed data.
//!
//! # Features
//!
//! - Unbounded: idle data is kept in a single shared array that grows by half
//!   when full, to maximize reuse across threads.
//! - Pluggable [`DataFactory`] that creates and destroys the pooled data.
//!   The pool never inspects what it stores.
//! - Thread-safe: multiple threads can borrow and recycle concurrently. Data
//!   creation in [`Pool::borrow`] and destruction in [`Pool::reset`] run outside
//!   of the pool lock.
//! - [`Pool::reset`] swaps in a new factory, destroying pooled data with the old one.
//! - Optional `tracing` feature to observe growth and reset events.
//!
//! # Examples
//!
//! ## Borrow and recycle
//!
//! ```rust
//! use data_pool::{DataFactory, Pool};
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! struct SessionFactory;
//!
//! impl DataFactory for SessionFactory {
//!     type Data = Vec<u8>;
//!     type Error = Infallible;
//!
//!     fn create_data(&self) -> Result<Vec<u8>, Infallible> {
//!         Ok(Vec::with_capacity(1 << 16))
//!     }
//! }
//!
//! let pool = Pool::new(Arc::new(SessionFactory));
//! pool.reserve(2).unwrap();
//!
//! let mut session = pool.borrow().unwrap();
//! session.extend_from_slice(b"request");
//! session.clear();
//! pool.recycle(session);
//!
//! let stat = pool.stat();
//! assert_eq!(stat.idle, 2);
//! assert_eq!(stat.created, 2);
//! ```
//!
//! ## Multiple threads shared pool
//!
//! ```rust
//! use data_pool::{FnFactory, Pool};
//! use std::convert::Infallible;
//! use std::sync::{Arc, mpsc};
//!
//! let pool = Arc::new(Pool::new(Arc::new(FnFactory::new(|| Ok::<_, Infallible>(0u32)))));
//!
//! let (tx, rx) = mpsc::channel();
//! let clone_pool = pool.clone();
//! let tx1 = tx.clone();
//! let sender1 = std::thread::spawn(move || {
//!     let item = clone_pool.pull_owned_with(|x| *x = 1).unwrap();
//!     tx1.send((1, item)).unwrap();
//! });
//!
//! let clone_pool = pool.clone();
//! let sender2 = std::thread::spawn(move || {
//!     let item = clone_pool.pull_owned_with(|x| *x = 2).unwrap();
//!     tx.send((2, item)).unwrap();
//! });
//!
//! let receiver = std::thread::spawn(move || {
//!     for _ in 0..2 {
//!         let (id, item) = rx.recv().unwrap();
//!         assert_eq!(*item, id);
//!     }
//! });
//!
//! sender1.join().unwrap();
//! sender2.join().unwrap();
//! receiver.join().unwrap();
//! assert_eq!(pool.stat().idle, 2);
//! ```

mod builder;
mod entry;
mod error;
mod factory;
mod pool;

pub use builder::Builder;
pub use entry::{Entry, OwnedEntry};
pub use error::Error;
pub use factory::{DataFactory, FnFactory};
pub use pool::{
    Config, DEFAULT_INITIAL_CAPACITY, GROWTH_DENOMINATOR, GROWTH_NUMERATOR, Pool, Stat,
};
