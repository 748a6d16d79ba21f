#![forbid(unsafe_code)]

//! Push-based streams for Tether.
//!
//! - [`Observable`]: a cold, cloneable stream recipe with synchronous
//!   operators.
//! - [`Subject`]: a hot multicast source, the backing store of every
//!   callback stream a delegate proxy exposes.
//! - [`Observer`]: the receiving end, enforcing at-most-one terminal event.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Architecture
//!
//! Everything is single-threaded: shared state lives in `Rc<RefCell<..>>`,
//! so none of these types are `Send`. Emission runs on the caller's stack
//! with no queuing.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. No value is delivered after a completion.
//! 3. Disposing a [`Subscription`] stops delivery immediately, including for
//!    an emission already in progress.

pub mod event;
pub mod observable;
pub mod subject;
pub mod subscription;

pub use event::{Event, Observer};
pub use observable::Observable;
pub use subject::Subject;
pub use subscription::{CompositeSubscription, SerialSubscription, Subscription};
