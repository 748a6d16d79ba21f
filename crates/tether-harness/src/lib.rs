#![forbid(unsafe_code)]

//! Test harness for Tether streams.
//!
//! # Role in Tether
//! Stream tests need to say *when* things happen. This crate supplies a
//! virtual clock and recorders so a test can script a hot source, drive the
//! clock, and compare what an observer saw against an expected timeline.
//!
//! # Pieces
//! - [`TestScheduler`]: virtual clock and action queue; [`TestScheduler::start`]
//!   runs the created/subscribed/disposed lifecycle.
//! - [`HotObservable`]: scheduled multicast source with a subscription log.
//! - [`TestObserver`]: time-stamped recording observer.
//! - [`Recorded`], [`next`], [`completed`]: expected-timeline helpers.
//!
//! ```
//! use tether_harness::{completed, next, TestScheduler};
//!
//! let scheduler = TestScheduler::new();
//! let hot = scheduler.create_hot_observable(vec![next(250, false), next(300, true), completed(400)]);
//! let source = hot.as_observable();
//! let recorder = scheduler.start(move || source);
//!
//! assert_eq!(
//!     recorder.events(),
//!     vec![next(250, false), next(300, true), completed(400)]
//! );
//! ```

pub mod recorder;
pub mod scheduler;

pub use recorder::{Recorded, TestObserver, VirtualTime, completed, next};
pub use scheduler::{CREATED, DISPOSED, HotObservable, SUBSCRIBED, SubscriptionSpan, TestScheduler};
