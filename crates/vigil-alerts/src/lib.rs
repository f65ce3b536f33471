//! # vigil-alerts
//!
//! Alert lifecycle management: deduplication, dismissal, expiry and
//! subscriptions.
//!
//! The crate is split along the sync/async seam:
//!
//! - [`store::AlertStore`] is the pure state machine. All operations take
//!   the current time as a parameter.
//! - [`service::AlertService`] is the async shell: a single drain task
//!   serializes admissions, a ticker runs the expiry sweep, and
//!   subscribers are notified after each accepted alert.

pub mod service;
pub mod store;
pub mod subscription;

pub use service::{AlertService, AlertServiceConfig};
pub use store::{Admission, AlertStatistics, AlertStore, RetentionPolicy, EXPIRY_REASON};
pub use subscription::{AlertCallback, SubscriptionFilter, SubscriptionId};
