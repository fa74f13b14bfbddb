// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Entity-scoped logging for the Brunel simulator.
//!
//! Every part of a model owns an [`Entity`](crate::entity::Entity) so that
//! log messages carry the full hierarchical path of the component that
//! emitted them (`top::ep_b::front::queue0`). The macros in this crate wrap
//! the [log](https://docs.rs/log) facade and take the entity as their first
//! argument:
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use brunel_track::entity::{toplevel, Entity};
//! use brunel_track::info;
//!
//! let top = toplevel("top");
//! let child = Rc::new(Entity::new(&top, "child"));
//! info!(child ; "hello from {}", child);
//! ```

// Enable warnings for missing documentation
#![warn(missing_docs)]

pub use log;

pub mod entity;
pub mod test_helpers;

#[doc(hidden)]
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $level:expr, $($arg:tt)+) => {
        $crate::log::log!($level, "[{}] {}", $entity, format_args!($($arg)+));
    };
}

/// The `trace` macro provides an entity-scoped wrapper for the
/// [log](https://docs.rs/log) crate at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// The `debug` macro provides an entity-scoped wrapper for the
/// [log](https://docs.rs/log) crate at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// The `info` macro provides an entity-scoped wrapper for the
/// [log](https://docs.rs/log) crate at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// The `warn` macro provides an entity-scoped wrapper for the
/// [log](https://docs.rs/log) crate at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// The `error` macro provides an entity-scoped wrapper for the
/// [log](https://docs.rs/log) crate at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
