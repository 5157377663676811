//! # Pimple Container
//!
//! A small dependency injection container mapping string identifiers to parameters or
//! lazily evaluated service definitions.
//!
//! ## Quick Start
//!
//! ```rust
//! use pimple_container::Container;
//! use std::sync::Arc;
//!
//! let c = Container::new();
//! c.set_factory("greeting", |_| Ok("hi".to_string()));
//! assert_eq!(c.get_cloned::<String>("greeting").unwrap(), "hi");
//!
//! c.extend("greeting", |v: Arc<String>, _| Ok(format!("{v}!"))).unwrap();
//! assert_eq!(c.get_cloned::<String>("greeting").unwrap(), "hi!");
//! ```
//!
//! ## Features
//!
//! - **Lazy services**: factories run on every `get`, receiving the container
//! - **Shared services**: [`Container::share`] memoizes the first result
//! - **Protected callables**: [`Container::protect`] stores a factory as a plain value
//! - **Extension**: [`Container::extend`] decorates an existing definition
//! - **Tracing support**: optional callback plus `tracing` events for every operation
//!
//! ## Main Types
//!
//! - [`Container`] - the identifier → slot map and its operations
//! - [`Slot`] - a stored parameter or factory
//! - [`Factory`] - a cloneable, type-erased service definition
//! - [`ContainerError`] - errors returned by container operations
//! - [`define_container!`] - process-wide named containers

mod container;
mod container_error;
mod container_event;
mod macros;
mod slot;

pub use container::{Container, TraceCallback};
pub use container_error::{ContainerError, Result};
pub use container_event::ContainerEvent;
pub use slot::{Factory, Slot, Value};
