//! Slot variants stored under container identifiers.
//!
//! A [`Slot`] is either a [`Slot::Parameter`], returned as-is on resolution, or a
//! [`Slot::Factory`], invoked with the owning container on every resolution.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{Container, ContainerError, Result};

/// Type-erased value produced by resolving a slot.
pub type Value = Arc<dyn Any + Send + Sync>;

type FactoryFn = dyn Fn(&Container) -> Result<Value> + Send + Sync;

/// A cloneable handle to a service definition.
///
/// Clones share identity: closure state captured by the factory (such as the memo cell
/// of a shared factory) is the same for every clone. Use [`Factory::ptr_eq`] to compare
/// identities.
#[derive(Clone)]
pub struct Factory {
    inner: Arc<FactoryFn>,
}

impl Factory {
    /// Creates a factory from a closure returning an owned `T`.
    ///
    /// The produced value is wrapped in an `Arc` and can be retrieved as `Arc<T>`.
    ///
    /// ```rust
    /// use pimple_container::{Container, Factory};
    ///
    /// let factory = Factory::new(|_| Ok(7u8));
    /// let value = factory.call(&Container::new()).unwrap();
    /// assert_eq!(*value.downcast::<u8>().unwrap(), 7);
    /// ```
    pub fn new<F, T>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::from_value_fn(move |c| factory(c).map(|value| Arc::new(value) as Value))
    }

    /// Creates a factory from a closure that already yields type-erased values.
    pub(crate) fn from_value_fn<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Value> + Send + Sync + 'static,
    {
        Factory {
            inner: Arc::new(factory),
        }
    }

    /// Invokes the factory with the given container.
    pub fn call(&self, container: &Container) -> Result<Value> {
        (self.inner)(container)
    }

    /// Returns `true` if both handles point to the same factory instance.
    pub fn ptr_eq(a: &Factory, b: &Factory) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Factory({:p})", Arc::as_ptr(&self.inner) as *const ())
    }
}

/// The value stored under one identifier.
#[derive(Clone, Debug)]
pub enum Slot {
    /// A plain value, returned unchanged by `get`.
    Parameter(Value),
    /// A service definition, invoked by `get`.
    Factory(Factory),
}

impl Slot {
    /// Wraps a plain value as a parameter slot.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Slot::Parameter(Arc::new(value))
    }

    /// Wraps a closure as a factory slot.
    pub fn factory<F, T>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Slot::Factory(Factory::new(factory))
    }

    /// Returns `true` for a factory slot.
    pub fn is_factory(&self) -> bool {
        matches!(self, Slot::Factory(_))
    }

    /// Borrows the factory, or `None` for a parameter.
    pub fn as_factory(&self) -> Option<&Factory> {
        match self {
            Slot::Factory(factory) => Some(factory),
            Slot::Parameter(_) => None,
        }
    }

    /// Produces the slot's value: parameters are returned as-is, factories are invoked.
    pub fn resolve(&self, container: &Container) -> Result<Value> {
        match self {
            Slot::Parameter(value) => Ok(Arc::clone(value)),
            Slot::Factory(factory) => factory.call(container),
        }
    }
}

impl From<Factory> for Slot {
    fn from(factory: Factory) -> Self {
        Slot::Factory(factory)
    }
}

impl TryFrom<Slot> for Factory {
    type Error = ContainerError;

    fn try_from(slot: Slot) -> Result<Self> {
        match slot {
            Slot::Factory(factory) => Ok(factory),
            Slot::Parameter(_) => Err(ContainerError::InvalidCallable),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
