//! The string-keyed service container.
//!
//! A [`Container`] maps identifiers to [`Slot`]s. Parameters are returned as stored,
//! factories are invoked with the container on every resolution, which lets a service
//! definition pull its own dependencies out of the same container.
//!
//! # Examples
//!
//! ```
//! use pimple_container::Container;
//! use std::sync::Arc;
//!
//! let c = Container::new();
//! c.set_value("name", "world".to_string());
//! c.set_factory("greeting", |c| {
//!     let name: Arc<String> = c.get("name")?;
//!     Ok(format!("hello {name}"))
//! });
//!
//! let greeting: Arc<String> = c.get("greeting").unwrap();
//! assert_eq!(&*greeting, "hello world");
//! ```

use std::{
    any::type_name,
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use crate::{ContainerError, ContainerEvent, Factory, Result, Slot, Value};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `ContainerEvent` every time the container is
/// interacted with. It is invoked after the container's own lock has been released, so it
/// may call back into the container.
pub type TraceCallback = dyn Fn(&ContainerEvent) + Send + Sync + 'static;

/// A dependency injection container keyed by string identifiers.
#[derive(Default)]
pub struct Container {
    values: Mutex<HashMap<String, Slot>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Container {
    /// Creates an empty container without a trace callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container seeded with the given slots.
    ///
    /// Slots are adopted as-is; factories keep their identity, so a shared factory passed
    /// here keeps its memo cell.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Slot)>,
        K: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(id, slot)| (id.into(), slot))
            .collect();

        Container {
            values: Mutex::new(values),
            trace: Mutex::new(None),
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for container operations.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the trace lock is poisoned, this method automatically recovers by extracting
    /// the inner value.
    pub fn set_trace_callback(&self, callback: impl Fn(&ContainerEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback. Stored slots are unaffected.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: ContainerEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        if let Some(callback) = callback {
            callback(&event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------------------------------

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // No user code runs while the map is locked (replaced slots are dropped after the
        // guard), so a poisoned lock still holds a consistent map.
        self.values.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Installs a slot under `id`, replacing whatever was stored there.
    pub fn set(&self, id: impl Into<String>, slot: impl Into<Slot>) {
        let id = id.into();
        let slot = slot.into();
        let factory = slot.is_factory();

        tracing::trace!(id = %id, factory, "container set");
        let replaced = self.slots().insert(id.clone(), slot);
        drop(replaced);

        self.emit_event(ContainerEvent::Set { id, factory });
    }

    /// Stores `value` as a parameter.
    pub fn set_value<T: Send + Sync + 'static>(&self, id: impl Into<String>, value: T) {
        self.set(id, Slot::value(value));
    }

    /// Stores `factory` as a service definition, invoked on every `get`.
    pub fn set_factory<F, T>(&self, id: impl Into<String>, factory: F)
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.set(id, Slot::factory(factory));
    }

    /// Resolves `id` to its type-erased value.
    ///
    /// Factories are invoked with this container; the internal lock is released first, so
    /// factories may freely `get` or `set` other identifiers.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::IdentifierNotFound`] if nothing is stored under `id`
    /// - any error returned by the factory itself
    pub fn resolve(&self, id: &str) -> Result<Value> {
        let slot = self.slots().get(id).cloned();

        self.emit_event(ContainerEvent::Get {
            id: id.to_string(),
            found: slot.is_some(),
        });

        match slot {
            Some(slot) => {
                tracing::trace!(id, factory = slot.is_factory(), "container get");
                slot.resolve(self)
            }
            None => {
                tracing::debug!(id, "identifier not defined");
                Err(ContainerError::not_found(id))
            }
        }
    }

    /// Resolves `id` and downcasts the result to `T`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::IdentifierNotFound`] if nothing is stored under `id`
    /// - [`ContainerError::TypeMismatch`] if the resolved value is not a `T`
    /// - any error returned by the factory itself
    pub fn get<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        self.resolve(id)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolves `id` and returns an owned clone of the value.
    pub fn get_cloned<T: Send + Sync + Clone + 'static>(&self, id: &str) -> Result<T> {
        let value = self.get::<T>(id)?;
        Ok((*value).clone())
    }

    /// Returns `true` if a slot is stored under `id`.
    pub fn exists(&self, id: &str) -> bool {
        let found = self.slots().contains_key(id);
        tracing::trace!(id, found, "container exists");

        self.emit_event(ContainerEvent::Exists {
            id: id.to_string(),
            found,
        });

        found
    }

    /// Removes the slot under `id`. Removing an absent identifier is a no-op.
    pub fn unset(&self, id: &str) {
        let removed = self.slots().remove(id);
        tracing::trace!(id, removed = removed.is_some(), "container unset");

        self.emit_event(ContainerEvent::Unset { id: id.to_string() });
    }

    /// Returns the slot stored under `id` without invoking it.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::IdentifierNotFound`] if nothing is stored under `id`
    pub fn raw(&self, id: &str) -> Result<Slot> {
        let slot = self.slots().get(id).cloned();
        tracing::trace!(id, found = slot.is_some(), "container raw");

        self.emit_event(ContainerEvent::Raw {
            id: id.to_string(),
            found: slot.is_some(),
        });

        slot.ok_or_else(|| ContainerError::not_found(id))
    }

    /// Returns every defined identifier, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of defined identifiers.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Returns `true` if no identifier is defined.
    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    // -------------------------------------------------------------------------------------------------
    // Definition combinators
    // -------------------------------------------------------------------------------------------------

    /// Wraps `factory` so that its first successful result is memoized.
    ///
    /// The memo cell belongs to the returned [`Factory`] instance: clones of it share the
    /// cell, while calling `share` twice on equivalent closures yields two independent
    /// cells. A failed invocation is not memoized.
    pub fn share<F, T>(&self, factory: F) -> Factory
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        tracing::trace!("container share");
        shared(Factory::new(factory))
    }

    /// Like [`Container::share`], for a slot obtained at runtime (e.g. from [`Container::raw`]).
    ///
    /// # Errors
    ///
    /// - [`ContainerError::InvalidCallable`] if `slot` is a parameter
    pub fn share_slot(&self, slot: Slot) -> Result<Factory> {
        tracing::trace!(factory = slot.is_factory(), "container share_slot");
        Factory::try_from(slot).map(shared)
    }

    /// Wraps `factory` so that resolving the wrapper yields `factory` itself, unevaluated.
    ///
    /// The resolved value downcasts to [`Factory`].
    pub fn protect<F, T>(&self, factory: F) -> Factory
    where
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        tracing::trace!("container protect");
        protected(Factory::new(factory))
    }

    /// Like [`Container::protect`], for a slot obtained at runtime.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::InvalidCallable`] if `slot` is a parameter
    pub fn protect_slot(&self, slot: Slot) -> Result<Factory> {
        tracing::trace!(factory = slot.is_factory(), "container protect_slot");
        Factory::try_from(slot).map(protected)
    }

    /// Decorates the factory stored under `id`.
    ///
    /// The current factory is captured now; the installed replacement invokes it, then
    /// passes its result and the container to `decorator`. Extending an extended slot
    /// chains the decorators. The new factory is installed and returned.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::IdentifierNotFound`] if nothing is stored under `id`
    /// - [`ContainerError::NotAFactory`] if `id` holds a parameter
    ///
    /// Resolving the extended slot fails with [`ContainerError::TypeMismatch`] when the
    /// original factory does not produce a `T`.
    pub fn extend<T, U, D>(&self, id: &str, decorator: D) -> Result<Factory>
    where
        D: Fn(Arc<T>, &Container) -> Result<U> + Send + Sync + 'static,
        T: Send + Sync + 'static,
        U: Send + Sync + 'static,
    {
        let (extended, replaced) = {
            let mut slots = self.slots();

            let original = match slots.get(id) {
                Some(Slot::Factory(factory)) => factory.clone(),
                Some(Slot::Parameter(_)) => {
                    tracing::debug!(id, "cannot extend a parameter");
                    return Err(ContainerError::NotAFactory { id: id.to_string() });
                }
                None => {
                    tracing::debug!(id, "identifier not defined");
                    return Err(ContainerError::not_found(id));
                }
            };

            let owner = id.to_string();
            let extended = Factory::from_value_fn(move |c| {
                let value = original.call(c)?.downcast::<T>().map_err(|_| {
                    ContainerError::TypeMismatch {
                        id: owner.clone(),
                        expected: type_name::<T>(),
                    }
                })?;

                decorator(value, c).map(|decorated| Arc::new(decorated) as Value)
            });

            let replaced = slots.insert(id.to_string(), Slot::Factory(extended.clone()));
            (extended, replaced)
        };
        drop(replaced);

        tracing::trace!(id, "container extend");
        self.emit_event(ContainerEvent::Extend { id: id.to_string() });

        Ok(extended)
    }
}

fn shared(inner: Factory) -> Factory {
    let memo: OnceLock<Value> = OnceLock::new();

    Factory::from_value_fn(move |c| {
        if let Some(value) = memo.get() {
            return Ok(Arc::clone(value));
        }

        // The inner factory runs without holding the cell so that it may re-enter the
        // container; if two resolutions race, the first stored value wins.
        let value = inner.call(c)?;
        Ok(Arc::clone(memo.get_or_init(|| value)))
    })
}

fn protected(inner: Factory) -> Factory {
    let value: Value = Arc::new(inner);
    Factory::from_value_fn(move |_| Ok(Arc::clone(&value)))
}

impl<K: Into<String>> FromIterator<(K, Slot)> for Container {
    fn from_iter<I: IntoIterator<Item = (K, Slot)>>(iter: I) -> Self {
        Container::with_values(iter)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.keys())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(calls: &Arc<AtomicUsize>) -> impl Fn(&Container) -> Result<usize> {
        let calls = calls.clone();
        move |_| Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[test]
    fn test_set_and_get_parameter() -> Result<()> {
        let c = Container::new();
        c.set_value("port", 8080u16);

        let port: Arc<u16> = c.get("port")?;
        assert_eq!(*port, 8080);

        Ok(())
    }

    #[test]
    fn test_get_parameter_returns_stored_instance() -> Result<()> {
        let c = Container::new();
        let value: Value = Arc::new("shared".to_string());
        c.set("name", Slot::Parameter(value.clone()));

        assert!(Arc::ptr_eq(&c.resolve("name")?, &value));
        Ok(())
    }

    #[test]
    fn test_get_unknown_identifier() {
        let c = Container::new();
        let err = c.resolve("missing").unwrap_err();
        assert_eq!(
            err,
            ContainerError::IdentifierNotFound {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn test_get_wrong_type() {
        let c = Container::new();
        c.set_value("port", 8080u16);

        let err = c.get::<String>("port").unwrap_err();
        assert_eq!(
            err,
            ContainerError::TypeMismatch {
                id: "port".into(),
                expected: "alloc::string::String"
            }
        );
    }

    #[test]
    fn test_factory_is_invoked_on_every_get() -> Result<()> {
        let c = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        c.set_factory("service", counting_factory(&calls));

        assert_eq!(*c.get::<usize>("service")?, 1);
        assert_eq!(*c.get::<usize>("service")?, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[test]
    fn test_factory_receives_container() -> Result<()> {
        let c = Container::new();
        c.set_value("host", "localhost".to_string());
        c.set_value("port", 5432u16);
        c.set_factory("dsn", |c| {
            let host: Arc<String> = c.get("host")?;
            let port: Arc<u16> = c.get("port")?;
            Ok(format!("postgres://{host}:{port}"))
        });

        assert_eq!(c.get_cloned::<String>("dsn")?, "postgres://localhost:5432");
        Ok(())
    }

    #[test]
    fn test_factory_may_set_on_container() -> Result<()> {
        let c = Container::new();
        c.set_factory("boot", |c| {
            c.set_value("booted", true);
            Ok(())
        });

        assert!(!c.exists("booted"));
        c.resolve("boot")?;
        assert!(*c.get::<bool>("booted")?);

        Ok(())
    }

    #[test]
    fn test_factory_error_propagates() {
        let c = Container::new();
        c.set_factory("mailer", |c| {
            let _transport: Arc<String> = c.get("transport")?;
            Ok(())
        });

        assert_eq!(
            c.resolve("mailer").unwrap_err(),
            ContainerError::not_found("transport")
        );
    }

    #[test]
    fn test_overwrite_switches_variant() -> Result<()> {
        let c = Container::new();
        c.set_value("x", 1i32);
        c.set_factory("x", |_| Ok(2i32));
        assert_eq!(*c.get::<i32>("x")?, 2);

        c.set_value("x", 3i32);
        assert_eq!(*c.get::<i32>("x")?, 3);

        Ok(())
    }

    #[test]
    fn test_exists_and_unset() {
        let c = Container::new();
        assert!(!c.exists("x"));

        c.set_value("x", 1i32);
        assert!(c.exists("x"));

        c.unset("x");
        assert!(!c.exists("x"));

        // Second unset is a no-op
        c.unset("x");
        assert!(!c.exists("x"));
    }

    #[test]
    fn test_none_parameter_still_exists() {
        let c = Container::new();
        c.set_value("maybe", None::<String>);
        c.set_value("unit", ());

        assert!(c.exists("maybe"));
        assert!(c.exists("unit"));
    }

    #[test]
    fn test_raw_does_not_invoke_factory() -> Result<()> {
        let c = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = Factory::new(counting_factory(&calls));
        c.set("service", factory.clone());

        let raw = c.raw("service")?;
        assert!(Factory::ptr_eq(raw.as_factory().unwrap(), &factory));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[test]
    fn test_raw_unknown_identifier() {
        let c = Container::new();
        assert_eq!(c.raw("nope").unwrap_err(), ContainerError::not_found("nope"));
    }

    #[test]
    fn test_share_memoizes() -> Result<()> {
        let c = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = c.share(counting_factory(&calls));
        c.set("x", shared);

        let first = c.resolve("x")?;
        let second = c.resolve("x")?;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[test]
    fn test_share_does_not_memoize_errors() -> Result<()> {
        let c = Container::new();
        c.set("service", c.share(|c| c.get_cloned::<String>("dep")));

        assert!(c.resolve("service").is_err());

        c.set_value("dep", "ready".to_string());
        assert_eq!(c.get_cloned::<String>("service")?, "ready");

        Ok(())
    }

    #[test]
    fn test_share_slot_rejects_parameter() {
        let c = Container::new();
        c.set_value("port", 1u16);

        let slot = c.raw("port").unwrap();
        assert_eq!(
            c.share_slot(slot).unwrap_err(),
            ContainerError::InvalidCallable
        );
    }

    #[test]
    fn test_protect_returns_inner_factory() -> Result<()> {
        let c = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Factory::new(counting_factory(&calls));
        let protected = c.protect_slot(Slot::from(inner.clone()))?;

        let value = protected.call(&c)?;
        let returned = value.downcast::<Factory>().unwrap();

        assert!(Factory::ptr_eq(&returned, &inner));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[test]
    fn test_protect_slot_rejects_parameter() {
        let c = Container::new();
        assert_eq!(
            c.protect_slot(Slot::value(1u8)).unwrap_err(),
            ContainerError::InvalidCallable
        );
    }

    #[test]
    fn test_extend_decorates_factory() -> Result<()> {
        let c = Container::new();
        c.set_factory("greeting", |_| Ok("hi".to_string()));
        c.extend("greeting", |v: Arc<String>, _| Ok(format!("{v}!")))?;

        assert_eq!(c.get_cloned::<String>("greeting")?, "hi!");
        Ok(())
    }

    #[test]
    fn test_extend_errors() {
        let c = Container::new();
        c.set_value("param", 1i32);

        let err = c
            .extend("missing", |v: Arc<i32>, _| Ok(*v))
            .unwrap_err();
        assert_eq!(err, ContainerError::not_found("missing"));

        let err = c.extend("param", |v: Arc<i32>, _| Ok(*v)).unwrap_err();
        assert_eq!(err, ContainerError::NotAFactory { id: "param".into() });
    }

    #[test]
    fn test_with_values_and_keys() {
        let c = Container::with_values([
            ("b", Slot::value(2i32)),
            ("a", Slot::factory(|_| Ok(1i32))),
        ]);

        assert_eq!(c.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
        assert!(Container::new().is_empty());
    }

    #[test]
    fn test_debug_lists_keys() {
        let c = Container::new();
        c.set_value("x", 1i32);
        assert_eq!(format!("{c:?}"), "Container { keys: [\"x\"] }");
    }
}
