//! Macros for creating process-wide containers.

/// Creates a named, process-wide container with a single macro invocation.
///
/// The macro generates a module containing a lazily initialized static
/// [`Container`](crate::Container) and free functions delegating to it.
///
/// # Examples
///
/// ```rust
/// use pimple_container::define_container;
/// use std::sync::Arc;
///
/// define_container!(services);
///
/// services::set_value("dsn", "postgres://localhost".to_string());
/// services::set_factory("pool_size", |_| Ok(8usize));
///
/// let dsn: Arc<String> = services::get("dsn").unwrap();
/// assert_eq!(&**dsn, "postgres://localhost");
/// assert_eq!(*services::get::<usize>("pool_size").unwrap(), 8);
/// ```
///
/// # Multiple Containers
///
/// Each invocation creates an isolated container:
///
/// ```rust
/// use pimple_container::define_container;
///
/// define_container!(database);
/// define_container!(cache);
///
/// database::set_value("url", "db".to_string());
///
/// assert!(database::exists("url"));
/// assert!(!cache::exists("url"));
/// ```
#[macro_export]
macro_rules! define_container {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            static CONTAINER: LazyLock<$crate::Container> =
                LazyLock::new($crate::Container::new);

            /// Access the underlying container.
            pub fn container() -> &'static $crate::Container {
                &CONTAINER
            }

            /// Install a slot under `id`.
            pub fn set(id: impl Into<String>, slot: impl Into<$crate::Slot>) {
                CONTAINER.set(id, slot)
            }

            /// Store a parameter under `id`.
            pub fn set_value<T: Send + Sync + 'static>(id: impl Into<String>, value: T) {
                CONTAINER.set_value(id, value)
            }

            /// Store a service definition under `id`.
            pub fn set_factory<F, T>(id: impl Into<String>, factory: F)
            where
                F: Fn(&$crate::Container) -> $crate::Result<T> + Send + Sync + 'static,
                T: Send + Sync + 'static,
            {
                CONTAINER.set_factory(id, factory)
            }

            /// Resolve `id` to a type-erased value.
            pub fn resolve(id: &str) -> $crate::Result<$crate::Value> {
                CONTAINER.resolve(id)
            }

            /// Resolve `id` as `Arc<T>`.
            pub fn get<T: Send + Sync + 'static>(id: &str) -> $crate::Result<Arc<T>> {
                CONTAINER.get(id)
            }

            /// Resolve `id` and clone the value out.
            pub fn get_cloned<T: Send + Sync + Clone + 'static>(id: &str) -> $crate::Result<T> {
                CONTAINER.get_cloned(id)
            }

            /// Check whether `id` is defined.
            pub fn exists(id: &str) -> bool {
                CONTAINER.exists(id)
            }

            /// Remove `id` if present.
            pub fn unset(id: &str) {
                CONTAINER.unset(id)
            }

            /// Read the slot under `id` without resolving it.
            pub fn raw(id: &str) -> $crate::Result<$crate::Slot> {
                CONTAINER.raw(id)
            }

            /// Memoize a service definition.
            pub fn share<F, T>(factory: F) -> $crate::Factory
            where
                F: Fn(&$crate::Container) -> $crate::Result<T> + Send + Sync + 'static,
                T: Send + Sync + 'static,
            {
                CONTAINER.share(factory)
            }

            /// Protect a service definition from being invoked on `get`.
            pub fn protect<F, T>(factory: F) -> $crate::Factory
            where
                F: Fn(&$crate::Container) -> $crate::Result<T> + Send + Sync + 'static,
                T: Send + Sync + 'static,
            {
                CONTAINER.protect(factory)
            }

            /// Decorate the service definition under `id`.
            pub fn extend<T, U, D>(id: &str, decorator: D) -> $crate::Result<$crate::Factory>
            where
                D: Fn(Arc<T>, &$crate::Container) -> $crate::Result<U> + Send + Sync + 'static,
                T: Send + Sync + 'static,
                U: Send + Sync + 'static,
            {
                CONTAINER.extend(id, decorator)
            }

            /// Set a tracing callback for container operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::ContainerEvent) + Send + Sync + 'static,
            ) {
                CONTAINER.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                CONTAINER.clear_trace_callback()
            }
        }
    };
}
