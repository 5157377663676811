/// Events emitted by a container during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use pimple_container::ContainerEvent;
///
/// let event = ContainerEvent::Set { id: "db".to_string(), factory: true };
/// assert_eq!(event.to_string(), "set { id: db, factory: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    /// A slot was installed or overwritten.
    Set {
        id: String,
        /// Whether the slot holds a factory rather than a parameter
        factory: bool,
    },

    /// An identifier was resolved with `get`.
    Get { id: String, found: bool },

    /// An existence check was performed.
    Exists { id: String, found: bool },

    /// A slot was removed (or the identifier was already absent).
    Unset { id: String },

    /// The stored slot was read without resolving it.
    Raw { id: String, found: bool },

    /// A factory was wrapped with a decorator.
    Extend { id: String },
}

impl std::fmt::Display for ContainerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerEvent::Set { id, factory } => {
                write!(f, "set {{ id: {id}, factory: {factory} }}")
            }
            ContainerEvent::Get { id, found } => write!(f, "get {{ id: {id}, found: {found} }}"),
            ContainerEvent::Exists { id, found } => {
                write!(f, "exists {{ id: {id}, found: {found} }}")
            }
            ContainerEvent::Unset { id } => write!(f, "unset {{ id: {id} }}"),
            ContainerEvent::Raw { id, found } => write!(f, "raw {{ id: {id}, found: {found} }}"),
            ContainerEvent::Extend { id } => write!(f, "extend {{ id: {id} }}"),
        }
    }
}
