//! Abstraction over the real-time transport

use crate::events::OutgoingEvent;

/// A handle over the underlying real-time connection
///
/// The engine never touches sockets directly; lobbies and competition
/// sessions publish [`OutgoingEvent`]s through this trait and the host
/// application wires it to whatever transport it uses. Publishing is
/// fire-and-forget: implementations must not block on acknowledgment,
/// and the engine never resends.
pub trait Channel {
    /// Publishes an event on the connection
    fn publish(&self, event: &OutgoingEvent);

    /// Closes the connection, releasing any underlying resources
    fn close(self);
}
