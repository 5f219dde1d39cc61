//! # Reconnect supervisor
//!
//! One supervisor task per [`SharedLink`]. It waits for the active
//! socket to close, and unless the close was a deliberate shutdown:
//!
//! 1. Emits [`LinkEvent::Disconnected`]
//! 2. Clears the subscription ledger (wire subscriptions died with the
//!    session)
//! 3. Sleeps the configured fixed delay
//! 4. Redials, re-runs the session bootstrap, and swaps the new socket
//!    into the link
//! 5. Emits [`LinkEvent::Reconnected`]
//!
//! Failed attempts emit [`LinkEvent::ReconnectFailed`] and retry after
//! the same delay, indefinitely, until the link shuts down.
//!
//! **Streams are NOT auto-re-subscribed.** Consumers listen for
//! `Reconnected` and call `ensure_subscribed` again; their frame
//! channels stay valid across the swap.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::link::SharedLink;
use crate::socket::CortexSocket;

/// Connection lifecycle events emitted by the shared link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Initial connection and session bootstrap succeeded.
    Connected,

    /// The socket closed (server close, read error, or shutdown).
    Disconnected { reason: String },

    /// A redial and session bootstrap succeeded.
    Reconnected,

    /// A reconnect attempt failed; another follows after the delay.
    ReconnectFailed { reason: String },
}

/// Spawn the supervisor task for a link.
pub(crate) fn spawn_supervisor(link: Arc<SharedLink>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let socket = link.current_socket().await;
            socket.wait_closed().await;

            if link.is_closing() {
                tracing::debug!("Supervisor exiting: link shut down");
                return;
            }

            tracing::warn!("Cortex socket closed; entering reconnect loop");
            link.emit(LinkEvent::Disconnected {
                reason: "WebSocket closed".into(),
            });
            link.clear_ledger().await;

            let delay = Duration::from_millis(link.config().reconnect.delay_ms);
            let had_session = link.has_session().await;

            // Retry at a fixed cadence until redial succeeds or the
            // link shuts down.
            loop {
                tokio::time::sleep(delay).await;
                if link.is_closing() {
                    tracing::debug!("Supervisor exiting: link shut down during backoff");
                    return;
                }

                tracing::info!(delay_ms = delay.as_millis() as u64, "Attempting reconnect");
                let new_socket =
                    match CortexSocket::connect(link.config(), link.frame_senders()).await {
                        Ok(socket) => socket,
                        Err(e) => {
                            tracing::warn!(error = %e, "Reconnect dial failed");
                            link.emit(LinkEvent::ReconnectFailed {
                                reason: e.to_string(),
                            });
                            continue;
                        }
                    };

                // The old session died with the old socket; open a
                // fresh one so re-ensured subscriptions have a live
                // token and session ID.
                let new_session = if had_session {
                    match SharedLink::open_session(&new_socket, link.config()).await {
                        Ok(session) => Some(session),
                        Err(e) => {
                            tracing::warn!(error = %e, "Session bootstrap failed after redial");
                            link.emit(LinkEvent::ReconnectFailed {
                                reason: e.to_string(),
                            });
                            new_socket.close().await;
                            continue;
                        }
                    }
                } else {
                    None
                };

                link.swap_socket(new_socket, new_session).await;
                link.emit(LinkEvent::Reconnected);
                tracing::info!("Reconnected to Cortex service");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_event_variants() {
        let disconnected = LinkEvent::Disconnected {
            reason: "test".into(),
        };
        assert_eq!(
            disconnected,
            LinkEvent::Disconnected {
                reason: "test".into()
            }
        );
        assert_ne!(LinkEvent::Connected, LinkEvent::Reconnected);
        assert_ne!(
            LinkEvent::ReconnectFailed {
                reason: "a".into()
            },
            LinkEvent::ReconnectFailed {
                reason: "b".into()
            }
        );
    }
}
