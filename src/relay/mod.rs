//! Broadcast router for the shared chat room
//!
//! The single authority translating inbound client events into registry
//! operations and outbound broadcasts. Each connection walks an explicit
//! `Unjoined -> Joined` machine and is detached on disconnect. Events
//! received before join (other than join itself) are dropped, not errored:
//! a slow client may race its own join.
//!
//! All room state sits behind one lock. Handlers mutate and enqueue without
//! suspending, which keeps raw broadcasts in server receipt order. Gateway
//! calls run in spawned tasks holding only read-only copies of the message;
//! a task re-locks only to enqueue the derived broadcast, so no client's
//! pending translation ever stalls the room.

pub mod credential;
pub mod protocol;
mod voice;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};

use crate::gateway::GatewayClient;
use crate::lang::{self, Language};
use crate::registry::{ConnectionId, Registry, Session};

use self::credential::CredentialStore;
use self::protocol::{ClientEvent, ServerEvent};
use self::voice::VoicePayload;

/// Per-connection lifecycle tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeerState {
    Unjoined,
    Joined,
}

/// One attached connection: outbound queue plus lifecycle tag
struct Peer {
    tx: mpsc::UnboundedSender<ServerEvent>,
    state: PeerState,
}

/// Mutable room state: the presence arena plus attached peers
#[derive(Default)]
struct Room {
    registry: Registry,
    peers: HashMap<ConnectionId, Peer>,
}

impl Room {
    /// Enqueue to every attached connection.
    ///
    /// Enqueueing is non-blocking (unbounded queues); a send fails only
    /// when the connection's forward task is already gone, which detach
    /// cleans up.
    fn broadcast_all(&self, event: &ServerEvent) {
        for peer in self.peers.values() {
            let _ = peer.tx.send(event.clone());
        }
    }

    /// Enqueue to every attached connection except `skip`.
    fn broadcast_except(&self, skip: ConnectionId, event: &ServerEvent) {
        for (id, peer) in &self.peers {
            if *id != skip {
                let _ = peer.tx.send(event.clone());
            }
        }
    }

    /// Enqueue to a single connection.
    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(peer) = self.peers.get(&id) {
            let _ = peer.tx.send(event);
        }
    }

    /// Session snapshot for `id`, provided the connection has joined.
    fn session_if_joined(&self, id: ConnectionId) -> Option<Session> {
        match self.peers.get(&id) {
            Some(peer) if peer.state == PeerState::Joined => self.registry.lookup(id).cloned(),
            _ => None,
        }
    }
}

/// The broadcast router
pub struct Relay {
    room: Mutex<Room>,
    credential: CredentialStore,
    gateway: GatewayClient,
}

impl Relay {
    #[must_use]
    pub fn new(gateway: GatewayClient, credential: CredentialStore) -> Self {
        Self {
            room: Mutex::new(Room::default()),
            credential,
            gateway,
        }
    }

    /// Attach a freshly opened connection in the `Unjoined` state and hand
    /// back its outbound event queue.
    pub async fn attach(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut room = self.room.lock().await;
        room.peers.insert(
            id,
            Peer {
                tx,
                state: PeerState::Unjoined,
            },
        );
        rx
    }

    /// Detach a connection: drop its queue, unregister its session, and
    /// announce the departure to everyone remaining.
    ///
    /// Idempotent; a connection that never joined leaves silently.
    pub async fn detach(&self, id: ConnectionId) {
        let mut room = self.room.lock().await;
        room.peers.remove(&id);
        if let Some(session) = room.registry.unregister(id) {
            tracing::info!(conn = %id, name = %session.display_name, "user left");
            room.broadcast_all(&ServerEvent::UserLeft {
                connection_id: id,
                display_name: session.display_name,
            });
        }
    }

    /// Number of currently joined sessions.
    pub async fn presence_count(&self) -> usize {
        self.room.lock().await.registry.len()
    }

    /// Dispatch one inbound event.
    pub async fn handle(self: &Arc<Self>, id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Join {
                display_name,
                elevated,
            } => self.handle_join(id, display_name, elevated).await,
            ClientEvent::Typing { is_typing } => self.handle_typing(id, is_typing).await,
            ClientEvent::ChatMessage { text, credential } => {
                self.handle_chat(id, text, credential).await;
            }
            ClientEvent::VoiceMessage {
                audio_base64,
                credential,
                transcription,
                translation,
                source_language,
                target_language,
                processed_locally,
            } => {
                self.handle_voice(
                    id,
                    VoicePayload {
                        audio_base64,
                        credential,
                        transcription,
                        translation,
                        source_language,
                        target_language,
                        processed_locally,
                    },
                )
                .await;
            }
            ClientEvent::SetCredential { credential } => {
                self.handle_set_credential(id, credential).await;
            }
        }
    }

    async fn handle_join(&self, id: ConnectionId, display_name: String, elevated: bool) {
        let mut room = self.room.lock().await;
        if !room.peers.contains_key(&id) {
            // Connection already gone
            return;
        }

        let session = match room.registry.register(id, display_name, elevated) {
            Ok(session) => session,
            Err(e) => {
                // Local bookkeeping; a duplicate join is absorbed
                tracing::debug!(conn = %id, error = %e, "join ignored");
                return;
            }
        };
        if let Some(peer) = room.peers.get_mut(&id) {
            peer.state = PeerState::Joined;
        }

        tracing::info!(
            conn = %id,
            name = %session.display_name,
            elevated = session.elevated,
            "user joined"
        );

        let users = room.registry.snapshot();
        room.broadcast_all(&ServerEvent::UserJoined {
            user: session,
            users: users.clone(),
        });
        // The joiner also gets a direct snapshot, deliberately duplicating
        // the broadcast above
        room.send_to(id, ServerEvent::UsersList { users });
    }

    async fn handle_typing(&self, id: ConnectionId, is_typing: bool) {
        let room = self.room.lock().await;
        let Some(session) = room.session_if_joined(id) else {
            return;
        };

        room.broadcast_except(
            id,
            &ServerEvent::UserTyping {
                connection_id: id,
                display_name: session.display_name,
                is_typing,
            },
        );
    }

    async fn handle_chat(
        self: &Arc<Self>,
        id: ConnectionId,
        text: String,
        credential: Option<String>,
    ) {
        let room = self.room.lock().await;
        let Some(sender) = room.session_if_joined(id) else {
            return;
        };

        if let Some(supplied) = &credential {
            self.credential.put_if_absent(supplied);
        }

        // Sending a message clears the sender's typing indicator
        room.broadcast_except(
            id,
            &ServerEvent::UserTyping {
                connection_id: id,
                display_name: sender.display_name.clone(),
                is_typing: false,
            },
        );

        let language = lang::detect(&text);

        // The raw message goes out before any translation is attempted, so
        // every client sees it at send time regardless of gateway latency
        room.broadcast_all(&ServerEvent::Message {
            sender: sender.clone(),
            text: text.clone(),
            language,
            timestamp: Utc::now(),
        });

        let Some(api_key) = self.credential.get() else {
            return;
        };

        let relay = Arc::clone(self);
        tokio::spawn(async move {
            relay
                .translate_and_broadcast(id, sender, text, language, api_key)
                .await;
        });
    }

    /// Completion of a spawned translation; re-locks only to enqueue.
    async fn translate_and_broadcast(
        &self,
        id: ConnectionId,
        sender: Session,
        text: String,
        source: Language,
        api_key: String,
    ) {
        match self.gateway.translate(&text, source, &api_key).await {
            Ok(translated) => {
                let room = self.room.lock().await;
                room.broadcast_all(&ServerEvent::TranslatedMessage {
                    sender,
                    original_text: text,
                    translated_text: translated,
                    source_language: source,
                    target_language: source.complement(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                let e = crate::Error::Gateway(e);
                tracing::warn!(conn = %id, error = %e, "translation failed");
                // Only the sender hears about it; nobody else's traffic stops
                let room = self.room.lock().await;
                room.send_to(
                    id,
                    ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    async fn handle_set_credential(&self, id: ConnectionId, credential: String) {
        let room = self.room.lock().await;
        if room.session_if_joined(id).is_none() {
            return;
        }

        self.credential.replace(&credential);
        tracing::info!(conn = %id, "translation credential replaced");
        room.send_to(id, ServerEvent::CredentialAck { success: true });
    }
}
