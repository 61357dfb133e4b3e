//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::slots::{ConnectionId, SlotTable};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tictactoe_core::{GameError, MatchState, Role};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outgoing message queue of one connection
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connection holds no role")]
    NoRole,

    #[error(transparent)]
    Rejected(#[from] GameError),
}

/// The match and its role bindings, always locked together.
#[derive(Debug)]
struct Table {
    game: MatchState,
    slots: SlotTable,
}

/// Server state shared across all connections.
///
/// All reads and writes of the match and the slot table go through one
/// mutex. Messages are only enqueued on unbounded outboxes while it is
/// held; socket writes happen in each connection's writer task.
pub struct ServerState {
    table: Mutex<Table>,
    /// Mapping from connection ID to its message sender
    connections: DashMap<ConnectionId, Outbox>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                game: MatchState::new(),
                slots: SlotTable::new(),
            }),
            connections: DashMap::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection, hand it a role if one is free, and send it
    /// the current state.
    pub fn connect(&self, connection: ConnectionId, outbox: Outbox) -> Option<Role> {
        let mut table = self.lock();
        self.connections.insert(connection, outbox);

        let role = table.slots.assign(connection);
        match role {
            Some(role) => {
                info!(
                    "Connection {} plays {} ({} of 2 slots taken)",
                    connection,
                    role,
                    table.slots.len()
                );
                self.send_to_player(connection, ServerMessage::AssignRole { role });
            }
            None => info!("Connection {} joined as observer", connection),
        }

        self.send_to_player(
            connection,
            ServerMessage::GameUpdate {
                state: table.game.snapshot(),
            },
        );
        role
    }

    /// Apply a move from a connection and broadcast the result.
    ///
    /// Rejections leave the match untouched and send nothing.
    pub fn make_move(
        &self,
        connection: ConnectionId,
        index: usize,
    ) -> Result<MatchState, SessionError> {
        let mut table = self.lock();
        let role = table
            .slots
            .role_of(connection)
            .ok_or(SessionError::NoRole)?;
        let state = table.game.try_accept_move(role, index)?;

        self.broadcast(ServerMessage::GameUpdate {
            state: state.snapshot(),
        });
        Ok(state)
    }

    /// Reset the match and broadcast the initial state.
    // No role check: any connection, observers included, can reset.
    pub fn reset(&self, connection: ConnectionId) -> MatchState {
        let mut table = self.lock();
        let state = table.game.reset();
        info!(
            "Match reset by {} ({})",
            connection,
            table
                .slots
                .role_of(connection)
                .map_or_else(|| "observer".to_string(), |r| r.to_string())
        );

        self.broadcast(ServerMessage::GameUpdate {
            state: state.snapshot(),
        });
        state
    }

    /// Drop a connection and free its role. Nobody is notified.
    pub fn disconnect(&self, connection: ConnectionId) -> Option<Role> {
        let mut table = self.lock();
        self.connections.remove(&connection);

        let released = table.slots.release(connection);
        if let Some(role) = released {
            info!("Slot {} freed by {}", role, connection);
        }
        if table.slots.is_empty() {
            debug!("All player slots are free");
        }
        released
    }

    /// Send a message to a specific connection.
    pub fn send_to_player(&self, connection: ConnectionId, msg: ServerMessage) {
        if let Some(sender) = self.connections.get(&connection) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to every connection, players and observers.
    fn broadcast(&self, msg: ServerMessage) {
        for sender in self.connections.iter() {
            let _ = sender.send(msg.clone());
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind `addr` and run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Tic-tac-toe server listening on {}", addr);

    serve(listener, state).await
}

/// Accept connections on an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> anyhow::Result<()> {
    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode {:?}: {}", msg, e),
            }
        }
    });

    state.connect(connection_id, tx);

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection_id, client_msg, &state),
                Err(e) => warn!("Invalid message from {}: {} ({})", connection_id, text, e),
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(connection_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    state.disconnect(connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: ConnectionId, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::MakeMove { index } => match state.make_move(connection_id, index) {
            Ok(game) => debug!(
                "Cell {} taken by {}, {:?}\n{}",
                index,
                connection_id,
                game.outcome(),
                game.board()
            ),
            Err(e) => debug!(
                "Ignoring move at {} from {}: {}",
                index, connection_id, e
            ),
        },

        ClientMessage::ResetGame => {
            state.reset(connection_id);
        }

        ClientMessage::Ping => {
            state.send_to_player(connection_id, ServerMessage::Pong);
        }
    }
}
