// src/whatsapp/transport.rs

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

// O estado bruto reportado pelo cliente de automação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Disconnected,
    Opening,
    Connected,
}

// Eventos emitidos pelo transporte. O gateway assina este canal e dirige a
// máquina de estados a partir dele.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    // Um novo código de pareamento foi gerado (precisa ser escaneado)
    PairingCode(String),

    // A sessão foi autenticada e o cliente está pronto para enviar
    Authenticated,

    // A conexão caiu. O motivo vem como texto livre do cliente.
    Disconnected { reason: String },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("falha ao iniciar o cliente de automação: {0}")]
    Spawn(String),

    // Falha de envio reportada pela plataforma. A mensagem crua é
    // classificada pelo gateway em um motivo amigável.
    #[error("{0}")]
    Send(String),

    #[error("o transporte foi encerrado")]
    Closed,
}

// A costura entre o gateway e o cliente de automação. Em produção é o
// BridgeTransport (processo filho); nos testes, um mock roteirizado.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    // Dispara uma tentativa de conexão. O resultado (pareamento,
    // autenticação, queda) chega pelos eventos, não pelo retorno.
    async fn connect(&self) -> Result<(), TransportError>;

    async fn state(&self) -> TransportState;

    // `recipient` já vem normalizado com o sufixo da plataforma.
    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), TransportError>;

    async fn disconnect(&self);

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}
