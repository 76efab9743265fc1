// src/whatsapp.rs
//
// Gateway de mensagens: dono do único handle ao cliente de automação do
// WhatsApp Web, do ciclo conectar/reconectar/health-check e da formatação
// de números. Os handlers HTTP só falam com o WhatsappGateway.

pub mod bridge;
pub mod gateway;
pub mod phone;
pub mod templates;
pub mod transport;

pub use bridge::BridgeTransport;
pub use gateway::{ConnectionState, GatewayError, InitOutcome, WhatsappConfig, WhatsappGateway};
pub use transport::{Transport, TransportError, TransportEvent, TransportState};
