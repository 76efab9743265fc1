// src/whatsapp/bridge.rs
//
// Implementação de produção do Transport: conversa com o cliente de
// automação (o processo que dirige o WhatsApp Web num navegador headless)
// por JSON delimitado por linha em stdin/stdout. O caminho do executável, a
// sessão e a pasta de tokens vêm todos da configuração.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{broadcast, oneshot, Mutex, RwLock};
use tokio::time;

use super::gateway::WhatsappConfig;
use super::transport::{Transport, TransportError, TransportEvent, TransportState};

// Quanto tempo esperamos o ack de um envio antes de desistir
const ACK_TIMEOUT: Duration = Duration::from_secs(30);

// Uma linha vinda do stdout do cliente de automação
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum BridgeLine {
    // Código de pareamento gerado (precisa de scan)
    Qr { code: String },
    Authenticated,
    State { value: String },
    Disconnected { reason: Option<String> },
    // Confirmação (ou falha) de um comando de envio
    Ack { id: u64, ok: bool, error: Option<String> },
}

type PendingAcks = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<(), String>>>>>;

struct BridgeProcess {
    child: Child,
    stdin: ChildStdin,
}

pub struct BridgeTransport {
    config: WhatsappConfig,
    events: broadcast::Sender<TransportEvent>,
    state: Arc<RwLock<TransportState>>,
    process: Mutex<Option<BridgeProcess>>,
    pending: PendingAcks,
    next_id: AtomicU64,
}

impl BridgeTransport {
    pub fn new(config: WhatsappConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            config,
            events,
            state: Arc::new(RwLock::new(TransportState::Disconnected)),
            process: Mutex::new(None),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        })
    }

    async fn spawn_client(&self) -> Result<BridgeProcess, TransportError> {
        let mut command = Command::new(&self.config.client_path);
        command
            .arg("--session")
            .arg(&self.config.session_name)
            .arg("--tokens-dir")
            .arg(&self.config.tokens_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if self.config.headless {
            command.arg("--headless");
        }

        let mut child = command
            .spawn()
            .map_err(|e| TransportError::Spawn(format!("{}: {e}", self.config.client_path.display())))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Spawn("stdin do cliente indisponível".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Spawn("stdout do cliente indisponível".into()))?;

        // Leitor de eventos: roda até o processo fechar o stdout
        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        handle_line(&line, &events, &state, &pending).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("🔥 Erro lendo o cliente de automação: {e}");
                        break;
                    }
                }
            }

            // Processo encerrou: derruba tudo que estava pendente
            *state.write().await = TransportState::Disconnected;
            for (_, waiter) in pending.lock().await.drain() {
                let _ = waiter.send(Err("cliente de automação encerrou".into()));
            }
            let _ = events.send(TransportEvent::Disconnected {
                reason: "cliente de automação encerrou".into(),
            });
        });

        Ok(BridgeProcess { child, stdin })
    }

    async fn write_command(&self, value: serde_json::Value) -> Result<(), TransportError> {
        let mut guard = self.process.lock().await;
        let process = guard.as_mut().ok_or(TransportError::Closed)?;

        let mut line = value.to_string();
        line.push('\n');
        process
            .stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| TransportError::Send(format!("falha escrevendo no cliente: {e}")))?;
        process
            .stdin
            .flush()
            .await
            .map_err(|e| TransportError::Send(format!("falha escrevendo no cliente: {e}")))?;
        Ok(())
    }
}

async fn handle_line(
    line: &str,
    events: &broadcast::Sender<TransportEvent>,
    state: &Arc<RwLock<TransportState>>,
    pending: &PendingAcks,
) {
    let parsed: BridgeLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(_) => {
            // O cliente também imprime logs livres; ignora o que não é evento
            tracing::debug!("bridge: linha ignorada: {line}");
            return;
        }
    };

    match parsed {
        BridgeLine::Qr { code } => {
            let _ = events.send(TransportEvent::PairingCode(code));
        }
        BridgeLine::Authenticated => {
            *state.write().await = TransportState::Connected;
            let _ = events.send(TransportEvent::Authenticated);
        }
        BridgeLine::State { value } => {
            let next = match value.as_str() {
                "connected" => TransportState::Connected,
                "opening" | "pairing" => TransportState::Opening,
                _ => TransportState::Disconnected,
            };
            *state.write().await = next;
        }
        BridgeLine::Disconnected { reason } => {
            *state.write().await = TransportState::Disconnected;
            let _ = events.send(TransportEvent::Disconnected {
                reason: reason.unwrap_or_else(|| "motivo não informado".into()),
            });
        }
        BridgeLine::Ack { id, ok, error } => {
            if let Some(waiter) = pending.lock().await.remove(&id) {
                let result = if ok {
                    Ok(())
                } else {
                    Err(error.unwrap_or_else(|| "erro não informado".into()))
                };
                let _ = waiter.send(result);
            }
        }
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        {
            let mut guard = self.process.lock().await;
            let alive = match guard.as_mut() {
                Some(process) => process.child.try_wait().ok().flatten().is_none(),
                None => false,
            };
            if !alive {
                tracing::info!(
                    "🚀 Iniciando cliente de automação: {}",
                    self.config.client_path.display()
                );
                *guard = Some(self.spawn_client().await?);
                *self.state.write().await = TransportState::Opening;
                return Ok(());
            }
        }

        // Processo vivo: só pede uma nova tentativa de conexão
        self.write_command(json!({ "cmd": "connect" })).await
    }

    async fn state(&self) -> TransportState {
        *self.state.read().await
    }

    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (ack_tx, ack_rx) = oneshot::channel();
        self.pending.lock().await.insert(id, ack_tx);

        let write = self
            .write_command(json!({ "cmd": "send", "id": id, "to": recipient, "body": body }))
            .await;
        if let Err(e) = write {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match time::timeout(ACK_TIMEOUT, ack_rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(platform_error))) => Err(TransportError::Send(platform_error)),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(TransportError::Send("tempo esgotado aguardando confirmação do envio".into()))
            }
        }
    }

    async fn disconnect(&self) {
        let _ = self.write_command(json!({ "cmd": "disconnect" })).await;
        let mut guard = self.process.lock().await;
        if let Some(mut process) = guard.take() {
            let _ = process.child.kill().await;
        }
        *self.state.write().await = TransportState::Disconnected;
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}
