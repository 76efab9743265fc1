// src/whatsapp/gateway.rs
//
// O dono do handle único ao cliente de automação. Máquina de estados:
//
//   Idle -> Initializing -> AwaitingScan -> Connected -> Degraded
//        -> Reconnecting -> (Initializing de novo | Failed)
//
// Injetado no AppState como Arc e compartilhado por todos os handlers; a
// exclusão mútua é feita com Mutex e canal watch de verdade, nunca com flag
// booleana.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use image::Luma;
use qrcode::QrCode;
use thiserror::Error;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::time;

use super::phone;
use super::transport::{Transport, TransportEvent, TransportState};
use crate::models::whatsapp::ConnectionStatusResponse;

// ---
// Configuração (tudo ajustável por variável de ambiente, sem mexer em código)
// ---
#[derive(Debug, Clone)]
pub struct WhatsappConfig {
    pub session_name: String,
    pub tokens_dir: PathBuf,
    // Caminho do executável do cliente de automação
    pub client_path: PathBuf,
    pub headless: bool,

    pub connect_timeout: Duration,
    pub message_delay: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub inactivity_window: Duration,
    pub health_check_interval: Duration,
    pub max_pairing_attempts: u32,
    pub messages_per_minute: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl WhatsappConfig {
    pub fn from_env() -> Self {
        Self {
            session_name: std::env::var("WHATSAPP_SESSION_NAME").unwrap_or_else(|_| "escola".into()),
            tokens_dir: PathBuf::from(
                std::env::var("WHATSAPP_TOKENS_DIR").unwrap_or_else(|_| "./tokens".into()),
            ),
            client_path: PathBuf::from(
                std::env::var("WHATSAPP_CLIENT_PATH").unwrap_or_else(|_| "whatsapp-bridge".into()),
            ),
            headless: env_or("WHATSAPP_HEADLESS", true),
            connect_timeout: Duration::from_secs(env_or("WHATSAPP_CONNECT_TIMEOUT_SECS", 120)),
            message_delay: Duration::from_millis(env_or("WHATSAPP_MESSAGE_DELAY_MS", 3000)),
            retry_delay: Duration::from_secs(env_or("WHATSAPP_RETRY_DELAY_SECS", 10)),
            max_retries: env_or("WHATSAPP_MAX_RETRIES", 3),
            inactivity_window: Duration::from_secs(env_or("WHATSAPP_INACTIVITY_SECS", 300)),
            health_check_interval: Duration::from_secs(env_or("WHATSAPP_HEALTH_INTERVAL_SECS", 30)),
            max_pairing_attempts: env_or("WHATSAPP_MAX_PAIRING_ATTEMPTS", 5),
            messages_per_minute: env_or("WHATSAPP_MESSAGES_PER_MINUTE", 20),
        }
    }

    // Intervalo mínimo entre envios: o maior entre o atraso fixo e o passo
    // derivado do teto de mensagens por minuto.
    pub fn send_spacing(&self) -> Duration {
        let per_minute_floor = if self.messages_per_minute > 0 {
            Duration::from_millis(60_000 / u64::from(self.messages_per_minute))
        } else {
            Duration::ZERO
        };
        self.message_delay.max(per_minute_floor)
    }
}

// ---
// Estados e resultados
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Initializing,
    AwaitingScan,
    Connected,
    Degraded,
    Reconnecting,
    // Terminal: tentativas de reconexão esgotadas. Só sai daqui com um novo
    // initialize() explícito.
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Initializing => "initializing",
            ConnectionState::AwaitingScan => "awaiting_scan",
            ConnectionState::Connected => "connected",
            ConnectionState::Degraded => "degraded",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Connected,
    AlreadyConnected,
    AlreadyInitializing,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("WhatsApp não está conectado. Inicialize a conexão primeiro.")]
    NotConnected,

    #[error("Tempo esgotado aguardando a conexão do WhatsApp.")]
    ConnectTimeout,

    #[error("Conexão do WhatsApp falhou após {0} tentativa(s): {1}")]
    InitFailed(u32, String),

    #[error("Número de telefone inválido: {0}")]
    InvalidPhone(String),

    #[error("O número {0} não está registrado no WhatsApp.")]
    UnregisteredNumber(String),

    #[error("Envio bloqueado por limite de mensagens da plataforma. Aguarde e tente de novo.")]
    RateLimited,

    #[error("O destinatário bloqueou este remetente.")]
    Blocked,

    #[error("A sessão do WhatsApp foi encerrada. Reconexão em andamento.")]
    SessionClosed,

    #[error("Falha ao enviar mensagem: {0}")]
    SendFailed(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotConnected | GatewayError::SessionClosed => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::ConnectTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::InitFailed(..) | GatewayError::SendFailed(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnregisteredNumber(_) | GatewayError::Blocked => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

// Campos mutáveis protegidos pelo Mutex (os handlers rodam concorrentes)
#[derive(Debug, Default)]
struct GatewayInner {
    retry_count: u32,
    pairing_attempts: u32,
    pairing_code: Option<String>,
    last_activity: Option<DateTime<Utc>>,
    pump_started: bool,
    health_started: bool,
}

pub struct WhatsappGateway {
    config: WhatsappConfig,
    transport: Arc<dyn Transport>,
    inner: Mutex<GatewayInner>,
    state_tx: watch::Sender<ConnectionState>,
    // Serializa os envios e garante o intervalo fixo entre mensagens
    send_gate: Mutex<()>,
}

impl WhatsappGateway {
    pub fn new(config: WhatsappConfig, transport: Arc<dyn Transport>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        Arc::new(Self {
            config,
            transport,
            inner: Mutex::new(GatewayInner::default()),
            state_tx,
            send_gate: Mutex::new(()),
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            tracing::info!("📲 Gateway WhatsApp: estado -> {}", next.as_str());
        }
    }

    // ---
    // initialize(): bloqueia o chamador até conectar, falhar ou estourar o
    // timeout. Chamadas concorrentes não disparam um segundo handle: a
    // transição Idle -> Initializing é atômica dentro do canal watch.
    // ---
    pub async fn initialize(self: &Arc<Self>) -> Result<InitOutcome, GatewayError> {
        let mut started = false;
        self.state_tx.send_if_modified(|current| match *current {
            ConnectionState::Idle | ConnectionState::Degraded | ConnectionState::Failed => {
                *current = ConnectionState::Initializing;
                started = true;
                true
            }
            _ => false,
        });

        if !started {
            return Ok(match self.state() {
                ConnectionState::Connected => InitOutcome::AlreadyConnected,
                _ => InitOutcome::AlreadyInitializing,
            });
        }
        tracing::info!("📲 Gateway WhatsApp: estado -> initializing");

        {
            let mut inner = self.inner.lock().await;
            inner.retry_count = 0;
            inner.pairing_attempts = 0;
        }

        // O pump precisa estar assinado antes do connect, senão perdemos o
        // primeiro código de pareamento.
        self.ensure_event_pump().await;

        // Falhas internas do connect são repetidas até o limite, com o mesmo
        // atraso fixo da reconexão.
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.transport.connect().await {
                Ok(()) => break,
                Err(e) if attempt <= self.config.max_retries => {
                    tracing::warn!("🔁 Conexão falhou (tentativa {}): {}. Repetindo...", attempt, e);
                    time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    self.set_state(ConnectionState::Failed);
                    return Err(GatewayError::InitFailed(attempt, e.to_string()));
                }
            }
        }

        // Espera estruturada (nada de busy-wait): o pump muda o estado e o
        // canal watch acorda quem estiver aguardando.
        let mut rx = self.state_tx.subscribe();
        let wait = rx.wait_for(|s| {
            matches!(s, ConnectionState::Connected | ConnectionState::Failed)
        });
        match time::timeout(self.config.connect_timeout, wait).await {
            Ok(Ok(guard)) => {
                let reached = *guard;
                drop(guard);
                if reached == ConnectionState::Connected {
                    Ok(InitOutcome::Connected)
                } else {
                    Err(GatewayError::InitFailed(
                        self.config.max_retries,
                        "a conexão caiu durante a inicialização".into(),
                    ))
                }
            }
            Ok(Err(_)) => Err(GatewayError::InitFailed(attempt, "canal de estado encerrado".into())),
            Err(_) => {
                // Ninguém escaneou a tempo: volta ao repouso
                self.set_state(ConnectionState::Idle);
                Err(GatewayError::ConnectTimeout)
            }
        }
    }

    async fn ensure_event_pump(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if inner.pump_started {
            return;
        }
        inner.pump_started = true;
        drop(inner);

        let mut events = self.transport.subscribe();
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => gateway.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("⚠️ Pump de eventos atrasado, {} eventos perdidos", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    async fn handle_event(self: &Arc<Self>, event: TransportEvent) {
        match event {
            TransportEvent::PairingCode(code) => {
                let attempts = {
                    let mut inner = self.inner.lock().await;
                    inner.pairing_attempts += 1;
                    inner.pairing_code = Some(code.clone());
                    inner.pairing_attempts
                };
                if attempts > self.config.max_pairing_attempts {
                    // Não aborta: continua aguardando o scan ou o timeout geral
                    tracing::warn!(
                        "⚠️ {} códigos de pareamento gerados sem scan (limite {})",
                        attempts,
                        self.config.max_pairing_attempts
                    );
                }
                if let Err(e) = self.persist_pairing_code(&code) {
                    tracing::error!("🔥 Falha ao gravar o código de pareamento: {e}");
                }
                self.state_tx.send_if_modified(|current| match *current {
                    ConnectionState::Initializing | ConnectionState::Reconnecting => {
                        *current = ConnectionState::AwaitingScan;
                        true
                    }
                    _ => false,
                });
            }
            TransportEvent::Authenticated => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.retry_count = 0;
                    inner.last_activity = Some(Utc::now());
                }
                self.set_state(ConnectionState::Connected);
                self.ensure_health_loop().await;
            }
            TransportEvent::Disconnected { reason } => {
                self.handle_disconnect(&reason).await;
            }
        }
    }

    // Política de reconexão: contador limitado + atraso fixo. Estourou o
    // limite, o gateway morre em Failed até alguém chamar initialize().
    async fn handle_disconnect(self: &Arc<Self>, reason: &str) {
        if matches!(self.state(), ConnectionState::Idle | ConnectionState::Failed) {
            return;
        }

        let retries = {
            let mut inner = self.inner.lock().await;
            inner.retry_count += 1;
            inner.retry_count
        };

        if retries > self.config.max_retries {
            tracing::error!(
                "🔥 Conexão perdida ({reason}) com as {} tentativas esgotadas, desistindo",
                self.config.max_retries
            );
            self.set_state(ConnectionState::Failed);
            return;
        }

        tracing::warn!(
            "🔌 Conexão perdida ({reason}), reconectando em {:?} (tentativa {}/{})",
            self.config.retry_delay,
            retries,
            self.config.max_retries
        );
        self.set_state(ConnectionState::Reconnecting);

        // A tarefa repete a conexão dentro de si mesma: um connect() que
        // falha sem emitir Disconnected também consome o contador, até
        // conectar ou esgotar o limite em Failed.
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                time::sleep(gateway.config.retry_delay).await;
                // Alguém desligou ou desistiu enquanto dormíamos
                if gateway.state() != ConnectionState::Reconnecting {
                    return;
                }
                gateway.set_state(ConnectionState::Initializing);
                match gateway.transport.connect().await {
                    // Daqui em diante quem dirige é o pump de eventos
                    // (Authenticated ou Disconnected).
                    Ok(()) => return,
                    Err(e) => {
                        let retries = {
                            let mut inner = gateway.inner.lock().await;
                            inner.retry_count += 1;
                            inner.retry_count
                        };
                        if retries > gateway.config.max_retries {
                            tracing::error!(
                                "🔥 Reconexão falhou ({e}) com as {} tentativas esgotadas, desistindo",
                                gateway.config.max_retries
                            );
                            gateway.set_state(ConnectionState::Failed);
                            return;
                        }
                        tracing::warn!(
                            "🔁 Reconexão falhou: {e}. Nova tentativa em {:?} ({}/{})",
                            gateway.config.retry_delay,
                            retries,
                            gateway.config.max_retries
                        );
                        gateway.set_state(ConnectionState::Reconnecting);
                    }
                }
            }
        });
    }

    async fn ensure_health_loop(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        if inner.health_started {
            return;
        }
        inner.health_started = true;
        drop(inner);

        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = time::interval(gateway.config.health_check_interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            ticker.tick().await; // o primeiro tick resolve na hora
            loop {
                ticker.tick().await;
                if gateway.state() != ConnectionState::Connected {
                    continue;
                }

                let transport_state = gateway.transport.state().await;
                let inactive_for_too_long = {
                    let inner = gateway.inner.lock().await;
                    inner
                        .last_activity
                        .map(|t| {
                            (Utc::now() - t).num_seconds()
                                > gateway.config.inactivity_window.as_secs() as i64
                        })
                        .unwrap_or(false)
                };

                if transport_state != TransportState::Connected || inactive_for_too_long {
                    tracing::warn!(
                        "🩺 Health check reprovou (transporte {:?}, inativo demais: {})",
                        transport_state,
                        inactive_for_too_long
                    );
                    gateway.set_state(ConnectionState::Degraded);
                    gateway.handle_disconnect("health check reprovou").await;
                }
            }
        });
    }

    // ---
    // Envio individual. Nunca repete em silêncio: classifica, audita (no
    // chamador) e devolve o erro.
    // ---
    pub async fn send_message(self: &Arc<Self>, raw_phone: &str, body: &str) -> Result<String, GatewayError> {
        if self.state() != ConnectionState::Connected {
            return Err(GatewayError::NotConnected);
        }

        let recipient = phone::format_phone_number(raw_phone)
            .map_err(|e| GatewayError::InvalidPhone(e.to_string()))?;

        // Re-verifica o transporte imediatamente antes do envio, para não
        // correr atrás de uma conexão que acabou de cair.
        if self.transport.state().await != TransportState::Connected {
            return Err(GatewayError::NotConnected);
        }

        let _gate = self.send_gate.lock().await;
        match self.transport.send_text(&recipient, body).await {
            Ok(()) => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.last_activity = Some(Utc::now());
                }
                // Espaçamento entre mensagens, exigência da plataforma e
                // teto de mensagens por minuto.
                time::sleep(self.config.send_spacing()).await;
                Ok(recipient)
            }
            Err(e) => {
                let classified = classify_send_error(&e.to_string(), &recipient);
                if matches!(classified, GatewayError::SessionClosed) {
                    self.handle_disconnect("sessão encerrada durante envio").await;
                }
                Err(classified)
            }
        }
    }

    pub async fn pairing_code(&self) -> Option<String> {
        self.inner.lock().await.pairing_code.clone()
    }

    pub async fn status(&self) -> ConnectionStatusResponse {
        let state = self.state();
        let inner = self.inner.lock().await;
        ConnectionStatusResponse {
            state: state.as_str().to_string(),
            connected: state == ConnectionState::Connected,
            retry_count: inner.retry_count,
            last_activity: inner.last_activity,
            pairing_code_available: inner.pairing_code.is_some(),
        }
    }

    pub async fn disconnect(&self) {
        self.transport.disconnect().await;
        {
            let mut inner = self.inner.lock().await;
            inner.retry_count = 0;
            inner.pairing_attempts = 0;
            inner.pairing_code = None;
            inner.last_activity = None;
        }
        self.set_state(ConnectionState::Idle);
        tracing::info!("👋 Gateway WhatsApp desligado pelo operador");
    }

    pub fn config(&self) -> &WhatsappConfig {
        &self.config
    }

    // Grava o código de pareamento como PNG para o operador escanear
    // (tokens/<sessao>-pairing.png), além de mantê-lo em memória.
    fn persist_pairing_code(&self, code: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config.tokens_dir)?;
        let path = self
            .config
            .tokens_dir
            .join(format!("{}-pairing.png", self.config.session_name));

        let qr = QrCode::new(code.as_bytes())
            .map_err(|e| anyhow::anyhow!("qrcode inválido: {e}"))?;
        let rendered = qr.render::<Luma<u8>>().build();
        rendered
            .save(&path)
            .map_err(|e| anyhow::anyhow!("falha ao salvar {}: {e}", path.display()))?;

        tracing::info!("🔑 Código de pareamento gravado em {}", path.display());
        Ok(())
    }
}

// Converte o erro cru da plataforma em um dos motivos do GatewayError. O
// texto vem do cliente de automação, então a comparação é por substring,
// caixa baixa.
fn classify_send_error(raw: &str, recipient: &str) -> GatewayError {
    let msg = raw.to_lowercase();

    if msg.contains("unregistered") || msg.contains("not registered") || msg.contains("não registrado") {
        return GatewayError::UnregisteredNumber(recipient.to_string());
    }
    if msg.contains("block") {
        return GatewayError::Blocked;
    }
    if msg.contains("rate") || msg.contains("too many") || msg.contains("limit") {
        return GatewayError::RateLimited;
    }
    if msg.contains("session") || msg.contains("closed") || msg.contains("logged out") || msg.contains("conflict") {
        return GatewayError::SessionClosed;
    }

    GatewayError::SendFailed(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    use crate::whatsapp::transport::TransportError;

    // Transporte roteirizado: autentica as N primeiras conexões e falha
    // conexões ou envios com a mensagem configurada.
    struct MockTransport {
        events: broadcast::Sender<TransportEvent>,
        state: StdMutex<TransportState>,
        connect_calls: AtomicU32,
        auth_remaining: AtomicU32,
        connect_error: StdMutex<Option<String>>,
        send_error: StdMutex<Option<String>>,
    }

    impl MockTransport {
        fn new(auth_times: u32) -> Arc<Self> {
            let (events, _) = broadcast::channel(32);
            Arc::new(Self {
                events,
                state: StdMutex::new(TransportState::Disconnected),
                connect_calls: AtomicU32::new(0),
                auth_remaining: AtomicU32::new(auth_times),
                connect_error: StdMutex::new(None),
                send_error: StdMutex::new(None),
            })
        }

        fn set_connect_error(&self, msg: &str) {
            *self.connect_error.lock().unwrap() = Some(msg.to_string());
        }

        fn set_send_error(&self, msg: &str) {
            *self.send_error.lock().unwrap() = Some(msg.to_string());
        }

        fn emit(&self, event: TransportEvent) {
            let _ = self.events.send(event);
        }

        fn drop_connection(&self, reason: &str) {
            *self.state.lock().unwrap() = TransportState::Disconnected;
            self.emit(TransportEvent::Disconnected { reason: reason.to_string() });
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(msg) = self.connect_error.lock().unwrap().clone() {
                return Err(TransportError::Spawn(msg));
            }
            *self.state.lock().unwrap() = TransportState::Opening;

            let remaining = self.auth_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.auth_remaining.store(remaining - 1, Ordering::SeqCst);
                *self.state.lock().unwrap() = TransportState::Connected;
                self.emit(TransportEvent::Authenticated);
            }
            Ok(())
        }

        async fn state(&self) -> TransportState {
            *self.state.lock().unwrap()
        }

        async fn send_text(&self, _recipient: &str, _body: &str) -> Result<(), TransportError> {
            match self.send_error.lock().unwrap().clone() {
                Some(msg) => Err(TransportError::Send(msg)),
                None => Ok(()),
            }
        }

        async fn disconnect(&self) {
            *self.state.lock().unwrap() = TransportState::Disconnected;
        }

        fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
            self.events.subscribe()
        }
    }

    fn fast_config(tokens_dir: &std::path::Path) -> WhatsappConfig {
        WhatsappConfig {
            session_name: "teste".into(),
            tokens_dir: tokens_dir.to_path_buf(),
            client_path: PathBuf::from("whatsapp-bridge"),
            headless: true,
            connect_timeout: Duration::from_millis(250),
            message_delay: Duration::from_millis(1),
            retry_delay: Duration::from_millis(10),
            max_retries: 3,
            inactivity_window: Duration::from_secs(300),
            health_check_interval: Duration::from_secs(3600),
            max_pairing_attempts: 5,
            // Teto folgado para não frear os testes de envio
            messages_per_minute: 60_000,
        }
    }

    #[test]
    fn teto_de_mensagens_por_minuto_define_o_espacamento() {
        let mut config = fast_config(std::path::Path::new("./tokens"));
        config.message_delay = Duration::from_millis(500);

        // 20 msg/min -> um envio a cada 3s, acima do atraso fixo
        config.messages_per_minute = 20;
        assert_eq!(config.send_spacing(), Duration::from_secs(3));

        // Teto folgado: vale o atraso fixo
        config.messages_per_minute = 1_000;
        assert_eq!(config.send_spacing(), Duration::from_millis(500));

        // Zero desliga o teto
        config.messages_per_minute = 0;
        assert_eq!(config.send_spacing(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn inicializa_e_conecta() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());

        let outcome = gateway.initialize().await.unwrap();
        assert_eq!(outcome, InitOutcome::Connected);
        assert_eq!(gateway.state(), ConnectionState::Connected);
        assert!(gateway.status().await.connected);
    }

    #[tokio::test]
    async fn initialize_concorrente_nao_abre_segundo_handle() {
        let dir = tempfile::tempdir().unwrap();
        // Nunca autentica: a primeira chamada fica pendurada até o timeout
        let transport = MockTransport::new(0);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());

        let first = {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.initialize().await })
        };
        time::sleep(Duration::from_millis(30)).await;

        let second = gateway.initialize().await.unwrap();
        assert_eq!(second, InitOutcome::AlreadyInitializing);
        // Só a primeira chamada tocou o transporte
        assert_eq!(transport.connect_calls.load(Ordering::SeqCst), 1);

        assert!(matches!(first.await.unwrap(), Err(GatewayError::ConnectTimeout)));
    }

    #[tokio::test]
    async fn initialize_com_conexao_ativa_responde_already_connected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport);

        gateway.initialize().await.unwrap();
        let again = gateway.initialize().await.unwrap();
        assert_eq!(again, InitOutcome::AlreadyConnected);
    }

    #[tokio::test]
    async fn quarta_queda_consecutiva_vira_estado_terminal() {
        let dir = tempfile::tempdir().unwrap();
        // Autentica só a primeira conexão; as reconexões ficam no limbo
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());
        gateway.initialize().await.unwrap();

        // 3 quedas: cada uma agenda uma reconexão
        for _ in 0..3 {
            transport.drop_connection("queda simulada");
            time::sleep(Duration::from_millis(40)).await;
        }
        assert_ne!(gateway.state(), ConnectionState::Failed);

        // A 4ª estoura o limite (max_retries = 3) e NÃO agenda mais nada
        let calls_before = transport.connect_calls.load(Ordering::SeqCst);
        transport.drop_connection("queda final");
        time::sleep(Duration::from_millis(60)).await;

        assert_eq!(gateway.state(), ConnectionState::Failed);
        assert_eq!(transport.connect_calls.load(Ordering::SeqCst), calls_before);

        // Quedas depois do terminal são ignoradas
        transport.drop_connection("eco");
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(gateway.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn reconexao_que_nao_conecta_consome_o_contador_ate_o_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());
        gateway.initialize().await.unwrap();

        // O executável do cliente sumiu: toda reconexão falha no próprio
        // connect(), sem nenhum evento Disconnected para cobrar o contador.
        transport.set_connect_error("no such file or directory");
        transport.drop_connection("queda simulada");
        time::sleep(Duration::from_millis(150)).await;

        // 1 conexão inicial + 3 tentativas de reconexão, depois desiste
        assert_eq!(gateway.state(), ConnectionState::Failed);
        assert_eq!(transport.connect_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn envio_sem_conexao_falha_rapido() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(0);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport);

        let err = gateway.send_message("01012345678", "oi").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected));
    }

    #[tokio::test]
    async fn envio_classifica_erros_da_plataforma() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());
        gateway.initialize().await.unwrap();

        transport.set_send_error("recipient number is not registered on whatsapp");
        let err = gateway.send_message("01012345678", "oi").await.unwrap_err();
        assert!(matches!(err, GatewayError::UnregisteredNumber(n) if n == "201012345678@c.us"));

        // Sessão encerrada: devolve o erro E dispara a reconexão
        // (o estado do transporte segue Connected, só o envio falha)
        transport.set_send_error("session closed by remote");
        let err = gateway.send_message("01012345678", "oi").await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionClosed));
        time::sleep(Duration::from_millis(5)).await;
        assert_ne!(gateway.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn envio_normaliza_e_entrega() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(1);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport);
        gateway.initialize().await.unwrap();

        let recipient = gateway.send_message("0512345678", "olá").await.unwrap();
        assert_eq!(recipient, "966512345678@c.us");
    }

    #[tokio::test]
    async fn codigo_de_pareamento_e_persistido() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MockTransport::new(0);
        let gateway = WhatsappGateway::new(fast_config(dir.path()), transport.clone());

        let init = {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.initialize().await })
        };
        time::sleep(Duration::from_millis(20)).await;

        transport.emit(TransportEvent::PairingCode("2@ABCDEF123".into()));
        time::sleep(Duration::from_millis(30)).await;

        assert_eq!(gateway.state(), ConnectionState::AwaitingScan);
        assert_eq!(gateway.pairing_code().await.as_deref(), Some("2@ABCDEF123"));
        assert!(dir.path().join("teste-pairing.png").exists());

        let _ = init.await.unwrap();
    }
}
