//! Persistent channel to the solver.
//!
//! Frames are newline-delimited JSON ([`Frame`]) over TCP. One manager owns at
//! most one live [`Channel`]; requests subscribe to it, emit a tagged frame and
//! wait for the matching response.

use crate::config::ClientConfig;
use crate::error::{SocketError, SocketResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;
use techforge_protocol::events::{Frame, CONNECT_ERROR, DISCONNECT};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Live subscriptions of one channel, keyed by subscription id.
#[derive(Default, Debug)]
struct Listeners {
    next_id: AtomicU64,
    senders: Mutex<HashMap<u64, mpsc::UnboundedSender<Frame>>>,
}

impl Listeners {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<Frame>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, frame: &Frame) {
        for tx in self.lock().values() {
            let _ = tx.send(frame.clone());
        }
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Receives every frame that arrives on a channel while it is alive.
/// Dropping it unregisters the listener.
pub struct Subscription {
    id: u64,
    listeners: Arc<Listeners>,
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listeners.lock().remove(&self.id);
    }
}

/// One TCP connection with its reader and writer tasks.
#[derive(Debug)]
pub struct Channel {
    id: u64,
    outgoing: mpsc::UnboundedSender<Frame>,
    listeners: Arc<Listeners>,
    open: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Channel {
    fn spawn(id: u64, stream: TcpStream, manager: Weak<ConnectionManager>) -> Arc<Self> {
        let (read_half, mut write_half) = stream.into_split();
        let (outgoing, mut queue) = mpsc::unbounded_channel::<Frame>();
        let listeners = Arc::new(Listeners::default());
        let open = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn(async move {
            while let Some(frame) = queue.recv().await {
                let mut line = match serde_json::to_string(&frame) {
                    Ok(line) => line,
                    Err(e) => {
                        error!("❌ Could not encode '{}' frame: {}", frame.event, e);
                        continue;
                    }
                };
                line.push('\n');
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    warn!("Write to solver failed: {}", e);
                    break;
                }
                let _ = write_half.flush().await;
            }
        });

        let reader_listeners = listeners.clone();
        let reader_open = open.clone();
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match serde_json::from_str::<Frame>(&line) {
                        Ok(frame) => {
                            debug!("⬇️ {} (id {:?})", frame.event, frame.id);
                            reader_listeners.dispatch(&frame);
                        }
                        Err(e) => warn!("Ignoring malformed frame: {}", e),
                    },
                    Ok(None) => {
                        info!("🔌 Solver closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!("Read from solver failed: {}", e);
                        break;
                    }
                }
            }

            reader_open.store(false, Ordering::SeqCst);
            reader_listeners.dispatch(&Frame::new(DISCONNECT, serde_json::Value::Null));

            if let Some(manager) = manager.upgrade() {
                manager.handle_drop(id).await;
            }
        });

        Arc::new(Self {
            id,
            outgoing,
            listeners,
            open,
            tasks: Mutex::new(vec![writer, reader]),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, tx.clone());

        // Closed before we registered: the disconnect broadcast was missed.
        if !self.is_open() {
            let _ = tx.send(Frame::new(DISCONNECT, serde_json::Value::Null));
        }

        Subscription {
            id,
            listeners: self.listeners.clone(),
            rx,
        }
    }

    pub fn emit(&self, frame: Frame) -> SocketResult<()> {
        if !self.is_open() {
            return Err(SocketError::Closed);
        }
        debug!("⬆️ {} (id {:?})", frame.event, frame.id);
        self.outgoing.send(frame).map_err(|_| SocketError::Closed)
    }

    /// Number of registered subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.listeners
                .dispatch(&Frame::new(DISCONNECT, serde_json::Value::Null));
        }
        for task in self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
        {
            task.abort();
        }
    }
}

/// Owns the solver connection: lazy connect with backoff, reuse, background
/// reconnect after a drop, and request/response matching.
pub struct ConnectionManager {
    config: ClientConfig,
    me: Weak<ConnectionManager>,
    channel: tokio::sync::Mutex<Option<Arc<Channel>>>,
    connected: watch::Sender<bool>,
    manual_disconnect: AtomicBool,
    next_channel_id: AtomicU64,
    next_request_id: AtomicU64,
}

static GLOBAL: OnceLock<Arc<ConnectionManager>> = OnceLock::new();

impl ConnectionManager {
    pub fn new(config: ClientConfig) -> Arc<Self> {
        let (connected, _) = watch::channel(false);
        Arc::new_cyclic(|me| Self {
            config,
            me: me.clone(),
            channel: tokio::sync::Mutex::new(None),
            connected,
            manual_disconnect: AtomicBool::new(false),
            next_channel_id: AtomicU64::new(1),
            next_request_id: AtomicU64::new(1),
        })
    }

    /// The process-wide manager. The first call fixes its configuration.
    pub fn global(config: &ClientConfig) -> Arc<Self> {
        GLOBAL.get_or_init(|| Self::new(config.clone())).clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Observe connection state changes.
    pub fn status(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    /// Returns the live channel, connecting first when there is none.
    pub async fn connect(&self) -> SocketResult<Arc<Channel>> {
        let mut slot = self.channel.lock().await;
        if let Some(channel) = slot.as_ref() {
            if channel.is_open() {
                return Ok(channel.clone());
            }
        }

        self.manual_disconnect.store(false, Ordering::SeqCst);
        let stream = self.dial_with_backoff().await?;
        let id = self.next_channel_id.fetch_add(1, Ordering::Relaxed);
        let channel = Channel::spawn(id, stream, self.me.clone());

        info!("✅ Connected to solver at {}", self.config.solver_addr);
        *slot = Some(channel.clone());
        self.set_connected(true);
        Ok(channel)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.reconnection_delay();
        let max = self.config.reconnection_delay_max();
        let exp = base.saturating_mul(2u32.saturating_pow(attempt)).min(max);
        // +-50% jitter, never above the cap.
        let jitter = 0.5 + fastrand::f64();
        exp.mul_f64(jitter).min(max)
    }

    async fn dial_with_backoff(&self) -> SocketResult<TcpStream> {
        let addr = &self.config.solver_addr;
        let mut last_error = String::new();

        for attempt in 0..=self.config.reconnection_attempts {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt - 1);
                debug!("Retrying in {:?} (attempt {})", delay, attempt);
                tokio::time::sleep(delay).await;
            }

            let timeout = self.config.connect_timeout();
            match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => return Ok(stream),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("timed out after {:?}", timeout),
            }
            warn!("⚠️ Connect to {} failed: {}", addr, last_error);
        }

        error!("❌ Giving up on {} after {} retries", addr, self.config.reconnection_attempts);
        Err(SocketError::Connect(last_error))
    }

    async fn handle_drop(&self, channel_id: u64) {
        {
            let mut slot = self.channel.lock().await;
            match slot.as_ref() {
                Some(channel) if channel.id == channel_id => *slot = None,
                _ => return,
            }
        }
        self.set_connected(false);

        if self.manual_disconnect.load(Ordering::SeqCst) {
            return;
        }
        warn!("🔄 Connection lost, reconnecting");
        if let Err(e) = self.connect().await {
            error!("❌ Reconnect failed: {}", e);
        }
    }

    /// Tears the channel down and stops reconnecting.
    pub async fn disconnect(&self) {
        self.manual_disconnect.store(true, Ordering::SeqCst);
        if let Some(channel) = self.channel.lock().await.take() {
            channel.close();
            info!("👋 Disconnected from solver");
        }
        self.set_connected(false);
    }

    /// Emits `event` and waits up to `timeout` for `response_event`. Unrelated
    /// traffic on the channel does not extend the wait.
    pub async fn request(
        &self,
        event: &str,
        payload: serde_json::Value,
        response_event: &str,
        timeout: Duration,
    ) -> SocketResult<serde_json::Value> {
        self.exchange(event, payload, response_event, None, timeout, |_| {})
            .await
    }

    /// Like [`request`](Self::request), but every `progress_event` frame is
    /// passed to `on_progress` and restarts the `idle_timeout` timer. Progress
    /// for other requests does not.
    pub async fn request_streaming<F>(
        &self,
        event: &str,
        payload: serde_json::Value,
        response_event: &str,
        progress_event: &str,
        idle_timeout: Duration,
        on_progress: F,
    ) -> SocketResult<serde_json::Value>
    where
        F: FnMut(serde_json::Value),
    {
        self.exchange(
            event,
            payload,
            response_event,
            Some(progress_event),
            idle_timeout,
            on_progress,
        )
        .await
    }

    async fn exchange<F>(
        &self,
        event: &str,
        payload: serde_json::Value,
        response_event: &str,
        progress_event: Option<&str>,
        idle_timeout: Duration,
        mut on_progress: F,
    ) -> SocketResult<serde_json::Value>
    where
        F: FnMut(serde_json::Value),
    {
        let channel = self.connect().await?;
        let mut subscription = channel.subscribe();
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        channel.emit(Frame::new(event, payload).with_id(request_id))?;

        // Only our own progress frames push the deadline out.
        let mut deadline = Instant::now() + idle_timeout;
        loop {
            let frame = match tokio::time::timeout_at(deadline, subscription.recv()).await {
                Err(_) => return Err(SocketError::Timeout(idle_timeout)),
                Ok(None) => return Err(SocketError::Closed),
                Ok(Some(frame)) => frame,
            };

            match frame.event.as_str() {
                DISCONNECT => return Err(SocketError::Disconnected),
                CONNECT_ERROR => return Err(SocketError::Connect(frame.data.to_string())),
                _ => {}
            }

            if progress_event.is_some_and(|p| frame.answers(p, request_id)) {
                deadline = Instant::now() + idle_timeout;
                on_progress(frame.data);
            } else if frame.answers(response_event, request_id) {
                return Ok(frame.data);
            }
        }
    }
}
