use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::admin::AdminClient;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::domain::aggregates::{Cart, Checkout};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::error::{Result, StoreError};

pub const HANDOFF_SUBJECT: &str = "tienda.orders.handed_off";

/// Everything one shopper has in flight, like a single browser tab.
#[derive(Debug, Default)]
pub struct Session {
    pub cart: Cart,
    pub checkout: Checkout,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self { Self { last_seen: Utc::now(), ..Default::default() } }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = self.cart.take_events();
        events.extend(self.checkout.take_events());
        events
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
    pub admin: Option<AdminClient>,
    pub nats: Option<async_nats::Client>,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: Config, admin: Option<AdminClient>, nats: Option<async_nats::Client>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            admin,
            nats,
            sessions: Arc::default(),
        }
    }

    pub async fn create_session(&self) -> Uuid {
        let id = Uuid::now_v7();
        self.sessions.write().await.insert(id, Arc::new(Mutex::new(Session::new())));
        debug!(session = %id, "session created");
        id
    }

    /// Each session is locked for the duration of one request, so cart
    /// mutations from the same shopper never interleave.
    pub async fn session(&self, id: Uuid) -> Result<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&id).cloned().ok_or(StoreError::SessionNotFound(id))
    }

    pub async fn session_count(&self) -> usize { self.sessions.read().await.len() }

    /// Drops sessions not seen since `ttl` before `now`. A session locked by a
    /// request in progress is kept.
    pub async fn sweep_idle_sessions(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else { return 0 };
        let cutoff = now - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.last_seen >= cutoff,
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Sweeps idle sessions in the background, checking a few times per TTL.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let ttl = self.config.session_ttl;
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let dropped = state.sweep_idle_sessions(Utc::now(), ttl).await;
                if dropped > 0 {
                    let remaining = state.session_count().await;
                    debug!(dropped, remaining, "idle sessions swept");
                }
            }
        })
    }

    pub fn admin(&self) -> Result<&AdminClient> { self.admin.as_ref().ok_or(StoreError::AdminDisabled) }

    pub async fn dispatch(&self, session: Uuid, events: Vec<DomainEvent>) {
        for event in events {
            debug!(session = %session, ?event, "domain event");
            if let DomainEvent::Checkout(CheckoutEvent::OrderHandedOff { ref customer, total, .. }) = event {
                info!(session = %session, customer = %customer, total = total.amount(), "order handed off to WhatsApp");
                self.publish(&event).await;
            }
        }
    }

    async fn publish(&self, event: &DomainEvent) {
        let Some(nats) = &self.nats else { return };
        match serde_json::to_vec(event) {
            Ok(payload) => {
                if let Err(e) = nats.publish(HANDOFF_SUBJECT.to_string(), payload.into()).await {
                    warn!(error = %e, "failed to publish hand-off event");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode hand-off event"),
        }
    }
}
