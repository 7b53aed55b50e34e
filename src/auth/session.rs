//! Session management
//!
//! [`SessionStore`] owns the bearer token, the cached [`Profile`] and the
//! default outbound header map. Every mutation of those three goes through this
//! type so the token and profile are always set and cleared together.
//!
//! Reads are served from an in-memory cache that is filled from durable
//! storage on first access. A monotonic generation counter is bumped by every
//! mutation; [`SessionStore::login`] compares it before and after the network
//! round trip and refuses to install a response that a later logout or
//! invalidation has already superseded.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::auth::models::{Credentials, LoginResponse, Profile, SessionEvent};
use crate::auth::storage::{SessionStorage, TOKEN_KEY, USER_INFO_KEY};
use crate::error::{Error, Result};

/// Anything that can exchange credentials for a login response
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse>;
}

/// Point-in-time view of the session, as consumed by the navigation guard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub roles: BTreeSet<String>,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authenticated: true,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Handle returned by [`SessionStore::on_change`]
pub type SubscriptionId = u64;

type Observer = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Cache {
    loaded: bool,
    token: Option<String>,
    profile: Option<Profile>,
    headers: HeaderMap,
}

impl Cache {
    fn has_session(&self) -> bool {
        self.token.is_some() || self.profile.is_some()
    }
}

/// Single source of truth for "is someone logged in, and as whom"
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    cache: Mutex<Cache>,
    generation: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl SessionStore {
    /// Create a store over the given storage; nothing is read until first use
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self::with_storage(Box::new(storage))
    }

    pub fn with_storage(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            cache: Mutex::new(Cache::default()),
            generation: AtomicU64::new(0),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Log in through `backend` and persist the resulting session
    ///
    /// On any failure the local session is cleared and the error returned.
    /// If the session changed while the request was in flight, the response is
    /// dropped and [`Error::LoginSuperseded`] is returned instead.
    pub async fn login<B>(&self, backend: &B, credentials: &Credentials) -> Result<Profile>
    where
        B: AuthBackend + ?Sized,
    {
        let started_at = self.generation();
        debug!(username = %credentials.username, generation = started_at, "Login requested");

        let outcome = backend
            .authenticate(credentials)
            .await
            .and_then(|response| response.into_session().ok_or(Error::AuthResponseMalformed));

        let mut cache = self.load();
        let superseded = self.generation() != started_at;

        let (token, profile) = match outcome {
            Ok(_) if superseded => {
                warn!(
                    username = %credentials.username,
                    "Discarding login response: session changed while the request was in flight"
                );
                return Err(Error::LoginSuperseded);
            }
            Ok(session) => session,
            Err(e) => {
                if !superseded && self.clear_locked(&mut cache) {
                    self.bump_generation();
                }
                drop(cache);
                warn!(username = %credentials.username, error = %e, "Login failed");
                return Err(e);
            }
        };

        if let Err(e) = self.install_locked(&mut cache, token, profile.clone()) {
            if self.clear_locked(&mut cache) {
                self.bump_generation();
            }
            drop(cache);
            warn!(username = %credentials.username, error = %e, "Failed to persist session");
            return Err(e);
        }
        self.bump_generation();
        drop(cache);

        info!(username = %profile.username, "Logged in");
        self.notify(&SessionEvent::logged_in(profile.clone()));
        Ok(profile)
    }

    /// Clear the session everywhere. Safe to call when already logged out.
    pub fn logout(&self) {
        let mut cache = self.load();
        let had_session = self.clear_locked(&mut cache);
        // Any login still in flight must not resurrect the session.
        self.bump_generation();
        drop(cache);

        if had_session {
            info!("Logged out");
            self.notify(&SessionEvent::logged_out());
        } else {
            debug!("Logout requested with no active session");
        }
    }

    /// Clear the session because the backend rejected the credential (HTTP 401)
    pub fn invalidate(&self) {
        let mut cache = self.load();
        let had_session = self.clear_locked(&mut cache);
        if had_session {
            self.bump_generation();
        }
        drop(cache);

        if had_session {
            warn!("Server rejected the session token; logged out locally");
            self.notify(&SessionEvent::logged_out());
        }
    }

    pub fn token(&self) -> Option<String> {
        self.load().token.clone()
    }

    /// Cached profile, or `None` if absent or unreadable
    pub fn profile(&self) -> Option<Profile> {
        self.load().profile.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.load().token.is_some()
    }

    /// False (never an error) when nobody is logged in
    pub fn has_role(&self, role: &str) -> bool {
        self.load()
            .profile
            .as_ref()
            .is_some_and(|profile| profile.has_role(role))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let cache = self.load();
        SessionSnapshot {
            authenticated: cache.token.is_some(),
            roles: cache
                .profile
                .as_ref()
                .map(|p| p.roles.clone())
                .unwrap_or_default(),
        }
    }

    /// Default headers every outbound request is stamped with
    pub fn outbound_headers(&self) -> HeaderMap {
        self.load().headers.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Register an observer for login and logout events
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.observers().push((id, Arc::new(callback)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    // Internal helpers

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Lock the cache, filling it from storage on first access
    fn load(&self) -> MutexGuard<'_, Cache> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if !cache.loaded {
            self.restore_locked(&mut cache);
        }
        cache
    }

    fn restore_locked(&self, cache: &mut Cache) {
        cache.loaded = true;

        cache.token = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read stored token");
                None
            }
        };

        cache.profile = match self.storage.get(USER_INFO_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "Stored user info is malformed; ignoring it");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read stored user info");
                None
            }
        };

        cache.headers.remove(AUTHORIZATION);
        if let Some(token) = &cache.token {
            match bearer(token) {
                Ok(value) => {
                    cache.headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "Stored token is not a valid header value"),
            }
        }

        debug!(
            authenticated = cache.token.is_some(),
            "Session restored from storage"
        );
    }

    fn install_locked(&self, cache: &mut Cache, token: String, profile: Profile) -> Result<()> {
        let header = bearer(&token)?;
        let user_info = serde_json::to_string(&profile)?;

        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_INFO_KEY, &user_info)?;

        cache.headers.insert(AUTHORIZATION, header);
        cache.token = Some(token);
        cache.profile = Some(profile);
        Ok(())
    }

    /// Returns whether a session was present before clearing
    fn clear_locked(&self, cache: &mut Cache) -> bool {
        let had_session = cache.has_session();

        for key in [TOKEN_KEY, USER_INFO_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session key from storage");
            }
        }

        cache.token = None;
        cache.profile = None;
        cache.headers.remove(AUTHORIZATION);
        had_session
    }

    fn observers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self, event: &SessionEvent) {
        // Callbacks run outside the lock so they may call back into the store.
        let observers: Vec<Observer> = self
            .observers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in observers {
            callback(event);
        }
    }
}

fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    Ok(value)
}
