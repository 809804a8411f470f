//! Session/tenant resolver.
//!
//! Turns the authentication state into the active tenant and keeps following it:
//!
//! ```text
//! Unresolved ──> Authenticating ──> LiveTenant | NoTenantAssigned | Failed
//!      └────────────────────────────> DemoTenant
//! ```
//!
//! A sign-in re-runs the live lookup and a sign-out reverts to the demo tenant. Only the
//! newest lookup may publish a result: starting a new one aborts the previous task, and a
//! generation counter checked under the state lock discards anything that still finishes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;
use vetpro_core::models::Tenant;
use vetpro_core::AppError;

use crate::directory::TenantDirectory;
use crate::provider::{AuthProvider, SessionEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolverState {
    Unresolved,
    Authenticating { user_id: Uuid },
    DemoTenant(Tenant),
    LiveTenant(Tenant),
    /// Signed in, but the profile has no clinic assigned.
    NoTenantAssigned { user_id: Uuid },
    Failed { reason: String },
}

impl ResolverState {
    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            ResolverState::DemoTenant(tenant) | ResolverState::LiveTenant(tenant) => Some(tenant),
            _ => None,
        }
    }

    /// True once a lookup has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            ResolverState::Unresolved | ResolverState::Authenticating { .. }
        )
    }
}

struct Inner {
    auth: Arc<dyn AuthProvider>,
    directory: Arc<dyn TenantDirectory>,
    state: watch::Sender<ResolverState>,
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

pub struct TenantResolver {
    inner: Arc<Inner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TenantResolver {
    pub fn new(auth: Arc<dyn AuthProvider>, directory: Arc<dyn TenantDirectory>) -> Self {
        let (state, _) = watch::channel(ResolverState::Unresolved);
        Self {
            inner: Arc::new(Inner {
                auth,
                directory,
                state,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Resolve from the current session and follow session changes until [`shutdown`].
    ///
    /// Calling it again restarts the subscription.
    ///
    /// [`shutdown`]: TenantResolver::shutdown
    pub async fn start(&self) {
        // Subscribe before reading the session so no change slips in between.
        let mut events = self.inner.auth.subscribe();

        match self.inner.auth.current_session().await {
            Some(session) => self.inner.begin_live(session.user.id),
            None => self.inner.use_demo(),
        }

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SignedIn(session)) => inner.begin_live(session.user.id),
                    Ok(SessionEvent::SignedOut) => inner.use_demo(),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed session events, re-checking session");
                        match inner.auth.current_session().await {
                            Some(session) => inner.begin_live(session.user.id),
                            None => inner.use_demo(),
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Session event feed closed");
                        break;
                    }
                }
            }
        });

        let previous = lock(&self.listener).replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn current(&self) -> ResolverState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolverState> {
        self.inner.state.subscribe()
    }

    /// Wait until the resolver has settled and return that state.
    pub async fn wait_resolved(&self) -> Result<ResolverState, AppError> {
        let mut rx = self.inner.state.subscribe();
        let state = rx
            .wait_for(ResolverState::is_settled)
            .await
            .map_err(|_| AppError::TenantContext("Tenant resolver stopped".into()))?;
        Ok(state.clone())
    }

    /// Stop following session changes and cancel any lookup in progress.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.listener).take() {
            handle.abort();
        }
        if let Some(handle) = lock(&self.inner.in_flight).take() {
            handle.abort();
        }
        tracing::debug!("Tenant resolver shut down");
    }
}

impl Drop for TenantResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    /// Publish `state` under a new generation, superseding any lookup in progress.
    fn supersede(&self, state: ResolverState) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|current| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *current = state;
        });
        if let Some(previous) = lock(&self.in_flight).take() {
            previous.abort();
        }
        generation
    }

    fn use_demo(&self) {
        self.supersede(ResolverState::DemoTenant(Tenant::demo()));
        tracing::info!("No session, using demo clinic");
    }

    fn begin_live(self: &Arc<Self>, user_id: Uuid) {
        let generation = self.supersede(ResolverState::Authenticating { user_id });

        let inner = self.clone();
        let handle = tokio::spawn(async move {
            let resolved = inner.lookup(user_id).await;
            let published = inner.state.send_if_modified(|current| {
                if inner.generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = resolved;
                true
            });
            if !published {
                tracing::debug!(%user_id, "Discarded superseded tenant lookup");
            }
        });
        *lock(&self.in_flight) = Some(handle);
    }

    async fn lookup(&self, user_id: Uuid) -> ResolverState {
        let profile = match self.directory.profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::error!(%user_id, "No profile for signed-in user");
                return ResolverState::Failed {
                    reason: format!("No profile found for user {}", user_id),
                };
            }
            Err(e) => {
                e.log("load user profile");
                return ResolverState::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(tenant_id) = profile.tenant_id else {
            tracing::warn!(%user_id, "User has no clinic assigned");
            return ResolverState::NoTenantAssigned { user_id };
        };

        match self.directory.tenant(tenant_id).await {
            Ok(Some(tenant)) => {
                tracing::info!(%user_id, tenant_id = %tenant.id, "Resolved clinic");
                ResolverState::LiveTenant(tenant)
            }
            Ok(None) => {
                tracing::error!(%user_id, %tenant_id, "Assigned clinic does not exist");
                ResolverState::Failed {
                    reason: format!("Clinic {} not found", tenant_id),
                }
            }
            Err(e) => {
                e.log("load tenant");
                ResolverState::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAuthProvider;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use vetpro_core::constants::DEMO_TENANT_ID;
    use vetpro_core::models::UserProfile;

    #[derive(Default)]
    struct FakeDirectory {
        profiles: HashMap<Uuid, UserProfile>,
        tenants: HashMap<Uuid, Tenant>,
        delays: HashMap<Uuid, Duration>,
        broken: bool,
    }

    impl FakeDirectory {
        fn with_member(mut self, user_id: Uuid, tenant: Option<Tenant>) -> Self {
            self.profiles.insert(
                user_id,
                UserProfile {
                    id: user_id,
                    tenant_id: tenant.as_ref().map(|t| t.id),
                    email: "vet@clinic.com".into(),
                    name: None,
                    role: None,
                    avatar_url: None,
                },
            );
            if let Some(tenant) = tenant {
                self.tenants.insert(tenant.id, tenant);
            }
            self
        }
    }

    #[async_trait]
    impl TenantDirectory for FakeDirectory {
        async fn profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
            if let Some(delay) = self.delays.get(&user_id) {
                tokio::time::sleep(*delay).await;
            }
            if self.broken {
                return Err(AppError::Internal("connection refused".into()));
            }
            Ok(self.profiles.get(&user_id).cloned())
        }

        async fn tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
            Ok(self.tenants.get(&tenant_id).cloned())
        }
    }

    fn live_tenant(name: &str) -> Tenant {
        let mut tenant = Tenant::demo();
        tenant.id = Uuid::new_v4();
        tenant.name = name.to_string();
        tenant.is_demo = false;
        tenant
    }

    async fn settle_on(
        resolver: &TenantResolver,
        pred: impl FnMut(&ResolverState) -> bool,
    ) -> ResolverState {
        let mut rx = resolver.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
            .await
            .expect("resolver did not reach the expected state")
            .unwrap();
        state.clone()
    }

    #[tokio::test]
    async fn test_unauthenticated_start_uses_demo_tenant() {
        let auth = Arc::new(InMemoryAuthProvider::new());
        let resolver = TenantResolver::new(auth, Arc::new(FakeDirectory::default()));
        assert_eq!(resolver.current(), ResolverState::Unresolved);

        resolver.start().await;
        let state = resolver.wait_resolved().await.unwrap();
        let tenant = state.tenant().unwrap();
        assert_eq!(tenant.id, DEMO_TENANT_ID);
        assert!(tenant.is_demo);
        assert!(matches!(state, ResolverState::DemoTenant(_)));
    }

    #[tokio::test]
    async fn test_existing_session_resolves_live_tenant() {
        let user_id = Uuid::new_v4();
        let clinic = live_tenant("Veterinaria Norte");
        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("vet@clinic.com", "pw", user_id).await;
        auth.sign_in_with_password("vet@clinic.com", "pw")
            .await
            .unwrap();

        let directory = FakeDirectory::default().with_member(user_id, Some(clinic.clone()));
        let resolver = TenantResolver::new(auth, Arc::new(directory));
        resolver.start().await;

        assert_eq!(
            resolver.wait_resolved().await.unwrap(),
            ResolverState::LiveTenant(clinic)
        );
    }

    #[tokio::test]
    async fn test_follows_sign_in_and_sign_out() {
        let user_id = Uuid::new_v4();
        let clinic = live_tenant("Veterinaria Norte");
        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("vet@clinic.com", "pw", user_id).await;
        let directory = FakeDirectory::default().with_member(user_id, Some(clinic.clone()));
        let resolver = TenantResolver::new(auth.clone(), Arc::new(directory));
        resolver.start().await;
        settle_on(&resolver, |s| matches!(s, ResolverState::DemoTenant(_))).await;

        auth.sign_in_with_password("vet@clinic.com", "pw")
            .await
            .unwrap();
        let state = settle_on(&resolver, |s| matches!(s, ResolverState::LiveTenant(_))).await;
        assert_eq!(state.tenant(), Some(&clinic));

        auth.sign_out().await.unwrap();
        let state = settle_on(&resolver, |s| matches!(s, ResolverState::DemoTenant(_))).await;
        assert_eq!(state.tenant().map(|t| t.id), Some(DEMO_TENANT_ID));
    }

    #[tokio::test]
    async fn test_profile_without_clinic_is_terminal() {
        let user_id = Uuid::new_v4();
        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("vet@clinic.com", "pw", user_id).await;
        auth.sign_in_with_password("vet@clinic.com", "pw")
            .await
            .unwrap();

        let directory = FakeDirectory::default().with_member(user_id, None);
        let resolver = TenantResolver::new(auth, Arc::new(directory));
        resolver.start().await;

        assert_eq!(
            resolver.wait_resolved().await.unwrap(),
            ResolverState::NoTenantAssigned { user_id }
        );
    }

    #[tokio::test]
    async fn test_backend_error_fails_resolution() {
        let user_id = Uuid::new_v4();
        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("vet@clinic.com", "pw", user_id).await;
        auth.sign_in_with_password("vet@clinic.com", "pw")
            .await
            .unwrap();

        let directory = FakeDirectory {
            broken: true,
            ..Default::default()
        };
        let resolver = TenantResolver::new(auth, Arc::new(directory));
        resolver.start().await;

        let state = resolver.wait_resolved().await.unwrap();
        assert!(matches!(state, ResolverState::Failed { .. }));
        assert!(state.tenant().is_none());
    }

    #[tokio::test]
    async fn test_newer_sign_in_supersedes_slow_lookup() {
        let slow_user = Uuid::new_v4();
        let fast_user = Uuid::new_v4();
        let slow_clinic = live_tenant("Lenta");
        let fast_clinic = live_tenant("Rápida");

        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("slow@clinic.com", "pw", slow_user).await;
        auth.add_user("fast@clinic.com", "pw", fast_user).await;

        let mut directory = FakeDirectory::default()
            .with_member(slow_user, Some(slow_clinic))
            .with_member(fast_user, Some(fast_clinic.clone()));
        directory
            .delays
            .insert(slow_user, Duration::from_millis(200));

        let resolver = TenantResolver::new(auth.clone(), Arc::new(directory));
        resolver.start().await;
        settle_on(&resolver, |s| matches!(s, ResolverState::DemoTenant(_))).await;

        auth.sign_in_with_password("slow@clinic.com", "pw")
            .await
            .unwrap();
        settle_on(&resolver, |s| {
            *s == ResolverState::Authenticating { user_id: slow_user }
        })
        .await;
        auth.sign_in_with_password("fast@clinic.com", "pw")
            .await
            .unwrap();

        settle_on(&resolver, |s| *s == ResolverState::LiveTenant(fast_clinic.clone())).await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(resolver.current(), ResolverState::LiveTenant(fast_clinic));
    }

    #[tokio::test]
    async fn test_shutdown_stops_following_sessions() {
        let user_id = Uuid::new_v4();
        let auth = Arc::new(InMemoryAuthProvider::new());
        auth.add_user("vet@clinic.com", "pw", user_id).await;
        let directory =
            FakeDirectory::default().with_member(user_id, Some(live_tenant("Norte")));
        let resolver = TenantResolver::new(auth.clone(), Arc::new(directory));
        resolver.start().await;
        settle_on(&resolver, |s| matches!(s, ResolverState::DemoTenant(_))).await;

        resolver.shutdown();
        auth.sign_in_with_password("vet@clinic.com", "pw")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(resolver.current(), ResolverState::DemoTenant(_)));
    }
}
