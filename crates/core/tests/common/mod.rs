use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;

use arttrack_core::commission::{Commission, NewCommission};
use arttrack_core::dashboard::Dashboard;
use arttrack_core::error::{AuthError, StoreError};
use arttrack_core::identity::{Identity, IdentityProvider};
use arttrack_core::seed::default_commissions;
use arttrack_core::status::CommissionStatus;
use arttrack_core::store::{sort_newest_first, CommissionStore};
use arttrack_core::types::CalendarDate;

/// Fixed "today" used by every scenario.
pub fn test_today() -> CalendarDate {
    NaiveDate::from_ymd_opt(2023, 11, 5).unwrap()
}

pub fn artist(name: &str) -> Identity {
    Identity {
        user_id: format!("uid-{name}"),
        display_name: name.to_string(),
    }
}

/// Which store call should fail, and how.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub list: Option<StoreError>,
    pub owner_query: Option<StoreError>,
    pub mutations: Option<StoreError>,
}

/// In-memory persistence collaborator with injectable failures.
#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<Vec<Commission>>,
    pub failures: Mutex<Failures>,
    pub list_all_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeStore {
    pub fn seeded() -> Arc<Self> {
        Self::with_records(default_commissions())
    }

    pub fn with_records(records: Vec<Commission>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            next_id: AtomicUsize::new(500),
            ..Self::default()
        })
    }

    pub fn fail_mutations(&self, err: StoreError) {
        self.failures.lock().unwrap().mutations = Some(err);
    }

    pub fn fail_listing(&self, err: StoreError) {
        self.failures.lock().unwrap().list = Some(err);
    }

    pub fn fail_owner_query(&self, err: StoreError) {
        self.failures.lock().unwrap().owner_query = Some(err);
    }

    fn mutation_result(&self) -> Result<(), StoreError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match &self.failures.lock().unwrap().mutations {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CommissionStore for FakeStore {
    async fn list_all(&self) -> Result<Vec<Commission>, StoreError> {
        self.list_all_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failures.lock().unwrap().list {
            return Err(err.clone());
        }
        let mut all = self.records.lock().unwrap().clone();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn list_for_owner(&self, artist_id: &str) -> Result<Vec<Commission>, StoreError> {
        let failures = self.failures.lock().unwrap().clone();
        if let Some(err) = failures.owner_query.or(failures.list) {
            return Err(err);
        }
        let mut owned: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_owned_by(artist_id))
            .cloned()
            .collect();
        sort_newest_first(&mut owned);
        Ok(owned)
    }

    async fn create(&self, data: NewCommission) -> Result<Commission, StoreError> {
        self.mutation_result()?;
        let id = format!("c-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = data.with_id(id);
        self.records.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn set_status(&self, id: &str, status: CommissionStatus) -> Result<(), StoreError> {
        self.mutation_result()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.apply_status(status, test_today());
                Ok(())
            }
            None => Err(StoreError::Transport(format!("{id} not found"))),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.mutation_result()?;
        self.records.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

/// Identity collaborator that accepts any secret except `"wrong"`.
pub struct FakeProvider {
    tx: watch::Sender<Option<Identity>>,
    pub sign_up_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(initial: Option<Identity>) -> Arc<Self> {
        let (tx, _rx) = watch::channel(initial);
        Arc::new(Self {
            tx,
            sign_up_calls: AtomicUsize::new(0),
        })
    }

    /// Simulate an asynchronous identity change (restored session, expired
    /// refresh token).
    pub fn push(&self, identity: Option<Identity>) {
        self.tx.send_replace(identity);
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        if secret == "wrong" {
            return Err(AuthError::InvalidCredential);
        }
        let name = match email {
            "bear@example.com" => "熊熊繪圖",
            _ => "兔兔老師",
        };
        let identity = artist(name);
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        let identity = artist(display_name);
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.tx.send_replace(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

pub type TestDashboard = Dashboard<FakeStore, FakeProvider>;

pub fn dashboard(store: &Arc<FakeStore>, provider: &Arc<FakeProvider>) -> TestDashboard {
    Dashboard::new(Arc::clone(store), Arc::clone(provider)).with_clock(test_today)
}

/// A dashboard signed in as `兔兔老師` in admin mode, loaded.
pub async fn bunny_dashboard(store: &Arc<FakeStore>) -> TestDashboard {
    let provider = FakeProvider::new(None);
    let mut dash = dashboard(store, &provider);
    dash.toggle_mode().await;
    dash.sign_in("bunny@example.com", "secret123").await.unwrap();
    dash
}
