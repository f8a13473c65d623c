//! In-memory stand-ins for the database, S3 and SES used by unit and router tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;
use time::{macros::datetime, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::hash_password,
        repo::UserStore,
        repo_types::{NewUser, User, UserCredentials},
    },
    config::JwtConfig,
    db::StoreError,
    jobs::{
        repo::JobStore,
        repo_types::{Industry, Job, JobFilter, JobPatch, NewJob, PageRequest},
    },
    mailer::{EmailError, EmailMessage, Mailer},
    state::AppState,
    storage::StorageClient,
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserCredentials>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|c| c.user.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(UserCredentials {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|c| c.user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|c| c.user.id == id).map(|c| c.user.clone()))
    }
}

/// Every call fails as if the database were unreachable.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn create(&self, _user: NewUser) -> Result<User, StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }

    async fn find_credentials_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
}

pub fn failing_user_store() -> Arc<dyn UserStore> {
    Arc::new(FailingUserStore)
}

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<Vec<Job>>,
}

impl MemoryJobStore {
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: NewJob, owner_id: Uuid) -> Result<Job, StoreError> {
        let job = Job {
            id: Uuid::new_v4(),
            title: job.title,
            description: job.description,
            email: job.email,
            address: job.address,
            company: job.company,
            industry: job.industry,
            positions: job.positions,
            salary: job.salary,
            posting_date: job.posting_date,
            owner_id,
        };
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.posting_date.cmp(&a.posting_date).then(a.id.cmp(&b.id)));
        Ok(jobs
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.get(id))
    }

    async fn update(&self, id: Uuid, patch: JobPatch) -> Result<Option<Job>, StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter_mut().find(|j| j.id == id).map(|job| {
            patch.apply(job);
            job.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .iter()
            .position(|j| j.id == id)
            .map(|idx| jobs.remove(idx)))
    }
}

#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl FakeStorage {
    pub fn objects(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl StorageClient for FakeStorage {
    fn bucket(&self) -> &str {
        "fake-bucket"
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/fake-bucket/{}", key))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::AwsSes("sandbox rejected recipient".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub jobs: Arc<MemoryJobStore>,
    pub storage: Arc<FakeStorage>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app() -> TestApp {
    let jobs = Arc::new(MemoryJobStore::default());
    let storage = Arc::new(FakeStorage::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        jwt: JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_days: 7,
        }),
        users: Arc::new(MemoryUserStore::default()),
        jobs: jobs.clone(),
        storage: storage.clone(),
        mailer: mailer.clone(),
    };
    TestApp {
        state,
        jobs,
        storage,
        mailer,
    }
}

pub fn test_state() -> AppState {
    test_app().state
}

/// Creates a user with password `12345678` and returns it with a fresh token.
pub async fn register_user(state: &AppState, email: &str) -> (User, String) {
    let user = state
        .users
        .create(NewUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: hash_password("12345678").unwrap(),
        })
        .await
        .unwrap();
    let token = state.jwt.issue(user.id).unwrap();
    (user, token)
}

pub fn sample_job(owner_id: Uuid) -> Job {
    Job {
        id: Uuid::new_v4(),
        title: "Software Engineer".into(),
        description: "We are seeking a skilled Software Engineer to join our dynamic team.".into(),
        email: "example@example.com".into(),
        address: "123 Main Street, City, State, Zip".into(),
        company: "Tech Solutions Inc.".into(),
        industry: vec![Industry::InformationTechnology],
        positions: 2,
        salary: 80000,
        posting_date: datetime!(2024-05-12 0:00 UTC),
        owner_id,
    }
}
