#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use discover_api::app::{app, AppState};
use discover_api::config::AppConfig;
use discover_api::database::models::{Business, Claim, NewBusiness, NewClaim, NewProfile, Profile};
use discover_api::database::{BusinessStore, ClaimStore, MemoryStore, ProfileStore, Store};
use discover_api::types::{OnboardingStep, Role};

pub use discover_api::handlers::public::hooks::HOOK_SECRET_HEADER;

/// Router served in-process on an unused port, backed by a fresh memory store
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState::new(dyn_store, AppConfig::development());

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let router = app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        // Redirects are what we assert on, so never follow them
        let client = Client::builder().redirect(Policy::none()).build()?;

        let test_app = Self { base_url, store, state, client };
        test_app.wait_ready(Duration::from_secs(5)).await?;
        Ok(test_app)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hook_secret(&self) -> &str {
        &self.state.config.security.hook_secret
    }

    pub fn token_for(&self, account_id: Uuid) -> String {
        self.state.sessions.issue(account_id, None).expect("token mint")
    }

    /// Profile with `steps` onboarding steps already completed
    pub async fn seed_profile(&self, role: Role, steps: usize) -> Result<Profile> {
        let account_id = Uuid::new_v4();
        let (mut profile, _) = self
            .store
            .create_profile(NewProfile {
                account_id,
                email: Some(format!("{}@example.com", account_id.simple())),
                role,
            })
            .await?;
        for step in OnboardingStep::ALL.iter().take(steps) {
            profile = self.store.complete_onboarding_step(account_id, *step).await?;
        }
        Ok(profile)
    }

    pub async fn onboarded_user(&self) -> Result<Profile> {
        self.seed_profile(Role::User, OnboardingStep::ALL.len()).await
    }

    pub async fn new_user(&self) -> Result<Profile> {
        self.seed_profile(Role::User, 0).await
    }

    pub async fn business_owner(&self) -> Result<Profile> {
        self.seed_profile(Role::BusinessOwner, 0).await
    }

    pub async fn admin(&self) -> Result<Profile> {
        self.seed_profile(Role::Admin, 0).await
    }

    pub async fn seed_business(&self, name: &str) -> Result<Business> {
        Ok(self.store.create_business(NewBusiness::named(name)).await?)
    }

    /// Claim approved directly in the store, leaving a verified ownership link
    pub async fn seed_ownership(&self, owner: &Profile, business: &Business) -> Result<Claim> {
        let claim = self
            .store
            .submit_claim(NewClaim { profile_id: owner.id, business_id: business.id, note: None })
            .await?;
        Ok(self
            .store
            .record_review(claim.id, discover_api::database::models::ClaimStatus::Approved, Uuid::new_v4())
            .await?)
    }

    pub async fn get(&self, path: &str, as_profile: Option<&Profile>) -> Result<reqwest::Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(profile) = as_profile {
            request = request.bearer_auth(self.token_for(profile.id));
        }
        Ok(request.send().await?)
    }

    /// Page navigation carrying the session in the cookie, as a browser would
    pub async fn navigate(&self, path: &str, as_profile: Option<&Profile>) -> Result<reqwest::Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(profile) = as_profile {
            let cookie = format!("access_token={}", self.token_for(profile.id));
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    pub fn authed(&self, method: reqwest::Method, path: &str, profile: &Profile) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(self.token_for(profile.id))
    }
}

pub fn location(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn json_body(resp: reqwest::Response) -> Result<Value> {
    Ok(resp.json::<Value>().await?)
}
