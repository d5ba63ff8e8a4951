#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use chrono::{DateTime, NaiveDate, Utc};
use link_tracker::api::routes::{api_routes, public_routes};
use link_tracker::application::services::ClickRecorder;
use link_tracker::config::{CodeGeneratorConfig, EnrichmentConfig};
use link_tracker::domain::click_event::ClickJob;
use link_tracker::domain::click_worker::process_job;
use link_tracker::domain::entities::{Click, DeviceType, Link, LinkPatch, NewClick, NewLink};
use link_tracker::domain::repositories::{
    ClickRepository, ClickTotals, DailyReport, DateCount, LabelCount, LinkRepository,
    LinkWithClicks,
};
use link_tracker::enrichment::{RequestEnricher, WootheeParser};
use link_tracker::error::AppError;
use link_tracker::infrastructure::geoip::NullGeoLocator;
use link_tracker::state::AppState;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "https://s.example.com";

/// Links and clicks kept in memory, with the same uniqueness and cascade
/// rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryStore {
    links: Mutex<Vec<Link>>,
    clicks: Mutex<Vec<Click>>,
    next_link_id: AtomicI64,
    next_click_id: AtomicI64,
    unavailable: AtomicBool,
}

fn store_error() -> AppError {
    AppError::internal("Database error", json!({}))
}

fn grouped(labels: impl Iterator<Item = String>, limit: Option<i64>) -> Vec<LabelCount> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut rows: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    if let Some(limit) = limit {
        rows.truncate(limit.max(0) as usize);
    }
    rows
}

impl InMemoryStore {
    /// Makes every read fail, as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(store_error())
        } else {
            Ok(())
        }
    }

    pub async fn seed_link(&self, short_code: &str, original_url: &str) -> Link {
        self.create(NewLink {
            short_code: short_code.to_string(),
            custom_alias: None,
            original_url: original_url.to_string(),
            title: None,
            description: None,
            expires_at: None,
        })
        .await
        .unwrap()
    }

    pub async fn seed_alias_link(&self, short_code: &str, alias: &str, original_url: &str) -> Link {
        self.create(NewLink {
            short_code: short_code.to_string(),
            custom_alias: Some(alias.to_string()),
            original_url: original_url.to_string(),
            title: None,
            description: None,
            expires_at: None,
        })
        .await
        .unwrap()
    }

    /// Overwrites stored fields directly, bypassing service validation.
    pub fn modify_link(&self, id: i64, f: impl FnOnce(&mut Link)) {
        let mut links = self.links.lock().unwrap();
        let link = links.iter_mut().find(|l| l.id == id).unwrap();
        f(link);
    }

    pub async fn seed_click(&self, link_id: i64, f: impl FnOnce(&mut NewClick)) -> Click {
        let mut new_click = NewClick {
            link_id,
            clicked_at: Utc::now(),
            ip_address: None,
            country: None,
            country_name: None,
            city: None,
            region: None,
            device_type: DeviceType::Desktop,
            browser: None,
            browser_version: None,
            platform: None,
            referrer: None,
            referrer_domain: None,
            is_qr_code: false,
            user_agent: None,
        };
        f(&mut new_click);
        self.record_click(new_click).await.unwrap()
    }

    pub fn click_count(&self) -> usize {
        self.clicks.lock().unwrap().len()
    }

    pub fn clicks_for(&self, link_id: i64) -> Vec<Click> {
        self.clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();

        let tokens: HashSet<&str> = links
            .iter()
            .flat_map(|l| std::iter::once(l.short_code.as_str()).chain(l.custom_alias.as_deref()))
            .collect();

        if tokens.contains(new_link.short_code.as_str()) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "field": "short_code" }),
            ));
        }

        if let Some(alias) = new_link.custom_alias.as_deref()
            && (tokens.contains(alias) || alias == new_link.short_code)
        {
            return Err(AppError::conflict(
                "This alias is already taken",
                json!({ "field": "custom_alias" }),
            ));
        }

        let now = Utc::now();
        let link = Link {
            id: self.next_link_id.fetch_add(1, Ordering::SeqCst) + 1,
            short_code: new_link.short_code,
            custom_alias: new_link.custom_alias,
            original_url: new_link.original_url,
            title: new_link.title,
            description: new_link.description,
            is_active: true,
            expires_at: new_link.expires_at,
            created_at: now,
            updated_at: now,
        };
        links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code_or_alias(&self, token: &str) -> Result<Option<Link>, AppError> {
        self.check_available()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_code == token || l.custom_alias.as_deref() == Some(token))
            .cloned())
    }

    async fn exists_by_code_or_alias(&self, token: &str) -> Result<bool, AppError> {
        Ok(self.find_by_code_or_alias(token).await?.is_some())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        self.check_available()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn list_with_click_counts(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<LinkWithClicks>, AppError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap().clone();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let clicks = self.clicks.lock().unwrap();
        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|link| {
                let total_clicks = clicks.iter().filter(|c| c.link_id == link.id).count() as i64;
                LinkWithClicks { link, total_clicks }
            })
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.check_available()?;
        Ok(self.links.lock().unwrap().len() as i64)
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))?;

        if let Some(title) = patch.title {
            link.title = title;
        }
        if let Some(description) = patch.description {
            link.description = description;
        }
        if let Some(is_active) = patch.is_active {
            link.is_active = is_active;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.id != id);
        let deleted = links.len() != before;

        if deleted {
            self.clicks.lock().unwrap().retain(|c| c.link_id != id);
        }
        Ok(deleted)
    }

    async fn deactivate_expired(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let mut count = 0;
        for link in self.links.lock().unwrap().iter_mut() {
            if link.is_active && link.expires_at.is_some_and(|e| e <= now) {
                link.is_active = false;
                link.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let link_exists = self
            .links
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.id == new_click.link_id);
        if !link_exists {
            return Err(store_error());
        }

        let click = new_click.into_click(self.next_click_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.clicks.lock().unwrap().push(click.clone());
        Ok(click)
    }

    async fn totals(&self, link_id: i64) -> Result<ClickTotals, AppError> {
        let clicks = self.clicks_for(link_id);
        let qr = clicks.iter().filter(|c| c.is_qr_code).count() as i64;
        let total = clicks.len() as i64;

        Ok(ClickTotals {
            total,
            qr,
            direct: total - qr,
        })
    }

    async fn clicks_by_date(
        &self,
        link_id: i64,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<DateCount>, AppError> {
        let mut counts: HashMap<NaiveDate, i64> = HashMap::new();
        for click in self.clicks_for(link_id) {
            if since.is_none_or(|s| click.clicked_at >= s) {
                *counts.entry(click.clicked_at.date_naive()).or_default() += 1;
            }
        }

        let mut rows: Vec<DateCount> = counts
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn clicks_by_country(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError> {
        Ok(grouped(
            self.clicks_for(link_id).into_iter().filter_map(|c| c.country_name),
            Some(limit),
        ))
    }

    async fn clicks_by_device(&self, link_id: i64) -> Result<Vec<LabelCount>, AppError> {
        Ok(grouped(
            self.clicks_for(link_id)
                .into_iter()
                .map(|c| c.device_type.as_str().to_string()),
            None,
        ))
    }

    async fn clicks_by_referrer(
        &self,
        link_id: i64,
        limit: i64,
    ) -> Result<Vec<LabelCount>, AppError> {
        Ok(grouped(
            self.clicks_for(link_id)
                .into_iter()
                .filter_map(|c| c.referrer_domain),
            Some(limit),
        ))
    }

    async fn recent_clicks(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let mut clicks = self.clicks_for(link_id);
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        clicks.truncate(limit.max(0) as usize);
        Ok(clicks)
    }

    async fn daily_report(&self, day: NaiveDate) -> Result<DailyReport, AppError> {
        let clicks = self.clicks.lock().unwrap();
        let of_day: Vec<&Click> = clicks
            .iter()
            .filter(|c| c.clicked_at.date_naive() == day)
            .collect();
        let unique: HashSet<i64> = of_day.iter().map(|c| c.link_id).collect();

        Ok(DailyReport {
            total_clicks: of_day.len() as i64,
            unique_links: unique.len() as i64,
        })
    }
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// A test server wired like production, minus rate limiting and Postgres.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
    pub clicks_rx: mpsc::Receiver<ClickJob>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_code_config(CodeGeneratorConfig::default())
    }

    pub fn with_code_config(code_config: CodeGeneratorConfig) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let (tx, rx) = mpsc::channel(100);

        let state = AppState::new(store.clone(), store.clone(), code_config, tx, BASE_URL);

        let app = Router::new()
            .merge(public_routes())
            .nest("/api", api_routes())
            .layer(MockConnectInfoLayer)
            .with_state(state.clone());

        Self {
            server: TestServer::new(app).unwrap(),
            store,
            state,
            clicks_rx: rx,
        }
    }

    /// Runs every queued click job through enrichment and recording, the way
    /// the background worker would. Returns how many clicks were stored.
    pub async fn record_pending_clicks(&mut self) -> usize {
        let enricher = RequestEnricher::new(
            EnrichmentConfig::default(),
            Arc::new(NullGeoLocator::new()),
            Arc::new(WootheeParser::default()),
        );
        let recorder = ClickRecorder::new(self.store.clone());

        let mut recorded = 0;
        while let Ok(job) = self.clicks_rx.try_recv() {
            if process_job(job, &enricher, &recorder).await {
                recorded += 1;
            }
        }
        recorded
    }
}
