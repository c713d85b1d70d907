//! Application state and business logic.
//!
//! The `App` struct owns the session services and all UI state. Every screen
//! change goes through `navigate`, which asks the route guard where the
//! requested path may actually render. List data is fetched in background
//! tasks and delivered back over an mpsc channel.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::future::OptionFuture;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use eyesonasset_core::api::{ApiClient, ApiError, Page};
use eyesonasset_core::auth::{
    AuthGateway, Clock, Credentials, KeyValueStorage, LocalSessionStore, LogoutAction,
    SessionEvaluator, SessionStore, SystemClock,
};
use eyesonasset_core::cache::ResourceList;
use eyesonasset_core::models::{Asset, AssetSortColumn, Owner, OwnerSortColumn};
use eyesonasset_core::routing::{NavigationLog, RouteConfig, RouteGuard};
use eyesonasset_core::Config;

use crate::form::Form;

// ============================================================================
// Constants
// ============================================================================

/// Path of the owner list screen
pub const OWNERS_PATH: &str = "/app/owner";

/// Path of the asset list screen
pub const ASSETS_PATH: &str = "/app/asset";

/// Buffer size for the background refresh channel
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of rows moved by PageUp/PageDown
pub const PAGE_SCROLL_SIZE: usize = 10;

const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

// ============================================================================
// Enums
// ============================================================================

/// Which screen is rendered for the current location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Owners,
    Assets,
}

impl Screen {
    /// Map an allowed path to its screen. Unknown protected paths render the
    /// owner list; the sign-up form only renders on a public path.
    pub fn for_path(path: &str, routes: &RouteConfig) -> Self {
        if path == routes.login_path {
            Screen::Login
        } else if routes.is_register(path) && routes.is_public(path) {
            Screen::Register
        } else if path == ASSETS_PATH {
            Screen::Assets
        } else {
            Screen::Owners
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Screen::Login | Screen::Register)
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::Owners => "Owners",
            Screen::Assets => "Assets",
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Editing,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from background list fetches. Each carries the
/// navigation generation it was started in.
#[derive(Debug)]
enum RefreshResult {
    Owners(u64, Vec<Owner>),
    Assets(u64, Vec<Asset>),
    Error(u64, String),
    /// The backend rejected the token; the session is already cleared
    Unauthorized,
    Complete(u64),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    store: Arc<dyn SessionStore>,
    guard: RouteGuard,
    gateway: AuthGateway,
    logout_action: LogoutAction,
    api: ApiClient,

    // Routing
    pub location: String,
    pub screen: Screen,
    pub state: AppState,

    // Forms
    pub login_form: Form,
    pub edit_form: Option<Form>,
    pub pending_delete: Option<Uuid>,

    // Data
    pub owners: ResourceList<Owner>,
    pub assets: ResourceList<Asset>,
    pub owner_sort: OwnerSortColumn,
    pub asset_sort: AssetSortColumn,
    pub owner_selection: usize,
    pub asset_selection: usize,

    pub status_message: Option<String>,
    pub loading: bool,

    /// Bumped on every screen change; results from older generations are dropped
    generation: u64,
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
}

impl App {
    /// Create the app with the configured storage backend
    pub fn new(config: Config) -> Result<Self> {
        let storage = config.open_storage(&config.cache_dir()?);
        Self::with_services(config, storage, Arc::new(SystemClock))
    }

    pub fn with_services(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(
            LocalSessionStore::new(storage, clock.clone())
                .with_fallback_lifetime(config.session_fallback_secs),
        );
        let evaluator = SessionEvaluator::new(store.clone(), clock);
        let guard = RouteGuard::new(config.routes.clone(), evaluator)?;
        let gateway = AuthGateway::new(&config)?;
        let api = ApiClient::new(&config, store.clone())?;
        let logout_action = LogoutAction::new(store.clone(), config.routes.login_path.clone());
        let login_form = Form::login(config.last_identifier.as_deref().unwrap_or_default());
        let (refresh_tx, refresh_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            location: config.routes.login_path.clone(),
            config,
            store,
            guard,
            gateway,
            logout_action,
            api,
            screen: Screen::Login,
            state: AppState::Normal,
            login_form,
            edit_form: None,
            pending_delete: None,
            owners: ResourceList::new(),
            assets: ResourceList::new(),
            owner_sort: OwnerSortColumn::default(),
            asset_sort: AssetSortColumn::default(),
            owner_selection: 0,
            asset_selection: 0,
            status_message: None,
            loading: false,
            generation: 0,
            refresh_rx,
            refresh_tx,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to `path`, or wherever the guard sends us instead
    pub fn navigate(&mut self, path: &str) {
        let resolution = self.guard.resolve(path);
        if resolution.redirects > 0 {
            debug!(requested = path, landed = %resolution.path, "Navigation redirected");
        }
        self.show(&resolution.path);
    }

    /// Re-run the guard for the current location
    pub fn recheck(&mut self) {
        let here = self.location.clone();
        self.navigate(&here);
    }

    pub fn home_path(&self) -> String {
        self.guard.routes().home_path.clone()
    }

    pub fn login_path(&self) -> String {
        self.guard.routes().login_path.clone()
    }

    /// Sign-up path, if registration is configured
    pub fn register_path(&self) -> Option<String> {
        self.guard.routes().register_path.clone()
    }

    fn show(&mut self, path: &str) {
        self.generation += 1;
        self.location = path.to_string();
        self.screen = Screen::for_path(path, self.guard.routes());
        self.state = AppState::Normal;
        self.edit_form = None;
        self.pending_delete = None;
        self.loading = false;

        match self.screen {
            Screen::Login => {
                // Another account may log in next
                self.owners.reset();
                self.assets.reset();
                let identifier = self.config.last_identifier.clone().unwrap_or_default();
                self.login_form = Form::login(&identifier);
            }
            Screen::Register => {
                self.login_form = Form::login("");
            }
            Screen::Owners | Screen::Assets => self.refresh_if_stale(),
        }
    }

    /// Minutes left on the stored session, if one is valid
    pub fn session_minutes_left(&self) -> Option<i64> {
        let evaluator = self.guard.evaluator();
        evaluator
            .current()
            .map(|record| record.minutes_until_expiry(evaluator.clock().now()))
    }

    pub fn logout(&mut self) {
        let mut nav = NavigationLog::new();
        self.logout_action.logout(&mut nav);
        let target = nav.location().map(str::to_string).unwrap_or_else(|| self.login_path());
        self.navigate(&target);
        self.status_message = Some("Logged out".to_string());
    }

    /// Leave a protected screen once the stored session has run out. Called
    /// every tick so expiry does not wait for the next key press.
    pub fn check_session(&mut self) {
        if self.screen.is_public() || self.guard.evaluator().is_valid() {
            return;
        }
        info!(location = %self.location, "Session expired while on a protected screen");
        self.recheck();
        self.status_message = Some(SESSION_EXPIRED_MESSAGE.to_string());
    }

    /// A request came back 401: the session is gone, so let the guard decide
    fn handle_unauthorized(&mut self) {
        warn!(location = %self.location, "Request unauthorized, re-checking route");
        self.recheck();
        self.status_message = Some(SESSION_EXPIRED_MESSAGE.to_string());
    }

    // =========================================================================
    // Login / Register
    // =========================================================================

    /// Fill the login form from the environment. Only the form is touched.
    pub fn prefill_login(&mut self, identifier: Option<String>, password: Option<String>) {
        if let Some(identifier) = identifier {
            self.login_form = Form::login(&identifier);
        }
        if let Some(password) = password {
            if let Some(field) = self.login_form.fields.iter_mut().find(|f| f.key == "password") {
                field.value = password;
            }
        }
    }

    fn form_credentials(&self) -> Credentials {
        Credentials::new(
            self.login_form.value("identifier"),
            self.login_form.value("password"),
        )
    }

    fn clear_password(&mut self) {
        if let Some(field) = self.login_form.fields.iter_mut().find(|f| f.key == "password") {
            field.value.clear();
        }
    }

    pub async fn submit_login(&mut self) {
        let credentials = self.form_credentials();
        self.login_form.clear_feedback();
        if let Err(e) = credentials.validate() {
            self.login_form.errors = Some(e);
            return;
        }

        match self.gateway.sign_in(&credentials, self.store.as_ref()).await {
            Ok(_) => {
                self.config.last_identifier = Some(credentials.identifier.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.status_message = None;
                let home = self.home_path();
                self.navigate(&home);
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_form.message = Some(e.user_message());
                self.clear_password();
            }
        }
    }

    pub async fn submit_register(&mut self) {
        let credentials = self.form_credentials();
        self.login_form.clear_feedback();
        if let Err(e) = credentials.validate() {
            self.login_form.errors = Some(e);
            return;
        }

        match self.gateway.register(&credentials).await {
            Ok(user) => {
                let login = self.login_path();
                self.navigate(&login);
                self.login_form = Form::login(&user.login);
                self.status_message = Some(format!("Account {} created. Please log in.", user.login));
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.login_form.message = Some(e.user_message());
                self.clear_password();
            }
        }
    }

    // =========================================================================
    // Background refresh
    // =========================================================================

    fn refresh_if_stale(&mut self) {
        let now = Utc::now();
        let owners = self.owners.is_stale(now);
        let assets = self.screen == Screen::Assets && self.assets.is_stale(now);
        if owners || assets {
            self.spawn_refresh(owners, assets);
        }
    }

    /// Drop cached lists for the current screen and fetch them again
    pub fn refresh(&mut self) {
        if self.screen.is_public() {
            return;
        }
        self.owners.invalidate();
        if self.screen == Screen::Assets {
            self.assets.invalidate();
        }
        self.refresh_if_stale();
    }

    fn spawn_refresh(&mut self, owners: bool, assets: bool) {
        let tx = self.refresh_tx.clone();
        let api = self.api.clone();
        let generation = self.generation;
        self.loading = true;
        self.status_message = Some("Loading...".to_string());

        tokio::spawn(async move {
            Self::execute_refresh(tx, api, generation, owners, assets).await;
        });
    }

    async fn execute_refresh(
        tx: mpsc::Sender<RefreshResult>,
        api: ApiClient,
        generation: u64,
        owners: bool,
        assets: bool,
    ) {
        debug!(generation, owners, assets, "Background refresh started");
        let owners_fut: OptionFuture<_> = owners.then(|| api.list_owners(Page::default())).into();
        let assets_fut: OptionFuture<_> = assets.then(|| api.list_assets(Page::default())).into();
        let (owners_res, assets_res) = tokio::join!(owners_fut, assets_fut);

        if let Some(res) = owners_res {
            Self::send_fetch_result(&tx, generation, "Owners", res, RefreshResult::Owners).await;
        }
        if let Some(res) = assets_res {
            Self::send_fetch_result(&tx, generation, "Assets", res, RefreshResult::Assets).await;
        }
        Self::send_result(&tx, RefreshResult::Complete(generation)).await;
    }

    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if tx.send(result).await.is_err() {
            debug!("Refresh channel closed");
        }
    }

    async fn send_fetch_result<T, F>(
        tx: &mpsc::Sender<RefreshResult>,
        generation: u64,
        name: &str,
        result: Result<T, ApiError>,
        wrap: F,
    ) where
        F: FnOnce(u64, T) -> RefreshResult,
    {
        match result {
            Ok(data) => Self::send_result(tx, wrap(generation, data)).await,
            Err(ApiError::Unauthorized) => Self::send_result(tx, RefreshResult::Unauthorized).await,
            Err(e) => {
                let message = e.user_message(&format!("Failed to load {}", name.to_lowercase()));
                Self::send_result(tx, RefreshResult::Error(generation, message)).await;
            }
        }
    }

    /// Drain finished background work
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        let current = self.generation;
        match result {
            RefreshResult::Unauthorized => self.handle_unauthorized(),
            RefreshResult::Owners(stale, _)
            | RefreshResult::Assets(stale, _)
            | RefreshResult::Error(stale, _)
            | RefreshResult::Complete(stale)
                if stale != current =>
            {
                debug!(generation = stale, current, "Discarding result from a previous screen");
            }
            RefreshResult::Owners(_, data) => {
                info!(count = data.len(), "Owners loaded");
                self.owners.replace_all(data, Utc::now());
                self.clamp_selection();
            }
            RefreshResult::Assets(_, data) => {
                info!(count = data.len(), "Assets loaded");
                self.assets.replace_all(data, Utc::now());
                self.clamp_selection();
            }
            RefreshResult::Error(_, message) => {
                error!(error = %message, "Background refresh failed");
                self.status_message = Some(message);
            }
            RefreshResult::Complete(_) => {
                self.loading = false;
                if self.status_message.as_deref() == Some("Loading...") {
                    self.status_message = None;
                }
            }
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn sorted_owners(&self) -> Vec<&Owner> {
        let mut owners: Vec<&Owner> = self.owners.items().iter().collect();
        self.owner_sort.sort(&mut owners);
        owners
    }

    pub fn sorted_assets(&self) -> Vec<&Asset> {
        let mut assets: Vec<&Asset> = self.assets.items().iter().collect();
        self.asset_sort.sort(&mut assets);
        assets
    }

    pub fn selected_owner(&self) -> Option<&Owner> {
        self.sorted_owners().get(self.owner_selection).copied()
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        self.sorted_assets().get(self.asset_selection).copied()
    }

    /// Display name of an asset's owner
    pub fn asset_owner_name<'a>(&'a self, asset: &'a Asset) -> &'a str {
        asset.owner_name(self.owners.items()).unwrap_or("(unknown owner)")
    }

    fn current_len(&self) -> usize {
        match self.screen {
            Screen::Owners => self.owners.len(),
            Screen::Assets => self.assets.len(),
            _ => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.screen {
            Screen::Owners => Some(&mut self.owner_selection),
            Screen::Assets => Some(&mut self.asset_selection),
            _ => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_len();
        if let Some(selection) = self.selection_mut() {
            if len == 0 {
                *selection = 0;
            } else {
                let next = (*selection as isize + delta).clamp(0, len as isize - 1);
                *selection = next as usize;
            }
        }
    }

    fn clamp_selection(&mut self) {
        self.owner_selection = self.owner_selection.min(self.owners.len().saturating_sub(1));
        self.asset_selection = self.asset_selection.min(self.assets.len().saturating_sub(1));
    }

    pub fn toggle_sort(&mut self) {
        match self.screen {
            Screen::Owners => self.owner_sort = self.owner_sort.toggle(),
            Screen::Assets => self.asset_sort = self.asset_sort.toggle(),
            _ => {}
        }
    }

    // =========================================================================
    // Create / edit / delete
    // =========================================================================

    pub fn start_create(&mut self) {
        let form = match self.screen {
            Screen::Owners => Form::owner(None),
            Screen::Assets => {
                let owners = self.sorted_owners();
                if owners.is_empty() {
                    self.status_message = Some("Add an owner before adding assets".to_string());
                    return;
                }
                Form::asset(None, &owners)
            }
            _ => return,
        };
        self.edit_form = Some(form);
        self.state = AppState::Editing;
    }

    pub fn start_edit(&mut self) {
        let form = match self.screen {
            Screen::Owners => self.selected_owner().map(|o| Form::owner(Some(o))),
            Screen::Assets => {
                let owners = self.sorted_owners();
                self.selected_asset().map(|a| Form::asset(Some(a), &owners))
            }
            _ => None,
        };
        if let Some(form) = form {
            self.edit_form = Some(form);
            self.state = AppState::Editing;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_form = None;
        self.state = AppState::Normal;
    }

    pub fn cycle_form_owner(&mut self, forward: bool) {
        let owners: Vec<Owner> = self.sorted_owners().into_iter().cloned().collect();
        let refs: Vec<&Owner> = owners.iter().collect();
        if let Some(form) = self.edit_form.as_mut() {
            form.cycle_owner(&refs, forward);
        }
    }

    /// Validate and send the open form. The form stays open on failure.
    pub async fn submit_edit_form(&mut self) {
        let Some(form) = self.edit_form.as_mut() else {
            return;
        };
        form.clear_feedback();
        let editing = form.editing;

        let outcome = match self.screen {
            Screen::Owners => {
                let draft = form.owner_draft();
                if let Err(e) = draft.validate() {
                    form.errors = Some(e);
                    return;
                }
                let result = match editing {
                    Some(id) => self.api.update_owner(id, &draft).await,
                    None => self.api.create_owner(&draft).await,
                };
                result.map(|owner| {
                    if editing.is_some() {
                        self.owners.apply_updated(owner);
                        // Embedded owner names on assets may be stale
                        self.assets.invalidate();
                    } else {
                        self.owners.apply_created(owner);
                    }
                    "Owner saved"
                })
            }
            Screen::Assets => {
                let draft = form.asset_draft();
                if let Err(e) = draft.validate() {
                    form.errors = Some(e);
                    return;
                }
                let result = match editing {
                    Some(id) => self.api.update_asset(id, &draft).await,
                    None => self.api.create_asset(&draft).await,
                };
                result.map(|asset| {
                    if editing.is_some() {
                        self.assets.apply_updated(asset);
                    } else {
                        self.assets.apply_created(asset);
                    }
                    "Asset saved"
                })
            }
            _ => return,
        };

        match outcome {
            Ok(message) => {
                info!(message, "Record saved");
                self.cancel_edit();
                self.status_message = Some(message.to_string());
                self.clamp_selection();
            }
            Err(ApiError::Unauthorized) => self.handle_unauthorized(),
            Err(ApiError::Validation(e)) => {
                if let Some(form) = self.edit_form.as_mut() {
                    form.errors = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "Save failed");
                let message = e.user_message("Failed to save");
                if let Some(form) = self.edit_form.as_mut() {
                    form.message = Some(message);
                }
            }
        }
    }

    pub fn start_delete(&mut self) {
        let id = match self.screen {
            Screen::Owners => self.selected_owner().map(|o| o.id),
            Screen::Assets => self.selected_asset().map(|a| a.id),
            _ => None,
        };
        if let Some(id) = id {
            self.pending_delete = Some(id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    /// Name of the record awaiting delete confirmation
    pub fn pending_delete_name(&self) -> Option<&str> {
        let id = self.pending_delete?;
        match self.screen {
            Screen::Owners => self.owners.get(id).map(|o| o.name.as_str()),
            Screen::Assets => self.assets.get(id).map(|a| a.name.as_str()),
            _ => None,
        }
    }

    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        self.state = AppState::Normal;

        let (result, what) = match self.screen {
            Screen::Owners => (self.api.delete_owner(id).await, "Owner"),
            Screen::Assets => (self.api.delete_asset(id).await, "Asset"),
            _ => return,
        };

        match result {
            Ok(()) => {
                match self.screen {
                    Screen::Owners => {
                        self.owners.apply_deleted(id);
                        self.assets.invalidate();
                    }
                    _ => {
                        self.assets.apply_deleted(id);
                    }
                }
                self.clamp_selection();
                self.status_message = Some(format!("{} deleted", what));
            }
            Err(ApiError::Unauthorized) => self.handle_unauthorized(),
            Err(e) => {
                error!(error = %e, "Delete failed");
                self.status_message =
                    Some(e.user_message(&format!("Failed to delete {}", what.to_lowercase())));
            }
        }
    }
}
