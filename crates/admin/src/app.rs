//! Application wiring: one client, one cache, one toast bus.

use std::sync::Arc;

use quill_client::{
    ApiClient, ApiError, AuthService, ClientConfig, FileSessionStore, QueryCache, ResourceQuery,
    ResourceService, SessionStore,
};
use quill_core::models::{EditableRecord, Editor, Resource};
use quill_core::pagination::ListParams;

use crate::editor::EditSession;
use crate::listing::{DeleteDialog, ListPage};
use crate::toast::ToastBus;

/// Shared state handed to every page, form and dialog.
#[derive(Clone)]
pub struct AdminApp {
    config: Arc<ClientConfig>,
    client: ApiClient,
    auth: AuthService,
    cache: QueryCache,
    toasts: ToastBus,
}

impl AdminApp {
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config, session)?;
        let auth = AuthService::new(client.clone(), config.captcha_site_key.clone());
        let cache = QueryCache::from_config(&config);
        Ok(Self {
            config: Arc::new(config),
            client,
            auth,
            cache,
            toasts: ToastBus::default(),
        })
    }

    /// Session persisted at `config.session_path`.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
        Self::new(config, store)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn toasts(&self) -> &ToastBus {
        &self.toasts
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cached access to any resource, sharing the app-wide cache.
    pub fn query<R: Resource>(&self) -> ResourceQuery<R> {
        ResourceQuery::new(ResourceService::new(self.client.clone()), self.cache.clone())
    }

    /// Editor accounts. Admins only.
    pub fn editors(&self) -> Result<ResourceQuery<Editor>, ApiError> {
        self.auth.require_admin()?;
        Ok(self.query())
    }

    pub fn edit_session<R: EditableRecord>(&self) -> EditSession<R> {
        EditSession::new(self.query(), self.toasts.clone())
    }

    pub fn list_page<R: Resource>(&self, params: ListParams) -> ListPage<R> {
        ListPage::new(self.query(), params)
    }

    pub fn delete_dialog<R: Resource>(&self) -> DeleteDialog<R> {
        DeleteDialog::new(self.query(), self.toasts.clone())
    }
}
