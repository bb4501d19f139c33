//! Login / logout against `auth/login/`.

use quill_core::error::CoreError;
use quill_core::models::{LoginRequest, LoginResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};
use crate::session::Session;

const LOGIN_PATH: &str = "auth/login/";

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    captcha_site_key: Option<String>,
}

impl AuthService {
    /// `captcha_site_key`: when set, every login must carry a CAPTCHA token.
    pub fn new(client: ApiClient, captcha_site_key: Option<String>) -> Self {
        Self {
            client,
            captcha_site_key,
        }
    }

    /// Log in and persist the returned token and role.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        request.validate().map_err(CoreError::from)?;
        if self.captcha_site_key.is_some() && request.captcha_token.is_none() {
            return Err(CoreError::Validation("Please complete the CAPTCHA".into()).into());
        }

        let response: LoginResponse = self
            .client
            .post(LOGIN_PATH, RequestBody::json(request)?)
            .await?;

        let session = Session {
            token: response.token,
            role: response.role,
        };
        self.client.session().save(&session)?;
        tracing::info!(email = %request.email, role = %session.role, "Logged in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.session().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn current(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.client.session().load()?)
    }

    /// The current session, or `Unauthorized` when logged out.
    pub fn require_session(&self) -> Result<Session, ApiError> {
        self.current()?
            .ok_or_else(|| CoreError::Unauthorized("Please log in first".into()).into())
    }

    /// The current session if it belongs to an admin.
    pub fn require_admin(&self) -> Result<Session, ApiError> {
        let session = self.require_session()?;
        if !session.role.can_manage_editors() {
            return Err(CoreError::Forbidden("Only admins can manage editors".into()).into());
        }
        Ok(session)
    }
}
