//! Credential sign-in.
//!
//! [`authenticate`] asks an [`AuthProvider`] to sign a user in and turns the
//! known failure kinds into the message shown on the login form. Any other
//! failure is handed back to the caller as [`UnexpectedSignIn`].

use std::{error::Error as StdError, fmt, sync::Arc};

use api_types::auth::SignInFailed;
use async_trait::async_trait;
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use engine::{Engine, EngineError, FormData};
use thiserror::Error;

use crate::{ServerError, server::ServerState};

pub const CREDENTIALS: &str = "credentials";
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Form field carrying the message of the previous attempt, if any.
pub const PREV_STATE_FIELD: &str = "prevState";

const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const SOMETHING_WENT_WRONG: &str = "Something went wrong.";
const MIN_PASSWORD_LEN: usize = 6;

/// Failure kinds an [`AuthProvider`] reports on purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The credentials did not match a user.
    CredentialsSignin,
    CallbackRouteError,
    AccessDenied,
    /// The provider cannot handle the request (e.g. unknown method).
    Configuration,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CredentialsSignin => "CredentialsSignin",
            Self::CallbackRouteError => "CallbackRouteError",
            Self::AccessDenied => "AccessDenied",
            Self::Configuration => "Configuration",
        })
    }
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("authentication failed: {0}")]
    Auth(AuthErrorKind),
    #[error(transparent)]
    Unexpected(Box<dyn StdError + Send + Sync>),
}

impl From<EngineError> for SignInError {
    fn from(value: EngineError) -> Self {
        Self::Unexpected(Box::new(value))
    }
}

/// A sign-in failure the login form cannot describe.
#[derive(Debug, Error)]
#[error("unexpected sign-in failure: {0}")]
pub struct UnexpectedSignIn(#[source] pub Box<dyn StdError + Send + Sync>);

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, method: &str, form: &FormData) -> Result<(), SignInError>;
}

#[derive(Debug)]
pub enum SignInOutcome {
    SignedIn,
    InvalidCredentials,
    OtherRecognized(AuthErrorKind),
    Unrecognized(UnexpectedSignIn),
}

impl From<Result<(), SignInError>> for SignInOutcome {
    fn from(value: Result<(), SignInError>) -> Self {
        match value {
            Ok(()) => Self::SignedIn,
            Err(SignInError::Auth(AuthErrorKind::CredentialsSignin)) => Self::InvalidCredentials,
            Err(SignInError::Auth(kind)) => Self::OtherRecognized(kind),
            Err(SignInError::Unexpected(cause)) => Self::Unrecognized(UnexpectedSignIn(cause)),
        }
    }
}

/// Sign in with the submitted credentials.
///
/// Returns `Ok(None)` once signed in, or `Ok(Some(message))` for a failure
/// the form can display. `prev_state` is the message of the previous attempt
/// and does not influence the result.
pub async fn authenticate<P>(
    provider: &P,
    prev_state: Option<&str>,
    form: &FormData,
) -> Result<Option<&'static str>, UnexpectedSignIn>
where
    P: AuthProvider + ?Sized,
{
    if let Some(previous) = prev_state {
        tracing::debug!("retrying sign-in after: {previous}");
    }

    match SignInOutcome::from(provider.sign_in(CREDENTIALS, form).await) {
        SignInOutcome::SignedIn => Ok(None),
        SignInOutcome::InvalidCredentials => Ok(Some(INVALID_CREDENTIALS)),
        SignInOutcome::OtherRecognized(kind) => {
            tracing::warn!("sign-in failed: {kind}");
            Ok(Some(SOMETHING_WENT_WRONG))
        }
        SignInOutcome::Unrecognized(cause) => Err(cause),
    }
}

/// Email/password provider backed by the users table.
pub struct CredentialsProvider {
    engine: Arc<Engine>,
}

impl CredentialsProvider {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

fn parse_credentials(form: &FormData) -> Option<(&str, &str)> {
    let email = form.get("email")?.trim();
    let password = form.get("password")?;

    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') {
        return None;
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return None;
    }
    Some((email, password))
}

#[async_trait]
impl AuthProvider for CredentialsProvider {
    async fn sign_in(&self, method: &str, form: &FormData) -> Result<(), SignInError> {
        if method != CREDENTIALS {
            return Err(SignInError::Auth(AuthErrorKind::Configuration));
        }

        let Some((email, password)) = parse_credentials(form) else {
            return Err(SignInError::Auth(AuthErrorKind::CredentialsSignin));
        };

        match self.engine.verify_credentials(email, password).await? {
            Some(user) => {
                tracing::info!("{} signed in", user.email);
                Ok(())
            }
            None => Err(SignInError::Auth(AuthErrorKind::CredentialsSignin)),
        }
    }
}

pub async fn login(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Result<Response, ServerError> {
    let provider = CredentialsProvider::new(Arc::clone(&state.engine));

    let prev_state = form.get(PREV_STATE_FIELD).filter(|message| !message.is_empty());

    match authenticate(&provider, prev_state, &form).await? {
        None => Ok(Redirect::to(DASHBOARD_PATH).into_response()),
        Some(message) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(SignInFailed {
                message: message.to_string(),
            }),
        )
            .into_response()),
    }
}
