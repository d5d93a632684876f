use super::{AuthUrlResponse, AuthUser};
use crate::request::{EmptyResponse, Request, RequestData};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// Requests

/// `GET /auth/me`
#[derive(Default, Debug, Clone)]
pub struct GetCurrentUser;

impl Request for GetCurrentUser {
    type Data = ();
    type Response = CurrentUserResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/me".into()
    }
}

/// `GET /auth/status`
#[derive(Default, Debug, Clone)]
pub struct GetAuthStatus;

impl Request for GetAuthStatus {
    type Data = ();
    type Response = AuthStatusResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/status".into()
    }
}

/// `GET /auth/google`
#[derive(Default, Debug, Clone)]
pub struct GoogleLogin;

impl Request for GoogleLogin {
    type Data = ();
    type Response = AuthUrlResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/google".into()
    }
}

/// `GET /auth/apple`
#[derive(Default, Debug, Clone)]
pub struct AppleLogin;

impl Request for AppleLogin {
    type Data = ();
    type Response = AuthUrlResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/apple".into()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    email: String,
    password: String,
    display_name: String,
}

impl SignUp {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }
}

impl Request for SignUp {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/signup".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Login {
    email: String,
    password: String,
}

impl Login {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Request for Login {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/login".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Default, Debug, Clone)]
pub struct Logout;

impl Request for Logout {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/logout".into()
    }
}

// Responses

/// Both `{ user }` and the enveloped `{ success, data: { user } }` land here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}
