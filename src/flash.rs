//! One-shot notices carried across a redirect in a cookie.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cookies;

pub const FLASH_COOKIE: &str = "roomify_flash";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }

    fn encode(&self) -> String {
        // serializing a plain struct of strings cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Flash notice left by the previous response, if any.
pub struct IncomingFlash(pub Option<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = cookies::get(&parts.headers, FLASH_COOKIE).and_then(Flash::decode);
        Ok(IncomingFlash(flash))
    }
}

/// `303 See Other` that stores a flash notice for the next render.
pub struct FlashRedirect {
    to: String,
    flash: Flash,
    cookies: Vec<String>,
}

impl FlashRedirect {
    pub fn new(to: impl Into<String>, flash: Flash) -> Self {
        Self { to: to.into(), flash, cookies: Vec::new() }
    }

    /// Attach an extra `Set-Cookie` value (session login/logout).
    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut res = Redirect::to(&self.to).into_response();
        let flash_cookie = cookies::build(FLASH_COOKIE, &self.flash.encode(), None, false);
        for cookie in std::iter::once(flash_cookie).chain(self.cookies) {
            match HeaderValue::from_str(&cookie) {
                Ok(v) => {
                    res.headers_mut().append(SET_COOKIE, v);
                }
                Err(e) => warn!(error = %e, "dropping unencodable cookie"),
            }
        }
        res
    }
}

/// View model handed to the template layer, with the pending notice.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub flash: Option<Flash>,
    pub data: T,
}

impl<T> Page<T> {
    pub fn new(IncomingFlash(flash): IncomingFlash, data: T) -> Self {
        Self { flash, data }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let shown = self.flash.is_some();
        let mut res = Json(self).into_response();
        if shown {
            if let Ok(v) = HeaderValue::from_str(&cookies::expire(FLASH_COOKIE)) {
                res.headers_mut().append(SET_COOKIE, v);
            }
        }
        res
    }
}
