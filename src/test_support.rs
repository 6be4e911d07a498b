//! Helpers for driving the router in tests.

use std::sync::OnceLock;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response,
    },
    Router,
};
use tower::ServiceExt;

use crate::auth::{extractors::SESSION_COOKIE, password::hash_password};

/// Argon2 is slow in debug builds; hash the seed password once.
pub fn shared_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password("password123").expect("hash seed password"))
        .clone()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        req = req.header(COOKIE, c);
    }
    app.clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// GET with cookies taken from earlier `Set-Cookie` values.
pub async fn get_with_cookies(app: &Router, uri: &str, set_cookies: &[String]) -> Response<Body> {
    let jar = set_cookies
        .iter()
        .filter_map(|c| c.split(';').next())
        .collect::<Vec<_>>()
        .join("; ");
    get(app, uri, Some(&jar)).await
}

pub async fn form_post(
    app: &Router,
    uri: &str,
    body: &str,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(COOKIE, c);
    }
    app.clone()
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` of a non-empty session cookie set by the response.
pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    set_cookies(res)
        .into_iter()
        .filter_map(|c| c.split(';').next().map(str::to_string))
        .find(|pair| {
            pair.starts_with(&format!("{SESSION_COOKIE}=")) && pair.len() > SESSION_COOKIE.len() + 1
        })
}

pub fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_bytes(res: Response<Body>) -> axum::body::Bytes {
    axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body")
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(res).await).expect("json body")
}
