//! Request handlers, one module per resource.
//!
//! Handlers pull the actor and parameters out of the request, call a
//! service, and wrap the result in the response envelope. Extractor
//! rejections go through `ApiError` so every failure has the same shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

pub mod classes;
pub mod memos;
pub mod reviews;
pub mod system;

/// `Json` with envelope-shaped rejections
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Path` with envelope-shaped rejections
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// `Query` with envelope-shaped rejections
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
