//! Request extractors that report rejections through [`AppError`].

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections (bad syntax, wrong field types, missing
/// `Content-Type`) answer with the standard 400 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
