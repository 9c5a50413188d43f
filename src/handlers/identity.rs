//! Resolved-identity extraction from request headers.
//!
//! The API sits behind an authenticating edge that injects `X-User-Id` and
//! `X-Account-Kind` after validating the session. Extraction only parses
//! those headers; it never performs authentication itself.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::account::{Account, AccountKind};
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const ACCOUNT_KIND_HEADER: &str = "X-Account-Kind";

fn account_from_headers(req: &HttpRequest) -> Result<Account, AppError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation {
            code: "INVALID_INPUT",
            message: format!("missing {} header", USER_ID_HEADER),
        })?;
    let user_id = Uuid::parse_str(user_id).map_err(|_| AppError::Validation {
        code: "INVALID_INPUT",
        message: format!("{} must be a UUID", USER_ID_HEADER),
    })?;

    let kind = match req
        .headers()
        .get(ACCOUNT_KIND_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        None => AccountKind::Customer,
        Some(raw) => AccountKind::parse(raw).ok_or_else(|| AppError::Validation {
            code: "INVALID_INPUT",
            message: format!("unknown account kind '{}'", raw),
        })?,
    };

    Ok(Account::new(user_id, kind))
}

impl FromRequest for Account {
    type Error = AppError;
    type Future = Ready<Result<Account, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(account_from_headers(req))
    }
}
