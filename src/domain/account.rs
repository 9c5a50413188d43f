//! Caller identity at the service boundary.
//!
//! Authentication lives in a separate service; by the time a request reaches
//! this backend the caller is a resolved `Account`. The historical split
//! between the two profile/address schemas is carried as a tag decided once
//! at authentication time, never re-derived downstream.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Profile stored in the current customer schema.
    Customer,
    /// Profile still on the legacy schema, pending migration.
    Legacy,
}

impl AccountKind {
    pub fn parse(s: &str) -> Option<AccountKind> {
        match s {
            "customer" => Some(AccountKind::Customer),
            "legacy" => Some(AccountKind::Legacy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Customer => "customer",
            AccountKind::Legacy => "legacy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub user_id: Uuid,
    pub kind: AccountKind,
}

impl Account {
    pub fn new(user_id: Uuid, kind: AccountKind) -> Self {
        Account { user_id, kind }
    }
}
