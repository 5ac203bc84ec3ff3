//! HTTP handlers.
//!
//! Handlers only extract, call one service method and shape the response;
//! every rule lives in [`crate::services`].

pub mod catalog;
pub mod health;
pub mod operations;
pub mod people;
pub mod reports;
pub mod sales;
pub mod ws;

use serde::Deserialize;
use teknoroma_core::Visibility;

/// `?include_deleted=true` on list and get endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VisibilityQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

impl VisibilityQuery {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_flag(self.include_deleted)
    }
}
