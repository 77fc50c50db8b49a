//! JSON response envelopes.
//!
//! Every endpoint answers `{"status": "success", ...}` on the happy path;
//! errors are formatted by [`crate::error::AppError`]. List endpoints carry a
//! `results` count, paginated ones additionally `total`/`pages`/`currentPage`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub status: &'static str,
    pub results: usize,
    pub data: T,
}

impl<T: Serialize> ListEnvelope<T> {
    pub fn success(results: usize, data: T) -> Self {
        Self {
            status: "success",
            results,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub status: &'static str,
    pub results: usize,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub data: Vec<T>,
}

impl<T: Serialize> PageEnvelope<T> {
    pub fn success(total: i64, pages: i64, current_page: i64, data: Vec<T>) -> Self {
        Self {
            status: "success",
            results: data.len(),
            total,
            pages,
            current_page,
            data,
        }
    }
}
