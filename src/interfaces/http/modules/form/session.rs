//! Per-session form results
//!
//! The form keeps the last result of each browser session so the page can
//! be re-rendered with it. Entries are transient and expire after a TTL.

use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::CalculationResult;

/// Cookie carrying the form session id.
pub const SESSION_COOKIE: &str = "fuel_calculator_session";

struct SessionEntry {
    result: CalculationResult,
    stored_at: Instant,
}

pub struct FormSessions {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl FormSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn store(&self, session_id: &str, result: CalculationResult) {
        self.purge_expired();
        self.entries.insert(
            session_id.to_string(),
            SessionEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, session_id: &str) -> Option<CalculationResult> {
        {
            let entry = self.entries.get(session_id)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.result.clone());
            }
        }
        // shard lock released above
        self.remove_if_expired(session_id);
        None
    }

    /// Re-checks under the shard lock, so a concurrent `store` survives.
    fn remove_if_expired(&self, session_id: &str) {
        let ttl = self.ttl;
        self.entries
            .remove_if(session_id, |_, e| e.stored_at.elapsed() >= ttl);
    }

    pub fn clear(&self, session_id: &str) {
        self.entries.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }
}

/// Session id of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    /// Freshly issued; the response must set the cookie
    pub is_new: bool,
}

impl SessionId {
    /// Reuse the id from the `Cookie` header, or issue a new one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && Uuid::parse_str(value).is_ok())
            .map(|(_, value)| value.to_string());

        match existing {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` value for a new session.
    pub fn cookie(&self) -> Option<HeaderValue> {
        if !self.is_new {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        ))
        .ok()
    }
}
