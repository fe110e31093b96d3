//! Keyset pagination primitives
//!
//! Ordered listings (members by join time, messages by send time) page with a
//! `(timestamp, id)` cursor instead of an offset, so rows inserted between
//! two calls can never shift a page boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::Snowflake;

/// Position in a `(timestamp, id)`-ordered listing
///
/// A page request with `after = Some(cursor)` returns rows strictly greater
/// than the cursor in `(at, id)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageCursor {
    pub at: DateTime<Utc>,
    pub id: Snowflake,
}

impl PageCursor {
    pub fn new(at: DateTime<Utc>, id: Snowflake) -> Self {
        Self { at, id }
    }

    /// Encode as an opaque URL-safe token for transport layers
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.at.timestamp_micros(), self.id))
    }

    /// Decode a token produced by [`PageCursor::encode`]
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Malformed)?;
        let raw = String::from_utf8(raw).map_err(|_| CursorError::Malformed)?;
        let (micros, id) = raw.split_once(':').ok_or(CursorError::Malformed)?;

        let micros: i64 = micros.parse().map_err(|_| CursorError::Malformed)?;
        let id = Snowflake::parse(id).map_err(|_| CursorError::Malformed)?;

        let secs = micros.div_euclid(1_000_000);
        let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
        let at = DateTime::from_timestamp(secs, nanos).ok_or(CursorError::OutOfRange)?;

        Ok(Self { at, id })
    }
}

impl Serialize for PageCursor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

/// Errors decoding a client-supplied cursor token
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("malformed page cursor")]
    Malformed,

    #[error("page cursor timestamp out of range")]
    OutOfRange,
}

/// Request for one page of a keyset-ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<PageCursor>,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 50;

    /// First page with the given size
    pub fn first(limit: i64) -> Self {
        Self { after: None, limit }
    }

    /// Page following `cursor`
    pub fn after(cursor: PageCursor, limit: i64) -> Self {
        Self {
            after: Some(cursor),
            limit,
        }
    }

    /// Limit clamped into `1..=max`
    #[inline]
    pub fn clamped_limit(&self, max: i64) -> i64 {
        self.limit.clamp(1, max)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// One page of results plus the cursor to resume from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the last returned item, or the request cursor when the
    /// page is empty. Resuming from it never repeats or skips a row.
    pub next_cursor: Option<PageCursor>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from `limit + 1` fetched rows
    ///
    /// The extra row only signals that more data exists; it is dropped.
    pub fn from_overfetch(
        mut rows: Vec<T>,
        limit: usize,
        after: Option<PageCursor>,
        cursor_of: impl Fn(&T) -> PageCursor,
    ) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = rows.last().map(&cursor_of).or(after);

        Self {
            items: rows,
            next_cursor,
            has_more,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
