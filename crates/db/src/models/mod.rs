//! Row structs for the four persisted entities.
//!
//! Status columns are SMALLINT foreign keys into lookup tables; rows decode
//! them into the typed enums from `vidsum_core::status`, so a row with an
//! unknown status ID fails to decode instead of leaking a raw number.

pub mod job;
pub mod shot;
pub mod summary;
pub mod video;

use vidsum_core::status::StatusId;

/// Map a status ID column to its enum, or fail the row decode.
pub(crate) fn decode_status<T>(
    id: StatusId,
    from_id: fn(StatusId) -> Option<T>,
    kind: &str,
) -> Result<T, sqlx::Error> {
    from_id(id).ok_or_else(|| sqlx::Error::Decode(format!("unknown {kind} status id {id}").into()))
}
