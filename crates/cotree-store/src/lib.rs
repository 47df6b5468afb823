//! # cotree-store
//!
//! Export layer for aggregated coproducts.
//!
//! This crate provides:
//! - `DeltaRecord`, the flat per-term record (key, coefficient, forest, trunk)
//! - NDJSON read/write with atomic file replacement
//! - SHA-256 digests of the exported lines
//!
//! The kernel never reads these files back; they are for downstream tools.

pub mod jsonl;
pub mod record;

pub use jsonl::{
    StoreError, read_records, read_records_from_path, records_digest, write_records,
    write_records_to_path,
};
pub use record::{DeltaRecord, records};
