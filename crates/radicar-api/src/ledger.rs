//! # In-Memory Issuance Ledger
//!
//! Single-instance counter store and filing repository, used when no
//! `DATABASE_URL` is configured (development, tests). One
//! `parking_lot::Mutex` guards both the counters and the filing map, so a
//! counter advance and its filing record land together or not at all —
//! the same all-or-nothing contract the PostgreSQL path gets from its
//! transaction.
//!
//! In-process locking cannot coordinate multiple service instances;
//! horizontally scaled deployments must run against PostgreSQL
//! (`db::counters`), where the serialization point is the row lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use radicar_core::{FilingNumber, FilingYear, NumberingType, RegisteredEntity};
use uuid::Uuid;

use crate::issuance::IssuanceError;
use crate::state::FilingRecord;

/// A counter bucket key: one consecutivo per entity, regime, and year.
type BucketKey = (Uuid, NumberingType, u16);

#[derive(Debug, Default)]
struct LedgerInner {
    /// `last_sequence` watermark per bucket. Absent key = never issued.
    counters: HashMap<BucketKey, u32>,
    /// Every issued filing, keyed by the filing-number string.
    filings: HashMap<String, FilingRecord>,
}

/// Thread-safe, cloneable in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct ConsecutivoLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl ConsecutivoLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically advance the bucket counter and record the filing.
    ///
    /// Two concurrent callers for the same bucket serialize on the mutex:
    /// they never observe the same sequence, and no value is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError::SequenceOverflow`] when the bucket has
    /// exhausted the 4-digit field. The counter is not advanced.
    pub fn issue(
        &self,
        entity: &RegisteredEntity,
        year: FilingYear,
        procedure_type: Option<String>,
        reserved_reason: Option<String>,
    ) -> Result<FilingRecord, IssuanceError> {
        let numbering_type = entity.numbering_type();
        let key: BucketKey = (*entity.id.as_uuid(), numbering_type, year.value());

        let mut inner = self.inner.lock();
        let last = inner.counters.get(&key).copied().unwrap_or(0);
        let next = last + 1;

        // Constructing the number is the capacity check: past 9999 the
        // 4-digit field cannot carry the sequence.
        let Ok(number) = FilingNumber::new(entity.dane_code.clone(), numbering_type, year, next)
        else {
            return Err(IssuanceError::SequenceOverflow {
                dane_code: entity.dane_code.to_string(),
                type_code: numbering_type.code(),
                year: year.value(),
            });
        };
        let record = FilingRecord {
            id: Uuid::new_v4(),
            entity_id: *entity.id.as_uuid(),
            filing_number: number.to_string(),
            dane_code: entity.dane_code.clone(),
            numbering_type,
            year: year.value(),
            sequence: next,
            procedure_type,
            reserved_reason,
            created_at: Utc::now(),
        };

        // Advance and record under the same guard: all-or-nothing.
        inner.counters.insert(key, next);
        inner.filings.insert(record.filing_number.clone(), record.clone());
        Ok(record)
    }

    /// Whether a filing already carries `number`.
    pub fn contains(&self, number: &str) -> bool {
        self.inner.lock().filings.contains_key(number)
    }

    /// The bucket watermark, `None` when the bucket has never issued.
    pub fn watermark(
        &self,
        entity_id: Uuid,
        numbering_type: NumberingType,
        year: u16,
    ) -> Option<u32> {
        self.inner
            .lock()
            .counters
            .get(&(entity_id, numbering_type, year))
            .copied()
    }

    /// Sequence components of every filing in a bucket, ascending.
    pub fn sequences(
        &self,
        entity_id: Uuid,
        numbering_type: NumberingType,
        year: u16,
    ) -> Vec<u32> {
        let inner = self.inner.lock();
        let mut sequences: Vec<u32> = inner
            .filings
            .values()
            .filter(|f| {
                f.entity_id == entity_id
                    && f.numbering_type == numbering_type
                    && f.year == year
            })
            .map(|f| f.sequence)
            .collect();
        sequences.sort_unstable();
        sequences
    }

    /// Total number of filings held, across all buckets.
    pub fn len(&self) -> usize {
        self.inner.lock().filings.len()
    }

    /// Whether the ledger holds no filings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force a bucket watermark without recording filings.
    #[cfg(test)]
    fn force_watermark(
        &self,
        entity_id: Uuid,
        numbering_type: NumberingType,
        year: u16,
        last_sequence: u32,
    ) {
        self.inner
            .lock()
            .counters
            .insert((entity_id, numbering_type, year), last_sequence);
    }
}
