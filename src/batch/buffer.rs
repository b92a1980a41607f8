use crate::research::PillarRecord;
use crate::store::{CityEvaluation, QuestionEvaluation, UpsertBatch};

/// Records that can be written as one [`UpsertBatch`].
pub trait IntoBatch: Sized {
    fn into_batch(rows: Vec<Self>) -> UpsertBatch;
}

impl IntoBatch for QuestionEvaluation {
    fn into_batch(rows: Vec<Self>) -> UpsertBatch {
        UpsertBatch::Questions(rows)
    }
}

impl IntoBatch for PillarRecord {
    /// Pillar rows and their sources travel in the same batch.
    fn into_batch(rows: Vec<Self>) -> UpsertBatch {
        let mut evaluations = Vec::with_capacity(rows.len());
        let mut sources = Vec::new();
        for record in rows {
            evaluations.push(record.evaluation);
            sources.extend(record.sources);
        }
        UpsertBatch::Pillars {
            rows: evaluations,
            sources,
        }
    }
}

impl IntoBatch for CityEvaluation {
    fn into_batch(rows: Vec<Self>) -> UpsertBatch {
        UpsertBatch::Cities(rows)
    }
}

/// Fixed-capacity buffer that hands back a full chunk once `capacity` records accumulate.
#[derive(Debug)]
pub struct ChunkBuffer<T> {
    rows: Vec<T>,
    capacity: usize,
}

impl<T: IntoBatch> ChunkBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a record; returns the chunk to flush when the buffer is full.
    pub fn push(&mut self, row: T) -> Option<UpsertBatch> {
        self.rows.push(row);
        if self.rows.len() >= self.capacity {
            return self.drain();
        }
        None
    }

    /// Empties the buffer; `None` if there was nothing buffered.
    pub fn drain(&mut self) -> Option<UpsertBatch> {
        if self.rows.is_empty() {
            return None;
        }
        let rows = std::mem::replace(&mut self.rows, Vec::with_capacity(self.capacity));
        Some(T::into_batch(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
