//! Row-aligned parallel iteration over interleaved pixel buffers.
//!
//! Buffers are split into chunks of whole rows so that each rayon task owns a
//! disjoint band of the image. The number of chunks follows the size of the
//! rayon pool the caller is running in, so work installed into a dedicated
//! `ThreadPool` is partitioned for that pool rather than the global one.

use rayon::prelude::*;


/// Multiplier for number of chunks relative to pool threads.
/// Using 3x threads provides good load balancing when some bands finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Smallest number of elements a chunk is allowed to hold (4 KiB of f32).
/// Tiny mip levels are not worth splitting across workers.
const MIN_CHUNK_ELEMENTS: usize = 1024;

/// Number of rows per chunk for a buffer with `rows` rows of `row_len` elements.
#[inline]
pub fn rows_per_chunk(rows: usize, row_len: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    let by_threads = rows.div_ceil(num_chunks.max(1));
    let by_size = MIN_CHUNK_ELEMENTS.div_ceil(row_len.max(1));
    by_threads.max(by_size).max(1)
}

/// Extension trait splitting a mutable slice into row-aligned parallel chunks.
pub trait ParRowsMutAuto<T: Send> {
    /// Yields `(chunk_start_row, chunk)` pairs; every chunk holds complete rows
    /// of `row_len` elements.
    fn par_rows_mut_auto<'a>(
        &'a mut self,
        row_len: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])>
    where
        T: 'a;
}

impl<T: Send> ParRowsMutAuto<T> for [T] {
    fn par_rows_mut_auto<'a>(
        &'a mut self,
        row_len: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])>
    where
        T: 'a,
    {
        assert!(row_len > 0, "row length must be > 0");
        assert_eq!(
            self.len() % row_len,
            0,
            "buffer length must be a multiple of the row length"
        );
        let chunk_rows = rows_per_chunk(self.len() / row_len, row_len);
        self.par_chunks_mut(row_len * chunk_rows)
            .enumerate()
            .map(move |(idx, chunk)| (idx * chunk_rows, chunk))
    }
}

/// Extension trait pairing two mutable slices that describe the same rows.
pub trait ParZipMut<'a, A: Send> {
    /// Pair this slice with another covering the same number of rows.
    fn par_zip<B: Send>(self, other: &'a mut [B]) -> ZippedRows<'a, A, B>;
}

impl<'a, A: Send> ParZipMut<'a, A> for &'a mut [A] {
    fn par_zip<B: Send>(self, other: &'a mut [B]) -> ZippedRows<'a, A, B> {
        ZippedRows(self, other)
    }
}

/// Two mutable slices sharing a row layout, possibly with different row lengths
/// (for example an interleaved color plane next to its single-channel coverage plane).
pub struct ZippedRows<'a, A: Send, B: Send>(pub &'a mut [A], pub &'a mut [B]);

impl<'a, A: Send + 'a, B: Send + 'a> ZippedRows<'a, A, B> {
    /// Split both slices into matching row-aligned chunks.
    /// Yields `(chunk_start_row, (a_chunk, b_chunk))`.
    pub fn par_rows_mut_auto(
        self,
        a_row_len: usize,
        b_row_len: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, (&'a mut [A], &'a mut [B]))> {
        assert!(a_row_len > 0 && b_row_len > 0, "row length must be > 0");
        let rows = self.0.len() / a_row_len;
        assert_eq!(
            self.0.len(),
            rows * a_row_len,
            "first slice is not a whole number of rows"
        );
        assert_eq!(
            self.1.len(),
            rows * b_row_len,
            "zipped slices must have equal row count"
        );
        let chunk_rows = rows_per_chunk(rows, a_row_len);
        self.0
            .par_chunks_mut(a_row_len * chunk_rows)
            .zip(self.1.par_chunks_mut(b_row_len * chunk_rows))
            .enumerate()
            .map(move |(idx, pair)| (idx * chunk_rows, pair))
    }
}
