//! On-disk bucket: a sorted group of (delta, id) entries sharing a base value.
//!
//! A bucket stores every indexed record whose value falls in
//! `[base, base + 65535]` and fits the delta width. Entries are kept sorted
//! by value (delta); ids ride in a parallel array. A roaring bitmap of the
//! resident ids is embedded in the payload so range scans can union a fully
//! covered bucket without touching the entry arrays.
//!
//! ## Payload layout
//!
//! Little-endian except for the bitmap's own serialized form:
//!
//! ```text
//! [bitmap_len: u32] [bitmap bytes] [count: u16] [deltas: u16 x count] [ids: DocId x count]
//! ```
//!
//! The base is not part of the payload; it lives in the bucket's key and is
//! rehydrated by the caller on deserialization. The id width is a build-time
//! constant (`id64` feature), so payloads are not portable across builds
//! with different widths.

use super::error::{Error, Result};
use super::schema::{doc_id_from_le_bytes, DocId, DocIdBitmap, DOC_ID_LEN};
use super::sortable::SortableValue;

/// Widest value offset a bucket can hold, fixed by the u16 delta width.
pub const MAX_DELTA: u32 = u16::MAX as u32;

/// Shortest well-formed payload: empty bitmap header plus a zero count.
const MIN_PAYLOAD_LEN: usize = 6;

/// In-memory bucket, transient per transaction.
#[derive(Debug, Clone)]
pub struct Bucket {
    base: SortableValue,
    deltas: Vec<u16>,
    ids: Vec<DocId>,
    summary: DocIdBitmap,
}

impl Bucket {
    /// Create an empty bucket anchored at `base`.
    pub fn new(base: SortableValue) -> Self {
        Self {
            base,
            deltas: Vec::new(),
            ids: Vec::new(),
            summary: DocIdBitmap::new(),
        }
    }

    pub fn base(&self) -> SortableValue {
        self.base
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }

    pub fn deltas(&self) -> &[u16] {
        &self.deltas
    }

    /// The summary bitmap: exactly the set of resident ids.
    pub fn summary(&self) -> &DocIdBitmap {
        &self.summary
    }

    /// Reconstruct the value of the entry at `index`.
    #[inline]
    pub fn value_at(&self, index: usize) -> SortableValue {
        self.base + self.deltas[index] as SortableValue
    }

    /// Smallest resident value, if any.
    pub fn min_value(&self) -> Option<SortableValue> {
        self.deltas.first().map(|d| self.base + *d as SortableValue)
    }

    /// Largest resident value, if any.
    pub fn max_value(&self) -> Option<SortableValue> {
        self.deltas.last().map(|d| self.base + *d as SortableValue)
    }

    /// Insert `(value, id)` keeping `deltas` non-decreasing.
    ///
    /// Equal values land at the lower-bound position. The id is not checked
    /// for prior presence; the index layer rules out duplicates through the
    /// forward index before calling this.
    ///
    /// Fails with [`Error::InvariantViolation`] when `value < base` or the
    /// offset exceeds [`MAX_DELTA`] — both mean the covering-bucket lookup
    /// handed us the wrong bucket.
    pub fn add(&mut self, value: SortableValue, id: DocId) -> Result<()> {
        if value < self.base {
            return Err(Error::InvariantViolation(format!(
                "value {} below bucket base {}",
                value, self.base
            )));
        }
        let delta = value - self.base;
        if delta > MAX_DELTA {
            return Err(Error::InvariantViolation(format!(
                "delta {} overflows bucket at base {}",
                delta, self.base
            )));
        }
        let delta = delta as u16;

        let index = self.deltas.partition_point(|d| *d < delta);
        self.deltas.insert(index, delta);
        self.ids.insert(index, id);
        self.summary.insert(id);
        Ok(())
    }

    /// Remove the entry carrying `id`. Returns whether it was present.
    ///
    /// Ids are not sorted, so this is a linear scan bounded by the bucket
    /// size.
    pub fn remove(&mut self, id: DocId) -> bool {
        match self.ids.iter().position(|i| *i == id) {
            Some(index) => {
                self.ids.remove(index);
                self.deltas.remove(index);
                self.summary.remove(id);
                true
            }
            None => false,
        }
    }

    /// Split a saturated bucket, returning the new right half.
    ///
    /// The cut starts at the midpoint and slides right across any run of
    /// equal deltas, falling back to sliding left, so that a single value
    /// never straddles two buckets and the right half's base is strictly
    /// above the left half's last value. Returns `None` when the bucket
    /// holds one value only — such a bucket stays oversized rather than
    /// violating the one-bucket-per-value rule.
    ///
    /// On a cut, right-half deltas are re-expressed against the new base,
    /// the left half is truncated in place, and both summary bitmaps are
    /// rebuilt from their id arrays.
    pub fn split(&mut self) -> Option<Bucket> {
        let len = self.deltas.len();
        if len < 2 {
            return None;
        }
        let mid = len / 2;

        let mut cut = mid;
        while cut < len && self.deltas[cut] == self.deltas[cut - 1] {
            cut += 1;
        }
        if cut == len {
            cut = mid;
            while cut > 0 && self.deltas[cut] == self.deltas[cut - 1] {
                cut -= 1;
            }
            if cut == 0 {
                return None;
            }
        }

        let cut_delta = self.deltas[cut];
        let right_base = self.base + cut_delta as SortableValue;
        let right_deltas: Vec<u16> = self.deltas[cut..].iter().map(|d| d - cut_delta).collect();
        let right_ids = self.ids.split_off(cut);
        self.deltas.truncate(cut);

        let right_summary: DocIdBitmap = right_ids.iter().copied().collect();
        self.summary = self.ids.iter().copied().collect();

        Some(Bucket {
            base: right_base,
            deltas: right_deltas,
            ids: right_ids,
            summary: right_summary,
        })
    }

    /// Serialize into the canonical payload layout.
    ///
    /// Run-optimizes the summary bitmap first, which is why this takes
    /// `&mut self`.
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        if self.ids.len() > u16::MAX as usize {
            return Err(Error::InvariantViolation(format!(
                "bucket at base {} holds {} entries, beyond the serializable count",
                self.base,
                self.ids.len()
            )));
        }

        self.summary.run_optimize();
        let bitmap_len = self.summary.serialized_size();
        let count = self.ids.len() as u16;

        let total = 4 + bitmap_len + 2 + self.deltas.len() * 2 + self.ids.len() * DOC_ID_LEN;
        let mut buf = Vec::with_capacity(total);

        buf.extend_from_slice(&(bitmap_len as u32).to_le_bytes());
        self.summary.serialize_into(&mut buf)?;
        buf.extend_from_slice(&count.to_le_bytes());
        for delta in &self.deltas {
            buf.extend_from_slice(&delta.to_le_bytes());
        }
        for id in &self.ids {
            buf.extend_from_slice(&id.to_le_bytes());
        }
        Ok(buf)
    }

    /// Parse a payload, rehydrating the base from the caller (it is stored
    /// in the bucket's key, not repeated in the payload).
    pub fn deserialize(bytes: &[u8], base: SortableValue) -> Result<Bucket> {
        if bytes.len() < MIN_PAYLOAD_LEN {
            return Err(Error::Corrupt(format!(
                "payload of {} bytes is shorter than the {}-byte minimum",
                bytes.len(),
                MIN_PAYLOAD_LEN
            )));
        }

        let bitmap_len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut offset = 4usize;
        if offset + bitmap_len + 2 > bytes.len() {
            return Err(Error::Corrupt(format!(
                "bitmap length {} exceeds payload of {} bytes",
                bitmap_len,
                bytes.len()
            )));
        }

        let summary = if bitmap_len == 0 {
            DocIdBitmap::new()
        } else {
            DocIdBitmap::deserialize_from(&bytes[offset..offset + bitmap_len])
                .map_err(|e| Error::Corrupt(format!("undecodable summary bitmap: {}", e)))?
        };
        offset += bitmap_len;

        let count = u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()) as usize;
        offset += 2;

        let entries_len = count * 2 + count * DOC_ID_LEN;
        if offset + entries_len > bytes.len() {
            return Err(Error::Corrupt(format!(
                "entry data truncated: need {} bytes past offset {}, payload is {}",
                entries_len,
                offset,
                bytes.len()
            )));
        }

        let mut deltas = Vec::with_capacity(count);
        for i in 0..count {
            let at = offset + i * 2;
            deltas.push(u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap()));
        }
        offset += count * 2;

        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let at = offset + i * DOC_ID_LEN;
            ids.push(doc_id_from_le_bytes(&bytes[at..at + DOC_ID_LEN]));
        }

        Ok(Bucket {
            base,
            deltas,
            ids,
            summary,
        })
    }

    /// Decode only the leading summary bitmap of a payload.
    ///
    /// Used by range scans to union a fully covered bucket without paying
    /// for the entry arrays.
    pub fn read_summary_bitmap(bytes: &[u8]) -> Result<DocIdBitmap> {
        if bytes.len() < 4 {
            return Err(Error::Corrupt(format!(
                "payload of {} bytes has no bitmap header",
                bytes.len()
            )));
        }
        let bitmap_len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        if bitmap_len == 0 {
            return Ok(DocIdBitmap::new());
        }
        if 4 + bitmap_len > bytes.len() {
            return Err(Error::Corrupt(format!(
                "bitmap length {} exceeds payload of {} bytes",
                bitmap_len,
                bytes.len()
            )));
        }
        DocIdBitmap::deserialize_from(&bytes[4..4 + bitmap_len])
            .map_err(|e| Error::Corrupt(format!("undecodable summary bitmap: {}", e)))
    }

    /// Peek the smallest and largest resident values of a payload without
    /// decoding the bitmap or the id array. `None` for an empty bucket.
    pub fn read_value_bounds(
        bytes: &[u8],
        base: SortableValue,
    ) -> Result<Option<(SortableValue, SortableValue)>> {
        if bytes.len() < MIN_PAYLOAD_LEN {
            return Err(Error::Corrupt(format!(
                "payload of {} bytes is shorter than the {}-byte minimum",
                bytes.len(),
                MIN_PAYLOAD_LEN
            )));
        }
        let bitmap_len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let offset = 4 + bitmap_len;
        if offset + 2 > bytes.len() {
            return Err(Error::Corrupt(format!(
                "bitmap length {} exceeds payload of {} bytes",
                bitmap_len,
                bytes.len()
            )));
        }
        let count = u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()) as usize;
        if count == 0 {
            return Ok(None);
        }
        let deltas_start = offset + 2;
        if deltas_start + count * 2 > bytes.len() {
            return Err(Error::Corrupt(format!(
                "delta array truncated in payload of {} bytes",
                bytes.len()
            )));
        }
        let first = u16::from_le_bytes(bytes[deltas_start..deltas_start + 2].try_into().unwrap());
        let last_at = deltas_start + (count - 1) * 2;
        let last = u16::from_le_bytes(bytes[last_at..last_at + 2].try_into().unwrap());
        Ok(Some((
            base + first as SortableValue,
            base + last as SortableValue,
        )))
    }
}
