//! Binary encoding of a [`ClusterSet`].
//!
//! All integers are little-endian. Strings are a `u32` byte length followed by
//! UTF-8 bytes.
//!
//! | Field | Type |
//! |-------|------|
//! | magic | `b"KMCS"` |
//! | attribute count | `u32` |
//! | per attribute | name, tag `u8` (0 continuous, 1 categorical), then `min: f64, max: f64` or `count: u32` + values |
//! | cluster count | `u32` |
//! | per cluster | record length `u32`, centroid values, member count `u32`, members `u64` each |
//!
//! A centroid value is a tag `u8` (0 number, 1 text) followed by an `f64` or a
//! string. The record length covers everything after itself up to the next
//! cluster.

use crate::attribute::{Attribute, AttributeKind, Value};
use crate::cluster::Cluster;
use crate::cluster_set::{ClusterSet, ClusterSetBuilder};
use crate::error::{KMeansError, Result};
use crate::tuple::Tuple;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

const MAGIC: &[u8; 4] = b"KMCS";

const TAG_CONTINUOUS: u8 = 0;
const TAG_CATEGORICAL: u8 = 1;

const TAG_NUMBER: u8 = 0;
const TAG_TEXT: u8 = 1;

/// Encode the full cluster set: schema, centroid values and memberships
pub fn encode_cluster_set(cluster_set: &ClusterSet) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);

    let schema = cluster_set.schema();
    put_u32(&mut bytes, schema.len());
    for attribute in schema.iter() {
        put_str(&mut bytes, attribute.name());
        match attribute.kind() {
            AttributeKind::Continuous { min, max } => {
                bytes.push(TAG_CONTINUOUS);
                bytes.extend_from_slice(&min.to_le_bytes());
                bytes.extend_from_slice(&max.to_le_bytes());
            }
            AttributeKind::Categorical { domain } => {
                bytes.push(TAG_CATEGORICAL);
                put_u32(&mut bytes, domain.len());
                for value in domain {
                    put_str(&mut bytes, value);
                }
            }
        }
    }

    put_u32(&mut bytes, cluster_set.k());
    for cluster in cluster_set.iter() {
        let mut record = Vec::new();
        for value in cluster.centroid().values() {
            match value {
                Value::Number(v) => {
                    record.push(TAG_NUMBER);
                    record.extend_from_slice(&v.to_le_bytes());
                }
                Value::Text(s) => {
                    record.push(TAG_TEXT);
                    put_str(&mut record, s);
                }
            }
        }
        put_u32(&mut record, cluster.len());
        for &id in cluster.members() {
            record.extend_from_slice(&(id as u64).to_le_bytes());
        }

        put_u32(&mut bytes, record.len());
        bytes.extend_from_slice(&record);
    }

    bytes
}

/// Decode a buffer produced by [`encode_cluster_set`].
///
/// # Errors
///
/// `Persistence` on a bad magic, truncated or trailing bytes, invalid UTF-8,
/// unknown tags, a centroid value that does not match its attribute, a record
/// whose length disagrees with its content, or a row id in two clusters.
pub fn decode_cluster_set(bytes: &[u8]) -> Result<ClusterSet> {
    let mut reader = Reader::new(bytes);

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(corrupt("bad magic"));
    }

    let attr_count = reader.read_u32()? as usize;
    if attr_count == 0 {
        return Err(corrupt("model has no attributes"));
    }
    let mut attributes = Vec::with_capacity(attr_count.min(1024));
    for index in 0..attr_count {
        let name = reader.read_str()?;
        let attribute = match reader.read_u8()? {
            TAG_CONTINUOUS => {
                let min = reader.read_f64()?;
                let max = reader.read_f64()?;
                Attribute::continuous(name, index, min, max)
            }
            TAG_CATEGORICAL => {
                let count = reader.read_u32()? as usize;
                let mut domain = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    domain.push(reader.read_str()?);
                }
                Attribute::categorical(name, index, domain)
            }
            tag => return Err(corrupt(&format!("unknown attribute tag {}", tag))),
        };
        attributes.push(attribute);
    }
    let schema: Arc<[Attribute]> = Arc::from(attributes);

    let k = reader.read_u32()? as usize;
    let mut builder =
        ClusterSetBuilder::with_capacity(k).map_err(|_| corrupt("model has no clusters"))?;
    let mut assigned: HashSet<usize> = HashSet::new();

    for c in 0..k {
        let record_len = reader.read_u32()? as usize;
        let mut record = Reader::new(reader.take(record_len)?);

        let mut values = Vec::with_capacity(schema.len());
        for attribute in schema.iter() {
            let value = match record.read_u8()? {
                TAG_NUMBER => Value::Number(record.read_f64()?),
                TAG_TEXT => Value::Text(record.read_str()?),
                tag => return Err(corrupt(&format!("unknown value tag {}", tag))),
            };
            if attribute.is_continuous() != matches!(value, Value::Number(_)) {
                return Err(corrupt(&format!(
                    "centroid {} value '{}' does not match attribute '{}'",
                    c,
                    value,
                    attribute.name()
                )));
            }
            values.push(value);
        }
        let centroid = Tuple::new(Arc::clone(&schema), values)?;

        let member_count = record.read_u32()? as usize;
        let mut members = BTreeSet::new();
        for _ in 0..member_count {
            let id = usize::try_from(record.read_u64()?)
                .map_err(|_| corrupt("member id does not fit this platform"))?;
            if !members.insert(id) || !assigned.insert(id) {
                return Err(corrupt(&format!("row {} assigned more than once", id)));
            }
        }
        record.finish()?;

        builder
            .push(Cluster::with_members(centroid, members))
            .map_err(|e| corrupt(&e.to_string()))?;
    }

    reader.finish()?;
    builder.build()
}

fn corrupt(detail: &str) -> KMeansError {
    KMeansError::Persistence(format!("malformed model buffer: {}", detail))
}

fn put_u32(bytes: &mut Vec<u8>, v: usize) {
    bytes.extend_from_slice(&(v as u32).to_le_bytes());
}

fn put_str(bytes: &mut Vec<u8>, s: &str) {
    put_u32(bytes, s.len());
    bytes.extend_from_slice(s.as_bytes());
}

/// Bounds-checked cursor over a byte slice
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| corrupt("unexpected end of buffer"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    fn read_str(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| corrupt("invalid UTF-8 in string"))
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(corrupt(&format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn fitted_set() -> ClusterSet {
        let data = Dataset::new(
            vec![
                Attribute::categorical("outlook", 0, ["sunny", "rain", "overcast"]),
                Attribute::continuous("temperature", 1, -5.5, 40.0),
            ],
            vec![
                vec!["sunny".into(), 40.0.into()],
                vec!["rain".into(), (-5.5).into()],
                vec!["overcast".into(), 12.25.into()],
            ],
        )
        .unwrap();
        let mut set = ClusterSet::from_rows(&data, &[0, 1]).unwrap();
        set.get_mut(0).add_data(0);
        set.get_mut(0).add_data(2);
        set.get_mut(1).add_data(1);
        set.update_centroids(&data);
        set
    }

    #[test]
    fn test_round_trip() {
        let set = fitted_set();
        let decoded = decode_cluster_set(&encode_cluster_set(&set)).unwrap();

        assert_eq!(decoded, set);
        assert_eq!(decoded.get(0).members(), set.get(0).members());
        assert_eq!(decoded.schema(), set.schema());
    }

    #[test]
    fn test_layout_prefix() {
        let bytes = encode_cluster_set(&fitted_set());

        assert_eq!(&bytes[..4], b"KMCS");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_cluster_set(&fitted_set());
        bytes[0] = b'X';
        assert!(matches!(
            decode_cluster_set(&bytes),
            Err(KMeansError::Persistence(_))
        ));
    }

    #[test]
    fn test_truncated_buffer() {
        let bytes = encode_cluster_set(&fitted_set());
        for cut in [0, 3, 8, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                matches!(
                    decode_cluster_set(&bytes[..cut]),
                    Err(KMeansError::Persistence(_))
                ),
                "cut at {} should fail",
                cut
            );
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode_cluster_set(&fitted_set());
        bytes.push(0);
        assert!(matches!(
            decode_cluster_set(&bytes),
            Err(KMeansError::Persistence(_))
        ));
    }
}
