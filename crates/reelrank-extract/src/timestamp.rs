//! Creation-time resolution for post nodes.
//!
//! Media primary keys embed their creation time: the bits above the low
//! [`SEQUENCE_BITS`] hold milliseconds since [`IG_EPOCH_SECS`]. That layout is
//! undocumented. If the platform changes its id scheme, decoded timestamps
//! become silently wrong, so decoding ranks below every explicit field.

use serde_json::{Map, Value};

use crate::fields::{
    lookup, ALTERNATE_TIMESTAMP, CAPTION_TIMESTAMP, CAPTURE_TIMESTAMP, CREATION_TIMESTAMP,
    DEVICE_TIMESTAMP, PRIMARY_KEY,
};

/// Unix time, in seconds, that primary-key timestamps count from.
pub const IG_EPOCH_SECS: i64 = 1_314_220_021;

/// Low-order primary-key bits used for shard and sequence numbers.
pub const SEQUENCE_BITS: u32 = 23;

/// Decoded timestamps earlier than this come from non-media numeric ids.
const MIN_DECODED_SECS: i64 = IG_EPOCH_SECS + 365 * 86_400;

/// Decoded timestamps further than this past extraction time are rejected.
const MAX_FUTURE_SKEW_SECS: i64 = 86_400;

/// Values above this in `device_timestamp` are milliseconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Which source produced a resolved timestamp, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// `taken_at_timestamp`
    CaptureField,
    /// `taken_at`
    AlternateField,
    /// `device_timestamp`
    DeviceField,
    /// `creation_time`
    CreationField,
    /// The caption object's own creation time.
    Caption,
    /// Decoded from the media primary key.
    PrimaryKey,
    /// Nothing usable; extraction time stands in.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    pub secs: i64,
    pub source: TimestampSource,
}

impl ResolvedTimestamp {
    /// `true` when the value is the extraction-time fallback.
    #[must_use]
    pub fn is_estimated(&self) -> bool {
        self.source == TimestampSource::Fallback
    }
}

/// Decodes the creation time embedded in a media primary key.
///
/// Returns `None` when the decoded time falls within a year of the epoch,
/// which means the value is some other numeric id rather than a media key.
#[must_use]
pub fn decode_primary_key(pk: u64) -> Option<i64> {
    let millis = pk >> SEQUENCE_BITS;
    let secs = i64::try_from(millis / 1000).ok()?;
    IG_EPOCH_SECS
        .checked_add(secs)
        .filter(|secs| *secs >= MIN_DECODED_SECS)
}

/// Resolves a node's creation time, falling back to `now`.
pub(crate) fn resolve_timestamp(node: &Map<String, Value>, now: i64) -> ResolvedTimestamp {
    let resolved = |secs, source| ResolvedTimestamp { secs, source };

    if let Some(secs) = field_secs(node, CAPTURE_TIMESTAMP) {
        return resolved(secs, TimestampSource::CaptureField);
    }
    if let Some(secs) = field_secs(node, ALTERNATE_TIMESTAMP) {
        return resolved(secs, TimestampSource::AlternateField);
    }
    if let Some(raw) = field_secs(node, DEVICE_TIMESTAMP) {
        let secs = if raw > MILLIS_THRESHOLD { raw / 1000 } else { raw };
        return resolved(secs, TimestampSource::DeviceField);
    }
    if let Some(secs) = field_secs(node, CREATION_TIMESTAMP) {
        return resolved(secs, TimestampSource::CreationField);
    }
    if let Some(secs) = CAPTION_TIMESTAMP
        .iter()
        .find_map(|path| field_secs(node, path))
    {
        return resolved(secs, TimestampSource::Caption);
    }
    if let Some(secs) = primary_key(node)
        .and_then(decode_primary_key)
        .filter(|secs| *secs <= now.saturating_add(MAX_FUTURE_SKEW_SECS))
    {
        return resolved(secs, TimestampSource::PrimaryKey);
    }

    resolved(now, TimestampSource::Fallback)
}

fn field_secs(node: &Map<String, Value>, path: &[&str]) -> Option<i64> {
    lookup(node, path).and_then(as_unix_secs)
}

/// Numeric primary key of a media node.
///
/// `pk` may be a number or a digit string. Composite `id`s of the form
/// `<pk>_<owner pk>` contribute their leading digit run.
pub(crate) fn primary_key(node: &Map<String, Value>) -> Option<u64> {
    PRIMARY_KEY.iter().find_map(|path| match lookup(node, path)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let digits: &str = s.split('_').next().unwrap_or_default();
            digits.parse::<u64>().ok()
        }
        _ => None,
    })
}

/// Positive Unix seconds from a number or digit string.
#[allow(clippy::cast_possible_truncation)]
fn as_unix_secs(value: &Value) -> Option<i64> {
    let secs = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (secs > 0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const NOW: i64 = 1_760_000_000;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object fixture, got {other}"),
        }
    }

    fn synthetic_pk(target: i64) -> u64 {
        let millis = u64::try_from((target - IG_EPOCH_SECS) * 1000).unwrap();
        millis << SEQUENCE_BITS
    }

    #[test]
    fn decode_recovers_exact_target_timestamp() {
        for target in [1_400_000_000_i64, 1_600_000_123, 1_745_678_901] {
            assert_eq!(decode_primary_key(synthetic_pk(target)), Some(target));
        }
    }

    #[test]
    fn decode_ignores_sequence_bits() {
        let target = 1_700_000_000;
        let pk = synthetic_pk(target) | 0x7F_FFFF;
        assert_eq!(decode_primary_key(pk), Some(target));
    }

    #[test]
    fn decode_rejects_keys_without_time_bits() {
        assert_eq!(decode_primary_key(17), None);
    }

    #[test]
    fn decode_rejects_keys_near_the_epoch() {
        assert_eq!(decode_primary_key(5_000_000_000), None);
        assert_eq!(decode_primary_key(synthetic_pk(MIN_DECODED_SECS - 1)), None);
        assert_eq!(
            decode_primary_key(synthetic_pk(MIN_DECODED_SECS)),
            Some(MIN_DECODED_SECS)
        );
    }

    #[test]
    fn small_numeric_key_falls_back_to_now() {
        let node = object(json!({"pk": 5_000_000_000_u64}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, NOW);
        assert_eq!(resolved.source, TimestampSource::Fallback);
        assert!(resolved.is_estimated());
    }

    #[test]
    fn capture_field_wins_over_everything() {
        let node = object(json!({
            "taken_at_timestamp": 1_700_000_000,
            "taken_at": 1_600_000_000,
            "pk": synthetic_pk(1_500_000_000)
        }));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, 1_700_000_000);
        assert_eq!(resolved.source, TimestampSource::CaptureField);
    }

    #[test]
    fn alternate_field_used_when_capture_missing() {
        let node = object(json!({"taken_at": 1_600_000_000}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, 1_600_000_000);
        assert_eq!(resolved.source, TimestampSource::AlternateField);
    }

    #[test]
    fn device_timestamp_in_millis_is_scaled() {
        let node = object(json!({"device_timestamp": 1_650_000_000_123_i64}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, 1_650_000_000);
        assert_eq!(resolved.source, TimestampSource::DeviceField);
    }

    #[test]
    fn caption_created_at_used_before_primary_key() {
        let node = object(json!({
            "caption": {"text": "hi", "created_at": 1_690_000_000},
            "pk": synthetic_pk(1_500_000_000)
        }));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, 1_690_000_000);
        assert_eq!(resolved.source, TimestampSource::Caption);
    }

    #[test]
    fn primary_key_decoded_from_digit_string_id() {
        let id = format!("{}_123456", synthetic_pk(1_710_000_000));
        let node = object(json!({"id": id}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, 1_710_000_000);
        assert_eq!(resolved.source, TimestampSource::PrimaryKey);
    }

    #[test]
    fn future_decoded_timestamp_falls_back_to_now() {
        let node = object(json!({"pk": synthetic_pk(NOW + 10 * 86_400)}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.secs, NOW);
        assert!(resolved.is_estimated());
    }

    #[test]
    fn zero_timestamp_fields_are_ignored() {
        let node = object(json!({"taken_at_timestamp": 0, "taken_at": null}));
        let resolved = resolve_timestamp(&node, NOW);
        assert_eq!(resolved.source, TimestampSource::Fallback);
        assert_eq!(resolved.secs, NOW);
    }
}
