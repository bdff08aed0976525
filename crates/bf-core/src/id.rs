use lasso::{Spur, ThreadedRodeo};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for host node IDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for a node owned by the host document.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a page prefix (e.g. `1:2`, `1:3`).
    pub fn with_prefix(prefix: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}:{n}"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

// ─── Sequence identifiers ────────────────────────────────────────────────

/// Opaque identifier grouping items into one numbered sequence.
///
/// Fresh identifiers look like `badge_seq_1718000000000_k3j9x0a2b`:
/// prefix, millisecond stamp, nine base-36 random characters. Identifiers
/// read back from metadata are accepted verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(String);

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl SequenceId {
    /// Generate a process-wide unique identifier.
    ///
    /// The millisecond stamp never repeats within a process (it is bumped
    /// past the previous one when the clock has not advanced), so two calls
    /// never collide even if the random suffix does.
    pub fn generate(prefix: &str) -> Self {
        let stamp = next_stamp();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{prefix}_{stamp}_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short tag used in node names and status messages.
    ///
    /// For `prefix_stamp_random` shapes this is the first four characters of
    /// the third `_` segment; anything else falls back to the last four
    /// characters.
    pub fn display_tag(&self) -> &str {
        let s = self.0.as_str();
        let parts: Vec<&str> = s.split('_').collect();
        if parts.len() >= 3 {
            let seg = parts[2];
            let end = seg.char_indices().nth(4).map_or(seg.len(), |(i, _)| i);
            return &seg[..end];
        }
        let count = s.chars().count();
        let start = s
            .char_indices()
            .nth(count.saturating_sub(4))
            .map_or(0, |(i, _)| i);
        &s[start..]
    }
}

impl From<&str> for SequenceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SequenceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic millisecond stamp shared by every generator in the process.
fn next_stamp() -> u64 {
    static LAST: AtomicU64 = AtomicU64::new(0);
    let now = now_millis();
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => prev = current,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("12:7");
        let b = NodeId::intern("12:7");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "12:7");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("1");
        let b = NodeId::with_prefix("1");
        assert_ne!(a, b);
    }

    #[test]
    fn generated_sequence_ids_never_collide() {
        let ids: HashSet<SequenceId> = (0..500).map(|_| SequenceId::generate("badge_seq")).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn generated_sequence_id_shape() {
        let id = SequenceId::generate("desc_seq");
        let s = id.as_str();
        assert!(s.starts_with("desc_seq_"), "got {s}");
        let suffix = s.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn display_tag_uses_third_segment() {
        assert_eq!(SequenceId::from("seq_1718000000000_k3j9x0a2b").display_tag(), "k3j9");
        // "badge_seq_<stamp>_<rand>": the third segment is the stamp
        assert_eq!(SequenceId::from("badge_seq_1718000000000_xyz").display_tag(), "1718");
    }

    #[test]
    fn display_tag_falls_back_to_tail() {
        assert_eq!(SequenceId::from("legacy-sequence").display_tag(), "ence");
        assert_eq!(SequenceId::from("ab").display_tag(), "ab");
        assert_eq!(SequenceId::from("").display_tag(), "");
    }
}
