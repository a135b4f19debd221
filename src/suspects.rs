/// Number of hash buckets. A small prime keeps the djb2 spread even.
pub const BUCKET_COUNT: usize = 101;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspectEntry {
    pub clue: String,
    pub suspect: String,
}

/// djb2 over the UTF-8 bytes of `key`, reduced to a bucket index.
pub fn bucket_of(key: &str) -> usize {
    let hash = key
        .bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(u64::from(b)));
    (hash % BUCKET_COUNT as u64) as usize
}

/// Clue -> suspect lookup table with separate chaining.
///
/// Each clue appears at most once; inserting a known clue again replaces
/// the suspect. New entries go to the front of their chain.
#[derive(Debug, Clone)]
pub struct SuspectDirectory {
    buckets: Vec<Vec<SuspectEntry>>,
}

impl Default for SuspectDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspectDirectory {
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); BUCKET_COUNT],
        }
    }

    /// Associate `clue` with `suspect`. Empty keys or values are ignored.
    pub fn insert_or_update(&mut self, clue: &str, suspect: &str) {
        if clue.is_empty() || suspect.is_empty() {
            return;
        }
        let chain = &mut self.buckets[bucket_of(clue)];
        if let Some(entry) = chain.iter_mut().find(|e| e.clue == clue) {
            entry.suspect = suspect.to_string();
            return;
        }
        chain.insert(
            0,
            SuspectEntry {
                clue: clue.to_string(),
                suspect: suspect.to_string(),
            },
        );
    }

    pub fn lookup(&self, clue: &str) -> Option<&str> {
        if clue.is_empty() {
            return None;
        }
        self.buckets[bucket_of(clue)]
            .iter()
            .find(|e| e.clue == clue)
            .map(|e| e.suspect.as_str())
    }

    /// Entries of one bucket, front of the chain first.
    #[cfg(test)]
    pub fn chain(&self, bucket: usize) -> &[SuspectEntry] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct suspect names, sorted.
    pub fn suspects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .buckets
            .iter()
            .flatten()
            .map(|e| e.suspect.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
