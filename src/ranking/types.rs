use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One ranked label.
pub struct RankedSkill {
    /// The label text.
    pub label: String,
    /// Cosine similarity to the query.
    pub score: f32,
    /// Position of the label in the skill pool.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
/// Labels ordered by non-increasing score, ties in pool order.
pub struct RankedResult {
    entries: Vec<RankedSkill>,
}

impl RankedResult {
    pub(crate) fn new(entries: Vec<RankedSkill>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best-scoring entry.
    pub fn top(&self) -> Option<&RankedSkill> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedSkill> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[RankedSkill] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.score).collect()
    }

    pub fn into_vec(self) -> Vec<RankedSkill> {
        self.entries
    }
}

impl IntoIterator for RankedResult {
    type Item = RankedSkill;
    type IntoIter = std::vec::IntoIter<RankedSkill>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a RankedSkill;
    type IntoIter = std::slice::Iter<'a, RankedSkill>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for RankedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (rank, entry) in self.entries.iter().enumerate() {
            writeln!(f, "{}\t{:.4}\t{}", rank + 1, entry.score, entry.label)?;
        }
        Ok(())
    }
}
