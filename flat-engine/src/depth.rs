// Embedding depth table
// Longest path to a type with no embeddings, memoized per type since
// embedders frequently share base types

use flat_graph::{TypeGraph, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DepthEntry {
    depth: usize,
    /// Next hop on the longest chain
    next: Option<TypeId>,
}

/// Depth and longest chain of every type in a graph
#[derive(Debug, Clone)]
pub struct DepthTable {
    entries: Vec<DepthEntry>,
}

impl DepthTable {
    pub fn compute(graph: &TypeGraph) -> Self {
        let mut memo: Vec<Option<DepthEntry>> = vec![None; graph.len()];
        for id in graph.ids() {
            Self::fill(graph, id, &mut memo);
        }
        Self {
            entries: memo
                .into_iter()
                .map(|entry| entry.unwrap_or(DepthEntry { depth: 0, next: None }))
                .collect(),
        }
    }

    fn fill(graph: &TypeGraph, id: TypeId, memo: &mut [Option<DepthEntry>]) -> usize {
        if let Some(entry) = memo[id.index()] {
            return entry.depth;
        }

        let mut best = DepthEntry { depth: 0, next: None };
        for target in graph.embedded(id) {
            let depth = Self::fill(graph, target, memo) + 1;
            // strict comparison: the earliest-declared embedding wins ties
            if depth > best.depth {
                best = DepthEntry {
                    depth,
                    next: Some(target),
                };
            }
        }

        memo[id.index()] = Some(best);
        best.depth
    }

    pub fn depth(&self, id: TypeId) -> usize {
        self.entries.get(id.index()).map_or(0, |e| e.depth)
    }

    /// Longest chain starting at `id`: `[id, T1, ..., Tk]` with Tk a leaf
    pub fn chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut current = self.entries.get(id.index()).and_then(|e| e.next);
        while let Some(next) = current {
            chain.push(next);
            current = self.entries.get(next.index()).and_then(|e| e.next);
        }
        chain
    }

    pub fn max_depth(&self) -> usize {
        self.entries.iter().map(|e| e.depth).max().unwrap_or(0)
    }

    pub fn mean_depth(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: usize = self.entries.iter().map(|e| e.depth).sum();
        total as f64 / self.entries.len() as f64
    }
}
