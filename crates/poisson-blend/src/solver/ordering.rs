//! Fill-reducing ordering for the reduced system.
//!
//! A sparse Cholesky factor of a grid Laplacian taken in row-major order
//! fills the whole band between neighbouring rows: a k×k region costs k³
//! stored entries. Nested dissection removes a small separator that splits
//! the graph in two, orders both halves first and the separator last, and
//! recurses. Fill then grows like `n log n`.
//!
//! Separators are middle levels of a breadth-first level structure rooted
//! at a pseudo-peripheral node, which needs no geometry and works on any
//! mask shape.

/// Pieces at or below this size are ordered as they come.
const LEAF_SIZE: usize = 64;

/// Rounds of the pseudo-peripheral node search.
const PERIPHERAL_ROUNDS: usize = 8;

/// Nested dissection ordering of an undirected graph given as adjacency
/// lists.
///
/// Returns `order` with `order[new] = old`.
pub(crate) fn nested_dissection(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut order = vec![usize::MAX; n];
    let mut scratch = Scratch::new(n);

    // (nodes, first position in `order` reserved for them)
    let mut pending: Vec<(Vec<usize>, usize)> = vec![((0..n).collect(), 0)];

    while let Some((nodes, start)) = pending.pop() {
        if nodes.len() <= LEAF_SIZE {
            place(&mut order, start, &nodes);
            continue;
        }

        let components = scratch.components(adjacency, &nodes);
        if components.len() > 1 {
            let mut next = start;
            for component in components {
                let len = component.len();
                pending.push((component, next));
                next += len;
            }
            continue;
        }

        match scratch.separator(adjacency, &nodes) {
            Some((rest, separator)) => {
                place(&mut order, start + rest.len(), &separator);
                pending.push((rest, start));
            }
            None => place(&mut order, start, &nodes),
        }
    }

    debug_assert!(order.iter().all(|&v| v < n));
    order
}

fn place(order: &mut [usize], start: usize, nodes: &[usize]) {
    order[start..start + nodes.len()].copy_from_slice(nodes);
}

/// Epoch-stamped marks, reused across the whole dissection.
struct Scratch {
    member: Vec<usize>,
    seen: Vec<usize>,
    epoch: usize,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            member: vec![0; n],
            seen: vec![0; n],
            epoch: 0,
        }
    }

    fn next_epoch(&mut self) -> usize {
        self.epoch += 1;
        self.epoch
    }

    fn mark_members(&mut self, nodes: &[usize]) -> usize {
        let m = self.next_epoch();
        for &v in nodes {
            self.member[v] = m;
        }
        m
    }

    /// Connected components of the subgraph induced by `nodes`.
    fn components(&mut self, adjacency: &[Vec<usize>], nodes: &[usize]) -> Vec<Vec<usize>> {
        let m = self.mark_members(nodes);
        let s = self.next_epoch();

        let mut components = Vec::new();
        for &root in nodes {
            if self.seen[root] == s {
                continue;
            }
            self.seen[root] = s;
            let mut component = vec![root];
            let mut head = 0;
            while head < component.len() {
                let v = component[head];
                head += 1;
                for &w in &adjacency[v] {
                    if self.member[w] == m && self.seen[w] != s {
                        self.seen[w] = s;
                        component.push(w);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Breadth-first levels from `root` within the members marked `m`.
    fn levels(&mut self, adjacency: &[Vec<usize>], root: usize, m: usize) -> Vec<Vec<usize>> {
        let s = self.next_epoch();
        self.seen[root] = s;

        let mut levels = vec![vec![root]];
        loop {
            let mut next = Vec::new();
            if let Some(current) = levels.last() {
                for &v in current {
                    for &w in &adjacency[v] {
                        if self.member[w] == m && self.seen[w] != s {
                            self.seen[w] = s;
                            next.push(w);
                        }
                    }
                }
            }
            if next.is_empty() {
                return levels;
            }
            levels.push(next);
        }
    }

    /// Split a connected piece into `(rest, separator)`, where removing the
    /// separator disconnects `rest` into at least two parts.
    ///
    /// Returns `None` when the piece is too shallow to split (fewer than
    /// three levels).
    fn separator(
        &mut self,
        adjacency: &[Vec<usize>],
        nodes: &[usize],
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        let m = self.mark_members(nodes);
        let mut levels = self.levels(adjacency, nodes[0], m);

        // Walk towards a pseudo-peripheral node: restart from a low-degree
        // node of the deepest level while the structure keeps getting deeper.
        for _ in 0..PERIPHERAL_ROUNDS {
            let Some(&candidate) = levels
                .last()
                .and_then(|last| last.iter().min_by_key(|&&v| adjacency[v].len()))
            else {
                break;
            };
            let deeper = self.levels(adjacency, candidate, m);
            if deeper.len() <= levels.len() {
                break;
            }
            levels = deeper;
        }

        if levels.len() < 3 {
            return None;
        }

        // First level at which half of the nodes lie at or above it.
        let half = nodes.len() / 2;
        let mut seen = 0;
        let mut middle = levels.len() / 2;
        for (i, level) in levels.iter().enumerate() {
            seen += level.len();
            if seen >= half {
                middle = i;
                break;
            }
        }
        let middle = middle.clamp(1, levels.len() - 2);

        let separator = levels[middle].clone();
        let rest = levels
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != middle)
            .flat_map(|(_, level)| level)
            .collect();
        Some((rest, separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: usize, height: usize) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); width * height];
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                if x + 1 < width {
                    adjacency[i].push(i + 1);
                    adjacency[i + 1].push(i);
                }
                if y + 1 < height {
                    adjacency[i].push(i + width);
                    adjacency[i + width].push(i);
                }
            }
        }
        adjacency
    }

    fn assert_permutation(order: &[usize], n: usize) {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_graph_keeps_natural_order() {
        let order = nested_dissection(&grid(4, 4));
        assert_eq!(order, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_grid_ordering_is_permutation() {
        let order = nested_dissection(&grid(37, 23));
        assert_permutation(&order, 37 * 23);
    }

    #[test]
    fn test_path_separator_is_ordered_last() {
        let n = 201;
        let mut adjacency = vec![Vec::new(); n];
        for i in 0..n - 1 {
            adjacency[i].push(i + 1);
            adjacency[i + 1].push(i);
        }

        let order = nested_dissection(&adjacency);
        assert_permutation(&order, n);

        // The last node splits the path into two roughly equal halves.
        let last = order[n - 1];
        assert!((n / 3..2 * n / 3).contains(&last), "separator {last}");
    }

    #[test]
    fn test_disconnected_pieces() {
        // Two 10x10 grids side by side with no edges between them.
        let mut adjacency = grid(10, 10);
        let second: Vec<Vec<usize>> = grid(10, 10)
            .into_iter()
            .map(|nbrs| nbrs.into_iter().map(|v| v + 100).collect())
            .collect();
        adjacency.extend(second);

        let order = nested_dissection(&adjacency);
        assert_permutation(&order, 200);

        // Each piece occupies a contiguous block of positions.
        let first_block: Vec<bool> = order.iter().map(|&v| v < 100).collect();
        let switches = first_block.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_empty_graph() {
        assert!(nested_dissection(&[]).is_empty());
    }
}
