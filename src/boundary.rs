//! Boundary edge collection and loop reconstruction
//!
//! While a side is being sliced, every cut contributes one directed edge
//! `a -> b` of the future cap outline. [`BoundaryGraph`] keeps those links in a
//! flat arena (`next`/`previous` are node indices, not references) and walks
//! them into closed [`BoundaryLoop`]s once all edges are known.

use std::collections::HashMap;

/// One boundary vertex and its neighbours along the cap outline
#[derive(Debug, Clone, Copy)]
struct BoundaryNode {
    /// Output mesh vertex index
    vertex: usize,
    /// Node this one links to
    next: Option<usize>,
    /// Node linking to this one
    previous: Option<usize>,
}

/// A closed cap outline, as output mesh vertex indices in link order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundaryLoop {
    vertices: Vec<usize>,
}

impl BoundaryLoop {
    pub(crate) fn vertices(&self) -> &[usize] {
        &self.vertices
    }
}

/// Why a boundary walk did not produce a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopError {
    /// A vertex links to itself
    SelfConnected { vertex: usize },
    /// The walk reached a vertex with no successor
    Open { start: usize, end: usize },
    /// The walk ran into a vertex already claimed by another walk
    Tangled { start: usize, at: usize },
}

/// Everything recovered from a [`BoundaryGraph`]
#[derive(Debug, Default)]
pub(crate) struct LoopSet {
    /// Closed loops with at least three vertices
    pub loops: Vec<BoundaryLoop>,
    /// One entry per walk that failed
    pub errors: Vec<LoopError>,
    /// Closed walks with fewer than three vertices
    pub degenerate: usize,
}

/// Directed boundary edges of one output mesh
#[derive(Debug, Default)]
pub(crate) struct BoundaryGraph {
    nodes: Vec<BoundaryNode>,
    lookup: HashMap<usize, usize>,
    isolated: Vec<usize>,
    edge_count: usize,
}

impl BoundaryGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, vertex: usize) -> usize {
        if let Some(&index) = self.lookup.get(&vertex) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(BoundaryNode {
            vertex,
            next: None,
            previous: None,
        });
        self.lookup.insert(vertex, index);
        index
    }

    /// Record that the cap outline runs from `from` to `to`
    pub(crate) fn add_edge(&mut self, from: usize, to: usize) {
        let a = self.node(from);
        let b = self.node(to);

        if let Some(old) = self.nodes[a].next
            && old != b
        {
            log::debug!(
                "boundary vertex {} already links to {}; relinking to {}",
                from,
                self.nodes[old].vertex,
                to
            );
        }

        self.nodes[a].next = Some(b);
        self.nodes[b].previous = Some(a);
        self.edge_count += 1;
    }

    /// Record a boundary point with no extent (a cut through a single point)
    pub(crate) fn add_point(&mut self, vertex: usize) {
        self.node(vertex);
        self.isolated.push(vertex);
    }

    /// Number of directed edges registered
    pub(crate) fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of degenerate single-point registrations
    pub(crate) fn isolated_count(&self) -> usize {
        self.isolated.len()
    }

    /// Walk the links into closed loops
    ///
    /// Closed cycles are collected first, so a stray chain running into a loop
    /// does not claim it. Every chain left over is reported once as a failed
    /// walk and does not stop the others.
    pub(crate) fn loops(&self) -> LoopSet {
        let mut set = LoopSet::default();
        let mut visited = vec![false; self.nodes.len()];
        // Nodes whose forward walk is known to end somewhere other than a cycle
        let mut acyclic = vec![false; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if visited[start] || acyclic[start] {
                continue;
            }

            let node = self.nodes[start];
            if node.next.is_none() && node.previous.is_none() {
                visited[start] = true;
                continue;
            }

            if node.next == Some(start) || node.previous == Some(start) {
                visited[start] = true;
                set.errors.push(LoopError::SelfConnected {
                    vertex: node.vertex,
                });
                continue;
            }

            let Some(cycle) = self.cycle_from(start, &visited, &mut acyclic) else {
                continue;
            };
            for &index in &cycle {
                visited[index] = true;
            }

            let vertices: Vec<usize> = cycle.iter().map(|&i| self.nodes[i].vertex).collect();
            if vertices.len() < 3 {
                log::debug!(
                    "discarding degenerate boundary loop with {} vertices",
                    vertices.len()
                );
                set.degenerate += 1;
            } else {
                set.loops.push(BoundaryLoop { vertices });
            }
        }

        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            let head = self.chain_head(start, &visited);
            set.errors.push(self.walk(head, &mut visited));
        }

        set
    }

    /// Follow `next` links from `start`, returning the nodes if they come back to it
    ///
    /// On a walk that dead-ends or runs into `visited`, every node passed is
    /// marked in `acyclic`.
    fn cycle_from(
        &self,
        start: usize,
        visited: &[bool],
        acyclic: &mut [bool],
    ) -> Option<Vec<usize>> {
        let mut cycle = vec![start];
        let mut current = start;

        for _ in 0..self.nodes.len() {
            match self.nodes[current].next {
                Some(next) if next == start => return Some(cycle),
                Some(next) if next != current && !visited[next] && !acyclic[next] => {
                    cycle.push(next);
                    current = next;
                }
                Some(next) if next == current => return None,
                _ => {
                    for &index in &cycle {
                        acyclic[index] = true;
                    }
                    return None;
                }
            }
        }
        None
    }

    /// Rewind along `previous` links so an open chain is walked from its first vertex
    fn chain_head(&self, start: usize, visited: &[bool]) -> usize {
        let mut head = start;
        for _ in 0..self.nodes.len() {
            match self.nodes[head].previous {
                Some(p) if p != start && p != head && !visited[p] => head = p,
                _ => break,
            }
        }
        head
    }

    /// Walk a chain that does not close and say where it breaks
    fn walk(&self, head: usize, visited: &mut [bool]) -> LoopError {
        let mut current = head;

        loop {
            visited[current] = true;

            match self.nodes[current].next {
                None => {
                    return LoopError::Open {
                        start: self.nodes[head].vertex,
                        end: self.nodes[current].vertex,
                    };
                }
                Some(next) if next == current => {
                    return LoopError::SelfConnected {
                        vertex: self.nodes[current].vertex,
                    };
                }
                Some(next) if visited[next] => {
                    return LoopError::Tangled {
                        start: self.nodes[head].vertex,
                        at: self.nodes[next].vertex,
                    };
                }
                Some(next) => current = next,
            }
        }
    }
}
