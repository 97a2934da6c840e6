use crate::algo::{BoundingBox, BreadthfirstOptions, DepthSort};
use crate::error::{Error, Result};
use crate::graph::{Graph, LayoutResult, Point};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::TAU;

type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

pub fn layout(graph: &Graph, opts: &BreadthfirstOptions) -> Result<LayoutResult> {
    graph.validate()?;
    opts.validate()?;

    if graph.nodes.is_empty() {
        return Ok(LayoutResult::default());
    }

    let adj = Adjacency::build(graph);
    let components = adj.components();
    let roots = select_roots(graph, &adj, &components, opts)?;
    let (depths, started) = assign_depths(&adj, &roots, opts.directed);
    let step = ring_step(graph, opts.spacing_factor);

    let mut xy: Vec<(f64, f64)> = vec![(0.0, 0.0); graph.nodes.len()];
    // Right edge of the previously placed component.
    let mut cursor: Option<f64> = None;
    for component in &components {
        let rings = build_rings(graph, component, &depths, opts.depth_sort.as_ref());
        let placed = place_rings(graph, &rings, step, opts.avoid_overlap);

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        for &(idx, x, _) in &placed {
            let half = graph.nodes[idx].width / 2.0;
            min_x = min_x.min(x - half);
            max_x = max_x.max(x + half);
        }
        let dx = match cursor {
            None => 0.0,
            Some(right) => right + step - min_x,
        };
        for (idx, x, y) in placed {
            xy[idx] = (x + dx, y);
        }
        cursor = Some(max_x + dx);
    }

    if opts.fit {
        if let Some(bb) = opts.bounding_box {
            fit_into(graph, &mut xy, bb, opts.padding);
        }
    }

    let mut positions: BTreeMap<String, Point> = BTreeMap::new();
    let mut depth_out: BTreeMap<String, usize> = BTreeMap::new();
    for (idx, n) in graph.nodes.iter().enumerate() {
        let (x, y) = xy[idx];
        positions.insert(n.id.clone(), Point { x, y });
        depth_out.insert(n.id.clone(), depths[idx]);
    }

    Ok(LayoutResult {
        positions,
        depths: depth_out,
        roots: started
            .into_iter()
            .map(|idx| graph.nodes[idx].id.clone())
            .collect(),
    })
}

/// Index-based adjacency. Self-loops are dropped and parallel edges collapse in the neighbor
/// sets (degrees still count them). Neighbor lists keep the order edges were first seen in.
#[derive(Debug)]
struct Adjacency {
    out: Vec<FxIndexSet<usize>>,
    both: Vec<FxIndexSet<usize>>,
    in_degree: Vec<usize>,
    degree: Vec<usize>,
}

impl Adjacency {
    fn build(graph: &Graph) -> Self {
        let n = graph.nodes.len();
        let index = graph.node_index();
        let mut adj = Self {
            out: vec![FxIndexSet::default(); n],
            both: vec![FxIndexSet::default(); n],
            in_degree: vec![0; n],
            degree: vec![0; n],
        };

        for e in &graph.edges {
            if e.is_self_loop() {
                continue;
            }
            // Endpoints were checked by `Graph::validate`.
            let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
            else {
                continue;
            };
            adj.out[s].insert(t);
            adj.both[s].insert(t);
            adj.both[t].insert(s);
            adj.in_degree[t] += 1;
            adj.degree[s] += 1;
            adj.degree[t] += 1;
        }
        adj
    }

    fn len(&self) -> usize {
        self.both.len()
    }

    /// Undirected connected components. Components are ordered by their first node and list
    /// their members in node order.
    fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        let mut out: Vec<Vec<usize>> = Vec::new();
        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut comp = vec![start];
            let mut q = VecDeque::from([start]);
            while let Some(v) = q.pop_front() {
                for &w in &self.both[v] {
                    if !seen[w] {
                        seen[w] = true;
                        comp.push(w);
                        q.push_back(w);
                    }
                }
            }
            comp.sort_unstable();
            out.push(comp);
        }
        out
    }
}

fn select_roots(
    graph: &Graph,
    adj: &Adjacency,
    components: &[Vec<usize>],
    opts: &BreadthfirstOptions,
) -> Result<Vec<usize>> {
    if let Some(explicit) = &opts.roots {
        let index = graph.node_index();
        let mut roots: FxIndexSet<usize> = FxIndexSet::default();
        for id in explicit {
            let Some(&idx) = index.get(id.as_str()) else {
                return Err(Error::UnknownRoot {
                    node_id: id.clone(),
                });
            };
            roots.insert(idx);
        }
        return Ok(roots.into_iter().collect());
    }

    let mut roots: Vec<usize> = Vec::new();
    for comp in components {
        if opts.directed {
            let sources: Vec<usize> = comp
                .iter()
                .copied()
                .filter(|&v| adj.in_degree[v] == 0)
                .collect();
            if !sources.is_empty() {
                roots.extend(sources);
                continue;
            }
        }
        // First node of maximum degree; `comp` is in node order, so ties keep the earliest.
        let mut best = comp[0];
        for &v in &comp[1..] {
            if adj.degree[v] > adj.degree[best] {
                best = v;
            }
        }
        roots.push(best);
    }
    Ok(roots)
}

/// Multi-source BFS from `roots`, then a fresh depth-0 sequence from every node left unvisited.
///
/// Returns the per-node depth and the nodes each sequence was started from.
fn assign_depths(adj: &Adjacency, roots: &[usize], directed: bool) -> (Vec<usize>, Vec<usize>) {
    let neighbors = if directed { &adj.out } else { &adj.both };
    let mut depth: Vec<Option<usize>> = vec![None; adj.len()];
    let mut started: Vec<usize> = Vec::new();
    let mut q: VecDeque<usize> = VecDeque::new();

    for &r in roots {
        if depth[r].is_none() {
            depth[r] = Some(0);
            started.push(r);
            q.push_back(r);
        }
    }
    drain_bfs(neighbors, &mut depth, &mut q);

    for v in 0..adj.len() {
        if depth[v].is_some() {
            continue;
        }
        depth[v] = Some(0);
        started.push(v);
        q.push_back(v);
        drain_bfs(neighbors, &mut depth, &mut q);
    }

    let depth = depth.into_iter().map(|d| d.unwrap_or(0)).collect();
    (depth, started)
}

fn drain_bfs(
    neighbors: &[FxIndexSet<usize>],
    depth: &mut [Option<usize>],
    q: &mut VecDeque<usize>,
) {
    while let Some(v) = q.pop_front() {
        let next = depth[v].unwrap_or(0) + 1;
        for &w in &neighbors[v] {
            if depth[w].is_none() {
                depth[w] = Some(next);
                q.push_back(w);
            }
        }
    }
}

fn ring_step(graph: &Graph, spacing_factor: f64) -> f64 {
    let total: f64 = graph.nodes.iter().map(|n| n.diameter()).sum();
    let mean = total / graph.nodes.len() as f64;
    let base = if mean > 0.0 { mean } else { 1.0 };
    spacing_factor * base
}

fn build_rings(
    graph: &Graph,
    component: &[usize],
    depths: &[usize],
    depth_sort: Option<&DepthSort>,
) -> Vec<Vec<usize>> {
    let max_depth = component.iter().map(|&v| depths[v]).max().unwrap_or(0);
    let mut rings: Vec<Vec<usize>> = vec![Vec::new(); max_depth + 1];
    for &v in component {
        rings[depths[v]].push(v);
    }
    if let Some(sort) = depth_sort {
        for ring in &mut rings {
            ring.sort_by(|&a, &b| sort.compare(&graph.nodes[a], &graph.nodes[b]));
        }
    }
    rings
}

/// Places rings around the component center `(0, 0)`.
fn place_rings(
    graph: &Graph,
    rings: &[Vec<usize>],
    step: f64,
    avoid_overlap: bool,
) -> Vec<(usize, f64, f64)> {
    let mut out: Vec<(usize, f64, f64)> = Vec::new();
    let mut prev: Option<f64> = None;
    for ring in rings {
        if ring.is_empty() {
            continue;
        }
        let mut radius = match prev {
            None if ring.len() == 1 => 0.0,
            None => step,
            Some(p) => p + step,
        };
        if avoid_overlap && ring.len() > 1 {
            let needed: f64 = ring.iter().map(|&v| graph.nodes[v].diameter()).sum::<f64>() / TAU;
            radius = radius.max(needed);
        }

        let count = ring.len() as f64;
        for (slot, &v) in ring.iter().enumerate() {
            let theta = TAU * slot as f64 / count;
            out.push((v, radius * theta.cos(), radius * theta.sin()));
        }
        prev = Some(radius);
    }
    out
}

/// Scales node centers uniformly and centers them in `bb` shrunk by `padding`. Node sizes are
/// not scaled, so room for the largest node is reserved before the scale is chosen.
fn fit_into(graph: &Graph, xy: &mut [(f64, f64)], bb: BoundingBox, padding: f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut node_w: f64 = 0.0;
    let mut node_h: f64 = 0.0;
    for (n, &(x, y)) in graph.nodes.iter().zip(xy.iter()) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
        node_w = node_w.max(n.width);
        node_h = node_h.max(n.height);
    }
    let spread_w = max_x - min_x;
    let spread_h = max_y - min_y;
    let room_w = (bb.w - 2.0 * padding - node_w).max(0.0);
    let room_h = (bb.h - 2.0 * padding - node_h).max(0.0);

    let scale = match (spread_w > 0.0, spread_h > 0.0) {
        (true, true) => (room_w / spread_w).min(room_h / spread_h),
        (true, false) => room_w / spread_w,
        (false, true) => room_h / spread_h,
        (false, false) => 1.0,
    };

    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    let (bx, by) = bb.center();
    for p in xy.iter_mut() {
        *p = (bx + (p.0 - cx) * scale, by + (p.1 - cy) * scale);
    }
}
