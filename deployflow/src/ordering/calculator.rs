//! Deployment order calculator.
//!
//! Levels are assigned by repeated relaxation: a pipeline gets a level once
//! all its dependencies have one, `1 + max(dependency levels)`, or 0 with no
//! dependencies. A pass that assigns nothing while pipelines remain means
//! the remainder cannot be ordered because of a cycle.

use super::{DeploymentOrder, DeploymentOrderEntry, UnresolvedReference};
use crate::config::TieBreak;
use crate::core::PipelineReference;
use crate::errors::CycleDetectedError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

type Graph<'a> = HashMap<&'a str, BTreeSet<&'a str>>;

/// Computes deployment orders from reference sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentOrderCalculator {
    tie_break: TieBreak,
}

impl DeploymentOrderCalculator {
    /// Creates a calculator that breaks level ties by pipeline name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how pipelines of equal level are ordered.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Returns the tie-break rule.
    #[must_use]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Orders `pipelines` so each comes after everything it invokes.
    ///
    /// Repeated edges between the same pair count once. Targets outside
    /// `pipelines` count as level 0 for their callers and are listed in
    /// [`DeploymentOrder::unresolved`]. References whose parent is not in
    /// `pipelines` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CycleDetectedError`] if pipelines invoke each other in a
    /// loop, a pipeline invoking itself included.
    pub fn calculate<S: AsRef<str>>(
        &self,
        pipelines: &[S],
        references: &[PipelineReference],
    ) -> Result<DeploymentOrder, CycleDetectedError> {
        let mut known: Vec<&str> = Vec::with_capacity(pipelines.len());
        let mut position: HashMap<&str, usize> = HashMap::with_capacity(pipelines.len());
        for name in pipelines {
            let name = name.as_ref();
            if !position.contains_key(name) {
                position.insert(name, known.len());
                known.push(name);
            }
        }

        let mut deps: Graph<'_> = known.iter().map(|&n| (n, BTreeSet::new())).collect();
        let mut dangling: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for reference in references {
            let parent = reference.parent_pipeline_name.as_str();
            let target = reference.target_pipeline_name.as_str();
            let Some(targets) = deps.get_mut(parent) else {
                warn!(parent, target, "Ignoring reference from a pipeline outside the batch");
                continue;
            };
            targets.insert(target);
            if !position.contains_key(target) {
                dangling.entry(target).or_default().insert(parent);
            }
        }

        let mut levels: HashMap<&str, usize> = dangling.keys().map(|&t| (t, 0)).collect();
        let mut pending = known.clone();
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|&name| {
                let targets = &deps[name];
                if !targets.iter().all(|t| levels.contains_key(t)) {
                    return true;
                }
                let level = targets.iter().map(|t| levels[t] + 1).max().unwrap_or(0);
                debug!(pipeline = name, level, "Assigned deployment level");
                levels.insert(name, level);
                false
            });

            if pending.len() == before {
                let err = cycle_error(&pending, &deps);
                warn!(
                    pipelines = ?err.pipelines,
                    blocked = ?err.blocked,
                    "Dependency cycle prevents deployment ordering"
                );
                return Err(err);
            }
        }

        let mut entries: Vec<DeploymentOrderEntry> = known
            .iter()
            .map(|&name| {
                let targets = &deps[name];
                DeploymentOrderEntry {
                    pipeline_name: name.to_string(),
                    level: levels[name],
                    depends_on_pipelines: targets.iter().map(|t| (*t).to_string()).collect(),
                    unresolved_dependencies: targets
                        .iter()
                        .filter(|t| dangling.contains_key(*t))
                        .map(|t| (*t).to_string())
                        .collect(),
                }
            })
            .collect();

        match self.tie_break {
            TieBreak::Name => entries.sort_by(|a, b| {
                a.level
                    .cmp(&b.level)
                    .then_with(|| a.pipeline_name.cmp(&b.pipeline_name))
            }),
            TieBreak::Discovery => entries.sort_by(|a, b| {
                a.level.cmp(&b.level).then_with(|| {
                    position[a.pipeline_name.as_str()].cmp(&position[b.pipeline_name.as_str()])
                })
            }),
        }

        let unresolved: Vec<UnresolvedReference> = dangling
            .into_iter()
            .map(|(target, parents)| UnresolvedReference {
                target_pipeline_name: target.to_string(),
                referenced_by: parents.into_iter().map(str::to_string).collect(),
            })
            .collect();

        info!(
            pipelines = entries.len(),
            max_level = entries.last().map_or(0, |e| e.level),
            unresolved = unresolved.len(),
            "Calculated deployment order"
        );

        Ok(DeploymentOrder::new(entries, unresolved))
    }
}

/// Splits a stalled set into pipelines on a cycle and pipelines merely
/// waiting on one, and picks one concrete loop to report.
fn cycle_error(stalled: &[&str], deps: &Graph<'_>) -> CycleDetectedError {
    let within: HashSet<&str> = stalled.iter().copied().collect();

    let mut on_cycle = Vec::new();
    let mut blocked = Vec::new();
    for &name in stalled {
        if shortest_cycle(name, deps, &within).is_some() {
            on_cycle.push(name.to_string());
        } else {
            blocked.push(name.to_string());
        }
    }
    on_cycle.sort();
    blocked.sort();

    let cycle_path = on_cycle
        .first()
        .and_then(|start| shortest_cycle(start, deps, &within))
        .unwrap_or_default();

    CycleDetectedError::new(on_cycle, blocked, cycle_path)
}

/// Breadth-first search for the shortest loop from `start` back to itself,
/// staying inside `within`. Returns `start -> ... -> start`.
fn shortest_cycle(start: &str, deps: &Graph<'_>, within: &HashSet<&str>) -> Option<Vec<String>> {
    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<&str> = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for &dep in deps.get(node).into_iter().flatten() {
            if !within.contains(dep) {
                continue;
            }
            if dep == start {
                let mut path = vec![node];
                let mut current = node;
                while current != start {
                    current = parent[current];
                    path.push(current);
                }
                path.reverse();
                let mut path: Vec<String> = path.into_iter().map(str::to_string).collect();
                path.push(start.to_string());
                return Some(path);
            }
            if seen.insert(dep) {
                parent.insert(dep, node);
                queue.push_back(dep);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn edge(parent: &str, target: &str) -> PipelineReference {
        PipelineReference::new(parent, target, format!("Run{target}"))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        let order = DeploymentOrderCalculator::new()
            .calculate::<String>(&[], &[])
            .unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_single_pipeline() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["Solo"], &[])
            .unwrap();
        assert_eq!(order.pipeline_names(), vec!["Solo"]);
        assert_eq!(order.level_of("Solo"), Some(0));
    }

    #[test]
    fn test_parent_after_child() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["ParentPipeline", "ChildPipeline"], &[edge("ParentPipeline", "ChildPipeline")])
            .unwrap();

        assert_eq!(order.pipeline_names(), vec!["ChildPipeline", "ParentPipeline"]);
        let parent = order.get("ParentPipeline").unwrap();
        assert_eq!(parent.level, 1);
        assert_eq!(parent.depends_on_pipelines, BTreeSet::from(["ChildPipeline".to_string()]));
    }

    #[test]
    fn test_level_is_longest_chain() {
        // A -> B -> C and A -> C: A must sit above B, not beside it.
        let order = DeploymentOrderCalculator::new()
            .calculate(&["A", "B", "C"], &[edge("A", "B"), edge("B", "C"), edge("A", "C")])
            .unwrap();

        assert_eq!(order.level_of("C"), Some(0));
        assert_eq!(order.level_of("B"), Some(1));
        assert_eq!(order.level_of("A"), Some(2));
    }

    #[test]
    fn test_multi_edges_count_once() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["P", "C"], &[edge("P", "C"), edge("P", "C"), edge("P", "C")])
            .unwrap();

        assert_eq!(order.get("P").unwrap().depends_on_pipelines.len(), 1);
        assert_eq!(order.level_of("P"), Some(1));
    }

    #[test]
    fn test_tie_break_by_name() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["zeta", "alpha", "mid"], &[])
            .unwrap();
        assert_eq!(order.pipeline_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_tie_break_by_discovery() {
        let order = DeploymentOrderCalculator::new()
            .with_tie_break(TieBreak::Discovery)
            .calculate(&["zeta", "alpha", "top"], &[edge("top", "zeta")])
            .unwrap();
        assert_eq!(order.pipeline_names(), vec!["zeta", "alpha", "top"]);
    }

    #[test]
    fn test_direct_cycle() {
        let err = DeploymentOrderCalculator::new()
            .calculate(&["A", "B"], &[edge("A", "B"), edge("B", "A")])
            .unwrap_err();

        assert_eq!(err.pipelines, names(&["A", "B"]));
        assert!(err.blocked.is_empty());
        assert_eq!(err.cycle_path, names(&["A", "B", "A"]));
    }

    #[test]
    fn test_cycle_through_intermediate_with_dependent() {
        let err = DeploymentOrderCalculator::new()
            .calculate(
                &["A", "B", "C", "Top", "Free"],
                &[edge("A", "B"), edge("B", "C"), edge("C", "A"), edge("Top", "A")],
            )
            .unwrap_err();

        assert_eq!(err.pipelines, names(&["A", "B", "C"]));
        assert_eq!(err.blocked, names(&["Top"]));
        assert_eq!(err.cycle_path, names(&["A", "B", "C", "A"]));
        assert!(!err.involves("Free"));
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let err = DeploymentOrderCalculator::new()
            .calculate(&["Loop"], &[edge("Loop", "Loop")])
            .unwrap_err();

        assert_eq!(err.pipelines, names(&["Loop"]));
        assert_eq!(err.cycle_path, names(&["Loop", "Loop"]));
    }

    #[test]
    fn test_dangling_reference() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["Parent", "Other"], &[edge("Parent", "External")])
            .unwrap();

        assert_eq!(order.level_of("Parent"), Some(1));
        assert_eq!(order.level_of("External"), None);
        assert_eq!(order.pipeline_names(), vec!["Other", "Parent"]);
        assert_eq!(
            order.unresolved(),
            [UnresolvedReference {
                target_pipeline_name: "External".to_string(),
                referenced_by: names(&["Parent"]),
            }]
        );
        let parent = order.get("Parent").unwrap();
        assert!(parent.has_unresolved_dependencies());
        assert!(parent.unresolved_dependencies.contains("External"));
    }

    #[test]
    fn test_reference_from_unknown_parent_ignored() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["Child"], &[edge("Stranger", "Child")])
            .unwrap();
        assert_eq!(order.pipeline_names(), vec!["Child"]);
        assert!(order.is_fully_resolved());
    }

    #[test]
    fn test_duplicate_names_in_input() {
        let order = DeploymentOrderCalculator::new()
            .calculate(&["A", "A", "B"], &[edge("B", "A")])
            .unwrap();
        assert_eq!(order.pipeline_names(), vec!["A", "B"]);
    }

    /// Kahn's algorithm, used as a reference: returns the nodes left with a
    /// non-zero in-degree, i.e. those on or behind a cycle.
    fn kahn_leftover(nodes: &[String], edges: &[PipelineReference]) -> BTreeSet<String> {
        let mut out_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut distinct = HashSet::new();
        for e in edges {
            if distinct.insert((e.parent_pipeline_name.as_str(), e.target_pipeline_name.as_str())) {
                *out_degree.get_mut(e.parent_pipeline_name.as_str()).unwrap() += 1;
                dependents
                    .entry(e.target_pipeline_name.as_str())
                    .or_default()
                    .push(e.parent_pipeline_name.as_str());
            }
        }
        let mut queue: VecDeque<&str> = out_degree.iter().filter(|&(_, &d)| d == 0).map(|(&n, _)| n).collect();
        while let Some(n) = queue.pop_front() {
            for &p in dependents.get(n).into_iter().flatten() {
                let d = out_degree.get_mut(p).unwrap();
                *d -= 1;
                if *d == 0 {
                    queue.push_back(p);
                }
            }
        }
        out_degree
            .into_iter()
            .filter(|(_, d)| *d > 0)
            .map(|(n, _)| n.to_string())
            .collect()
    }

    #[test]
    fn test_agrees_with_kahn_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let n = rng.gen_range(1..8);
            let nodes: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let edge_count = rng.gen_range(0..n * 2);
            let edges: Vec<PipelineReference> = (0..edge_count)
                .map(|_| {
                    let a = &nodes[rng.gen_range(0..n)];
                    let b = &nodes[rng.gen_range(0..n)];
                    edge(a, b)
                })
                .collect();

            let leftover = kahn_leftover(&nodes, &edges);
            match DeploymentOrderCalculator::new().calculate(&nodes, &edges) {
                Ok(order) => {
                    assert!(leftover.is_empty());
                    for e in &edges {
                        assert!(
                            order.level_of(&e.parent_pipeline_name) > order.level_of(&e.target_pipeline_name)
                        );
                    }
                }
                Err(err) => {
                    let stalled: BTreeSet<String> =
                        err.pipelines.iter().chain(&err.blocked).cloned().collect();
                    assert_eq!(stalled, leftover);
                    assert!(!err.pipelines.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut nodes = names(&["a", "b", "c", "d", "e", "f"]);
        let mut edges = vec![edge("a", "b"), edge("a", "c"), edge("c", "d"), edge("e", "d"), edge("f", "a")];
        let expected = DeploymentOrderCalculator::new().calculate(&nodes, &edges).unwrap();

        for _ in 0..20 {
            nodes.shuffle(&mut rng);
            edges.shuffle(&mut rng);
            let order = DeploymentOrderCalculator::new().calculate(&nodes, &edges).unwrap();
            assert_eq!(order, expected);
            assert_eq!(order.fingerprint(), expected.fingerprint());
        }
    }
}
