//! Dependency graph algorithms over the IR.
//!
//! Edges point from a component to what it needs: a server to its
//! middleware, a use-case to its server. Cycle detection walks the
//! components' own `dependencies` lists; ordering and reachability go through
//! a `petgraph` view of the same edges.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use thiserror::Error;

use super::{Component, EdgeType, Ir};
use crate::core::{BoundError, format_cycle};

/// Returned by [`Ir::topological_sort`] when the graph has cycles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dependency cycle detected: {}", .cycles.first().map(|c| format_cycle(c)).unwrap_or_default())]
pub struct CycleError {
    pub cycles: Vec<Vec<String>>,
}

/// DFS visit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not visited yet.
    White,
    /// On the current DFS path.
    Gray,
    /// Finished, or retired after its root reported a cycle.
    Black,
}

impl Ir {
    /// Find cycles in the dependency graph.
    ///
    /// Roots are visited in ID order. The first back edge found from a root
    /// yields the cycle (the path suffix starting at the node the edge points
    /// back to) and ends the search from that root, so at most one cycle is
    /// reported per root and the result is not an exhaustive enumeration.
    /// Nodes on an aborted path are retired, so a later root never reports a
    /// cycle through a stale path.
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut colors: HashMap<&str, Color> =
            self.components.keys().map(|id| (id.as_str(), Color::White)).collect();
        let mut path: Vec<&str> = Vec::new();
        let mut cycles = Vec::new();

        for id in self.components.keys() {
            if colors.get(id.as_str()) == Some(&Color::White)
                && let Some(cycle) = self.dfs_visit(id, &mut colors, &mut path)
            {
                cycles.push(cycle);
                for node in path.drain(..) {
                    colors.insert(node, Color::Black);
                }
            }
        }

        cycles
    }

    fn dfs_visit<'a>(
        &'a self,
        id: &'a str,
        colors: &mut HashMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        colors.insert(id, Color::Gray);
        path.push(id);

        if let Some(component) = self.components.get(id) {
            for dep in &component.dependencies {
                match colors.get(dep.as_str()) {
                    Some(Color::Gray) => {
                        let start = path.iter().position(|n| *n == dep.as_str())?;
                        return Some(path[start..].iter().map(|s| (*s).to_string()).collect());
                    }
                    Some(Color::White) => {
                        if let Some(cycle) = self.dfs_visit(dep, colors, path) {
                            return Some(cycle);
                        }
                    }
                    _ => {}
                }
            }
        }

        path.pop();
        colors.insert(id, Color::Black);
        None
    }

    /// Components in dependency order: for every edge A → B, B comes first.
    ///
    /// # Errors
    ///
    /// [`CycleError`] with every detected cycle when the graph is cyclic.
    pub fn topological_sort(&self) -> Result<Vec<&Component>, CycleError> {
        let cycles = self.detect_cycles();
        if !cycles.is_empty() {
            return Err(CycleError {
                cycles,
            });
        }

        let view = GraphView::new(self);
        let mut order = Vec::with_capacity(self.components.len());
        let mut dfs = DfsPostOrder::empty(&view.graph);

        for id in self.components.keys() {
            let Some(&start) = view.node_map.get(id.as_str()) else {
                continue;
            };
            if dfs.discovered.contains(start.index()) {
                continue;
            }
            dfs.move_to(start);
            while let Some(index) = dfs.next(&view.graph) {
                if let Some(component) = self.components.get(view.graph[index]) {
                    order.push(component);
                }
            }
        }

        Ok(order)
    }

    /// Direct dependencies of a component, one entry per outgoing edge.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<&Component>, BoundError> {
        let component = self.require(id)?;
        Ok(component.dependencies.iter().filter_map(|dep| self.components.get(dep)).collect())
    }

    /// Components that depend on `id`, one entry per incoming edge.
    pub fn dependents_of(&self, id: &str) -> Result<Vec<&Component>, BoundError> {
        let component = self.require(id)?;
        Ok(component.dependents.iter().filter_map(|dep| self.components.get(dep)).collect())
    }

    /// Everything `id` depends on, directly or indirectly.
    pub fn transitive_dependencies(&self, id: &str) -> Result<BTreeSet<String>, BoundError> {
        self.require(id)?;
        let view = GraphView::new(self);
        let mut deps = BTreeSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = view.node_map.get(id) {
            queue.push_back(start);
        }

        while let Some(current) = queue.pop_front() {
            for neighbor in view.graph.neighbors(current) {
                if deps.insert(view.graph[neighbor].to_string()) {
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(deps)
    }

    /// Render the dependencies of `id` as a tree.
    ///
    /// ```text
    /// usecase.list (usecase)
    /// └── server.api (http.server) [binding]
    ///     └── mw.auth (middleware) [middleware]
    /// ```
    pub fn dependency_tree(&self, id: &str) -> Result<String, BoundError> {
        let root = self.require(id)?;
        let mut result = format!("{} ({})\n", root.id, root.kind());
        let mut on_path = HashSet::from([root.id.as_str()]);
        self.build_tree_string(root, &mut result, "", &mut on_path);
        Ok(result)
    }

    fn build_tree_string<'a>(
        &'a self,
        node: &'a Component,
        result: &mut String,
        prefix: &str,
        on_path: &mut HashSet<&'a str>,
    ) {
        let children: Vec<_> = self.edges_from(&node.id).collect();

        for (i, edge) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };
            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };

            let Some(child) = self.components.get(&edge.to) else {
                continue;
            };
            result.push_str(&format!(
                "{prefix}{connector}{} ({}) [{}]\n",
                child.id,
                child.kind(),
                edge.edge_type
            ));

            if !on_path.insert(child.id.as_str()) {
                result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
                continue;
            }
            self.build_tree_string(child, result, &child_prefix, on_path);
            on_path.remove(child.id.as_str());
        }
    }

    fn require(&self, id: &str) -> Result<&Component, BoundError> {
        self.components.get(id).ok_or_else(|| BoundError::ComponentNotFound {
            id: id.to_string(),
        })
    }
}

/// `petgraph` view of the IR's edges. Nodes are added in ID order.
struct GraphView<'a> {
    graph: DiGraph<&'a str, EdgeType>,
    node_map: HashMap<&'a str, NodeIndex>,
}

impl<'a> GraphView<'a> {
    fn new(ir: &'a Ir) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for id in ir.components.keys() {
            node_map.insert(id.as_str(), graph.add_node(id.as_str()));
        }

        for edge in &ir.edges {
            if let (Some(&from), Some(&to)) =
                (node_map.get(edge.from.as_str()), node_map.get(edge.to.as_str()))
                && !graph.contains_edge(from, to)
            {
                graph.add_edge(from, to, edge.edge_type);
            }
        }

        Self {
            graph,
            node_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ComponentSpec, MiddlewareSpec, SpecMetadata};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> Ir {
        let mut ir = Ir::new(SpecMetadata::default(), "");
        for id in ids {
            ir.components.insert(
                (*id).to_string(),
                Component::new(*id, ComponentSpec::Middleware(MiddlewareSpec::default())),
            );
        }
        for (from, to) in edges {
            ir.connect(from, to, EdgeType::Dependency);
        }
        ir
    }

    fn position(order: &[&Component], id: &str) -> usize {
        order.iter().position(|c| c.id == id).unwrap()
    }

    #[test]
    fn test_simple_chain_order() {
        // a -> b -> c
        let ir = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(ir.detect_cycles().is_empty());

        let order = ir.topological_sort().unwrap();
        assert_eq!(order.len(), 3);
        assert!(position(&order, "c") < position(&order, "b"));
        assert!(position(&order, "b") < position(&order, "a"));
    }

    #[test]
    fn test_order_respects_every_edge() {
        let edges = [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("e", "a"), ("f", "d")];
        let ir = graph(&["a", "b", "c", "d", "e", "f"], &edges);
        let order = ir.topological_sort().unwrap();
        assert_eq!(order.len(), 6);
        for (from, to) in edges {
            assert!(position(&order, to) < position(&order, from), "{to} should precede {from}");
        }
    }

    #[test]
    fn test_two_node_cycle() {
        let ir = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let cycles = ir.detect_cycles();
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);

        let err = ir.topological_sort().unwrap_err();
        assert_eq!(err.cycles.len(), 1);
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
    }

    #[test]
    fn test_self_dependency() {
        let ir = graph(&["a"], &[("a", "a")]);
        assert_eq!(ir.detect_cycles(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_one_cycle_per_root() {
        // Two cycles reachable from "a"; the search from "a" stops at the first.
        let ir = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("a", "c"), ("c", "a")]);
        let cycles = ir.detect_cycles();
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_independent_cycles_are_each_reported() {
        let ir = graph(&["a", "b", "x", "y"], &[("a", "b"), ("b", "a"), ("x", "y"), ("y", "x")]);
        let cycles = ir.detect_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1], vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_aborted_root_does_not_leak_stale_path() {
        // "a" reports a -> b -> a while "c" is still unexplored. "c" reaches
        // "a" later, but "a" is no longer on any path.
        let ir = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("c", "a")]);
        let cycles = ir.detect_cycles();
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let ir = graph(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(ir.detect_cycles().is_empty());
        let deps = ir.transitive_dependencies("a").unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let ir = graph(&["a", "b"], &[("a", "b")]);
        let deps: Vec<_> = ir.dependencies_of("a").unwrap().iter().map(|c| c.id.clone()).collect();
        assert_eq!(deps, vec!["b"]);
        let dependents: Vec<_> =
            ir.dependents_of("b").unwrap().iter().map(|c| c.id.clone()).collect();
        assert_eq!(dependents, vec!["a"]);

        let err = ir.dependencies_of("missing").unwrap_err();
        assert!(matches!(err, BoundError::ComponentNotFound { ref id } if id == "missing"));
        assert!(ir.dependents_of("missing").is_err());
    }

    #[test]
    fn test_dependency_tree_marks_circular_reference() {
        let ir = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let tree = ir.dependency_tree("a").unwrap();
        assert_eq!(
            tree,
            "a (middleware)\n└── b (middleware) [dependency]\n    └── a (middleware) [dependency]\n        └── (circular reference)\n"
        );
    }

    #[test]
    fn test_empty_graph() {
        let ir = graph(&[], &[]);
        assert!(ir.detect_cycles().is_empty());
        assert!(ir.topological_sort().unwrap().is_empty());
    }
}
