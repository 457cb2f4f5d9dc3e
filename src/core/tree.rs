//! Logical location tree
//!
//! The store only knows flat path strings. [`LocationTree`] rebuilds the
//! hierarchy from those strings once per query: an arena of nodes keyed by
//! path, with every implied ancestor materialized as a node.

use std::collections::{BTreeMap, HashMap};

use crate::core::path::PathCodec;

/// One location in the tree
#[derive(Debug, Clone)]
pub struct LocationNode {
    pub path: String,
    pub name: String,
    pub depth: usize,
    /// Children ordered by name
    children: BTreeMap<String, usize>,
}

/// Arena of location nodes with a path index
#[derive(Debug, Clone)]
pub struct LocationTree {
    codec: PathCodec,
    nodes: Vec<LocationNode>,
    index: HashMap<String, usize>,
    roots: BTreeMap<String, usize>,
}

impl LocationTree {
    pub fn new(codec: PathCodec) -> Self {
        Self {
            codec,
            nodes: Vec::new(),
            index: HashMap::new(),
            roots: BTreeMap::new(),
        }
    }

    /// Build a tree containing every given path and all of their ancestors
    pub fn from_paths<I, S>(codec: PathCodec, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new(codec);
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Insert a path, creating missing ancestors. Returns the node index.
    pub fn insert(&mut self, path: &str) -> usize {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }

        let parent = self.codec.parent_of(path).map(|p| self.insert(p));
        let name = self.codec.name(path).to_string();
        let depth = parent.map_or(1, |p| self.nodes[p].depth + 1);

        let idx = self.nodes.len();
        self.nodes.push(LocationNode {
            path: path.to_string(),
            name: name.clone(),
            depth,
            children: BTreeMap::new(),
        });
        self.index.insert(path.to_string(), idx);

        match parent {
            Some(p) => {
                self.nodes[p].children.insert(name, idx);
            }
            None => {
                self.roots.insert(name, idx);
            }
        }
        idx
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&LocationNode> {
        self.index.get(path).map(|&idx| &self.nodes[idx])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names of the direct children of `parent`, or of the roots
    pub fn child_names(&self, parent: Option<&str>) -> Vec<&str> {
        let children = match parent {
            Some(path) => match self.get(path) {
                Some(node) => &node.children,
                None => return Vec::new(),
            },
            None => &self.roots,
        };
        children.keys().map(String::as_str).collect()
    }

    /// All nodes in depth-first order, children sorted by name
    pub fn walk(&self) -> Vec<&LocationNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.values().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            out.push(node);
            stack.extend(node.children.values().rev().copied());
        }
        out
    }

    /// Every path in the tree, depth-first
    pub fn paths(&self) -> Vec<String> {
        self.walk().into_iter().map(|n| n.path.clone()).collect()
    }

    /// Render the tree with box-drawing branches, one node per line
    pub fn render(&self, label: impl Fn(&LocationNode) -> Option<String>) -> String {
        let mut out = String::new();
        let roots: Vec<usize> = self.roots.values().copied().collect();
        for (i, &idx) in roots.iter().enumerate() {
            self.render_node(&mut out, idx, "", i + 1 == roots.len(), true, &label);
        }
        out
    }

    fn render_node(
        &self,
        out: &mut String,
        idx: usize,
        prefix: &str,
        last: bool,
        root: bool,
        label: &impl Fn(&LocationNode) -> Option<String>,
    ) {
        let node = &self.nodes[idx];
        let branch = if root {
            ""
        } else if last {
            "└── "
        } else {
            "├── "
        };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&node.name);
        if let Some(extra) = label(node) {
            out.push_str(&format!(" ({})", extra));
        }
        out.push('\n');

        let child_prefix = if root {
            String::new()
        } else if last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };
        let children: Vec<usize> = node.children.values().copied().collect();
        for (i, &child) in children.iter().enumerate() {
            self.render_node(out, child, &child_prefix, i + 1 == children.len(), false, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> LocationTree {
        LocationTree::from_paths(
            PathCodec::default(),
            ["Lab/Bench3/Drawer1", "Lab/Bench1", "Office", "Lab/Bench3"],
        )
    }

    #[test]
    fn test_implied_ancestors_are_nodes() {
        let t = tree();
        assert!(t.contains("Lab"));
        assert!(t.contains("Lab/Bench3"));
        assert_eq!(t.len(), 5);
        assert_eq!(t.get("Lab/Bench3/Drawer1").unwrap().depth, 3);
    }

    #[test]
    fn test_child_names_sorted() {
        let t = tree();
        assert_eq!(t.child_names(None), vec!["Lab", "Office"]);
        assert_eq!(t.child_names(Some("Lab")), vec!["Bench1", "Bench3"]);
        assert!(t.child_names(Some("Nowhere")).is_empty());
    }

    #[test]
    fn test_walk_is_depth_first() {
        assert_eq!(
            tree().paths(),
            vec![
                "Lab",
                "Lab/Bench1",
                "Lab/Bench3",
                "Lab/Bench3/Drawer1",
                "Office"
            ]
        );
    }

    #[test]
    fn test_render_tree() {
        let rendered = tree().render(|node| {
            (node.path == "Lab/Bench3/Drawer1").then(|| "4".to_string())
        });
        insta::assert_snapshot!(rendered.trim_end(), @r"
        Lab
        ├── Bench1
        └── Bench3
            └── Drawer1 (4)
        Office
        ");
    }
}
