// Shared editor host for the history integration tests.
#![allow(dead_code)]

use retrace_mod_history::{Affordance, EditorHost, NodeTree, RootKey, TreePosition};

/// `(line, offset)`-style nodes: root, paragraph per line, text per paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Root,
    Para(usize),
    Text(usize),
}

pub struct Lines(Vec<usize>);

impl Lines {
    fn parse(content: &str) -> Self {
        Lines(content.split('\n').map(|l| l.chars().count()).collect())
    }
}

impl NodeTree for Lines {
    type Node = Node;

    fn root(&self) -> Node {
        Node::Root
    }

    fn parent(&self, node: Node) -> Option<Node> {
        match node {
            Node::Root => None,
            Node::Para(_) => Some(Node::Root),
            Node::Text(i) => Some(Node::Para(i)),
        }
    }

    fn child(&self, node: Node, ordinal: usize) -> Option<Node> {
        match node {
            Node::Root if ordinal < self.0.len() => Some(Node::Para(ordinal)),
            Node::Para(i) if ordinal == 0 => Some(Node::Text(i)),
            _ => None,
        }
    }

    fn index_in_parent(&self, node: Node) -> Option<usize> {
        match node {
            Node::Root => None,
            Node::Para(i) => Some(i),
            Node::Text(_) => Some(0),
        }
    }

    fn offset_limit(&self, node: Node) -> usize {
        match node {
            Node::Root => self.0.len(),
            Node::Para(_) => 1,
            Node::Text(i) => self.0.get(i).copied().unwrap_or(0),
        }
    }
}

pub type Selection = (RootKey, TreePosition<Node>, TreePosition<Node>);

#[derive(Default)]
pub struct Host {
    regions: Vec<(RootKey, String, Lines)>,
    pub activations: Vec<RootKey>,
    pub selection: Option<Selection>,
    pub changes: usize,
    pub affordance: Affordance,
}

impl Default for Lines {
    fn default() -> Self {
        Lines(vec![0])
    }
}

impl Host {
    pub fn new(roots: &[(&str, &str)]) -> Self {
        Self {
            regions: roots
                .iter()
                .map(|(k, c)| (RootKey::from(*k), c.to_string(), Lines::parse(c)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn write(&mut self, root: &str, content: &str) {
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.0.as_str() == root)
            .expect("known root");
        region.1 = content.to_string();
        region.2 = Lines::parse(content);
    }

    pub fn read(&self, root: &str) -> String {
        self.regions
            .iter()
            .find(|r| r.0.as_str() == root)
            .map(|r| r.1.clone())
            .expect("known root")
    }

    pub fn last_active(&self) -> Option<&str> {
        self.activations.last().map(RootKey::as_str)
    }
}

impl EditorHost for Host {
    type Tree = Lines;

    fn root_keys(&self) -> Vec<RootKey> {
        self.regions.iter().map(|r| r.0.clone()).collect()
    }

    fn content(&self, root: &RootKey) -> Option<String> {
        self.regions.iter().find(|r| &r.0 == root).map(|r| r.1.clone())
    }

    fn set_content(&mut self, root: &RootKey, content: &str) {
        self.write(root.as_str(), content);
    }

    fn tree(&self, root: &RootKey) -> Option<&Lines> {
        self.regions.iter().find(|r| &r.0 == root).map(|r| &r.2)
    }

    fn set_selection(&mut self, root: &RootKey, start: TreePosition<Node>, end: TreePosition<Node>) {
        self.selection = Some((root.clone(), start, end));
    }

    fn activate(&mut self, root: &RootKey) {
        self.activations.push(root.clone());
    }

    fn on_change(&mut self) {
        self.changes += 1;
    }

    fn on_affordance(&mut self, affordance: Affordance) {
        self.affordance = affordance;
    }
}
