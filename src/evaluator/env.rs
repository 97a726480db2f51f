use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::value::Value;

type Scope = HashMap<String, Value>;

// one immutable link in a scope chain; nodes are only ever appended
#[derive(Debug, PartialEq)]
struct Node {
    bindings: Scope,
    parent: Option<usize>,
}

/// Environment is a handle onto a persistent scope chain. The nodes live in a
/// shared arena addressed by index; binding allocates a fresh node, so every
/// existing handle keeps seeing exactly the bindings it saw before.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    nodes: Rc<RefCell<Vec<Node>>>,
    index: usize,
}

impl Environment {
    /// new constructs a root environment with no bindings and no parent.
    pub fn new() -> Self {
        let nodes = vec![Node {
            bindings: Scope::new(),
            parent: None,
        }];
        Self {
            nodes: Rc::new(RefCell::new(nodes)),
            index: 0,
        }
    }

    /// child opens an empty scope chained to this one, for bindings that must
    /// not outlive the form introducing them.
    pub fn child(&self) -> Self {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            bindings: Scope::new(),
            parent: Some(self.index),
        });
        Self {
            nodes: Rc::clone(&self.nodes),
            index: nodes.len() - 1,
        }
    }

    /// set returns a new Environment sharing this one's parent and bindings,
    /// with `name` now mapping to `value`. The receiver is left untouched.
    pub fn set(&self, name: &str, value: Value) -> Self {
        let mut nodes = self.nodes.borrow_mut();
        let mut bindings = nodes[self.index].bindings.clone();
        bindings.insert(name.into(), value);
        let parent = nodes[self.index].parent;
        nodes.push(Node { bindings, parent });
        Self {
            nodes: Rc::clone(&self.nodes),
            index: nodes.len() - 1,
        }
    }

    /// get resolves `name` against this scope, delegating to the parent chain
    /// when it is not bound locally.
    pub fn get(&self, name: &str) -> Option<Value> {
        let nodes = self.nodes.borrow();
        let mut current = Some(self.index);
        while let Some(index) = current {
            let node = &nodes[index];
            if let Some(value) = node.bindings.get(name) {
                return Some(value.clone());
            }
            current = node.parent;
        }
        None
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let nodes = self.nodes.borrow();
        let node = &nodes[self.index];
        write!(f, "Environment (some-parent? {:?}) {{", node.parent.is_some())?;
        write!(
            f,
            "{}",
            node.bindings
                .iter()
                .map(|(k, v)| format!("{:?} {}", k, v))
                .format(" ")
        )?;
        write!(f, "}}")
    }
}
