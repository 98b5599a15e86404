//! Read-only traversal of finished check trees.
//!
//! [`walk`] visits a node and then each of its children in order, calling
//! the [`Visitor`] method matching the node's layer. Reports are built on
//! top of it: [`dump`] for people, [`columnar`] for charting clients.

pub mod columnar;
pub mod dump;

pub use columnar::ColumnarReport;
pub use dump::format_dump;

use crate::node::{Case, Composite, Hook, Level, Node};

/// Callbacks for each kind of node. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait Visitor {
    /// The root composite.
    fn visit_robot(&mut self, robot: &Composite, depth: usize) {}
    /// A subsystem composite.
    fn visit_subsystem(&mut self, subsystem: &Composite, depth: usize) {}
    /// A device composite; its cases follow.
    fn visit_device(&mut self, device: &Composite, device_id: i32, depth: usize) {}
    /// A case leaf.
    fn visit_case(&mut self, case: &Case, depth: usize) {}
    /// A lifecycle hook leaf.
    fn visit_hook(&mut self, hook: &Hook, depth: usize) {}
}

/// Visits `node` and everything below it, parents first.
pub fn walk(node: &Node, visitor: &mut dyn Visitor) {
    walk_at(node, visitor, 0);
}

fn walk_at(node: &Node, visitor: &mut dyn Visitor, depth: usize) {
    match node {
        Node::Composite(composite) => {
            match composite.level() {
                Level::Robot => visitor.visit_robot(composite, depth),
                Level::Subsystem => visitor.visit_subsystem(composite, depth),
                Level::Device { device_id, .. } => {
                    visitor.visit_device(composite, *device_id, depth);
                }
            }
            for child in composite.children() {
                walk_at(child, visitor, depth + 1);
            }
        }
        Node::Case(case) => visitor.visit_case(case, depth),
        Node::Hook(hook) => visitor.visit_hook(hook, depth),
    }
}

impl Node {
    /// Runs `visitor` over this subtree.
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        walk(self, visitor);
    }
}
