//! Indented, human-readable rendering of a check tree.

use super::{walk, Visitor};
use crate::node::{Averages, Case, Composite, Hook, Node};

#[derive(Default)]
struct DumpVisitor {
    lines: Vec<String>,
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn format_averages(avg: &Averages) -> String {
    format!(
        "voltage {:.2} V, speed {:.1}, supply {:.2} A, stator {:.2} A",
        avg.voltage, avg.speed, avg.supply_current, avg.stator_current
    )
}

impl Visitor for DumpVisitor {
    fn visit_robot(&mut self, robot: &Composite, depth: usize) {
        self.lines.push(format!("{}{}", indent(depth), robot.name()));
    }

    fn visit_subsystem(&mut self, subsystem: &Composite, depth: usize) {
        let suffix = if subsystem.children().is_empty() { " (no checks)" } else { "" };
        self.lines.push(format!("{}{}{suffix}", indent(depth), subsystem.name()));
    }

    fn visit_device(&mut self, device: &Composite, device_id: i32, depth: usize) {
        self.lines.push(format!("{}{} [device {device_id}]", indent(depth), device.name()));
    }

    fn visit_case(&mut self, case: &Case, depth: usize) {
        let pad = indent(depth);
        let verdict = if case.limits().is_unchecked() && !case.timed_out() {
            String::new()
        } else {
            match case.violations().as_slice() {
                [] => "  PASS".to_string(),
                reasons => format!("  FAIL: {}", reasons.join("; ")),
            }
        };
        self.lines.push(format!(
            "{pad}{} {}: {}{verdict}",
            case.name(),
            case.exit().kind(),
            format_averages(&case.averages())
        ));
        for follower in case.followers() {
            self.lines.push(format!(
                "{pad}  follower {} [device {}]: {}",
                follower.field(),
                follower.device_id(),
                format_averages(&follower.averages())
            ));
        }
    }

    fn visit_hook(&mut self, hook: &Hook, depth: usize) {
        self.lines.push(format!(
            "{}{} hook {} (polled {})",
            indent(depth),
            hook.phase(),
            hook.name(),
            hook.polls()
        ));
    }
}

/// Renders `root` one line per node, with case averages beneath each device.
#[must_use]
pub fn format_dump(root: &Node) -> String {
    let mut visitor = DumpVisitor::default();
    walk(root, &mut visitor);
    visitor.lines.join("\n")
}
