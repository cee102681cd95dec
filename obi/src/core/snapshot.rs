use std::collections::HashMap;

use crate::core::classify::{is_eligible_root, root_of};
use crate::platform::{WindowHandle, WindowSystem};

/// One eligible root window plus every enumerated handle whose owner chain
/// terminates at it, the root itself included. Member order and entry order
/// both follow the OS enumeration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub root: WindowHandle,
    pub members: Vec<WindowHandle>,
}

/// Enumerates all windows once and groups them by root. Roots failing
/// eligibility are dropped together with their entire owned group, so no
/// entry is ever produced for a non-root window on its own.
pub fn build_snapshot<W: WindowSystem>(ws: &W) -> Vec<SnapshotEntry> {
    let shell = ws.shell_window();

    let mut entries: Vec<SnapshotEntry> = Vec::new();
    let mut by_root: HashMap<WindowHandle, usize> = HashMap::new();
    // Eligibility is evaluated once per root per pass; across ticks it is
    // always re-evaluated from fresh attributes.
    let mut eligibility: HashMap<WindowHandle, bool> = HashMap::new();

    for handle in ws.enumerate_windows() {
        let root = root_of(ws, handle);
        let eligible = *eligibility
            .entry(root)
            .or_insert_with(|| is_eligible_root(ws, root, shell));
        if !eligible {
            continue;
        }

        match by_root.get(&root) {
            Some(&idx) => entries[idx].members.push(handle),
            None => {
                by_root.insert(root, entries.len());
                entries.push(SnapshotEntry {
                    root,
                    members: vec![handle],
                });
            }
        }
    }

    entries
}
