use std::collections::HashMap;

use crate::core::snapshot::{build_snapshot, SnapshotEntry};
use crate::core::{Config, TrackedWindow};
use crate::notify::Notifier;
use crate::platform::{WindowHandle, WindowManipulator, WindowSystem};

/// The tracked application set, reconciled once per polling tick.
///
/// Owns every `TrackedWindow` exclusively; presentation layers observe
/// changes through the `Notifier` passed into `tick` and never mutate
/// entity identity or child sets themselves.
pub struct State {
    pub entities: Vec<TrackedWindow>,
    pub config: Config,
    /// The taskbar's own top-level window, once the presentation host has
    /// one. While it holds focus, entity active flags are suppressed so
    /// buttons do not flicker during taskbar interaction.
    pub own_window: Option<WindowHandle>,
}

impl State {
    pub fn new(config: Config) -> Self {
        Self {
            entities: Vec::new(),
            config,
            own_window: None,
        }
    }

    pub fn set_own_window(&mut self, handle: Option<WindowHandle>) {
        self.own_window = handle;
    }

    pub fn find(&self, root: WindowHandle) -> Option<&TrackedWindow> {
        self.entities.iter().find(|e| e.root == root)
    }

    /// One polling tick: read the foreground once, take a fresh snapshot,
    /// reconcile. Per-entity failures degrade to omissions and never abort
    /// the tick for the other entities.
    pub fn tick<W: WindowSystem, M: WindowManipulator, N: Notifier>(
        &mut self,
        ws: &W,
        wm: &M,
        notifier: &mut N,
    ) {
        let foreground = ws.foreground_window();
        let snapshot = build_snapshot(ws);
        tracing::trace!(
            "Tick: {} roots in snapshot, {} tracked",
            snapshot.len(),
            self.entities.len()
        );
        self.reconcile(ws, wm, notifier, &snapshot, foreground);
    }

    fn reconcile<W: WindowSystem, M: WindowManipulator, N: Notifier>(
        &mut self,
        ws: &W,
        wm: &M,
        notifier: &mut N,
        snapshot: &[SnapshotEntry],
        foreground: Option<WindowHandle>,
    ) {
        let taskbar_focused = self.own_window.is_some() && foreground == self.own_window;

        let by_root: HashMap<WindowHandle, usize> = snapshot
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.root, idx))
            .collect();
        let mut consumed = vec![false; snapshot.len()];

        // Matched entities refresh in place and are never replaced or
        // reordered; entities whose root vanished drop out.
        let config = &self.config;
        self.entities.retain_mut(|entity| match by_root.get(&entity.root) {
            Some(&idx) => {
                consumed[idx] = true;
                entity.refresh(
                    ws,
                    wm,
                    notifier,
                    foreground,
                    snapshot[idx].members.clone(),
                    taskbar_focused,
                    config,
                );
                true
            }
            None => {
                notifier.entity_removed(entity);
                false
            }
        });

        // Whatever the tracked set did not consume is a new root; appended
        // in snapshot order, which seeds the presentation order.
        for (idx, entry) in snapshot.iter().enumerate() {
            if consumed[idx] {
                continue;
            }
            let Some(entity) = TrackedWindow::new(
                ws,
                entry.root,
                entry.members.clone(),
                foreground,
                taskbar_focused,
            ) else {
                // Destroyed between enumeration and construction.
                continue;
            };
            if self.config.is_excluded(&entity.title) {
                tracing::debug!(
                    "Window excluded by pattern: [{}] {}",
                    entity.root,
                    entity.title
                );
                continue;
            }
            notifier.entity_added(&entity);
            self.entities.push(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IconState;
    use crate::notify::mock::{Notification, RecordingNotifier};
    use crate::platform::mock::{create_test_window, MockPlatform};
    use pretty_assertions::assert_eq;

    fn setup_platform() -> MockPlatform {
        MockPlatform::new()
            .with_windows(vec![
                create_test_window(100, 1000, "Editor"),
                create_test_window(101, 1000, "Find").owned_by(100),
                create_test_window(200, 2000, "Browser"),
            ])
            .with_foreground(Some(100))
    }

    fn run_tick(state: &mut State, platform: &MockPlatform, notifier: &mut RecordingNotifier) {
        state.tick(platform, platform, notifier);
    }

    #[test]
    fn test_first_tick_tracks_all_eligible_roots() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);

        let roots: Vec<_> = state.entities.iter().map(|e| e.root).collect();
        assert_eq!(roots, vec![100, 200]);
        assert_eq!(
            notifier.events,
            vec![Notification::Added(100), Notification::Added(200)]
        );
        assert!(state.find(100).unwrap().active);
        assert!(!state.find(200).unwrap().active);
    }

    #[test]
    fn test_unchanged_snapshot_is_idempotent() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);
        let titles: Vec<_> = state.entities.iter().map(|e| e.title.clone()).collect();
        notifier.clear();

        run_tick(&mut state, &platform, &mut notifier);

        assert!(notifier.events.is_empty());
        let titles_after: Vec<_> = state.entities.iter().map(|e| e.title.clone()).collect();
        assert_eq!(titles, titles_after);
    }

    #[test]
    fn test_vanished_root_removes_entity() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);
        notifier.clear();

        platform.remove_window(200);
        run_tick(&mut state, &platform, &mut notifier);

        assert_eq!(notifier.events, vec![Notification::Removed(200)]);
        assert!(state.find(200).is_none());
        assert!(state.find(100).is_some());
    }

    #[test]
    fn test_new_root_appends_after_existing_entities() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);
        notifier.clear();

        platform.add_window(create_test_window(300, 3000, "Terminal"));
        run_tick(&mut state, &platform, &mut notifier);

        let roots: Vec<_> = state.entities.iter().map(|e| e.root).collect();
        assert_eq!(roots, vec![100, 200, 300]);
        assert_eq!(notifier.events, vec![Notification::Added(300)]);
    }

    #[test]
    fn test_matched_entity_is_updated_in_place_not_recreated() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);

        // Plant a marker only a surviving object can carry across ticks.
        let marker = crate::core::Rect::new(1, 2, 3, 4);
        state.entities[0].saved_rect = Some(marker);

        platform.set_title(100, "Editor - modified");
        run_tick(&mut state, &platform, &mut notifier);

        let entity = state.find(100).unwrap();
        assert_eq!(entity.saved_rect, Some(marker));
        assert_eq!(entity.title, "Editor - modified");
    }

    #[test]
    fn test_icon_is_captured_once_and_never_refreshed() {
        let platform = MockPlatform::new()
            .with_windows(vec![create_test_window(100, 1000, "Editor")])
            .with_exe_path(1000, "C:\\tools\\editor.exe");
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);
        let icon = state.find(100).unwrap().icon.clone();
        assert!(matches!(icon, IconState::Captured(_)));

        // The exe path becoming unreadable later must not disturb the icon.
        run_tick(&mut state, &platform, &mut notifier);
        assert_eq!(state.find(100).unwrap().icon, icon);
    }

    #[test]
    fn test_excluded_title_never_becomes_an_entity() {
        let platform = MockPlatform::new().with_windows(vec![
            create_test_window(100, 1000, "Settings"),
            create_test_window(200, 2000, "Settings Editor"),
        ]);
        let config = Config::from_toml(r#"exclude_titles = ["^Settings$"]"#).unwrap();
        let mut state = State::new(config);
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);

        // Exact match excluded; the longer title is not.
        assert!(state.find(100).is_none());
        assert!(state.find(200).is_some());
        assert_eq!(notifier.events, vec![Notification::Added(200)]);
    }

    #[test]
    fn test_active_suppressed_while_taskbar_has_focus() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();
        state.set_own_window(Some(900));

        run_tick(&mut state, &platform, &mut notifier);
        assert!(state.find(100).unwrap().active);

        // Clicking the taskbar makes it the foreground window; no entity may
        // light up, and 100 goes inactive.
        platform.set_foreground(Some(900));
        notifier.clear();
        run_tick(&mut state, &platform, &mut notifier);

        assert!(state.entities.iter().all(|e| !e.active));
        assert_eq!(
            notifier.events,
            vec![Notification::ActiveChanged(100, true, false)]
        );
    }

    #[test]
    fn test_foreground_on_owned_child_marks_root_active() {
        let platform = setup_platform();
        platform.set_foreground(Some(101));
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);

        assert!(state.find(100).unwrap().active);
        assert!(!state.find(200).unwrap().active);
    }

    #[test]
    fn test_tracked_set_matches_snapshot_after_arbitrary_churn() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);

        platform.remove_window(100);
        platform.remove_window(101);
        platform.add_window(create_test_window(300, 3000, "Terminal"));
        platform.add_window(create_test_window(400, 4000, "Mail"));
        platform.remove_window(400);
        run_tick(&mut state, &platform, &mut notifier);

        let roots: Vec<_> = state.entities.iter().map(|e| e.root).collect();
        assert_eq!(roots, vec![200, 300]);
    }

    #[test]
    fn test_root_turned_ineligible_drops_its_entity() {
        let platform = setup_platform();
        let mut state = State::new(Config::default());
        let mut notifier = RecordingNotifier::new();

        run_tick(&mut state, &platform, &mut notifier);
        notifier.clear();

        // The title emptying out makes the root ineligible on the next pass.
        platform.set_title(200, "");
        run_tick(&mut state, &platform, &mut notifier);

        assert!(state.find(200).is_none());
        assert_eq!(notifier.events, vec![Notification::Removed(200)]);
    }
}
