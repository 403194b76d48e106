//! Proportional scroll coupling between the editor and the preview.
//!
//! Scrolling one pane moves the other to the same relative position. The
//! programmatic scroll of the target fires the target's own scroll handler;
//! the synchronizer suppresses that echo by remembering which pane is
//! driving until the host reports the next animation frame.

/// One of the two coupled panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Editor,
    Preview,
}

impl Pane {
    /// The pane on the other side of the coupling
    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }
}

/// Scroll geometry of a pane, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Largest reachable `scroll_top`; zero or negative when nothing scrolls
    pub fn max_scroll(&self) -> f64 {
        self.scroll_height - self.client_height
    }

    /// Relative position in `0.0..=1.0`, or `0.0` for non-scrollable content
    pub fn scroll_ratio(&self) -> f64 {
        let max = self.max_scroll();
        if max <= 0.0 {
            return 0.0;
        }
        (self.scroll_top / max).clamp(0.0, 1.0)
    }
}

/// `scroll_top` that puts `target` at the same relative position as `source`
pub fn target_scroll_top(source: &ScrollMetrics, target: &ScrollMetrics) -> f64 {
    source.scroll_ratio() * target.max_scroll().max(0.0)
}

/// A scrollable surface the synchronizer can read and drive
pub trait ScrollSurface {
    fn metrics(&self) -> ScrollMetrics;
    fn set_scroll_top(&mut self, scroll_top: f64);
}

/// Feedback-free coupling of the two panes.
#[derive(Debug, Clone)]
pub struct ScrollSynchronizer {
    enabled: bool,
    syncing_from: Option<Pane>,
}

impl Default for ScrollSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSynchronizer {
    /// Enabled synchronizer with no pane driving
    pub const fn new() -> Self {
        Self {
            enabled: true,
            syncing_from: None,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle synchronization; disabling also releases a held flag
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.syncing_from = None;
        }
    }

    /// Pane currently driving, until the next animation frame
    pub const fn syncing_from(&self) -> Option<Pane> {
        self.syncing_from
    }

    /// Handle a scroll event on `source`, whose surface is `from`.
    ///
    /// Returns `true` when `to` was moved. Events are ignored while disabled
    /// and while the other pane is driving, since those are echoes of the
    /// synchronizer's own writes.
    pub fn handle_scroll<F, T>(&mut self, source: Pane, from: &F, to: &mut T) -> bool
    where
        F: ScrollSurface + ?Sized,
        T: ScrollSurface + ?Sized,
    {
        if !self.enabled || self.syncing_from == Some(source.other()) {
            return false;
        }

        self.syncing_from = Some(source);
        let top = target_scroll_top(&from.metrics(), &to.metrics());
        to.set_scroll_top(top);
        tracing::trace!("Synced {:?} scroll to {:.1}", source.other(), top);
        true
    }

    /// Release the driving flag; call once per animation frame
    pub const fn on_animation_frame(&mut self) {
        self.syncing_from = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Surface {
        metrics: ScrollMetrics,
        writes: usize,
    }

    impl Surface {
        fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
            Self {
                metrics: ScrollMetrics::new(scroll_top, scroll_height, client_height),
                writes: 0,
            }
        }

        fn top(&self) -> f64 {
            self.metrics.scroll_top
        }
    }

    impl ScrollSurface for Surface {
        fn metrics(&self) -> ScrollMetrics {
            self.metrics
        }

        fn set_scroll_top(&mut self, scroll_top: f64) {
            self.metrics.scroll_top = scroll_top;
            self.writes += 1;
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_editor_scroll_moves_preview_proportionally() {
        let mut sync = ScrollSynchronizer::new();
        let editor = Surface::new(400.0, 2000.0, 200.0);
        let mut preview = Surface::new(0.0, 3000.0, 300.0);

        assert!(sync.handle_scroll(Pane::Editor, &editor, &mut preview));
        assert!(close(preview.top(), 400.0 / 1800.0 * 2700.0));
        assert!(close(preview.top(), 600.0));
    }

    #[test]
    fn test_preview_scroll_moves_editor_proportionally() {
        let mut sync = ScrollSynchronizer::new();
        let mut editor = Surface::new(0.0, 2200.0, 200.0);
        let preview = Surface::new(800.0, 4200.0, 400.0);

        assert!(sync.handle_scroll(Pane::Preview, &preview, &mut editor));
        assert!(close(editor.top(), 800.0 / 3800.0 * 2000.0));
    }

    #[test]
    fn test_programmatic_scroll_does_not_echo_back() {
        let mut sync = ScrollSynchronizer::new();
        let mut editor = Surface::new(400.0, 2000.0, 200.0);
        let mut preview = Surface::new(0.0, 3000.0, 300.0);

        sync.handle_scroll(Pane::Editor, &editor, &mut preview);
        // The preview's handler fires because it was scrolled programmatically.
        assert!(!sync.handle_scroll(Pane::Preview, &preview, &mut editor));

        assert_eq!(editor.writes, 0);
        assert!(close(editor.top(), 400.0));
        assert_eq!(sync.syncing_from(), Some(Pane::Editor));
    }

    #[test]
    fn test_flag_clears_on_next_frame() {
        let mut sync = ScrollSynchronizer::new();
        let mut editor = Surface::new(400.0, 2000.0, 200.0);
        let mut preview = Surface::new(0.0, 3000.0, 300.0);

        sync.handle_scroll(Pane::Editor, &editor, &mut preview);
        sync.on_animation_frame();
        assert_eq!(sync.syncing_from(), None);

        preview.metrics.scroll_top = 2700.0;
        assert!(sync.handle_scroll(Pane::Preview, &preview, &mut editor));
        assert!(close(editor.top(), 1800.0));
    }

    #[test]
    fn test_driving_pane_keeps_syncing_within_a_frame() {
        let mut sync = ScrollSynchronizer::new();
        let mut editor = Surface::new(0.0, 2000.0, 200.0);
        let mut preview = Surface::new(0.0, 3000.0, 300.0);

        sync.handle_scroll(Pane::Editor, &editor, &mut preview);
        editor.metrics.scroll_top = 900.0;
        assert!(sync.handle_scroll(Pane::Editor, &editor, &mut preview));
        assert!(close(preview.top(), 1350.0));
    }

    #[test]
    fn test_disabled_synchronizer_ignores_everything() {
        let mut sync = ScrollSynchronizer::new();
        let mut editor = Surface::new(400.0, 2000.0, 200.0);
        let mut preview = Surface::new(0.0, 3000.0, 300.0);

        sync.handle_scroll(Pane::Editor, &editor, &mut preview);
        sync.set_enabled(false);
        assert!(!sync.is_enabled());
        assert_eq!(sync.syncing_from(), None);

        assert!(!sync.handle_scroll(Pane::Editor, &editor, &mut preview));
        assert!(!sync.handle_scroll(Pane::Preview, &preview, &mut editor));
        assert_eq!(preview.writes, 1);
        assert_eq!(editor.writes, 0);
    }

    #[test]
    fn test_non_scrollable_source_maps_to_top() {
        let source = ScrollMetrics::new(50.0, 200.0, 200.0);
        let target = ScrollMetrics::new(700.0, 3000.0, 300.0);

        assert!(close(source.scroll_ratio(), 0.0));
        assert!(close(target_scroll_top(&source, &target), 0.0));
    }

    #[test]
    fn test_non_scrollable_target_stays_at_top() {
        let source = ScrollMetrics::new(400.0, 2000.0, 200.0);
        let target = ScrollMetrics::new(0.0, 100.0, 300.0);

        assert!(close(target_scroll_top(&source, &target), 0.0));
    }

    #[test]
    fn test_overscroll_is_clamped() {
        let source = ScrollMetrics::new(2500.0, 2000.0, 200.0);
        assert!(close(source.scroll_ratio(), 1.0));

        let bounced = ScrollMetrics::new(-30.0, 2000.0, 200.0);
        assert!(close(bounced.scroll_ratio(), 0.0));
    }
}
