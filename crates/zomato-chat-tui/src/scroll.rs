//! Smooth scrolling for the message list.
//!
//! Whenever the conversation changes, the view glides to the newest message
//! over a few ticks instead of jumping. Each tick covers a third of the
//! remaining distance (at least one line), so long jumps start fast and
//! settle gently. Scrolling up by hand stops following the bottom until the
//! next change to the conversation.

#[derive(Debug, Default, Clone)]
pub struct ScrollState {
    offset: u16,
    max_offset: u16,
    animating: bool,
    follow: bool,
    seen_revision: Option<u64>,
}

impl ScrollState {
    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn max_offset(&self) -> u16 {
        self.max_offset
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Start a smooth scroll to the bottom if the conversation changed since
    /// the last call.
    pub fn observe_revision(&mut self, revision: u64) {
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            self.follow = true;
            self.animating = true;
        }
    }

    /// Update the scrollable range after layout.
    pub fn set_bounds(&mut self, total_lines: u16, visible_height: u16) {
        self.max_offset = total_lines.saturating_sub(visible_height);
        self.offset = self.offset.min(self.max_offset);

        // Content that grows without a new message (typing indicator, resize)
        // keeps the bottom pinned.
        if self.follow && !self.animating {
            self.offset = self.max_offset;
        }
    }

    /// Advance the animation by one frame. Returns `true` if the view moved.
    pub fn tick(&mut self) -> bool {
        if !self.animating {
            return false;
        }

        let distance = self.max_offset.saturating_sub(self.offset);
        if distance == 0 {
            self.animating = false;
            return false;
        }

        let step = distance.div_ceil(3).max(1);
        self.offset += step;
        if self.offset >= self.max_offset {
            self.offset = self.max_offset;
            self.animating = false;
        }
        true
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.offset = self.offset.saturating_sub(lines);
        self.animating = false;
        self.follow = self.offset >= self.max_offset;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.offset = self.offset.saturating_add(lines).min(self.max_offset);
        self.animating = false;
        self.follow = self.offset >= self.max_offset;
    }

    pub fn to_top(&mut self) {
        self.scroll_up(self.offset);
    }

    pub fn to_bottom(&mut self) {
        self.follow = true;
        self.animating = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_rest(state: &mut ScrollState) -> usize {
        let mut frames = 0;
        while state.tick() {
            frames += 1;
            assert!(frames < 100, "animation never settled");
        }
        frames
    }

    #[test]
    fn new_revision_glides_to_bottom() {
        let mut state = ScrollState::default();
        state.set_bounds(10, 10);
        state.observe_revision(1);
        state.set_bounds(40, 10);

        assert!(state.tick());
        assert!(state.offset() > 0);
        assert!(state.offset() < 30, "should not jump in one frame");

        run_to_rest(&mut state);
        assert_eq!(state.offset(), 30);
        assert!(!state.is_animating());
    }

    #[test]
    fn same_revision_does_not_restart() {
        let mut state = ScrollState::default();
        state.observe_revision(3);
        state.set_bounds(20, 10);
        run_to_rest(&mut state);

        state.scroll_up(5);
        state.observe_revision(3);
        assert!(!state.is_animating());
        assert_eq!(state.offset(), 5);
    }

    #[test]
    fn manual_scroll_up_stops_following() {
        let mut state = ScrollState::default();
        state.observe_revision(1);
        state.set_bounds(30, 10);
        run_to_rest(&mut state);

        state.scroll_up(4);
        assert!(!state.is_following());
        state.set_bounds(32, 10);
        assert_eq!(state.offset(), 16);

        state.scroll_down(100);
        assert!(state.is_following());
        assert_eq!(state.offset(), 22);
    }

    #[test]
    fn growth_while_following_stays_pinned() {
        let mut state = ScrollState::default();
        state.observe_revision(1);
        state.set_bounds(15, 10);
        run_to_rest(&mut state);

        state.set_bounds(17, 10);
        assert_eq!(state.offset(), 7);
    }

    #[test]
    fn shrinking_content_clamps_offset() {
        let mut state = ScrollState::default();
        state.observe_revision(1);
        state.set_bounds(50, 10);
        run_to_rest(&mut state);

        state.observe_revision(2);
        state.set_bounds(5, 10);
        assert_eq!(state.offset(), 0);
        assert!(!state.tick());
    }
}
