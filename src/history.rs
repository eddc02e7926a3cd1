// ============================================================================
// COMMAND HISTORY — linear undo/redo with deterministic replay
// ============================================================================

use image::RgbImage;

use crate::filters::Filter;

/// An edit recorded in history. Executing never mutates its input; it always
/// returns a fresh image, so a replay can start from any buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Apply a color filter to the whole image.
    ApplyFilter(Filter),
}

impl Command {
    pub fn execute(&self, image: &RgbImage) -> RgbImage {
        match self {
            Command::ApplyFilter(filter) => filter.apply(image),
        }
    }

    /// Human-readable label for the history panel.
    pub fn description(&self) -> String {
        match self {
            Command::ApplyFilter(filter) => filter.name().to_string(),
        }
    }
}

/// Undo/redo ledger. `past` holds executed commands in replay order, `future`
/// holds undone commands with the most recently undone last. Recording a new
/// command discards `future`: the history is strictly linear, no branches.
#[derive(Debug, Default)]
pub struct History {
    past: Vec<Command>,
    future: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new command, discarding any redoable branch.
    pub fn add(&mut self, command: Command) {
        self.future.clear();
        self.past.push(command);
    }

    /// Move the most recent command onto the redo stack. No-op when empty.
    /// Sequence-only: recomputing the image is the caller's job.
    pub fn undo(&mut self) {
        if let Some(command) = self.past.pop() {
            self.future.push(command);
        }
    }

    /// Move the most recently undone command back. No-op when empty.
    pub fn redo(&mut self) {
        if let Some(command) = self.future.pop() {
            self.past.push(command);
        }
    }

    /// Forget everything, both done and undone.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Replay all past commands over `image`, oldest first. Pure: `future` is
    /// never consulted and the input buffer is left untouched.
    pub fn execute(&self, image: &RgbImage) -> RgbImage {
        let mut result = image.clone();
        for command in &self.past {
            result = command.execute(&result);
        }
        result
    }

    /// Descriptions of past commands, most recent first (for the history panel).
    pub fn undo_descriptions(&self) -> Vec<String> {
        self.past.iter().rev().map(Command::description).collect()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn base_image() -> RgbImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([200, 100, 50]));
        img
    }

    #[test]
    fn test_add_discards_redo_branch() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::OnlyRed));
        history.add(Command::ApplyFilter(Filter::Sepia));
        history.undo();
        assert!(history.can_redo());

        history.add(Command::ApplyFilter(Filter::OnlyBlue));
        // The undone Sepia command is unrecoverable now
        assert!(!history.can_redo());
        history.redo();
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_undo_redo_move_commands_between_stacks() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::OnlyRed));
        assert_eq!((history.undo_count(), history.redo_count()), (1, 0));
        history.undo();
        assert_eq!((history.undo_count(), history.redo_count()), (0, 1));
        history.redo();
        assert_eq!((history.undo_count(), history.redo_count()), (1, 0));
    }

    #[test]
    fn test_undo_redo_on_empty_are_noops() {
        let mut history = History::new();
        history.undo();
        history.redo();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_execute_replays_in_order() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::OnlyRed));
        history.add(Command::ApplyFilter(Filter::MaxContrast));
        let replayed = history.execute(&base_image());
        // OnlyRed then MaxContrast: (10,20,30) -> (10,0,0) -> (19,0,0)
        assert_eq!(replayed.get_pixel(0, 0).0, [19, 0, 0]);
        assert_eq!(replayed.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_execute_ignores_future_and_leaves_input_untouched() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::OnlyRed));
        history.add(Command::ApplyFilter(Filter::OnlyGreen));
        history.undo();

        let src = base_image();
        let replayed = history.execute(&src);
        assert_eq!(src, base_image());
        assert_eq!(replayed.get_pixel(0, 0).0, [10, 0, 0]);
    }

    #[test]
    fn test_clear_empties_both_stacks() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::OnlyRed));
        history.add(Command::ApplyFilter(Filter::Sepia));
        history.undo();
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_descriptions_most_recent_first() {
        let mut history = History::new();
        history.add(Command::ApplyFilter(Filter::Sepia));
        history.add(Command::ApplyFilter(Filter::MaxContrast));
        assert_eq!(history.undo_descriptions(), vec!["Max contrast", "Sepia"]);
    }
}
