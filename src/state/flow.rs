use crate::core::StepKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Done,
    Cancelled,
}

/// Strictly sequential ordering of wizard steps.
#[derive(Debug, Clone)]
pub struct Flow {
    steps: Vec<StepKey>,
    current: usize,
    statuses: Vec<StepStatus>,
}

impl Flow {
    pub fn new(steps: Vec<StepKey>) -> Self {
        let statuses = initial_statuses(steps.len());
        Self {
            steps,
            current: 0,
            statuses,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[StepKey] {
        &self.steps
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.steps.iter().position(|step| step == key)
    }

    pub fn status_at(&self, index: usize) -> StepStatus {
        self.statuses
            .get(index)
            .copied()
            .unwrap_or(StepStatus::Pending)
    }

    pub fn current_status(&self) -> StepStatus {
        self.status_at(self.current)
    }

    pub fn current_step(&self) -> Option<&StepKey> {
        self.steps.get(self.current)
    }

    /// One-based position of the active step and the total, as shown by a progress indicator.
    pub fn progress(&self) -> (usize, usize) {
        if self.steps.is_empty() {
            (0, 0)
        } else {
            (self.current + 1, self.steps.len())
        }
    }

    pub fn complete_current(&mut self) {
        if let Some(status) = self.statuses.get_mut(self.current) {
            *status = StepStatus::Done;
        }
    }

    pub fn cancel_current(&mut self) {
        if let Some(status) = self.statuses.get_mut(self.current) {
            *status = StepStatus::Cancelled;
        }
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.steps.len()
    }

    pub fn next_step(&self) -> Option<&StepKey> {
        self.steps.get(self.current + 1)
    }

    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.complete_current();
        self.current += 1;
        if let Some(status) = self.statuses.get_mut(self.current) {
            *status = StepStatus::Active;
        }
        true
    }

    /// Moves to `key`, which must be the step right after the current one.
    pub fn advance_to(&mut self, key: &str) -> bool {
        match self.next_step() {
            Some(next) if next == key => self.advance(),
            _ => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.has_next() && self.current_status() == StepStatus::Done
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.statuses = initial_statuses(self.steps.len());
    }
}

fn initial_statuses(len: usize) -> Vec<StepStatus> {
    let mut statuses = vec![StepStatus::Pending; len];
    if let Some(first) = statuses.first_mut() {
        *first = StepStatus::Active;
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::{Flow, StepStatus};
    use crate::core::StepKey;

    fn flow() -> Flow {
        Flow::new(vec![
            StepKey::new("STUDENT_ID"),
            StepKey::new("PERSONAL_DETAILS"),
            StepKey::new("ADDRESS"),
        ])
    }

    #[test]
    fn advances_in_order_and_tracks_statuses() {
        let mut flow = flow();
        assert_eq!(flow.progress(), (1, 3));
        assert_eq!(flow.current_status(), StepStatus::Active);

        assert!(flow.advance());
        assert_eq!(flow.status_at(0), StepStatus::Done);
        assert_eq!(flow.current_step().map(StepKey::as_str), Some("PERSONAL_DETAILS"));
        assert_eq!(flow.progress(), (2, 3));

        assert!(flow.advance());
        assert!(!flow.advance());
        flow.complete_current();
        assert!(flow.is_finished());
    }

    #[test]
    fn advance_to_refuses_skipping_steps() {
        let mut flow = flow();
        assert!(!flow.advance_to("ADDRESS"));
        assert!(flow.advance_to("PERSONAL_DETAILS"));
        assert_eq!(flow.current_index(), 1);
    }

    #[test]
    fn reset_returns_to_first_step() {
        let mut flow = flow();
        flow.advance();
        flow.cancel_current();
        flow.reset();
        assert_eq!(flow.current_index(), 0);
        assert_eq!(flow.status_at(1), StepStatus::Pending);
        assert_eq!(flow.current_status(), StepStatus::Active);
    }

    #[test]
    fn empty_flow_reports_no_progress() {
        let flow = Flow::new(Vec::new());
        assert_eq!(flow.progress(), (0, 0));
        assert_eq!(flow.current_step(), None);
    }
}
