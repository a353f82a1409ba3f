use std::time::SystemTime;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Rendering classification of a single target character.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Pending,
}

impl From<Outcome> for CharState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => CharState::Correct,
            Outcome::Incorrect => CharState::Incorrect,
        }
    }
}

/// One timed attempt at typing a single phrase.
///
/// `typed_index` is the number of judged positions and `completed` is derived
/// from it, so `error_count <= typed_index <= target length` holds by
/// construction.
#[derive(Debug, Clone)]
pub struct Session {
    id: u64,
    target: String,
    chars: Vec<char>,
    outcomes: Vec<Outcome>,
    error_count: usize,
    started_at: SystemTime,
}

impl Session {
    pub fn new(id: u64, target: impl Into<String>, started_at: SystemTime) -> Self {
        let target = target.into();
        let chars = target.chars().collect::<Vec<char>>();
        Self {
            id,
            outcomes: Vec::with_capacity(chars.len()),
            target,
            chars,
            error_count: 0,
            started_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target_text(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn typed_index(&self) -> usize {
        self.outcomes.len()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn completed(&self) -> bool {
        self.typed_index() == self.chars.len()
    }

    /// Character the next keystroke is judged against.
    pub fn expected_char(&self) -> Option<char> {
        self.chars.get(self.typed_index()).copied()
    }

    /// Judges `typed` against the next target character and advances. Returns
    /// `None` without touching anything once the session is complete.
    pub fn judge(&mut self, typed: char) -> Option<Outcome> {
        self.judge_slot(Some(typed))
    }

    /// Like [`Session::judge`], but for the input field's content at the next
    /// position. An empty slot, as left behind by a deletion, is a mismatch.
    pub fn judge_slot(&mut self, typed: Option<char>) -> Option<Outcome> {
        let expected = self.expected_char()?;
        let outcome = if typed == Some(expected) {
            Outcome::Correct
        } else {
            self.error_count += 1;
            Outcome::Incorrect
        };
        self.outcomes.push(outcome);
        Some(outcome)
    }

    pub fn char_states(&self) -> impl Iterator<Item = (char, CharState)> + '_ {
        self.chars.iter().enumerate().map(|(idx, &c)| {
            let state = self
                .outcomes
                .get(idx)
                .map_or(CharState::Pending, |&o| o.into());
            (c, state)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> Session {
        Session::new(1, text, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn new_session_is_pristine() {
        let s = session("cat");
        assert_eq!(s.target_text(), "cat");
        assert_eq!(s.len(), 3);
        assert_eq!(s.typed_index(), 0);
        assert_eq!(s.error_count(), 0);
        assert!(!s.completed());
        assert_eq!(s.expected_char(), Some('c'));
    }

    #[test]
    fn judge_counts_errors_and_advances() {
        let mut s = session("cat");

        assert_eq!(s.judge('x'), Some(Outcome::Incorrect));
        assert_eq!(s.judge('a'), Some(Outcome::Correct));
        assert_eq!(s.typed_index(), 2);
        assert_eq!(s.error_count(), 1);
        assert!(!s.completed());

        assert_eq!(s.judge('t'), Some(Outcome::Correct));
        assert!(s.completed());
    }

    #[test]
    fn judge_after_completion_is_inert() {
        let mut s = session("hi");
        s.judge('h');
        s.judge('i');

        assert_eq!(s.judge('x'), None);
        assert_eq!(s.typed_index(), 2);
        assert_eq!(s.error_count(), 0);
    }

    #[test]
    fn empty_slot_is_a_mismatch() {
        let mut s = session("ab");

        assert_eq!(s.judge_slot(Some('a')), Some(Outcome::Correct));
        assert_eq!(s.judge_slot(None), Some(Outcome::Incorrect));
        assert_eq!(s.typed_index(), 2);
        assert_eq!(s.error_count(), 1);
        assert_eq!(s.judge_slot(None), None);
    }

    #[test]
    fn char_states_reflect_progress() {
        let mut s = session("dog");
        s.judge('d');
        s.judge('x');

        let states = s.char_states().collect::<Vec<_>>();
        assert_eq!(
            states,
            vec![
                ('d', CharState::Correct),
                ('o', CharState::Incorrect),
                ('g', CharState::Pending),
            ]
        );
    }

    #[test]
    fn positions_count_chars_not_bytes() {
        let mut s = session("né");
        assert_eq!(s.len(), 2);
        s.judge('n');
        assert_eq!(s.expected_char(), Some('é'));
        s.judge('é');
        assert!(s.completed());
    }

    #[test]
    fn invariants_hold_under_any_input() {
        let mut s = session("the quick fox");
        for c in "thx quack fix and more".chars() {
            s.judge(c);
            assert!(s.error_count() <= s.typed_index());
            assert!(s.typed_index() <= s.len());
        }
        assert!(s.completed());
    }
}
