use crate::api::types::{BallGroup, BallNumber};

/// Balls of each group still on the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBook {
    solids: Vec<BallNumber>,
    stripes: Vec<BallNumber>,
    eight: bool,
}

impl GroupBook {
    pub fn new() -> Self {
        Self {
            solids: BallGroup::Solids.members().to_vec(),
            stripes: BallGroup::Stripes.members().to_vec(),
            eight: true,
        }
    }

    /// Remaining balls of `group`. For `Locked` this is the 8-ball, if still up.
    pub fn remaining(&self, group: BallGroup) -> &[BallNumber] {
        match group {
            BallGroup::Solids => &self.solids,
            BallGroup::Stripes => &self.stripes,
            BallGroup::Locked if self.eight => BallGroup::Locked.members(),
            BallGroup::Locked => &[],
        }
    }

    pub fn is_cleared(&self, group: BallGroup) -> bool {
        self.remaining(group).is_empty()
    }

    /// Take `ball` off its group's list. Returns `false` if it was not there.
    pub fn remove(&mut self, ball: BallNumber) -> bool {
        let list = match ball.group() {
            Some(BallGroup::Solids) => &mut self.solids,
            Some(BallGroup::Stripes) => &mut self.stripes,
            Some(BallGroup::Locked) => {
                let was_up = self.eight;
                self.eight = false;
                return was_up;
            }
            None => return false,
        };
        match list.iter().position(|b| *b == ball) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl Default for GroupBook {
    fn default() -> Self {
        Self::new()
    }
}
