//! Round phase state machine
//!
//! ```text
//! Prestart --countdown--> Orbiting --collision--> Frozen --> Simulating
//!     ^                                                          |
//!     +--------------------------- reset ------------------------+
//! ```
//!
//! A request from any other source state is refused. Contact callbacks can
//! fire twice for one logical contact, so a second freeze in the same round
//! must be a harmless no-op.

use super::state::Phase;
use crate::error::TransitionError;

#[derive(Debug, Clone)]
pub struct PhaseTransitionManager {
    phase: Phase,
    /// Orbiting -> Frozen transitions this round (0 or 1)
    freezes: u32,
}

impl Default for PhaseTransitionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTransitionManager {
    pub fn new() -> Self {
        Self {
            phase: Phase::Prestart,
            freezes: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn freezes(&self) -> u32 {
        self.freezes
    }

    /// Whether `from -> to` is an edge of the machine
    pub fn allows(from: Phase, to: Phase) -> bool {
        matches!(
            (from, to),
            (Phase::Prestart, Phase::Orbiting)
                | (Phase::Orbiting, Phase::Frozen)
                | (Phase::Frozen, Phase::Simulating)
                | (Phase::Simulating, Phase::Prestart)
        )
    }

    pub fn request(&mut self, to: Phase) -> Result<(), TransitionError> {
        let from = self.phase;
        if !Self::allows(from, to) {
            return Err(TransitionError::Invalid { from, to });
        }
        match to {
            Phase::Frozen => self.freezes += 1,
            Phase::Prestart => self.freezes = 0,
            _ => {}
        }
        self.phase = to;
        log::debug!("Phase {:?} -> {:?}", from, to);
        Ok(())
    }

    pub fn begin_orbit(&mut self) -> Result<(), TransitionError> {
        self.request(Phase::Orbiting)
    }

    pub fn freeze(&mut self) -> Result<(), TransitionError> {
        self.request(Phase::Frozen)
    }

    pub fn simulate(&mut self) -> Result<(), TransitionError> {
        self.request(Phase::Simulating)
    }

    pub fn reset(&mut self) -> Result<(), TransitionError> {
        self.request(Phase::Prestart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_round_cycle() {
        let mut machine = PhaseTransitionManager::new();
        machine.begin_orbit().unwrap();
        machine.freeze().unwrap();
        assert_eq!(machine.freezes(), 1);
        machine.simulate().unwrap();
        assert_eq!(machine.phase(), Phase::Simulating);
        machine.reset().unwrap();
        assert_eq!(machine.phase(), Phase::Prestart);
        assert_eq!(machine.freezes(), 0);
    }

    #[test]
    fn test_second_freeze_is_refused() {
        let mut machine = PhaseTransitionManager::new();
        machine.begin_orbit().unwrap();
        machine.freeze().unwrap();
        assert_eq!(
            machine.freeze(),
            Err(TransitionError::Invalid {
                from: Phase::Frozen,
                to: Phase::Frozen
            })
        );
        machine.simulate().unwrap();
        assert!(machine.freeze().is_err());
        assert_eq!(machine.freezes(), 1);
        assert_eq!(machine.phase(), Phase::Simulating);
    }

    #[test]
    fn test_invalid_requests_leave_phase_alone() {
        let mut machine = PhaseTransitionManager::new();
        assert!(machine.freeze().is_err());
        assert!(machine.simulate().is_err());
        assert!(machine.reset().is_err());
        assert_eq!(machine.phase(), Phase::Prestart);

        machine.begin_orbit().unwrap();
        assert!(machine.begin_orbit().is_err());
        assert!(machine.reset().is_err());
        assert_eq!(machine.phase(), Phase::Orbiting);
    }

    #[test]
    fn test_edges() {
        use Phase::*;
        let all = [Prestart, Orbiting, Frozen, Simulating];
        let edges = all
            .iter()
            .flat_map(|&from| all.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| PhaseTransitionManager::allows(from, to))
            .count();
        assert_eq!(edges, 4);
    }
}
