//! Damage mitigation and negotiation.
//!
//! Laser hits against a robot are first reduced by its passive blockers
//! (front shield, power-down shield, absorbing coat). Whatever remains may be
//! cancelled 1:1 by discarding capability cards if the player chooses; the
//! engine suspends until every such choice in the batch is settled.

use crate::board::{DamageBlocker, OptionKind, PowerState, Robot, RobotId, MAX_DAMAGE};
use crate::error::GameError;
use crate::event::{DestroyCause, GameEvent};

use super::laser::Hit;
use super::lifecycle::destroy;

/// Outcome of passive mitigation for one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mitigation {
    pub requested: u8,
    pub prevented: u8,
    /// A coat that used up its budget during this mitigation.
    pub spent: Option<OptionKind>,
}

impl Mitigation {
    pub fn remaining(&self) -> u8 {
        self.requested.saturating_sub(self.prevented)
    }
}

/// Applies passive blockers to `hits`, all aimed at `robot`.
pub fn mitigate(robot: &mut Robot, hits: &[Hit], events: &mut Vec<GameEvent>) -> Mitigation {
    let mut pending: Vec<u8> = hits.iter().map(|h| h.damage).collect();
    let requested = pending.iter().fold(0u8, |acc, d| acc.saturating_add(*d));
    let front = robot.facing;
    let powered_down = robot.power == PowerState::Off;

    if let Some(card) = robot.options.iter_mut().find(|o| {
        o.kind.damage_blocker() == Some(DamageBlocker::FrontShield) && !o.used_this_register
    }) {
        if let Some(i) = hits.iter().position(|h| h.robot_laser && h.side() == front) {
            pending[i] = 0;
            card.used_this_register = true;
        }
    }

    if powered_down {
        if let Some(card) = robot
            .options
            .iter_mut()
            .find(|o| o.kind.damage_blocker() == Some(DamageBlocker::PowerDownShield))
        {
            for (i, hit) in hits.iter().enumerate() {
                if pending[i] > 0 && !card.side_blocked(hit.side()) {
                    pending[i] -= 1;
                    card.mark_side(hit.side());
                }
            }
        }
    }

    let mut remaining = pending.iter().fold(0u8, |acc, d| acc.saturating_add(*d));
    let mut spent = None;
    if remaining > 0 {
        let coat = robot.options.iter().position(|o| {
            matches!(o.kind.damage_blocker(), Some(DamageBlocker::Absorb { .. }))
        });
        if let Some(idx) = coat {
            let card = &mut robot.options[idx];
            if let Some(DamageBlocker::Absorb { budget }) = card.kind.damage_blocker() {
                let soak = remaining.min(budget.saturating_sub(card.absorbed));
                card.absorbed += soak;
                remaining -= soak;
                if card.absorbed >= budget {
                    let kind = robot.options.remove(idx).kind;
                    events.push(GameEvent::OptionDiscarded {
                        robot: robot.id,
                        kind,
                    });
                    spent = Some(kind);
                }
            }
        }
    }

    Mitigation {
        requested,
        prevented: requested - remaining,
        spent,
    }
}

/// Adds `requested - prevented` damage, capped at 10, and destroys the robot
/// when the cap is reached.
pub fn apply_damage(robot: &mut Robot, requested: u8, prevented: u8, events: &mut Vec<GameEvent>) {
    let taken = requested.saturating_sub(prevented);
    robot.damage = robot.damage.saturating_add(taken).min(MAX_DAMAGE);
    events.push(GameEvent::DamageApplied {
        robot: robot.id,
        requested,
        prevented,
        damage: robot.damage,
    });
    if robot.damage >= MAX_DAMAGE {
        destroy(robot, DestroyCause::Damage, events);
    }
}

/// An open offer to discard capability cards against incoming damage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageChoice {
    pub robot: RobotId,
    pub requested: u8,
    /// Prevented by passive blockers.
    pub prevented: u8,
    /// Prevented by discards.
    pub cancelled: u8,
    pub deadline_ms: u64,
    pub settled: bool,
}

impl DamageChoice {
    pub fn new(robot: RobotId, mitigation: &Mitigation, deadline_ms: u64) -> Self {
        DamageChoice {
            robot,
            requested: mitigation.requested,
            prevented: mitigation.prevented,
            cancelled: 0,
            deadline_ms,
            settled: false,
        }
    }

    /// Damage still headed for the robot.
    pub fn outstanding(&self) -> u8 {
        self.requested
            .saturating_sub(self.prevented)
            .saturating_sub(self.cancelled)
    }

    /// Throws away the card at `index` to cancel 1 damage. The choice settles
    /// itself once nothing is left to cancel or nothing is left to throw.
    pub fn discard(
        &mut self,
        robot: &mut Robot,
        index: usize,
        events: &mut Vec<GameEvent>,
    ) -> Result<OptionKind, GameError> {
        if self.settled || self.outstanding() == 0 {
            return Err(GameError::NoPendingDecision(robot.id));
        }
        let card = robot.options.get(index).ok_or(GameError::NoSuchOption {
            robot: robot.id,
            index,
        })?;
        if !card.kind.is_discardable() {
            return Err(GameError::NotDiscardable {
                robot: robot.id,
                index,
            });
        }
        let kind = robot.options.remove(index).kind;
        self.cancelled += 1;
        events.push(GameEvent::OptionDiscarded {
            robot: robot.id,
            kind,
        });
        if self.outstanding() == 0 || robot.discardable_options() == 0 {
            self.settled = true;
        }
        Ok(kind)
    }

    /// Applies the final damage.
    pub fn apply(&self, robot: &mut Robot, events: &mut Vec<GameEvent>) {
        apply_damage(
            robot,
            self.requested,
            self.prevented.saturating_add(self.cancelled),
            events,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, OptionCard};
    use crate::resolve::testutil::bot;

    fn hit(travel: Direction, robot_laser: bool, damage: u8) -> Hit {
        Hit {
            target: 0,
            travel,
            robot_laser,
            damage,
        }
    }

    #[test]
    fn unprotected_robot_takes_everything() {
        let mut r = bot(0, 1, 1, Direction::Up);
        let m = mitigate(&mut r, &[hit(Direction::Left, false, 2), hit(Direction::Down, true, 1)], &mut Vec::new());
        assert_eq!(m.requested, 3);
        assert_eq!(m.prevented, 0);
        assert_eq!(m.remaining(), 3);
    }

    #[test]
    fn front_shield_blocks_first_frontal_robot_hit() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.options.push(OptionCard::new(OptionKind::Shield));
        // Travelling down strikes the up-facing robot in the face.
        let hits = [hit(Direction::Down, true, 1), hit(Direction::Down, true, 1)];
        let m = mitigate(&mut r, &hits, &mut Vec::new());
        assert_eq!(m.prevented, 1);
        assert!(r.options[0].used_this_register);

        // Spent for this register.
        let m = mitigate(&mut r, &hits[..1], &mut Vec::new());
        assert_eq!(m.prevented, 0);
    }

    #[test]
    fn front_shield_ignores_board_lasers_and_flanks() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.options.push(OptionCard::new(OptionKind::Shield));
        let hits = [hit(Direction::Down, false, 1), hit(Direction::Left, true, 1)];
        let m = mitigate(&mut r, &hits, &mut Vec::new());
        assert_eq!(m.prevented, 0);
    }

    #[test]
    fn power_down_shield_blocks_one_per_direction() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.power = PowerState::Off;
        r.options.push(OptionCard::new(OptionKind::PowerDownShield));
        let hits = [
            hit(Direction::Left, false, 2),
            hit(Direction::Left, true, 1),
            hit(Direction::Up, true, 1),
        ];
        let m = mitigate(&mut r, &hits, &mut Vec::new());
        assert_eq!(m.requested, 4);
        assert_eq!(m.prevented, 2);

        // Inactive while powered on.
        let mut on = bot(1, 1, 1, Direction::Up);
        on.options.push(OptionCard::new(OptionKind::PowerDownShield));
        assert_eq!(mitigate(&mut on, &hits, &mut Vec::new()).prevented, 0);
    }

    #[test]
    fn ablative_coat_spends_its_budget() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.options.push(OptionCard::new(OptionKind::AblativeCoat));
        let m = mitigate(&mut r, &[hit(Direction::Left, false, 2)], &mut Vec::new());
        assert_eq!(m.prevented, 2);
        assert_eq!(m.spent, None);
        assert_eq!(r.options[0].absorbed, 2);

        let mut events = Vec::new();
        let m = mitigate(&mut r, &[hit(Direction::Left, false, 2)], &mut events);
        assert_eq!(m.prevented, 1);
        assert_eq!(m.spent, Some(OptionKind::AblativeCoat));
        assert!(r.options.is_empty());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn damage_caps_at_ten_and_destroys() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.damage = 8;
        let mut events = Vec::new();
        apply_damage(&mut r, 5, 0, &mut events);
        assert!(r.dead);
        assert_eq!(r.damage, 2);
        assert!(matches!(
            events[0],
            GameEvent::DamageApplied { damage: 10, .. }
        ));
    }

    #[test]
    fn discarding_cancels_damage() {
        let mut r = bot(0, 1, 1, Direction::Up);
        r.options.push(OptionCard::new(OptionKind::RammingGear));
        r.options.push(OptionCard::new(OptionKind::AblativeCoat));
        r.options.push(OptionCard::new(OptionKind::ExtraMemory));
        let m = Mitigation {
            requested: 3,
            prevented: 0,
            spent: None,
        };
        let mut choice = DamageChoice::new(r.id, &m, 1000);
        let mut events = Vec::new();

        assert_eq!(
            choice.discard(&mut r, 1, &mut events),
            Err(GameError::NotDiscardable { robot: r.id, index: 1 })
        );
        assert_eq!(
            choice.discard(&mut r, 7, &mut events),
            Err(GameError::NoSuchOption { robot: r.id, index: 7 })
        );
        assert_eq!(choice.discard(&mut r, 0, &mut events), Ok(OptionKind::RammingGear));
        assert!(!choice.settled);
        // The coat slid to index 0; memory is now at 1.
        assert_eq!(choice.discard(&mut r, 1, &mut events), Ok(OptionKind::ExtraMemory));
        // Nothing discardable is left.
        assert!(choice.settled);
        assert_eq!(choice.outstanding(), 1);

        choice.apply(&mut r, &mut events);
        assert_eq!(r.damage, 1);
    }
}
