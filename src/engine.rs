//! Turn state machine.
//!
//! `Game` owns one match: the robots, the decks, the programming timer and
//! the event outbox. It never reads a clock or sleeps; every entry point that
//! can start or expire a deadline takes the current time in milliseconds.
//! When resolution needs a player decision it parks in `Awaiting` and resumes
//! from the exact sub-phase once the decision (or its timeout) arrives.

use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{
    option_deck, Board, Deck, Direction, OptionKind, PowerState, ProgramCard, Robot, RobotId,
    REGISTER_COUNT,
};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::event::{GameEvent, Standing};
use crate::resolve::{self, lifecycle, DamageChoice, Hit};
use crate::timer::TurnTimer;

/// Externally visible game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Accepting robots.
    Waiting,
    Starting,
    /// Powered-down robots are deciding whether to stay down.
    PowerDownDecision,
    Programming,
    /// Resolving register `register` (0-based).
    Executing { register: usize },
    Ended,
}

/// A deadline-bound decision owed by one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDecision {
    pub robot: RobotId,
    pub deadline_ms: u64,
}

/// What resolution is suspended on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Awaiting {
    /// One laser phase's batch of discard offers.
    DamageChoices(Vec<DamageChoice>),
    /// Destroyed robots choosing their respawn facing.
    Respawns(Vec<PendingDecision>),
    /// Powered-down robots choosing whether to stay down.
    PowerDown(Vec<PendingDecision>),
}

impl Awaiting {
    /// Returns true if `robot` still owes a decision.
    pub fn is_pending(&self, robot: RobotId) -> bool {
        match self {
            Awaiting::DamageChoices(choices) => {
                choices.iter().any(|c| c.robot == robot && !c.settled)
            }
            Awaiting::Respawns(pending) | Awaiting::PowerDown(pending) => {
                pending.iter().any(|p| p.robot == robot)
            }
        }
    }

    fn expired(&self, now_ms: u64) -> Vec<RobotId> {
        match self {
            Awaiting::DamageChoices(choices) => choices
                .iter()
                .filter(|c| !c.settled && c.deadline_ms <= now_ms)
                .map(|c| c.robot)
                .collect(),
            Awaiting::Respawns(pending) | Awaiting::PowerDown(pending) => pending
                .iter()
                .filter(|p| p.deadline_ms <= now_ms)
                .map(|p| p.robot)
                .collect(),
        }
    }
}

/// Resume point inside a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Cards,
    Elements,
    Checkpoints,
}

/// One match on one board.
pub struct Game {
    board: Arc<Board>,
    config: GameConfig,
    robots: Vec<Robot>,
    phase: Phase,
    awaiting: Option<Awaiting>,
    stage: Stage,
    turn: u32,
    deck: Deck,
    option_deck: Vec<OptionKind>,
    timer: TurnTimer,
    rng: SmallRng,
    events: Vec<GameEvent>,
    winner: Option<RobotId>,
    standings: Vec<Standing>,
}

impl Game {
    /// Creates a game waiting for robots. `seed` fixes every shuffle.
    pub fn new(board: Arc<Board>, config: GameConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let option_deck = option_deck(&mut rng);
        let timer = TurnTimer::new(config.timer);
        Game {
            board,
            config,
            robots: Vec::new(),
            phase: Phase::Waiting,
            awaiting: None,
            stage: Stage::Cards,
            turn: 0,
            deck: Deck::default(),
            option_deck,
            timer,
            rng,
            events: Vec::new(),
            winner: None,
            standings: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id.0)
    }

    /// Direct access for scenario setup in tests and benches. Not part of
    /// the game API: edits here bypass every rule check.
    #[doc(hidden)]
    pub fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(id.0)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn awaiting(&self) -> Option<&Awaiting> {
        self.awaiting.as_ref()
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<RobotId> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Final placings; empty until the game ends.
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Deadline of the running programming countdown.
    pub fn timer_deadline_ms(&self) -> Option<u64> {
        self.timer.deadline_ms()
    }

    /// Takes every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Robots the game can seat: the configured cap or the dock count,
    /// whichever is smaller.
    pub fn capacity(&self) -> usize {
        self.config.max_robots.min(self.board.docks.len())
    }

    fn find(&self, id: RobotId) -> Result<usize, GameError> {
        if id.0 < self.robots.len() {
            Ok(id.0)
        } else {
            Err(GameError::UnknownRobot(id))
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(?phase, turn = self.turn, "phase changed");
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged { phase });
    }

    /// Seats a robot on the next free dock.
    pub fn add_robot(&mut self, name: &str) -> Result<RobotId, GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::WrongPhase(self.phase));
        }
        let capacity = self.capacity();
        if self.robots.len() >= capacity {
            return Err(GameError::GameFull(capacity));
        }
        let id = RobotId(self.robots.len());
        let dock = self.board.docks[id.0];
        self.robots
            .push(Robot::new(id, name, dock, self.config.starting_lives));
        tracing::info!(robot = %id, name, %dock, "robot joined");
        Ok(id)
    }

    /// Leaves the waiting room and deals the first turn.
    pub fn start(&mut self, now_ms: u64) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::WrongPhase(self.phase));
        }
        if self.robots.is_empty() {
            return Err(GameError::NoRobots);
        }
        tracing::info!(board = %self.board.name, robots = self.robots.len(), "game starting");
        self.set_phase(Phase::Starting);
        self.begin_turn(now_ms);
        Ok(())
    }

    fn live_robot(&self, id: RobotId) -> Result<usize, GameError> {
        if matches!(self.phase, Phase::Waiting | Phase::Ended) {
            return Err(GameError::WrongPhase(self.phase));
        }
        let idx = self.find(id)?;
        if self.robots[idx].eliminated {
            return Err(GameError::Eliminated(id));
        }
        Ok(idx)
    }

    /// Announces a power-down that takes effect at the next deal.
    pub fn announce_power_down(&mut self, id: RobotId) -> Result<(), GameError> {
        let idx = self.live_robot(id)?;
        lifecycle::announce_power_down(&mut self.robots[idx], &mut self.events)
    }

    /// Withdraws an announcement made this turn.
    pub fn cancel_power_down(&mut self, id: RobotId) -> Result<(), GameError> {
        let idx = self.live_robot(id)?;
        lifecycle::cancel_power_down(&mut self.robots[idx], &mut self.events)
    }

    fn begin_turn(&mut self, now_ms: u64) {
        if self.phase == Phase::Ended {
            return;
        }
        if self.config.max_turns > 0 && self.turn >= self.config.max_turns {
            tracing::info!(turns = self.turn, "turn limit reached");
            self.end_game(None);
            return;
        }
        self.turn += 1;
        tracing::info!(turn = self.turn, "turn started");
        self.events.push(GameEvent::TurnStarted { turn: self.turn });

        let mut pending = Vec::new();
        for robot in self.robots.iter_mut().filter(|r| !r.eliminated) {
            robot.submitted = false;
            match robot.power {
                PowerState::Off if robot.is_alive() => pending.push(PendingDecision {
                    robot: robot.id,
                    deadline_ms: now_ms.saturating_add(self.config.power_down_timeout_ms),
                }),
                PowerState::Announcing if robot.is_alive() => {
                    lifecycle::enter_power_down(robot, &mut self.events)
                }
                _ => {}
            }
        }

        let withheld: Vec<u16> = self.robots.iter().flat_map(|r| r.locked_cards()).collect();
        self.deck = Deck::shuffled(&mut self.rng, &withheld);
        for idx in 0..self.robots.len() {
            if self.robots[idx].is_active() {
                self.deal(idx);
            } else {
                self.robots[idx].submitted = true;
            }
        }

        if pending.is_empty() {
            self.enter_programming(now_ms);
        } else {
            for p in &pending {
                self.events.push(GameEvent::PowerDownDecisionRequested {
                    robot: p.robot,
                    deadline_ms: p.deadline_ms,
                });
            }
            self.awaiting = Some(Awaiting::PowerDown(pending));
            self.set_phase(Phase::PowerDownDecision);
        }
    }

    fn deal(&mut self, idx: usize) {
        let robot = &mut self.robots[idx];
        robot.hand = self.deck.draw(robot.hand_size());
        // A locked register with no card in it gets one straight from the deck.
        for register in robot.first_locked_register()..REGISTER_COUNT {
            if robot.registers[register].is_none() {
                robot.registers[register] = self.deck.draw(1).pop();
            }
        }
        self.events.push(GameEvent::CardsDealt {
            robot: robot.id,
            cards: robot.hand.clone(),
        });
    }

    /// Answers the stay-powered-down question for this turn.
    pub fn decide_power_down(&mut self, id: RobotId, stay_off: bool, now_ms: u64) -> Result<(), GameError> {
        let idx = self.find(id)?;
        let Some(Awaiting::PowerDown(pending)) = &mut self.awaiting else {
            return Err(GameError::NoPendingDecision(id));
        };
        let slot = pending
            .iter()
            .position(|p| p.robot == id)
            .ok_or(GameError::NoPendingDecision(id))?;
        pending.remove(slot);
        let done = pending.is_empty();

        if stay_off {
            tracing::debug!(robot = %id, "staying powered down");
            self.robots[idx].submitted = true;
        } else {
            lifecycle::power_up(&mut self.robots[idx], &mut self.events);
            self.robots[idx].submitted = false;
            self.deal(idx);
        }
        if done {
            self.awaiting = None;
            self.enter_programming(now_ms);
        }
        Ok(())
    }

    fn enter_programming(&mut self, now_ms: u64) {
        self.timer.cancel();
        self.set_phase(Phase::Programming);
        self.check_programming(now_ms);
    }

    /// Starts execution once every active robot has submitted, otherwise
    /// gives the timer policy a chance to start the countdown.
    fn check_programming(&mut self, now_ms: u64) {
        let active = self.robots.iter().filter(|r| r.is_active()).count();
        let submitted = self
            .robots
            .iter()
            .filter(|r| r.is_active() && r.submitted)
            .count();
        if submitted == active {
            self.timer.cancel();
            self.start_execution(now_ms);
        } else {
            self.timer
                .maybe_start(now_ms, active, submitted, &mut self.events);
        }
    }

    /// Accepts a program. `program[i]` is the priority of the card for
    /// register `i`; locked registers must be left empty or repeat the
    /// locked card.
    pub fn submit_program(
        &mut self,
        id: RobotId,
        program: [Option<u16>; REGISTER_COUNT],
        now_ms: u64,
    ) -> Result<(), GameError> {
        if self.phase != Phase::Programming {
            return Err(GameError::WrongPhase(self.phase));
        }
        let idx = self.find(id)?;
        let robot = &self.robots[idx];
        if robot.eliminated {
            return Err(GameError::Eliminated(id));
        }
        if !robot.is_active() {
            return Err(GameError::NotActive(id));
        }
        if robot.submitted {
            return Err(GameError::AlreadySubmitted(id));
        }

        let mut registers = robot.registers;
        let mut seen: Vec<u16> = Vec::with_capacity(REGISTER_COUNT);
        for (register, slot) in program.iter().enumerate() {
            if robot.is_register_locked(register) {
                let locked = registers[register].map(|c| c.priority);
                if slot.is_some() && *slot != locked {
                    return Err(GameError::LockedRegister { robot: id, register });
                }
                continue;
            }
            registers[register] = match slot {
                None => None,
                Some(priority) => {
                    if seen.contains(priority) {
                        return Err(GameError::DuplicateCard(*priority));
                    }
                    seen.push(*priority);
                    let card = robot
                        .hand
                        .iter()
                        .find(|c| c.priority == *priority)
                        .ok_or(GameError::CardNotInHand {
                            robot: id,
                            priority: *priority,
                        })?;
                    Some(*card)
                }
            };
        }

        let robot = &mut self.robots[idx];
        robot.registers = registers;
        robot.submitted = true;
        tracing::debug!(robot = %id, "program submitted");
        self.events
            .push(GameEvent::ProgramSubmitted { robot: id, auto: false });
        self.check_programming(now_ms);
        Ok(())
    }

    /// Fills every empty unlocked register of unsubmitted robots with random
    /// cards from their own hands.
    fn auto_fill(&mut self) {
        for robot in self.robots.iter_mut() {
            if !robot.is_active() || robot.submitted {
                continue;
            }
            let used: Vec<u16> = robot.registers.iter().flatten().map(|c| c.priority).collect();
            let mut available: Vec<ProgramCard> = robot
                .hand
                .iter()
                .filter(|c| !used.contains(&c.priority))
                .copied()
                .collect();
            for register in 0..robot.first_locked_register() {
                if robot.registers[register].is_none() && !available.is_empty() {
                    let pick = self.rng.gen_range(0..available.len());
                    robot.registers[register] = Some(available.swap_remove(pick));
                }
            }
            robot.submitted = true;
            tracing::debug!(robot = %robot.id, "program auto-filled");
            self.events.push(GameEvent::ProgramSubmitted {
                robot: robot.id,
                auto: true,
            });
        }
    }

    fn start_execution(&mut self, now_ms: u64) {
        self.stage = Stage::Cards;
        self.set_phase(Phase::Executing { register: 0 });
        self.run(now_ms);
    }

    /// Drives register resolution until the turn ends, the game ends, or a
    /// decision is needed.
    fn run(&mut self, now_ms: u64) {
        loop {
            if self.awaiting.is_some() {
                return;
            }
            let Phase::Executing { register } = self.phase else {
                return;
            };
            match self.stage {
                Stage::Cards => {
                    self.execute_cards(register);
                    self.stage = Stage::Elements;
                }
                Stage::Elements => {
                    self.run_elements(register);
                    self.stage = Stage::Checkpoints;
                    self.fire_lasers(now_ms);
                }
                Stage::Checkpoints => {
                    let reached =
                        resolve::touch_checkpoints(&self.board, &mut self.robots, &mut self.events);
                    if let Some(idx) = reached {
                        let id = self.robots[idx].id;
                        self.end_game(Some(id));
                        return;
                    }
                    let everyone_down = self
                        .robots
                        .iter()
                        .filter(|r| !r.eliminated)
                        .all(|r| !r.is_alive());
                    if register + 1 < REGISTER_COUNT && !everyone_down {
                        self.stage = Stage::Cards;
                        self.set_phase(Phase::Executing {
                            register: register + 1,
                        });
                    } else {
                        self.end_turn(now_ms);
                        return;
                    }
                }
            }
            if self.check_last_standing() {
                return;
            }
        }
    }

    fn execute_cards(&mut self, register: usize) {
        for robot in self.robots.iter_mut() {
            for option in robot.options.iter_mut() {
                option.reset_register();
            }
        }
        let mut order: Vec<(usize, ProgramCard)> = self
            .robots
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_active())
            .filter_map(|(idx, r)| r.registers[register].map(|card| (idx, card)))
            .collect();
        order.sort_by(|a, b| b.1.priority.cmp(&a.1.priority));
        for (idx, card) in order {
            resolve::execute_card(&self.board, &mut self.robots, idx, card, register, &mut self.events);
        }
    }

    fn run_elements(&mut self, register: usize) {
        resolve::run_conveyors(&self.board, &mut self.robots, true, &mut self.events);
        resolve::run_conveyors(&self.board, &mut self.robots, false, &mut self.events);
        resolve::run_pushers(&self.board, &mut self.robots, register, &mut self.events);
        resolve::run_gears(&self.board, &mut self.robots, &mut self.events);
        resolve::run_pits(&self.board, &mut self.robots, &mut self.events);
    }

    /// Fires every laser, mitigates, and either applies damage at once or
    /// opens a discard offer.
    fn fire_lasers(&mut self, now_ms: u64) {
        let hits = resolve::fire_lasers(&self.board, &self.robots, &mut self.events);
        let mut by_target: BTreeMap<usize, Vec<Hit>> = BTreeMap::new();
        for hit in hits {
            by_target.entry(hit.target).or_default().push(hit);
        }

        let mut choices = Vec::new();
        for (idx, hits) in by_target {
            let robot = &mut self.robots[idx];
            if !robot.is_alive() {
                continue;
            }
            let mitigation = resolve::mitigate(robot, &hits, &mut self.events);
            if let Some(kind) = mitigation.spent {
                self.option_deck.insert(0, kind);
            }
            if mitigation.remaining() > 0 && robot.discardable_options() > 0 {
                let deadline_ms = now_ms.saturating_add(self.config.damage_choice_timeout_ms);
                self.events.push(GameEvent::DamageChoiceRequested {
                    robot: robot.id,
                    amount: mitigation.remaining(),
                    deadline_ms,
                });
                choices.push(DamageChoice::new(robot.id, &mitigation, deadline_ms));
            } else {
                resolve::apply_damage(
                    robot,
                    mitigation.requested,
                    mitigation.prevented,
                    &mut self.events,
                );
            }
        }
        if !choices.is_empty() {
            self.awaiting = Some(Awaiting::DamageChoices(choices));
        }
    }

    /// Discards the option at `index` to cancel 1 pending damage.
    pub fn discard_option(&mut self, id: RobotId, index: usize, now_ms: u64) -> Result<(), GameError> {
        let idx = self.find(id)?;
        let Some(Awaiting::DamageChoices(choices)) = &mut self.awaiting else {
            return Err(GameError::NoPendingDecision(id));
        };
        let choice = choices
            .iter_mut()
            .find(|c| c.robot == id && !c.settled)
            .ok_or(GameError::NoPendingDecision(id))?;
        let kind = choice.discard(&mut self.robots[idx], index, &mut self.events)?;
        self.option_deck.insert(0, kind);
        self.settle_damage(now_ms);
        Ok(())
    }

    /// Accepts the remaining pending damage without further discards.
    pub fn finish_damage_choice(&mut self, id: RobotId, now_ms: u64) -> Result<(), GameError> {
        self.find(id)?;
        let Some(Awaiting::DamageChoices(choices)) = &mut self.awaiting else {
            return Err(GameError::NoPendingDecision(id));
        };
        let choice = choices
            .iter_mut()
            .find(|c| c.robot == id && !c.settled)
            .ok_or(GameError::NoPendingDecision(id))?;
        choice.settled = true;
        self.settle_damage(now_ms);
        Ok(())
    }

    /// Applies the batch once every choice is settled and resumes.
    fn settle_damage(&mut self, now_ms: u64) {
        let done = matches!(
            &self.awaiting,
            Some(Awaiting::DamageChoices(choices)) if choices.iter().all(|c| c.settled)
        );
        if !done {
            return;
        }
        if let Some(Awaiting::DamageChoices(choices)) = self.awaiting.take() {
            for choice in &choices {
                choice.apply(&mut self.robots[choice.robot.0], &mut self.events);
            }
        }
        if self.check_last_standing() {
            return;
        }
        self.run(now_ms);
    }

    fn end_turn(&mut self, now_ms: u64) {
        resolve::run_repairs(
            &self.board,
            &mut self.robots,
            &mut self.option_deck,
            self.config.option_hand_cap,
            &mut self.events,
        );
        for robot in self.robots.iter_mut() {
            robot.clear_unlocked_registers();
            robot.hand.clear();
        }

        let pending: Vec<PendingDecision> = self
            .robots
            .iter()
            .filter(|r| r.dead && !r.eliminated)
            .map(|r| PendingDecision {
                robot: r.id,
                deadline_ms: now_ms.saturating_add(self.config.respawn_timeout_ms),
            })
            .collect();
        if pending.is_empty() {
            self.begin_turn(now_ms);
            return;
        }
        for p in &pending {
            self.events.push(GameEvent::RespawnRequested {
                robot: p.robot,
                deadline_ms: p.deadline_ms,
            });
        }
        self.awaiting = Some(Awaiting::Respawns(pending));
    }

    /// Puts a destroyed robot back on the board facing `facing`, optionally
    /// announcing a power-down for the coming turn.
    pub fn choose_respawn(
        &mut self,
        id: RobotId,
        facing: Direction,
        power_down: bool,
        now_ms: u64,
    ) -> Result<(), GameError> {
        let idx = self.find(id)?;
        let Some(Awaiting::Respawns(pending)) = &mut self.awaiting else {
            return Err(GameError::NoPendingDecision(id));
        };
        let slot = pending
            .iter()
            .position(|p| p.robot == id)
            .ok_or(GameError::NoPendingDecision(id))?;
        pending.remove(slot);
        let done = pending.is_empty();

        if resolve::respawn(&self.board, &mut self.robots, idx, facing, &mut self.events) {
            let robot = &mut self.robots[idx];
            let wanted = if power_down {
                PowerState::Announcing
            } else {
                PowerState::On
            };
            if robot.power != wanted {
                robot.power = wanted;
                self.events.push(GameEvent::PowerChanged {
                    robot: id,
                    power: wanted,
                });
            }
        }
        if done {
            self.awaiting = None;
            self.begin_turn(now_ms);
        }
        Ok(())
    }

    /// Advances time: expires overdue decisions and drives the programming
    /// countdown.
    pub fn tick(&mut self, now_ms: u64) {
        if self.phase == Phase::Ended {
            return;
        }
        let overdue = self
            .awaiting
            .as_ref()
            .map(|a| (mem::discriminant(a), a.expired(now_ms)));
        if let Some((kind, expired)) = overdue {
            for id in expired {
                // Resolving one decision can finish the batch and open a new
                // kind of wait with fresh deadlines.
                let same = self
                    .awaiting
                    .as_ref()
                    .is_some_and(|a| mem::discriminant(a) == kind);
                if !same {
                    break;
                }
                tracing::debug!(robot = %id, "decision timed out");
                let outcome = match self.awaiting {
                    Some(Awaiting::DamageChoices(_)) => self.finish_damage_choice(id, now_ms),
                    Some(Awaiting::Respawns(_)) => {
                        let facing = self.robots[id.0].facing;
                        self.choose_respawn(id, facing, false, now_ms)
                    }
                    Some(Awaiting::PowerDown(_)) => self.decide_power_down(id, false, now_ms),
                    None => Ok(()),
                };
                if let Err(e) = outcome {
                    tracing::warn!(robot = %id, error = %e, "timeout default rejected");
                }
            }
        }
        if self.phase == Phase::Programming
            && self.awaiting.is_none()
            && self.timer.poll(now_ms, &mut self.events)
        {
            tracing::info!(turn = self.turn, "programming timer expired");
            self.auto_fill();
            self.check_programming(now_ms);
        }
    }

    /// Ends the game if at most one robot is left in it. Games that started
    /// with a single robot only end when it is eliminated.
    fn check_last_standing(&mut self) -> bool {
        if self.phase == Phase::Ended {
            return true;
        }
        let remaining: Vec<RobotId> = self
            .robots
            .iter()
            .filter(|r| !r.eliminated)
            .map(|r| r.id)
            .collect();
        match remaining.as_slice() {
            [] => {
                self.end_game(None);
                true
            }
            [last] if self.robots.len() > 1 => {
                self.end_game(Some(*last));
                true
            }
            _ => false,
        }
    }

    fn end_game(&mut self, winner: Option<RobotId>) {
        self.awaiting = None;
        self.timer.cancel();
        self.winner = winner;
        self.standings = standings(&self.robots, winner);
        self.set_phase(Phase::Ended);
        tracing::info!(?winner, turn = self.turn, "game over");
        self.events.push(GameEvent::GameOver {
            winner,
            standings: self.standings.clone(),
        });
    }
}

/// Ranks robots: winner first, then checkpoints, survival, lives, and least
/// damage.
pub fn standings(robots: &[Robot], winner: Option<RobotId>) -> Vec<Standing> {
    let mut order: Vec<&Robot> = robots.iter().collect();
    order.sort_by_key(|r| {
        (
            Some(r.id) != winner,
            std::cmp::Reverse(r.checkpoint),
            r.eliminated,
            std::cmp::Reverse(r.lives),
            r.damage,
            r.id,
        )
    });
    order
        .into_iter()
        .enumerate()
        .map(|(i, r)| Standing {
            rank: i + 1,
            robot: r.id,
            name: r.name.clone(),
            checkpoints: r.checkpoint,
            lives: r.lives,
            damage: r.damage,
            eliminated: r.eliminated,
        })
        .collect()
}
