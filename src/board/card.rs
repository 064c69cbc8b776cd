//! Program cards and the program deck.
//!
//! Every card has a unique priority, which doubles as its identity: commands
//! refer to cards by priority and the register executor orders them by it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of cards in the standard program deck.
pub const DECK_SIZE: usize = 84;

/// The movement or rotation a program card performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    UTurn,
    RotateLeft,
    RotateRight,
    BackUp,
    Move1,
    Move2,
    Move3,
}

impl CardAction {
    /// Number of forward steps, or 0 for rotations and back-up.
    pub const fn forward_steps(self) -> u8 {
        match self {
            CardAction::Move1 => 1,
            CardAction::Move2 => 2,
            CardAction::Move3 => 3,
            _ => 0,
        }
    }

    /// Quarter turns clockwise applied by this card (0 for movement cards).
    pub const fn quarter_turns(self) -> u8 {
        match self {
            CardAction::RotateRight => 1,
            CardAction::UTurn => 2,
            CardAction::RotateLeft => 3,
            _ => 0,
        }
    }

    pub const fn is_rotation(self) -> bool {
        self.quarter_turns() != 0
    }
}

/// A single program card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramCard {
    pub priority: u16,
    pub action: CardAction,
}

impl ProgramCard {
    pub const fn new(priority: u16, action: CardAction) -> Self {
        ProgramCard { priority, action }
    }

    /// Looks up a card of the standard deck by its priority.
    pub fn from_priority(priority: u16) -> Option<ProgramCard> {
        standard_deck().into_iter().find(|c| c.priority == priority)
    }
}

/// (action, copies, first priority, priority step) for each run of the deck.
const DECK_RUNS: [(CardAction, u16, u16, u16); 7] = [
    (CardAction::UTurn, 6, 10, 10),
    (CardAction::RotateLeft, 18, 70, 20),
    (CardAction::RotateRight, 18, 80, 20),
    (CardAction::BackUp, 6, 430, 10),
    (CardAction::Move1, 18, 490, 10),
    (CardAction::Move2, 12, 670, 10),
    (CardAction::Move3, 6, 790, 10),
];

/// Builds the 84-card standard deck in ascending priority order per run.
pub fn standard_deck() -> Vec<ProgramCard> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for (action, copies, first, step) in DECK_RUNS {
        for i in 0..copies {
            cards.push(ProgramCard::new(first + i * step, action));
        }
    }
    cards
}

/// A shuffled draw pile.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<ProgramCard>,
}

impl Deck {
    /// Builds a shuffled deck from the standard cards minus `withheld`
    /// priorities (cards locked in registers stay out of the pile).
    pub fn shuffled<R: Rng>(rng: &mut R, withheld: &[u16]) -> Self {
        let mut cards: Vec<ProgramCard> = standard_deck()
            .into_iter()
            .filter(|c| !withheld.contains(&c.priority))
            .collect();
        cards.shuffle(rng);
        Deck { cards }
    }

    /// Draws up to `count` cards from the top.
    pub fn draw(&mut self, count: usize) -> Vec<ProgramCard> {
        let take = count.min(self.cards.len());
        self.cards.split_off(self.cards.len() - take)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
