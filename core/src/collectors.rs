//! Choice collectors
//!
//! One collector per selection shape. Every mutation is checked first and
//! applied only when it passes, so a rejected action leaves the collector
//! exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::FlowConfig;
use crate::error::{GameError, GameResult};
use crate::types::{ChoiceId, ChoiceOption, Phase, PhaseChoices};

/// A phase selection ready to be sent with `/api/phaseN/choose`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum PhaseSelection {
    /// Phase 1 character
    Approach { choice_id: ChoiceId },
    /// Phase 2 solutions in priority order
    Priorities { solution_ids: Vec<ChoiceId> },
    /// Phase 3 facilitator per category
    Facilitators { choices: BTreeMap<String, ChoiceId> },
    /// Phase 4 enablers and their summed cost
    Enablers {
        enabler_ids: Vec<ChoiceId>,
        total_cost: u32,
    },
    /// Phase 5 deployment strategy
    Deployment { choice_id: ChoiceId },
}

impl PhaseSelection {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseSelection::Approach { .. } => Phase::One,
            PhaseSelection::Priorities { .. } => Phase::Two,
            PhaseSelection::Facilitators { .. } => Phase::Three,
            PhaseSelection::Enablers { .. } => Phase::Four,
            PhaseSelection::Deployment { .. } => Phase::Five,
        }
    }

    /// JSON body of the confirm request
    pub fn body(&self) -> Value {
        match self {
            // Older backends read `character_id` for phase 1
            PhaseSelection::Approach { choice_id } => {
                json!({ "choice_id": choice_id, "character_id": choice_id })
            }
            PhaseSelection::Priorities { solution_ids } => json!({ "solution_ids": solution_ids }),
            PhaseSelection::Facilitators { choices } => json!({ "choices": choices }),
            PhaseSelection::Enablers { enabler_ids, .. } => json!({ "enabler_ids": enabler_ids }),
            PhaseSelection::Deployment { choice_id } => json!({ "choice_id": choice_id }),
        }
    }

    /// Id used to pick character-specific feedback
    pub fn primary_choice(&self) -> Option<&str> {
        match self {
            PhaseSelection::Approach { choice_id } | PhaseSelection::Deployment { choice_id } => {
                Some(choice_id)
            }
            _ => None,
        }
    }
}

fn ensure_known(options: &[ChoiceOption], id: &str) -> GameResult<()> {
    if options.iter().any(|o| o.id == id) {
        Ok(())
    } else {
        Err(GameError::UnknownChoice { id: id.to_string() })
    }
}

/// At most one active choice. Phases 1 and 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelect {
    options: Vec<ChoiceOption>,
    selected: Option<ChoiceId>,
}

impl SingleSelect {
    pub fn new(options: Vec<ChoiceOption>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Selecting a new id replaces the previous one
    pub fn select(&mut self, id: &str) -> GameResult<()> {
        ensure_known(&self.options, id)?;
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.selected.is_some()
    }
}

/// Ordered assignment of distinct ids to a fixed number of slots. Phase 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritySlots {
    options: Vec<ChoiceOption>,
    slots: Vec<Option<ChoiceId>>,
}

impl PrioritySlots {
    pub fn new(options: Vec<ChoiceOption>, slot_count: usize) -> Self {
        Self {
            options,
            slots: vec![None; slot_count],
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn slots(&self) -> &[Option<ChoiceId>] {
        &self.slots
    }

    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.as_deref() == Some(id))
    }

    /// Put `id` into `slot`. The slot must be empty and the id not used elsewhere.
    pub fn assign(&mut self, slot: usize, id: &str) -> GameResult<()> {
        ensure_known(&self.options, id)?;
        let target = self.slots.get(slot).ok_or(GameError::InvalidSlot { slot })?;
        if target.is_some() {
            return Err(GameError::SlotOccupied { slot });
        }
        if self.slot_of(id).is_some() {
            return Err(GameError::DuplicateChoice { id: id.to_string() });
        }
        self.slots[slot] = Some(id.to_string());
        Ok(())
    }

    pub fn clear_slot(&mut self, slot: usize) -> GameResult<Option<ChoiceId>> {
        let target = self
            .slots
            .get_mut(slot)
            .ok_or(GameError::InvalidSlot { slot })?;
        Ok(target.take())
    }

    /// Click-style selection: removes `id` if present, otherwise fills the first free slot
    pub fn toggle(&mut self, id: &str) -> GameResult<()> {
        ensure_known(&self.options, id)?;
        if let Some(slot) = self.slot_of(id) {
            self.slots[slot] = None;
            return Ok(());
        }
        match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(id.to_string());
                Ok(())
            }
            None => Err(GameError::SelectionFull {
                max: self.slots.len(),
            }),
        }
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled() == self.slots.len()
    }

    pub fn is_valid(&self) -> bool {
        // assign() keeps ids distinct, a full set is therefore valid
        !self.slots.is_empty() && self.is_full()
    }

    fn ordered_ids(&self) -> Vec<ChoiceId> {
        self.slots.iter().flatten().cloned().collect()
    }
}

/// Exactly one id per category key. Phase 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPicks {
    options: BTreeMap<String, Vec<ChoiceOption>>,
    picks: BTreeMap<String, ChoiceId>,
}

impl CategoryPicks {
    pub fn new(options: BTreeMap<String, Vec<ChoiceOption>>) -> Self {
        Self {
            options,
            picks: BTreeMap::new(),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn options(&self) -> &BTreeMap<String, Vec<ChoiceOption>> {
        &self.options
    }

    pub fn pick(&self, category: &str) -> Option<&str> {
        self.picks.get(category).map(String::as_str)
    }

    /// Overwrites any earlier pick in the same category
    pub fn select(&mut self, category: &str, id: &str) -> GameResult<()> {
        let offered = self
            .options
            .get(category)
            .ok_or_else(|| GameError::UnknownCategory {
                category: category.to_string(),
            })?;
        ensure_known(offered, id)?;
        self.picks.insert(category.to_string(), id.to_string());
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.options.is_empty() && self.options.keys().all(|k| self.picks.contains_key(k))
    }
}

/// Toggle multi-select under a cost ceiling. Phase 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetPicks {
    options: Vec<ChoiceOption>,
    selected: Vec<ChoiceId>,
    spent: u32,
    ceiling: u32,
}

impl BudgetPicks {
    pub fn new(options: Vec<ChoiceOption>, ceiling: u32) -> Self {
        Self {
            options,
            selected: Vec::new(),
            spent: 0,
            ceiling,
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn selected(&self) -> &[ChoiceId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.spent)
    }

    fn cost_of(&self, id: &str) -> GameResult<u32> {
        self.options
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.cost.unwrap_or(0))
            .ok_or_else(|| GameError::UnknownChoice { id: id.to_string() })
    }

    /// Whether adding `id` would still fit under the ceiling
    pub fn fits(&self, id: &str) -> bool {
        self.is_selected(id)
            || self
                .cost_of(id)
                .is_ok_and(|cost| self.spent_with(cost).is_some())
    }

    /// Total after adding `cost`, `None` past the ceiling
    fn spent_with(&self, cost: u32) -> Option<u32> {
        self.spent
            .checked_add(cost)
            .filter(|total| *total <= self.ceiling)
    }

    pub fn toggle(&mut self, id: &str) -> GameResult<()> {
        let cost = self.cost_of(id)?;
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            self.spent -= cost;
            return Ok(());
        }
        let total = self.spent_with(cost).ok_or(GameError::BudgetExceeded {
            spent: self.spent,
            cost,
            ceiling: self.ceiling,
        })?;
        self.selected.push(id.to_string());
        self.spent = total;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.spent > 0 && self.spent <= self.ceiling
    }
}

/// The collector active on a phase screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collector {
    Single { phase: Phase, picks: SingleSelect },
    Priorities(PrioritySlots),
    Categories(CategoryPicks),
    Budget(BudgetPicks),
}

impl Collector {
    /// Build the collector for `phase` from the served choices
    pub fn for_phase(phase: Phase, choices: PhaseChoices, config: &FlowConfig) -> Self {
        match phase {
            Phase::One | Phase::Five => Collector::Single {
                phase,
                picks: SingleSelect::new(flatten(choices)),
            },
            Phase::Two => Collector::Priorities(PrioritySlots::new(
                flatten(choices),
                config.priority_slots,
            )),
            Phase::Three => Collector::Categories(CategoryPicks::new(by_category(choices))),
            Phase::Four => Collector::Budget(BudgetPicks::new(
                flatten(choices),
                config.budget_ceiling,
            )),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Collector::Single { phase, .. } => *phase,
            Collector::Priorities(_) => Phase::Two,
            Collector::Categories(_) => Phase::Three,
            Collector::Budget(_) => Phase::Four,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Collector::Single { picks, .. } => picks.is_valid(),
            Collector::Priorities(slots) => slots.is_valid(),
            Collector::Categories(picks) => picks.is_valid(),
            Collector::Budget(picks) => picks.is_valid(),
        }
    }

    /// The selection to confirm, or `IncompleteSelection` while the shape is unmet
    pub fn selection(&self) -> GameResult<PhaseSelection> {
        if !self.is_valid() {
            return Err(GameError::IncompleteSelection);
        }
        let selection = match self {
            Collector::Single { phase, picks } => {
                let choice_id = picks
                    .selected()
                    .ok_or(GameError::IncompleteSelection)?
                    .to_string();
                if *phase == Phase::One {
                    PhaseSelection::Approach { choice_id }
                } else {
                    PhaseSelection::Deployment { choice_id }
                }
            }
            Collector::Priorities(slots) => PhaseSelection::Priorities {
                solution_ids: slots.ordered_ids(),
            },
            Collector::Categories(picks) => PhaseSelection::Facilitators {
                choices: picks.picks.clone(),
            },
            Collector::Budget(picks) => PhaseSelection::Enablers {
                enabler_ids: picks.selected.clone(),
                total_cost: picks.spent,
            },
        };
        Ok(selection)
    }
}

fn flatten(choices: PhaseChoices) -> Vec<ChoiceOption> {
    match choices {
        PhaseChoices::List(options) => options,
        PhaseChoices::ByCategory(groups) => groups
            .into_iter()
            .flat_map(|(category, options)| {
                options.into_iter().map(move |mut o| {
                    o.category.get_or_insert_with(|| category.clone());
                    o
                })
            })
            .collect(),
    }
}

fn by_category(choices: PhaseChoices) -> BTreeMap<String, Vec<ChoiceOption>> {
    match choices {
        PhaseChoices::ByCategory(groups) => groups,
        PhaseChoices::List(options) => {
            let mut groups: BTreeMap<String, Vec<ChoiceOption>> = BTreeMap::new();
            for option in options {
                if let Some(category) = option.category.clone() {
                    groups.entry(category).or_default().push(option);
                }
            }
            groups
        }
    }
}
