use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{MAX_PHASE_SCORE, PHASE_COUNT};

/// Backend identifier of a choice (character, solution, facilitator, enabler...)
pub type ChoiceId = String;

/// One of the five decision rounds, in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] = [Phase::One, Phase::Two, Phase::Three, Phase::Four, Phase::Five];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Phase> {
        match number {
            1 => Some(Phase::One),
            2 => Some(Phase::Two),
            3 => Some(Phase::Three),
            4 => Some(Phase::Four),
            5 => Some(Phase::Five),
            _ => None,
        }
    }

    /// Following phase, `None` after phase 5
    pub fn next(self) -> Option<Phase> {
        Phase::from_number(self.number() + 1)
    }

    pub fn is_last(self) -> bool {
        self == Phase::Five
    }

    /// Key used by the backend score map (`mot1`..`mot5`)
    pub fn score_key(self) -> &'static str {
        match self {
            Phase::One => "mot1",
            Phase::Two => "mot2",
            Phase::Three => "mot3",
            Phase::Four => "mot4",
            Phase::Five => "mot5",
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Phase::from_number(number).ok_or_else(|| format!("no such phase: {}", number))
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> u8 {
        phase.number()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A selectable item as served by `/api/phaseN/choices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: ChoiceId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Budget cost, phase 4 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl ChoiceOption {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: None,
            cost: None,
            feasibility: None,
            impact: None,
        }
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Phase-shaped choice payload: a flat list, or lists keyed by category (phase 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhaseChoices {
    List(Vec<ChoiceOption>),
    ByCategory(BTreeMap<String, Vec<ChoiceOption>>),
}

/// Per-phase scores plus their total, as computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(default)]
    pub scores: BTreeMap<String, u8>,
    #[serde(default)]
    pub total: u8,
}

impl ScoreRecord {
    /// Score of one phase, 0 when the backend has not scored it yet
    pub fn phase_score(&self, phase: Phase) -> u8 {
        self.scores
            .get(phase.score_key())
            .copied()
            .unwrap_or(0)
            .min(MAX_PHASE_SCORE)
    }
}

/// One row of the Kahoot-mode leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub stars: u8,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mot_scores: BTreeMap<String, u8>,
}

/// The backend's record of what has been chosen so far (`current_path`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePath {
    #[serde(default)]
    pub mot1_choice: Option<String>,
    #[serde(default)]
    pub mot2_choices: Vec<String>,
    #[serde(default)]
    pub mot3_choices: BTreeMap<String, String>,
    #[serde(default)]
    pub mot4_choices: Vec<String>,
    #[serde(default)]
    pub mot5_choice: Option<String>,
}

impl GamePath {
    /// Whether the choice field belonging to `phase` holds anything
    pub fn is_populated(&self, phase: Phase) -> bool {
        fn filled(choice: &Option<String>) -> bool {
            choice.as_deref().is_some_and(|c| !c.is_empty())
        }
        match phase {
            Phase::One => filled(&self.mot1_choice),
            Phase::Two => !self.mot2_choices.is_empty(),
            Phase::Three => !self.mot3_choices.is_empty(),
            Phase::Four => !self.mot4_choices.is_empty(),
            Phase::Five => filled(&self.mot5_choice),
        }
    }

    pub fn is_empty(&self) -> bool {
        !Phase::ALL.iter().any(|&phase| self.is_populated(phase))
    }
}

/// The three fixed columns of the executive dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashboardCategory {
    Technology,
    Governance,
    People,
}

impl DashboardCategory {
    pub const ALL: [DashboardCategory; 3] = [
        DashboardCategory::Technology,
        DashboardCategory::Governance,
        DashboardCategory::People,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardCategory::Technology => "Technology",
            DashboardCategory::Governance => "Governance",
            DashboardCategory::People => "People",
        }
    }

    /// Map a backend category key onto a dashboard column
    pub fn classify(key: &str) -> Option<DashboardCategory> {
        match key.trim().to_ascii_lowercase().as_str() {
            "technology" | "tech" | "platform_partnerships" => Some(DashboardCategory::Technology),
            "governance" | "policies_practices" => Some(DashboardCategory::Governance),
            "people" | "people_processes" => Some(DashboardCategory::People),
            _ => None,
        }
    }
}

/// An enabler or use-case reported as unlocked by `/api/executive_dashboard`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// Phase whose confirmation unlocked the item
    pub phase: u8,
}

/// Whether a dashboard entry is an enabler or a use-case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnlockKind {
    Enabler,
    UseCase,
}

/// Raw `/api/executive_dashboard` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveDashboard {
    #[serde(default)]
    pub enablers: Vec<UnlockedItem>,
    #[serde(default)]
    pub use_cases: Vec<UnlockedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardEntry {
    pub id: String,
    pub title: String,
    pub kind: UnlockKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardColumn {
    pub category: DashboardCategory,
    pub label: String,
    pub entries: Vec<DashboardEntry>,
}

/// Items newly unlocked by one phase, split into the three columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub phase: Phase,
    pub columns: Vec<DashboardColumn>,
}

impl ExecutiveDashboard {
    /// Entries unlocked by `phase`. Items whose category maps to no column are dropped.
    pub fn unlocked_in(&self, phase: Phase) -> DashboardSummary {
        let tagged = self
            .enablers
            .iter()
            .map(|item| (item, UnlockKind::Enabler))
            .chain(self.use_cases.iter().map(|item| (item, UnlockKind::UseCase)));

        let mut columns: Vec<DashboardColumn> = DashboardCategory::ALL
            .iter()
            .map(|&category| DashboardColumn {
                category,
                label: category.label().to_string(),
                entries: Vec::new(),
            })
            .collect();

        for (item, kind) in tagged.filter(|(item, _)| item.phase == phase.number()) {
            let Some(category) = DashboardCategory::classify(&item.category) else {
                continue;
            };
            if let Some(column) = columns.iter_mut().find(|c| c.category == category) {
                column.entries.push(DashboardEntry {
                    id: item.id.clone(),
                    title: if item.title.is_empty() {
                        item.id.clone()
                    } else {
                        item.title.clone()
                    },
                    kind,
                });
            }
        }

        DashboardSummary { phase, columns }
    }
}
