use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{BatchError, BatchResult};
use crate::research::current_year;
use crate::validation::Tier;

/// Default number of records per store write.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Default number of cities researched at once.
pub const DEFAULT_CITY_CONCURRENCY: usize = 1;

/// Iteration domain of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RunScope {
    AllCities,
    City {
        city_id: i64,
    },
    /// Question and pillar tiers for one pillar of one city.
    Pillar {
        city_id: i64,
        pillar_id: i64,
    },
    /// Question tier for one question of one city.
    Question {
        city_id: i64,
        pillar_id: Option<i64>,
        question_id: i64,
    },
}

impl RunScope {
    /// Builds a scope from optional identifiers as supplied by callers.
    pub fn from_parts(
        city_id: Option<i64>,
        pillar_id: Option<i64>,
        question_id: Option<i64>,
    ) -> BatchResult<Self> {
        match (city_id, pillar_id, question_id) {
            (None, None, None) => Ok(RunScope::AllCities),
            (None, _, _) => Err(BatchError::InvalidScope(
                "pillar_id and question_id require city_id",
            )),
            (Some(city_id), None, None) => Ok(RunScope::City { city_id }),
            (Some(city_id), Some(pillar_id), None) => Ok(RunScope::Pillar { city_id, pillar_id }),
            (Some(city_id), pillar_id, Some(question_id)) => Ok(RunScope::Question {
                city_id,
                pillar_id,
                question_id,
            }),
        }
    }

    pub fn city_id(&self) -> Option<i64> {
        match self {
            RunScope::AllCities => None,
            RunScope::City { city_id }
            | RunScope::Pillar { city_id, .. }
            | RunScope::Question { city_id, .. } => Some(*city_id),
        }
    }

    pub fn pillar_id(&self) -> Option<i64> {
        match self {
            RunScope::Pillar { pillar_id, .. } => Some(*pillar_id),
            RunScope::Question { pillar_id, .. } => *pillar_id,
            _ => None,
        }
    }

    pub fn question_id(&self) -> Option<i64> {
        match self {
            RunScope::Question { question_id, .. } => Some(*question_id),
            _ => None,
        }
    }

    /// Tiers this scope may run, before the configured [`TierSet`] is applied.
    pub fn allowed_tiers(&self) -> TierSet {
        match self {
            RunScope::AllCities | RunScope::City { .. } => TierSet::all(),
            RunScope::Pillar { .. } => TierSet::from_tiers([Tier::Question, Tier::Pillar]),
            RunScope::Question { .. } => TierSet::from_tiers([Tier::Question]),
        }
    }
}

impl fmt::Display for RunScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunScope::AllCities => f.write_str("all cities"),
            RunScope::City { city_id } => write!(f, "city {city_id}"),
            RunScope::Pillar { city_id, pillar_id } => {
                write!(f, "city {city_id} pillar {pillar_id}")
            }
            RunScope::Question {
                city_id,
                question_id,
                ..
            } => write!(f, "city {city_id} question {question_id}"),
        }
    }
}

/// Which tiers a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSet {
    pub question: bool,
    pub pillar: bool,
    pub city: bool,
}

impl Default for TierSet {
    fn default() -> Self {
        Self::all()
    }
}

impl TierSet {
    pub fn all() -> Self {
        Self {
            question: true,
            pillar: true,
            city: true,
        }
    }

    pub fn none() -> Self {
        Self {
            question: false,
            pillar: false,
            city: false,
        }
    }

    pub fn from_tiers(tiers: impl IntoIterator<Item = Tier>) -> Self {
        tiers.into_iter().fold(Self::none(), |mut set, tier| {
            match tier {
                Tier::Question => set.question = true,
                Tier::Pillar => set.pillar = true,
                Tier::City => set.city = true,
            }
            set
        })
    }

    pub fn contains(&self, tier: Tier) -> bool {
        match tier {
            Tier::Question => self.question,
            Tier::Pillar => self.pillar,
            Tier::City => self.city,
        }
    }

    pub fn intersect(&self, other: TierSet) -> TierSet {
        TierSet {
            question: self.question && other.question,
            pillar: self.pillar && other.pillar,
            city: self.city && other.city,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.question || self.pillar || self.city)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Records per store write; at least 1.
    pub chunk_size: usize,
    /// Cities researched concurrently; at least 1.
    pub city_concurrency: usize,
    pub tiers: TierSet,
    /// Assessment year stamped on every record.
    pub year: i32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            city_concurrency: DEFAULT_CITY_CONCURRENCY,
            tiers: TierSet::all(),
            year: current_year(),
        }
    }
}

/// One researchable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum EntityId {
    Question {
        city_id: i64,
        pillar_id: i64,
        question_id: i64,
    },
    Pillar {
        city_id: i64,
        pillar_id: i64,
    },
    City {
        city_id: i64,
    },
}

impl EntityId {
    pub fn tier(&self) -> Tier {
        match self {
            EntityId::Question { .. } => Tier::Question,
            EntityId::Pillar { .. } => Tier::Pillar,
            EntityId::City { .. } => Tier::City,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Question {
                city_id,
                pillar_id,
                question_id,
            } => write!(f, "question {question_id} (city {city_id}, pillar {pillar_id})"),
            EntityId::Pillar { city_id, pillar_id } => {
                write!(f, "pillar {pillar_id} (city {city_id})")
            }
            EntityId::City { city_id } => write!(f, "city {city_id}"),
        }
    }
}

/// Per-entity lifecycle: `Pending -> Researching -> Succeeded | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EntityState {
    Pending,
    Researching,
    Succeeded,
    Failed { error: String },
}

impl EntityState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntityState::Succeeded | EntityState::Failed { .. })
    }
}

/// An entity and where it is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(flatten)]
    pub state: EntityState,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            state: EntityState::Pending,
        }
    }

    /// `Pending -> Researching`. Returns `false` from any other state.
    pub fn start(&mut self) -> bool {
        self.advance(EntityState::Pending, EntityState::Researching)
    }

    /// `Researching -> Succeeded`.
    pub fn succeed(&mut self) -> bool {
        self.advance(EntityState::Researching, EntityState::Succeeded)
    }

    /// `Researching -> Failed`.
    pub fn fail(&mut self, error: impl ToString) -> bool {
        self.advance(
            EntityState::Researching,
            EntityState::Failed {
                error: error.to_string(),
            },
        )
    }

    fn advance(&mut self, from: EntityState, to: EntityState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub succeeded: u32,
    pub failed: u32,
}

impl TierCounts {
    fn merge(&mut self, other: TierCounts) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub scope: RunScope,
    pub year: i32,
    pub cities: usize,
    pub questions: TierCounts,
    pub pillars: TierCounts,
    pub city_syntheses: TierCounts,
    /// Evaluation rows acknowledged by the store.
    pub rows_written: u64,
    /// Evaluation rows lost to failed flushes.
    pub rows_dropped: u64,
    pub flush_failures: u32,
    /// Terminal state of every attempted entity, ordered by id.
    pub entities: Vec<Entity>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new(scope: RunScope, year: i32) -> Self {
        Self {
            scope,
            year,
            cities: 0,
            questions: TierCounts::default(),
            pillars: TierCounts::default(),
            city_syntheses: TierCounts::default(),
            rows_written: 0,
            rows_dropped: 0,
            flush_failures: 0,
            entities: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// True iff at least one entity succeeded.
    pub fn success(&self) -> bool {
        self.questions.succeeded + self.pillars.succeeded + self.city_syntheses.succeeded > 0
    }

    pub fn counts(&self, tier: Tier) -> TierCounts {
        match tier {
            Tier::Question => self.questions,
            Tier::Pillar => self.pillars,
            Tier::City => self.city_syntheses,
        }
    }

    pub fn state_of(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.iter().find(|e| e.id == id).map(|e| &e.state)
    }

    /// Records a terminal entity and updates its tier counts.
    pub(crate) fn record(&mut self, entity: Entity) {
        let counts = match entity.id.tier() {
            Tier::Question => &mut self.questions,
            Tier::Pillar => &mut self.pillars,
            Tier::City => &mut self.city_syntheses,
        };
        match entity.state {
            EntityState::Succeeded => counts.succeeded += 1,
            EntityState::Failed { .. } => counts.failed += 1,
            EntityState::Pending | EntityState::Researching => {}
        }
        self.entities.push(entity);
    }

    pub(crate) fn merge(&mut self, other: RunReport) {
        self.cities += other.cities;
        self.questions.merge(other.questions);
        self.pillars.merge(other.pillars);
        self.city_syntheses.merge(other.city_syntheses);
        self.rows_written += other.rows_written;
        self.rows_dropped += other.rows_dropped;
        self.flush_failures += other.flush_failures;
        self.entities.extend(other.entities);
    }

    pub(crate) fn finish(&mut self) {
        self.entities.sort_by_key(|e| e.id);
        self.finished_at = Some(Utc::now());
    }
}
