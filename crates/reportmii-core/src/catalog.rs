//! Compiled-in question catalogs.
//!
//! A catalog is an ordered list of topic block templates. Two catalogs ship
//! with the product: the business analysis and the team (inside) analysis.
//! Templates are immutable; sessions copy them into [`crate::blocks::Block`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WizardError;

/// Number of catalog blocks a new analysis starts with switched on.
pub const DEFAULT_ACTIVE_BLOCKS: usize = 6;

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Integer rating from 1 to 5.
    Scale,
    /// Free text.
    Text,
    /// One of the question's declared options.
    MultipleChoice,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Scale => write!(f, "scale"),
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
        }
    }
}

/// A single question inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub kind: QuestionKind,
    /// Allowed answers, only meaningful for [`QuestionKind::MultipleChoice`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Whether the question counts toward the block's headline score.
    #[serde(default)]
    pub is_primary: bool,
}

impl Question {
    /// Primary 1-5 rating question.
    pub fn scale(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Scale,
            options: Vec::new(),
            is_primary: true,
        }
    }

    /// Supplementary free-text question.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Text,
            options: Vec::new(),
            is_primary: false,
        }
    }

    /// Supplementary multiple choice question.
    pub fn choice<I, S>(text: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            kind: QuestionKind::MultipleChoice,
            options: options.into_iter().map(Into::into).collect(),
            is_primary: false,
        }
    }
}

/// A topic block as defined by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl BlockTemplate {
    fn new(id: &str, title: &str, description: &str, questions: Vec<Question>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            questions,
        }
    }
}

/// Which catalog an analysis is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    #[default]
    Business,
    Team,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Business => "business",
            CatalogKind::Team => "team",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(CatalogKind::Business),
            "team" | "inside" => Ok(CatalogKind::Team),
            other => Err(WizardError::InvalidCatalogKind(other.to_string())),
        }
    }
}

/// Return the block templates of a catalog, in display order.
pub fn get_catalog(kind: CatalogKind) -> Vec<BlockTemplate> {
    match kind {
        CatalogKind::Business => business_catalog(),
        CatalogKind::Team => team_catalog(),
    }
}

/// Look up a catalog by name.
///
/// # Errors
/// Returns [`WizardError::InvalidCatalogKind`] for names that match no catalog.
pub fn get_catalog_by_name(name: &str) -> Result<Vec<BlockTemplate>, WizardError> {
    Ok(get_catalog(name.parse()?))
}

fn business_catalog() -> Vec<BlockTemplate> {
    vec![
        BlockTemplate::new(
            "business-strategy",
            "Strategy & Vision",
            "How clearly the company knows where it is heading",
            vec![
                Question::scale("Our long-term vision is written down and known to every employee."),
                Question::scale("Annual goals are derived from the strategy and measurable."),
                Question::scale("We review our strategy at least once a year."),
                Question::choice(
                    "Who owns the strategy process?",
                    ["Founders", "Management team", "External advisors", "Nobody explicitly"],
                ),
                Question::text("What is the single biggest strategic risk right now?"),
            ],
        ),
        BlockTemplate::new(
            "business-finance",
            "Finance & Controlling",
            "Liquidity, planning and financial transparency",
            vec![
                Question::scale("We know our liquidity position for the next three months."),
                Question::scale("Budgets exist for every department and are tracked monthly."),
                Question::scale("Margins per product or service are known."),
                Question::choice(
                    "How is bookkeeping handled?",
                    ["In-house", "Tax advisor", "Mixed"],
                ),
                Question::text("Which financial figure would you like to understand better?"),
            ],
        ),
        BlockTemplate::new(
            "business-marketing",
            "Marketing & Sales",
            "Reaching customers and turning them into revenue",
            vec![
                Question::scale("Our target customers are clearly defined."),
                Question::scale("We measure which channels bring in new customers."),
                Question::scale("The sales process is documented and repeatable."),
                Question::choice(
                    "Main acquisition channel",
                    ["Referrals", "Online marketing", "Trade fairs", "Outbound sales"],
                ),
                Question::text("Describe your most successful campaign of the last year."),
            ],
        ),
        BlockTemplate::new(
            "business-operations",
            "Processes & Operations",
            "How efficiently daily work gets done",
            vec![
                Question::scale("Core processes are documented."),
                Question::scale("Bottlenecks are identified and actively worked on."),
                Question::scale("Quality problems are caught before reaching the customer."),
                Question::text("Which process costs the most time today?"),
            ],
        ),
        BlockTemplate::new(
            "business-people",
            "People & Leadership",
            "Team, culture and leadership quality",
            vec![
                Question::scale("Roles and responsibilities are clear to everyone."),
                Question::scale("Employees receive regular feedback."),
                Question::scale("We manage to hire the people we need."),
                Question::choice(
                    "Average tenure of employees",
                    ["Under 1 year", "1-3 years", "3-5 years", "Over 5 years"],
                ),
                Question::text("What would employees change first if they could?"),
            ],
        ),
        BlockTemplate::new(
            "business-digital",
            "Digitalisation & IT",
            "Tooling, data and automation",
            vec![
                Question::scale("Our software tools fit our processes."),
                Question::scale("Data is available where decisions are made."),
                Question::scale("Repetitive tasks are automated."),
                Question::text("Which tool or system frustrates the team most?"),
            ],
        ),
        BlockTemplate::new(
            "business-customers",
            "Customer Experience",
            "Satisfaction, loyalty and service",
            vec![
                Question::scale("We regularly measure customer satisfaction."),
                Question::scale("Complaints are handled within a defined time."),
                Question::scale("Customers buy from us repeatedly."),
                Question::text("What do customers praise most often?"),
            ],
        ),
        BlockTemplate::new(
            "business-sustainability",
            "Sustainability & Risk",
            "Resilience, compliance and environmental impact",
            vec![
                Question::scale("Key risks are documented together with countermeasures."),
                Question::scale("We could continue operating if a key person left."),
                Question::scale("Environmental impact is considered in purchasing decisions."),
                Question::choice(
                    "Is there an emergency plan?",
                    ["Yes, tested", "Yes, untested", "No"],
                ),
            ],
        ),
    ]
}

fn team_catalog() -> Vec<BlockTemplate> {
    vec![
        BlockTemplate::new(
            "team-communication",
            "Communication",
            "How information flows inside the team",
            vec![
                Question::scale("I get the information I need to do my job."),
                Question::scale("Meetings are useful and well prepared."),
                Question::scale("I can voice disagreement openly."),
                Question::text("What should we communicate differently?"),
            ],
        ),
        BlockTemplate::new(
            "team-collaboration",
            "Collaboration",
            "Working together across roles",
            vec![
                Question::scale("Colleagues help each other without being asked."),
                Question::scale("Hand-overs between teams work smoothly."),
                Question::scale("Conflicts are resolved constructively."),
            ],
        ),
        BlockTemplate::new(
            "team-leadership",
            "Leadership",
            "How the team experiences its leads",
            vec![
                Question::scale("My lead gives me clear priorities."),
                Question::scale("I receive recognition for good work."),
                Question::scale("Decisions are explained to the team."),
                Question::choice(
                    "How often do you have one-on-ones?",
                    ["Weekly", "Monthly", "Rarely", "Never"],
                ),
            ],
        ),
        BlockTemplate::new(
            "team-workload",
            "Workload & Wellbeing",
            "Stress, balance and sustainable pace",
            vec![
                Question::scale("My workload is manageable within normal hours."),
                Question::scale("I can switch off after work."),
                Question::scale("Sick days are respected without pressure."),
                Question::text("What drains your energy the most?"),
            ],
        ),
        BlockTemplate::new(
            "team-growth",
            "Growth & Learning",
            "Development opportunities",
            vec![
                Question::scale("I learned something valuable in the last three months."),
                Question::scale("There is a budget and time for training."),
                Question::scale("I can see a career path for myself here."),
            ],
        ),
        BlockTemplate::new(
            "team-purpose",
            "Purpose & Identification",
            "Connection to the company's mission",
            vec![
                Question::scale("I understand how my work contributes to company goals."),
                Question::scale("I would recommend this company as an employer."),
                Question::scale("I expect to still work here in two years."),
                Question::text("What makes you proud of working here?"),
            ],
        ),
    ]
}
