// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The reporting window: a week-of-year or month-of-year, together with the year.
///
/// The engine never interprets the index. Whether it counts weeks or months is
/// decided by the deployment (see `PeriodKind`).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Period {
    pub index: u32,
    pub year: i32,
}

impl Period {
    pub fn new(index: u32, year: i32) -> Period {
        Period { index, year }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.index)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PeriodKind {
    Week,
    Month,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Section {
    pub slug: String,
    pub title: String,
    pub order: i32,
    pub active: bool,
}

/// All the kinds of questions the survey can ask.
///
/// Demographic questions are single choice questions and are reported the same way.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Experience,
    Numeric,
    Freeform,
    SingleWriteIn,
    MultipleWriteIn,
}

impl QuestionType {
    /// The question types whose answers are free text grouped by content.
    pub fn is_freeform_like(&self) -> bool {
        matches!(
            self,
            QuestionType::Freeform | QuestionType::SingleWriteIn | QuestionType::MultipleWriteIn
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single-choice",
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Experience => "experience",
            QuestionType::Numeric => "numeric",
            QuestionType::Freeform => "freeform",
            QuestionType::SingleWriteIn => "single-write-in",
            QuestionType::MultipleWriteIn => "multiple-write-in",
        }
    }
}

impl FromStr for QuestionType {
    type Err = ReportErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "single-choice" | "demographic-single-choice" | "demographic" => {
                Ok(QuestionType::SingleChoice)
            }
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "experience" => Ok(QuestionType::Experience),
            "numeric" => Ok(QuestionType::Numeric),
            "freeform" => Ok(QuestionType::Freeform),
            "single-write-in" => Ok(QuestionType::SingleWriteIn),
            "multiple-write-in" => Ok(QuestionType::MultipleWriteIn),
            x => Err(ReportErrors::InvalidArgument(format!(
                "unknown question type: {}",
                x
            ))),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub slug: String,
    pub section_slug: String,
    pub question_type: QuestionType,
    pub order: i32,
    /// Cap on the number of options a respondent may select.
    pub multiple_max: Option<u32>,
    pub active: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyOption {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub order: i32,
    pub active: bool,
}

/// Has the respondent heard of or used a tool.
///
/// The integer codes are the ones stored with the responses. They do not give
/// the ranking order: use `Awareness::LADDER` for that.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Awareness {
    NeverHeard,
    HeardOf,
    UsedBefore,
    Using,
}

impl Awareness {
    /// Strongest engagement first.
    pub const LADDER: [Awareness; 4] = [
        Awareness::Using,
        Awareness::UsedBefore,
        Awareness::HeardOf,
        Awareness::NeverHeard,
    ];

    pub fn from_code(code: i32) -> Option<Awareness> {
        match code {
            0 => Some(Awareness::NeverHeard),
            1 => Some(Awareness::HeardOf),
            2 => Some(Awareness::UsedBefore),
            3 => Some(Awareness::Using),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Awareness::NeverHeard => 0,
            Awareness::HeardOf => 1,
            Awareness::UsedBefore => 2,
            Awareness::Using => 3,
        }
    }
}

/// How the respondent feels about a tool.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Most positive first.
    pub const LADDER: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn from_code(code: i32) -> Option<Sentiment> {
        match code {
            -1 => Some(Sentiment::Negative),
            0 => Some(Sentiment::Neutral),
            1 => Some(Sentiment::Positive),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }
}

/// A numeric answer, as stored. Some storage layers keep it as text.
#[derive(PartialEq, Debug, Clone)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerces the value to a finite number. Anything else is dropped.
    pub fn as_f64(&self) -> Option<f64> {
        let x = match self {
            NumericInput::Number(x) => *x,
            NumericInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if x.is_finite() {
            Some(x)
        } else {
            None
        }
    }
}

/// One answer row, for one session, one period and one question.
///
/// Experience questions have one row per rated option, tagged with `option_slug`.
/// The value fields are mostly exclusive and depend on the question type.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Response {
    pub session_id: String,
    pub period: Option<Period>,
    pub question_slug: String,
    pub option_slug: Option<String>,
    pub skipped: bool,
    pub single_option_slug: Option<String>,
    pub single_write_in: Option<String>,
    pub multiple_option_slugs: Vec<String>,
    pub multiple_write_ins: Vec<String>,
    pub experience_awareness: Option<i32>,
    pub experience_sentiment: Option<i32>,
    pub freeform_text: Option<String>,
    pub numeric_value: Option<NumericInput>,
    pub comment: Option<String>,
}

impl Response {
    /// True if the row carries an actual answer, whatever the question type.
    ///
    /// A row that is simply not skipped does not count: a respondent may have
    /// skipped, then un-skipped a question without answering it.
    pub fn has_value(&self) -> bool {
        fn filled(s: &Option<String>) -> bool {
            s.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
        }
        filled(&self.single_option_slug)
            || filled(&self.single_write_in)
            || !self.multiple_option_slugs.is_empty()
            || !self.multiple_write_ins.is_empty()
            || self.experience_awareness.is_some()
            || self.experience_sentiment.is_some()
            || filled(&self.freeform_text)
            || self.numeric_value.is_some()
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct ChoiceOptionReport {
    pub option_slug: String,
    pub label: String,
    pub description: Option<String>,
    pub count: u64,
    pub percentage: f64,
    pub display_order: i32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WriteInCount {
    pub response: String,
    pub count: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct LevelCount<L> {
    pub level: L,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CrossTabCount {
    pub awareness: Awareness,
    pub sentiment: Sentiment,
    pub count: u64,
}

/// Aggregated ratings for one option of an experience question.
#[derive(PartialEq, Debug, Clone)]
pub struct ExperienceOptionReport {
    pub option_slug: String,
    pub label: String,
    pub description: Option<String>,
    pub display_order: i32,
    /// Number of rows for this option. Denominator of all the percentages.
    pub total: u64,
    /// Every level, in ladder order.
    pub awareness: Vec<LevelCount<Awareness>>,
    /// Every level, in ladder order.
    pub sentiment: Vec<LevelCount<Sentiment>>,
    /// Only the pairs that were seen.
    pub combined: Vec<CrossTabCount>,
}

impl ExperienceOptionReport {
    pub fn awareness_percentage(&self, level: Awareness) -> f64 {
        self.awareness
            .iter()
            .find(|lc| lc.level == level)
            .map(|lc| lc.percentage)
            .unwrap_or(0.0)
    }

    pub fn sentiment_percentage(&self, level: Sentiment) -> f64 {
        self.sentiment
            .iter()
            .find(|lc| lc.level == level)
            .map(|lc| lc.percentage)
            .unwrap_or(0.0)
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct NumericBucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
    pub percentage: f64,
}

/// The type-specific part of a question report.
#[derive(PartialEq, Debug, Clone)]
pub enum QuestionData {
    SingleChoice {
        options: Vec<ChoiceOptionReport>,
        write_ins: Vec<WriteInCount>,
    },
    MultipleChoice {
        options: Vec<ChoiceOptionReport>,
        write_ins: Vec<WriteInCount>,
    },
    Experience {
        options: Vec<ExperienceOptionReport>,
    },
    Numeric {
        stats: NumericStats,
        buckets: Vec<NumericBucket>,
    },
    Freeform {
        responses: Vec<WriteInCount>,
        total_responses: u64,
    },
}

#[derive(PartialEq, Debug, Clone)]
pub struct QuestionReport {
    pub question_slug: String,
    pub question_type: QuestionType,
    /// Distinct sessions with at least one row.
    pub total_responses: u64,
    /// Distinct sessions with at least one skipped row.
    pub skipped_responses: u64,
    pub data: QuestionData,
    pub comments: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SectionCompletion {
    pub section_slug: String,
    pub section_title: String,
    pub completed_questions: u64,
    pub total_questions: u64,
    pub percentage: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompletionReport {
    pub overall_percentage: u32,
    pub total_completed_questions: u64,
    pub total_questions: u64,
    pub section_completion: Vec<SectionCompletion>,
}

/// Errors that prevent the engine from completing successfully.
///
/// Bad data never ends up here: it is defaulted or dropped. These are caller bugs
/// or failures of the storage layer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportErrors {
    InvalidArgument(String),
    SourceUnavailable(String),
}

impl Error for ReportErrors {}

impl Display for ReportErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportErrors::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            ReportErrors::SourceUnavailable(msg) => write!(f, "source unavailable: {}", msg),
        }
    }
}

// ********* Ranking options **********

/// The axis used to rank experience options.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum GroupBy {
    Awareness,
    Sentiment,
}

impl FromStr for GroupBy {
    type Err = ReportErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awareness" => Ok(GroupBy::Awareness),
            "sentiment" => Ok(GroupBy::Sentiment),
            x => Err(ReportErrors::InvalidArgument(format!(
                "groupBy must be 'awareness' or 'sentiment', got {:?}",
                x
            ))),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ReportErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            x => Err(ReportErrors::InvalidArgument(format!(
                "direction must be 'asc' or 'desc', got {:?}",
                x
            ))),
        }
    }
}
