use crate::report::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "periodKind")]
    pub period_kind: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub slug: String,
    pub title: String,
    pub order: Option<i32>,
    pub active: Option<bool>,
}

impl SectionConfig {
    /// Sections without an explicit order keep their position in the file.
    pub fn to_section(&self, idx: usize) -> Section {
        Section {
            slug: self.slug.clone(),
            title: self.title.clone(),
            order: self.order.unwrap_or(idx as i32 + 1),
            active: self.active.unwrap_or(true),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub slug: String,
    pub label: String,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub active: Option<bool>,
}

impl OptionConfig {
    pub fn to_option(&self, idx: usize) -> SurveyOption {
        SurveyOption {
            slug: self.slug.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            order: self.order.unwrap_or(idx as i32 + 1),
            active: self.active.unwrap_or(true),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub slug: String,
    pub section: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub order: Option<i32>,
    #[serde(rename = "multipleMax")]
    pub multiple_max: Option<u32>,
    pub active: Option<bool>,
    pub options: Option<Vec<OptionConfig>>,
}

impl QuestionConfig {
    pub fn to_question(&self, idx: usize) -> RptResult<Question> {
        let question_type = self
            .question_type
            .parse::<QuestionType>()
            .ok()
            .context(UnknownQuestionTypeSnafu {
                question: self.slug.clone(),
                type_name: self.question_type.clone(),
            })?;
        Ok(Question {
            slug: self.slug.clone(),
            section_slug: self.section.clone(),
            question_type,
            order: self.order.unwrap_or(idx as i32 + 1),
            multiple_max: self.multiple_max,
            active: self.active.unwrap_or(true),
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "listDelimiter")]
    pub list_delimiter: Option<String>,
}

impl ResponseSource {
    pub fn list_delimiter(&self) -> &str {
        match self.list_delimiter.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => ";",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub sections: Vec<SectionConfig>,
    pub questions: Vec<QuestionConfig>,
    #[serde(rename = "responseSources")]
    pub response_sources: Vec<ResponseSource>,
}

impl SurveyConfig {
    pub fn period_kind(&self) -> RptResult<PeriodKind> {
        match self.output_settings.period_kind.as_deref() {
            None | Some("week") => Ok(PeriodKind::Week),
            Some("month") => Ok(PeriodKind::Month),
            Some(x) => whatever!("unknown period kind: {}", x),
        }
    }
}

pub fn read_summary(path: &str) -> RptResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
