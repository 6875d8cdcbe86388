// Primitives shared by the response readers.

use std::collections::HashMap;

use crate::report::*;

/// One response row as found in a file, before conversion.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedResponse {
    #[serde(rename = "session")]
    pub session_id: String,
    pub period: u32,
    pub year: i32,
    pub question: String,
    pub option: Option<String>,
    #[serde(default)]
    pub skipped: bool,
    #[serde(rename = "singleOption")]
    pub single_option: Option<String>,
    #[serde(rename = "singleWriteIn")]
    pub single_write_in: Option<String>,
    #[serde(rename = "multipleOptions", default)]
    pub multiple_options: Vec<String>,
    #[serde(rename = "multipleWriteIns", default)]
    pub multiple_write_ins: Vec<String>,
    pub awareness: Option<i32>,
    pub sentiment: Option<i32>,
    pub freeform: Option<String>,
    pub numeric: Option<JSValue>,
    pub comment: Option<String>,
}

pub fn to_response(pr: ParsedResponse) -> Response {
    let numeric_value = match pr.numeric {
        None | Some(JSValue::Null) => None,
        Some(JSValue::Number(n)) => n.as_f64().map(NumericInput::Number),
        Some(JSValue::String(s)) => Some(NumericInput::Text(s)),
        Some(x) => Some(NumericInput::Text(x.to_string())),
    };
    Response {
        session_id: pr.session_id,
        period: Some(Period::new(pr.period, pr.year)),
        question_slug: pr.question,
        option_slug: pr.option,
        skipped: pr.skipped,
        single_option_slug: pr.single_option,
        single_write_in: pr.single_write_in,
        multiple_option_slugs: pr.multiple_options,
        multiple_write_ins: pr.multiple_write_ins,
        experience_awareness: pr.awareness,
        experience_sentiment: pr.sentiment,
        freeform_text: pr.freeform,
        numeric_value,
        comment: pr.comment,
    }
}

const REQUIRED_COLUMNS: [&str; 4] = ["session", "period", "year", "question"];

/// Position of the named columns in a tabular file.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    path: String,
    columns: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(path: &str, header: &[Option<String>]) -> BRptResult<ColumnIndex> {
        let columns: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| h.as_ref().map(|s| (s.trim().to_string(), idx)))
            .collect();
        for column in REQUIRED_COLUMNS {
            if !columns.contains_key(column) {
                return Err(Box::new(RptError::MissingColumn {
                    column: column.to_string(),
                    path: path.to_string(),
                }));
            }
        }
        Ok(ColumnIndex {
            path: path.to_string(),
            columns,
        })
    }

    fn cell(&self, cells: &[Option<String>], column: &str) -> Option<String> {
        let idx = self.columns.get(column)?;
        cells
            .get(*idx)
            .cloned()
            .flatten()
            .filter(|s| !s.trim().is_empty())
    }

    fn invalid(&self, lineno: u64, column: &str, content: &str) -> Box<RptError> {
        Box::new(RptError::InvalidCell {
            path: self.path.clone(),
            lineno,
            column: column.to_string(),
            content: content.to_string(),
        })
    }

    fn required(&self, lineno: u64, cells: &[Option<String>], column: &str) -> BRptResult<String> {
        match self.cell(cells, column) {
            Some(s) => Ok(s.trim().to_string()),
            None => Err(self.invalid(lineno, column, "")),
        }
    }

    fn number<T: std::str::FromStr>(
        &self,
        lineno: u64,
        cells: &[Option<String>],
        column: &str,
    ) -> BRptResult<T> {
        let s = self.required(lineno, cells, column)?;
        s.parse::<T>().map_err(|_| self.invalid(lineno, column, &s))
    }

    // Bad level codes are the engine's business: they are passed through or dropped.
    fn level(&self, lineno: u64, cells: &[Option<String>], column: &str) -> Option<i32> {
        let s = self.cell(cells, column)?;
        match parse_level(&s) {
            Some(x) => Some(x),
            None => {
                warn!(
                    "{}, line {}: ignoring {} value {:?}",
                    self.path, lineno, column, s
                );
                None
            }
        }
    }

    /// Reads one row of cells. Empty cells are missing values.
    pub fn parse_row(
        &self,
        lineno: u64,
        cells: &[Option<String>],
        list_delimiter: &str,
    ) -> BRptResult<ParsedResponse> {
        let skipped = match self.cell(cells, "skipped") {
            Some(s) => parse_bool(&s).ok_or_else(|| self.invalid(lineno, "skipped", &s))?,
            None => false,
        };
        Ok(ParsedResponse {
            session_id: self.required(lineno, cells, "session")?,
            period: self.number(lineno, cells, "period")?,
            year: self.number(lineno, cells, "year")?,
            question: self.required(lineno, cells, "question")?,
            option: self.cell(cells, "option").map(|s| s.trim().to_string()),
            skipped,
            single_option: self.cell(cells, "singleOption").map(|s| s.trim().to_string()),
            single_write_in: self.cell(cells, "singleWriteIn"),
            multiple_options: split_list(self.cell(cells, "multipleOptions"), list_delimiter),
            multiple_write_ins: split_list(self.cell(cells, "multipleWriteIns"), list_delimiter),
            awareness: self.level(lineno, cells, "awareness"),
            sentiment: self.level(lineno, cells, "sentiment"),
            freeform: self.cell(cells, "freeform"),
            numeric: self.cell(cells, "numeric").map(JSValue::String),
            comment: self.cell(cells, "comment"),
        })
    }
}

/// Spreadsheets store integers as floats: "3" and "3.0" are both accepted.
fn parse_level(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(x) = s.parse::<i32>() {
        return Some(x);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f.abs() < 1e6 {
        Some(f as i32)
    } else {
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "x" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn split_list(s: Option<String>, delimiter: &str) -> Vec<String> {
    match s {
        None => vec![],
        Some(s) => s
            .split(delimiter)
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_string())
            .collect(),
    }
}
