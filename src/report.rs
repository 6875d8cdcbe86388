use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_tally::builder::{Builder, MemorySource};
use survey_tally::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum RptError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet to read in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Several worksheets in {path}, excelWorksheetName must be provided"))]
    AmbiguousExcelWorksheet { path: String },
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error parsing CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Missing column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("{path}, line {lineno}: cannot read column {column}: {content:?}"))]
    InvalidCell {
        path: String,
        lineno: u64,
        column: String,
        content: String,
    },
    #[snafu(display("Question {question} has an unknown type {type_name}"))]
    UnknownQuestionType { question: String, type_name: String },
    #[snafu(display("Unknown provider for response source: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error in the survey engine"))]
    Engine { source: ReportErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type RptResult<T> = Result<T, RptError>;
type BRptResult<T> = Result<T, Box<RptError>>;

fn awareness_name(level: Awareness) -> &'static str {
    match level {
        Awareness::NeverHeard => "never_heard",
        Awareness::HeardOf => "heard_of",
        Awareness::UsedBefore => "used_before",
        Awareness::Using => "using",
    }
}

fn sentiment_name(level: Sentiment) -> &'static str {
    match level {
        Sentiment::Negative => "negative",
        Sentiment::Neutral => "neutral",
        Sentiment::Positive => "positive",
    }
}

fn write_ins_to_json(write_ins: &[WriteInCount]) -> Vec<JSValue> {
    write_ins
        .iter()
        .map(|w| json!({"response": w.response, "count": w.count}))
        .collect()
}

fn choice_options_to_json(options: &[ChoiceOptionReport]) -> Vec<JSValue> {
    options
        .iter()
        .map(|o| {
            json!({
                "optionSlug": o.option_slug,
                "label": o.label,
                "description": o.description,
                "count": o.count,
                "percentage": o.percentage,
                "displayOrder": o.display_order,
            })
        })
        .collect()
}

fn experience_option_to_json(o: &ExperienceOptionReport) -> JSValue {
    let awareness: Vec<JSValue> = o
        .awareness
        .iter()
        .map(|lc| {
            json!({
                "level": lc.level.code(),
                "name": awareness_name(lc.level),
                "count": lc.count,
                "percentage": lc.percentage,
            })
        })
        .collect();
    let sentiment: Vec<JSValue> = o
        .sentiment
        .iter()
        .map(|lc| {
            json!({
                "level": lc.level.code(),
                "name": sentiment_name(lc.level),
                "count": lc.count,
                "percentage": lc.percentage,
            })
        })
        .collect();
    let combined: Vec<JSValue> = o
        .combined
        .iter()
        .map(|c| {
            json!({
                "awareness": c.awareness.code(),
                "sentiment": c.sentiment.code(),
                "count": c.count,
            })
        })
        .collect();
    json!({
        "optionSlug": o.option_slug,
        "label": o.label,
        "description": o.description,
        "displayOrder": o.display_order,
        "total": o.total,
        "awareness": awareness,
        "sentiment": sentiment,
        "combined": combined,
    })
}

fn question_data_to_json(data: &QuestionData) -> JSValue {
    match data {
        QuestionData::SingleChoice { options, write_ins }
        | QuestionData::MultipleChoice { options, write_ins } => json!({
            "options": choice_options_to_json(options),
            "writeIns": write_ins_to_json(write_ins),
        }),
        QuestionData::Experience { options } => {
            let l: Vec<JSValue> = options.iter().map(experience_option_to_json).collect();
            json!({ "options": l })
        }
        QuestionData::Numeric { stats, buckets } => {
            let l: Vec<JSValue> = buckets
                .iter()
                .map(|b| json!({"range": b.label, "count": b.count, "percentage": b.percentage}))
                .collect();
            json!({
                "stats": {
                    "mean": stats.mean,
                    "median": stats.median,
                    "min": stats.min,
                    "max": stats.max,
                    "count": stats.count,
                },
                "buckets": l,
            })
        }
        QuestionData::Freeform {
            responses,
            total_responses,
        } => json!({
            "responses": write_ins_to_json(responses),
            "totalResponses": total_responses,
        }),
    }
}

fn question_report_to_json(r: &QuestionReport) -> JSValue {
    json!({
        "question": r.question_slug,
        "type": r.question_type.as_str(),
        "totalResponses": r.total_responses,
        "skippedResponses": r.skipped_responses,
        "data": question_data_to_json(&r.data),
        "comments": r.comments,
    })
}

fn completion_to_json(session_id: &str, c: &CompletionReport) -> JSValue {
    let sections: Vec<JSValue> = c
        .section_completion
        .iter()
        .map(|s| {
            json!({
                "sectionSlug": s.section_slug,
                "sectionTitle": s.section_title,
                "completedQuestions": s.completed_questions,
                "totalQuestions": s.total_questions,
                "percentage": s.percentage,
            })
        })
        .collect();
    json!({
        "session": session_id,
        "overallPercentage": c.overall_percentage,
        "totalCompletedQuestions": c.total_completed_questions,
        "totalQuestions": c.total_questions,
        "sectionCompletion": sections,
    })
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct OutputConfig {
    survey: String,
    period: String,
    #[serde(rename = "periodKind")]
    period_kind: String,
    #[serde(rename = "configDigest")]
    config_digest: String,
}

fn build_summary_js(
    config: &SurveyConfig,
    config_contents: &str,
    period: Period,
    reports: &[QuestionReport],
    completion: Option<(&str, &CompletionReport)>,
) -> RptResult<JSValue> {
    let period_kind = match config.period_kind()? {
        PeriodKind::Week => "week",
        PeriodKind::Month => "month",
    };
    let c = OutputConfig {
        survey: config.output_settings.survey_name.clone(),
        period: period.to_string(),
        period_kind: period_kind.to_string(),
        config_digest: sha256::digest(config_contents),
    };
    let mut summary: JSMap<String, JSValue> = JSMap::new();
    summary.insert(
        "config".to_string(),
        serde_json::to_value(c).context(ParsingJsonSnafu {})?,
    );
    summary.insert(
        "results".to_string(),
        JSValue::Array(reports.iter().map(question_report_to_json).collect()),
    );
    if let Some((session_id, cr)) = completion {
        summary.insert(
            "completion".to_string(),
            completion_to_json(session_id, cr),
        );
    }
    Ok(JSValue::Object(summary))
}

fn read_responses(root_path: &Path, rs: &ResponseSource) -> BRptResult<Vec<Response>> {
    let p: PathBuf = root_path.join(&rs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read response file {:?}", p2);
    let parsed = match rs.provider.as_str() {
        "json" => io_json::read_json_responses(p2),
        "csv" => io_csv::read_csv_responses(p2, rs),
        "xlsx" => io_xlsx::read_xlsx_responses(p2, rs),
        x => Err(Box::new(RptError::UnknownProvider {
            provider: x.to_string(),
        })),
    }?;
    Ok(parsed.into_iter().map(io_common::to_response).collect())
}

/// Builds the in-memory survey from the configuration and all the response files.
fn load_dataset(root_path: &Path, config: &SurveyConfig) -> BRptResult<MemorySource> {
    let mut builder = Builder::new();
    for (idx, sc) in config.sections.iter().enumerate() {
        builder.add_section(sc.to_section(idx));
    }
    for (idx, qc) in config.questions.iter().enumerate() {
        builder.add_question(qc.to_question(idx)?);
        for (oidx, oc) in qc.options.iter().flatten().enumerate() {
            builder.add_option(&qc.slug, oc.to_option(oidx));
        }
    }

    for rs in config.response_sources.iter() {
        let responses = read_responses(root_path, rs)?;
        debug!(
            "load_dataset: {} responses in {:?}",
            responses.len(),
            rs.file_path
        );
        for r in responses {
            let session_id = r.session_id.clone();
            if let Err(e) = builder.add_response(r) {
                warn!("load_dataset: skipping response of {}: {}", session_id, e);
            }
        }
    }
    let source = builder.build();
    info!("Loaded {} responses", source.num_responses());
    Ok(source)
}

type RankSettings = (GroupBy, i32, SortDirection);

fn rank_settings(args: &Args) -> RptResult<Option<RankSettings>> {
    let group_by = match args.rank_by.as_deref() {
        Some(s) => s.parse::<GroupBy>().context(EngineSnafu {})?,
        None => return Ok(None),
    };
    let level = args.rank_level.unwrap_or(match group_by {
        GroupBy::Awareness => Awareness::Using.code(),
        GroupBy::Sentiment => Sentiment::Positive.code(),
    });
    let direction = args
        .direction
        .as_deref()
        .unwrap_or("desc")
        .parse::<SortDirection>()
        .context(EngineSnafu {})?;
    Ok(Some((group_by, level, direction)))
}

fn rank_reports(
    reports: Vec<QuestionReport>,
    settings: Option<RankSettings>,
) -> RptResult<Vec<QuestionReport>> {
    let (group_by, level, direction) = match settings {
        Some(s) => s,
        None => return Ok(reports),
    };
    reports
        .into_iter()
        .map(|mut r| -> RptResult<QuestionReport> {
            if let QuestionData::Experience { options } = &r.data {
                let ranked = rank_experience_options(options, group_by, level, direction)
                    .context(EngineSnafu {})?;
                r.data = QuestionData::Experience { options: ranked };
            }
            Ok(r)
        })
        .collect()
}

fn write_summary(config: &SurveyConfig, out: Option<&str>, pretty_js: &str) -> RptResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            let p: PathBuf = match config.output_settings.output_directory.as_deref() {
                Some(dir) if Path::new(path).is_relative() => Path::new(dir).join(path),
                _ => PathBuf::from(path),
            };
            let p2 = p.display().to_string();
            info!("Writing summary to {:?}", p2);
            fs::write(&p, pretty_js).context(WritingJsonSnafu { path: p2 })?;
        }
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> RptResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}

pub fn run_report(args: &Args) -> RptResult<()> {
    let config_p = Path::new(args.config.as_str());
    let config_str = fs::read_to_string(config_p).context(OpeningJsonSnafu {
        path: args.config.clone(),
    })?;
    let config: SurveyConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config.output_settings);

    let settings = rank_settings(args)?;
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let source = load_dataset(root_p, &config).map_err(|e| *e)?;
    let period = Period::new(args.period, args.year);

    let reports: Vec<QuestionReport> = match args.question.as_deref() {
        Some(question_slug) => {
            let r = get_question_report(&source, question_slug, period).context(EngineSnafu {})?;
            if r.is_none() {
                warn!(
                    "No active question {:?} in period {}",
                    question_slug, period
                );
            }
            r.into_iter().collect()
        }
        None => get_survey_report(&source, period).context(EngineSnafu {})?,
    };
    let reports = rank_reports(reports, settings)?;

    let completion: Option<(&str, CompletionReport)> = match args.session.as_deref() {
        Some(session_id) => Some((
            session_id,
            get_completion_percentage(&source, session_id, period).context(EngineSnafu {})?,
        )),
        None => None,
    };

    let result_js = build_summary_js(
        &config,
        &config_str,
        period,
        &reports,
        completion.as_ref().map(|(s, c)| (*s, c)),
    )?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&config, args.out.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_p) = args.reference.as_deref() {
        check_reference(reference_p, &pretty_js_stats)?;
    }
    Ok(())
}
