/*!
Aggregation and ranking engine for recurring surveys.

Respondents answer a set of questions every period (a week or a month). This crate
turns the raw answer rows of one period into reports:

- a per-question summary (counts, percentages, distributions, descriptive statistics),
  see [`get_question_report`] and [`get_survey_report`]
- the completion of the survey for one respondent, see [`get_completion_percentage`]
- a stable display order for the options of experience questions, see
  [`rank_experience_options`]

The engine does not own any storage. It reads through the [`SurveySource`] trait;
[`builder::Builder`] provides an in-memory implementation.
*/
mod completion;
mod config;
mod ranking;
pub mod builder;
pub mod manual;
pub mod reducers;
pub mod stats;

use log::{debug, info};

pub use crate::completion::compute_completion;
pub use crate::config::*;
pub use crate::ranking::rank_experience_options;

/// Where the surveys and the responses are stored.
///
/// All the calls are made for the duration of one report and their results are
/// treated as immutable.
pub trait SurveySource {
    fn list_active_sections(&self) -> Result<Vec<Section>, ReportErrors>;

    /// The active questions for a period, whether their section is active or not.
    fn list_active_questions(&self, period: Period) -> Result<Vec<Question>, ReportErrors>;

    fn list_active_options(&self, question_slug: &str) -> Result<Vec<SurveyOption>, ReportErrors>;

    fn list_question_responses(
        &self,
        question_slug: &str,
        period: Period,
    ) -> Result<Vec<Response>, ReportErrors>;

    fn list_session_responses(
        &self,
        session_id: &str,
        period: Period,
    ) -> Result<Vec<Response>, ReportErrors>;
}

/// Active questions of active sections, in section order then question order.
fn reportable_questions<S: SurveySource>(
    source: &S,
    period: Period,
) -> Result<Vec<Question>, ReportErrors> {
    let mut sections = source.list_active_sections()?;
    sections.sort_by_key(|s| s.order);
    let questions = source.list_active_questions(period)?;

    let mut res: Vec<Question> = Vec::new();
    for s in sections.iter().filter(|s| s.active) {
        let mut in_section: Vec<Question> = questions
            .iter()
            .filter(|q| q.active && q.section_slug == s.slug)
            .cloned()
            .collect();
        in_section.sort_by_key(|q| q.order);
        res.extend(in_section);
    }
    Ok(res)
}

fn report_for_question<S: SurveySource>(
    source: &S,
    question: &Question,
    period: Period,
) -> Result<QuestionReport, ReportErrors> {
    let options = source.list_active_options(&question.slug)?;
    let responses = source.list_question_responses(&question.slug, period)?;
    debug!(
        "report_for_question: {} ({:?}): {} rows, {} options",
        question.slug,
        question.question_type,
        responses.len(),
        options.len()
    );

    let (total_responses, skipped_responses) = reducers::session_counts(&responses);
    Ok(QuestionReport {
        question_slug: question.slug.clone(),
        question_type: question.question_type,
        total_responses,
        skipped_responses,
        data: reducers::reduce(question.question_type, &responses, &options),
        comments: reducers::collect_comments(&responses),
    })
}

/// Builds the report of one question for one period.
///
/// Returns `None` if the slug is not an active question of an active section.
pub fn get_question_report<S: SurveySource>(
    source: &S,
    question_slug: &str,
    period: Period,
) -> Result<Option<QuestionReport>, ReportErrors> {
    let questions = reportable_questions(source, period)?;
    match questions.iter().find(|q| q.slug == question_slug) {
        Some(q) => report_for_question(source, q, period).map(Some),
        None => {
            info!(
                "get_question_report: no active question {:?} for period {}",
                question_slug, period
            );
            Ok(None)
        }
    }
}

/// Builds the reports of all the active questions for one period.
pub fn get_survey_report<S: SurveySource>(
    source: &S,
    period: Period,
) -> Result<Vec<QuestionReport>, ReportErrors> {
    let questions = reportable_questions(source, period)?;
    info!(
        "get_survey_report: period {}: {} questions",
        period,
        questions.len()
    );
    questions
        .iter()
        .map(|q| report_for_question(source, q, period))
        .collect()
}

/// How much of the survey a session has completed for a period.
pub fn get_completion_percentage<S: SurveySource>(
    source: &S,
    session_id: &str,
    period: Period,
) -> Result<CompletionReport, ReportErrors> {
    let sections = source.list_active_sections()?;
    let questions = source.list_active_questions(period)?;
    let responses = source.list_session_responses(session_id, period)?;
    debug!(
        "get_completion_percentage: session {} period {}: {} rows",
        session_id,
        period,
        responses.len()
    );
    Ok(compute_completion(&sections, &questions, &responses))
}
