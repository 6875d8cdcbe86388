use log::debug;
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::stats::round_percentage;

/// Computes how much of the survey one session has filled in for one period.
///
/// Only active questions of active sections count. A question is completed if one of
/// its rows is skipped, or if one of its rows carries an answer. Once completed, a
/// question stays completed whatever the other rows say.
pub fn compute_completion(
    sections: &[Section],
    questions: &[Question],
    responses: &[Response],
) -> CompletionReport {
    let mut active_sections: Vec<&Section> = sections.iter().filter(|s| s.active).collect();
    active_sections.sort_by_key(|s| s.order);
    let active_section_slugs: HashSet<&str> =
        active_sections.iter().map(|s| s.slug.as_str()).collect();

    // The universe of questions, keyed by slug, with their section.
    let universe: HashMap<&str, &str> = questions
        .iter()
        .filter(|q| q.active && active_section_slugs.contains(q.section_slug.as_str()))
        .map(|q| (q.slug.as_str(), q.section_slug.as_str()))
        .collect();

    let mut completed: HashSet<&str> = HashSet::new();
    for r in responses.iter() {
        let slug = r.question_slug.as_str();
        if !universe.contains_key(slug) || completed.contains(slug) {
            continue;
        }
        if r.skipped || r.has_value() {
            completed.insert(slug);
        }
    }
    debug!(
        "compute_completion: {} completed out of {} questions",
        completed.len(),
        universe.len()
    );

    let section_completion: Vec<SectionCompletion> = active_sections
        .iter()
        .map(|s| {
            let total = universe
                .values()
                .filter(|sec| **sec == s.slug.as_str())
                .count() as u64;
            let done = completed
                .iter()
                .filter(|q| universe.get(*q) == Some(&s.slug.as_str()))
                .count() as u64;
            SectionCompletion {
                section_slug: s.slug.clone(),
                section_title: s.title.clone(),
                completed_questions: done,
                total_questions: total,
                percentage: round_percentage(done, total),
            }
        })
        .collect();

    let total_questions = universe.len() as u64;
    let total_completed_questions = completed.len() as u64;
    CompletionReport {
        overall_percentage: round_percentage(total_completed_questions, total_questions),
        total_completed_questions,
        total_questions,
        section_completion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(slug: &str, order: i32, active: bool) -> Section {
        Section {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            order,
            active,
        }
    }

    fn question(slug: &str, section: &str, qt: QuestionType, active: bool) -> Question {
        Question {
            slug: slug.to_string(),
            section_slug: section.to_string(),
            question_type: qt,
            order: 0,
            multiple_max: None,
            active,
        }
    }

    fn row(question: &str) -> Response {
        Response {
            session_id: "me".to_string(),
            question_slug: question.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn skips_count_as_completed() {
        let sections = vec![section("s", 1, true)];
        let questions = vec![
            question("q1", "s", QuestionType::SingleChoice, true),
            question("q2", "s", QuestionType::Numeric, true),
            question("q3", "s", QuestionType::Freeform, true),
        ];
        let responses = vec![
            Response {
                skipped: true,
                ..row("q1")
            },
            Response {
                numeric_value: Some(NumericInput::Number(3.0)),
                ..row("q2")
            },
            Response {
                freeform_text: Some("hello".to_string()),
                ..row("q3")
            },
        ];
        let res = compute_completion(&sections, &questions, &responses);
        assert_eq!(res.overall_percentage, 100);
        assert_eq!(res.total_completed_questions, 3);
        assert_eq!(res.section_completion[0].percentage, 100);
    }

    #[test]
    fn unskipped_without_value_is_not_completed() {
        let sections = vec![section("s", 1, true)];
        let questions = vec![question("q1", "s", QuestionType::Freeform, true)];
        let responses = vec![Response {
            freeform_text: Some("".to_string()),
            ..row("q1")
        }];
        let res = compute_completion(&sections, &questions, &responses);
        assert_eq!(res.overall_percentage, 0);
        assert_eq!(res.total_completed_questions, 0);
        assert_eq!(res.total_questions, 1);
    }

    #[test]
    fn completion_is_never_downgraded() {
        let sections = vec![section("s", 1, true)];
        let questions = vec![question("x", "s", QuestionType::Experience, true)];
        let responses = vec![
            Response {
                skipped: true,
                option_slug: Some("a".to_string()),
                ..row("x")
            },
            Response {
                option_slug: Some("b".to_string()),
                ..row("x")
            },
        ];
        let res = compute_completion(&sections, &questions, &responses);
        assert_eq!(res.total_completed_questions, 1);
        assert_eq!(res.overall_percentage, 100);
    }

    #[test]
    fn experience_question_counts_once() {
        let sections = vec![section("s", 1, true)];
        let questions = vec![
            question("x", "s", QuestionType::Experience, true),
            question("y", "s", QuestionType::SingleChoice, true),
        ];
        let responses: Vec<Response> = ["a", "b", "c"]
            .iter()
            .map(|o| Response {
                option_slug: Some(o.to_string()),
                experience_awareness: Some(1),
                ..row("x")
            })
            .collect();
        let res = compute_completion(&sections, &questions, &responses);
        assert_eq!(res.total_completed_questions, 1);
        assert_eq!(res.overall_percentage, 50);
    }

    #[test]
    fn inactive_sections_and_questions_are_ignored() {
        let sections = vec![section("b", 2, true), section("a", 1, true), section("off", 0, false)];
        let questions = vec![
            question("q1", "a", QuestionType::SingleChoice, true),
            question("q2", "b", QuestionType::SingleChoice, true),
            question("q3", "b", QuestionType::SingleChoice, true),
            question("q4", "b", QuestionType::SingleChoice, false),
            question("q5", "off", QuestionType::SingleChoice, true),
        ];
        let answer = |q: &str| Response {
            single_option_slug: Some("yes".to_string()),
            ..row(q)
        };
        let responses = vec![answer("q2"), answer("q4"), answer("q5")];
        let res = compute_completion(&sections, &questions, &responses);
        assert_eq!(res.total_questions, 3);
        assert_eq!(res.total_completed_questions, 1);
        assert_eq!(res.overall_percentage, 33);
        let slugs: Vec<&str> = res
            .section_completion
            .iter()
            .map(|s| s.section_slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert_eq!(res.section_completion[0].percentage, 0);
        assert_eq!(res.section_completion[1].completed_questions, 1);
        assert_eq!(res.section_completion[1].total_questions, 2);
        assert_eq!(res.section_completion[1].percentage, 50);
    }

    #[test]
    fn empty_survey_is_zero_percent() {
        let res = compute_completion(&[], &[], &[]);
        assert_eq!(res.overall_percentage, 0);
        assert_eq!(res.total_questions, 0);
        assert!(res.section_completion.is_empty());
    }
}
