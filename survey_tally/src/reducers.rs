// One reducer per question type. They all take the rows of one question for one period.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::stats::{numeric_buckets, numeric_stats, percentage, TextTally};

/// Dispatches the rows to the reducer of the question type.
pub fn reduce(
    question_type: QuestionType,
    responses: &[Response],
    options: &[SurveyOption],
) -> QuestionData {
    match question_type {
        QuestionType::SingleChoice => reduce_single_choice(responses, options),
        QuestionType::MultipleChoice => reduce_multiple_choice(responses, options),
        QuestionType::Experience => reduce_experience(responses, options),
        QuestionType::Numeric => reduce_numeric(responses),
        QuestionType::Freeform | QuestionType::SingleWriteIn | QuestionType::MultipleWriteIn => {
            reduce_freeform(question_type, responses)
        }
    }
}

fn sorted_options(options: &[SurveyOption]) -> Vec<&SurveyOption> {
    let mut res: Vec<&SurveyOption> = options.iter().filter(|o| o.active).collect();
    res.sort_by_key(|o| o.order);
    res
}

fn choice_reports(
    options: &[SurveyOption],
    tally: &HashMap<&str, u64>,
    denominator: u64,
) -> Vec<ChoiceOptionReport> {
    sorted_options(options)
        .into_iter()
        .map(|o| {
            let count = tally.get(o.slug.as_str()).cloned().unwrap_or(0);
            ChoiceOptionReport {
                option_slug: o.slug.clone(),
                label: o.label.clone(),
                description: o.description.clone(),
                count,
                percentage: percentage(count, denominator),
                display_order: o.order,
            }
        })
        .collect()
}

fn initial_tally(options: &[SurveyOption]) -> HashMap<&str, u64> {
    options
        .iter()
        .filter(|o| o.active)
        .map(|o| (o.slug.as_str(), 0))
        .collect()
}

/// Percentages are relative to the number of answers that were not skipped.
pub fn reduce_single_choice(responses: &[Response], options: &[SurveyOption]) -> QuestionData {
    let mut tally = initial_tally(options);
    let mut write_ins = TextTally::exact();
    let mut answered: u64 = 0;

    for r in responses.iter().filter(|r| !r.skipped) {
        answered += 1;
        if let Some(slug) = r.single_option_slug.as_deref() {
            if let Some(c) = tally.get_mut(slug) {
                *c += 1;
            } else if !slug.is_empty() {
                debug!(
                    "reduce_single_choice: session {}: unknown option {:?}",
                    r.session_id, slug
                );
            }
        }
        if let Some(w) = r.single_write_in.as_deref() {
            if !w.is_empty() {
                write_ins.add(w);
            }
        }
    }

    QuestionData::SingleChoice {
        options: choice_reports(options, &tally, answered),
        write_ins: write_ins.into_sorted(),
    }
}

/// Percentages are relative to the total number of selections, not to the number
/// of respondents: one respondent counts in every bucket they selected.
pub fn reduce_multiple_choice(responses: &[Response], options: &[SurveyOption]) -> QuestionData {
    let mut tally = initial_tally(options);
    let mut write_ins = TextTally::exact();

    for r in responses.iter().filter(|r| !r.skipped) {
        for slug in r.multiple_option_slugs.iter() {
            if let Some(c) = tally.get_mut(slug.as_str()) {
                *c += 1;
            } else {
                debug!(
                    "reduce_multiple_choice: session {}: unknown option {:?}",
                    r.session_id, slug
                );
            }
        }
        for w in r.multiple_write_ins.iter().filter(|w| !w.is_empty()) {
            write_ins.add(w);
        }
    }

    let total_selections: u64 = tally.values().sum();
    QuestionData::MultipleChoice {
        options: choice_reports(options, &tally, total_selections),
        write_ins: write_ins.into_sorted(),
    }
}

/// Aggregates the rows of a single option of an experience question.
///
/// A missing or unknown awareness counts as "never heard of it": the row stays in
/// the denominator. Sentiment is only counted when it is valid.
pub fn experience_option_report(option: &SurveyOption, rows: &[&Response]) -> ExperienceOptionReport {
    let total = rows.len() as u64;
    let mut awareness_counts: HashMap<Awareness, u64> = HashMap::new();
    let mut sentiment_counts: HashMap<Sentiment, u64> = HashMap::new();
    let mut combined_counts: HashMap<(Awareness, Sentiment), u64> = HashMap::new();

    for r in rows.iter() {
        let valid_awareness = r.experience_awareness.and_then(Awareness::from_code);
        if valid_awareness.is_none() && r.experience_awareness.is_some() {
            warn!(
                "experience_option_report: session {}: invalid awareness {:?} for {}",
                r.session_id, r.experience_awareness, option.slug
            );
        }
        let awareness = valid_awareness.unwrap_or(Awareness::NeverHeard);
        *awareness_counts.entry(awareness).or_insert(0) += 1;

        if let Some(sentiment) = r.experience_sentiment.and_then(Sentiment::from_code) {
            *sentiment_counts.entry(sentiment).or_insert(0) += 1;
            if let Some(a) = valid_awareness {
                *combined_counts.entry((a, sentiment)).or_insert(0) += 1;
            }
        }
    }

    let awareness = Awareness::LADDER
        .iter()
        .map(|level| {
            let count = awareness_counts.get(level).cloned().unwrap_or(0);
            LevelCount {
                level: *level,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    let sentiment = Sentiment::LADDER
        .iter()
        .map(|level| {
            let count = sentiment_counts.get(level).cloned().unwrap_or(0);
            LevelCount {
                level: *level,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();
    let mut combined: Vec<CrossTabCount> = Vec::new();
    for a in Awareness::LADDER.iter() {
        for s in Sentiment::LADDER.iter() {
            if let Some(count) = combined_counts.get(&(*a, *s)) {
                combined.push(CrossTabCount {
                    awareness: *a,
                    sentiment: *s,
                    count: *count,
                });
            }
        }
    }

    ExperienceOptionReport {
        option_slug: option.slug.clone(),
        label: option.label.clone(),
        description: option.description.clone(),
        display_order: option.order,
        total,
        awareness,
        sentiment,
        combined,
    }
}

pub fn reduce_experience(responses: &[Response], options: &[SurveyOption]) -> QuestionData {
    let options = sorted_options(options)
        .into_iter()
        .map(|o| {
            let rows: Vec<&Response> = responses
                .iter()
                .filter(|r| r.option_slug.as_deref() == Some(o.slug.as_str()))
                .collect();
            experience_option_report(o, &rows)
        })
        .collect();
    QuestionData::Experience { options }
}

pub fn reduce_numeric(responses: &[Response]) -> QuestionData {
    let values: Vec<f64> = responses
        .iter()
        .filter(|r| !r.skipped)
        .filter_map(|r| {
            let v = r.numeric_value.as_ref()?;
            let x = v.as_f64();
            if x.is_none() {
                debug!(
                    "reduce_numeric: session {}: dropping value {:?}",
                    r.session_id, v
                );
            }
            x
        })
        .collect();
    QuestionData::Numeric {
        stats: numeric_stats(&values),
        buckets: numeric_buckets(&values),
    }
}

fn freeform_values(question_type: QuestionType, r: &Response) -> Vec<&str> {
    match question_type {
        QuestionType::SingleWriteIn => r
            .single_write_in
            .as_deref()
            .or(r.freeform_text.as_deref())
            .into_iter()
            .collect(),
        QuestionType::MultipleWriteIn if !r.multiple_write_ins.is_empty() => {
            r.multiple_write_ins.iter().map(|s| s.as_str()).collect()
        }
        _ => r.freeform_text.as_deref().into_iter().collect(),
    }
}

/// Groups text answers regardless of case and surrounding whitespace.
pub fn reduce_freeform(question_type: QuestionType, responses: &[Response]) -> QuestionData {
    let mut tally = TextTally::normalized();
    for r in responses.iter().filter(|r| !r.skipped) {
        for s in freeform_values(question_type, r) {
            if !s.trim().is_empty() {
                tally.add(s);
            }
        }
    }
    let total_responses = tally.total();
    QuestionData::Freeform {
        responses: tally.into_sorted(),
        total_responses,
    }
}

/// Distinct sessions with a row, and distinct sessions with a skipped row.
pub fn session_counts(responses: &[Response]) -> (u64, u64) {
    let all: HashSet<&str> = responses.iter().map(|r| r.session_id.as_str()).collect();
    let skipped: HashSet<&str> = responses
        .iter()
        .filter(|r| r.skipped)
        .map(|r| r.session_id.as_str())
        .collect();
    (all.len() as u64, skipped.len() as u64)
}

pub fn collect_comments(responses: &[Response]) -> Vec<String> {
    responses
        .iter()
        .filter(|r| !r.skipped)
        .filter_map(|r| r.comment.as_deref())
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(slug: &str, order: i32) -> SurveyOption {
        SurveyOption {
            slug: slug.to_string(),
            label: slug.to_uppercase(),
            description: None,
            order,
            active: true,
        }
    }

    fn row(session: &str) -> Response {
        Response {
            session_id: session.to_string(),
            question_slug: "q".to_string(),
            ..Default::default()
        }
    }

    fn single(session: &str, slug: &str) -> Response {
        Response {
            single_option_slug: Some(slug.to_string()),
            ..row(session)
        }
    }

    fn skipped(session: &str) -> Response {
        Response {
            skipped: true,
            ..row(session)
        }
    }

    fn experience(session: &str, option: &str, a: Option<i32>, s: Option<i32>) -> Response {
        Response {
            option_slug: Some(option.to_string()),
            experience_awareness: a,
            experience_sentiment: s,
            ..row(session)
        }
    }

    #[test]
    fn single_choice_counts_in_display_order() {
        let options = vec![opt("b", 2), opt("a", 1), opt("c", 3)];
        let rows = vec![
            single("s1", "b"),
            single("s2", "b"),
            single("s3", "a"),
            skipped("s4"),
        ];
        let data = reduce_single_choice(&rows, &options);
        let QuestionData::SingleChoice { options, write_ins } = data else {
            panic!("wrong variant");
        };
        let slugs: Vec<&str> = options.iter().map(|o| o.option_slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(options[0].count, 1);
        assert_eq!(options[1].count, 2);
        assert_eq!(options[2].count, 0);
        let total: f64 = options.iter().map(|o| o.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(write_ins.is_empty());
    }

    #[test]
    fn single_choice_unknown_slug_stays_in_denominator() {
        let options = vec![opt("a", 1)];
        let rows = vec![single("s1", "a"), single("s2", "gone")];
        let QuestionData::SingleChoice { options, .. } = reduce_single_choice(&rows, &options)
        else {
            panic!("wrong variant");
        };
        assert_eq!(options[0].count, 1);
        assert_eq!(options[0].percentage, 50.0);
    }

    #[test]
    fn single_choice_write_ins_are_exact() {
        let options = vec![opt("other", 1)];
        let mut r1 = single("s1", "other");
        r1.single_write_in = Some("Emacs".to_string());
        let mut r2 = single("s2", "other");
        r2.single_write_in = Some("emacs".to_string());
        let QuestionData::SingleChoice { write_ins, .. } = reduce_single_choice(&[r1, r2], &options)
        else {
            panic!("wrong variant");
        };
        assert_eq!(write_ins.len(), 2);
    }

    #[test]
    fn single_choice_all_skipped_is_zero() {
        let options = vec![opt("a", 1)];
        let QuestionData::SingleChoice { options, .. } =
            reduce_single_choice(&[skipped("s1")], &options)
        else {
            panic!("wrong variant");
        };
        assert_eq!(options[0].percentage, 0.0);
    }

    #[test]
    fn multiple_choice_divides_by_selections() {
        let options = vec![opt("a", 1), opt("b", 2), opt("c", 3)];
        let mut r1 = row("s1");
        r1.multiple_option_slugs = vec!["a".to_string(), "b".to_string()];
        let mut r2 = row("s2");
        r2.multiple_option_slugs = vec!["a".to_string()];
        r2.multiple_write_ins = vec!["zed".to_string()];
        let QuestionData::MultipleChoice { options, write_ins } =
            reduce_multiple_choice(&[r1, r2], &options)
        else {
            panic!("wrong variant");
        };
        let counts: u64 = options.iter().map(|o| o.count).sum();
        assert_eq!(counts, 3);
        assert!((options[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        assert!((options[1].percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(options[2].percentage, 0.0);
        assert_eq!(write_ins[0].response, "zed");
    }

    #[test]
    fn multiple_choice_without_selection() {
        let options = vec![opt("a", 1)];
        let QuestionData::MultipleChoice { options, .. } =
            reduce_multiple_choice(&[row("s1")], &options)
        else {
            panic!("wrong variant");
        };
        assert_eq!(options[0].percentage, 0.0);
    }

    #[test]
    fn experience_defaults_missing_awareness() {
        let options = vec![opt("tool", 1)];
        let rows = vec![
            experience("s1", "tool", Some(3), Some(1)),
            experience("s2", "tool", None, None),
            experience("s3", "tool", Some(42), Some(0)),
            experience("s4", "tool", Some(2), Some(7)),
        ];
        let QuestionData::Experience { options } = reduce_experience(&rows, &options) else {
            panic!("wrong variant");
        };
        let o = &options[0];
        assert_eq!(o.total, 4);
        assert_eq!(o.awareness_percentage(Awareness::NeverHeard), 50.0);
        assert_eq!(o.awareness_percentage(Awareness::Using), 25.0);
        assert_eq!(o.awareness_percentage(Awareness::UsedBefore), 25.0);
        // Sentiment is never defaulted, and does not need to sum to 100.
        assert_eq!(o.sentiment_percentage(Sentiment::Positive), 25.0);
        assert_eq!(o.sentiment_percentage(Sentiment::Neutral), 25.0);
        assert_eq!(o.sentiment_percentage(Sentiment::Negative), 0.0);
        // Only s1 has both values valid.
        assert_eq!(
            o.combined,
            vec![CrossTabCount {
                awareness: Awareness::Using,
                sentiment: Sentiment::Positive,
                count: 1
            }]
        );
        let levels: Vec<Awareness> = o.awareness.iter().map(|l| l.level).collect();
        assert_eq!(levels, Awareness::LADDER.to_vec());
    }

    #[test]
    fn experience_splits_rows_by_option() {
        let options = vec![opt("x", 2), opt("y", 1)];
        let rows = vec![
            experience("s1", "x", Some(1), None),
            experience("s1", "y", Some(3), None),
            experience("s2", "y", Some(3), None),
        ];
        let QuestionData::Experience { options } = reduce_experience(&rows, &options) else {
            panic!("wrong variant");
        };
        assert_eq!(options[0].option_slug, "y");
        assert_eq!(options[0].total, 2);
        assert_eq!(options[0].awareness_percentage(Awareness::Using), 100.0);
        assert_eq!(options[1].total, 1);
        assert_eq!(options[1].awareness_percentage(Awareness::HeardOf), 100.0);
    }

    #[test]
    fn experience_option_without_rows_is_all_zero() {
        let options = vec![opt("x", 1)];
        let QuestionData::Experience { options } = reduce_experience(&[], &options) else {
            panic!("wrong variant");
        };
        assert_eq!(options[0].total, 0);
        assert!(options[0].awareness.iter().all(|l| l.percentage == 0.0));
    }

    #[test]
    fn numeric_drops_unparseable_values() {
        let values = vec![
            Some(NumericInput::Number(5.0)),
            Some(NumericInput::Text(" 10 ".to_string())),
            Some(NumericInput::Text("ten".to_string())),
            Some(NumericInput::Number(f64::NAN)),
            None,
        ];
        let mut rows: Vec<Response> = values
            .into_iter()
            .enumerate()
            .map(|(idx, v)| Response {
                numeric_value: v,
                ..row(&format!("s{}", idx))
            })
            .collect();
        rows.push(Response {
            skipped: true,
            numeric_value: Some(NumericInput::Number(1000.0)),
            ..row("s9")
        });
        let QuestionData::Numeric { stats, buckets } = reduce_numeric(&rows) else {
            panic!("wrong variant");
        };
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.median, 7.5);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn freeform_groups_variants() {
        let texts = ["Nice!", "nice!", "  Nice!  ", "   "];
        let rows: Vec<Response> = texts
            .iter()
            .enumerate()
            .map(|(idx, t)| Response {
                freeform_text: Some(t.to_string()),
                ..row(&format!("s{}", idx))
            })
            .collect();
        let QuestionData::Freeform {
            responses,
            total_responses,
        } = reduce_freeform(QuestionType::Freeform, &rows)
        else {
            panic!("wrong variant");
        };
        assert_eq!(total_responses, 3);
        assert_eq!(
            responses,
            vec![WriteInCount {
                response: "Nice!".to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn multiple_write_in_counts_every_entry() {
        let mut r1 = row("s1");
        r1.multiple_write_ins = vec!["Rust".to_string(), "Go".to_string()];
        let mut r2 = row("s2");
        r2.multiple_write_ins = vec!["rust ".to_string()];
        let QuestionData::Freeform {
            responses,
            total_responses,
        } = reduce_freeform(QuestionType::MultipleWriteIn, &[r1, r2])
        else {
            panic!("wrong variant");
        };
        assert_eq!(total_responses, 3);
        assert_eq!(responses[0].response, "Rust");
        assert_eq!(responses[0].count, 2);
    }

    #[test]
    fn session_counts_for_experience_rows() {
        let rows = vec![
            experience("s1", "x", Some(1), None),
            experience("s1", "y", Some(1), None),
            skipped("s2"),
        ];
        assert_eq!(session_counts(&rows), (2, 1));
    }
}
