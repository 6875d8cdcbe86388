use log::debug;
use std::cmp::Ordering;

use crate::config::*;

/// One level of either axis, used as a comparison key.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum RankKey {
    Awareness(Awareness),
    Sentiment(Sentiment),
}

impl RankKey {
    fn value(&self, option: &ExperienceOptionReport) -> f64 {
        match self {
            RankKey::Awareness(level) => option.awareness_percentage(*level),
            RankKey::Sentiment(level) => option.sentiment_percentage(*level),
        }
    }
}

/// The primary level first, then the rest of the axis ladder in ladder order.
fn cascade_keys(group_by: GroupBy, primary_level: i32) -> Result<Vec<RankKey>, ReportErrors> {
    match group_by {
        GroupBy::Awareness => {
            let primary = Awareness::from_code(primary_level).ok_or_else(|| {
                ReportErrors::InvalidArgument(format!(
                    "{} is not an awareness level",
                    primary_level
                ))
            })?;
            let mut keys = vec![RankKey::Awareness(primary)];
            keys.extend(
                Awareness::LADDER
                    .iter()
                    .filter(|l| **l != primary)
                    .map(|l| RankKey::Awareness(*l)),
            );
            Ok(keys)
        }
        GroupBy::Sentiment => {
            let primary = Sentiment::from_code(primary_level).ok_or_else(|| {
                ReportErrors::InvalidArgument(format!(
                    "{} is not a sentiment level",
                    primary_level
                ))
            })?;
            let mut keys = vec![RankKey::Sentiment(primary)];
            keys.extend(
                Sentiment::LADDER
                    .iter()
                    .filter(|l| **l != primary)
                    .map(|l| RankKey::Sentiment(*l)),
            );
            Ok(keys)
        }
    }
}

fn compare_cascade(
    a: &ExperienceOptionReport,
    b: &ExperienceOptionReport,
    keys: &[RankKey],
    direction: SortDirection,
) -> Ordering {
    for key in keys.iter() {
        let (va, vb) = (key.value(a), key.value(b));
        let ord = va.partial_cmp(&vb).unwrap_or(Ordering::Equal);
        if ord != Ordering::Equal {
            return match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}

/// Orders the options of an experience question for display.
///
/// Options are compared on their percentage at `primary_level` of the `group_by` axis.
/// Ties are broken by the next levels of the axis ladder (strongest engagement or most
/// positive first). Options that are equal on every level keep their input order.
///
/// The level is the stored code of the level (for instance 3 for "currently using").
/// An unknown level is a caller bug and is reported as an error.
pub fn rank_experience_options(
    options: &[ExperienceOptionReport],
    group_by: GroupBy,
    primary_level: i32,
    direction: SortDirection,
) -> Result<Vec<ExperienceOptionReport>, ReportErrors> {
    let keys = cascade_keys(group_by, primary_level)?;
    debug!(
        "rank_experience_options: {} options, keys: {:?}, direction: {:?}",
        options.len(),
        keys,
        direction
    );
    let mut res = options.to_vec();
    // sort_by is stable: full ties keep the input order.
    res.sort_by(|a, b| compare_cascade(a, b, &keys, direction));
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_with(
        slug: &str,
        awareness: &[(Awareness, f64)],
        sentiment: &[(Sentiment, f64)],
    ) -> ExperienceOptionReport {
        ExperienceOptionReport {
            option_slug: slug.to_string(),
            label: slug.to_string(),
            description: None,
            display_order: 0,
            total: 100,
            awareness: awareness
                .iter()
                .map(|(level, p)| LevelCount {
                    level: *level,
                    count: *p as u64,
                    percentage: *p,
                })
                .collect(),
            sentiment: sentiment
                .iter()
                .map(|(level, p)| LevelCount {
                    level: *level,
                    count: *p as u64,
                    percentage: *p,
                })
                .collect(),
            combined: vec![],
        }
    }

    fn slugs(options: &[ExperienceOptionReport]) -> Vec<&str> {
        options.iter().map(|o| o.option_slug.as_str()).collect()
    }

    #[test]
    fn next_ladder_level_breaks_ties() {
        let a = option_with(
            "a",
            &[(Awareness::Using, 27.0), (Awareness::UsedBefore, 20.0)],
            &[],
        );
        let b = option_with(
            "b",
            &[(Awareness::Using, 27.0), (Awareness::UsedBefore, 29.0)],
            &[],
        );
        let res = rank_experience_options(
            &[a, b],
            GroupBy::Awareness,
            Awareness::Using.code(),
            SortDirection::Desc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["b", "a"]);
    }

    #[test]
    fn ascending_flips_every_key() {
        let a = option_with(
            "a",
            &[(Awareness::Using, 27.0), (Awareness::UsedBefore, 20.0)],
            &[],
        );
        let b = option_with(
            "b",
            &[(Awareness::Using, 27.0), (Awareness::UsedBefore, 29.0)],
            &[],
        );
        let c = option_with("c", &[(Awareness::Using, 5.0)], &[]);
        let res = rank_experience_options(
            &[a, b, c],
            GroupBy::Awareness,
            Awareness::Using.code(),
            SortDirection::Asc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["c", "a", "b"]);
    }

    #[test]
    fn primary_level_comes_before_the_ladder() {
        let a = option_with(
            "a",
            &[(Awareness::Using, 90.0), (Awareness::HeardOf, 10.0)],
            &[],
        );
        let b = option_with(
            "b",
            &[(Awareness::Using, 10.0), (Awareness::HeardOf, 90.0)],
            &[],
        );
        let res = rank_experience_options(
            &[a, b],
            GroupBy::Awareness,
            Awareness::HeardOf.code(),
            SortDirection::Desc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["b", "a"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let a = option_with("a", &[(Awareness::Using, 50.0)], &[(Sentiment::Positive, 10.0)]);
        let b = option_with("b", &[(Awareness::Using, 50.0)], &[(Sentiment::Positive, 10.0)]);
        let c = option_with("c", &[(Awareness::Using, 50.0)], &[(Sentiment::Positive, 10.0)]);
        let input = vec![b, c, a];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let res = rank_experience_options(
                &input,
                GroupBy::Awareness,
                Awareness::Using.code(),
                direction,
            )
            .unwrap();
            assert_eq!(slugs(&res), vec!["b", "c", "a"]);
        }
        // The input is left alone.
        assert_eq!(slugs(&input), vec!["b", "c", "a"]);
    }

    #[test]
    fn sentiment_ladder() {
        let a = option_with(
            "a",
            &[],
            &[(Sentiment::Neutral, 40.0), (Sentiment::Positive, 10.0)],
        );
        let b = option_with(
            "b",
            &[],
            &[(Sentiment::Neutral, 40.0), (Sentiment::Positive, 30.0)],
        );
        let res = rank_experience_options(
            &[a, b],
            GroupBy::Sentiment,
            Sentiment::Neutral.code(),
            SortDirection::Desc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["b", "a"]);
    }

    #[test]
    fn options_without_data_sort_last() {
        let empty = option_with("empty", &[], &[]);
        let a = option_with("a", &[(Awareness::NeverHeard, 1.0)], &[]);
        let res = rank_experience_options(
            &[empty.clone(), a.clone()],
            GroupBy::Awareness,
            Awareness::Using.code(),
            SortDirection::Desc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["a", "empty"]);
        let res = rank_experience_options(
            &[a, empty],
            GroupBy::Awareness,
            Awareness::Using.code(),
            SortDirection::Asc,
        )
        .unwrap();
        assert_eq!(slugs(&res), vec!["empty", "a"]);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let res = rank_experience_options(&[], GroupBy::Sentiment, 3, SortDirection::Desc);
        assert!(matches!(res, Err(ReportErrors::InvalidArgument(_))));
        let res = rank_experience_options(&[], GroupBy::Awareness, -1, SortDirection::Desc);
        assert!(matches!(res, Err(ReportErrors::InvalidArgument(_))));
    }

    #[test]
    fn unknown_axis_or_direction_is_rejected() {
        assert!("popularity".parse::<GroupBy>().is_err());
        assert!("down".parse::<SortDirection>().is_err());
        assert_eq!("sentiment".parse::<GroupBy>(), Ok(GroupBy::Sentiment));
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
    }
}
