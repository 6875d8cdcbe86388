/*!

This is the long-form manual for `survey_tally` and `surveyrpt`.

## Question types

The following question types are supported:
* `single-choice` (also `demographic-single-choice`) one option out of a list, with an optional write-in
* `multiple-choice` any number of options, with optional write-ins
* `experience` every option is rated on two axes: awareness and sentiment
* `numeric` a number
* `freeform`, `single-write-in`, `multiple-write-in` free text

### `single-choice`

Every answer that was not skipped counts in the denominator, even when the option
it refers to is not active anymore. The options are listed in their display order,
never by count. Write-ins are grouped by their exact text.

### `multiple-choice`

The percentage of an option is its share of all the selections, not of the
respondents. With 2 respondents selecting `a, b` and `a`, option `a` gets 66.7%
and option `b` 33.3%.

### `experience`

Every option is reported on its own, with the number of rows for that option as
the denominator of all its percentages.

| awareness code | meaning |
|----------------|------------------------------|
| 0              | never heard of it |
| 1              | heard of it |
| 2              | used it before |
| 3              | currently using it |

| sentiment code | meaning |
|----------------|----------|
| -1             | negative |
| 0              | neutral |
| 1              | positive |

A row without a valid awareness value is counted as "never heard of it". A row
without a valid sentiment is not counted in the sentiment histogram, so the
sentiment percentages do not always sum to 100.

### `numeric`

Values that cannot be read as a number are dropped. The report contains the mean,
the median, the minimum, the maximum and the count (all zero if there are no values),
and at most 10 ranges of equal width (at least 1) between the minimum and the maximum.

### Free text

Answers are grouped regardless of case and surrounding whitespace. The first text
seen for a group is used as its label.

## Completion

A question is complete for a session if it was skipped, or if at least one of its
rows carries an answer. The percentage is rounded to the closest integer.

## Ranking experience options

Options are sorted on the percentage of a primary level. Ties are broken by the
other levels of the same axis, from the strongest to the weakest:

* awareness: currently using, used before, heard of, never heard
* sentiment: positive, neutral, negative

```
use survey_tally::builder::Builder;
use survey_tally::*;

let p = Period::new(1, 2024);
let mut builder = Builder::new()
    .section("tools", "Tools", 1)
    .question("editors", "tools", QuestionType::Experience, 1)
    .option("editors", "vim", "Vim", 1)
    .option("editors", "emacs", "Emacs", 2);
builder.add_experience("a", p, "editors", "vim", Some(1), Some(0))?;
builder.add_experience("a", p, "editors", "emacs", Some(3), Some(1))?;
let source = builder.build();

if let Some(QuestionReport { data: QuestionData::Experience { options }, .. }) =
    get_question_report(&source, "editors", p)?
{
    let ranked = rank_experience_options(
        &options,
        "awareness".parse::<GroupBy>()?,
        3,
        "desc".parse::<SortDirection>()?,
    )?;
    assert_eq!(ranked[0].option_slug, "emacs");
}
# Ok::<(), ReportErrors>(())
```

## Command line

`surveyrpt` reads a survey description in JSON:

```json
{
  "outputSettings": { "surveyName": "Weekly pulse", "periodKind": "week" },
  "sections": [{ "slug": "tools", "title": "Tools", "order": 1, "active": true }],
  "questions": [
    { "slug": "editors", "section": "tools", "type": "experience", "order": 1, "active": true,
      "options": [{ "slug": "vim", "label": "Vim", "order": 1, "active": true }] }
  ],
  "responseSources": [{ "provider": "csv", "filePath": "responses.csv" }]
}
```

The response files (`json`, `csv` or `xlsx`) have one row per response, with the
columns `session`, `period`, `year`, `question`, `option`, `skipped`,
`singleOption`, `singleWriteIn`, `multipleOptions`, `multipleWriteIns`, `awareness`,
`sentiment`, `freeform`, `numeric` and `comment`. List columns are separated by `;`
unless `listDelimiter` says otherwise.

*/
