pub use crate::config::*;
use crate::SurveySource;

/// A builder for assembling a survey and its responses in memory.
///
/// The resulting `MemorySource` answers the same queries a database would.
///
/// ```
/// use survey_tally::builder::Builder;
/// use survey_tally::*;
///
/// let period = Period::new(12, 2024);
/// let mut builder = Builder::new()
///     .section("tools", "Tools", 1)
///     .question("editor", "tools", QuestionType::SingleChoice, 1)
///     .option("editor", "vim", "Vim", 1)
///     .option("editor", "emacs", "Emacs", 2);
///
/// builder.add_single_choice("session-1", period, "editor", "vim")?;
/// builder.add_single_choice("session-2", period, "editor", "emacs")?;
///
/// let source = builder.build();
/// let report = get_question_report(&source, "editor", period)?.unwrap();
/// assert_eq!(report.total_responses, 2);
///
/// # Ok::<(), ReportErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _sections: Vec<Section>,
    pub(crate) _questions: Vec<Question>,
    pub(crate) _options: Vec<(String, SurveyOption)>,
    pub(crate) _responses: Vec<Response>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Adds an active section.
    pub fn section(mut self, slug: &str, title: &str, order: i32) -> Builder {
        self._sections.push(Section {
            slug: slug.to_string(),
            title: title.to_string(),
            order,
            active: true,
        });
        self
    }

    /// Adds an active question to a section.
    pub fn question(
        mut self,
        slug: &str,
        section_slug: &str,
        question_type: QuestionType,
        order: i32,
    ) -> Builder {
        self._questions.push(Question {
            slug: slug.to_string(),
            section_slug: section_slug.to_string(),
            question_type,
            order,
            multiple_max: None,
            active: true,
        });
        self
    }

    /// Adds an active option to a question.
    pub fn option(mut self, question_slug: &str, slug: &str, label: &str, order: i32) -> Builder {
        self._options.push((
            question_slug.to_string(),
            SurveyOption {
                slug: slug.to_string(),
                label: label.to_string(),
                description: None,
                order,
                active: true,
            },
        ));
        self
    }

    pub fn add_section(&mut self, section: Section) {
        self._sections.push(section);
    }

    pub fn add_question(&mut self, question: Question) {
        self._questions.push(question);
    }

    pub fn add_option(&mut self, question_slug: &str, option: SurveyOption) {
        self._options.push((question_slug.to_string(), option));
    }

    /// Adds a response row.
    ///
    /// The question must have been declared first, and the row must carry a period.
    pub fn add_response(&mut self, response: Response) -> Result<(), ReportErrors> {
        if !self
            ._questions
            .iter()
            .any(|q| q.slug == response.question_slug)
        {
            return Err(ReportErrors::InvalidArgument(format!(
                "response for undeclared question {:?}",
                response.question_slug
            )));
        }
        if response.period.is_none() {
            return Err(ReportErrors::InvalidArgument(format!(
                "response of session {:?} has no period",
                response.session_id
            )));
        }
        self._responses.push(response);
        Ok(())
    }

    /// The simplest case: one session picked one option.
    pub fn add_single_choice(
        &mut self,
        session_id: &str,
        period: Period,
        question_slug: &str,
        option_slug: &str,
    ) -> Result<(), ReportErrors> {
        self.add_response(Response {
            session_id: session_id.to_string(),
            period: Some(period),
            question_slug: question_slug.to_string(),
            single_option_slug: Some(option_slug.to_string()),
            ..Default::default()
        })
    }

    /// One session rated one option of an experience question.
    pub fn add_experience(
        &mut self,
        session_id: &str,
        period: Period,
        question_slug: &str,
        option_slug: &str,
        awareness: Option<i32>,
        sentiment: Option<i32>,
    ) -> Result<(), ReportErrors> {
        self.add_response(Response {
            session_id: session_id.to_string(),
            period: Some(period),
            question_slug: question_slug.to_string(),
            option_slug: Some(option_slug.to_string()),
            experience_awareness: awareness,
            experience_sentiment: sentiment,
            ..Default::default()
        })
    }

    pub fn build(self) -> MemorySource {
        MemorySource {
            sections: self._sections,
            questions: self._questions,
            options: self._options,
            responses: self._responses,
        }
    }
}

/// A survey held in memory. Queries filter on the active flags and on the period.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sections: Vec<Section>,
    questions: Vec<Question>,
    options: Vec<(String, SurveyOption)>,
    responses: Vec<Response>,
}

impl MemorySource {
    pub fn num_responses(&self) -> usize {
        self.responses.len()
    }
}

impl SurveySource for MemorySource {
    fn list_active_sections(&self) -> Result<Vec<Section>, ReportErrors> {
        Ok(self.sections.iter().filter(|s| s.active).cloned().collect())
    }

    // Questions are not versioned by period in memory.
    fn list_active_questions(&self, _period: Period) -> Result<Vec<Question>, ReportErrors> {
        Ok(self.questions.iter().filter(|q| q.active).cloned().collect())
    }

    fn list_active_options(&self, question_slug: &str) -> Result<Vec<SurveyOption>, ReportErrors> {
        Ok(self
            .options
            .iter()
            .filter(|(q, o)| q == question_slug && o.active)
            .map(|(_, o)| o.clone())
            .collect())
    }

    fn list_question_responses(
        &self,
        question_slug: &str,
        period: Period,
    ) -> Result<Vec<Response>, ReportErrors> {
        Ok(self
            .responses
            .iter()
            .filter(|r| r.question_slug == question_slug && r.period == Some(period))
            .cloned()
            .collect())
    }

    fn list_session_responses(
        &self,
        session_id: &str,
        period: Period,
    ) -> Result<Vec<Response>, ReportErrors> {
        Ok(self
            .responses
            .iter()
            .filter(|r| r.session_id == session_id && r.period == Some(period))
            .cloned()
            .collect())
    }
}
