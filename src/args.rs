use clap::Parser;

/// This is a reporting program for recurring surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file describing the survey and where its responses are stored, in JSON format.
    /// For more information about the file format, read the manual of the survey_tally crate.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// The index of the period to report on (week or month of the year, depending on the survey).
    #[clap(long, value_parser)]
    pub period: u32,

    /// The year of the period to report on.
    #[clap(long, value_parser)]
    pub year: i32,

    /// (question slug or empty) If specified, only this question is reported. Otherwise all the active
    /// questions are reported.
    #[clap(short, long, value_parser)]
    pub question: Option<String>,

    /// (session id or empty) If specified, the completion of the survey for this session is added to
    /// the summary.
    #[clap(short, long, value_parser)]
    pub session: Option<String>,

    /// ('awareness', 'sentiment' or empty) If specified, the options of the experience questions are
    /// ranked along this axis instead of being listed in display order.
    #[clap(long, value_parser)]
    pub rank_by: Option<String>,

    /// (level code) The primary level used for ranking. Defaults to the strongest level of the axis
    /// (3 for awareness, 1 for sentiment).
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub rank_level: Option<i32>,

    /// ('asc' or 'desc', default desc) The direction of the ranking.
    #[clap(long, value_parser)]
    pub direction: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON format
    /// to the given location. Otherwise it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a summary in JSON format. If provided, surveyrpt will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
