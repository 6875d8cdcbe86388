// Responses exported as a JSON array of objects.

use crate::report::{io_common::ParsedResponse, *};

pub fn read_json_responses(path: String) -> BRptResult<Vec<ParsedResponse>> {
    let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: path.clone() })?;
    let res: Vec<ParsedResponse> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_json_responses: {} responses in {:?}", res.len(), path);
    Ok(res)
}
