// Primitives for reading CSV files.

use crate::report::{
    io_common::{ColumnIndex, ParsedResponse},
    *,
};

/// Reads a CSV file with a header line naming the columns.
pub fn read_csv_responses(path: String, rs: &ResponseSource) -> BRptResult<Vec<ParsedResponse>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .context(CsvOpenSnafu {})?;
    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_responses: header: {:?}", header);
    let columns = ColumnIndex::new(&path, &header)?;

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu {})?;
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        let cells: Vec<Option<String>> = line.iter().map(|s| Some(s.to_string())).collect();
        debug!("read_csv_responses: lineno: {:?} row: {:?}", lineno, &cells);
        res.push(columns.parse_row(lineno, &cells, rs.list_delimiter())?);
    }
    Ok(res)
}
