// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::{
    io_common::{ColumnIndex, ParsedResponse},
    *,
};

pub fn read_xlsx_responses(path: String, rs: &ResponseSource) -> BRptResult<Vec<ParsedResponse>> {
    let wrange = get_range(&path, rs)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path: path.clone() })?;
    debug!("read_xlsx_responses: header: {:?}", header);
    let header_cells: Vec<Option<String>> = header
        .iter()
        .map(|c| match c {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    let columns = ColumnIndex::new(&path, &header_cells)?;

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // The header is on the first line
        let lineno = (idx + 2) as u64;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            continue;
        }
        let cells: Vec<Option<String>> = row
            .iter()
            .map(|c| read_cell(lineno, c))
            .collect::<RptResult<Vec<Option<String>>>>()?;
        debug!("read_xlsx_responses: lineno: {:?} row: {:?}", lineno, cells);
        res.push(columns.parse_row(lineno, &cells, rs.list_delimiter())?);
    }
    Ok(res)
}

fn read_cell(lineno: u64, cell: &DataType) -> RptResult<Option<String>> {
    match cell {
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Empty => Ok(None),
        DataType::Int(i) => Ok(Some(i.to_string())),
        DataType::Float(f) if f.fract() == 0.0 => Ok(Some(format!("{}", *f as i64))),
        DataType::Float(f) => Ok(Some(f.to_string())),
        DataType::Bool(b) => Ok(Some(b.to_string())),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &String, rs: &ResponseSource) -> BRptResult<calamine::Range<DataType>> {
    let worksheet_name_o = rs.excel_worksheet_name.clone();
    debug!(
        "read_xlsx_responses: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu { path: path.clone() })?
            .context(OpeningExcelSnafu { path: path.clone() })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(RptError::EmptyExcel { path: path.clone() })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_xlsx_responses: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(RptError::AmbiguousExcelWorksheet { path: path.clone() })),
        }
    }
}
