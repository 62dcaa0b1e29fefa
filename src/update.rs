//! Single-cell updates, and how a day of task states is turned into a batch of them

use serde::Serialize;

use crate::task::TaskStates;

/// The only part of a cell that is overwritten by an update
pub const UPDATED_FIELDS: &str = "userEnteredValue";

/// Addresses one cell of the remote sheet, and the value it should hold.
///
/// A `None` value means the task was not part of the request: the cell is sent without any explicit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateInstruction {
    pub row_index: usize,
    pub column_index: usize,
    pub value: Option<bool>,
}

impl UpdateInstruction {
    pub fn new(row_index: usize, column_index: usize, value: Option<bool>) -> Self {
        Self { row_index, column_index, value }
    }

    /// Build the `updateCells` request the Sheets API expects for this instruction
    pub fn to_request(&self, sheet_id: i64) -> Request {
        Request {
            update_cells: UpdateCells {
                range: GridRange {
                    sheet_id,
                    start_row_index: self.row_index,
                    end_row_index: self.row_index + 1,
                    start_column_index: self.column_index,
                    end_column_index: self.column_index + 1,
                },
                rows: vec![RowData {
                    values: vec![CellData {
                        user_entered_value: ExtendedValue { bool_value: self.value },
                    }],
                }],
                fields: UPDATED_FIELDS,
            },
        }
    }
}

/// Body of a `spreadsheets:batchUpdate` call
#[derive(Debug, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

impl BatchUpdate {
    pub fn new(sheet_id: i64, instructions: &[UpdateInstruction]) -> Self {
        Self {
            requests: instructions.iter().map(|i| i.to_request(sheet_id)).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    update_cells: UpdateCells,
}

#[derive(Debug, Serialize)]
struct UpdateCells {
    range: GridRange,
    rows: Vec<RowData>,
    fields: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GridRange {
    sheet_id: i64,
    start_row_index: usize,
    end_row_index: usize,
    start_column_index: usize,
    end_column_index: usize,
}

#[derive(Debug, Serialize)]
struct RowData {
    values: Vec<CellData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    user_entered_value: ExtendedValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    bool_value: Option<bool>,
}


/// Plan one update per task column of `header`, left to right, for the row at `row_index`.
///
/// The header's column 0 (the date) is never written. Tasks of the header that `tasks` does not mention
/// still get an instruction, with no value. Tasks of `tasks` that are not in the header are ignored.
pub fn plan_updates(header: &[String], tasks: &TaskStates, row_index: usize) -> Vec<UpdateInstruction> {
    header.iter()
        .enumerate()
        .skip(1)
        .map(|(column_index, name)| UpdateInstruction::new(row_index, column_index, tasks.get(name)))
        .collect()
}


#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_plan_updates() {
        let header = strings(&["Date", "Run", "Read", "Cook"]);
        let tasks: TaskStates = vec![("Cook", true), ("Run", false), ("Read", true)].into_iter().collect();

        let planned = plan_updates(&header, &tasks, 7);
        assert_eq!(planned, vec![
            UpdateInstruction::new(7, 1, Some(false)),
            UpdateInstruction::new(7, 2, Some(true)),
            UpdateInstruction::new(7, 3, Some(true)),
        ]);
    }

    #[test]
    fn test_missing_tasks_have_no_value() {
        let header = strings(&["Date", "Run", "Read"]);
        let tasks: TaskStates = vec![("Run", true), ("Swim", true)].into_iter().collect();

        let planned = plan_updates(&header, &tasks, 1);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].value, Some(true));
        assert_eq!(planned[1].value, None);
        assert_eq!(planned[1].column_index, 2);

        assert!(plan_updates(&strings(&["Date"]), &tasks, 1).is_empty());
    }

    #[test]
    fn test_request_shape() {
        let body = BatchUpdate::new(42, &[
            UpdateInstruction::new(3, 1, Some(true)),
            UpdateInstruction::new(3, 2, None),
        ]);

        let expected = json!({
            "requests": [
                {
                    "updateCells": {
                        "range": {
                            "sheetId": 42,
                            "startRowIndex": 3,
                            "endRowIndex": 4,
                            "startColumnIndex": 1,
                            "endColumnIndex": 2,
                        },
                        "rows": [{ "values": [{ "userEnteredValue": { "boolValue": true } }] }],
                        "fields": "userEnteredValue",
                    }
                },
                {
                    "updateCells": {
                        "range": {
                            "sheetId": 42,
                            "startRowIndex": 3,
                            "endRowIndex": 4,
                            "startColumnIndex": 2,
                            "endColumnIndex": 3,
                        },
                        "rows": [{ "values": [{ "userEnteredValue": {} }] }],
                        "fields": "userEnteredValue",
                    }
                },
            ]
        });
        assert_eq!(serde_json::to_value(&body).unwrap(), expected);
    }
}
