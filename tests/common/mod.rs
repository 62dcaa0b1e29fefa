//! An in-memory spreadsheet service, that can be told to fail

#![allow(dead_code)]

use std::error::Error;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use task_sheet_relay::traits::SheetGateway;
use task_sheet_relay::{Grid, UpdateInstruction};

/// Describes how a mocked gateway behaves during a given test
///
/// So that a function fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    pub fetch_range_behaviour: (u32, u32),
    pub apply_batch_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            fetch_range_behaviour: (0, n_fails),
            apply_batch_behaviour: (0, n_fails),
        }
    }

    pub fn can_fetch_range(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        decrement(&mut self.fetch_range_behaviour, "fetch_range")
    }
    pub fn can_apply_batch(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        decrement(&mut self.apply_batch_behaviour, "apply_batch")
    }
}

/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    if value.0 > 0 {
        value.0 -= 1;
        Ok(())
    } else if value.1 > 0 {
        value.1 -= 1;
        Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
    } else {
        Ok(())
    }
}

/// A call received by a [`MockGateway`]
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Fetch { spreadsheet_id: String, range: String },
    Batch { spreadsheet_id: String, sheet_id: i64, instructions: Vec<UpdateInstruction> },
}

/// A single-sheet spreadsheet held in memory. Booleans are stored the way Google Sheets displays them
pub struct MockGateway {
    grid: Mutex<Grid>,
    behaviour: Mutex<MockBehaviour>,
    calls: Mutex<Vec<Call>>,
}

impl MockGateway {
    pub fn new(rows: &[&[&str]]) -> Self {
        let grid = rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Self {
            grid: Mutex::new(grid),
            behaviour: Mutex::new(MockBehaviour::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn grid(&self) -> Grid {
        self.grid.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetGateway for MockGateway {
    async fn fetch_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid, Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push(Call::Fetch {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
        });
        self.behaviour.lock().unwrap().can_fetch_range()?;
        Ok(self.grid())
    }

    async fn apply_batch(&self, spreadsheet_id: &str, sheet_id: i64, instructions: &[UpdateInstruction]) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push(Call::Batch {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_id,
            instructions: instructions.to_vec(),
        });
        self.behaviour.lock().unwrap().can_apply_batch()?;

        let mut grid = self.grid.lock().unwrap();
        for instruction in instructions {
            if grid.len() <= instruction.row_index {
                grid.resize(instruction.row_index + 1, Vec::new());
            }
            let row = &mut grid[instruction.row_index];
            if row.len() <= instruction.column_index {
                row.resize(instruction.column_index + 1, String::new());
            }
            row[instruction.column_index] = match instruction.value {
                Some(true) => "TRUE".to_string(),
                Some(false) => "FALSE".to_string(),
                None => String::new(),
            };
        }

        let replies: Vec<_> = instructions.iter().map(|_| json!({})).collect();
        Ok(json!({ "spreadsheetId": spreadsheet_id, "replies": replies }))
    }
}


#[test]
fn test_mock_behaviour() {
    let mut ok = MockBehaviour::new();
    assert!(ok.can_fetch_range().is_ok());
    assert!(ok.can_apply_batch().is_ok());

    let mut now = MockBehaviour::fail_now(2);
    assert!(now.can_fetch_range().is_err());
    assert!(now.can_apply_batch().is_err());
    assert!(now.can_fetch_range().is_err());
    assert!(now.can_fetch_range().is_ok());
    assert!(now.can_apply_batch().is_err());
    assert!(now.can_apply_batch().is_ok());

    let mut custom = MockBehaviour {
        apply_batch_behaviour: (1, 1),
        ..MockBehaviour::default()
    };
    assert!(custom.can_apply_batch().is_ok());
    assert!(custom.can_apply_batch().is_err());
    assert!(custom.can_apply_batch().is_ok());
}
