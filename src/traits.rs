use std::error::Error;

use async_trait::async_trait;

use crate::grid::Grid;
use crate::update::UpdateInstruction;

/// A remote spreadsheet service, that holds the actual task data
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Returns the cells of `range` (in A1 notation) in the given spreadsheet.
    /// An empty range returns an empty grid.
    async fn fetch_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid, Box<dyn Error + Send + Sync>>;

    /// Applies every instruction, in order, to the sheet `sheet_id` of the given spreadsheet.
    /// Returns the raw acknowledgment of the service.
    async fn apply_batch(&self, spreadsheet_id: &str, sheet_id: i64, instructions: &[UpdateInstruction]) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>>;
}
