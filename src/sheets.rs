use anyhow::Context;
use async_trait::async_trait;
use google_sheets4::api::ValueRange;
use google_sheets4::Sheets;
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sync::RecordStore;

/// A fixed range of one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    hub: Sheets<HttpsConnector<HttpConnector>>,
    sheet_id: String,
    range: String,
}

impl SheetsClient {
    pub fn new(
        hub: Sheets<HttpsConnector<HttpConnector>>,
        sheet_id: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            hub,
            sheet_id: sheet_id.into(),
            range: range.into(),
        }
    }
}

#[async_trait]
impl RecordStore for SheetsClient {
    async fn read(&self) -> Result<Vec<Vec<String>>> {
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.sheet_id, &self.range)
            .doit()
            .await
            .with_context(|| format!("Failed to read {}", self.range))
            .map_err(Error::Store)?;

        Ok(value_range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append(&self, rows: Vec<Vec<String>>) -> Result<()> {
        let req = ValueRange {
            values: Some(
                rows.into_iter()
                    .map(|row| row.into_iter().map(Value::String).collect())
                    .collect(),
            ),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .values_append(req, &self.sheet_id, &self.range)
            .value_input_option("USER_ENTERED")
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .with_context(|| format!("Failed to append to {}", self.range))
            .map_err(Error::Store)?;
        Ok(())
    }
}

/// Sheet cells come back as JSON; keys are compared as text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_become_text() {
        assert_eq!(cell_text(json!("<id@x>")), "<id@x>");
        assert_eq!(cell_text(json!(42)), "42");
        assert_eq!(cell_text(json!(true)), "true");
        assert_eq!(cell_text(Value::Null), "");
    }
}
