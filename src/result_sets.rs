use anyhow::{Context, Result, anyhow};
use serde_json::Value;

/// One named table out of a stats-provider payload. The provider returns
/// every endpoint as `resultSets: [{name, headers, rowSet}]`; rows are
/// positional and headers give the column names.
#[derive(Debug, Clone)]
pub struct ResultTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

pub fn find_result_set(payload: &Value, name: &str) -> Result<ResultTable> {
    let sets = payload
        .get("resultSets")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("payload has no resultSets"))?;

    let set = sets
        .iter()
        .find(|s| {
            s.get("name")
                .and_then(|n| n.as_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| anyhow!("result set {name} not present"))?;

    let headers = set
        .get("headers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("result set {name} has no headers"))?
        .iter()
        .filter_map(|h| h.as_str().map(|s| s.to_string()))
        .collect::<Vec<_>>();

    let rows = set
        .get("rowSet")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("result set {name} has no rowSet"))?
        .iter()
        .filter_map(|r| r.as_array().cloned())
        .collect::<Vec<_>>();

    Ok(ResultTable { headers, rows })
}

impl ResultTable {
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("column {name} not in headers"))
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Cell accessors are lenient about numbers arriving as strings; the
// provider is not consistent about it.

pub fn str_cell(row: &[Value], idx: usize) -> Option<&str> {
    row.get(idx)?.as_str()
}

pub fn f64_cell(row: &[Value], idx: usize) -> Option<f64> {
    let v = row.get(idx)?;
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

pub fn i64_cell(row: &[Value], idx: usize) -> Option<i64> {
    let v = row.get(idx)?;
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

pub fn u64_cell(row: &[Value], idx: usize) -> Option<u64> {
    let n = i64_cell(row, idx)?;
    u64::try_from(n).ok()
}
