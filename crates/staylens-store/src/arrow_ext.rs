//! Lenient CSV decoding into string columns, and typed cell access over
//! dynamically typed Arrow columns.

use std::io::Read;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, StringBuilder, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use csv::ByteRecord;
use tracing::warn;

const BATCH_ROWS: usize = 8192;

/// Read a headed CSV stream with every column as nullable `Utf8`.
///
/// Rows are never rejected. Short rows are padded with nulls. Extra fields
/// and invalid UTF-8 are repaired with a warning naming the line. Empty cells
/// are null. A stream without a header row is an error.
pub(crate) fn read_csv_as_strings<R: Read>(reader: R) -> Result<Vec<RecordBatch>, ArrowError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let names: Vec<String> = csv
        .byte_headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if names.iter().all(String::is_empty) {
        return Err(ArrowError::CsvError("missing header row".to_string()));
    }
    let schema: SchemaRef = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(n, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let mut builders: Vec<StringBuilder> = names.iter().map(|_| StringBuilder::new()).collect();
    let mut batches = Vec::new();
    let mut pending = 0usize;
    let mut record = ByteRecord::new();
    while csv.read_byte_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |p| p.line());
        if record.len() > names.len() {
            warn!(
                line,
                fields = record.len(),
                expected = names.len(),
                "row has extra fields, keeping the leading ones"
            );
        }
        for (i, builder) in builders.iter_mut().enumerate() {
            match record.get(i) {
                None | Some(b"") => builder.append_null(),
                Some(bytes) => match std::str::from_utf8(bytes) {
                    Ok(text) => builder.append_value(text),
                    Err(_) => {
                        warn!(line, column = %names[i], "invalid UTF-8 in cell, decoding lossily");
                        builder.append_value(String::from_utf8_lossy(bytes));
                    }
                },
            }
        }
        pending += 1;
        if pending == BATCH_ROWS {
            batches.push(finish_batch(&schema, &mut builders)?);
            pending = 0;
        }
    }
    if pending > 0 {
        batches.push(finish_batch(&schema, &mut builders)?);
    }
    Ok(batches)
}

fn csv_error(e: csv::Error) -> ArrowError {
    ArrowError::CsvError(e.to_string())
}

fn finish_batch(
    schema: &SchemaRef,
    builders: &mut [StringBuilder],
) -> Result<RecordBatch, ArrowError> {
    let columns: Vec<ArrayRef> = builders
        .iter_mut()
        .map(|b| Arc::new(b.finish()) as ArrayRef)
        .collect();
    RecordBatch::try_new(schema.clone(), columns)
}

pub(crate) fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

/// Trimmed string cell, `None` when null or blank.
pub(crate) fn get_text(col: &dyn Array, row: usize) -> Option<String> {
    get_string(col, row)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn get_f64(col: &dyn Array, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        return Some(arr.value(row));
    }
    if let Some(arr) = any.downcast_ref::<Float32Array>() {
        return Some(f64::from(arr.value(row)));
    }
    get_text(col, row)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub(crate) fn get_index(col: &dyn Array, row: usize) -> Option<usize> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    let value: Option<i64> = if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Some(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Some(i64::from(arr.value(row)))
    } else if let Some(arr) = any.downcast_ref::<UInt32Array>() {
        Some(i64::from(arr.value(row)))
    } else if let Some(arr) = any.downcast_ref::<UInt64Array>() {
        i64::try_from(arr.value(row)).ok()
    } else {
        get_text(col, row).and_then(|s| s.parse::<i64>().ok())
    };
    value.and_then(|v| usize::try_from(v).ok())
}

/// Column index of the first name in `aliases` present in the batch,
/// compared case-insensitively.
pub(crate) fn find_column(batch: &RecordBatch, aliases: &[&str]) -> Option<usize> {
    let schema = batch.schema();
    aliases.iter().find_map(|alias| {
        schema
            .fields()
            .iter()
            .position(|f| f.name().trim().eq_ignore_ascii_case(alias))
    })
}
