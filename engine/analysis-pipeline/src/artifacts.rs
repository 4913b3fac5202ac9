//! Weekly CSV and parquet artifacts
//!
//! Every file is written next to its destination with a `.tmp` suffix and
//! renamed into place, so readers never see a partial artifact.

use crate::error::Result;
use crate::merge::MergedRecord;
use arrow_array::{ArrayRef, BooleanArray, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use league_client::RosterSlot;
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use stats_fetcher::StatsRow;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const ROSTER_COLUMNS: [&str; 6] = ["team_id", "team_name", "player_id", "player_name", "position", "is_bench"];

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_csv<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    // serialize() only emits a header with the first row
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn strings<'a, T>(rows: &'a [T], f: impl Fn(&'a T) -> Option<&'a str>) -> ArrayRef {
    Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn floats<T>(rows: &[T], f: impl Fn(&T) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn season_stats_batch(stats: &[StatsRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("player", DataType::Utf8, false),
        Field::new("team", DataType::Utf8, true),
        Field::new("position", DataType::Utf8, true),
        Field::new("minutes", DataType::Float64, true),
        Field::new("goals", DataType::Float64, true),
        Field::new("assists", DataType::Float64, true),
        Field::new("xg", DataType::Float64, true),
        Field::new("xa", DataType::Float64, true),
        Field::new("npxg", DataType::Float64, true),
        Field::new("matches", DataType::Float64, true),
        Field::new("starts", DataType::Float64, true),
        Field::new("shots_total", DataType::Float64, true),
        Field::new("shots_on_target", DataType::Float64, true),
        Field::new("key_passes", DataType::Float64, true),
    ]));

    let columns = vec![
        strings(stats, |r| Some(r.player_name.as_str())),
        strings(stats, |r| r.team_name.as_deref()),
        strings(stats, |r| r.position.as_deref()),
        floats(stats, |r| r.minutes),
        floats(stats, |r| r.goals),
        floats(stats, |r| r.assists),
        floats(stats, |r| r.xg),
        floats(stats, |r| r.xa),
        floats(stats, |r| r.npxg),
        floats(stats, |r| r.matches),
        floats(stats, |r| r.starts),
        floats(stats, |r| r.shots_total),
        floats(stats, |r| r.shots_on_target),
        floats(stats, |r| r.key_passes),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn analysis_batch(records: &[MergedRecord]) -> Result<RecordBatch> {
    let text = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);
    let number = |name: &str, nullable: bool| Field::new(name, DataType::Float64, nullable);

    let schema = Arc::new(Schema::new(vec![
        text("team_id", false),
        text("team_name", false),
        text("player_id", false),
        text("player_name", false),
        text("position", true),
        Field::new("is_bench", DataType::Boolean, false),
        Field::new("fbref_id", DataType::UInt64, true),
        text("fbref_player_name", true),
        number("confidence", true),
        text("match_source", true),
        text("team_name_fbref", true),
        text("pos_fbref", true),
        number("goals", true),
        number("assists", true),
        number("xg", true),
        number("xa", true),
        number("npxg", true),
        number("matches", true),
        number("minutes", true),
        number("xG90", false),
        number("xA90", false),
        number("proj_points_simple", false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        strings(records, |r| Some(r.team_id.as_str())),
        strings(records, |r| Some(r.team_name.as_str())),
        strings(records, |r| Some(r.player_id.as_str())),
        strings(records, |r| Some(r.player_name.as_str())),
        strings(records, |r| r.position.as_deref()),
        Arc::new(BooleanArray::from(records.iter().map(|r| r.is_bench).collect::<Vec<_>>())),
        Arc::new(UInt64Array::from(records.iter().map(|r| r.fbref_id.map(|id| id as u64)).collect::<Vec<_>>())),
        strings(records, |r| r.fbref_player_name.as_deref()),
        floats(records, |r| r.confidence),
        strings(records, |r| r.match_source.map(|s| s.as_str())),
        strings(records, |r| r.team_name_fbref.as_deref()),
        strings(records, |r| r.pos_fbref.as_deref()),
        floats(records, |r| r.goals),
        floats(records, |r| r.assists),
        floats(records, |r| r.xg),
        floats(records, |r| r.xa),
        floats(records, |r| r.npxg),
        floats(records, |r| r.matches),
        floats(records, |r| r.minutes),
        floats(records, |r| Some(r.xg90)),
        floats(records, |r| Some(r.xa90)),
        floats(records, |r| Some(r.proj_points_simple)),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Write the week's roster slots as CSV
pub fn write_lineups(path: &Path, roster: &[RosterSlot]) -> Result<()> {
    let tmp = tmp_path(path);
    write_csv(&tmp, &ROSTER_COLUMNS, roster)?;
    fs::rename(&tmp, path)?;
    debug!("Wrote {} roster slots to {:?}", roster.len(), path);
    Ok(())
}

/// Write the raw season stats table as parquet
pub fn write_season_stats(path: &Path, stats: &[StatsRow]) -> Result<()> {
    let batch = season_stats_batch(stats)?;
    let tmp = tmp_path(path);
    write_parquet(&tmp, &batch)?;
    fs::rename(&tmp, path)?;
    debug!("Wrote {} stats rows to {:?}", stats.len(), path);
    Ok(())
}

/// Write the weekly analysis as CSV and parquet. Both files are staged first and
/// only renamed into place once both are complete.
pub fn write_analysis(csv_path: &Path, parquet_path: &Path, records: &[MergedRecord]) -> Result<()> {
    let csv_tmp = tmp_path(csv_path);
    let parquet_tmp = tmp_path(parquet_path);

    let staged = write_csv(&csv_tmp, &MergedRecord::COLUMNS, records)
        .and_then(|_| analysis_batch(records))
        .and_then(|batch| write_parquet(&parquet_tmp, &batch));

    if let Err(e) = staged {
        for tmp in [&csv_tmp, &parquet_tmp] {
            if let Err(cleanup) = fs::remove_file(tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove staged artifact {:?}: {}", tmp, cleanup);
                }
            }
        }
        return Err(e);
    }

    fs::rename(&csv_tmp, csv_path)?;
    fs::rename(&parquet_tmp, parquet_path)?;
    debug!("Wrote {} analysis records to {:?} and {:?}", records.len(), csv_path, parquet_path);
    Ok(())
}
