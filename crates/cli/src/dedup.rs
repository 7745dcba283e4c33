//! `tkmerge run|validate|compare`: config-driven candidate deduplication.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tkmerge_dedup::config::{CandidateFormat, DedupConfig};
use tkmerge_dedup::engine::load_candidates;
use tkmerge_dedup::model::{DedupInput, DedupResult, LayerMatches, MergeOutcome};
use tkmerge_dedup::{compare, merge};

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_UNKNOWN_CANDIDATE, EXIT_USAGE};
use crate::CliError;

fn read_file(path: &Path, code: u8) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::new(code, format!("cannot read {}: {e}", path.display())))
}

fn load_config(config_path: &Path) -> Result<DedupConfig, CliError> {
    let config_str = read_file(config_path, EXIT_INVALID_CONFIG)?;
    Ok(DedupConfig::from_toml(&config_str)?)
}

/// Load and run a config. Candidate paths resolve relative to the config file's directory.
fn run_config(config_path: &Path) -> Result<(DedupConfig, DedupResult), CliError> {
    let config = load_config(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let candidates_path = base_dir.join(&config.candidates);
    let format = config.candidate_format()?;
    log::info!("loading {} candidates from {}", format, candidates_path.display());

    let data = read_file(&candidates_path, EXIT_INPUT)?;
    let input = load_candidates(&data, format)?;
    let result = tkmerge_dedup::run(&config, &input);
    Ok((config, result))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let (config, result) = run_config(&config_path)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    let output_path = output_file.or_else(|| {
        config.output.json.as_ref().map(|p| {
            config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(p)
        })
    });

    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} epoch(s), {} candidates -> {} tracks ({} merges, {} primaries adopted, {} slots invalidated)",
        result.meta.config_name,
        result.epochs.len(),
        s.candidates_in,
        s.tracks_out,
        s.merges,
        s.adopted_primaries,
        s.invalidated_slots,
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "{}: valid (merge_condition = {}, candidates = {})",
        config.name, config.merge_condition, config.candidates
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct PairReport<'a> {
    epoch: u32,
    master: &'a str,
    other: &'a str,
    merge_condition: u32,
    matches: LayerMatches,
    outcome: MergeOutcome,
}

fn compare_pair<'a>(
    input: &DedupInput,
    epoch: u32,
    master_id: &'a str,
    other_id: &'a str,
    merge_condition: u32,
) -> Result<PairReport<'a>, CliError> {
    let candidates = input.epochs.get(&epoch).ok_or_else(|| {
        CliError::new(EXIT_UNKNOWN_CANDIDATE, format!("epoch {epoch} not found"))
    })?;
    let find = |id: &str| {
        candidates
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.track)
            .ok_or_else(|| {
                CliError::new(
                    EXIT_UNKNOWN_CANDIDATE,
                    format!("candidate '{id}' not found in epoch {epoch}"),
                )
            })
    };

    let master = find(master_id)?;
    let other = find(other_id)?;
    let matches = compare(&master, &other);
    let outcome = merge(&master, &other, &matches, merge_condition);

    Ok(PairReport {
        epoch,
        master: master_id,
        other: other_id,
        merge_condition,
        matches,
        outcome,
    })
}

pub fn cmd_compare(
    candidates_path: PathBuf,
    epoch: u32,
    master_id: &str,
    other_id: &str,
    merge_condition: u32,
) -> Result<(), CliError> {
    let format = CandidateFormat::from_path(&candidates_path).ok_or_else(|| {
        CliError::args(format!(
            "cannot infer format of {}",
            candidates_path.display()
        ))
        .with_hint("use a .csv or .json candidate file")
    })?;

    let data = read_file(&candidates_path, EXIT_USAGE)?;
    let input = load_candidates(&data, format)?;
    let report = compare_pair(&input, epoch, master_id, other_id, merge_condition)?;

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json_str}");

    eprintln!(
        "{} vs {}: {} layer match(es), merge {}",
        master_id,
        other_id,
        report.outcome.match_count,
        if report.outcome.match_found { "accepted" } else { "rejected" },
    );
    Ok(())
}
