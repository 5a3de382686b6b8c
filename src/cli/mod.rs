// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_json, format_report, format_summary};

use anyhow::{bail, Context, Result};
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::AnalysisConfig;
use crate::core::decoder::{decode_audio, is_supported_extension};
use crate::core::KeyFinder;
use crate::detection::FileReport;

/// Run the CLI
pub fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            AnalysisConfig::from_json(&json)
                .with_context(|| format!("Invalid config: {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    let finder = KeyFinder::with_config(config)?;

    let files = collect_audio_files(&args.inputs);
    if files.is_empty() {
        eprintln!("{}", "No audio files found!".red());
        return Ok(());
    }
    log::info!("found {} audio file(s)", files.len());

    let progress = if args.no_progress || args.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        bar
    };

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool.build().context("Failed to start worker threads")?;

    let results: Vec<(PathBuf, Result<FileReport>)> = pool.install(|| {
        files
            .par_iter()
            .progress_with(progress.clone())
            .map(|path| (path.clone(), analyse_file(&finder, path, args)))
            .collect()
    });
    progress.finish_and_clear();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), e);
            }
        }
    }

    if args.json {
        println!("{}", format_json(&reports)?);
    } else {
        for report in &reports {
            print!("{}", format_report(report, args.verbose));
        }
        if reports.len() + failures > 1 {
            print!("{}", format_summary(&reports, failures));
        }
    }

    if reports.is_empty() && failures > 0 {
        bail!("All {} file(s) failed to analyse", failures);
    }
    Ok(())
}

/// Decode and analyse one file
pub fn analyse_file(finder: &KeyFinder, path: &Path, args: &Args) -> Result<FileReport> {
    let decoded = decode_audio(path)?;
    log::debug!(
        "{}: {} Hz, {} channels, {:.1}s, {}",
        path.display(),
        decoded.sample_rate,
        decoded.audio.channels(),
        decoded.duration_secs(),
        decoded.codec_name
    );

    let estimate = match args.chunk_frames {
        Some(frames) => finder.analyse_in_chunks(&decoded.audio, frames),
        None => finder.analyse_audio(&decoded.audio),
    }
    .with_context(|| format!("Key analysis failed: {}", path.display()))?;

    let mut report = FileReport::new(
        path.display().to_string(),
        decoded.sample_rate,
        decoded.audio.channels(),
        decoded.duration_secs(),
        &estimate,
    );
    if args.verbose {
        report = report.with_alternatives(&estimate, args.alternatives);
    }
    Ok(report)
}

/// Expand inputs into audio files, walking directories recursively
pub fn collect_audio_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            if is_supported_extension(input) {
                files.push(input.clone());
            } else {
                log::warn!("skipping unsupported file: {}", input.display());
            }
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|e| e.into_path())
                .filter(|p| p.is_file() && is_supported_extension(p))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            log::warn!("input not found: {}", input.display());
        }
    }
    files
}
