//! Video Browser CLI
//!
//! Scans a directory tree for video files and renames them in place.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use video_browser::{
    AccessMode, BrowseError, ErrorPolicy, ExclusionSet, Library, LocalStorage, ProgressReporter,
    Renamer, ScanEvent, ScanOptions, ScanSession, ScanStatus, ScanSummary, StorageProvider,
};

const ABOUT: &str = r#"
Video Browser - find and tidy up local video files

Examples:
  video_browser scan ~/Movies                         scan a folder tree
  video_browser scan ~/Movies --no-recursive          top-level files only
  video_browser scan ~/Movies --exclude Movies/Old    skip a folder
  video_browser scan ~/Movies --json                  JSON output
  video_browser rename ~/Movies Movies/Trip/clip.mp4 final
"#;

#[derive(Parser)]
#[command(name = "video_browser")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for video files
    Scan {
        /// Root directory to scan
        root: PathBuf,

        /// Only report files directly inside the root
        #[arg(long)]
        no_recursive: bool,

        /// Folder path to skip, root name first (repeatable)
        #[arg(short = 'e', long = "exclude", value_name = "FOLDER")]
        exclude: Vec<String>,

        /// Skip the folder containing this file path (repeatable)
        #[arg(long = "exclude-folder-of", value_name = "FILE")]
        exclude_folder_of: Vec<String>,

        /// Abort the whole scan when any subdirectory cannot be read
        #[arg(long)]
        strict: bool,

        /// Stop the scan after this many files
        #[arg(long, value_name = "N")]
        max_files: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Stream JSON progress lines to stderr
        #[arg(long)]
        progress: bool,
    },

    /// Rename a video file, keeping its extension
    Rename {
        /// Root directory the path is relative to
        root: PathBuf,

        /// File path, root name first (e.g. Movies/Trip/clip.mp4)
        path: String,

        /// New base name without extension
        new_base: String,

        /// Treat the root as read-only
        #[arg(long)]
        read_only: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let code = match cli.command {
        Some(Commands::Scan {
            root,
            no_recursive,
            exclude,
            exclude_folder_of,
            strict,
            max_files,
            json,
            progress,
        }) => {
            let mut exclusions: ExclusionSet = exclude.into_iter().collect();
            for file in &exclude_folder_of {
                exclusions.exclude(file);
            }
            let options = ScanOptions::builder()
                .recursive(!no_recursive)
                .error_policy(if strict {
                    ErrorPolicy::Abort
                } else {
                    ErrorPolicy::SkipSubtree
                })
                .exclusions(exclusions)
                .build();
            run_scan(root, options, max_files, json, progress)
        }
        Some(Commands::Rename {
            root,
            path,
            new_base,
            read_only,
            json,
        }) => {
            let access = if read_only {
                AccessMode::ReadOnly
            } else {
                AccessMode::ReadWrite
            };
            run_rename(root, &path, &new_base, access, json)
        }
        None => {
            println!("{}", ABOUT);
            println!("Use 'video_browser --help' for all options");
            0
        }
    };
    std::process::exit(code);
}

fn canonical_root(root: PathBuf) -> PathBuf {
    std::fs::canonicalize(&root).unwrap_or(root)
}

fn run_scan(
    root: PathBuf,
    options: ScanOptions,
    max_files: Option<usize>,
    json: bool,
    progress: bool,
) -> i32 {
    let root = canonical_root(root);
    let storage = Arc::new(LocalStorage::default());
    let reporter = ProgressReporter::new(progress);
    let root_name = storage.name(&root);
    info!("Scanning {:?}", root);
    reporter.report_start(&root_name, &options);

    let mut library = Library::with_exclusions(options.exclusions.clone());
    library.set_recursive(options.recursive);
    library.set_limit(max_files);

    let handle = match ScanSession::new(options).spawn(Arc::clone(&storage), root) {
        Ok(handle) => handle,
        Err(err) => return report_failure(&reporter, &err),
    };

    for event in handle.events().iter() {
        match event {
            ScanEvent::EntryFound(entry) => {
                // Entries queued before the cancel landed are dropped
                if library.is_full() {
                    continue;
                }
                reporter.report_found(&entry);
                library.add(entry);
                if library.is_full() {
                    handle.cancel();
                }
            }
            ScanEvent::Terminal(_) => break,
        }
    }
    let summary = match handle.join() {
        Ok(summary) => summary,
        Err(err) => return report_failure(&reporter, &err),
    };
    reporter.report_done(&summary);

    if json {
        let output = serde_json::json!({
            "summary": summary,
            "entries": library.entries(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("Failed to encode results: {}", e),
        }
    } else {
        print_listing(&library, &summary);
    }

    if summary.status == ScanStatus::Failed {
        1
    } else {
        0
    }
}

fn print_listing(library: &Library<PathBuf>, summary: &ScanSummary) {
    for entry in library.entries() {
        println!("{}", entry.path);
    }
    for skipped in &summary.skipped {
        eprintln!("Skipped {}: {}", skipped.path, skipped.message);
    }
    match summary.status {
        ScanStatus::Failed => eprintln!(
            "Scan failed: {}",
            summary.error.as_deref().unwrap_or("unknown error")
        ),
        ScanStatus::Cancelled => println!(
            "Scan stopped after {} files ({}ms)",
            library.len(),
            summary.duration_ms
        ),
        _ if summary.is_empty_result() => println!("No video files found."),
        _ => println!(
            "Scan completed: {} files in {} folders ({}ms)",
            summary.files_found, summary.dirs_visited, summary.duration_ms
        ),
    }
}

fn run_rename(root: PathBuf, path: &str, new_base: &str, access: AccessMode, json: bool) -> i32 {
    let root = canonical_root(root);
    let storage = LocalStorage::new(access);
    let renamer = Renamer::new(&storage, root, access);

    match renamer.rename_path(path, new_base) {
        Ok(result) => {
            if json {
                match serde_json::to_string_pretty(&result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => log::error!("Failed to encode result: {}", e),
                }
            } else {
                println!("{} -> {}", path, result.final_path);
            }
            0
        }
        Err(err) => report_failure(&ProgressReporter::new(false), &err),
    }
}

fn report_failure(reporter: &ProgressReporter, err: &BrowseError) -> i32 {
    reporter.report_error(err);
    if err.is_benign() {
        return 0;
    }
    eprintln!("Error: {}", err.message);
    1
}
