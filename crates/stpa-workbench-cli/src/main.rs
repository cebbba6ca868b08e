use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};
use stpa_workbench_config::Config;
use stpa_workbench_engine::{
    AspectKind, DocUri, IdEnforcer, ScanRenameProvider, Workspace, io,
};
use tracing_subscriber::EnvFilter;

struct Options {
    fix: bool,
    backup_on_fix: bool,
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let fix = args.iter().any(|arg| arg == "--fix");
    let files: Vec<PathBuf> = args[1..]
        .iter()
        .filter(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .collect();

    if let Some(unknown) = args[1..]
        .iter()
        .find(|arg| arg.starts_with("--") && *arg != "--fix")
    {
        eprintln!("Error: unknown option {unknown}");
        eprintln!("Usage: {} [--fix] [file.stpa ...]", args[0]);
        process::exit(1);
    }

    let mut backup_on_fix = true;
    let files = if files.is_empty() {
        // No files given: fall back to the configured specs directory
        match Config::load() {
            Ok(Some(config)) => {
                backup_on_fix = config.backup_on_fix;
                io::scan_spec_files(&config.specs_path).with_context(|| {
                    format!("scanning specs directory {}", config.specs_path.display())
                })?
            }
            Ok(None) => {
                eprintln!("Error: no files given and no config file found");
                eprintln!("Usage: {} [--fix] [file.stpa ...]", args[0]);
                eprintln!("Or create a config file at {}", Config::config_path().display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: failed to load config file: {e}");
                process::exit(1);
            }
        }
    } else {
        if let Ok(Some(config)) = Config::load() {
            backup_on_fix = config.backup_on_fix;
        }
        files
    };

    let options = Options {
        fix,
        backup_on_fix,
        files,
    };

    let mut findings = 0usize;
    for file in &options.files {
        findings += check_file(file, &options)?;
    }

    // findings counts what is still wrong after any fixing
    if findings > 0 {
        process::exit(1);
    }
    Ok(())
}

/// Checks one file, printing parse errors and numbering violations. With
/// `--fix`, renumbers through the engine and rewrites the file. Returns the
/// number of unresolved findings.
fn check_file(path: &Path, options: &Options) -> Result<usize> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let workspace = Arc::new(Workspace::new());
    let uri = DocUri::new(path.to_string_lossy().as_ref());
    let handle = workspace.open(uri.clone(), &text);

    {
        let doc = handle.lock().unwrap();
        if doc.has_parse_errors() {
            for diagnostic in &doc.parse().errors {
                println!(
                    "{}: parse error at {}..{}: {}",
                    path.display(),
                    diagnostic.span.start,
                    diagnostic.span.end,
                    diagnostic.kind
                );
            }
            // numbering cannot be checked (or fixed) on a broken parse
            return Ok(doc.parse().errors.len());
        }
    }

    let misnamed = numbering_violations(&workspace, &uri);
    for (name, want) in &misnamed {
        println!("{}: {name} should be {want}", path.display());
    }
    if misnamed.is_empty() || !options.fix {
        return Ok(misnamed.len());
    }

    let mut enforcer = IdEnforcer::new(workspace.clone(), ScanRenameProvider);
    let edits = enforcer.normalize_document(&uri)?;

    let mut doc = handle.lock().unwrap();
    doc.apply_edits(&edits)
        .with_context(|| format!("applying renumbering edits to {}", path.display()))?;

    if options.backup_on_fix {
        let backup = path.with_extension("stpa.bak");
        fs::write(&backup, &text)
            .with_context(|| format!("writing backup {}", backup.display()))?;
    }
    fs::write(path, doc.text()).with_context(|| format!("writing {}", path.display()))?;
    println!("{}: fixed {} identifiers", path.display(), misnamed.len());
    Ok(0)
}

fn numbering_violations(workspace: &Workspace, uri: &DocUri) -> Vec<(String, String)> {
    let handle = workspace.get(uri).expect("document was just opened");
    let doc = handle.lock().unwrap();

    let mut misnamed = Vec::new();
    for kind in AspectKind::ALL {
        for (i, element) in doc.model().elements(kind).iter().enumerate() {
            let want = format!("{}{}", kind.prefix(), i + 1);
            if element.name != want {
                misnamed.push((element.name.clone(), want));
            }
        }
    }
    misnamed
}
