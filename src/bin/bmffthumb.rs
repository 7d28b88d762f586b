use anyhow::{Context, bail};
use bmffthumb::{
    ExtractError, ExtractOptions, Limits, PayloadRegion, ScaleError, TrackAssetDescriptor,
    extract_preview_file, scale::rescale_jpeg,
};
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about = "Extract the embedded preview image from CR3/MP4 files")]
struct Args {
    /// Source file, or a directory whose files are all converted
    #[arg(long)]
    source: PathBuf,

    /// Destination directory
    #[arg(long, default_value = ".")]
    dest: PathBuf,

    /// Output name (".jpg" is appended) when the source is a single file
    #[arg(long = "dest-file")]
    dest_file: Option<String>,

    /// Scale factor applied to the preview (1.0 keeps the original bytes)
    #[arg(long, default_value_t = 1.0)]
    size: f64,

    /// 0-based index of the track holding the preview
    #[arg(long, default_value_t = 0)]
    track: usize,

    /// Largest preview sample to load, in MiB
    #[arg(long, default_value_t = 256)]
    max_preview_mib: u64,

    /// Print one JSON report per file instead of log lines
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Trace box-level parsing
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample: Option<TrackAssetDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<PayloadRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_written: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Respect RUST_LOG if set
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = if args.verbose { "trace" } else { "info" };
        format!("bmffthumb={level}")
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if !args.size.is_finite() || args.size <= 0.0 {
        bail!("--size must be a positive number, got {}", args.size);
    }

    let sources = collect_sources(&args.source)?;
    let single = !args.source.is_dir();
    let opts = ExtractOptions {
        track: args.track,
        limits: Limits {
            max_preview_len: args.max_preview_mib.saturating_mul(1 << 20),
            ..Limits::default()
        },
    };

    let mut failures = 0usize;
    for src in &sources {
        let name = if single { args.dest_file.as_deref() } else { None };
        let report = match output_path(&args.dest, name, src) {
            Some(out) => run_one(src, &out, &opts, args.size),
            None => failed(src, None, anyhow::anyhow!("source has no file name")),
        };
        if report.error.is_some() {
            failures += 1;
        }
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    if failures > 0 {
        bail!("{failures} of {} file(s) failed", sources.len());
    }
    Ok(())
}

fn collect_sources(source: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Ok(vec![source.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(source)
        .with_context(|| format!("reading directory {}", source.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<dest>/<name>.jpg`, where `name` defaults to the source file name.
fn output_path(dest: &Path, name: Option<&str>, source: &Path) -> Option<PathBuf> {
    let name = match name {
        Some(n) => n.to_string(),
        None => source.file_name()?.to_string_lossy().into_owned(),
    };
    Some(dest.join(format!("{name}.jpg")))
}

fn run_one(src: &Path, out: &Path, opts: &ExtractOptions, factor: f64) -> Report {
    match convert(src, out, opts, factor) {
        Ok(Converted { sample, payload, written }) => {
            info!(source = %src.display(), output = %out.display(), bytes = written, "wrote preview");
            Report {
                source: src.display().to_string(),
                output: Some(out.display().to_string()),
                sample: Some(sample),
                payload: Some(payload),
                bytes_written: Some(written),
                error_kind: None,
                error: None,
            }
        }
        Err(e) => failed(src, Some(out), e),
    }
}

struct Converted {
    sample: TrackAssetDescriptor,
    payload: PayloadRegion,
    written: usize,
}

fn convert(src: &Path, out: &Path, opts: &ExtractOptions, factor: f64) -> anyhow::Result<Converted> {
    let preview = extract_preview_file(src, opts)?;
    let bytes = if factor == 1.0 {
        preview.bytes
    } else {
        rescale_jpeg(&preview.bytes, factor).context("rescaling preview")?
    };
    std::fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    Ok(Converted {
        sample: preview.descriptor,
        payload: preview.payload,
        written: bytes.len(),
    })
}

fn error_kind(e: &anyhow::Error) -> &'static str {
    if let Some(x) = e.downcast_ref::<ExtractError>() {
        x.kind()
    } else if e.downcast_ref::<ScaleError>().is_some() {
        "scale"
    } else if e.downcast_ref::<std::io::Error>().is_some() {
        "io"
    } else {
        "other"
    }
}

fn failed(src: &Path, out: Option<&Path>, e: anyhow::Error) -> Report {
    let kind = error_kind(&e);
    error!(source = %src.display(), kind, "{e:#}");
    Report {
        source: src.display().to_string(),
        output: out.map(|p| p.display().to_string()),
        sample: None,
        payload: None,
        bytes_written: None,
        error_kind: Some(kind),
        error: Some(format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_keeps_source_file_name() {
        let out = output_path(Path::new("/out"), None, Path::new("/raw/IMG_0001.CR3")).unwrap();
        assert_eq!(out, PathBuf::from("/out/IMG_0001.CR3.jpg"));
    }

    #[test]
    fn output_uses_requested_name() {
        let out = output_path(Path::new("thumbs"), Some("cover"), Path::new("a.cr3")).unwrap();
        assert_eq!(out, PathBuf::from("thumbs/cover.jpg"));
    }

    #[test]
    fn collects_directory_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.cr3"), b"").unwrap();
        std::fs::write(dir.path().join("a.cr3"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = collect_sources(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["a.cr3", "b.cr3"]);
    }

    #[test]
    fn report_carries_the_payload_region() {
        let report = Report {
            source: "a.cr3".into(),
            output: Some("a.cr3.jpg".into()),
            sample: Some(TrackAssetDescriptor {
                track_index: 0,
                sample_size: 10,
                sample_absolute_offset: 120,
            }),
            payload: Some(PayloadRegion { start: 100, len: 50 }),
            bytes_written: Some(10),
            error_kind: None,
            error: None,
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["payload"], serde_json::json!({ "start": 100, "len": 50 }));
        assert_eq!(v["sample"]["sample_absolute_offset"], 120);
        assert!(v.get("error").is_none());
    }

    #[test]
    fn extract_errors_keep_their_kind_through_context() {
        let e = anyhow::Error::from(ExtractError::NotFound(bmffthumb::Stage::Metadata))
            .context("converting");
        assert_eq!(error_kind(&e), "not_found");
    }
}
