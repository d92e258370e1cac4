//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  XML only:        estk-dts build --xml Document.xml
  One blob:        estk-dts build --xml Document.xml --blob AdobeScriptHost.dll
  Many blobs:      estk-dts build --xml Document.xml --blob a.dll --blob b.dll
  Whole directory: estk-dts build --xml Document.xml --blob-dir ./natives
  To a file:       estk-dts build --xml Document.xml --blob-dir ./natives --out document.d.ts
  Verbose:         estk-dts build --xml Document.xml --blob-dir ./natives --log-level debug

NOTES:
  - --blob and --blob-dir may both be given; explicit --blob files are read
    first, then every regular file in --blob-dir, sorted by file name.
  - With no --blob/--blob-dir at all, the recovery engine is skipped and the
    declaration is produced from the XML alone (XML-derived placeholder
    names like `uArg1` are left as-is).
  - Pass --require-blobs to turn that silent skip into a hard error, e.g.
    when a build pipeline expects binaries to always be present.
  - Output goes to stdout unless --out is given.
"#)]
pub struct BuildArgs {
    /// Path to the ExtendScript API XML file.
    #[arg(long)]
    pub xml: PathBuf,

    /// Path to a native library binary to cross-reference. Repeatable.
    #[arg(long = "blob")]
    pub blobs: Vec<PathBuf>,

    /// Directory whose regular files are all read as blobs, sorted by name.
    #[arg(long)]
    pub blob_dir: Option<PathBuf>,

    /// Fail instead of silently skipping recovery when no blobs are found.
    #[arg(long)]
    pub require_blobs: bool,

    /// Write the resulting declaration file here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Log level for diagnostic spans (error, warn, info, debug, trace).
    /// Purely informational — never changes the produced declaration.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
