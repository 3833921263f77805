use clap::{Parser, Subcommand, ValueEnum};
use pb_core::library::{self, Category};
use pb_core::{Document, ExportConfig, ImportError, NodeId, emit_html, emit_jsx};
use pb_editor::{Editor, EditorConfig};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};
use crate::script;

#[derive(Debug, Parser)]
#[command(
    name = "pb",
    about = "Inspect, validate, export and script edits of page builder documents",
    version
)]
pub struct Cli {
    /// Log mutations and history movement (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Editor settings (JSON) used by `edit`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the component library.
    Catalog {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a document for structural problems.
    Validate { file: PathBuf },

    /// Print the document as an indented tree.
    Tree { file: PathBuf },

    /// Export a document as HTML, JSX, JSON or MessagePack.
    Export {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Html)]
        format: Format,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// HTML page title.
        #[arg(long)]
        title: Option<String>,
        /// React component name for JSX.
        #[arg(long)]
        component_name: Option<String>,
    },

    /// Replay an edit script against a document.
    Edit {
        file: PathBuf,
        /// JSON array of steps.
        #[arg(short, long)]
        script: PathBuf,
        /// Write the result to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Jsx,
    Json,
    Msgpack,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Catalog { json } => run_catalog(json),
        Commands::Validate { file } => run_validate(&file),
        Commands::Tree { file } => run_tree(&file),
        Commands::Export {
            file,
            format,
            output,
            title,
            component_name,
        } => {
            let mut config = ExportConfig::default();
            if let Some(title) = title {
                config.title = title;
            }
            if let Some(name) = component_name {
                config.component_name = name;
            }
            run_export(&file, format, output.as_deref(), &config)
        }
        Commands::Edit {
            file,
            script,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_edit(&file, &script, output.as_deref(), config)
        }
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

fn run_catalog(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(library::catalog())?);
        return Ok(());
    }
    for category in Category::ALL {
        println!("{}", category.label());
        for def in library::by_category(category) {
            let marker = if def.allows_children { " [container]" } else { "" };
            println!("  {:<10} {}{marker}", def.kind, def.name);
        }
    }
    Ok(())
}

fn run_validate(path: &Path) -> Result<()> {
    match read_document(path) {
        Ok(doc) => {
            println!("{}: ok, {} node(s)", path.display(), doc.len());
            Ok(())
        }
        Err(CliError::Import {
            source: ImportError::Invalid(diagnostics),
            ..
        }) => {
            for diagnostic in &diagnostics {
                eprintln!("{}: {diagnostic}", path.display());
            }
            Err(CliError::Invalid {
                path: path.to_path_buf(),
                count: diagnostics.len(),
            })
        }
        Err(err) => Err(err),
    }
}

fn run_tree(path: &Path) -> Result<()> {
    let doc = read_document(path)?;
    print!("{}", render_tree(&doc));
    Ok(())
}

fn run_export(
    path: &Path,
    format: Format,
    output: Option<&Path>,
    config: &ExportConfig,
) -> Result<()> {
    let doc = read_document(path)?;
    let bytes = match format {
        Format::Html => emit_html(&doc, config).into_bytes(),
        Format::Jsx => emit_jsx(&doc, config).into_bytes(),
        Format::Json => doc.to_json()?.into_bytes(),
        Format::Msgpack => doc.to_msgpack()?,
    };
    write_output(output, &bytes)
}

fn run_edit(
    path: &Path,
    script_path: &Path,
    output: Option<&Path>,
    config: EditorConfig,
) -> Result<()> {
    let doc = read_document(path)?;
    let text = read_text(script_path)?;
    let steps = script::parse(&text).map_err(|source| CliError::Script {
        path: script_path.to_path_buf(),
        source,
    })?;

    let mut editor = Editor::with_document(doc, config).map_err(|source| CliError::Rejected {
        path: path.to_path_buf(),
        source,
    })?;
    let summary = script::run(&mut editor, steps)
        .map_err(|(index, source)| CliError::Step { index, source })?;
    log::info!(
        "{} step(s) applied, {} undone, {} redone",
        summary.applied,
        summary.undone,
        summary.redone
    );

    let mut json = editor.export_json()?;
    json.push('\n');
    write_output(output, json.as_bytes())
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Indented outline: one node per line, children under their parent.
pub fn render_tree(doc: &Document) -> String {
    fn walk(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = doc.get(id) else {
            return;
        };
        let label = node
            .prop_str("content")
            .or_else(|| node.prop_str("label"))
            .map(|text| format!(" \"{text}\""))
            .unwrap_or_default();
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} ({}){label}\n", node.id, node.kind));
        for child in doc.child_ids(id) {
            walk(doc, child, depth + 1, out);
        }
    }

    let mut out = String::new();
    for root in doc.roots() {
        walk(doc, root.id, 0, &mut out);
    }
    out
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a document, as MessagePack for `.msgpack`/`.mpk` files and JSON
/// otherwise.
fn read_document(path: &Path) -> Result<Document> {
    let is_msgpack = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("msgpack" | "mpk")
    );
    let result = if is_msgpack {
        let bytes = fs::read(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Document::from_msgpack(&bytes)
    } else {
        Document::from_json(&read_text(path)?)
    };
    result.map_err(|source| CliError::Import {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    EditorConfig::from_json(&read_text(path)?).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => fs::write(path, bytes).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => std::io::stdout()
            .write_all(bytes)
            .map_err(|source| CliError::Io {
                path: PathBuf::from("<stdout>"),
                source,
            }),
    }
}
