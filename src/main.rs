//! # Formpress CLI
//!
//! Usage:
//!   formpress template.json record.json -o report.json
//!   cat template.json | formpress - record.json
//!   formpress template.json record.json --render-dir out/ --font-dir fonts/
//!   formpress template.json --preview

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;

use formpress::render::{HandoffLoader, RenderConfig, Renderer};
use formpress::{BuildOptions, DataRecord, DocumentBuilder, Template};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble a form template and a record into a document description")]
struct Args {
    /// Template JSON (fields, headerConfig, pdfMetadata). `-` reads stdin.
    template: String,

    /// Record JSON keyed by field id. Omit for an empty record.
    record: Option<PathBuf>,

    /// Write the document description here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Logo used in the page header, overriding the template's.
    #[arg(long)]
    logo: Option<String>,

    /// Render through the bundled backend and write the result into this directory.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Directory holding the font family files. Defaults to FORMPRESS_FONT_DIR.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Print a preview data URL instead of the description.
    #[arg(long)]
    preview: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> formpress::Result<()> {
    let template_json = if args.template == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.template)?
    };
    let template = Template::from_json(&template_json)?;
    template.require_fields()?;

    let record = match &args.record {
        Some(path) => DataRecord::from_json(&fs::read_to_string(path)?)?,
        None => DataRecord::new(),
    };

    let builder = DocumentBuilder::new(BuildOptions {
        bundled_logo: args.logo.clone(),
        ..Default::default()
    });
    let doc = builder.build_template(&template, &record);

    if args.preview || args.render_dir.is_some() {
        let mut config = RenderConfig::from_env();
        if args.font_dir.is_some() {
            config.font_dir = args.font_dir.clone();
        }
        let renderer = Renderer::new(HandoffLoader::new(config));

        if let Some(dir) = &args.render_dir {
            fs::create_dir_all(dir)?;
            let path = renderer.download(&doc, &doc.display_title, dir)?;
            eprintln!("✓ Rendered '{}' to {}", doc.display_title, path.display());
        }
        if args.preview {
            let preview = renderer.preview(&doc)?;
            println!("{}", preview.data_url());
            renderer.release(preview);
        }
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&doc)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("✓ Written {} bytes to {}", json.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
