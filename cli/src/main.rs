//! mdexport CLI - Markdown document exporter

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;

use mdexport::{Exporter, PageSize, RenderTarget};

#[derive(Parser)]
#[command(name = "mdexport")]
#[command(version)]
#[command(about = "Export Markdown to PDF, DOCX, or PPTX", long_about = None)]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    to: Format,

    /// Output file (input path with swapped extension if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Body font family
    #[arg(long, default_value = "DejaVu Sans", value_name = "NAME")]
    font_family: String,

    /// Base font size in points
    #[arg(long, default_value = "12", value_name = "PT")]
    font_size: u32,

    /// Line height multiplier (PDF only)
    #[arg(long, default_value = "1.4", value_name = "FACTOR")]
    line_height: f32,

    /// Page size (PDF only)
    #[arg(long, value_enum, default_value = "A4")]
    page: Page,

    /// TTF font file to embed in PDF output
    #[arg(long, value_name = "FILE")]
    ttf_path: Option<PathBuf>,

    /// Render Mermaid diagrams directly to PNG instead of SVG
    #[arg(long)]
    mermaid_png: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Paginated PDF document
    Pdf,
    /// Word document
    Docx,
    /// PowerPoint slide deck
    Pptx,
}

impl From<Format> for RenderTarget {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => RenderTarget::Pdf,
            Format::Docx => RenderTarget::Docx,
            Format::Pptx => RenderTarget::Pptx,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Page {
    /// 210 x 297 mm
    #[value(name = "A4", alias = "a4")]
    A4,
    /// 215.9 x 279.4 mm
    #[value(name = "Letter", alias = "letter")]
    Letter,
}

impl From<Page> for PageSize {
    fn from(page: Page) -> Self {
        match page {
            Page::A4 => PageSize::A4,
            Page::Letter => PageSize::Letter,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut exporter = Exporter::new(cli.to.into())
        .with_font_family(cli.font_family)
        .with_font_size(cli.font_size)
        .with_line_height(cli.line_height)
        .with_page_size(cli.page.into())
        .with_mermaid_png(cli.mermaid_png);
    if let Some(ttf) = cli.ttf_path {
        exporter = exporter.with_ttf_path(ttf);
    }

    let result = match cli.output {
        Some(output) => exporter
            .export_file_to(&cli.input, &output)
            .map(|()| output),
        None => exporter.export_file(&cli.input),
    };

    match result {
        Ok(path) => {
            println!("{} {}", "Saved to".green(), path.display());
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_values_parse_as_documented() {
        let cli =
            Cli::try_parse_from(["mdexport", "in.md", "--to", "pdf", "--page", "A4"]).unwrap();
        assert_eq!(cli.page, Page::A4);

        let cli =
            Cli::try_parse_from(["mdexport", "in.md", "--to", "pdf", "--page", "Letter"])
                .unwrap();
        assert_eq!(cli.page, Page::Letter);

        // Lowercase spellings stay accepted.
        let cli =
            Cli::try_parse_from(["mdexport", "in.md", "--to", "pdf", "--page", "letter"])
                .unwrap();
        assert_eq!(cli.page, Page::Letter);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mdexport", "in.md", "--to", "docx"]).unwrap();
        assert_eq!(cli.page, Page::A4);
        assert_eq!(cli.font_family, "DejaVu Sans");
        assert_eq!(cli.font_size, 12);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_to_is_required() {
        assert!(Cli::try_parse_from(["mdexport", "in.md"]).is_err());
    }
}
