//! unslide CLI - PowerPoint extraction tool
//!
//! A command-line tool for converting PPTX presentations to Markdown or JSON.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unslide::container::PptxContainer;
use unslide::pptx::NotesExtractor;
use unslide::render::JsonFormat;
use unslide::ConvertOptions;

/// PowerPoint extraction to Markdown and JSON
#[derive(Parser)]
#[command(
    name = "unslide",
    author = "iyulab",
    version,
    about = "Extract content from PowerPoint presentations",
    long_about = "unslide - PowerPoint (PPTX) extraction tool.\n\n\
                  Converts slides, tables, images, chart data, speaker notes and\n\
                  grouped shapes to Markdown or JSON."
)]
struct Cli {
    /// Log extraction details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a presentation to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Options file (JSON); flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip images
        #[arg(long)]
        no_images: bool,

        /// Skip charts
        #[arg(long)]
        no_charts: bool,

        /// Skip speaker notes
        #[arg(long)]
        no_notes: bool,

        /// Skip grouped-shape processing
        #[arg(long)]
        no_groups: bool,

        /// Reference images by file name instead of embedding them
        #[arg(long)]
        reference_images: bool,

        /// Prefix for image references (implies --reference-images)
        #[arg(long)]
        image_prefix: Option<String>,

        /// Omit slide markers and headings
        #[arg(long)]
        no_slide_numbers: bool,

        /// Omit the metadata header and statistics footer
        #[arg(long)]
        no_metadata: bool,

        /// Mark images whose slide placement is a guess
        #[arg(long)]
        annotate_guesses: bool,
    },

    /// Convert a presentation to JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show presentation information and statistics
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Extract embedded images from a presentation
    Extract {
        /// Input file path
        input: PathBuf,

        /// Output directory for images
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print or search speaker notes
    Notes {
        /// Input file path
        input: PathBuf,

        /// Only show slides whose notes contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Case-sensitive search
        #[arg(long, requires = "search")]
        case_sensitive: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Markdown {
            input,
            output,
            config,
            no_images,
            no_charts,
            no_notes,
            no_groups,
            reference_images,
            image_prefix,
            no_slide_numbers,
            no_metadata,
            annotate_guesses,
        } => {
            let mut options = match config {
                Some(path) => ConvertOptions::from_json_file(path)?,
                None => ConvertOptions::new(),
            };
            if no_images {
                options = options.with_images(false);
            }
            if no_charts {
                options = options.with_charts(false);
            }
            if no_notes {
                options = options.with_notes(false);
            }
            if no_groups {
                options = options.with_groups(false);
            }
            if reference_images || image_prefix.is_some() {
                options = options.with_embedded_images(false);
            }
            if let Some(prefix) = image_prefix {
                options = options.with_image_prefix(prefix);
            }
            if no_slide_numbers {
                options = options.with_slide_numbers(false);
            }
            if no_metadata {
                options = options.with_metadata(false);
            }
            if annotate_guesses {
                options = options.with_low_confidence_annotations(true);
            }

            let pb = create_spinner("Converting presentation...");
            let conversion = unslide::convert_file(&input, &options)?;
            pb.finish_and_clear();

            write_output(output.as_ref(), &conversion.markdown)?;

            if let Some(path) = output {
                let stats = &conversion.deck.stats;
                println!(
                    "{} Converted {} slides to Markdown: {}",
                    "✓".green().bold(),
                    stats.slide_count,
                    path.display()
                );
                if stats.failed_slides > 0 {
                    println!(
                        "{} {} slides could not be read",
                        "!".yellow().bold(),
                        stats.failed_slides
                    );
                }
            }
        }

        Commands::Json {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Extracting presentation...");

            let deck = unslide::extract_deck(&input, &ConvertOptions::default())?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = unslide::render::to_json(&deck, format)?;

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing presentation...");

            let format = unslide::detect_format_from_path(&input)?;
            let deck = unslide::extract_deck(&input, &ConvertOptions::default())?;

            pb.finish_and_clear();

            println!("{}", "Presentation Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), deck.name);
            println!("{}: {}", "Format".bold(), format);

            if let Some(ref title) = deck.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = deck.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref created) = deck.metadata.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = deck.metadata.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }

            let stats = &deck.stats;
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Slides".bold(), stats.slide_count);
            println!("{}: {}", "Images".bold(), stats.image_count);
            println!("{}: {}", "Charts".bold(), stats.chart_count);
            println!("{}: {}", "Slides with notes".bold(), stats.notes_count);
            println!(
                "{}: {} ({} shapes)",
                "Groups".bold(),
                stats.group_count,
                stats.grouped_shape_count
            );
            if stats.failed_slides > 0 {
                println!("{}: {}", "Unreadable slides".yellow().bold(), stats.failed_slides);
            }
            if stats.low_confidence_matches > 0 {
                println!(
                    "{}: {}",
                    "Guessed image placements".yellow().bold(),
                    stats.low_confidence_matches
                );
            }

            let text = deck.plain_text();
            println!("{}: {}", "Words".bold(), text.split_whitespace().count());
            println!("{}: {}", "Characters".bold(), text.chars().count());
        }

        Commands::Extract { input, output } => {
            let pb = create_spinner("Extracting images...");

            let options = ConvertOptions::default().with_charts(false).with_notes(false);
            let deck = unslide::extract_deck(&input, &options)?;

            fs::create_dir_all(&output)?;

            let mut count = 0;
            for (filename, data) in deck.export_images() {
                fs::write(output.join(&filename), data)?;
                count += 1;
            }

            pb.finish_and_clear();

            if count > 0 {
                println!(
                    "{} Extracted {} images to {}",
                    "✓".green().bold(),
                    count,
                    output.display()
                );
            } else {
                println!("{} No images found in presentation", "!".yellow().bold());
            }
        }

        Commands::Notes {
            input,
            search,
            case_sensitive,
        } => {
            print_notes(&input, search.as_deref(), case_sensitive)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_notes(
    input: &Path,
    search: Option<&str>,
    case_sensitive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let container = PptxContainer::open(input)?;
    let total = container
        .slide_entries()
        .last()
        .map(|(number, _)| *number)
        .unwrap_or(0);

    let mut notes = NotesExtractor::new(&container);
    notes.extract_all(total);

    match search {
        Some(needle) => {
            let matches = notes.search(needle, case_sensitive);
            if matches.is_empty() {
                println!("{} No notes contain {:?}", "!".yellow().bold(), needle);
            }
            for m in matches {
                println!(
                    "{} ({} matches)",
                    format!("Slide {}", m.slide_number).cyan().bold(),
                    m.matches
                );
                println!("{}\n", m.notes);
            }
        }
        None => {
            let stats = notes.stats();
            if stats.slides_with_notes == 0 {
                println!("{} No speaker notes found", "!".yellow().bold());
                return Ok(());
            }
            println!("{}", notes.export_all());
            println!(
                "{} {} of {} slides have notes ({} words)",
                "✓".green().bold(),
                stats.slides_with_notes,
                stats.total_slides,
                stats.total_words
            );
        }
    }
    Ok(())
}

fn print_version() {
    println!("{} {}", "unslide".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PowerPoint (PPTX) extraction to Markdown");
    println!();
    println!("Extracts: slide text, tables, images, charts, speaker notes, grouped shapes");
    println!("Repository: https://github.com/iyulab/unslide");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
        }
    }
    Ok(())
}
