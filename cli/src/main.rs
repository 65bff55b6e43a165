//! exammix CLI - exam variant generator

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use exammix::{ExamMixer, MixOptions, SectionKind};

#[derive(Parser)]
#[command(name = "exammix")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Generate shuffled exam variants and answer keys from a DOCX template", long_about = None)]
struct Cli {
    /// Input DOCX template
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output zip file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate variants and answer keys
    Mix {
        /// Input DOCX template
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output zip file (or directory with --dir)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Write the files into a directory instead of a zip
        #[arg(long)]
        dir: bool,

        #[command(flatten)]
        settings: MixArgs,
    },

    /// Check a template and show its structure
    Inspect {
        /// Input DOCX template
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the plain text of a template
    Text {
        /// Input DOCX template
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args, Default)]
struct MixArgs {
    /// JSON options file (flags override its values)
    #[arg(short, long, value_name = "FILE", env = "EXAMMIX_CONFIG")]
    config: Option<PathBuf>,

    /// Number of variants
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Codes for the first variants, comma separated
    #[arg(long, value_delimiter = ',')]
    codes: Vec<String>,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the template's question labels
    #[arg(long)]
    keep_numbering: bool,

    /// Word used in question labels
    #[arg(long)]
    counter_word: Option<String>,

    /// Issuing department
    #[arg(long)]
    institution: Option<String>,

    /// School name
    #[arg(long)]
    school: Option<String>,

    /// Exam title
    #[arg(long)]
    exam_title: Option<String>,

    /// Subject
    #[arg(long)]
    subject: Option<String>,

    /// Duration in minutes
    #[arg(long)]
    duration: Option<String>,
}

impl MixArgs {
    fn into_options(self) -> Result<MixOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => MixOptions::from_json(&fs::read_to_string(path)?)?,
            None => MixOptions::new(),
        };

        if let Some(count) = self.count {
            options = options.with_count(count);
        }
        if !self.codes.is_empty() {
            options = options.with_codes(self.codes);
        }
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        if self.keep_numbering {
            options = options.keep_numbering();
        }
        if let Some(word) = self.counter_word {
            options = options.with_counter_word(word);
        }

        let mut fields = options.header_fields();
        let overrides = [
            (&mut fields.institution, self.institution),
            (&mut fields.school, self.school),
            (&mut fields.exam_title, self.exam_title),
            (&mut fields.subject, self.subject),
            (&mut fields.duration, self.duration),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        Ok(options.with_header(fields))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Mix {
            input,
            output,
            dir,
            settings,
        }) => cmd_mix(&input, output.as_deref(), dir, settings),
        Some(Commands::Inspect { input, json }) => cmd_inspect(&input, json),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: mix if input is provided
            if let Some(input) = cli.input {
                cmd_mix(&input, cli.output.as_deref(), false, MixArgs::default())
            } else {
                println!("{}", "Usage: exammix <FILE> [OUTPUT]".yellow());
                println!("       exammix --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        match e.downcast_ref::<exammix::Error>() {
            Some(err) if err.is_validation() => {
                eprintln!("{}: {}", "Template rejected".red().bold(), err);
                print_issues(err.issues());
                std::process::exit(2);
            }
            _ => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

fn print_issues(issues: &[exammix::ValidationIssue]) {
    for issue in issues {
        eprintln!("  {} {}", "-".dimmed(), issue);
    }
}

fn cmd_mix(
    input: &Path,
    output: Option<&Path>,
    dir: bool,
    settings: MixArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = settings.into_options()?;
    log::debug!("options: {:?}", options);
    let output = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        if dir {
            PathBuf::from(format!("{}_variants", stem))
        } else {
            PathBuf::from(format!("{}_variants.zip", stem))
        }
    });

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading template...");
    let template = fs::read(input)?;
    pb.inc(1);

    pb.set_message(format!("Generating {} variant(s)...", options.exam_count));
    let bundle = match ExamMixer::new(options).generate(&template) {
        Ok(bundle) => bundle,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.inc(1);

    pb.set_message("Writing output...");
    if dir {
        bundle.write_dir(&output)?;
    } else {
        bundle.write_zip(&output)?;
    }
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{} {}", "Output:".green().bold(), output.display());
    let names = bundle.file_names();
    for (i, name) in names.iter().enumerate() {
        let branch = if i + 1 == names.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), name);
    }
    println!(
        "\n{} {} variant(s), {} keyed question(s) each",
        "Generated".green(),
        bundle.stats.variants,
        bundle.stats.keyed_questions()
    );

    Ok(())
}

fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = exammix::inspect_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Body nodes".bold(), summary.node_count);

    println!();
    println!("{}", "Questions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for kind in SectionKind::ALL {
        println!(
            "{}: {}",
            format!("Section {}", kind.roman()).bold(),
            summary.questions[kind.index()]
        );
    }

    println!();
    if summary.is_valid() {
        println!("{}", "Template is valid".green().bold());
    } else {
        println!(
            "{} {} issue(s)",
            "Template has".red().bold(),
            summary.issues.len()
        );
        print_issues(&summary.issues);
    }

    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = exammix::extract_text(input)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "exammix".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam variant generator");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/exammix".dimmed());
    println!("License: MIT");
}
