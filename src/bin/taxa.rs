//! taxa - Kraken2 level tables and Control vs UC comparisons
//!
//! Command-line interface over the taxa-contrast library.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use taxa_contrast::config::AnalysisConfig;
use taxa_contrast::data::AbundanceMatrix;
use taxa_contrast::error::Result;
use taxa_contrast::levels;
use taxa_contrast::query::{self, Analyzer};
use taxa_contrast::summarize::{self, ReportType};
use taxa_contrast::taxonomy::Rank;

/// CLI-friendly report type
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliReport {
    /// Plain-language summary for patients
    Lay,
    /// Detailed summary for clinicians and researchers
    Technical,
}

impl From<CliReport> for ReportType {
    fn from(report: CliReport) -> Self {
        match report {
            CliReport::Lay => ReportType::Lay,
            CliReport::Technical => ReportType::Technical,
        }
    }
}

/// Output format of the comparison table
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableFormat {
    Tsv,
    /// Spreadsheet-friendly CSV
    Csv,
}

/// Taxonomic abundance aggregation and group comparison
#[derive(Parser)]
#[command(name = "taxa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one level table per taxonomic depth
    SplitLevels {
        /// Path to the full abundance matrix TSV
        #[arg(short, long)]
        input: PathBuf,

        /// Base path of the level files (default: input without extension)
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Compare Control and UC abundances at one rank
    Compare {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Rank name or depth (e.g. "genus" or "6")
        #[arg(short, long)]
        rank: String,

        #[arg(long, value_enum, default_value = "tsv")]
        format: TableFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the taxa present at a rank (JSON)
    GetTaxa {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,
    },

    /// RPM values of one taxon by group (JSON)
    GetData {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,

        /// Taxon name, spaces or underscores
        #[arg(short, long)]
        taxon: String,
    },

    /// Heatmap data for the most distinct taxa (JSON)
    Heatmap {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,
    },

    /// Shannon diversity by group (JSON)
    Diversity {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,
    },

    /// Mean RPM composition of the most abundant taxa (JSON)
    Stacked {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,
    },

    /// Explain a comparison in plain text
    Explain {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        rank: String,

        #[arg(long, value_enum, default_value = "technical")]
        report: CliReport,
    },

    /// Write Krona text inputs, one file per SRR accession
    Krona {
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an example analysis configuration
    ExampleConfig {
        /// Output path for the YAML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::SplitLevels { input, base } => cmd_split_levels(&input, base.as_deref()),
        Commands::Compare {
            config,
            rank,
            format,
            output,
        } => cmd_compare(&config, &rank, format, output.as_deref()),
        Commands::GetTaxa { config, rank } => {
            load_config(&config).and_then(|cfg| print_json(&query::get_taxa(&cfg, &rank)))
        }
        Commands::GetData {
            config,
            rank,
            taxon,
        } => load_config(&config)
            .and_then(|cfg| print_json(&query::get_data(&cfg, &rank, &taxon))),
        Commands::Heatmap { config, rank } => cmd_heatmap(&config, &rank),
        Commands::Diversity { config, rank } => cmd_diversity(&config, &rank),
        Commands::Stacked { config, rank } => cmd_stacked(&config, &rank),
        Commands::Explain {
            config,
            rank,
            report,
        } => cmd_explain(&config, &rank, report.into()),
        Commands::Krona { config, output } => cmd_krona(&config, &output),
        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    log::debug!("Loading configuration from {:?}", path);
    AnalysisConfig::from_file(path)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_split_levels(input: &Path, base: Option<&Path>) -> Result<()> {
    let matrix = AbundanceMatrix::from_tsv(input)?;
    eprintln!(
        "Loaded {} taxa x {} samples",
        matrix.n_taxa(),
        matrix.n_samples()
    );

    let tables = levels::build_level_tables(&matrix)?;
    let base = base
        .map(Path::to_path_buf)
        .unwrap_or_else(|| levels::default_base(input));
    let written = levels::write_level_tables(&tables, &base)?;
    eprintln!("Done! {} level files written", written.len());
    Ok(())
}

fn cmd_compare(
    config_path: &Path,
    rank: &str,
    format: TableFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rank: Rank = rank.parse()?;
    let analyzer = Analyzer::new(load_config(config_path)?);
    let table = analyzer.comparison(rank)?;
    if table.is_empty() {
        eprintln!("No data available for the {} level", rank);
        return Ok(());
    }

    match (format, output) {
        (TableFormat::Tsv, Some(path)) => table.to_tsv(path)?,
        (TableFormat::Csv, Some(path)) => {
            table.to_csv(path)?;
            log::debug!("Column widths: {:?}", table.column_widths());
        }
        (TableFormat::Tsv, None) => print!("{}", table.to_tsv_string()?),
        (TableFormat::Csv, None) => table.write_csv(std::io::stdout())?,
    }
    if let Some(path) = output {
        eprintln!("Wrote {} taxa to {:?}", table.len(), path);
    }

    let n_inf = table.iter().filter(|s| s.is_control_only()).count();
    if n_inf > 0 {
        eprintln!("  {} taxa found only in control samples", n_inf);
    }
    Ok(())
}

fn cmd_heatmap(config_path: &Path, rank: &str) -> Result<()> {
    let rank: Rank = rank.parse()?;
    let heatmap = Analyzer::new(load_config(config_path)?).heatmap(rank)?;
    print_json(&heatmap)
}

fn cmd_diversity(config_path: &Path, rank: &str) -> Result<()> {
    let rank: Rank = rank.parse()?;
    match Analyzer::new(load_config(config_path)?).diversity(rank)? {
        Some(plot) => print_json(&plot),
        None => {
            eprintln!("No data available for the {} level", rank);
            Ok(())
        }
    }
}

fn cmd_stacked(config_path: &Path, rank: &str) -> Result<()> {
    let rank: Rank = rank.parse()?;
    match Analyzer::new(load_config(config_path)?).stacked_summary(rank)? {
        Some(summary) => print_json(&summary),
        None => {
            eprintln!("No data available for the {} level", rank);
            Ok(())
        }
    }
}

fn cmd_explain(config_path: &Path, rank: &str, report: ReportType) -> Result<()> {
    let rank: Rank = rank.parse()?;
    let config = load_config(config_path)?;
    let summarizer = summarize::from_config(config.ollama.as_ref())?;
    let analyzer = Analyzer::new(config);

    eprintln!("{} for the {} level", report.title(), rank);
    let text = analyzer.explain_comparison(rank, report, summarizer.as_ref())?;
    println!("{}", text);
    Ok(())
}

fn cmd_krona(config_path: &Path, output: &Path) -> Result<()> {
    let written = Analyzer::new(load_config(config_path)?).krona(output)?;
    eprintln!("Done! {} Krona files in {:?}", written.len(), output);
    eprintln!("Render them with: ktImportText -o krona.html {:?}/*_krona.txt", output);
    Ok(())
}

fn cmd_example_config(output: &PathBuf) -> Result<()> {
    let yaml = AnalysisConfig::example().to_yaml()?;
    std::fs::write(output, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);
    Ok(())
}
