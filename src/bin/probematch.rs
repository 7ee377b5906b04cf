use clap::{Parser, Subcommand};
use polars::prelude::*;

use probematch::seqio;

/// Probematch CLI
#[derive(Parser)]
#[command(name = "probematch")]
#[command(version)]
#[command(about = "Exact probe matching in nucleotide targets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a probe CSV against a target sequence file
    Search {
        /// Probe CSV (rows of name,sequence; header optional)
        probes: String,
        /// Target sequence file (plain text, FASTA or FASTQ)
        target: String,
        /// Emit match CSV to stdout instead of a table
        #[arg(long)]
        csv: bool,
        /// Write match CSV to a file
        #[arg(long)]
        output: Option<String>,
        /// Write matches and a summary to a JSON file
        #[arg(long)]
        json: Option<String>,
        /// Threads (0/None = all)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print the reverse complement of a sequence
    Revcomp {
        /// Sequence to complement (A/T/G/C, case-insensitive)
        sequence: String,
    },

    /// Validate a probe CSV without searching
    Validate {
        /// Probe CSV (rows of name,sequence; header optional)
        probes: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { probes, target, csv, output, json, threads } => {
            cmd_search(&probes, &target, csv, output.as_deref(), json.as_deref(), threads)?;
        }
        Commands::Revcomp { sequence } => {
            println!("{}", probematch::reverse_complement(&sequence)?);
        }
        Commands::Validate { probes } => {
            cmd_validate(&probes)?;
        }
    }

    Ok(())
}

/// Report rejected rows to stderr, python-GUI style: first five, then a count.
fn report_invalid(invalid: &[probematch::InvalidProbe]) {
    if invalid.is_empty() {
        return;
    }
    eprintln!("{} probe(s) with invalid sequences (only A, T, G, C allowed):", invalid.len());
    for p in invalid.iter().take(5) {
        eprintln!("  - line {}: {}: {}", p.line, p.name, p.sequence);
    }
    if invalid.len() > 5 {
        eprintln!("  ... and {} more", invalid.len() - 5);
    }
}

fn cmd_search(
    probes_path: &str,
    target_path: &str,
    csv: bool,
    output: Option<&str>,
    json: Option<&str>,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    let set = seqio::read_probe_csv(probes_path)?;
    report_invalid(&set.invalid);
    if set.probes.is_empty() {
        anyhow::bail!("no valid probes in {} ({} rejected)", probes_path, set.invalid.len());
    }

    let target = seqio::read_target(target_path)?;
    let threads_eff = threads.unwrap_or_else(num_cpus::get).max(1);
    eprintln!(
        "search: probes={} | threads={} | target={} nt",
        set.probes.len(),
        threads_eff,
        target.len()
    );

    let matches = probematch::search_probes_parallel(&set.probes, &target, Some(threads_eff))?;

    if let Some(path) = json {
        let f = std::fs::File::create(path)?;
        seqio::write_matches_json(f, &matches)?;
    }
    if let Some(path) = output {
        let f = std::fs::File::create(path)?;
        seqio::write_matches_csv(f, &matches)?;
    }
    if csv {
        seqio::write_matches_csv(std::io::stdout(), &matches)?;
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches found");
        return Ok(());
    }
    print_match_table(&matches)?;
    println!(
        "Found {} match(es) across {} probe(s)",
        matches.len(),
        set.probes.len()
    );
    Ok(())
}

fn cmd_validate(probes_path: &str) -> anyhow::Result<()> {
    let set = seqio::read_probe_csv(probes_path)?;
    report_invalid(&set.invalid);

    let names: Vec<String> = set.probes.iter().map(|p| p.name().to_string()).collect();
    let seqs: Vec<String> = set.probes.iter().map(|p| p.sequence().to_string()).collect();
    let lens: Vec<u64> = set.probes.iter().map(|p| p.len() as u64).collect();
    let rcs: Vec<String> = set
        .probes
        .iter()
        .map(|p| probematch::reverse_complement(p.sequence()).unwrap_or_default())
        .collect();

    let df = df!(
        "probe"              => names,
        "length"             => lens,
        "sequence"           => seqs,
        "reverse_complement" => rcs,
    )?;
    configure_polars_fmt();
    println!("{}", df);
    println!("{} valid probe(s), {} rejected", set.probes.len(), set.invalid.len());
    Ok(())
}

fn print_match_table(matches: &[probematch::MatchRecord]) -> anyhow::Result<()> {
    let rows = probematch::match_rows(matches);
    let df = df!(
        "probe"       => rows.iter().map(|r| r.0.clone()).collect::<Vec<_>>(),
        "orientation" => rows.iter().map(|r| r.1.clone()).collect::<Vec<_>>(),
        "start"       => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "end"         => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        "matched"     => rows.iter().map(|r| r.4.clone()).collect::<Vec<_>>(),
    )?;
    configure_polars_fmt();
    println!("{}", df);
    Ok(())
}

/// Configure Polars display to show all columns and full cell width.
/// These env vars are read by Polars' pretty-printer (fmt feature).
fn configure_polars_fmt() {
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_MAX_COLS", "100000");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
    std::env::set_var("POLARS_FMT_STR_LEN", "100000");
    std::env::set_var("POLARS_TABLE_WIDTH", "65535");
}
