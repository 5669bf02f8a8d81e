use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use folio_analytics::{Metrics, aggregate, compute_metrics};
use folio_core::normalize::{NormalizeOptions, normalize};
use folio_ingest::{ParseOptions, parse_statement};

mod export;
mod input;

/// Analyze a brokerage statement text dump: extract closed positions,
/// cashflows and account fields, then derive performance metrics.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Brokerage statement analyzer")]
struct Cli {
    /// Statement text dump (pages separated by form feed or `--- PAGE n ---`)
    input: PathBuf,

    /// Positioned-token JSON (`[{"text","x","y","page"}, ...]`) from the decoder
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Recover per-trade pnl from the token geometry (needs --tokens)
    #[arg(long)]
    geometry_pnl: bool,

    /// Use the opening amount as pnl for trades where none was recovered
    #[arg(long)]
    assume_amount_as_pnl: bool,

    /// Write the flat trade table as semicolon-delimited CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Write {data, metrics, aggregations} as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Print the extraction diagnostics trail
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.input.exists() {
        bail!("input not found: {}", cli.input.display());
    }
    let pages = input::load_dump(&cli.input)?;
    let tokens = match &cli.tokens {
        Some(path) => Some(input::load_tokens(path)?),
        None => None,
    };

    let parse_opts = ParseOptions {
        geometry_pnl: cli.geometry_pnl,
    };
    let (raw, diag) = parse_statement(&pages, tokens.as_deref(), &parse_opts);

    let norm_opts = NormalizeOptions {
        assume_amount_as_pnl: cli.assume_amount_as_pnl,
    };
    let data = normalize(&raw, &norm_opts);
    let metrics = compute_metrics(&data);
    let aggregations = aggregate(&data);

    print_report(&data, &metrics);

    if cli.verbose {
        println!();
        println!("diagnostics:");
        println!("  lines: {}", diag.line_count);
        println!("  closed-positions span: {:?}", diag.closed_section);
        println!("  transactions span: {:?}", diag.transactions_section);
        println!("  account fields found: {}", diag.account_fields_found);
        println!("  geometry pnl assigned: {}", diag.geometry_pnl_assigned);
        for note in &diag.notes {
            println!("  note: {note}");
        }
    }

    if let Some(path) = &cli.export_csv {
        export::write_trades_csv(path, &data.trades)?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = &cli.export_json {
        export::write_report_json(path, &data, &metrics, &aggregations)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn print_report(data: &folio_core::types::NormalizedData, metrics: &Metrics) {
    println!("trades:        {}", metrics.trade_count);
    println!("cashflows:     {}", data.cashflows.len());
    println!("win rate:      {}", opt_pct(metrics.winrate));
    println!("profit factor: {}", opt_num(metrics.profit_factor));
    println!("max drawdown:  {:.2}", metrics.max_drawdown);
    println!("dividends:     {:.2}", metrics.dividends);
    println!("realized end:  {:.2}", metrics.realized_equity_end);
    println!("xirr:          {}", opt_pct(metrics.xirr));
}

fn opt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}%", x * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "n/a".to_string())
}
