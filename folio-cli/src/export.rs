//! Export writers: the flat trade table and the full result document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use folio_analytics::{Aggregations, Metrics};
use folio_core::types::{NormalizedData, NormalizedTrade};

/// Write the trades as a semicolon-delimited table.
pub fn write_trades_csv(path: &Path, trades: &[NormalizedTrade]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    wtr.write_record([
        "position_id",
        "name",
        "symbol",
        "side",
        "amount",
        "units",
        "isin",
        "pnl",
    ])?;
    for t in trades {
        let amount = opt_num(t.amount);
        let units = opt_num(t.units);
        let pnl = opt_num(t.pnl);
        wtr.write_record([
            t.position_id.as_str(),
            t.name.as_str(),
            t.symbol.as_str(),
            t.side.map(|s| s.as_str()).unwrap_or(""),
            amount.as_str(),
            units.as_str(),
            t.isin.as_str(),
            pnl.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `{data, metrics, aggregations}` as pretty JSON.
pub fn write_report_json(
    path: &Path,
    data: &NormalizedData,
    metrics: &Metrics,
    aggregations: &Aggregations,
) -> Result<()> {
    let payload = serde_json::json!({
        "data": data,
        "metrics": metrics,
        "aggregations": aggregations,
    });
    let text = serde_json::to_string_pretty(&payload)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::TradeSide;

    fn sample_trade() -> NormalizedTrade {
        NormalizedTrade {
            position_id: "1234567890".into(),
            name: "Elis SA (ELIS.PA)".into(),
            symbol: "ELIS.PA".into(),
            side: Some(TradeSide::Long),
            amount: Some(1000.0),
            units: Some(12.5),
            isin: "FR0012435121".into(),
            pnl: None,
        }
    }

    #[test]
    fn test_csv_shape() {
        let path = std::env::temp_dir().join("folio-test-trades.csv");
        write_trades_csv(&path, &[sample_trade()]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "position_id;name;symbol;side;amount;units;isin;pnl"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1234567890;Elis SA (ELIS.PA);ELIS.PA;Long;1000;12.5;FR0012435121;"
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_document_shape() {
        let path = std::env::temp_dir().join("folio-test-report.json");
        let data = NormalizedData {
            trades: vec![sample_trade()],
            ..Default::default()
        };
        let metrics = Metrics::default();
        let aggs = Aggregations::default();
        write_report_json(&path, &data, &metrics, &aggs).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("data").is_some());
        assert!(value.get("metrics").is_some());
        assert!(value.get("aggregations").is_some());
        assert_eq!(
            value["data"]["trades"][0]["position_id"],
            serde_json::json!("1234567890")
        );
        fs::remove_file(&path).ok();
    }
}
