//! End-to-end runner tests: TOML + CSV on disk through to exported artifacts.

use std::path::Path;

use bandtrade_runner::export::save_artifacts;
use bandtrade_runner::{
    export_annotated_csv, load_quotes, run_backtest, BacktestConfig, ParamGrid, ParamSweep,
};

const QUOTES: &str = "\
DATE,OPEN,HIGH,LOW,CLOSE,PC_30_HIGH,PC_30_LOW,PC_30_MID,ST_UPPER_7_3,ST_LOWER_7_3
2024-01-02 06:55:00,104,106,101,105,110,105,107.5,,100
2024-01-02 07:00:00,106,107,105.5,106.5,110,105,107.5,,100
2024-01-02 07:05:00,104,106,101,105,110,105,107.5,,100
2024-01-02 07:10:00,106,107,105.5,106.5,112,105,108.5,,100
2024-01-02 07:15:00,105,113,104,110.5,112,105,108.5,,100
";

const CONFIG: &str = r#"
data = "quotes.csv"
prepare = false

[[indicators]]
type = "price_channel"
period = 30

[[indicators]]
type = "super_trend"
period = 7
multiplier = 3
"#;

fn write_inputs(dir: &Path) -> std::path::PathBuf {
    std::fs::write(dir.join("quotes.csv"), QUOTES).unwrap();
    let config = dir.join("run.toml");
    std::fs::write(&config, CONFIG).unwrap();
    config
}

#[test]
fn precomputed_columns_reproduce_example_trade() {
    let dir = tempfile::tempdir().unwrap();
    let config = BacktestConfig::from_file(&write_inputs(dir.path())).unwrap();
    let result = run_backtest(&config).unwrap();

    // Pre-session bar is ignored even though it would trigger.
    assert!(result.run.annotations[0].is_empty());

    let buy = result.run.annotations[2];
    assert_eq!(buy.buy_price, Some(103.33));
    assert_eq!(buy.sl_line, Some(100.0));
    assert_eq!(buy.tp_line, Some(110.0));
    assert_eq!(buy.commission, Some(0.05));

    let exit = result.run.annotations[4];
    assert_eq!(exit.tp_price, Some(112.0));
    assert_eq!(exit.equity, Some(8.66));

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.summary.final_balance, 8.66);
    assert_eq!(result.summary.take_profit_signals, 1);
    assert_eq!(result.summary.win_rate, 100.0);

    let csv = export_annotated_csv(&result.table, &result.run.annotations).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[3].ends_with(",103.33,,,,100,110,0.05,,1"));
    assert!(lines[5].ends_with(",,,,112,,,0.06,8.66,0"));
}

#[test]
fn artifacts_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = BacktestConfig::from_file(&write_inputs(dir.path())).unwrap();
    let result = run_backtest(&config).unwrap();

    let out = dir.path().join("results");
    let run_dir = save_artifacts(&result, &out).unwrap();
    for name in ["annotated.csv", "trades.csv", "summary.json"] {
        assert!(run_dir.join(name).exists(), "{name} missing");
    }

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run_dir.join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["run_id"], result.run_id.as_str());
    assert_eq!(summary["summary"]["final_balance"], 8.66);
    assert_eq!(summary["config"]["session"]["force_close"], "23:40:00");
}

#[test]
fn missing_quote_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(&path, CONFIG).unwrap();
    let config = BacktestConfig::from_file(&path).unwrap();
    let err = run_backtest(&config).unwrap_err();
    assert!(format!("{err:#}").contains("quotes.csv"));
}

#[test]
fn sweep_over_loaded_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..600)
        .map(|i| {
            let mid = 100.0 + (i as f64 * 0.05).sin() * 4.0;
            let h = 7 + i / 60;
            let m = i % 60;
            format!(
                "2024-01-02 {h:02}:{m:02}:00,{:.2},{:.2},{:.2},{:.2}",
                mid - 0.2,
                mid + 0.7,
                mid - 0.8,
                mid + 0.1
            )
        })
        .collect();
    let path = dir.path().join("raw.csv");
    std::fs::write(&path, format!("DATE,OPEN,HIGH,LOW,CLOSE\n{}\n", lines.join("\n"))).unwrap();

    let raw = load_quotes(&path).unwrap();
    let base = BacktestConfig::new(&path, 30, 7, 3.0);
    let grid = ParamGrid {
        pc_periods: vec![15, 30],
        st_periods: vec![7],
        st_multipliers: vec![2.0, 3.0],
    };
    let results = ParamSweep::new().sweep(&grid, &base, &raw, "h").unwrap();
    assert_eq!(results.len(), 4);
    let best = results.best().unwrap();
    assert!(results
        .all()
        .iter()
        .all(|e| e.summary.final_balance <= best.summary.final_balance));
}
