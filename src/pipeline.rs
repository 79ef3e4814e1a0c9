// src/pipeline.rs
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::Path, time::Instant};
use tracing::{debug, info, instrument};

use crate::config::PanelConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::frame::{read_csv, write_csv, write_parquet, SeriesFrame};
use crate::grid::{SheetLoader, XlsxLoader};
use crate::panel::{build_panel, MonthlyPanel, PanelInputs};
use crate::sources::{
    extract_cpif, extract_electricity, extract_expectations, extract_price_plans, extract_wages,
    SourceKind, EXPECTATION_COLUMN, PRICE_PLANS_COLUMN,
};

/// Runs the stages against the files named by a [`PanelConfig`].
pub struct Pipeline<L = XlsxLoader> {
    config: PanelConfig,
    loader: L,
}

impl Pipeline<XlsxLoader> {
    pub fn new(config: PanelConfig) -> Self {
        Self::with_loader(config, XlsxLoader)
    }
}

impl<L: SheetLoader> Pipeline<L> {
    pub fn with_loader(config: PanelConfig, loader: L) -> Self {
        Self { config, loader }
    }

    /// Extract one source from its raw workbook.
    #[instrument(level = "info", skip(self), fields(source = %kind))]
    pub fn extract(&self, kind: SourceKind) -> Result<SeriesFrame> {
        let path = self.config.input_path(kind);
        let t0 = Instant::now();
        let frame = self.extract_source(kind, &path).map_err(|e| {
            let stage = e.stage();
            anyhow::Error::new(e).context(format!(
                "{kind}: {stage} stage failed for {}",
                path.display()
            ))
        })?;
        info!(
            rows = frame.len(),
            path = %path.display(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "extracted"
        );
        Ok(frame)
    }

    fn extract_source(&self, kind: SourceKind, path: &Path) -> ExtractResult<SeriesFrame> {
        let name = kind.name();
        match kind {
            SourceKind::Cpif => {
                let sheet = self.loader.load_first(path)?;
                extract_cpif(&sheet.grid, &self.config.cpif_layout, name)
            }
            SourceKind::Wages => extract_wages(&self.loader.load_first(path)?.grid, name),
            SourceKind::Expectations => {
                extract_expectations(&self.loader.load_first(path)?.grid, name)
            }
            SourceKind::PricePlans => {
                extract_price_plans(&self.loader.load_first(path)?.grid, name)
            }
            SourceKind::Electricity => {
                let sheets = self.loader.load(path)?;
                extract_electricity(&sheets, &self.config.electricity_columns, name)
            }
        }
    }

    /// Extract every source. Nothing is written; the first failing source (in
    /// processing order) is returned.
    pub fn extract_all(&self) -> Result<PanelInputs> {
        let results: Vec<(SourceKind, Result<SeriesFrame>)> = if self.config.parallel {
            SourceKind::ALL[..]
                .par_iter()
                .map(|&kind| (kind, self.extract(kind)))
                .collect()
        } else {
            SourceKind::ALL
                .iter()
                .map(|&kind| (kind, self.extract(kind)))
                .collect()
        };

        let mut frames = Vec::with_capacity(results.len());
        for (kind, result) in results {
            frames.push((kind, result?));
        }
        Ok(inputs_from(frames)?)
    }

    /// Write one intermediate CSV per source, columns in published order.
    pub fn write_intermediates(&self, inputs: &PanelInputs) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir)
            .with_context(|| format!("creating {:?}", self.config.data_dir))?;
        for kind in SourceKind::ALL {
            let path = self.config.output_path(kind);
            let frame = inputs.frame(kind).select(kind.columns())?;
            write_csv(&frame, &path).with_context(|| format!("{kind}: writing {:?}", path))?;
            info!(source = %kind, rows = frame.len(), path = %path.display(), "wrote intermediate");
        }
        Ok(())
    }

    /// Read the intermediate CSVs back. A value column under an unexpected
    /// name in the expectations or price-plans file is renamed.
    pub fn load_intermediates(&self) -> Result<PanelInputs> {
        let mut frames = Vec::with_capacity(SourceKind::ALL.len());
        for kind in SourceKind::ALL {
            let path = self.config.output_path(kind);
            let mut frame = read_csv(&path, kind.name())
                .with_context(|| format!("{kind}: reading {:?}", path))?;
            let expected = match kind {
                SourceKind::Expectations => Some(EXPECTATION_COLUMN),
                SourceKind::PricePlans => Some(PRICE_PLANS_COLUMN),
                _ => None,
            };
            if let Some(expected) = expected {
                if frame.columns.first().map(|c| c.name.as_str()) != Some(expected) {
                    debug!(source = %kind, to = expected, "renaming value column");
                    frame.rename_column(0, expected)?;
                }
            }
            frames.push((kind, frame));
        }
        Ok(inputs_from(frames)?)
    }

    /// Build the panel and write it (plus Parquet when configured).
    pub fn merge(&self, inputs: &PanelInputs) -> Result<MonthlyPanel> {
        let panel = build_panel(inputs).context("merging panel")?;

        let path = self.config.panel_path();
        fs::create_dir_all(&self.config.data_dir)
            .with_context(|| format!("creating {:?}", self.config.data_dir))?;
        write_csv(panel.frame(), &path).with_context(|| format!("writing panel {:?}", path))?;
        if self.config.parquet {
            let pq = self.config.panel_parquet_path();
            write_parquet(panel.frame(), &pq)?;
            info!(path = %pq.display(), "wrote panel parquet");
        }
        let dates = &panel.frame().dates;
        if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
            info!(rows = panel.len(), %first, %last, path = %path.display(), "wrote panel");
        }
        Ok(panel)
    }

    /// Extract everything, then write the intermediates.
    pub fn run_extract(&self) -> Result<PanelInputs> {
        let inputs = self.extract_all()?;
        self.write_intermediates(&inputs)?;
        Ok(inputs)
    }

    /// Merge from the intermediates already on disk.
    pub fn run_merge(&self) -> Result<MonthlyPanel> {
        let inputs = self.load_intermediates()?;
        self.merge(&inputs)
    }

    /// Whole pipeline. A failing source leaves every output file untouched.
    pub fn run(&self) -> Result<MonthlyPanel> {
        let inputs = self.run_extract()?;
        self.merge(&inputs)
    }
}

fn inputs_from(frames: Vec<(SourceKind, SeriesFrame)>) -> ExtractResult<PanelInputs> {
    let (mut cpif, mut wages, mut expectations, mut price_plans, mut electricity) =
        (None, None, None, None, None);
    for (kind, frame) in frames {
        let slot = match kind {
            SourceKind::Cpif => &mut cpif,
            SourceKind::Wages => &mut wages,
            SourceKind::Expectations => &mut expectations,
            SourceKind::PricePlans => &mut price_plans,
            SourceKind::Electricity => &mut electricity,
        };
        *slot = Some(frame);
    }
    let take = |slot: Option<SeriesFrame>, kind: SourceKind| {
        slot.ok_or_else(|| ExtractError::missing_column(kind.name(), "pipeline inputs"))
    };
    Ok(PanelInputs {
        cpif: take(cpif, SourceKind::Cpif)?,
        wages: take(wages, SourceKind::Wages)?,
        expectations: take(expectations, SourceKind::Expectations)?,
        price_plans: take(price_plans, SourceKind::PricePlans)?,
        electricity: take(electricity, SourceKind::Electricity)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MonthKey;
    use crate::grid::{Cell, NamedSheet, RawGrid};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,inflation_panel=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    #[derive(Default)]
    struct MemoryLoader {
        books: HashMap<PathBuf, Vec<NamedSheet>>,
    }

    impl SheetLoader for MemoryLoader {
        fn load(&self, path: &Path) -> ExtractResult<Vec<NamedSheet>> {
            self.books
                .get(path)
                .cloned()
                .ok_or_else(|| ExtractError::NoSheets {
                    path: path.to_path_buf(),
                })
        }
    }

    fn named(name: &str, rows: Vec<Vec<Cell>>) -> Vec<NamedSheet> {
        vec![NamedSheet {
            name: name.to_string(),
            grid: RawGrid::new(rows),
        }]
    }

    fn month_labels(start: MonthKey, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                let k = start.shift(i as i32);
                format!("{}M{:02}", k.year, k.month)
            })
            .collect()
    }

    /// Label-free sheet: title, header of periods, one data row.
    fn period_sheet(labels: &[String], value: impl Fn(usize) -> f64) -> Vec<NamedSheet> {
        let mut header = vec![Cell::Empty];
        header.extend(labels.iter().map(|l| Cell::from(l.as_str())));
        let mut data = vec![Cell::from("Totalt")];
        data.extend((0..labels.len()).map(|i| Cell::Number(value(i))));
        named("Blad1", vec![vec![Cell::from("Tabell")], header, data])
    }

    fn cpif_sheet() -> Vec<NamedSheet> {
        let labels = month_labels(MonthKey { year: 2022, month: 1 }, 24);
        let mut label_row = vec![Cell::Empty];
        label_row.extend(labels.iter().map(|l| Cell::from(l.as_str())));
        let mut total = vec![Cell::from("TOTALT")];
        total.extend((0..24).map(|i| Cell::Number(100.0 + i as f64)));
        let mut energy = vec![Cell::from("ENERGI")];
        energy.extend((0..24).map(|i| Cell::Number(50.0 + (i % 12) as f64)));
        let title = vec![Cell::from("KPIF, index (1987=100)")];
        named("Sheet1", vec![title, vec![], label_row, total, energy])
    }

    fn electricity_book() -> Vec<NamedSheet> {
        let header = vec![
            Cell::from("Deliver Date CET"),
            Cell::from("SE3 (SEK)"),
            Cell::from("SE4 (SEK)"),
        ];
        let mut rows = vec![header];
        for m in 1..=12u32 {
            for d in [1u32, 15] {
                let date = NaiveDate::from_ymd_opt(2023, m, d).unwrap();
                rows.push(vec![
                    Cell::DateTime(date.and_hms_opt(0, 0, 0).unwrap()),
                    Cell::Number(m as f64 * 10.0),
                    Cell::Number(m as f64 * 20.0),
                ]);
            }
        }
        named("2023", rows)
    }

    fn loader(cfg: &PanelConfig) -> MemoryLoader {
        let mut books = HashMap::new();
        books.insert(cfg.input_path(SourceKind::Cpif), cpif_sheet());
        books.insert(
            cfg.input_path(SourceKind::Wages),
            period_sheet(&month_labels(MonthKey { year: 2022, month: 1 }, 24), |i| {
                200.0 + i as f64
            }),
        );
        books.insert(
            cfg.input_path(SourceKind::Expectations),
            period_sheet(&month_labels(MonthKey { year: 2023, month: 1 }, 12), |i| {
                4.0 - i as f64 * 0.25
            }),
        );
        let quarters: Vec<String> = ["2022Q4", "2023Q1", "2023Q2", "2023Q3", "2023Q4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        books.insert(
            cfg.input_path(SourceKind::PricePlans),
            period_sheet(&quarters, |i| 30.0 + i as f64),
        );
        books.insert(cfg.input_path(SourceKind::Electricity), electricity_book());
        MemoryLoader { books }
    }

    fn config_in(dir: &Path) -> PanelConfig {
        PanelConfig {
            data_dir: dir.to_path_buf(),
            ..PanelConfig::default()
        }
    }

    #[test]
    fn run_writes_intermediates_and_panel() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let pipeline = Pipeline::with_loader(cfg.clone(), loader(&cfg));

        let panel = pipeline.run().unwrap();
        assert_eq!(panel.len(), 12);
        let f = panel.frame();
        assert_eq!(f.dates[0], NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        // January takes the 2022Q4 reading carried forward
        assert_eq!(f.values("price_plans_total").unwrap()[0], Some(30.0));
        assert_eq!(f.values("price_plans_total").unwrap()[2], Some(31.0));
        assert_eq!(f.values("price_se3").unwrap()[11], Some(120.0));
        assert_eq!(f.values("cpi_yoy_target_next").unwrap()[11], None);

        for kind in SourceKind::ALL {
            assert!(cfg.output_path(kind).exists(), "{kind}");
        }
        let text = fs::read_to_string(cfg.panel_path()).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("date,kpi_total_index,kpi_energy_index,cpi_yoy,"));
        assert!(header.ends_with(",price_plans_total_lag1,cpi_yoy_target_next"));
        assert_eq!(text.lines().count(), 13);

        let prices = fs::read_to_string(cfg.output_path(SourceKind::Electricity)).unwrap();
        assert!(prices.lines().nth(1).unwrap().starts_with("2023-01-31,10,20,15,"));
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let pipeline = Pipeline::with_loader(cfg.clone(), loader(&cfg));

        pipeline.run().unwrap();
        let first = fs::read(cfg.panel_path()).unwrap();
        let first_wages = fs::read(cfg.output_path(SourceKind::Wages)).unwrap();
        pipeline.run().unwrap();
        assert_eq!(fs::read(cfg.panel_path()).unwrap(), first);
        assert_eq!(fs::read(cfg.output_path(SourceKind::Wages)).unwrap(), first_wages);
    }

    #[test]
    fn parallel_extraction_matches_sequential() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let seq = Pipeline::with_loader(cfg.clone(), loader(&cfg)).extract_all().unwrap();
        let par_cfg = PanelConfig {
            parallel: true,
            ..cfg.clone()
        };
        let par = Pipeline::with_loader(par_cfg, loader(&cfg)).extract_all().unwrap();
        for kind in SourceKind::ALL {
            assert_eq!(seq.frame(kind), par.frame(kind), "{kind}");
        }
    }

    #[test]
    fn merge_from_disk_matches_in_memory_merge() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let pipeline = Pipeline::with_loader(cfg.clone(), loader(&cfg));

        pipeline.run().unwrap();
        let from_run = fs::read(cfg.panel_path()).unwrap();
        fs::remove_file(cfg.panel_path()).unwrap();

        let panel = pipeline.run_merge().unwrap();
        assert_eq!(panel.len(), 12);
        assert_eq!(fs::read(cfg.panel_path()).unwrap(), from_run);
    }

    #[test]
    fn renamed_value_column_is_restored_on_load() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let pipeline = Pipeline::with_loader(cfg.clone(), loader(&cfg));
        pipeline.run_extract().unwrap();

        let path = cfg.output_path(SourceKind::PricePlans);
        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replacen("price_plans_total", "Totalt", 1)).unwrap();

        let inputs = pipeline.load_intermediates().unwrap();
        assert_eq!(inputs.price_plans.column_names(), vec![PRICE_PLANS_COLUMN]);
    }

    #[test]
    fn failing_source_leaves_outputs_untouched() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let mut books = loader(&cfg);
        // wage sheet without any period header
        books.books.insert(
            cfg.input_path(SourceKind::Wages),
            named("Blad1", vec![vec![Cell::from("Lön")], vec![Cell::Number(1.0)]]),
        );
        fs::write(cfg.panel_path(), "previous run\n").unwrap();

        let err = Pipeline::with_loader(cfg.clone(), books).run().unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("mi_wages"), "{msg}");
        assert!(msg.contains("locate-header"), "{msg}");
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::HeaderNotFound { .. })
        ));

        assert_eq!(fs::read_to_string(cfg.panel_path()).unwrap(), "previous run\n");
        for kind in SourceKind::ALL {
            assert!(!cfg.output_path(kind).exists(), "{kind}");
        }
    }

    #[test]
    fn parquet_panel_is_optional() {
        let dir = tempdir().unwrap();
        let cfg = PanelConfig {
            parquet: true,
            ..config_in(dir.path())
        };
        Pipeline::with_loader(cfg.clone(), loader(&cfg)).run().unwrap();
        assert!(cfg.panel_parquet_path().exists());
    }
}
