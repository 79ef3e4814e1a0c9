// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::sources::{CpifLayout, ElectricityColumns, SourceKind};

/// Raw workbook name per source, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub cpif: String,
    pub wages: String,
    pub expectations: String,
    pub price_plans: String,
    pub electricity: String,
}

impl SourceFiles {
    pub fn get(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Cpif => &self.cpif,
            SourceKind::Wages => &self.wages,
            SourceKind::Expectations => &self.expectations,
            SourceKind::PricePlans => &self.price_plans,
            SourceKind::Electricity => &self.electricity,
        }
    }
}

/// CSV names, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub cpif: String,
    pub wages: String,
    pub expectations: String,
    pub price_plans: String,
    pub electricity: String,
    pub panel: String,
}

impl OutputFiles {
    pub fn get(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Cpif => &self.cpif,
            SourceKind::Wages => &self.wages,
            SourceKind::Expectations => &self.expectations,
            SourceKind::PricePlans => &self.price_plans,
            SourceKind::Electricity => &self.electricity,
        }
    }
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            cpif: SourceKind::Cpif.default_output(),
            wages: SourceKind::Wages.default_output(),
            expectations: SourceKind::Expectations.default_output(),
            price_plans: SourceKind::PricePlans.default_output(),
            electricity: SourceKind::Electricity.default_output(),
            panel: "features_merged.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub data_dir: PathBuf,
    pub inputs: SourceFiles,
    pub outputs: OutputFiles,
    pub cpif_layout: CpifLayout,
    pub electricity_columns: ElectricityColumns,
    /// Also write the panel as `<panel stem>.parquet`.
    pub parquet: bool,
    /// Extract the sources on the rayon pool.
    pub parallel: bool,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            cpif: SourceKind::Cpif.default_input().to_string(),
            wages: SourceKind::Wages.default_input().to_string(),
            expectations: SourceKind::Expectations.default_input().to_string(),
            price_plans: SourceKind::PricePlans.default_input().to_string(),
            electricity: SourceKind::Electricity.default_input().to_string(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            inputs: SourceFiles::default(),
            outputs: OutputFiles::default(),
            cpif_layout: CpifLayout::default(),
            electricity_columns: ElectricityColumns::default(),
            parquet: false,
            parallel: false,
        }
    }
}

impl PanelConfig {
    /// Read a YAML config, or JSON when the file ends in `.json`. Keys left
    /// out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening config {:?}", path))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let cfg = if is_json {
            serde_json::from_reader(f).with_context(|| format!("parsing {:?} as JSON", path))?
        } else {
            serde_yaml::from_reader(f).with_context(|| format!("parsing {:?} as YAML", path))?
        };
        Ok(cfg)
    }

    pub fn input_path(&self, kind: SourceKind) -> PathBuf {
        self.data_dir.join(self.inputs.get(kind))
    }

    pub fn output_path(&self, kind: SourceKind) -> PathBuf {
        self.data_dir.join(self.outputs.get(kind))
    }

    pub fn panel_path(&self) -> PathBuf {
        self.data_dir.join(&self.outputs.panel)
    }

    pub fn panel_parquet_path(&self) -> PathBuf {
        self.panel_path().with_extension("parquet")
    }
}
