use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use us_population_dashboard::config::DashboardConfig;
use us_population_dashboard::data::cache::DatasetCache;
use us_population_dashboard::data::metrics::{compute_year_metrics, top_n, YearMetrics};
use us_population_dashboard::data::views::{build_export_table, build_pivot, ExportTable, PivotMatrix};
use us_population_dashboard::data::{NormalizedDataset, PopulationRecord};

use crate::theme::ColorTheme;

// ---------------------------------------------------------------------------
// Derived views for the selected year
// ---------------------------------------------------------------------------

/// Everything the central panel shows for one selected year.
#[derive(Debug, Clone)]
pub struct YearView {
    pub metrics: YearMetrics,
    pub top: Vec<PopulationRecord>,
    pub export: ExportTable,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Shared, read-only dataset (None until a file is loaded).
    pub dataset: Option<Arc<NormalizedDataset>>,

    /// Path the dataset was loaded from.
    pub source_path: Option<PathBuf>,

    pub selected_year: Option<i32>,
    pub theme: ColorTheme,
    pub top_n: usize,

    /// Heatmap grid over all years (depends only on the dataset).
    pub pivot: Option<PivotMatrix>,

    /// Views for `selected_year`, rebuilt on every selection change.
    pub year_view: Option<YearView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let theme = ColorTheme::from_name(&config.theme).unwrap_or_else(|| {
            log::warn!("Unknown colour theme '{}', using blues", config.theme);
            ColorTheme::default()
        });
        Self {
            top_n: config.top_n,
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source_path: None,
            selected_year: None,
            theme,
            pivot: None,
            year_view: None,
            status_message: None,
        }
    }

    /// Load (or fetch from cache) the dataset at `path` and make it current.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let options = self.config.load_options();
        let dataset = self
            .cache
            .get_or_load(path, &options)
            .with_context(|| format!("loading {}", path.display()))?;
        self.source_path = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Open `path`, recording any failure in `status_message`.
    pub fn open_path_reporting(&mut self, path: &Path) {
        if let Err(e) = self.open_path(path) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Re-read the current source from disk, bypassing the cache.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.cache.invalidate();
            self.open_path_reporting(&path);
        }
    }

    /// Make `dataset` current. Keeps the selected year when it is still in
    /// range, otherwise selects the last year.
    pub fn set_dataset(&mut self, dataset: Arc<NormalizedDataset>) {
        let year = match self.selected_year {
            Some(y) if dataset.contains_year(y) => y,
            _ => dataset.max_year(),
        };
        self.pivot = Some(build_pivot(&dataset));
        self.dataset = Some(dataset);
        self.selected_year = Some(year);
        self.status_message = None;
        self.refresh();
    }

    pub fn set_year(&mut self, year: i32) {
        if self.selected_year != Some(year) {
            self.selected_year = Some(year);
            self.refresh();
        }
    }

    pub fn set_top_n(&mut self, n: usize) {
        if self.top_n != n {
            self.top_n = n;
            self.refresh();
        }
    }

    /// Years offered by the year selector.
    pub fn year_options(&self) -> Vec<i32> {
        self.dataset
            .as_ref()
            .map(|ds| (ds.min_year()..=ds.max_year()).collect())
            .unwrap_or_default()
    }

    /// Recompute the per-year views for the current selection.
    pub fn refresh(&mut self) {
        let (Some(dataset), Some(year)) = (&self.dataset, self.selected_year) else {
            self.year_view = None;
            return;
        };
        match build_year_view(dataset, year, self.top_n) {
            Ok(view) => {
                log::debug!("Recomputed views for {year}");
                self.year_view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Cannot compute views for {year}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.year_view = None;
            }
        }
    }

    /// Write the export table for the selected year to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let view = self
            .year_view
            .as_ref()
            .context("no year selected")?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        view.export
            .write_csv(std::io::BufWriter::new(file), self.config.delimiter_byte())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Exported {} rows for {} to {}",
            view.export.rows.len(),
            view.export.year,
            path.display()
        );
        Ok(())
    }
}

fn build_year_view(dataset: &NormalizedDataset, year: i32, n: usize) -> Result<YearView> {
    Ok(YearView {
        metrics: compute_year_metrics(dataset, year)?,
        top: top_n(dataset, year, n)?,
        export: build_export_table(dataset, year)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source() -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"states,id,2010,2011\nA,1,100,150\nB,2,200,180\nC,3,50,60\n")
            .unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn opening_selects_last_year() {
        let tmp = source();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();

        assert_eq!(state.selected_year, Some(2011));
        assert_eq!(state.year_options(), vec![2010, 2011]);
        let view = state.year_view.as_ref().unwrap();
        assert_eq!(view.metrics.top_state.record.state, "B");
        assert_eq!(view.top.len(), 3);
        assert_eq!(state.pivot.as_ref().unwrap().cell_count(), 6);
    }

    #[test]
    fn year_and_top_n_changes_recompute() {
        let tmp = source();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();

        state.set_year(2010);
        state.set_top_n(1);
        let view = state.year_view.as_ref().unwrap();
        assert_eq!(view.metrics.year, 2010);
        assert_eq!(view.metrics.top_state_delta(), None);
        assert_eq!(view.top.len(), 1);
        assert_eq!(view.export.file_name(), "filtered_population_2010.csv");
    }

    #[test]
    fn failed_open_reports_and_keeps_dataset() {
        let tmp = source();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();

        state.open_path_reporting(Path::new("/no/such/file.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        assert!(state.dataset.is_some());
    }

    #[test]
    fn unknown_theme_falls_back() {
        let config = DashboardConfig {
            theme: "plasma".into(),
            ..DashboardConfig::default()
        };
        assert_eq!(AppState::new(config).theme, ColorTheme::Blues);
    }

    #[test]
    fn export_writes_selected_year() {
        let tmp = source();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        state.export_to(&out).unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        assert_eq!(text.lines().next(), Some("states,id,year,population"));
        assert_eq!(text.lines().nth(1), Some("B,2,2011,180.0"));
    }

    #[test]
    fn valid_year_clears_previous_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"states,id,2010,2011,2012\nA,1,1,,3\n").unwrap();
        tmp.flush().unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();

        state.set_year(2011);
        assert!(state.year_view.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("2011"));

        state.set_year(2012);
        assert!(state.year_view.is_some());
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn reload_bypasses_cache() {
        let tmp = source();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_path(tmp.path()).unwrap();
        let before = Arc::clone(state.dataset.as_ref().unwrap());

        state.reload();
        let after = state.dataset.as_ref().unwrap();
        assert!(!Arc::ptr_eq(&before, after));
        assert_eq!(before.len(), after.len());
    }
}
