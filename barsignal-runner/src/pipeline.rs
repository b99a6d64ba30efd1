//! One pipeline run: bars → features → labels → fit → predict → log.
//!
//! A `Pipeline` is built once from a config and invoked per external
//! trigger (timer, manual refresh). Runs share no state; a failed run
//! never touches the previous log because the log write is the final,
//! atomic step.

use serde::{Deserialize, Serialize};

use barsignal_core::{
    feature_matrix, label_rows, latest_log_rows, predict_signals, Bar, Evaluation, FeatureBuilder,
    FeatureRow, GradientBoostedClassifier, Label, LabelCounts, LogRow, Signal, TimeSplit,
};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::ingest::load_bars;
use crate::signal_log::write_log;

/// In-memory results of a run, before anything is written.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<Label>,
    pub signals: Vec<Signal>,
    pub evaluation: Evaluation,
    pub log_rows: Vec<LogRow>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub bars_in: usize,
    pub bars_skipped: usize,
    pub rows_retained: usize,
    pub label_counts: LabelCounts,
    pub prediction_counts: LabelCounts,
    pub evaluation: Evaluation,
    pub log_rows: Vec<LogRow>,
    /// BLAKE3 of the input file, when the run read one.
    pub dataset_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    builder: FeatureBuilder,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::unexpected(e.to_string()))?;
        let builder = FeatureBuilder::new(&config.features)?;
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the configured input, process it and rewrite the log.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        let _span = tracing::info_span!("run", input = %self.config.input_path.display()).entered();
        let loaded = load_bars(&self.config.input_path)?;
        let mut report = self.run_on_bars(&loaded.bars)?;
        report.bars_skipped = loaded.skipped;
        report.dataset_hash = Some(loaded.dataset_hash);
        Ok(report)
    }

    /// Process already-loaded bars and rewrite the log.
    pub fn run_on_bars(&self, bars: &[Bar]) -> Result<RunReport, PipelineError> {
        let output = self.process(bars)?;
        write_log(&self.config.log_path, &output.log_rows)?;

        Ok(RunReport {
            bars_in: bars.len(),
            bars_skipped: 0,
            rows_retained: output.rows.len(),
            label_counts: LabelCounts::from_labels(&output.labels),
            prediction_counts: LabelCounts::from_labels(output.signals.iter().map(|s| &s.label)),
            evaluation: output.evaluation,
            log_rows: output.log_rows,
            dataset_hash: None,
        })
    }

    /// Everything except the log write.
    pub fn process(&self, bars: &[Bar]) -> Result<PipelineOutput, PipelineError> {
        let rows = self.builder.build(bars);
        if rows.is_empty() {
            return Err(PipelineError::unexpected(format!(
                "no complete feature rows from {} bars (need more than {})",
                bars.len(),
                self.builder.warmup_bars()
            )));
        }

        let labels = label_rows(&rows, &self.config.labels);
        let counts = LabelCounts::from_labels(&labels);
        tracing::info!(
            rows = rows.len(),
            buy = counts.buy,
            sell = counts.sell,
            hold = counts.hold,
            "labels assigned"
        );

        let x = feature_matrix(&rows);
        let split = TimeSplit::new(rows.len(), self.config.test_fraction);
        let model = GradientBoostedClassifier::fit(
            &x[split.train.clone()],
            &labels[split.train.clone()],
            &self.config.model,
        )?;

        let evaluation = Evaluation::score(
            &model,
            split.n_train(),
            &x[split.test.clone()],
            &labels[split.test.clone()],
        );
        match evaluation.accuracy {
            Some(accuracy) => tracing::info!(
                n_train = evaluation.n_train,
                n_test = evaluation.n_test,
                accuracy,
                "held-out evaluation"
            ),
            None => tracing::warn!(n_train = evaluation.n_train, "empty test segment, not scored"),
        }

        let signals = predict_signals(&model, &rows);
        let log_rows = latest_log_rows(&rows, &signals, self.config.log_window);

        Ok(PipelineOutput {
            rows,
            labels,
            signals,
            evaluation,
            log_rows,
        })
    }
}
