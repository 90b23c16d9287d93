//! Classification metrics over predicted labels.
//!
//! Everything here is pure computation; presentation lives in [`crate::evaluation`].

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{self, Display};

use crate::error::{Error, Result};

fn check_lengths(y_true: usize, y_pred: usize) -> Result<()> {
    if y_true != y_pred {
        return Err(Error::LengthMismatch {
            expected: y_true,
            actual: y_pred,
        });
    }
    if y_true == 0 {
        return Err(Error::EmptyInput("no samples to score"));
    }
    Ok(())
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    num as f64 / denom as f64
}

/// Fraction of positions where prediction equals truth.
pub fn accuracy<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(ratio(correct, y_true.len()))
}

/// Multi-class confusion matrix. `counts[i][j]` is the number of samples with
/// true label `labels[i]` predicted as `labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Labels are the sorted union of every label seen in either slice.
    pub fn from_predictions<T: Ord + Display>(y_true: &[T], y_pred: &[T]) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;
        let labels: Vec<&T> = y_true.iter().chain(y_pred).collect::<BTreeSet<_>>().into_iter().collect();

        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            // both are present by construction
            if let (Ok(i), Ok(j)) = (labels.binary_search(&t), labels.binary_search(&p)) {
                counts[i][j] += 1;
            }
        }

        Ok(Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            counts,
        })
    }

    /// Replaces label names in order, e.g. class ids with readable names.
    pub fn with_display_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.labels.len() {
            return Err(Error::DisplayLabels {
                expected: self.labels.len(),
                actual: labels.len(),
            });
        }
        self.labels = labels;
        Ok(self)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Samples whose true label is `labels[i]`.
    pub fn support(&self, i: usize) -> usize {
        self.counts[i].iter().sum()
    }

    /// Samples predicted as `labels[j]`.
    pub fn predicted(&self, j: usize) -> usize {
        self.counts.iter().map(|row| row[j]).sum()
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(4);
        let cell_width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .chain(self.labels.iter().map(|l| l.chars().count()))
            .max()
            .unwrap_or(1)
            + 2;

        write!(f, "{:>w$}", "true", w = name_width)?;
        for label in &self.labels {
            write!(f, "{:>w$}", label, w = cell_width)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:>w$}", label, w = name_width)?;
            for count in row {
                write!(f, "{:>w$}", count, w = cell_width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall and F1 with accuracy, macro and weighted averages.
/// A zero denominator scores 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn from_predictions<T: Ord + Display>(y_true: &[T], y_pred: &[T]) -> Result<Self> {
        let matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        Ok(Self::from_confusion_matrix(&matrix))
    }

    pub fn from_confusion_matrix(matrix: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = matrix
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = matrix.counts[i][i];
                let support = matrix.support(i);
                let precision = ratio(tp, matrix.predicted(i));
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total = matrix.total();
        let n = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted_avg = AverageMetrics {
            precision: weighted_mean(&classes, total, |c| c.precision),
            recall: weighted_mean(&classes, total, |c| c.recall),
            f1: weighted_mean(&classes, total, |c| c.f1),
            support: total,
        };

        Self {
            accuracy: ratio(matrix.correct(), total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    /// Fixed-width text table with `digits` decimals.
    pub fn render(&self, digits: usize) -> String {
        self.table(digits).to_string()
    }

    /// [`Display`] adapter for [`render`](Self::render).
    pub fn table(&self, digits: usize) -> ReportTable<'_> {
        ReportTable { report: self, digits }
    }
}

pub struct ReportTable<'a> {
    report: &'a ClassificationReport,
    digits: usize,
}

impl ReportTable<'_> {
    fn row(&self, f: &mut fmt::Formatter<'_>, width: usize, name: &str, scores: [f64; 3], support: usize) -> fmt::Result {
        let [precision, recall, f1] = scores;
        writeln!(
            f,
            "{:>w$}  {:>9.d$} {:>9.d$} {:>9.d$} {:>9}",
            name,
            precision,
            recall,
            f1,
            support,
            w = width,
            d = self.digits
        )
    }
}

impl Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let width = report
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .chain([AVG_HEADINGS[1].len(), self.digits])
            .max()
            .unwrap_or(0);

        write!(f, "{:>w$} ", "", w = width)?;
        for header in ["precision", "recall", "f1-score", "support"] {
            write!(f, " {:>9}", header)?;
        }
        f.write_str("\n\n")?;

        for c in &report.classes {
            self.row(f, width, &c.label, [c.precision, c.recall, c.f1], c.support)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.d$} {:>9}",
            "accuracy",
            "",
            "",
            report.accuracy,
            report.macro_avg.support,
            w = width,
            d = self.digits
        )?;
        for (name, avg) in AVG_HEADINGS.iter().zip([&report.macro_avg, &report.weighted_avg]) {
            self.row(f, width, name, [avg.precision, avg.recall, avg.f1], avg.support)?;
        }
        Ok(())
    }
}

const AVG_HEADINGS: [&str; 2] = ["macro avg", "weighted avg"];

fn weighted_mean(classes: &[ClassMetrics], total: usize, metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    classes.iter().map(|c| metric(c) * c.support as f64).sum::<f64>() / total as f64
}
