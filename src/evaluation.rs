use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::heatmap;
use crate::metrics::{self, ClassificationReport, ConfusionMatrix};

/// A trained, hyper-parameter searched classifier.
pub trait FittedModel<X, Y: PartialEq> {
    fn predict(&self, samples: &[X]) -> Vec<Y>;

    /// Mean accuracy of [`predict`](Self::predict) against `labels`.
    fn score(&self, samples: &[X], labels: &[Y]) -> Result<f64> {
        metrics::accuracy(labels, &self.predict(samples))
    }

    /// Parameters of the best candidate found by the search.
    fn best_params(&self) -> Map<String, Value>;

    /// Mean cross-validated score of the best candidate.
    fn best_score(&self) -> f64;
}

/// Borrowed train/test partition.
#[derive(Debug, Clone, Copy)]
pub struct DataSplit<'a, X, Y> {
    pub x_train: &'a [X],
    pub y_train: &'a [Y],
    pub x_test: &'a [X],
    pub y_test: &'a [Y],
}

impl<'a, X, Y> DataSplit<'a, X, Y> {
    pub fn new(x_train: &'a [X], y_train: &'a [Y], x_test: &'a [X], y_test: &'a [Y]) -> Self {
        Self {
            x_train,
            y_train,
            x_test,
            y_test,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelEvaluation {
    pub model_name: String,
    pub best_score_cv: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub baseline_accuracy: f64,
    pub best_params: Map<String, Value>,
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
}

#[derive(Serialize)]
struct ConfusionMatrixFile<'a> {
    title: String,
    model_name: &'a str,
    #[serde(flatten)]
    matrix: &'a ConfusionMatrix,
}

pub fn evaluate<M, X, Y>(
    model: &M,
    model_name: &str,
    split: &DataSplit<'_, X, Y>,
    baseline_accuracy: f64,
) -> Result<ModelEvaluation>
where
    M: FittedModel<X, Y> + ?Sized,
    Y: Ord + Display,
{
    let train_accuracy = model.score(split.x_train, split.y_train)?;
    let test_accuracy = model.score(split.x_test, split.y_test)?;
    let predictions = model.predict(split.x_test);
    let confusion_matrix = ConfusionMatrix::from_predictions(split.y_test, &predictions)?;

    Ok(ModelEvaluation {
        model_name: model_name.to_string(),
        best_score_cv: model.best_score(),
        train_accuracy,
        test_accuracy,
        baseline_accuracy,
        best_params: model.best_params(),
        report: ClassificationReport::from_confusion_matrix(&confusion_matrix),
        confusion_matrix,
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl ModelEvaluation {
    /// Renames confusion matrix labels; the report keeps the raw class labels.
    pub fn with_display_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Result<Self> {
        self.confusion_matrix = self.confusion_matrix.with_display_labels(labels)?;
        Ok(self)
    }

    pub fn title(&self) -> String {
        format!("Confusion Matrix: {}", self.model_name)
    }

    /// Writes the heatmap to `{dir}/{model_name}_Confusion Matrix.png` and returns its path.
    pub fn save_confusion_matrix(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.artifact_path(dir.as_ref(), "png")?;
        heatmap::render_confusion_matrix(&self.title(), &self.confusion_matrix).save(&path)?;
        info!(path = %path.display(), model = %self.model_name, "saved confusion matrix heatmap");
        Ok(path)
    }

    /// Writes title, labels and counts to `{dir}/{model_name}_Confusion Matrix.json`.
    pub fn save_confusion_matrix_json(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.artifact_path(dir.as_ref(), "json")?;
        let file = ConfusionMatrixFile {
            title: self.title(),
            model_name: &self.model_name,
            matrix: &self.confusion_matrix,
        };
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        info!(path = %path.display(), model = %self.model_name, "saved confusion matrix");
        Ok(path)
    }

    fn artifact_path(&self, dir: &Path, extension: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        Ok(dir.join(format!("{}_Confusion Matrix.{}", self.model_name, extension)))
    }
}

impl Display for ModelEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Train-Test Accuracy Scores:")?;
        writeln!(f, "  Train: {} ", round_to(self.train_accuracy, 5))?;
        writeln!(f, "  Test: {}", round_to(self.test_accuracy, 5))?;
        writeln!(f, "  Baseline: {}", round_to(self.baseline_accuracy, 5))?;
        writeln!(f, "---")?;
        writeln!(f)?;
        writeln!(f, " Classification Report:")?;
        writeln!(f, "{}", self.report.table(4))?;
        writeln!(f)?;
        writeln!(f, "---")?;
        writeln!(f, "Best Parameters: ")?;
        writeln!(f, "{}", Value::Object(self.best_params.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Threshold {
        cutoff: f64,
    }

    impl FittedModel<f64, u8> for Threshold {
        fn predict(&self, samples: &[f64]) -> Vec<u8> {
            samples.iter().map(|&x| u8::from(x > self.cutoff)).collect()
        }

        fn best_params(&self) -> Map<String, Value> {
            let mut params = Map::new();
            params.insert("cutoff".to_string(), json!(self.cutoff));
            params
        }

        fn best_score(&self) -> f64 {
            0.8125
        }
    }

    fn evaluation() -> ModelEvaluation {
        let x_train = [0.1, 0.2, 0.7, 0.9];
        let y_train: [u8; 4] = [0, 0, 1, 1];
        let x_test = [0.3, 0.6, 0.8, 0.4, 0.55];
        let y_test: [u8; 5] = [0, 0, 1, 1, 1];
        let split = DataSplit::new(&x_train, &y_train, &x_test, &y_test);
        evaluate(&Threshold { cutoff: 0.5 }, "logreg", &split, 0.6).unwrap()
    }

    #[test]
    fn test_evaluate_scores() {
        let eval = evaluation();
        assert_eq!(eval.train_accuracy, 1.0);
        assert_eq!(eval.test_accuracy, 0.6);
        assert_eq!(eval.baseline_accuracy, 0.6);
        assert_eq!(eval.best_score_cv, 0.8125);
        assert_eq!(eval.best_params["cutoff"], json!(0.5));
        assert_eq!(eval.confusion_matrix.counts, vec![vec![1, 1], vec![1, 2]]);
        assert_eq!(eval.report.accuracy, eval.test_accuracy);
    }

    #[test]
    fn test_summary_text() {
        let text = evaluation().to_string();
        assert!(text.starts_with("Train-Test Accuracy Scores:\n  Train: 1 \n  Test: 0.6\n  Baseline: 0.6\n---\n"));
        assert!(text.contains("\n Classification Report:\n"));
        assert!(text.contains("weighted avg     0.6000    0.6000    0.6000         5\n"));
        assert!(text.ends_with("---\nBest Parameters: \n{\"cutoff\":0.5}\n"));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 5), 0.12346);
        assert_eq!(round_to(0.5, 5), 0.5);
    }

    #[test]
    fn test_save_confusion_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let eval = evaluation()
            .with_display_labels(["r/dating", "r/datingoverthirty"])
            .unwrap();
        let path = eval.save_confusion_matrix(dir.path().join("images")).unwrap();
        assert_eq!(path.file_name().unwrap(), "logreg_Confusion Matrix.png");

        let saved = image::open(&path).unwrap().to_rgb8();
        let expected = heatmap::render_confusion_matrix("Confusion Matrix: logreg", &eval.confusion_matrix);
        assert_eq!(saved.dimensions(), expected.dimensions());
        assert_eq!(saved, expected);
    }

    #[test]
    fn test_save_confusion_matrix_json() {
        let dir = tempfile::tempdir().unwrap();
        let eval = evaluation()
            .with_display_labels(["r/dating", "r/datingoverthirty"])
            .unwrap();
        let path = eval.save_confusion_matrix_json(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "logreg_Confusion Matrix.json");

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["title"], "Confusion Matrix: logreg");
        assert_eq!(saved["labels"], json!(["r/dating", "r/datingoverthirty"]));
        assert_eq!(saved["counts"], json!([[1, 1], [1, 2]]));
        // report keeps class ids
        assert_eq!(eval.report.classes[0].label, "0");
    }

    #[test]
    fn test_score_length_mismatch() {
        let model = Threshold { cutoff: 0.5 };
        assert!(model.score(&[0.1, 0.9], &[0u8]).is_err());
    }
}
