//! Correctness predicates applied to successful responses.
//!
//! Whether a prediction "matches" depends on the model's output layout, so the
//! check is supplied by the caller. Any `Fn(&PredictResponse, &Label) -> bool`
//! works; [`ArgmaxVerdict`] and [`ElementwiseVerdict`] cover the usual cases.

use crate::transport::proto::PredictResponse;
use crate::workload::{Label, PROBABILITIES};

/// Decides whether a response agrees with its expected label.
pub trait Verdict: Send + Sync {
    /// Returns `true` when `response` is a correct answer for `label`.
    fn accepts(&self, response: &PredictResponse, label: &Label) -> bool;
}

impl<F> Verdict for F
where
    F: Fn(&PredictResponse, &Label) -> bool + Send + Sync,
{
    fn accepts(&self, response: &PredictResponse, label: &Label) -> bool {
        self(response, label)
    }
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &value)| match best {
            Some((_, top)) if value.total_cmp(&top).is_le() => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// `true` when the first `expected.len()` predictions equal `expected`.
fn prefix_equal(predicted: &[f32], expected: &[f32]) -> bool {
    predicted.len() >= expected.len()
        && expected.iter().zip(predicted).all(|(want, got)| want == got)
}

/// Treats the named output as class scores.
///
/// A [`Label::Class`] matches when it is the highest scoring class.
/// [`Label::Values`] falls back to an exact prefix comparison.
#[derive(Debug, Clone)]
pub struct ArgmaxVerdict {
    pub output: String,
}

impl Default for ArgmaxVerdict {
    fn default() -> Self {
        Self { output: PROBABILITIES.to_string() }
    }
}

impl Verdict for ArgmaxVerdict {
    fn accepts(&self, response: &PredictResponse, label: &Label) -> bool {
        let Some(tensor) = response.output(&self.output) else {
            return false;
        };
        let predicted = tensor.floats();
        match label {
            Label::Class(class) => argmax(&predicted) == Some(*class),
            Label::Values(expected) => prefix_equal(&predicted, expected),
        }
    }
}

/// Compares predicted values to the label one element at a time.
///
/// A [`Label::Class`] is compared as the single value `class as f32` against the
/// first prediction. That is rarely what a classifier returns; prefer
/// [`ArgmaxVerdict`] unless the model really emits labels.
#[derive(Debug, Clone)]
pub struct ElementwiseVerdict {
    pub output: String,
}

impl Default for ElementwiseVerdict {
    fn default() -> Self {
        Self { output: PROBABILITIES.to_string() }
    }
}

impl Verdict for ElementwiseVerdict {
    fn accepts(&self, response: &PredictResponse, label: &Label) -> bool {
        let Some(tensor) = response.output(&self.output) else {
            return false;
        };
        let predicted = tensor.floats();
        match label {
            Label::Class(class) => prefix_equal(&predicted, &[*class as f32]),
            Label::Values(expected) => prefix_equal(&predicted, expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::proto::TensorProto;

    fn probabilities(values: Vec<f32>) -> PredictResponse {
        let len = values.len() as i64;
        PredictResponse::default().with_output(PROBABILITIES, TensorProto::float(values, &[1, len]))
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
    }

    #[test]
    fn test_argmax_verdict_class() {
        let verdict = ArgmaxVerdict::default();
        let response = probabilities(vec![0.1, 0.2, 0.7]);

        assert!(verdict.accepts(&response, &Label::Class(2)));
        assert!(!verdict.accepts(&response, &Label::Class(0)));
    }

    #[test]
    fn test_missing_output_is_a_mismatch() {
        let response = PredictResponse::default();
        assert!(!ArgmaxVerdict::default().accepts(&response, &Label::Class(0)));
        assert!(!ElementwiseVerdict::default().accepts(&response, &Label::Values(vec![])));
    }

    #[test]
    fn test_elementwise_values() {
        let verdict = ElementwiseVerdict::default();
        let response = probabilities(vec![0.1234, 0.5]);

        assert!(verdict.accepts(&response, &Label::Values(vec![0.1234])));
        assert!(verdict.accepts(&response, &Label::Values(vec![0.1234, 0.5])));
        assert!(!verdict.accepts(&response, &Label::Values(vec![0.1234, 0.5, 0.9])));
        assert!(!verdict.accepts(&response, &Label::Values(vec![0.5])));
    }

    #[test]
    fn test_elementwise_class_compares_first_value() {
        let verdict = ElementwiseVerdict::default();
        assert!(verdict.accepts(&probabilities(vec![2.0, 0.0]), &Label::Class(2)));
        assert!(!verdict.accepts(&probabilities(vec![0.1, 0.9]), &Label::Class(1)));
    }

    #[test]
    fn test_closure_verdict() {
        let always = |_: &PredictResponse, _: &Label| true;
        assert!(always.accepts(&PredictResponse::default(), &Label::Class(0)));
    }
}
