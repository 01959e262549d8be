//! Request payloads and the labels they are checked against.
//!
//! A [`Workload`] produces the `index`-th [`TestCase`] of a run. The built-in
//! workloads send the same fixed request every time, matching the BERT and
//! TextCNN classifiers this client is usually pointed at.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::transport::proto::{PredictRequest, TensorProto};

/// Name of the output tensor the built-in workloads read back.
pub const PROBABILITIES: &str = "probabilities";

/// Expected answer for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// Index of the expected class.
    Class(usize),
    /// Expected output values.
    Values(Vec<f32>),
}

/// One request and its expected label.
#[derive(Clone)]
pub struct TestCase {
    pub request: PredictRequest,
    pub label: Label,
}

/// Source of the requests issued during a run.
pub trait Workload: Send + Sync {
    /// Builds the request for position `index` of the run.
    fn case(&self, index: usize) -> TestCase;
}

impl<F> Workload for F
where
    F: Fn(usize) -> TestCase + Send + Sync,
{
    fn case(&self, index: usize) -> TestCase {
        self(index)
    }
}

/// Fixed-length token ids `0..seq_length` in a `[1, seq_length]` tensor.
fn token_ids(seq_length: usize) -> TensorProto {
    let ids = (0..seq_length as i32).collect();
    TensorProto::int32(ids, &[1, seq_length as i64])
}

/// BERT sequence classifier served under `bert/serving_default`.
#[derive(Debug, Clone)]
pub struct BertWorkload {
    pub seq_length: usize,
    pub label_id: i32,
}

impl Default for BertWorkload {
    fn default() -> Self {
        Self { seq_length: 50, label_id: 2 }
    }
}

impl Workload for BertWorkload {
    fn case(&self, _index: usize) -> TestCase {
        let seq = self.seq_length;
        let request = PredictRequest::new("bert", "serving_default")
            .with_input("input_ids", token_ids(seq))
            .with_input("input_mask", TensorProto::int32(vec![1; seq], &[1, seq as i64]))
            .with_input("segment_ids", TensorProto::int32(vec![0; seq], &[1, seq as i64]))
            .with_input("label_ids", TensorProto::int32(vec![self.label_id], &[1]));

        TestCase {
            request,
            label: Label::Class(self.label_id as usize),
        }
    }
}

/// TextCNN classifier served under `textCnn/textCnn_sig_def`.
#[derive(Debug, Clone)]
pub struct TextCnnWorkload {
    pub seq_length: usize,
    pub drop_prob: f32,
    pub label_id: usize,
}

impl Default for TextCnnWorkload {
    fn default() -> Self {
        Self { seq_length: 50, drop_prob: 0.0, label_id: 2 }
    }
}

impl Workload for TextCnnWorkload {
    fn case(&self, _index: usize) -> TestCase {
        let request = PredictRequest::new("textCnn", "textCnn_sig_def")
            .with_input("input_x", token_ids(self.seq_length))
            .with_input("drop_prob", TensorProto::float(vec![self.drop_prob], &[1]));

        TestCase {
            request,
            label: Label::Class(self.label_id),
        }
    }
}

/// Built-in workload selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Bert,
    TextCnn,
}

impl ModelKind {
    /// Instantiates the default workload for this model.
    pub fn workload(self) -> Box<dyn Workload> {
        match self {
            ModelKind::Bert => Box::new(BertWorkload::default()),
            ModelKind::TextCnn => Box::new(TextCnnWorkload::default()),
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bert" => Ok(ModelKind::Bert),
            "text-cnn" | "textcnn" | "text_cnn" => Ok(ModelKind::TextCnn),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Bert => write!(f, "bert"),
            ModelKind::TextCnn => write!(f, "text-cnn"),
        }
    }
}
