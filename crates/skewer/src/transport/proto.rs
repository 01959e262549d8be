//! Wire messages of `tensorflow.serving.PredictionService/Predict`.
//!
//! Only the fields this client reads or writes are declared; unknown fields in
//! server responses are skipped by the decoder. Field numbers follow
//! `tensorflow_serving/apis/predict.proto` and `tensorflow/core/framework/tensor.proto`.

use std::collections::HashMap;

/// Element type of a [`TensorProto`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    DtInvalid = 0,
    DtFloat = 1,
    DtDouble = 2,
    DtInt32 = 3,
    DtUint8 = 4,
    DtInt16 = 5,
    DtInt8 = 6,
    DtString = 7,
    DtComplex64 = 8,
    DtInt64 = 9,
    DtBool = 10,
}

/// One dimension of a [`TensorShapeProto`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorDim {
    #[prost(int64, tag = "1")]
    pub size: i64,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "2")]
    pub dim: Vec<TensorDim>,
    #[prost(bool, tag = "3")]
    pub unknown_rank: bool,
}

/// A typed, shaped tensor as carried on the wire.
///
/// Values live either in the typed `*_val` lists or, packed little-endian, in
/// `tensor_content`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorProto {
    #[prost(enumeration = "DataType", tag = "1")]
    pub dtype: i32,
    #[prost(message, optional, tag = "2")]
    pub tensor_shape: Option<TensorShapeProto>,
    #[prost(int32, tag = "3")]
    pub version_number: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub tensor_content: Vec<u8>,
    #[prost(float, repeated, tag = "5")]
    pub float_val: Vec<f32>,
    #[prost(double, repeated, tag = "6")]
    pub double_val: Vec<f64>,
    #[prost(int32, repeated, tag = "7")]
    pub int_val: Vec<i32>,
    #[prost(bytes = "vec", repeated, tag = "8")]
    pub string_val: Vec<Vec<u8>>,
    #[prost(int64, repeated, tag = "10")]
    pub int64_val: Vec<i64>,
    #[prost(bool, repeated, tag = "11")]
    pub bool_val: Vec<bool>,
}

/// Selects the model and signature a request is routed to.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelSpec {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub signature_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PredictRequest {
    #[prost(message, optional, tag = "1")]
    pub model_spec: Option<ModelSpec>,
    #[prost(map = "string, message", tag = "2")]
    pub inputs: HashMap<String, TensorProto>,
    #[prost(string, repeated, tag = "3")]
    pub output_filter: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PredictResponse {
    #[prost(map = "string, message", tag = "1")]
    pub outputs: HashMap<String, TensorProto>,
    #[prost(message, optional, tag = "2")]
    pub model_spec: Option<ModelSpec>,
}

fn shape_of(dims: &[i64]) -> TensorShapeProto {
    TensorShapeProto {
        dim: dims
            .iter()
            .map(|&size| TensorDim { size, name: String::new() })
            .collect(),
        unknown_rank: false,
    }
}

impl TensorProto {
    /// Builds an `int32` tensor.
    ///
    /// # Parameters
    ///
    /// * `values` - Row-major element values
    /// * `shape` - Dimension sizes; their product should equal `values.len()`
    pub fn int32(values: Vec<i32>, shape: &[i64]) -> Self {
        Self {
            dtype: DataType::DtInt32 as i32,
            tensor_shape: Some(shape_of(shape)),
            int_val: values,
            ..Default::default()
        }
    }

    /// Builds a `float` tensor.
    ///
    /// # Parameters
    ///
    /// * `values` - Row-major element values
    /// * `shape` - Dimension sizes; their product should equal `values.len()`
    pub fn float(values: Vec<f32>, shape: &[i64]) -> Self {
        Self {
            dtype: DataType::DtFloat as i32,
            tensor_shape: Some(shape_of(shape)),
            float_val: values,
            ..Default::default()
        }
    }

    /// Dimension sizes, empty for a scalar or a tensor without shape.
    pub fn dims(&self) -> Vec<i64> {
        self.tensor_shape
            .as_ref()
            .map(|shape| shape.dim.iter().map(|d| d.size).collect())
            .unwrap_or_default()
    }

    /// Reads the payload as `f32` values.
    ///
    /// Prefers `float_val`; falls back to decoding `tensor_content` for float
    /// tensors the server packed into raw bytes.
    pub fn floats(&self) -> Vec<f32> {
        if !self.float_val.is_empty() {
            return self.float_val.clone();
        }
        if self.dtype() == DataType::DtFloat {
            return self
                .tensor_content
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
        }
        Vec::new()
    }
}

impl PredictRequest {
    /// Creates a request without inputs for `model` and `signature`.
    pub fn new(model: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            model_spec: Some(ModelSpec {
                name: model.into(),
                signature_name: signature.into(),
            }),
            ..Default::default()
        }
    }

    /// Adds a named input tensor.
    pub fn with_input(mut self, name: impl Into<String>, tensor: TensorProto) -> Self {
        self.inputs.insert(name.into(), tensor);
        self
    }

    /// Name of the targeted model, empty if unset.
    pub fn model_name(&self) -> &str {
        self.model_spec.as_ref().map(|spec| spec.name.as_str()).unwrap_or("")
    }
}

impl PredictResponse {
    /// Looks up a named output tensor.
    pub fn output(&self, name: &str) -> Option<&TensorProto> {
        self.outputs.get(name)
    }

    /// Adds a named output tensor.
    pub fn with_output(mut self, name: impl Into<String>, tensor: TensorProto) -> Self {
        self.outputs.insert(name.into(), tensor);
        self
    }
}
