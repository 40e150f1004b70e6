//! Feed-forward network with tanh hidden activations.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::tanh;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Multi-layer perceptron: tanh after every hidden layer, linear output.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
}

/// Configuration for [`Mlp`].
#[derive(Debug, Clone)]
pub struct MlpConfig {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub output_size: usize,
}

impl MlpConfig {
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            hidden_sizes: vec![64, 64],
            output_size,
        }
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut hidden = Vec::with_capacity(self.hidden_sizes.len());
        let mut in_size = self.input_size;
        for &size in &self.hidden_sizes {
            hidden.push(LinearConfig::new(in_size, size).init(device));
            in_size = size;
        }
        let output = LinearConfig::new(in_size, self.output_size).init(device);
        Mlp { hidden, output }
    }
}

impl<B: Backend> Mlp<B> {
    /// Forward pass over a `[batch, input_size]` tensor.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = tanh(layer.forward(x));
        }
        self.output.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let mlp: Mlp<TestBackend> = MlpConfig::new(4, 2)
            .with_hidden_sizes(vec![8, 8])
            .init(&device);
        let input = Tensor::<TestBackend, 2>::zeros([3, 4], &device);
        let output = mlp.forward(input);
        assert_eq!(output.dims(), [3, 2]);
    }

    #[test]
    fn test_no_hidden_layers_is_linear() {
        let device = Default::default();
        let mlp: Mlp<TestBackend> = MlpConfig::new(5, 1)
            .with_hidden_sizes(vec![])
            .init(&device);
        let input = Tensor::<TestBackend, 2>::ones([2, 5], &device);
        assert_eq!(mlp.forward(input).dims(), [2, 1]);
    }
}
