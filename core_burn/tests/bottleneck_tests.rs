use burn::tensor::{Distribution, Tensor};
use burn_ndarray::{NdArray, NdArrayDevice};
use core_burn::{ActivationKind, BlockLocation, BottleneckConfig, BurnCoreError};

type TestBackend = NdArray<f32>;

fn device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[test]
fn test_block_without_downsample_rejects_channel_change() {
    let config = BottleneckConfig::new(64, 64, 4, 32);
    let err = config.init::<TestBackend>(&device()).unwrap_err();

    assert_eq!(
        err,
        BurnCoreError::SkipPathMismatch {
            location: BlockLocation::standalone(),
            skip_channels: 64,
            main_channels: 256,
            stride: 1
        }
    );
}

#[test]
fn test_block_without_downsample_rejects_stride() {
    let config = BottleneckConfig::new(256, 64, 4, 32).with_stride(2);
    let err = config
        .init_at::<TestBackend>(BlockLocation::new(2, 1), &device())
        .unwrap_err();

    match err {
        BurnCoreError::SkipPathMismatch { location, stride, .. } => {
            assert_eq!(location, BlockLocation::new(2, 1));
            assert_eq!(stride, 2);
        }
        other => panic!("Expected SkipPathMismatch, got {other:?}"),
    }
    assert!(err_message_names_block(&config));
}

fn err_message_names_block(config: &BottleneckConfig) -> bool {
    config
        .init_at::<TestBackend>(BlockLocation::new(2, 1), &device())
        .unwrap_err()
        .to_string()
        .contains("stage2_block1")
}

#[test]
fn test_block_with_downsample_expands_channels() {
    let block = BottleneckConfig::new(64, 64, 4, 32)
        .with_downsample(true)
        .init::<TestBackend>(&device())
        .unwrap();
    assert!(block.has_downsample());
    assert_eq!(block.out_channels(), 256);

    let input = Tensor::<TestBackend, 4>::random([2, 64, 8, 8], Distribution::Default, &device());
    let output = block.forward(input).unwrap();
    assert_eq!(output.dims(), [2, 256, 8, 8]);
}

#[test]
fn test_strided_block_halves_resolution() {
    let block = BottleneckConfig::new(256, 128, 8, 32)
        .with_stride(2)
        .with_downsample(true)
        .with_activation(ActivationKind::Relu)
        .init::<TestBackend>(&device())
        .unwrap();

    let input = Tensor::<TestBackend, 4>::random([1, 256, 7, 7], Distribution::Default, &device());
    let output = block.forward(input).unwrap();
    assert_eq!(output.dims(), [1, 512, 4, 4]);
}

#[test]
fn test_identity_block_preserves_shape() {
    let block = BottleneckConfig::new(256, 64, 4, 32)
        .init::<TestBackend>(&device())
        .unwrap();
    assert!(!block.has_downsample());
    assert_eq!(block.stride(), 1);

    let input = Tensor::<TestBackend, 4>::random([1, 256, 5, 5], Distribution::Default, &device());
    let output = block.forward(input).unwrap();
    assert_eq!(output.dims(), [1, 256, 5, 5]);
}

#[test]
fn test_block_rejects_wrong_input_channels() {
    let block = BottleneckConfig::new(256, 64, 4, 32)
        .init::<TestBackend>(&device())
        .unwrap();

    let input = Tensor::<TestBackend, 4>::zeros([1, 128, 4, 4], &device());
    assert!(matches!(
        block.forward(input),
        Err(BurnCoreError::IncompatibleShape(_))
    ));
}

#[test]
fn test_elu_output_is_bounded_below() {
    // ELU после сложения: значения не меньше -alpha.
    let block = BottleneckConfig::new(16, 4, 2, 4)
        .init::<TestBackend>(&device())
        .unwrap();
    let input = Tensor::<TestBackend, 4>::random(
        [1, 16, 4, 4],
        Distribution::Normal(0.0, 3.0),
        &device(),
    );
    let output = block.forward(input).unwrap();
    let min = output.min().into_scalar();
    assert!(min >= -1.0 - 1e-5, "min = {min}");
}

#[test]
fn test_activation_values() {
    let input = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 2.0], &device());

    let elu = ActivationKind::Elu
        .forward(input.clone())
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    assert!((elu[0] - ((-1.0f32).exp() - 1.0)).abs() < 1e-6);
    assert_eq!(elu[1], 0.0);
    assert_eq!(elu[2], 2.0);

    let relu = ActivationKind::Relu
        .forward(input.clone())
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    assert_eq!(relu, vec![0.0, 0.0, 2.0]);

    let leaky = ActivationKind::LeakyRelu
        .forward(input)
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    assert!((leaky[0] + 0.01).abs() < 1e-6);
}

#[test]
fn test_elu_gradient_stays_finite_for_large_inputs() {
    type AutodiffBackend = burn::backend::Autodiff<TestBackend>;

    let input =
        Tensor::<AutodiffBackend, 1>::from_floats([1.0, 50.0, 100.0, -2.0], &device())
            .require_grad();
    let grads = ActivationKind::Elu.forward(input.clone()).sum().backward();

    let grad = input
        .grad(&grads)
        .expect("вход должен получить градиент")
        .into_data()
        .to_vec::<f32>()
        .unwrap();
    assert!(grad.iter().all(|g| g.is_finite()), "grad = {grad:?}");
    // Положительная часть: производная 1; отрицательная: exp(x).
    assert_eq!(&grad[..3], &[1.0, 1.0, 1.0]);
    assert!((grad[3] - (-2.0f32).exp()).abs() < 1e-6, "grad = {grad:?}");
}
