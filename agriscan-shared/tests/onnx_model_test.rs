/// Integration tests for the ONNX Runtime backend
///
/// `fixtures/tiny_rgb.onnx` takes a `[1, 4, 4, 3]` NHWC image, averages each
/// colour channel, scales the averages by 10 and applies a softmax, giving
/// three scores: red, green, blue.

use agriscan_shared::classifier::{
    ClassifierError, ImageClassifier, InferenceModel, OnnxModel, ResizeFilter, TensorLayout,
};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use std::io::Cursor;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn png(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(16, 12, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[test]
fn test_declared_shapes_are_read_from_the_graph() {
    let model = OnnxModel::load(&fixture("tiny_rgb.onnx")).unwrap();

    let spec = model.input_spec();
    assert_eq!(spec.size, 4);
    assert_eq!(spec.layout, TensorLayout::Nhwc);
    assert_eq!(model.output_len(), Some(3));
}

#[test]
fn test_run_returns_one_score_per_class() {
    let model = OnnxModel::load(&fixture("tiny_rgb.onnx")).unwrap();

    let mut input = Array4::<f32>::zeros((1, 4, 4, 3));
    input.slice_mut(ndarray::s![.., .., .., 2]).fill(1.0);

    let scores = model.run(input).unwrap();
    assert_eq!(scores.len(), 3);
    assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    assert!(scores[2] > 0.99);
}

#[test]
fn test_run_rejects_wrong_input_shape() {
    let model = OnnxModel::load(&fixture("tiny_rgb.onnx")).unwrap();

    assert!(matches!(
        model.run(Array4::<f32>::zeros((1, 8, 8, 3))),
        Err(ClassifierError::Inference(_))
    ));
}

#[test]
fn test_classifier_over_onnx_model() {
    let classifier = ImageClassifier::load(
        &fixture("tiny_rgb.onnx"),
        &fixture("tiny_rgb_labels.txt"),
        ResizeFilter::Bilinear,
    )
    .unwrap();

    let green = classifier.classify(&png([0, 255, 0])).unwrap();
    assert_eq!(green.label, "green");
    assert!(green.confidence > 0.99 && green.confidence <= 1.0);

    assert_eq!(classifier.classify(&png([250, 10, 10])).unwrap().label, "red");
    assert_eq!(classifier.classify(&png([5, 5, 240])).unwrap().label, "blue");

    let again = classifier.classify(&png([0, 255, 0])).unwrap();
    assert_eq!(again, green);
}

#[test]
fn test_label_count_must_match_model_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels.txt");
    std::fs::write(&labels, "red\ngreen\n").unwrap();

    assert!(matches!(
        ImageClassifier::load(&fixture("tiny_rgb.onnx"), &labels, ResizeFilter::Nearest),
        Err(ClassifierError::ModelLoad(_))
    ));
}
