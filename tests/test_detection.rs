extern crate card_detect;

use std::sync::Arc;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use card_detect::common::{ConfidenceSource, LabelTable, ModelExport, PipelineConfig, TensorLayout};
use card_detect::data::PixelLayout;
use card_detect::detection_runners::{
    resolve_class, ConfidenceFilter, CoordinateMapper, DetectionPipeline, InferenceProcess, NonMaxSuppressor, Nms,
    TensorDecoder,
};


use colours::get_suit_colour;
use mock_backend::{assert_close, card_deck_buffer, MockBackend};

fn single_class_rows() -> PipelineConfig {
    PipelineConfig::default()
        .with_export(ModelExport::objectness_rows())
        .with_num_detections(2)
        .with_num_channels(6)
}

#[test]
fn duplicate_boxes_collapse_to_the_most_confident() {
    let config = single_class_rows();
    let buffer: [f32; 12] = [
        0.5, 0.5, 0.2, 0.2, 0.9, 1.0,
        0.5, 0.5, 0.2, 0.2, 0.8, 1.0,
    ];

    let decoded = TensorDecoder::from_config(&config).unwrap().decode(&buffer).unwrap();
    let filtered = ConfidenceFilter::new(0.5).apply(decoded);
    assert_eq!(filtered.len(), 2);

    let kept = NonMaxSuppressor::new(0.5).suppress(filtered);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].slot, 0);
    assert_eq!(kept[0].confidence, 0.9);

    let pipeline = DetectionPipeline::new(config, Arc::new(LabelTable::new(&["card"]))).unwrap();
    let detections = pipeline.process(&buffer).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].get_label(), "card");
    assert_eq!(detections[0].confidence, 0.9);
}

#[test]
fn maps_to_pixel_corners() {
    let config = single_class_rows();
    let raw = TensorDecoder::from_config(&config)
        .unwrap()
        .decode(&[0.5, 0.5, 0.2, 0.2, 0.9, 1.0, 0.5, 0.5, 0.4, 0.4, 0.9, 1.0])
        .unwrap();
    let mapper = CoordinateMapper::new(640, 640);

    assert_close(mapper.to_pixels(&raw[0]).xy1_xy2(), (256.0, 256.0, 384.0, 384.0));
    assert_close(mapper.to_pixels(&raw[1]).xy1_xy2(), (192.0, 192.0, 448.0, 448.0));
}

#[test]
fn resolves_highest_class_score() {
    assert_eq!(resolve_class(&[0.1, 0.9, 0.3]), Some(1));
}

#[test]
fn card_deck_end_to_end() {
    let buffer = card_deck_buffer(&[
        (10, [0.5, 0.5, 0.2, 0.2], 39, 0.9),
        (20, [0.5, 0.5, 0.2, 0.2], 39, 0.8),
        (30, [0.1, 0.1, 0.1, 0.1], 0, 0.7),
        (40, [0.8, 0.8, 0.1, 0.1], 5, 0.3),
    ]);

    let detections = card_detect::parse_detections(&buffer, 0.5, 0.4).unwrap();
    assert_eq!(detections.len(), 2);

    assert_eq!(detections[0].slot, 10);
    assert_eq!(detections[0].class_id, 39);
    assert_eq!(detections[0].get_label(), "AS");
    assert_close(detections[0].bbox.xy1_xy2(), (256.0, 256.0, 384.0, 384.0));

    assert_eq!(detections[1].slot, 30);
    assert_eq!(detections[1].get_label(), "10C");
    assert_close(detections[1].bbox.xy1_xy2(), (32.0, 32.0, 96.0, 96.0));
}

#[test]
fn row_and_plane_major_pipelines_agree() {
    let labels = Arc::new(LabelTable::new(&["red", "black"]));
    let rows: Vec<f32> = vec![
        0.2, 0.2, 0.1, 0.1, 0.9, 0.1,
        0.6, 0.6, 0.2, 0.2, 0.3, 0.7,
        0.9, 0.9, 0.1, 0.1, 0.2, 0.1,
    ];
    let mut planes = vec![0.0; rows.len()];
    for slot in 0..3 {
        for c in 0..6 {
            planes[c * 3 + slot] = rows[slot * 6 + c];
        }
    }

    let base = PipelineConfig::default().with_num_detections(3).with_num_channels(6);
    let by_rows = DetectionPipeline::new(base.clone().with_layout(TensorLayout::RowMajor), labels.clone()).unwrap();
    let by_planes = DetectionPipeline::new(base.with_layout(TensorLayout::PlaneMajor), labels).unwrap();

    let a = by_rows.process(&rows).unwrap();
    assert_eq!(a, by_planes.process(&planes).unwrap());
    assert_eq!(a.iter().map(|d| d.get_label()).collect::<Vec<_>>(), vec!["red", "black"]);
}

fn random_buffer(rng: &mut StdRng, num_detections: usize) -> Vec<f32> {
    // row-major, max-class-score, two classes
    let mut rows = Vec::with_capacity(num_detections * 6);
    for _ in 0..num_detections {
        let w: f32 = rng.gen_range(0.02..0.3);
        let h: f32 = rng.gen_range(0.02..0.3);
        rows.extend_from_slice(&[
            rng.gen_range(0.1..0.9),
            rng.gen_range(0.1..0.9),
            w,
            h,
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
        ]);
    }
    rows
}

fn random_pipeline(conf: f32, iou: f32) -> DetectionPipeline {
    let config = PipelineConfig::default()
        .with_layout(TensorLayout::RowMajor)
        .with_confidence_source(ConfidenceSource::MaxClassScore)
        .with_num_detections(300)
        .with_num_channels(6)
        .with_conf_threshold(conf)
        .with_iou_threshold(iou);
    DetectionPipeline::new(config, Arc::new(LabelTable::new(&["red", "black"]))).unwrap()
}

#[test]
fn survivors_never_overlap_past_threshold() {
    let mut rng = StdRng::seed_from_u64(52);
    for _ in 0..20 {
        let buffer = random_buffer(&mut rng, 300);
        let pipeline = random_pipeline(0.3, 0.4);
        let detections = pipeline.process(&buffer).unwrap();
        assert!(!detections.is_empty());

        for (i, a) in detections.iter().enumerate() {
            assert!(a.confidence > 0.3);
            assert!(a.bbox.x_min() <= a.bbox.x_max() && a.bbox.y_min() <= a.bbox.y_max());
            for b in &detections[i + 1..] {
                assert!(a.iou(b) <= 0.4 + 1e-4, "slots {} and {} overlap by {}", a.slot, b.slot, a.iou(b));
            }
        }
        for pair in detections.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
}

#[test]
fn threshold_extremes() {
    let mut rng = StdRng::seed_from_u64(7);
    let buffer = random_buffer(&mut rng, 300);

    // scores are all below 1, and the comparison is strict
    assert!(random_pipeline(1.0, 0.4).process(&buffer).unwrap().is_empty());

    // IoU never exceeds 1, so nothing is suppressed
    let all = random_pipeline(0.0, 1.0).process(&buffer).unwrap();
    let positive = buffer.chunks(6).filter(|row| row[4].max(row[5]) > 0.0).count();
    assert_eq!(all.len(), positive);
}

#[test]
fn processing_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(99);
    let buffers: Vec<Vec<f32>> = (0..4).map(|_| random_buffer(&mut rng, 300)).collect();
    let pipeline = random_pipeline(0.5, 0.4);

    let sequential: Vec<_> = buffers.iter().map(|b| pipeline.process(b)).collect();
    assert_eq!(pipeline.process_batch(&buffers), sequential);
    assert_eq!(pipeline.process(&buffers[0]), sequential[0]);
}

#[test]
fn labels_from_model_metadata() {
    let names = "{0: '10C', 1: '10D', 2: '10H', 3: '10S', 4: '2C', 5: '2D', 6: '2H', 7: '2S', 8: '3C', \
        9: '3D', 10: '3H', 11: '3S', 12: '4C', 13: '4D', 14: '4H', 15: '4S', 16: '5C', 17: '5D', 18: '5H', \
        19: '5S', 20: '6C', 21: '6D', 22: '6H', 23: '6S', 24: '7C', 25: '7D', 26: '7H', 27: '7S', 28: '8C', \
        29: '8D', 30: '8H', 31: '8S', 32: '9C', 33: '9D', 34: '9H', 35: '9S', 36: 'AC', 37: 'AD', 38: 'AH', \
        39: 'AS', 40: 'JC', 41: 'JD', 42: 'JH', 43: 'JS', 44: 'KC', 45: 'KD', 46: 'KH', 47: 'KS', 48: 'QC', \
        49: 'QD', 50: 'QH', 51: 'QS'}";
    let labels = LabelTable::from_metadata(names).unwrap();
    assert_eq!(&labels, LabelTable::cards());
    assert!(std::ptr::eq(DetectionPipeline::card_deck().unwrap().labels(), LabelTable::cards()));
    assert_eq!(PipelineConfig::default().validate(&labels), Ok(()));
}

#[test]
fn detector_runs_photo_through_backend() {
    let buffer = card_deck_buffer(&[(100, [0.25, 0.75, 0.1, 0.2], 14, 0.95)]);
    let backend = MockBackend::loaded_with(vec![buffer]);
    let mut detector = card_detect::init_detector(PipelineConfig::default(), backend).unwrap();

    let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([20, 120, 40])));
    let detections = card_detect::run_detection(&mut detector, &photo).unwrap();

    assert_eq!(detector.backend().calls, 1);
    assert_eq!(detector.backend().last_shape, vec![1, 640, 640, 3]);
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].get_label(), "4H");
    assert_close(detections[0].bbox.xy1_xy2(), (128.0, 416.0, 192.0, 544.0));
}

#[test]
fn profiled_runs_are_timed() {
    let backend = MockBackend::loaded_with(vec![card_deck_buffer(&[])]);
    let mut detector = card_detect::init_detector(PipelineConfig::default(), backend)
        .unwrap()
        .with_pixel_layout(PixelLayout::Nchw);
    let photo = DynamicImage::new_rgb8(64, 48);

    for _ in 0..3 {
        assert!(detector.forward(&photo, true).unwrap().is_empty());
    }
    assert_eq!(detector.backend().last_shape, vec![1, 3, 640, 640]);
    assert_eq!(detector.timings().runs(), 3);
    assert_eq!(detector.timings().ts().len(), 3);
    assert!(detector.timings().avg().is_some());
}

#[test]
fn overlay_draws_detections() {
    let buffer = card_deck_buffer(&[
        (1, [0.25, 0.25, 0.2, 0.2], 2, 0.9), // 10H
        (2, [0.75, 0.75, 0.2, 0.2], 3, 0.8), // 10S
    ]);
    let detections = card_detect::parse_detections(&buffer, 0.5, 0.4).unwrap();
    assert_eq!(detections.len(), 2);

    let mut img = RgbImage::from_pixel(640, 640, Rgb([255, 255, 255]));
    for det in &detections {
        let (x, y, w, h) = det.bbox.as_xy_wh_i32();
        let rect = Rect::at(x, y).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(&mut img, rect, get_suit_colour(&det.get_label()));
    }

    // top-left corners of each box: (96, 96) and (416, 416)
    assert_eq!(*img.get_pixel(96, 96), Rgb([255, 0, 0]));
    assert_eq!(*img.get_pixel(416, 416), Rgb([0, 0, 0]));
    assert_eq!(*img.get_pixel(320, 320), Rgb([255, 255, 255]));
}
