mod common;
use common::{file_names, noise, small_image};
use eegram::renderer::window_path;
use eegram::{
    render_all, PipelineConfig, SpectrogramConfig, SpectrogramRenderer, WindowPlan,
};
use proptest::prelude::*;

fn renderer() -> SpectrogramRenderer {
    SpectrogramRenderer::new(&SpectrogramConfig::default(), &small_image())
}

/// 2000 noise samples with window #7 (`[768, 1024)`) zeroed out.
fn signal_with_silent_window() -> Vec<f32> {
    let mut s = noise(2000, 7);
    s[768..1024].iter_mut().for_each(|v| *v = 0.0);
    s
}

#[test]
fn silent_window_is_skipped_but_keeps_its_ordinal() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("focused");
    let mut r = renderer();

    let summary = r
        .render_all(&signal_with_silent_window(), 128.0, 256, 128, &prefix)
        .unwrap();
    assert_eq!(summary.rendered, 13);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.skipped_ordinals, vec![7]);

    for n in 1..=14 {
        assert_eq!(window_path(&prefix, n).exists(), n != 7, "focused_{n}.png");
    }
    assert!(!window_path(&prefix, 15).exists());
    assert_eq!(file_names(dir.path()).len(), 13);
    assert!(r.canvas_is_clear());
}

#[test]
fn rendered_images_have_configured_size() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("drowsy");
    renderer().render_all(&noise(600, 1), 128.0, 256, 128, &prefix).unwrap();
    let img = image::open(window_path(&prefix, 1)).unwrap();
    assert_eq!((img.width(), img.height()), small_image().pixel_size());
}

#[test]
fn rerun_reproduces_paths_and_counts() {
    let signal = signal_with_silent_window();
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let mut r = renderer();

    let first = r.render_all(&signal, 128.0, 256, 128, &a.path().join("unfocused")).unwrap();
    let second = r.render_all(&signal, 128.0, 256, 128, &b.path().join("unfocused")).unwrap();
    assert_eq!(first, second);
    assert_eq!(file_names(a.path()), file_names(b.path()));
}

#[test]
fn short_sequence_renders_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let summary = renderer()
        .render_all(&noise(256, 3), 128.0, 256, 128, &dir.path().join("focused"))
        .unwrap();
    assert_eq!(summary.windows(), 0);
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn invalid_parameters_fail_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("focused");
    let mut r = renderer();
    let s = noise(1000, 4);
    assert!(r.render_all(&s, 128.0, 0, 128, &prefix).is_err());
    assert!(r.render_all(&s, 128.0, 256, 0, &prefix).is_err());
    assert!(r.render_all(&s, 0.0, 256, 128, &prefix).is_err());
    assert!(r.render_all(&s, f32::NAN, 256, 128, &prefix).is_err());
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn unwritable_window_does_not_stop_the_group() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("focused");
    // a directory squatting on window 2's file name
    std::fs::create_dir(window_path(&prefix, 2)).unwrap();
    let mut r = renderer();

    let summary = r.render_all(&noise(2000, 11), 128.0, 256, 128, &prefix).unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_ordinals, vec![2]);
    assert_eq!(summary.rendered, 13);
    assert_eq!(summary.windows(), 14);
    for n in (1..=14).filter(|&n| n != 2) {
        assert!(window_path(&prefix, n).is_file(), "focused_{n}.png");
    }
    assert!(r.canvas_is_clear());
}

#[test]
fn missing_output_directory_fails_every_window() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("absent").join("focused");
    let mut r = renderer();
    let summary = r.render_all(&noise(600, 5), 128.0, 256, 128, &prefix).unwrap();
    assert_eq!(summary.rendered, 0);
    assert_eq!(summary.failed, summary.windows());
    assert_eq!(summary.failed_ordinals, vec![1, 2, 3]);
    assert!(r.canvas_is_clear());
}

#[test]
fn free_function_uses_configured_stride() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig { stride: Some(200), image: small_image(), ..PipelineConfig::default() };
    let summary = render_all(&noise(1000, 6), 128.0, 256, &dir.path().join("focused"), &cfg).unwrap();
    // starts 0, 200, 400, 600; 800 + 256 runs past the end
    assert_eq!(summary.rendered, 4);
}

#[test]
fn default_stride_is_one_second() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig { image: small_image(), ..PipelineConfig::default() };
    let summary = render_all(&noise(1000, 8), 128.0, 256, &dir.path().join("focused"), &cfg).unwrap();
    assert_eq!(summary.windows(), (1000 - 256 - 1) / 128 + 1);
}

#[test]
fn default_stride_follows_the_given_sample_rate() {
    let dir = tempfile::tempdir().unwrap();
    // configured for 128 Hz, called with a 256 Hz sequence
    let cfg = PipelineConfig { image: small_image(), ..PipelineConfig::default() };
    let prefix = dir.path().join("focused");
    let summary = render_all(&noise(1000, 12), 256.0, 256, &prefix, &cfg).unwrap();
    // starts 0, 256, 512; 768 + 256 runs past the end
    assert_eq!(summary.windows(), 3);
    assert_eq!(file_names(dir.path()), ["focused_1.png", "focused_2.png", "focused_3.png"]);
}

proptest! {
    #[test]
    fn window_count_matches_closed_form(len in 0usize..5000, wl in 1usize..600, stride in 1usize..600) {
        let plan = WindowPlan::new(len, wl, stride).unwrap();
        let expected = if len > wl { (len - wl - 1) / stride + 1 } else { 0 };
        prop_assert_eq!(plan.count(), expected);
        prop_assert_eq!(plan.iter().count(), expected);
    }

    #[test]
    fn ordinals_are_consecutive_from_one(len in 0usize..5000, wl in 1usize..600, stride in 1usize..600) {
        let plan = WindowPlan::new(len, wl, stride).unwrap();
        for (i, span) in plan.iter().enumerate() {
            prop_assert_eq!(span.ordinal, i + 1);
            prop_assert_eq!(span.range.start, i * stride);
            prop_assert_eq!(span.range.len(), wl);
            prop_assert!(span.range.end < len);
        }
    }
}
