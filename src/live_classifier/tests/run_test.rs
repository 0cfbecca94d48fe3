use crate::device_camera::impl_fake::DeviceCameraFakeOptions;
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::impl_fake::ImageClassifierFake;
use crate::image_classifier::interface::ImageClassifier;
use crate::live_classifier::tests::fixture::{
    classification, wait_until, ClassifierFailing, Fixture,
};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_loop_presents_labels_and_paces_captures() {
    let f = Fixture::new();
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    assert!(wait_until(TIMEOUT, || f.display_writes().len() >= 3));
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    let writes = f.display_writes();
    assert!(writes.iter().all(|text| text == "cat\n"));

    let captures = f.device_camera.capture_times();
    assert!(captures.len() >= 3);
    for pair in captures.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= f.config.capture_interval);
    }
    // One capture per presented label, plus at most the one in flight at shutdown
    assert!(captures.len() <= writes.len() + 1);

    let display = f.device_display.lock().unwrap();
    assert_eq!(display.preview_size(), Some(f.config.display_bounds));
    assert!(display.preview_frames() > 0);
    assert!(display.is_closed());
    drop(display);

    assert!(!f.device_camera.is_running());
    assert!(f.scratch_dir.path().join("image.png").exists());
}

#[test]
fn test_capture_error_stalls_without_update() {
    let f = Fixture::with(
        DeviceCameraFakeOptions {
            fail_capture_at: Some(1),
            ..DeviceCameraFakeOptions::default()
        },
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::new(logger))
        },
    );
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    assert!(wait_until(TIMEOUT, || f.device_camera.capture_times().len() >= 2));
    std::thread::sleep(f.config.capture_interval * 5);
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    assert_eq!(f.device_camera.capture_times().len(), 2);
    assert_eq!(f.display_writes().len(), 1);
}

#[test]
fn test_empty_classification_terminates_without_touching_display() {
    let f = Fixture::with(
        DeviceCameraFakeOptions::default(),
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::returning(logger, vec![]))
        },
    );
    let live_classifier = f.live_classifier();

    let result = live_classifier.run();

    let error = result.unwrap_err().to_string();
    assert!(error.starts_with("could not get any prediction output"));
    assert!(f.display_writes().is_empty());
    assert_eq!(f.device_display.lock().unwrap().text(), "");
    assert_eq!(f.device_camera.capture_times().len(), 1);
}

#[test]
fn test_classifier_failure_terminates() {
    let f = Fixture::with(
        DeviceCameraFakeOptions::default(),
        |_logger| -> Arc<dyn ImageClassifier + Send + Sync> { Arc::new(ClassifierFailing) },
    );

    let result = f.live_classifier().run();

    let error = result.unwrap_err().to_string();
    assert!(error.contains("model rejected request"));
    assert!(f.display_writes().is_empty());
}

#[test]
fn test_missing_device_leaves_app_inert() {
    let f = Fixture::with(
        DeviceCameraFakeOptions {
            has_device: false,
            ..DeviceCameraFakeOptions::default()
        },
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::new(logger))
        },
    );
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    std::thread::sleep(f.config.capture_interval * 3);
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    assert!(f.device_camera.capture_times().is_empty());
    let display = f.device_display.lock().unwrap();
    assert_eq!(display.preview_size(), None);
    assert!(display.writes().is_empty());
}

#[test]
fn test_rejected_still_output_keeps_preview_only() {
    let f = Fixture::with(
        DeviceCameraFakeOptions {
            accepts_still_output: false,
            ..DeviceCameraFakeOptions::default()
        },
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::new(logger))
        },
    );
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    assert!(wait_until(TIMEOUT, || {
        f.device_display.lock().unwrap().preview_frames() > 0
    }));
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    assert!(f.device_camera.capture_times().is_empty());
    assert!(f.display_writes().is_empty());
}

#[test]
fn test_shutdown_during_startup_releases_camera() {
    let f = Fixture::with(
        DeviceCameraFakeOptions {
            open_delay: Duration::from_millis(200),
            ..DeviceCameraFakeOptions::default()
        },
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::new(logger))
        },
    );
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    std::thread::sleep(Duration::from_millis(50));
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    assert!(!f.device_camera.is_running());
    std::thread::sleep(Duration::from_millis(100));
    assert!(!f.device_camera.is_running());
    assert!(f.device_camera.capture_times().is_empty());
}

#[test]
fn test_first_capture_waits_for_a_late_first_frame() {
    let f = Fixture::with(
        DeviceCameraFakeOptions {
            first_frame_delay: Duration::from_millis(150),
            ..DeviceCameraFakeOptions::default()
        },
        |logger| -> Arc<dyn ImageClassifier + Send + Sync> {
            Arc::new(ImageClassifierFake::returning(
                logger,
                vec![classification("cat", 0.8)],
            ))
        },
    );
    let live_classifier = f.live_classifier();
    let shutdown = live_classifier.shutdown_handle();

    let handle = std::thread::spawn(move || live_classifier.run().map_err(|e| e.to_string()));

    assert!(wait_until(TIMEOUT, || !f.display_writes().is_empty()));
    shutdown.shutdown();
    assert_eq!(handle.join().unwrap(), Ok(()));

    assert_eq!(f.display_writes()[0], "cat\n");
}
