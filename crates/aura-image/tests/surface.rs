//! End-to-end tests for aura-image
//!
//! Fixtures are real image files written to the temp directory.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use aura_image::*;

// ============================================================================
// FIXTURES
// ============================================================================

fn fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("aura-image-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a solid-color PNG and return its path
fn png(name: &str, width: u32, height: u32, rgba: [u8; 4]) -> String {
    let path = fixture_dir().join(name);
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path.to_string_lossy().into_owned()
}

/// Write arbitrary bytes and return the path
fn raw(name: &str, bytes: &[u8]) -> String {
    let path = fixture_dir().join(name);
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Load { path: String, width: u32, height: u32 },
    Error { path: String, reason: FailureReason },
}

fn surface_with(source: ImageSource) -> (RenderSurface, Rc<RefCell<Vec<Event>>>) {
    let render = RenderConfig {
        smooth_scaling: false,
        anti_alias: false,
        ..RenderConfig::default()
    };
    let mut surface = RenderSurface::new(source, render);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    surface.on_load(move |e| {
        sink.borrow_mut().push(Event::Load {
            path: e.path.to_string(),
            width: e.width,
            height: e.height,
        })
    });
    let sink = Rc::clone(&events);
    surface.on_error(move |e| {
        sink.borrow_mut().push(Event::Error {
            path: e.path.to_string(),
            reason: e.reason,
        })
    });

    (surface, events)
}

fn surface() -> (RenderSurface, Rc<RefCell<Vec<Event>>>) {
    surface_with(ImageSource::default())
}

// ============================================================================
// IMAGE SOURCE
// ============================================================================

#[test]
fn test_cached_load_does_not_reread_file() {
    let path = png("cached.png", 8, 8, [10, 20, 30, 255]);
    let source = ImageSource::default();

    let first = source.load_blocking(path.as_str()).unwrap();
    std::fs::remove_file(&path).unwrap();
    let second = source.load_blocking(path.as_str()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.stats().decodes, 1);
}

#[test]
fn test_concurrent_loads_share_one_decode() {
    let path = png("concurrent.png", 512, 512, [1, 2, 3, 255]);
    let source = ImageSource::default();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let source = source.clone();
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                barrier.wait();
                source.load_blocking(path).unwrap()
            })
        })
        .collect();

    let images: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(Arc::ptr_eq(&images[0], &images[1]));
    assert_eq!(source.stats().decodes, 1);
}

#[test]
fn test_decode_errors() {
    let source = ImageSource::default();

    let garbage = raw("garbage.png", b"this is not a png at all");
    let err = source.load_blocking(garbage).unwrap_err();
    assert_eq!(err.reason(), FailureReason::DecodeError);

    let text = raw("notes.txt", b"plain text with an unknown extension");
    let err = source.load_blocking(text).unwrap_err();
    assert_eq!(err.reason(), FailureReason::DecodeError);
}

#[test]
fn test_format_sniffed_despite_wrong_extension() {
    let path = png("actually-png.jpg", 3, 5, [0, 0, 0, 255]);
    let image = ImageSource::default().load_blocking(path).unwrap();
    assert_eq!(image.size(), Size::new(3, 5));
    assert_eq!(image.format(), ImageFormat::Png);
}

#[test]
fn test_cache_evicts_least_recently_used() {
    let a = png("evict-a.png", 4, 4, [255, 0, 0, 255]);
    let b = png("evict-b.png", 4, 4, [0, 255, 0, 255]);
    let source = ImageSource::new(&SourceConfig {
        max_entries: 1,
        ..SourceConfig::default()
    });

    source.load_blocking(a.as_str()).unwrap();
    source.load_blocking(b.as_str()).unwrap();
    source.load_blocking(a.as_str()).unwrap();

    let stats = source.stats();
    assert_eq!(stats.decodes, 3);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.evictions, 2);
}

// ============================================================================
// RENDER SURFACE
// ============================================================================

#[test]
fn test_aspect_fit_scenarios() {
    let exact = png("fit-200x100.png", 200, 100, [0, 0, 255, 255]);
    let wide = png("fit-400x100.png", 400, 100, [0, 0, 255, 255]);

    let (mut surface, events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
    surface.set_resize_mode(ResizeMode::AspectFit);

    surface.set_path(exact.as_str());
    assert!(surface.wait_for_completion());
    assert_eq!(surface.frame().unwrap().draw_rect, Rect::new(0.0, 0.0, 100.0, 50.0));

    surface.set_path(wide.as_str());
    assert!(surface.wait_for_completion());
    let frame = surface.frame().unwrap();
    assert_eq!(frame.draw_rect, Rect::new(0.0, 12.5, 100.0, 25.0));

    let canvas = frame.canvas.as_ref().unwrap();
    assert_eq!(canvas.get_pixel(50, 25), Some(Color::BLUE));
    assert_eq!(canvas.get_pixel(50, 5).unwrap().a, 0);

    assert_eq!(
        *events.borrow(),
        vec![
            Event::Load { path: exact, width: 200, height: 100 },
            Event::Load { path: wide, width: 400, height: 100 },
        ]
    );
}

#[test]
fn test_round_trip_uses_cache() {
    let a = png("round-a.png", 10, 10, [255, 0, 0, 255]);
    let b = png("round-b.png", 10, 10, [0, 255, 0, 255]);
    let (mut surface, events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 10.0, 10.0));

    surface.set_path(a.as_str());
    surface.wait_for_completion();
    surface.set_path(b.as_str());
    surface.wait_for_completion();
    let decodes = surface.source().stats().decodes;

    surface.set_path(a.as_str());
    assert!(surface.wait_for_completion());

    assert_eq!(surface.source().stats().decodes, decodes);
    let loads: Vec<_> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Load { path, .. } => Some(path.clone()),
            Event::Error { .. } => None,
        })
        .collect();
    assert_eq!(loads, vec![a.clone(), b, a]);
}

#[test]
fn test_superseded_path_is_never_reported() {
    let a = png("stale-a.png", 1024, 1024, [255, 0, 0, 255]);
    let b = png("stale-b.png", 2, 2, [0, 255, 0, 255]);
    let (mut surface, events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 16.0, 16.0));

    surface.set_path(a.as_str());
    surface.set_path(b.as_str());
    surface.wait_for_completion();

    // Give the superseded load time to land, then drain it
    thread::sleep(Duration::from_millis(200));
    surface.process_completions();

    assert_eq!(*events.borrow(), vec![Event::Load { path: b, width: 2, height: 2 }]);
}

#[test]
fn test_unreadable_path_reports_not_found_once() {
    let missing = fixture_dir().join("does-not-exist.png").to_string_lossy().into_owned();
    let (mut surface, events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 10.0, 10.0));

    surface.set_path(missing.as_str());
    assert!(!surface.wait_for_completion());
    thread::sleep(Duration::from_millis(50));
    surface.process_completions();

    assert_eq!(
        *events.borrow(),
        vec![Event::Error { path: missing, reason: FailureReason::NotFound }]
    );
    assert!(surface.frame().is_none());
}

#[test]
fn test_empty_path_reports_not_found() {
    let (mut surface, events) = surface();
    surface.set_path("");
    surface.wait_for_completion();

    assert_eq!(
        *events.borrow(),
        vec![Event::Error { path: String::new(), reason: FailureReason::NotFound }]
    );
}

#[test]
fn test_directory_path_reports_not_found() {
    let dir = fixture_dir().to_string_lossy().into_owned();
    let (mut surface, events) = surface();
    surface.set_path(dir.as_str());
    surface.wait_for_completion();

    assert_eq!(*events.borrow(), vec![Event::Error { path: dir, reason: FailureReason::NotFound }]);
}

#[test]
fn test_rounded_corners_are_transparent() {
    let path = png("rounded.png", 50, 50, [0, 255, 0, 255]);
    let (mut surface, _events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
    surface.set_resize_mode(ResizeMode::Stretch);
    surface.set_corner_radius(16.0);
    surface.set_path(path.as_str());
    surface.wait_for_completion();

    let canvas = surface.frame().unwrap().canvas.as_ref().unwrap();
    assert_eq!(canvas.get_pixel(0, 0).unwrap().a, 0);
    assert_eq!(canvas.get_pixel(49, 49).unwrap().a, 0);
    assert_eq!(canvas.get_pixel(25, 25), Some(Color::GREEN));
    assert_eq!(canvas.get_pixel(25, 0), Some(Color::GREEN));

    // Dropping the radius re-renders with square corners
    surface.set_corner_radius(0.0);
    let canvas = surface.frame().unwrap().canvas.as_ref().unwrap();
    assert_eq!(canvas.get_pixel(0, 0), Some(Color::GREEN));
}

#[test]
fn test_zero_area_target_still_loads() {
    let path = png("zero-target.png", 20, 10, [255, 255, 255, 255]);
    for mode in ResizeMode::ALL {
        let (mut surface, events) = surface();
        surface.set_resize_mode(mode);
        surface.set_target_rect(Rect::new(5.0, 5.0, 0.0, 0.0));
        surface.set_path(path.as_str());

        assert!(surface.wait_for_completion());
        let frame = surface.frame().unwrap();
        assert!(frame.draw_rect.is_empty());
        assert!(frame.canvas.is_none());
        assert_eq!(events.borrow().len(), 1);
    }
}

#[test]
fn test_surfaces_share_cache() {
    let path = png("shared.png", 6, 6, [9, 9, 9, 255]);
    let source = ImageSource::default();

    let (mut first, _) = surface_with(source.clone());
    let (mut second, second_events) = surface_with(source.clone());

    first.set_path(path.as_str());
    first.wait_for_completion();
    second.set_path(path.as_str());
    second.wait_for_completion();

    assert_eq!(source.stats().decodes, 1);
    assert_eq!(second_events.borrow().len(), 1);
    assert!(Arc::ptr_eq(first.image().unwrap(), second.image().unwrap()));
}

#[test]
fn test_async_settle() {
    let path = png("settle.png", 4, 4, [0, 0, 0, 255]);
    let (mut surface, events) = surface();
    surface.set_target_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
    surface.set_path(path.as_str());

    assert!(smol::block_on(surface.settle()));
    assert_eq!(events.borrow().len(), 1);
}
