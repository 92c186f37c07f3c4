use particle_compute::render::{FrameSink, TerminalConfig, TerminalRenderer};
use particle_compute::test_utils::SceneBuilder;
use particle_compute::Particle;

fn at(x: f32, y: f32) -> Particle {
    Particle::new([x, y], [0.0, 0.0])
}

fn cursor_writes(frame: &str) -> usize {
    // Each drawn particle is one cursor move followed by the glyph
    frame.matches('H').count() - 1
}

#[test]
fn test_visible_iff_inside_region() {
    let config = TerminalConfig::default();
    let (w, h) = (config.width as f32, config.height as f32);

    let mut checked = 0;
    let mut y = -3.0f32;
    while y < h + 3.0 {
        let mut x = -3.0f32;
        while x < w + 3.0 {
            let inside = x >= 0.0 && x < w && y >= 0.0 && y < h;
            let cell = config.cell_for(&at(x, y));
            assert_eq!(cell.is_some(), inside, "({}, {}) -> {:?}", x, y, cell);

            if let Some((row, col)) = cell {
                assert!((1..=config.height).contains(&row));
                assert!(col >= 1 && col <= config.column_scale * config.width);
            }
            checked += 1;
            x += 0.75;
        }
        y += 0.75;
    }
    assert!(checked > 1000);
}

#[test]
fn test_one_write_per_visible_particle() {
    let config = TerminalConfig::default();
    let mut particles = SceneBuilder::scattered(200, [106.0, 56.0], 0.0, 11);
    particles.extend([at(-1.0, 5.0), at(5.0, 56.0), at(106.0, 0.0), at(f32::NAN, 0.0)]);

    let visible = particles.iter().filter(|p| config.cell_for(p).is_some()).count();
    assert_eq!(visible, 200);

    let mut renderer = TerminalRenderer::new(Vec::new(), config);
    let frame = renderer.compose(&particles).to_string();

    assert!(frame.starts_with("\x1B[2J\x1B[H"));
    assert_eq!(cursor_writes(&frame), visible);
}

#[test]
fn test_present_writes_composed_frame() {
    let config = TerminalConfig::default().with_size(10, 5).with_glyph('*');
    let mut renderer = TerminalRenderer::new(Vec::new(), config);

    renderer.present(0, &[at(0.0, 0.0), at(9.5, 4.5), at(10.0, 1.0)]).unwrap();

    let written = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(written, "\x1B[2J\x1B[H\x1B[5;1H*\x1B[1;19H*");
}

#[test]
fn test_each_frame_replaces_previous() {
    let mut renderer = TerminalRenderer::new(Vec::new(), TerminalConfig::default());

    renderer.present(0, &[at(1.0, 1.0), at(2.0, 2.0)]).unwrap();
    renderer.present(1, &[at(3.0, 3.0)]).unwrap();

    let written = String::from_utf8(renderer.into_inner()).unwrap();
    let frames: Vec<&str> = written.split("\x1B[2J").filter(|f| !f.is_empty()).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(cursor_writes(frames[1]), 1);
}
