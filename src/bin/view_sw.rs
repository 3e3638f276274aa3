use anyhow::Context;
use clap::Parser;
use glam::{Vec3, vec2};
use log::info;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::time::{Duration, Instant};

use doomview::{
    defs::thing_info,
    renderer::{GameColors, RenderOptions, Renderer, Selection, Software, View},
    world::{Camera, Image, Level, LevelBuilder, LinedefFlags, TextureBank},
};

const MOVE_SPEED: f32 = 8.0;
const TURN_SPEED: f32 = 0.05;
const RISE_SPEED: f32 = 4.0;

/// Walk around a small built-in map with the software preview renderer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 960)]
    width: usize,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Render at half resolution
    #[arg(long)]
    low_detail: bool,

    /// Start with solid colours instead of textures
    #[arg(long)]
    no_textures: bool,

    /// Start without distance / sector shading
    #[arg(long)]
    no_lighting: bool,

    /// Start without sprites
    #[arg(long)]
    no_sprites: bool,

    /// Width:height of one screen pixel
    #[arg(long, default_value_t = 1.0)]
    pixel_aspect: f32,
}

impl Args {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            texturing: !self.no_textures,
            lighting: !self.no_lighting,
            sprites: !self.no_sprites,
            high_detail: !self.low_detail,
            pixel_aspect: self.pixel_aspect,
            ..RenderOptions::default()
        }
    }
}

/// Two rooms joined by a raised doorway, a window rail and a few things.
fn demo_level() -> anyhow::Result<Level> {
    let mut b = LevelBuilder::new("DEMO");

    let hall = b.sector(0, 160, "FLOOR4_8", "CEIL3_5", 192);
    let yard = b.sector(-16, 256, "FLOOR0_1", "F_SKY1", 224);
    let door = b.sector(8, 128, "FLOOR4_8", "CEIL3_5", 160);

    // hall: x -512..0, yard: x 64..576, door in between at y -64..64
    for (a, z, sector, tex) in [
        ((-512.0, -256.0), (-512.0, 256.0), hall, "STARTAN3"),
        ((-512.0, 256.0), (0.0, 256.0), hall, "STARTAN3"),
        ((0.0, -256.0), (-512.0, -256.0), hall, "STARTAN3"),
        ((0.0, 256.0), (0.0, 64.0), hall, "STARTAN3"),
        ((0.0, -64.0), (0.0, -256.0), hall, "STARTAN3"),
        ((64.0, 256.0), (576.0, 256.0), yard, "BRICK1"),
        ((576.0, 256.0), (576.0, -256.0), yard, "BRICK1"),
        ((576.0, -256.0), (64.0, -256.0), yard, "BRICK1"),
        ((64.0, 64.0), (64.0, 256.0), yard, "BRICK1"),
        ((64.0, -256.0), (64.0, -64.0), yard, "BRICK1"),
        ((0.0, 64.0), (64.0, 64.0), door, "DOORTRAK"),
        ((64.0, -64.0), (0.0, -64.0), door, "DOORTRAK"),
    ] {
        let sd = b.side(sector, "-", tex, "-");
        b.line(a, z, sd, None);
    }

    // two-sided openings into the doorway, the yard side carries a rail
    let hall_side = b.side(hall, "STARTAN3", "-", "STEP1");
    let door_side = b.side(door, "STARTAN3", "-", "STEP1");
    b.side_offsets(hall_side, 32, 0);
    b.line((0.0, 64.0), (0.0, -64.0), hall_side, Some(door_side));

    let yard_side = b.side(yard, "BRICK1", "MIDGRATE", "STEP1");
    let door_side = b.side(door, "BRICK1", "MIDGRATE", "STEP1");
    let rail = b.line((64.0, -64.0), (64.0, 64.0), yard_side, Some(door_side));
    b.set_flags(rail, LinedefFlags::LOWER_UNPEGGED);

    b.thing(vec2(-128.0, 0.0), 0, 2028);
    b.thing(vec2(-256.0, 128.0), 0, 3001);
    b.thing(vec2(300.0, -100.0), 0, 3004);
    b.thing(vec2(320.0, 120.0), 0, 58);
    b.thing(vec2(-400.0, -160.0), 0, 49);
    b.thing(vec2(200.0, 0.0), 0, 9999);

    Ok(b.build()?)
}

/// Generated stand-ins for the images the demo map names.
fn demo_assets() -> anyhow::Result<TextureBank> {
    let mut bank = TextureBank::default_with_checker();

    for (name, w, h, light) in [
        ("STARTAN3", 128, 128, 11 * 16 + 2),
        ("BRICK1", 64, 128, 16 + 4),
        ("DOORTRAK", 8, 128, 5 * 16 + 4),
        ("STEP1", 32, 8, 3 * 16 + 3),
    ] {
        bank.insert_texture(name, Image::checker(name, w, h, light))?;
    }

    // see-through grate: every other column is transparent
    let mut grate = Image::solid("MIDGRATE", 64, 64, 9 * 16 + 3);
    for (i, p) in grate.pixels.iter_mut().enumerate() {
        if (i % 64) % 4 < 2 {
            *p = doomview::world::TRANS_PIXEL;
        }
    }
    bank.insert_texture("MIDGRATE", grate)?;

    for (name, light) in [("FLOOR4_8", 12 * 16 + 2), ("CEIL3_5", 14 * 16 + 2), ("FLOOR0_1", 2 * 16 + 4)] {
        bank.insert_flat(name, Image::checker(name, 64, 64, light))?;
    }

    for (name, w, h, colour) in [
        ("COLUA0", 16, 48, 13 * 16 + 1),
        ("TROOA1", 40, 56, 4 * 16 + 5),
        ("POSSA1", 32, 56, 6 * 16 + 5),
        ("SARGA1", 56, 56, 8 * 16 + 5),
        ("GOR1A0", 24, 64, 16 + 6),
    ] {
        bank.insert_sprite(name, Image::solid(name, w, h, colour))
            .with_context(|| format!("sprite {name}"))?;
    }

    Ok(bank)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let level = demo_level()?;
    let assets = demo_assets()?;
    info!(
        "level {}: {} lines, {} things, {} images",
        level.name,
        level.linedefs.len(),
        level.things.len(),
        assets.len()
    );

    let (w, h) = (args.width, args.height);
    let mut options = args.options();
    let colors = GameColors::default();
    let mut camera = Camera::new(Vec3::new(-448.0, 0.0, 41.0), 0.0);
    let mut selection = Selection::default();
    let mut renderer = Software::default();
    let mut fb = vec![0u32; w * h];

    let mut win = Window::new("doomview: software preview", w, h, WindowOptions::default())?;
    win.set_target_fps(35);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut was_down = false;

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /* movement --------------------------------------------------------- */
        let speed = if win.is_key_down(Key::LeftShift) { 2.0 } else { 1.0 };
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            camera.step(MOVE_SPEED * speed, 0.0);
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            camera.step(-MOVE_SPEED * speed, 0.0);
        }
        if win.is_key_down(Key::A) {
            camera.step(0.0, -MOVE_SPEED * speed);
        }
        if win.is_key_down(Key::D) {
            camera.step(0.0, MOVE_SPEED * speed);
        }
        if win.is_key_down(Key::Left) {
            camera.turn(TURN_SPEED * speed);
        }
        if win.is_key_down(Key::Right) {
            camera.turn(-TURN_SPEED * speed);
        }
        if win.is_key_down(Key::PageUp) {
            camera.rise(RISE_SPEED * speed);
        }
        if win.is_key_down(Key::PageDown) {
            camera.rise(-RISE_SPEED * speed);
        }

        /* toggles ---------------------------------------------------------- */
        if win.is_key_pressed(Key::T, KeyRepeat::No) {
            options.texturing = !options.texturing;
        }
        if win.is_key_pressed(Key::L, KeyRepeat::No) {
            options.lighting = !options.lighting;
        }
        if win.is_key_pressed(Key::P, KeyRepeat::No) {
            options.sprites = !options.sprites;
        }
        if win.is_key_pressed(Key::H, KeyRepeat::No) {
            options.high_detail = !options.high_detail;
        }
        if win.is_key_pressed(Key::C, KeyRepeat::No) {
            selection.selected.clear();
        }

        let view = View::new(&camera, w, h, options.clone(), colors.clone());

        /* picking ---------------------------------------------------------- */
        selection.hover = win
            .get_mouse_pos(MouseMode::Discard)
            .and_then(|(mx, my)| renderer.query_point(&view, &level, &assets, mx as i32, my as i32));

        let down = win.get_mouse_down(MouseButton::Left);
        if down && !was_down {
            if let Some(obj) = selection.hover {
                selection.toggle(obj);
                let what = obj
                    .thing()
                    .and_then(|th| level.things.get(th as usize))
                    .map_or("", |t| thing_info(t.type_id).desc);
                info!("toggled {obj:?} {what}, {} selected", selection.selected.len());
            }
        }
        was_down = down;

        /* draw ------------------------------------------------------------- */
        let t0 = Instant::now();
        renderer.render_world(&view, &level, &assets, &selection, &mut fb);
        acc_time += t0.elapsed();
        acc_frames += 1;

        win.update_with_buffer(&fb, w, h)?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
