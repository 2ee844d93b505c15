// ============================================================================
// PANEL RENDERING
// ============================================================================
//
// Retained-mode drawing: the panel state is turned into a list of draw
// commands, which are then rasterised into an RGBA frame buffer.

use std::f64::consts::PI;
use std::path::Path;

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::geometry::GaugeDrawParams;
use crate::panel::Panel;
use crate::range::{GaugeId, GaugeRange};
use crate::readout::NoiseSource;

type Rgb = (u8, u8, u8);

/// Loads a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<Font<'static>, PanelError> {
    let data = std::fs::read(path)
        .map_err(|e| PanelError::Font(format!("{}: {}", path.display(), e)))?;
    Font::try_from_vec(data)
        .ok_or_else(|| PanelError::Font(format!("{}: not a usable font", path.display())))
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    Arc {
        cx: i32,
        cy: i32,
        r: i32,
        thickness: i32,
        start_angle: f64,
        arc_span: f64,
        color: Rgb,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        tapered: bool,
        color: Rgb,
    },
    Rect {
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        color: Rgb,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Rgb,
    },
    /// Text centred on `(x, y)`.
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: Rgb,
    },
}

#[derive(Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn render(&self, canvas: &mut Canvas, font: Option<&Font>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Arc {
                    cx,
                    cy,
                    r,
                    thickness,
                    start_angle,
                    arc_span,
                    color,
                } => canvas.arc(*cx, *cy, *r, *thickness, *start_angle, *arc_span, *color),
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    tapered,
                    color,
                } => {
                    let taper = if *tapered { 0.95 } else { 0.0 };
                    canvas.line(*x0, *y0, *x1, *y1, *thickness, taper, *color);
                }
                DrawCommand::Rect {
                    left,
                    top,
                    right,
                    bottom,
                    color,
                } => canvas.fill_rect(*left, *top, *right, *bottom, *color),
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                } => canvas.disc(*cx, *cy, *radius, *color),
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        canvas.text(*x, *y, text, font, Scale::uniform(*font_size), *color);
                    }
                }
            }
        }
    }
}

// ============================================================================
// SCENE CONSTRUCTION
// ============================================================================

/// Builds the draw commands for the current panel state.
pub fn build_scene<N: NoiseSource>(panel: &Panel<N>, config: &PanelConfig) -> Scene {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.background_color.as_tuple()));

    let frame = panel.last_frame();
    let temp = frame.map(|f| f.readings.out_temp.value);
    let pressure = frame.map(|f| f.readings.out_pressure.value);

    add_thermometer(&mut scene, panel, config, temp, frame.map(|f| f.thermometer));
    add_pressure_dial(&mut scene, panel, config, pressure, frame.map(|f| f.pressure));

    if let Some(frame) = frame {
        let readout = &config.readout;
        let text_color = config.text_color.as_tuple();
        let mut y = readout.y;
        for (variable, reading) in frame.readings.iter() {
            scene.add_command(DrawCommand::Text {
                x: readout.x,
                y,
                text: format!(
                    "{}: {}  twin {:.1}  dev {:+.1}",
                    variable.label(),
                    reading.formatted(variable.unit()),
                    reading.twin_value,
                    reading.deviation
                ),
                font_size: readout.font_size,
                color: text_color,
            });
            y += readout.row_height;
        }

        let mixture = panel.mixture();
        if !mixture.is_empty() {
            let summary = mixture.summary();
            scene.add_command(DrawCommand::Text {
                x: readout.x,
                y,
                text: format!(
                    "Mixture total {:.2}  remaining {:.2}",
                    summary.total, summary.shortfall
                ),
                font_size: readout.font_size,
                color: text_color,
            });
        }
    }

    scene
}

fn is_out_of_range(value: Option<f64>, range: &GaugeRange) -> bool {
    value.is_some_and(|v| v < 0.0 || v > range.max_value())
}

fn tick_label(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn add_thermometer<N: NoiseSource>(
    scene: &mut Scene,
    panel: &Panel<N>,
    config: &PanelConfig,
    value: Option<f64>,
    params: Option<GaugeDrawParams>,
) {
    let settings = &config.thermometer;
    let gauge = panel.panel_geometry().thermometer;
    let range = panel.range(GaugeId::Thermometer);
    let color = if is_out_of_range(value, &range) {
        config.warning_color.as_tuple()
    } else {
        config.dial_color.as_tuple()
    };

    let left = (gauge.x - gauge.width / 2.0).round() as i32;
    let right = (gauge.x + gauge.width / 2.0).round() as i32;
    let top = gauge.top.round() as i32;
    let bottom = gauge.bottom.round() as i32;

    if let Some(GaugeDrawParams::Linear { fill_top, .. }) = params {
        scene.add_command(DrawCommand::Rect {
            left,
            top: fill_top.round() as i32,
            right,
            bottom,
            color: config.fill_color.as_tuple(),
        });
    }
    scene.add_command(DrawCommand::Circle {
        cx: gauge.x.round() as i32,
        cy: bottom + settings.bulb_radius - 2,
        radius: settings.bulb_radius,
        color: config.fill_color.as_tuple(),
    });

    for (x0, y0, x1, y1) in [
        (left, top, right, top),
        (left, top, left, bottom),
        (right, top, right, bottom),
    ] {
        scene.add_command(DrawCommand::Line {
            x0,
            y0,
            x1,
            y1,
            thickness: 2.0,
            tapered: false,
            color,
        });
    }

    for tick in panel.ticks(GaugeId::Thermometer) {
        let y = gauge.y_at(tick.position).round() as i32;
        scene.add_command(DrawCommand::Line {
            x0: left - settings.tick_length,
            y0: y,
            x1: left,
            y1: y,
            thickness: settings.tick_thickness,
            tapered: false,
            color,
        });
        if tick.labeled {
            scene.add_command(DrawCommand::Text {
                x: left - settings.tick_length - 18,
                y,
                text: tick_label(tick.value),
                font_size: settings.label_font_size,
                color,
            });
        }
    }
}

fn add_pressure_dial<N: NoiseSource>(
    scene: &mut Scene,
    panel: &Panel<N>,
    config: &PanelConfig,
    value: Option<f64>,
    params: Option<GaugeDrawParams>,
) {
    let settings = &config.pressure;
    let dial = panel.panel_geometry().pressure;
    let range = panel.range(GaugeId::Pressure);
    let color = if is_out_of_range(value, &range) {
        config.warning_color.as_tuple()
    } else {
        config.dial_color.as_tuple()
    };
    let (cx, cy, r) = (
        dial.cx.round() as i32,
        dial.cy.round() as i32,
        dial.radius.round() as i32,
    );

    // Screen angles grow clockwise, so the upper half runs from π to 2π.
    scene.add_command(DrawCommand::Arc {
        cx,
        cy,
        r,
        thickness: settings.dial_thickness,
        start_angle: PI,
        arc_span: PI,
        color,
    });

    for tick in panel.ticks(GaugeId::Pressure) {
        let (outer_x, outer_y) = dial.point_at(tick.position, dial.radius - 1.0);
        let (inner_x, inner_y) =
            dial.point_at(tick.position, dial.radius - settings.tick_length as f64);
        scene.add_command(DrawCommand::Line {
            x0: inner_x.round() as i32,
            y0: inner_y.round() as i32,
            x1: outer_x.round() as i32,
            y1: outer_y.round() as i32,
            thickness: settings.tick_thickness,
            tapered: false,
            color,
        });
        if tick.labeled {
            let label_radius =
                dial.radius - settings.tick_length as f64 - settings.ticks_to_numbers_distance;
            let (label_x, label_y) = dial.point_at(tick.position, label_radius);
            scene.add_command(DrawCommand::Text {
                x: label_x as i32,
                y: label_y as i32,
                text: tick_label(tick.value),
                font_size: settings.label_font_size,
                color,
            });
        }
    }

    if let Some(GaugeDrawParams::Angular { tip, .. }) = params {
        let needle_color = if is_out_of_range(value, &range) {
            config.warning_color.as_tuple()
        } else {
            config.needle_color.as_tuple()
        };
        scene.add_command(DrawCommand::Line {
            x0: cx,
            y0: cy,
            x1: tip.0.round() as i32,
            y1: tip.1.round() as i32,
            thickness: settings.needle_width,
            tapered: true,
            color: needle_color,
        });
        scene.add_command(DrawCommand::Circle {
            cx,
            cy,
            radius: settings.dot_radius,
            color: needle_color,
        });
    }
}

// ============================================================================
// CANVAS AND DRAWING PRIMITIVES
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }

    /// Alpha-blends `color` over the pixel at `(x, y)`; off-canvas is ignored.
    fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        px[0] = mix(color.0, px[0]);
        px[1] = mix(color.1, px[1]);
        px[2] = mix(color.2, px[2]);
        px[3] = 0xff;
    }

    /// Anti-aliased thick line. `taper` narrows the far end by that fraction.
    #[allow(clippy::too_many_arguments)]
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, thickness: f32, taper: f32, color: Rgb) {
        let pad = thickness.ceil() as i32 + 1;
        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);
        for y in (y0.min(y1) - pad)..=(y0.max(y1) + pad) {
            for x in (x0.min(x1) - pad)..=(x0.max(x1) + pad) {
                let px = (x - x0) as f32;
                let py = (y - y0) as f32;
                let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
                let dist = ((x0 as f32 + t * dx - x as f32).powi(2)
                    + (y0 as f32 + t * dy - y as f32).powi(2))
                .sqrt();
                let local = thickness * (1.0 - t * taper);
                let aa = (1.0 - (dist - local / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
                if aa > 0.01 {
                    self.blend(x, y, color, aa);
                }
            }
        }
    }

    fn fill_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, color: Rgb) {
        for y in top.min(bottom)..=top.max(bottom) {
            for x in left.min(right)..=left.max(right) {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn disc(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb) {
        for y in -radius - 1..=radius + 1 {
            for x in -radius - 1..=radius + 1 {
                let dist = ((x * x + y * y) as f64).sqrt();
                let aa = (1.0 - (dist - radius as f64).max(0.0)).max(0.0);
                if aa > 0.0 {
                    self.blend(cx + x, cy + y, color, aa as f32);
                }
            }
        }
    }

    /// Ring segment of outer radius `r`, in screen angles (clockwise from +x).
    #[allow(clippy::too_many_arguments)]
    fn arc(
        &mut self,
        cx: i32,
        cy: i32,
        r: i32,
        thickness: i32,
        start_angle: f64,
        arc_span: f64,
        color: Rgb,
    ) {
        let tau = 2.0 * PI;
        let start = start_angle.rem_euclid(tau);
        let inner = (r - thickness) as f64;
        for y in (cy - r - 1)..=(cy + r + 1) {
            for x in (cx - r - 1)..=(cx + r + 1) {
                let (dx, dy) = ((x - cx) as f64, (y - cy) as f64);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < inner - 1.0 || dist > r as f64 + 1.0 {
                    continue;
                }
                let angle = dy.atan2(dx).rem_euclid(tau);
                if (angle - start).rem_euclid(tau) > arc_span {
                    continue;
                }
                let aa = if dist > r as f64 {
                    1.0 - (dist - r as f64)
                } else if dist < inner {
                    1.0 - (inner - dist)
                } else {
                    1.0
                };
                if aa > 0.0 {
                    self.blend(x, y, color, aa as f32);
                }
            }
        }
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: &Font, scale: Scale, color: Rgb) {
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), bb| {
                (
                    min_x.min(bb.min.x),
                    max_x.max(bb.max.x),
                    min_y.min(bb.min.y),
                    max_y.max(bb.max.y),
                )
            },
        );
        if min_x >= max_x || min_y >= max_y {
            return;
        }
        let offset_x = x - (max_x - min_x) / 2;
        let offset_y = y - (max_y - min_y) / 2;
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = offset_x + gx as i32 + bb.min.x - min_x;
                    let py = offset_y + gy as i32 + bb.min.y - min_y;
                    self.blend(px, py, color, v);
                });
            }
        }
    }
}
