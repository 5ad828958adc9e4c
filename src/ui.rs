use egui::Context;

use crate::model::{Camera, RaftSlot, Scene};

/// Input for one HUD pass over a `width` x `height` pixel surface.
pub fn raw_input(time: f64, width: u32, height: u32, pixels_per_point: f32) -> egui::RawInput {
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(time);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32 / pixels_per_point, height as f32 / pixels_per_point),
    ));
    raw_input
}

/// Build the HUD and return egui output
pub fn build_hud(egui_ctx: &Context, raw_input: egui::RawInput, scene: &Scene, camera: &Camera) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_status_window(ctx, scene, camera);
        draw_controls(ctx);
    })
}

/// One line describing the raft: its pose once loaded, otherwise why it is absent.
pub fn raft_status(slot: &RaftSlot) -> String {
    match slot {
        RaftSlot::Loading => "Raft: loading...".to_string(),
        RaftSlot::Failed(reason) => format!("Raft: failed ({reason})"),
        RaftSlot::Loaded(raft) => {
            let p = raft.pose.position;
            format!(
                "Raft: x: {:.1} y: {:.1} z: {:.1} heading: {:.0}°",
                p.x,
                p.y,
                p.z,
                raft.pose.heading.to_degrees()
            )
        }
    }
}

fn draw_status_window(ctx: &Context, scene: &Scene, camera: &Camera) {
    let eye = camera.eye;

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", scene.stats.fps)).small());
            ui.label(egui::RichText::new(format!("Frame: {}", scene.stats.frame)).small());
            ui.label(egui::RichText::new(raft_status(&scene.raft)).small());
            ui.label(egui::RichText::new(format!("Camera: x: {:.1} y: {:.1} z: {:.1}", eye.x, eye.y, eye.z)).small());
            if let Some(ocean) = &scene.ocean {
                ui.label(egui::RichText::new(format!("Ocean: {} vertices", ocean.len())).small());
            }
        });
}

fn draw_controls(ctx: &Context) {
    egui::Area::new(egui::Id::new("controls"))
        .anchor(egui::Align2::LEFT_BOTTOM, [8.0, -8.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("W / S - forward / back    A / D - left / right")
                    .small()
                    .color(egui::Color32::WHITE),
            );
        });
}
