//! AR view screens
//!
//! One function draws the right overlay for the current phase: the idle
//! screen with dish info and the start control, in-session instructions and
//! the item badge, the error panel with retry, and the "no dish selected"
//! screen. Button presses come back as [`HudAction`] flags the app shell
//! feeds to the session manager - synchronously, still inside the input
//! turn that clicked them.

use imgui::Ui;

use crate::anchor::AnchorStrategy;
use crate::menu::MenuItem;
use crate::session::{ActiveMode, SessionPhase};

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct HudAction {
    pub start: bool,
    pub stop: bool,
    pub back_to_menu: bool,
}

/// Draws the HUD for the current phase and returns requested actions.
pub fn draw_hud(
    ui: &Ui,
    item: Option<&MenuItem>,
    phase: &SessionPhase,
    strategy: AnchorStrategy,
) -> HudAction {
    let mut action = HudAction::default();

    let Some(item) = item else {
        draw_no_item(ui, &mut action);
        return action;
    };

    match phase {
        SessionPhase::Idle | SessionPhase::Ended => draw_idle(ui, item, strategy, &mut action),
        SessionPhase::Requesting => draw_requesting(ui),
        SessionPhase::Active(mode) => draw_active(ui, item, strategy, *mode, &mut action),
        SessionPhase::Error(err) => draw_error(ui, &err.to_string(), &mut action),
    }

    action
}

fn draw_no_item(ui: &Ui, action: &mut HudAction) {
    ui.window("AR Preview")
        .size([360.0, 140.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text("No dish selected");
            ui.text_wrapped("Pick something from the menu to preview it in AR.");
            ui.separator();
            if ui.button("Back to menu") {
                action.back_to_menu = true;
            }
        });
}

fn draw_idle(ui: &Ui, item: &MenuItem, strategy: AnchorStrategy, action: &mut HudAction) {
    ui.window("AR Preview")
        .size([400.0, 320.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text(&item.name);
            ui.text_disabled(&item.category);
            if !item.description.is_empty() {
                ui.text_wrapped(&item.description);
            }
            ui.text(format!("{:.2}", item.price));
            ui.separator();

            if ui.button("Start AR") {
                action.start = true;
            }
            ui.same_line();
            if ui.button("Back to menu") {
                action.back_to_menu = true;
            }

            ui.separator();
            ui.text("How it works:");
            match strategy {
                AnchorStrategy::SpatialHitTest => {
                    ui.text_wrapped(
                        "1. Start AR\n2. Aim at a table surface\n3. Tap when the green ring \
                         appears\n4. Drag to rotate the dish",
                    );
                }
                AnchorStrategy::HeuristicMarker => {
                    ui.text_wrapped(
                        "1. Start AR\n2. Point the camera at a table or placemat\n3. The dish \
                         appears once a surface is in view\n4. Drag to rotate it",
                    );
                    ui.text_disabled("(no world tracking on this device - using camera heuristic)");
                }
            }
        });
}

fn draw_requesting(ui: &Ui) {
    ui.window("AR Preview")
        .size([280.0, 80.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text("Starting AR...");
        });
}

fn draw_active(
    ui: &Ui,
    item: &MenuItem,
    strategy: AnchorStrategy,
    mode: ActiveMode,
    action: &mut HudAction,
) {
    ui.window("##badge")
        .size([300.0, 90.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .title_bar(false)
        .build(|| {
            ui.text(&item.name);
            ui.text(format!("{:.2}", item.price));
            if ui.button("Close") {
                action.stop = true;
            }
        });

    let instruction = match (mode, strategy) {
        (ActiveMode::Searching, AnchorStrategy::SpatialHitTest) => {
            "Aim at a surface and tap the green ring to place"
        }
        (ActiveMode::Searching, AnchorStrategy::HeuristicMarker) => {
            "Point the camera at a table surface"
        }
        (ActiveMode::Placed, _) => "Placed! Drag to rotate",
    };
    ui.window("##instruction")
        .size([380.0, 50.0], imgui::Condition::FirstUseEver)
        .position([20.0, 120.0], imgui::Condition::FirstUseEver)
        .title_bar(false)
        .build(|| {
            ui.text_wrapped(instruction);
        });
}

fn draw_error(ui: &Ui, message: &str, action: &mut HudAction) {
    ui.window("AR Error")
        .size([380.0, 150.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text_wrapped(message);
            ui.separator();
            if ui.button("Try again") {
                action.start = true;
            }
            ui.same_line();
            if ui.button("Back to menu") {
                action.back_to_menu = true;
            }
        });
}
