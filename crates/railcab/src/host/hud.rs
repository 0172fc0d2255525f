use crate::interaction::{AirBrakeHandle, BrakeSystem, InteractionMode, InterfaceMode};
use crate::session::FrameView;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PAUSE_BANNER_COLOR: [u8; 4] = [230, 170, 40, 255];
const MENU_SHADE_COLOR: [u8; 4] = [12, 12, 16, 255];
const MENU_ROW_COLOR: [u8; 4] = [60, 66, 80, 255];
const MENU_CAPTION_COLOR: [u8; 4] = [36, 40, 50, 255];
const MENU_SELECTED_COLOR: [u8; 4] = [80, 220, 255, 255];
const NOTCH_EMPTY_COLOR: [u8; 4] = [44, 48, 58, 255];
const POWER_NOTCH_COLOR: [u8; 4] = [90, 200, 90, 255];
const BRAKE_NOTCH_COLOR: [u8; 4] = [220, 150, 60, 255];
const EMERGENCY_COLOR: [u8; 4] = [230, 60, 60, 255];
const REVERSER_COLOR: [u8; 4] = [200, 200, 230, 255];
const MESSAGE_COLOR: [u8; 4] = [240, 240, 240, 255];

const NOTCH_WIDTH_PX: i32 = 14;
const NOTCH_HEIGHT_PX: i32 = 10;
const NOTCH_GAP_PX: i32 = 3;
const HUD_MARGIN_PX: i32 = 12;
const BANNER_HEIGHT_PX: i32 = 24;
const MENU_ROW_HEIGHT_PX: i32 = 22;
const MENU_ROW_GAP_PX: i32 = 4;
const MENU_WIDTH_PX: i32 = 320;
const MESSAGE_BLOCK_PX: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Row rectangles of the open menu level, centered in the window.
pub(crate) fn menu_row_rects(width: u32, height: u32, rows: usize) -> Vec<Rect> {
    let rows = rows as i32;
    let total = rows * MENU_ROW_HEIGHT_PX + (rows - 1).max(0) * MENU_ROW_GAP_PX;
    let top = (height as i32 - total) / 2;
    let row_width = MENU_WIDTH_PX.min(width as i32 - 2 * HUD_MARGIN_PX).max(0);
    let left = (width as i32 - row_width) / 2;
    (0..rows)
        .map(|index| Rect {
            x: left,
            y: top + index * (MENU_ROW_HEIGHT_PX + MENU_ROW_GAP_PX),
            width: row_width,
            height: MENU_ROW_HEIGHT_PX,
        })
        .collect()
}

/// Window title carrying the text parts of the HUD.
pub(crate) fn hud_title(base: &str, view: &FrameView<'_>) -> String {
    let mut title = format!(
        "{base} | {} | {}x",
        view.clock.format_time_of_day(),
        view.metrics.time_factor
    );
    if view.display.frame_rates {
        title.push_str(&format!(" | {:.1} fps", view.metrics.fps));
    }
    match view.mode {
        InteractionMode::Pause => {
            title.push_str(" | ");
            title.push_str(view.strings.get("menu_pause_title"));
        }
        InteractionMode::Menu => {
            if let Some(entry) = view.menu.and_then(|menu| menu.selected()) {
                title.push_str(" | ");
                title.push_str(entry.text());
            }
        }
        InteractionMode::Normal => {}
    }
    if let Some(message) = view.messages.iter().last() {
        title.push_str(" | ");
        title.push_str(&message.text);
    }
    title
}

pub(crate) fn draw_hud(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>) {
    if width == 0 || height == 0 {
        return;
    }
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&CLEAR_COLOR);
    }

    if view.display.interface_mode != InterfaceMode::None {
        draw_cab_handles(frame, width, height, view);
        draw_messages(frame, width, height, view);
    }

    match view.mode {
        InteractionMode::Normal => {}
        InteractionMode::Pause => {
            fill_rect(
                frame,
                width,
                height,
                Rect {
                    x: 0,
                    y: 0,
                    width: width as i32,
                    height: BANNER_HEIGHT_PX,
                },
                PAUSE_BANNER_COLOR,
            );
        }
        InteractionMode::Menu => draw_menu(frame, width, height, view),
    }
}

fn draw_cab_handles(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>) {
    let specs = view.cab.specs();
    let base_y = height as i32 - HUD_MARGIN_PX - NOTCH_HEIGHT_PX;
    let mut x = HUD_MARGIN_PX;

    for notch in 1..=specs.max_power_notch {
        let color = if notch <= view.cab.power_notch() {
            POWER_NOTCH_COLOR
        } else {
            NOTCH_EMPTY_COLOR
        };
        fill_rect(frame, width, height, notch_rect(x, base_y), color);
        x += NOTCH_WIDTH_PX + NOTCH_GAP_PX;
    }
    x += NOTCH_WIDTH_PX;

    let brake_cells = match specs.brake_system {
        BrakeSystem::Notched => specs.max_brake_notch,
        BrakeSystem::AutomaticAir => 2,
    };
    let applied = match specs.brake_system {
        BrakeSystem::Notched => view.cab.brake_notch(),
        BrakeSystem::AutomaticAir => match view.cab.air_brake() {
            AirBrakeHandle::Release => 0,
            AirBrakeHandle::Lap => 1,
            AirBrakeHandle::Service => 2,
        },
    };
    for notch in 1..=brake_cells {
        let color = if view.cab.emergency() {
            EMERGENCY_COLOR
        } else if notch <= applied {
            BRAKE_NOTCH_COLOR
        } else {
            NOTCH_EMPTY_COLOR
        };
        fill_rect(frame, width, height, notch_rect(x, base_y), color);
        x += NOTCH_WIDTH_PX + NOTCH_GAP_PX;
    }
    x += NOTCH_WIDTH_PX;

    // Reverser: three cells, lit at backward / neutral / forward.
    for position in -1..=1 {
        let color = if position == view.cab.reverser() {
            REVERSER_COLOR
        } else {
            NOTCH_EMPTY_COLOR
        };
        fill_rect(frame, width, height, notch_rect(x, base_y), color);
        x += NOTCH_WIDTH_PX + NOTCH_GAP_PX;
    }
}

fn notch_rect(x: i32, y: i32) -> Rect {
    Rect {
        x,
        y,
        width: NOTCH_WIDTH_PX,
        height: NOTCH_HEIGHT_PX,
    }
}

fn draw_messages(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>) {
    let x = width as i32 - HUD_MARGIN_PX - MESSAGE_BLOCK_PX;
    let mut y = BANNER_HEIGHT_PX + HUD_MARGIN_PX;
    for _ in view.messages.iter() {
        fill_rect(
            frame,
            width,
            height,
            Rect {
                x,
                y,
                width: MESSAGE_BLOCK_PX,
                height: MESSAGE_BLOCK_PX,
            },
            MESSAGE_COLOR,
        );
        y += MESSAGE_BLOCK_PX + NOTCH_GAP_PX;
    }
}

fn draw_menu(frame: &mut [u8], width: u32, height: u32, view: &FrameView<'_>) {
    let Some(menu) = view.menu else {
        return;
    };
    let entries = menu.current_entries();
    let rows = menu_row_rects(width, height, entries.len());
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        fill_rect(
            frame,
            width,
            height,
            Rect {
                x: first.x - MENU_ROW_GAP_PX * 2,
                y: first.y - MENU_ROW_GAP_PX * 2,
                width: first.width + MENU_ROW_GAP_PX * 4,
                height: last.y + last.height - first.y + MENU_ROW_GAP_PX * 4,
            },
            MENU_SHADE_COLOR,
        );
    }
    for (index, (entry, rect)) in entries.iter().zip(rows).enumerate() {
        let color = if entry.is_caption() {
            MENU_CAPTION_COLOR
        } else if index == menu.selected_index() {
            MENU_SELECTED_COLOR
        } else {
            MENU_ROW_COLOR
        };
        fill_rect(frame, width, height, rect, color);
    }
}

fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
