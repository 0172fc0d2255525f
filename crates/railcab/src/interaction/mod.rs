mod cab;
mod camera;
mod dispatch;
mod display;
mod handlers;
mod menu;
mod mode;

pub use cab::{
    AirBrakeHandle, BrakeSystem, CabEvent, CabSpecs, CabState, DoorMode, DoorSide, Horn,
    SecurityKey,
};
pub use camera::{
    CameraAlignment, CameraRestriction, CameraState, CameraViewMode, EXTERIOR_TOP_ANGULAR_SPEED,
    EXTERIOR_TOP_SPEED, INTERIOR_TOP_ANGULAR_SPEED, INTERIOR_TOP_SPEED, ZOOM_TOP_SPEED,
};
pub use dispatch::{Activation, CommandContext, HandlerTable, RegisterError};
pub use display::{
    timetable_height, DisplayOptions, HudMessage, InterfaceMode, MessageLog, TimetableMode,
    TimetableView, TIMETABLE_ROW_HEIGHT, TIMETABLE_SCROLL_SPEED,
};
pub use menu::{Menu, MenuEntry, MenuOutcome, MenuTag};
pub use mode::{InteractionMode, InteractionState, QuitRequest};
