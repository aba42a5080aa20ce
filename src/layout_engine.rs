pub mod boundary;
pub mod preset;
pub mod resize;
pub mod resolve;
pub mod zone;

pub use boundary::{
    EDGE_TOLERANCE, Orientation, ZoneBoundary, boundary_at, detect_boundaries,
    detect_boundaries_with_tolerance,
};
pub use preset::{BuiltinPreset, PresetLibrary, ZoneLayoutPreset};
pub use resize::{DragKind, MinimumSize, clamp_delta, resize_pair};
pub use resolve::{ModifierBinding, PresetResolver, ScreenBindings};
pub use zone::{ScreenZones, Zone, ZoneDefinition, ZoneId, ZoneLayout};

use crate::sys::geometry::Rect;
use crate::sys::screen::ScreenInfo;

/// Pixel zones for `preset` on `screen`, in preset order, each with a fresh id.
pub fn generate(preset: &ZoneLayoutPreset, screen: Rect, gap: f64) -> Vec<Zone> {
    preset.zones.iter().map(|def| Zone::new(def.to_frame(screen, gap))).collect()
}

/// Generates zones for every screen against its own visible frame.
pub fn generate_layout(
    screens: &[ScreenInfo],
    gap: f64,
    mut preset_for: impl FnMut(&ScreenInfo) -> ZoneLayoutPreset,
) -> ZoneLayout {
    let screens = screens
        .iter()
        .map(|screen| {
            let preset = preset_for(screen);
            ScreenZones {
                screen_id: screen.id.clone(),
                zones: generate(&preset, screen.visible_frame, gap),
                preset_id: preset.id,
            }
        })
        .collect();
    ZoneLayout { screens }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::geometry::Point;

    const SCREEN: Rect = Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0);

    fn frames(zones: &[Zone]) -> Vec<Rect> { zones.iter().map(|z| z.frame).collect() }

    #[test]
    fn half_left_right_on_1080p() {
        let zones = generate(&BuiltinPreset::HalfLeftRight.preset(), SCREEN, 0.0);
        assert_eq!(frames(&zones), vec![
            Rect::from_xywh(0.0, 0.0, 960.0, 1080.0),
            Rect::from_xywh(960.0, 0.0, 960.0, 1080.0),
        ]);
    }

    #[test]
    fn grid_2x2_on_1080p() {
        let zones = generate(&BuiltinPreset::Grid2x2.preset(), SCREEN, 0.0);
        assert_eq!(frames(&zones), vec![
            Rect::from_xywh(0.0, 0.0, 960.0, 540.0),
            Rect::from_xywh(960.0, 0.0, 960.0, 540.0),
            Rect::from_xywh(0.0, 540.0, 960.0, 540.0),
            Rect::from_xywh(960.0, 540.0, 960.0, 540.0),
        ]);
    }

    #[test]
    fn every_generation_gets_fresh_ids() {
        let preset = BuiltinPreset::Thirds.preset();
        let first = generate(&preset, SCREEN, 0.0);
        let second = generate(&preset, SCREEN, 0.0);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.frame, b.frame);
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn multi_screen_layouts_use_each_screens_own_frame() {
        let screens = vec![
            ScreenInfo::new("main", SCREEN, SCREEN),
            ScreenInfo::new(
                "left",
                Rect::from_xywh(-1080.0, 0.0, 1080.0, 1920.0),
                Rect::from_xywh(-1080.0, 0.0, 1080.0, 1920.0),
            ),
        ];
        let layout = generate_layout(&screens, 0.0, |screen| {
            if screen.frame.is_portrait() {
                BuiltinPreset::HalfTopBottom.preset()
            } else {
                BuiltinPreset::HalfLeftRight.preset()
            }
        });
        assert_eq!(layout.screens.len(), 2);
        assert_eq!(layout.all_zones().len(), 4);
        assert_eq!(layout.screens[1].preset_id, "halfTopBottom");

        let (screen, zone) = layout.zone_at(Point::new(-500.0, 100.0)).unwrap();
        assert_eq!(screen.as_str(), "left");
        assert_eq!(zone.frame, Rect::from_xywh(-1080.0, 0.0, 1080.0, 960.0));
    }
}
