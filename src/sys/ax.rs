//! [`WindowFrameAccessor`] backed by the accessibility API.
//!
//! Windows are found by walking the owning application's `AXWindows` and
//! matching each element's window-server id against [`WindowId::idx`].

use accessibility::value::AXValue;
use accessibility::{AXAttribute, AXUIElement};
use accessibility_sys::{
    AXError, AXUIElementRef, kAXErrorAPIDisabled, kAXErrorSuccess, kAXPositionAttribute,
    kAXSizeAttribute, kAXWindowsAttribute,
};
use core_foundation::array::CFArray;
use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_graphics_types::geometry::{CGPoint, CGSize};
use tracing::trace;

use super::accessibility as trust;
use super::geometry::{Point, Rect, Size};
use super::window::{FrameError, WindowFrameAccessor, WindowId};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn _AXUIElementGetWindow(elem: AXUIElementRef, wid: *mut u32) -> AXError;
}

/// Frame access on a single window element.
trait AXUIElementExt {
    fn window_id(&self) -> Result<u32, accessibility::Error>;
    fn current_frame(&self) -> Result<Rect, accessibility::Error>;
    fn move_to(&self, origin: Point) -> Result<(), accessibility::Error>;
    fn resize_to(&self, size: Size) -> Result<(), accessibility::Error>;
}

fn value_attribute(name: &'static str) -> AXAttribute<AXValue> {
    AXAttribute::new(&CFString::from_static_string(name))
}

impl AXUIElementExt for AXUIElement {
    fn window_id(&self) -> Result<u32, accessibility::Error> {
        let mut id = 0;
        let res = unsafe { _AXUIElementGetWindow(self.as_concrete_TypeRef(), &mut id) };
        if res != kAXErrorSuccess {
            return Err(accessibility::Error::Ax(res));
        }
        Ok(id)
    }

    fn current_frame(&self) -> Result<Rect, accessibility::Error> {
        let origin: CGPoint = self.attribute(&value_attribute(kAXPositionAttribute))?.get_value()?;
        let size: CGSize = self.attribute(&value_attribute(kAXSizeAttribute))?.get_value()?;
        Ok(Rect::new(origin.into(), size.into()))
    }

    fn move_to(&self, origin: Point) -> Result<(), accessibility::Error> {
        let value = AXValue::new(&CGPoint::from(origin))?;
        self.set_attribute(&value_attribute(kAXPositionAttribute), value)
    }

    fn resize_to(&self, size: Size) -> Result<(), accessibility::Error> {
        let value = AXValue::new(&CGSize::from(size))?;
        self.set_attribute(&value_attribute(kAXSizeAttribute), value)
    }
}

fn is_api_disabled(err: &accessibility::Error) -> bool {
    matches!(err, accessibility::Error::Ax(code) if *code == kAXErrorAPIDisabled)
}

#[derive(Default)]
pub struct AxWindowAccessor;

impl AxWindowAccessor {
    pub fn new() -> Self { AxWindowAccessor }

    fn element(&self, window: WindowId) -> Result<AXUIElement, FrameError> {
        let app = AXUIElement::application(window.pid);
        let windows: CFArray<AXUIElement> = app
            .attribute(&AXAttribute::new(&CFString::from_static_string(kAXWindowsAttribute)))
            .map_err(|err| {
                if is_api_disabled(&err) {
                    FrameError::PermissionDenied
                } else {
                    FrameError::PositionUnavailable
                }
            })?;
        for element in windows.iter() {
            if element.window_id().is_ok_and(|id| id == window.idx.get()) {
                return Ok((*element).clone());
            }
        }
        trace!(?window, "window not found among the app's AXWindows");
        Err(FrameError::PositionUnavailable)
    }

    fn set_error(err: accessibility::Error) -> FrameError {
        if is_api_disabled(&err) {
            FrameError::PermissionDenied
        } else {
            FrameError::SetFailed(format!("{err:?}"))
        }
    }
}

impl WindowFrameAccessor for AxWindowAccessor {
    fn frame(&self, window: WindowId) -> Result<Rect, FrameError> {
        let element = self.element(window)?;
        element.current_frame().map_err(|err| {
            if is_api_disabled(&err) {
                FrameError::PermissionDenied
            } else {
                FrameError::SizeUnavailable
            }
        })
    }

    /// Size, then position, then size again: apps that clamp their size
    /// against the screen edge would otherwise end up short.
    fn set_frame(&self, window: WindowId, frame: Rect) -> Result<(), FrameError> {
        let element = self.element(window)?;
        element.resize_to(frame.size).map_err(Self::set_error)?;
        element.move_to(frame.origin).map_err(Self::set_error)?;
        element.resize_to(frame.size).map_err(Self::set_error)?;
        trace!(?window, %frame, "set frame");
        Ok(())
    }

    fn is_permission_granted(&self) -> bool { trust::is_trusted() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn unknown_windows_are_errors() {
        let accessor = AxWindowAccessor::new();
        let window = WindowId::new(i32::MAX, 1);
        let err = accessor.frame(window).unwrap_err();
        assert!(
            matches!(err, FrameError::PermissionDenied | FrameError::PositionUnavailable),
            "{err:?}"
        );
        assert!(accessor.set_frame(window, Rect::from_xywh(0.0, 0.0, 10.0, 10.0)).is_err());
    }

    #[test]
    fn values_convert_to_core_graphics() {
        let origin = CGPoint::from(Point::new(12.0, 34.0));
        let size = CGSize::from(Size::new(560.0, 780.0));
        assert_eq!((origin.x, origin.y), (12.0, 34.0));
        assert_eq!((size.width, size.height), (560.0, 780.0));
        assert_eq!(Rect::new(origin.into(), size.into()), Rect::from_xywh(12.0, 34.0, 560.0, 780.0));
    }
}
